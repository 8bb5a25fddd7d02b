//! Wiring graph rebuilding for instantiated configurations.

use weave_ast::{Endpoint, WiringGraph};

use crate::forward::ForwardingTable;

fn forward_endpoint(forwarding: &ForwardingTable, endpoint: &Endpoint) -> Endpoint {
    Endpoint::new(
        endpoint.interface.map(|decl| forwarding.forward(decl)),
        endpoint.function.map(|decl| forwarding.forward(decl)),
    )
}

/// Copy every endpoint and edge of `source` into `target`, rewriting the
/// declarations of each endpoint through `forwarding`.
///
/// Endpoints with no forwarding entry (the specifications of concrete
/// components outside the instance) map to themselves.
pub fn rebuild_wiring(source: &WiringGraph, target: &mut WiringGraph, forwarding: &ForwardingTable) {
    for node in source.nodes() {
        let Some(endpoint) = source.endpoint(node) else {
            continue;
        };
        let from = target.endpoint_lookup(forward_endpoint(forwarding, endpoint));

        for successor in source.successors(node) {
            let Some(callee) = source.endpoint(successor) else {
                continue;
            };
            let to = target.endpoint_lookup(forward_endpoint(forwarding, callee));
            target.add_edge(from, to);
        }
    }
}
