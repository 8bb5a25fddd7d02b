//! Shared component fixtures for the integration tests.
//!
//! The fixtures build small programs directly through the compile-unit
//! builder, the way a front end would leave them after semantic analysis.

#![allow(dead_code)]

use weave::prelude::*;

/// Install a test subscriber so `RUST_LOG` output shows up under
/// `cargo test -- --nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// `generic module QueueC(int size) provides interface Queue`
///
/// ```text
/// int slots = size * 2;
/// command int Queue.push() { return slots; }
/// ```
pub struct QueueModule {
    pub template: ComponentId,
    pub queue: DeclId,
    pub push: DeclId,
    pub size: DeclId,
    pub slots: DeclId,
}

pub fn queue_module(unit: &mut CompileUnit) -> QueueModule {
    let template = unit.new_component("QueueC", ComponentKind::Module, true);
    let queue = unit.add_interface(template, "Queue");
    let push = unit.add_spec_function(template, Some(queue), "push", FunctionFlavor::Command, Type::int());
    let size = unit.add_parameter(template, "size", Type::int());
    let slots = unit.declare_variable(Some(template), "slots", Type::int());

    let size_use = unit.ident(size);
    let two = unit.int_lit(2);
    let doubled = unit.binary(BinaryOp::Mul, size_use, two);
    let declarator = unit.variable_decl(slots, Some(doubled));
    let data = unit.data_decl(vec![declarator]);

    let slots_use = unit.ident(slots);
    let ret = unit.return_stmt(Some(slots_use));
    let block = unit.compound(vec![ret]);
    let def = unit.function_def(push, block);

    let body = unit.module_body(vec![data, def]);
    unit.set_implementation(template, body);

    QueueModule {
        template,
        queue,
        push,
        size,
        slots,
    }
}

/// `generic configuration ServiceC(int depth) provides interface Queue`
///
/// ```text
/// components new QueueC(depth * 2) as Q;
/// Queue = Q.Queue;
/// ```
pub struct ServiceConfig {
    pub template: ComponentId,
    pub queue: DeclId,
    pub depth: DeclId,
    pub inner: ComponentId,
}

pub fn service_config(unit: &mut CompileUnit, queue: &QueueModule) -> ServiceConfig {
    let template = unit.new_component("ServiceC", ComponentKind::Configuration, true);
    let iface = unit.add_interface(template, "Queue");
    let depth = unit.add_parameter(template, "depth", Type::int());

    let inner = unit.specification_copy(queue.template, true);
    let depth_use = unit.ident(depth);
    let two = unit.int_lit(2);
    let arg = unit.binary(BinaryOp::Mul, depth_use, two);
    let used = unit.component_ref(inner, vec![arg]);

    let inner_queue = unit.component(inner).specification[0];
    let wire = unit.connection(template, Endpoint::interface(iface), Endpoint::interface(inner_queue));

    let body = unit.configuration_body(vec![used], vec![wire]);
    unit.set_implementation(template, body);

    ServiceConfig {
        template,
        queue: iface,
        depth,
        inner,
    }
}

/// Declarations of an instance's module body, in order.
pub fn module_items(unit: &CompileUnit, component: ComponentId) -> Vec<NodeId> {
    let Some(body) = unit.component(component).implementation else {
        return Vec::new();
    };
    match &unit.node(body).kind {
        NodeKind::Module { declarations } => declarations.clone(),
        _ => Vec::new(),
    }
}

/// The declaration and initialiser of the first declarator of a
/// `DataDecl` node.
pub fn declarator(unit: &CompileUnit, data: NodeId) -> Option<(DeclId, Option<NodeId>)> {
    let NodeKind::DataDecl { declarators } = &unit.node(data).kind else {
        return None;
    };
    match &unit.node(*declarators.first()?).kind {
        NodeKind::VariableDecl { decl, init } => Some((*decl, *init)),
        _ => None,
    }
}

/// The parameter declarations of a component, in order.
pub fn parameter_decls(unit: &CompileUnit, component: ComponentId) -> Vec<DeclId> {
    unit.component(component)
        .parameters
        .iter()
        .filter_map(|data| declarator(unit, *data).map(|(decl, _)| decl))
        .collect()
}

/// The component uses of a configuration instance.
pub fn component_uses(unit: &CompileUnit, component: ComponentId) -> Vec<(ComponentId, Vec<NodeId>)> {
    let Some(body) = unit.component(component).implementation else {
        return Vec::new();
    };
    let NodeKind::Configuration { components, .. } = &unit.node(body).kind else {
        return Vec::new();
    };
    components
        .iter()
        .filter_map(|node| match &unit.node(*node).kind {
            NodeKind::ComponentRef { component, args } => Some((*component, args.clone())),
            _ => None,
        })
        .collect()
}
