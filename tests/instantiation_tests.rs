//! Integration tests for instantiating abstract components.

mod common;

use common::*;
use weave::prelude::*;
use weave::weave_instantiate::ForwardingTable;

fn slots_init(unit: &CompileUnit, component: ComponentId) -> Option<ConstValue> {
    let items = module_items(unit, component);
    let (_, init) = declarator(unit, *items.first()?)?;
    unit.node(init?).expr.cst.clone()
}

fn function_def(unit: &CompileUnit, component: ComponentId) -> Option<(DeclId, NodeId)> {
    module_items(unit, component)
        .into_iter()
        .find_map(|item| match &unit.node(item).kind {
            NodeKind::FunctionDecl { decl, .. } => Some((*decl, item)),
            _ => None,
        })
}

// ============================================================================
// Forwarding
// ============================================================================

#[test]
fn test_clone_declaration_is_idempotent() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let env = unit.new_environment(Some(unit.global_env()), false);

    let mut forwarding = ForwardingTable::new();
    let first = forwarding
        .clone_declaration(&mut unit, instance, env, queue.slots)
        .unwrap();
    let second = forwarding
        .clone_declaration(&mut unit, instance, env, queue.slots)
        .unwrap();

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(forwarding.len(), 1);
    let copy = first.unwrap();
    assert_eq!(unit.decl(copy).container, Some(instance));
    assert_eq!(unit.decl(copy).shadowed, Some(queue.slots));
}

#[test]
fn test_globals_are_not_cloned() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let global = unit.declare_variable(None, "counter", Type::int());
    let env = unit.new_environment(Some(unit.global_env()), false);

    let mut forwarding = ForwardingTable::new();
    let result = forwarding.clone_declaration(&mut unit, instance, env, global).unwrap();

    assert_eq!(result, None);
    assert!(forwarding.is_empty());
    assert_eq!(forwarding.forward(global), global);
}

// ============================================================================
// Independence of instances
// ============================================================================

#[test]
fn test_instances_are_independent() {
    init_tracing();
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let small = unit.specification_copy(queue.template, false);
    let large = unit.specification_copy(queue.template, false);
    let three = unit.int_lit(3);
    let five = unit.int_lit(5);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(small, &[three]).unwrap();
    driver.instantiate_use(large, &[five]).unwrap();
    let output = driver.finish();

    assert!(output.diagnostics.is_empty());
    assert_eq!(output.stats.components_instantiated, 2);

    let small_size = parameter_decls(&unit, small)[0];
    let large_size = parameter_decls(&unit, large)[0];
    assert_ne!(small_size, large_size);
    assert_ne!(small_size, queue.size);
    assert_eq!(unit.decl(small_size).value, Some(ConstValue::Int(3)));
    assert_eq!(unit.decl(large_size).value, Some(ConstValue::Int(5)));

    assert_eq!(slots_init(&unit, small), Some(ConstValue::Int(6)));
    assert_eq!(slots_init(&unit, large), Some(ConstValue::Int(10)));

    let small_items = module_items(&unit, small);
    let large_items = module_items(&unit, large);
    let (small_slots, _) = declarator(&unit, small_items[0]).unwrap();
    let (large_slots, _) = declarator(&unit, large_items[0]).unwrap();
    assert_ne!(small_slots, large_slots);
    assert_eq!(unit.decl(small_slots).container, Some(small));
    assert_eq!(unit.decl(large_slots).container, Some(large));
    assert_eq!(unit.decl(small_slots).shadowed, Some(queue.slots));
}

#[test]
fn test_identifiers_refer_to_instance_declarations() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let arg = unit.int_lit(4);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[arg]).unwrap();
    drop(driver);

    let items = module_items(&unit, instance);
    let (slots, _) = declarator(&unit, items[0]).unwrap();
    let (_, def) = function_def(&unit, instance).unwrap();
    let NodeKind::FunctionDecl { body, .. } = &unit.node(def).kind else {
        panic!("expected a function definition");
    };
    let NodeKind::Compound { statements } = &unit.node(*body).kind else {
        panic!("expected a compound statement");
    };
    let NodeKind::Return { value: Some(value) } = &unit.node(statements[0]).kind else {
        panic!("expected a return statement");
    };
    assert_eq!(unit.node(*value).kind, NodeKind::Identifier { decl: slots });
    assert_ne!(slots, queue.slots);
}

#[test]
fn test_instance_addresses_refer_to_instance_declarations() {
    // generic module TableC(int n) { int table[4]; int *p = table; }
    let mut unit = CompileUnit::new();
    let template = unit.new_component("TableC", ComponentKind::Module, true);
    unit.add_parameter(template, "n", Type::int());
    let table = unit.declare_variable(Some(template), "table", Type::int().array_of(Some(4)));
    let p = unit.declare_variable(Some(template), "p", Type::int().pointer_to());
    let table_decl = unit.variable_decl(table, None);
    let table_data = unit.data_decl(vec![table_decl]);
    let table_use = unit.ident(table);
    let p_decl = unit.variable_decl(p, Some(table_use));
    let p_data = unit.data_decl(vec![p_decl]);
    let body = unit.module_body(vec![table_data, p_data]);
    unit.set_implementation(template, body);

    let instance = unit.specification_copy(template, false);
    let arg = unit.int_lit(0);
    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[arg]).unwrap();
    drop(driver);

    let items = module_items(&unit, instance);
    let (instance_table, _) = declarator(&unit, items[0]).unwrap();
    let (_, init) = declarator(&unit, items[1]).unwrap();
    let init = init.unwrap();
    assert_ne!(instance_table, table);
    assert_eq!(
        unit.node(init).expr.cst,
        Some(ConstValue::address(AddressBase::Decl(instance_table), 0))
    );
    assert_eq!(
        unit.node(init).expr.static_address,
        Some(ConstValue::address(AddressBase::Decl(instance_table), 0))
    );
}

// ============================================================================
// Commands and events
// ============================================================================

#[test]
fn test_command_definition_keeps_specification_site() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let arg = unit.int_lit(1);
    let spec_site = unit.decl(queue.push).ast;

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[arg]).unwrap();
    drop(driver);

    let instance_push = unit.component(instance).specification[1];
    let (defined, def) = function_def(&unit, instance).unwrap();
    assert_eq!(defined, instance_push);
    assert_eq!(unit.decl(instance_push).definition, Some(def));
    assert_eq!(unit.decl(instance_push).ast, spec_site);
    assert_eq!(unit.decl(instance_push).interface, Some(unit.component(instance).specification[0]));
}

// ============================================================================
// Argument binding
// ============================================================================

#[test]
fn test_non_constant_argument_is_reported() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let x = unit.declare_local(None, "x", Type::int());
    let arg = unit.ident(x);
    unit.set_span(arg, Span::new(12, 17, 1));

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[arg]).unwrap();
    let output = driver.finish();

    assert_eq!(output.diagnostics.len(), 1);
    let error = &output.diagnostics.errors()[0];
    assert_eq!(error.span(), Span::new(12, 17, 1));
    assert!(matches!(
        error,
        FoldError::NonConstantArgument { component, parameter, .. }
            if component == "QueueC" && parameter == "size"
    ));
    assert!(!error.to_string().contains("QueueC#"));

    assert!(unit.component(instance).instantiated);
    let size = parameter_decls(&unit, instance)[0];
    assert_eq!(unit.decl(size).value, None);
    assert_eq!(slots_init(&unit, instance), None);
}

#[test]
fn test_argument_count_mismatch() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    let result = driver.instantiate_use(instance, &[]);

    assert_eq!(
        result,
        Err(InternalFault::ArgumentCountMismatch {
            component: "QueueC#1".to_string(),
            expected: 1,
            found: 0,
        })
    );
}

// ============================================================================
// Nested abstract components
// ============================================================================

#[test]
fn test_nested_abstract_component_is_instantiated() {
    init_tracing();
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let service = service_config(&mut unit, &queue);
    let instance = unit.specification_copy(service.template, false);
    let four = unit.int_lit(4);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[four]).unwrap();
    let output = driver.finish();

    assert!(output.diagnostics.is_empty());
    assert_eq!(output.stats.nested_instantiations, 1);
    assert_eq!(output.stats.components_instantiated, 2);

    let depth = parameter_decls(&unit, instance)[0];
    assert_eq!(unit.decl(depth).value, Some(ConstValue::Int(4)));

    let uses = component_uses(&unit, instance);
    assert_eq!(uses.len(), 1);
    let (nested, args) = &uses[0];
    assert_ne!(*nested, service.inner);
    assert_eq!(unit.component(*nested).original, Some(service.inner));
    assert_eq!(unit.root_original(*nested), queue.template);
    assert!(unit.component(*nested).instantiated);
    assert!(!unit.component(service.inner).instantiated);

    let NodeKind::Binary { left, .. } = &unit.node(args[0]).kind else {
        panic!("expected the cloned argument expression");
    };
    assert_eq!(unit.node(*left).kind, NodeKind::Identifier { decl: depth });

    let size = parameter_decls(&unit, *nested)[0];
    assert_eq!(unit.decl(size).value, Some(ConstValue::Int(8)));
    assert_eq!(slots_init(&unit, *nested), Some(ConstValue::Int(16)));

    let nested_push = unit.component(*nested).specification[1];
    let (defined, _) = function_def(&unit, *nested).unwrap();
    assert_eq!(defined, nested_push);
}

#[test]
fn test_two_uses_of_a_configuration_get_separate_nested_instances() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let service = service_config(&mut unit, &queue);
    let first = unit.specification_copy(service.template, false);
    let second = unit.specification_copy(service.template, false);
    let one = unit.int_lit(1);
    let two = unit.int_lit(2);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(first, &[one]).unwrap();
    driver.instantiate_use(second, &[two]).unwrap();
    let output = driver.finish();

    assert_eq!(output.stats.nested_instantiations, 2);
    let (first_queue, _) = component_uses(&unit, first)[0].clone();
    let (second_queue, _) = component_uses(&unit, second)[0].clone();
    assert_ne!(first_queue, second_queue);
    assert_eq!(slots_init(&unit, first_queue), Some(ConstValue::Int(4)));
    assert_eq!(slots_init(&unit, second_queue), Some(ConstValue::Int(8)));
}

// ============================================================================
// Internal faults
// ============================================================================

#[test]
fn test_template_is_not_instantiable() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    let result = driver.instantiate(queue.template);

    assert_eq!(
        result,
        Err(InternalFault::NotInstantiable {
            component: "QueueC".to_string(),
        })
    );
}

#[test]
fn test_broken_shadow_chain_aborts() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let iface = unit.component(instance).specification[0];
    unit.decl_mut(iface).shadowed = None;
    let arg = unit.int_lit(3);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    let result = driver.instantiate_use(instance, &[arg]);

    assert_eq!(
        result,
        Err(InternalFault::MissingShadow {
            name: "Queue".to_string(),
            depth: 1,
        })
    );
}

#[test]
fn test_self_nesting_configuration_hits_depth_limit() {
    let mut unit = CompileUnit::new();
    let ring = unit.new_component("RingC", ComponentKind::Configuration, true);
    unit.add_interface(ring, "Ring");
    let inner = unit.specification_copy(ring, true);
    let used = unit.component_ref(inner, Vec::new());
    let body = unit.configuration_body(vec![used], Vec::new());
    unit.set_implementation(ring, body);
    let instance = unit.specification_copy(ring, false);

    let config = InstantiateConfig::default().with_max_nesting_depth(3);
    let mut driver = Instantiator::new(&mut unit, &config);
    let result = driver.instantiate_use(instance, &[]);

    assert!(matches!(result, Err(InternalFault::NestingTooDeep { limit: 3, .. })));
    assert_eq!(driver.stats().components_instantiated, 4);
}

#[test]
fn test_instantiate_twice_is_a_no_op() {
    let mut unit = CompileUnit::new();
    let queue = queue_module(&mut unit);
    let instance = unit.specification_copy(queue.template, false);
    let arg = unit.int_lit(3);

    let config = InstantiateConfig::default();
    let mut driver = Instantiator::new(&mut unit, &config);
    driver.instantiate_use(instance, &[arg]).unwrap();
    let nodes = driver.unit().node_count();
    assert!(driver.instantiate(instance).unwrap().is_empty());
    assert_eq!(driver.unit().node_count(), nodes);
    assert_eq!(driver.stats().components_instantiated, 1);
}
