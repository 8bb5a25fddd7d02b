//! The instantiation driver.
//!
//! ## Flow
//!
//! ```text
//! instantiate_use(component, args)
//!   ├── fold_constants   bind parameters to folded arguments, fold the body
//!   ├── instantiate      clone parameters and body into the instance
//!   └── for each abstract component used by the cloned body:
//!         instantiate_use(copy, cloned args)    (depth + 1)
//! ```
//!
//! Fold errors are collected and the pass carries on. Internal faults
//! abort with `Err`.

use tracing::debug;
use weave_ast::{CompileUnit, NodeKind};
use weave_core::{ComponentId, DeclId, Diagnostics, FoldError, InstantiateConfig, InternalFault, NodeId};

use crate::clone::Cloner;
use crate::context::{InstantiationContext, NestedUse};
use crate::fold::ConstantFolder;
use crate::fold::magic::MagicFunctions;

/// Counters for one instantiation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstantiationStats {
    /// Components whose implementation was cloned.
    pub components_instantiated: usize,
    /// Nested abstract component uses instantiated.
    pub nested_instantiations: usize,
    /// Declarations copied.
    pub declarations_cloned: usize,
    /// Syntax nodes copied.
    pub nodes_cloned: usize,
}

/// Result of an instantiation pass.
#[derive(Debug, Default)]
pub struct InstantiationOutput {
    /// Recoverable errors reported along the way.
    pub diagnostics: Diagnostics,
    /// Work counters.
    pub stats: InstantiationStats,
}

/// Folds and instantiates abstract components of one compile unit.
pub struct Instantiator<'a> {
    unit: &'a mut CompileUnit,
    config: &'a InstantiateConfig,
    magic: MagicFunctions,
    diagnostics: Diagnostics,
    stats: InstantiationStats,
}

impl<'a> Instantiator<'a> {
    /// Create a driver over `unit`.
    pub fn new(unit: &'a mut CompileUnit, config: &'a InstantiateConfig) -> Self {
        Self {
            unit,
            config,
            magic: MagicFunctions::new(),
            diagnostics: Diagnostics::new(),
            stats: InstantiationStats::default(),
        }
    }

    /// The compile unit being worked on.
    pub fn unit(&self) -> &CompileUnit {
        self.unit
    }

    /// Diagnostics reported so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Counters so far.
    pub fn stats(&self) -> InstantiationStats {
        self.stats
    }

    /// The compile-time function state, for `uniqueCount`-style queries.
    pub fn magic(&self) -> &MagicFunctions {
        &self.magic
    }

    /// Finish the pass.
    pub fn finish(self) -> InstantiationOutput {
        InstantiationOutput {
            diagnostics: self.diagnostics,
            stats: self.stats,
        }
    }

    fn fold(&mut self, root: NodeId) {
        ConstantFolder::new(&self.config.target, &mut self.magic).fold(self.unit, root);
    }

    /// Formal parameter declarations, in order.
    fn parameter_decls(&self, component: ComponentId) -> Vec<DeclId> {
        let mut decls = Vec::new();
        for parameter in &self.unit.component(component).parameters {
            let node = self.unit.node(*parameter);
            let declarators = match &node.kind {
                NodeKind::DataDecl { declarators } => declarators.clone(),
                _ => vec![*parameter],
            };
            decls.extend(
                declarators
                    .into_iter()
                    .filter_map(|declarator| self.unit.node(declarator).kind.decl()),
            );
        }
        decls
    }

    /// Bind a component's parameters to its arguments and fold its body.
    ///
    /// Runs at most once per component, and folds `args` exactly once. For
    /// configurations, each use of a plain component is folded with its
    /// own arguments. Uses of abstract components are skipped: they are
    /// folded when their own instance is, right before it is cloned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn fold_constants(&mut self, component: ComponentId, args: &[NodeId]) -> Result<(), InternalFault> {
        if self.unit.component(component).folded {
            return Ok(());
        }
        self.unit.component_mut(component).folded = true;
        debug!(component = %self.unit.component(component).name, args = args.len(), "folding constants");

        for arg in args {
            self.fold(*arg);
        }

        let parameters = self.parameter_decls(component);
        if parameters.len() != args.len() {
            return Err(InternalFault::ArgumentCountMismatch {
                component: self.unit.component(component).name.clone(),
                expected: parameters.len(),
                found: args.len(),
            });
        }
        for (parameter, arg) in parameters.iter().zip(args) {
            let value = self.unit.node(*arg).expr.cst.clone();
            if value.is_none() {
                let template = self.unit.root_original(component);
                self.diagnostics.push(FoldError::NonConstantArgument {
                    component: self.unit.component(template).name.clone(),
                    parameter: self.unit.decl(*parameter).name.clone(),
                    span: self.unit.node(*arg).span,
                });
            }
            self.unit.decl_mut(*parameter).value = value;
        }

        let Some(body) = self.unit.component(component).implementation else {
            return Ok(());
        };
        if !self.unit.component(component).is_configuration() {
            self.fold(body);
            return Ok(());
        }

        // Component arguments are the only expressions of a configuration.
        for (used, used_args) in self.component_uses(body) {
            if self.unit.component(used).original.is_none() {
                self.fold_constants(used, &used_args)?;
            }
        }
        Ok(())
    }

    /// Component uses of a configuration body.
    fn component_uses(&self, body: NodeId) -> Vec<(ComponentId, Vec<NodeId>)> {
        let NodeKind::Configuration { components, .. } = &self.unit.node(body).kind else {
            return Vec::new();
        };
        components
            .iter()
            .filter_map(|node| match &self.unit.node(*node).kind {
                NodeKind::ComponentRef { component, args } => Some((*component, args.clone())),
                _ => None,
            })
            .collect()
    }

    /// Give a specification copy of an abstract component its own
    /// parameters, declarations and body.
    ///
    /// Returns the abstract components used by the new body, each already
    /// given its own specification copy and still to be instantiated.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(&mut self, component: ComponentId) -> Result<Vec<NestedUse>, InternalFault> {
        let descriptor = self.unit.component(component);
        if descriptor.original.is_none() {
            return Err(InternalFault::NotInstantiable {
                component: descriptor.name.clone(),
            });
        }
        if descriptor.instantiated {
            return Ok(Vec::new());
        }
        let parameters = descriptor.parameters.clone();
        let implementation = descriptor.implementation;
        let depth = self.unit.original_depth(component);
        debug!(component = %descriptor.name, depth, "instantiating");

        let global = self.unit.global_env();
        let parameter_env = self.unit.new_environment(Some(global), true);
        let mut ctx = InstantiationContext::new(component, parameter_env);
        let cloned_parameters = Cloner::new(self.unit, &mut ctx).clone_list(&parameters)?;

        let forwarding = &mut ctx.forwarding;
        let unit = &*self.unit;
        unit.for_each_specification_decl(component, |decl| forwarding.seed_from_copy(unit, decl, depth))?;

        ctx.env = self.unit.new_environment(Some(parameter_env), false);
        let cloned_implementation = match implementation {
            Some(body) => Some(Cloner::new(self.unit, &mut ctx).clone_tree(body)?),
            None => None,
        };

        let descriptor = self.unit.component_mut(component);
        descriptor.parameters = cloned_parameters;
        descriptor.implementation = cloned_implementation;
        descriptor.instantiated = true;

        self.stats.components_instantiated += 1;
        self.stats.declarations_cloned += ctx.decls_cloned;
        self.stats.nodes_cloned += ctx.nodes_cloned;
        debug!(
            component = %self.unit.component(component).name,
            declarations = ctx.decls_cloned,
            nodes = ctx.nodes_cloned,
            nested = ctx.nested.len(),
            "instantiated"
        );
        Ok(ctx.nested)
    }

    /// Fold and instantiate one use of an abstract component, then every
    /// abstract component its body uses, recursively.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate_use(&mut self, component: ComponentId, args: &[NodeId]) -> Result<(), InternalFault> {
        self.instantiate_use_at(component, args, 0)
    }

    fn instantiate_use_at(
        &mut self,
        component: ComponentId,
        args: &[NodeId],
        depth: usize,
    ) -> Result<(), InternalFault> {
        let limit = self.config.max_nesting_depth;
        if depth > limit {
            return Err(InternalFault::NestingTooDeep {
                component: self.unit.component(component).name.clone(),
                limit,
            });
        }

        self.fold_constants(component, args)?;
        let nested = self.instantiate(component)?;
        for NestedUse { component, args } in nested {
            self.stats.nested_instantiations += 1;
            self.instantiate_use_at(component, &args, depth + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_ast::{BinaryOp, ComponentKind, Type};
    use weave_core::ConstValue;

    /// `module BufferC(int size) { uint8_t buf[size * 2]; }`, with the size
    /// expression kept as an initialiser so it stays observable.
    fn buffer_module(unit: &mut CompileUnit) -> (ComponentId, DeclId, DeclId) {
        let template = unit.new_component("BufferC", ComponentKind::Module, true);
        let size = unit.add_parameter(template, "size", Type::int());
        let capacity = unit.declare_variable(Some(template), "capacity", Type::int());
        let size_use = unit.ident(size);
        let two = unit.int_lit(2);
        let doubled = unit.binary(BinaryOp::Mul, size_use, two);
        let declarator = unit.variable_decl(capacity, Some(doubled));
        let data = unit.data_decl(vec![declarator]);
        let body = unit.module_body(vec![data]);
        unit.set_implementation(template, body);
        (template, size, capacity)
    }

    fn capacity_init(unit: &CompileUnit, component: ComponentId) -> Option<ConstValue> {
        let body = unit.component(component).implementation?;
        let NodeKind::Module { declarations } = &unit.node(body).kind else {
            return None;
        };
        let NodeKind::DataDecl { declarators } = &unit.node(declarations[0]).kind else {
            return None;
        };
        let NodeKind::VariableDecl { init, .. } = &unit.node(declarators[0]).kind else {
            return None;
        };
        unit.node((*init)?).expr.cst.clone()
    }

    #[test]
    fn instantiate_use_binds_and_clones() {
        let mut unit = CompileUnit::new();
        let (template, size, _) = buffer_module(&mut unit);
        let instance = unit.specification_copy(template, false);
        let arg = unit.int_lit(10);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        driver.instantiate_use(instance, &[arg]).unwrap();
        let output = driver.finish();

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.stats.components_instantiated, 1);
        assert_eq!(output.stats.declarations_cloned, 2);
        assert!(unit.component(instance).instantiated);
        assert_eq!(capacity_init(&unit, instance), Some(ConstValue::Int(20)));
        assert_ne!(unit.component(instance).implementation, unit.component(template).implementation);
        assert_eq!(unit.decl(size).value, Some(ConstValue::Int(10)));
    }

    #[test]
    fn fold_runs_once() {
        let mut unit = CompileUnit::new();
        let (template, size, _) = buffer_module(&mut unit);
        let instance = unit.specification_copy(template, false);
        let first = unit.int_lit(1);
        let second = unit.int_lit(2);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        driver.fold_constants(instance, &[first]).unwrap();
        driver.fold_constants(instance, &[second]).unwrap();
        drop(driver);
        assert_eq!(unit.decl(size).value, Some(ConstValue::Int(1)));
    }

    #[test]
    fn argument_count_mismatch_is_a_fault() {
        let mut unit = CompileUnit::new();
        let (template, _, _) = buffer_module(&mut unit);
        let instance = unit.specification_copy(template, false);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        let result = driver.fold_constants(instance, &[]);
        assert!(matches!(
            result,
            Err(InternalFault::ArgumentCountMismatch {
                expected: 1,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn templates_are_not_instantiable() {
        let mut unit = CompileUnit::new();
        let (template, _, _) = buffer_module(&mut unit);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        assert_eq!(
            driver.instantiate(template),
            Err(InternalFault::NotInstantiable {
                component: "BufferC".into()
            })
        );
    }

    #[test]
    fn instantiate_twice_is_a_no_op() {
        let mut unit = CompileUnit::new();
        let (template, _, _) = buffer_module(&mut unit);
        let instance = unit.specification_copy(template, false);
        let arg = unit.int_lit(3);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        driver.instantiate_use(instance, &[arg]).unwrap();
        let nodes = driver.stats().nodes_cloned;
        assert_eq!(driver.instantiate(instance), Ok(Vec::new()));
        assert_eq!(driver.stats().nodes_cloned, nodes);
    }

    #[test]
    fn parameters_are_cloned_per_instance() {
        let mut unit = CompileUnit::new();
        let (template, size, _) = buffer_module(&mut unit);
        let instance = unit.specification_copy(template, false);
        let arg = unit.int_lit(7);

        let config = InstantiateConfig::default();
        let mut driver = Instantiator::new(&mut unit, &config);
        driver.instantiate_use(instance, &[arg]).unwrap();
        drop(driver);

        let parameter = unit.component(instance).parameters[0];
        let NodeKind::DataDecl { declarators } = &unit.node(parameter).kind else {
            panic!("expected a data declaration");
        };
        let decl = unit.node(declarators[0]).kind.decl().unwrap();
        assert_ne!(decl, size);
        assert_eq!(unit.decl(decl).shadowed, Some(size));
        assert_eq!(unit.decl(decl).container, Some(instance));
        assert_eq!(unit.decl(decl).value, Some(ConstValue::Int(7)));
        assert!(unit.environment(unit.decl(decl).env.unwrap()).parameter_level);
    }
}
