//! Fix-point driver for recursive and mutually recursive functions.
//!
//! Functions of a module are ordered by their local call graph. Each
//! strongly connected component is seeded at `pure` and re-analyzed until
//! no member's summary changes; summaries only climb the severity
//! lattice, so iteration is bounded.

use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::ast::{Expr, Module, Spanned};
use crate::diagnostics::Error;
use crate::effects::{CompactEffect, EffectRegistry, Mfa};
use crate::inference::summary::FunctionSummary;
use crate::inference::walker::Walker;

/// The result of analyzing one module.
#[derive(Debug)]
pub struct ModuleAnalysis {
    /// Module name
    pub module: String,
    /// Per-function summaries, in source order
    pub summaries: Vec<FunctionSummary>,
    /// Local failures recorded along the way
    pub errors: Vec<Error>,
}

/// Drives per-function analysis to a fix point over a module.
#[derive(Debug)]
pub struct FixpointDriver<'r> {
    registry: &'r EffectRegistry,
}

impl<'r> FixpointDriver<'r> {
    /// Creates a driver committing into the given registry.
    pub fn new(registry: &'r EffectRegistry) -> Self {
        Self { registry }
    }

    /// Analyzes every function of a module, committing summaries to the
    /// registry as they stabilize.
    pub fn analyze_module(&self, module: &Module) -> ModuleAnalysis {
        let functions = module.functions();
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let mut index_of: HashMap<(String, u8), NodeIndex> = HashMap::new();
        let mut nodes = Vec::new();

        for (i, (key, _)) in functions.iter().enumerate() {
            let node = graph.add_node(i);
            index_of.insert(key.clone(), node);
            nodes.push(node);
        }

        for (i, (_, defs)) in functions.iter().enumerate() {
            let mut targets = Vec::new();
            for def in defs {
                if let Some(guard) = &def.guard {
                    collect_local_calls(guard, &module.name, &mut targets);
                }
                collect_local_calls(&def.body, &module.name, &mut targets);
            }
            for target in targets {
                if let Some(&node) = index_of.get(&target) {
                    graph.update_edge(nodes[i], node, ());
                }
            }
        }

        // Tarjan yields components with dependencies before dependents
        let components = tarjan_scc(&graph);
        let mut summaries_by_key: HashMap<(String, u8), FunctionSummary> = HashMap::new();
        let mut errors = Vec::new();

        for component in components {
            let recursive = component.len() > 1
                || component
                    .iter()
                    .any(|&n| graph.find_edge(n, n).is_some());

            if !recursive {
                let index = graph[component[0]];
                let (key, defs) = &functions[index];
                let summary = self.analyze_one(&module.name, defs, &mut errors);
                self.registry
                    .commit(summary.mfa.clone(), summary.effect.clone());
                summaries_by_key.insert(key.clone(), summary);
                continue;
            }

            // Seed every member at pure, then climb
            for &node in &component {
                let index = graph[node];
                let (key, _) = &functions[index];
                let mfa = Mfa::new(module.name.clone(), key.0.clone(), key.1);
                self.registry.commit(mfa, CompactEffect::Pure);
            }

            let max_rounds = component.len() * 7;
            let mut round = 0;
            loop {
                round += 1;
                let mut changed = false;
                for &node in &component {
                    let index = graph[node];
                    let (key, defs) = &functions[index];
                    let summary = self.analyze_one(&module.name, defs, &mut errors);
                    let previous = self.registry.effect_of(&summary.mfa);
                    if previous.as_ref() != Some(&summary.effect) {
                        changed = true;
                    }
                    self.registry
                        .commit(summary.mfa.clone(), summary.effect.clone());
                    summaries_by_key.insert(key.clone(), summary);
                }
                if !changed || round >= max_rounds {
                    debug!(
                        "scc of {} member(s) stabilized after {round} round(s)",
                        component.len()
                    );
                    break;
                }
            }
        }

        let summaries = functions
            .iter()
            .filter_map(|(key, _)| summaries_by_key.remove(key))
            .collect();

        ModuleAnalysis {
            module: module.name.clone(),
            summaries,
            errors,
        }
    }

    fn analyze_one(
        &self,
        module: &str,
        defs: &[&crate::ast::Def],
        errors: &mut Vec<Error>,
    ) -> FunctionSummary {
        let mut walker = Walker::new(module, self.registry);
        let summary = walker.analyze_function(defs);
        errors.extend(walker.take_errors());
        summary
    }
}

/// Collects `(name, arity)` of calls that may land in the enclosing
/// module: local calls, remote calls naming the module itself, and local
/// capture references.
fn collect_local_calls(expr: &Spanned<Expr>, module: &str, out: &mut Vec<(String, u8)>) {
    match &expr.inner {
        Expr::Call { target, args } => {
            match target {
                crate::ast::CallTarget::Local(name) => {
                    out.push((name.clone(), args.len() as u8));
                }
                crate::ast::CallTarget::Remote {
                    module: target_module,
                    function,
                } => {
                    if target_module == module {
                        out.push((function.clone(), args.len() as u8));
                    }
                }
            }
            for arg in args {
                collect_local_calls(arg, module, out);
            }
        }
        Expr::CaptureRef {
            module: target_module,
            function,
            arity,
        } => {
            if target_module == module {
                out.push((function.clone(), *arity));
            }
        }
        Expr::Binding { value, .. } => collect_local_calls(value, module, out),
        Expr::Block(exprs) => {
            for sub in exprs {
                collect_local_calls(sub, module, out);
            }
        }
        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => {
            collect_local_calls(condition, module, out);
            collect_local_calls(then_branch, module, out);
            if let Some(else_branch) = else_branch {
                collect_local_calls(else_branch, module, out);
            }
        }
        Expr::Case { scrutinee, clauses } => {
            collect_local_calls(scrutinee, module, out);
            for clause in clauses {
                if let Some(guard) = &clause.guard {
                    collect_local_calls(guard, module, out);
                }
                collect_local_calls(&clause.body, module, out);
            }
        }
        Expr::Apply { fun, args } => {
            collect_local_calls(fun, module, out);
            for arg in args {
                collect_local_calls(arg, module, out);
            }
        }
        Expr::Lambda(clauses) => {
            for clause in clauses {
                if let Some(guard) = &clause.guard {
                    collect_local_calls(guard, module, out);
                }
                collect_local_calls(&clause.body, module, out);
            }
        }
        Expr::Raise { exception, message } => {
            if let crate::ast::RaiseTarget::Dynamic(value) = exception {
                collect_local_calls(value, module, out);
            }
            if let Some(message) = message {
                collect_local_calls(message, module, out);
            }
        }
        Expr::Try {
            body,
            rescues,
            after,
        } => {
            collect_local_calls(body, module, out);
            for rescue in rescues {
                collect_local_calls(&rescue.body, module, out);
            }
            if let Some(after) = after {
                collect_local_calls(after, module, out);
            }
        }
        Expr::Throw(value) | Expr::Exit(value) => collect_local_calls(value, module, out),
        Expr::Pipeline { head, stages } => {
            collect_local_calls(head, module, out);
            for stage in stages {
                // A piped stage receives one extra leading argument
                match &stage.inner {
                    Expr::Call { target, args } => {
                        match target {
                            crate::ast::CallTarget::Local(name) => {
                                out.push((name.clone(), args.len() as u8 + 1));
                            }
                            crate::ast::CallTarget::Remote {
                                module: target_module,
                                function,
                            } => {
                                if target_module == module {
                                    out.push((function.clone(), args.len() as u8 + 1));
                                }
                            }
                        }
                        for arg in args {
                            collect_local_calls(arg, module, out);
                        }
                    }
                    _ => collect_local_calls(stage, module, out),
                }
            }
        }
        Expr::ListLit(elements) | Expr::TupleLit(elements) => {
            for sub in elements {
                collect_local_calls(sub, module, out);
            }
        }
        Expr::MapLit(entries) => {
            for (key, value) in entries {
                collect_local_calls(key, module, out);
                collect_local_calls(value, module, out);
            }
        }
        Expr::StructLiteral { fields, .. } => {
            for (_, value) in fields {
                collect_local_calls(value, module, out);
            }
        }
        Expr::Comprehension { generators, body } => {
            for (_, source) in generators {
                collect_local_calls(source, module, out);
            }
            collect_local_calls(body, module, out);
        }
        Expr::Literal(_) | Expr::Var(_) | Expr::Aliases(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Def, Literal, Pattern, Visibility};
    use crate::diagnostics::{Span, spanned};

    fn sp(expr: Expr) -> Spanned<Expr> {
        spanned(expr, Span::default())
    }

    fn def(name: &str, params: Vec<Pattern>, body: Expr) -> Def {
        Def {
            visibility: Visibility::Public,
            name: name.to_string(),
            params,
            guard: None,
            body: sp(body),
            span: Span::default(),
        }
    }

    #[test]
    fn test_pure_mutual_recursion_stabilizes_pure() {
        let registry = EffectRegistry::with_builtins();
        let module = Module::new(
            "PingPong",
            vec![
                def(
                    "ping",
                    vec![Pattern::var("n")],
                    Expr::local_call("pong", vec![sp(Expr::Var("n".into()))]),
                ),
                def(
                    "pong",
                    vec![Pattern::var("n")],
                    Expr::local_call("ping", vec![sp(Expr::Var("n".into()))]),
                ),
            ],
        );
        let analysis = FixpointDriver::new(&registry).analyze_module(&module);
        assert_eq!(analysis.summaries.len(), 2);
        for summary in &analysis.summaries {
            assert_eq!(summary.effect, CompactEffect::Pure);
        }
    }

    #[test]
    fn test_effect_propagates_through_recursion() {
        let registry = EffectRegistry::with_builtins();
        // a -> b -> a, with b also writing to the console
        let module = Module::new(
            "Loud",
            vec![
                def(
                    "a",
                    vec![Pattern::var("n")],
                    Expr::local_call("b", vec![sp(Expr::Var("n".into()))]),
                ),
                def(
                    "b",
                    vec![Pattern::var("n")],
                    Expr::Block(vec![
                        sp(Expr::remote_call(
                            "IO",
                            "puts",
                            vec![sp(Expr::Var("n".into()))],
                        )),
                        sp(Expr::local_call("a", vec![sp(Expr::Var("n".into()))])),
                    ]),
                ),
            ],
        );
        let analysis = FixpointDriver::new(&registry).analyze_module(&module);
        for summary in &analysis.summaries {
            assert_eq!(
                summary.effect,
                CompactEffect::Side(vec![Mfa::new("IO", "puts", 1)]),
                "{} should carry the io effect",
                summary.mfa
            );
        }
    }

    #[test]
    fn test_callee_analyzed_before_caller() {
        let registry = EffectRegistry::with_builtins();
        let module = Module::new(
            "Layered",
            vec![
                def(
                    "outer",
                    vec![],
                    Expr::local_call("inner", vec![]),
                ),
                def(
                    "inner",
                    vec![],
                    Expr::remote_call("DateTime", "utc_now", vec![]),
                ),
            ],
        );
        let analysis = FixpointDriver::new(&registry).analyze_module(&module);
        let outer = analysis
            .summaries
            .iter()
            .find(|s| s.mfa.function == "outer")
            .unwrap();
        assert_eq!(
            outer.effect,
            CompactEffect::Dependent(vec![Mfa::new("DateTime", "utc_now", 0)])
        );
        assert!(analysis.errors.is_empty());
    }

    #[test]
    fn test_local_call_collection_sees_pipelines() {
        let expr = sp(Expr::Pipeline {
            head: Box::new(sp(Expr::Literal(Literal::Integer(1)))),
            stages: vec![sp(Expr::local_call("step", vec![]))],
        });
        let mut out = Vec::new();
        collect_local_calls(&expr, "M", &mut out);
        assert_eq!(out, vec![("step".to_string(), 1)]);
    }
}
