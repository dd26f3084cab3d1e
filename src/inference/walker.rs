//! The bidirectional inference walker.
//!
//! Two mutually recursive judgments walk the syntax tree: synthesis
//! produces a type and an effect row, checking pushes an expected type
//! into an expression. Effects accumulate left to right in evaluation
//! order. Unification failures are recorded and analysis continues with
//! the best locally available type, so every function gets a summary.

use log::{debug, trace};

use crate::ast::{
    CallTarget, Def, Expr, LambdaClause, Pattern, RaiseTarget, Spanned, Visibility,
};
use crate::diagnostics::{Error, Span};
use crate::effects::{
    CompactEffect, EffectLabel, EffectRegistry, EffectRow, ExceptionType, Mfa, ProtocolResolver,
    Resolution, from_compact,
};
use crate::inference::classify::classify;
use crate::inference::pattern::{PatternBindings, literal_type, pattern_skeleton};
use crate::inference::summary::FunctionSummary;
use crate::types::{Substitution, Type, TypeEnv, TypeScheme, Unifier, VarSupply};

/// One analysis over one function's clauses.
///
/// The walker owns its substitution, variable supply, and scope stack;
/// the registry is the only shared collaborator and is read-only here.
#[derive(Debug)]
pub struct Walker<'r> {
    module: String,
    registry: &'r EffectRegistry,
    resolver: ProtocolResolver,
    env: TypeEnv,
    supply: VarSupply,
    substitution: Substitution,
    calls: Vec<Mfa>,
    errors: Vec<Error>,
}

struct ClauseResult {
    params: Vec<Type>,
    ret: Type,
    row: EffectRow,
}

impl<'r> Walker<'r> {
    /// Creates a walker for functions of the given module.
    pub fn new(module: impl Into<String>, registry: &'r EffectRegistry) -> Self {
        Self {
            module: module.into(),
            registry,
            resolver: ProtocolResolver::new(),
            env: TypeEnv::new(),
            supply: VarSupply::new(),
            substitution: Substitution::empty(),
            calls: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Errors recorded during analysis.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Takes the recorded errors, leaving the walker empty.
    pub fn take_errors(&mut self) -> Vec<Error> {
        std::mem::take(&mut self.errors)
    }

    /// Analyzes the clauses of one function and produces its summary.
    ///
    /// All defs must share a name and arity. Clause parameter and result
    /// types unify pairwise; clause rows combine like case branches.
    pub fn analyze_function(&mut self, defs: &[&Def]) -> FunctionSummary {
        let first = defs.first().expect("at least one clause");
        let mfa = Mfa::new(self.module.clone(), first.name.clone(), first.arity());
        debug!("analyzing {mfa}");

        let mut clauses = Vec::new();
        for def in defs {
            clauses.push(self.analyze_clause(def));
        }

        // Clause heads and results agree; rows merely combine
        for window in clauses.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            for (p1, p2) in a.params.iter().zip(b.params.iter()) {
                self.unify_or_note(p1, p2, Some(first.span));
            }
            self.unify_or_note(&a.ret, &b.ret, Some(first.span));
        }

        let mut row = EffectRow::Empty;
        for clause in &clauses {
            row = row.combine(&clause.row);
        }
        let row = self.substitution.apply_to_row(&row);

        let params: Vec<Type> = clauses[0]
            .params
            .iter()
            .map(|t| self.substitution.apply_to_type(t))
            .collect();
        let ret = self.substitution.apply_to_type(&clauses[0].ret);

        let effect = classify(&row, &self.substitution, &params);
        let fn_type = Type::function(params, row, ret);
        let scheme = TypeScheme::generalize(&self.env.free_vars(), fn_type);

        let mut calls = Vec::new();
        for call in self.calls.drain(..) {
            if !calls.contains(&call) {
                calls.push(call);
            }
        }

        let visibility = if defs.iter().any(|d| d.visibility == Visibility::Public) {
            Visibility::Public
        } else {
            Visibility::Private
        };

        FunctionSummary {
            mfa,
            effect,
            scheme,
            calls,
            visibility,
        }
    }

    fn analyze_clause(&mut self, def: &Def) -> ClauseResult {
        self.env.enter_scope();
        let mut params = Vec::new();
        for pattern in &def.params {
            params.push(self.bind_pattern(pattern, def.span));
        }
        let mut row = EffectRow::Empty;
        if let Some(guard) = &def.guard {
            let (_, guard_row) = self.synthesize(guard, &row);
            row = row.combine(&guard_row);
        }
        let (ret, body_row) = self.synthesize(&def.body, &row);
        row = row.combine(&body_row);
        self.env.exit_scope();
        ClauseResult { params, ret, row }
    }

    // ============= JUDGMENTS =============

    /// Synthesis: `Γ ⊢ e ⇒ (T, E)`.
    ///
    /// `ambient` is the effect row accumulated before this expression
    /// within the current clause; lambdas capture it.
    pub fn synthesize(&mut self, expr: &Spanned<Expr>, ambient: &EffectRow) -> (Type, EffectRow) {
        let span = expr.span;
        trace!("synthesize at {}:{}", span.line, span.column);
        match &expr.inner {
            Expr::Literal(literal) => (literal_type(literal), EffectRow::Empty),

            Expr::Var(name) => match self.env.lookup(name).cloned() {
                Some(scheme) => (scheme.instantiate(&mut self.supply), EffectRow::Empty),
                None => {
                    self.errors
                        .push(Error::unknown_identifier(name, Some(span)));
                    (
                        Type::Var(self.supply.fresh_type()),
                        EffectRow::single(EffectLabel::Unknown),
                    )
                }
            },

            Expr::Binding { pattern, value } => {
                let (value_type, row) = self.synthesize(value, ambient);
                let skeleton = self.bind_pattern(pattern, span);
                self.unify_or_note(&skeleton, &value_type, Some(span));
                (self.substitution.apply_to_type(&value_type), row)
            }

            Expr::Block(exprs) => {
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                let mut last = Type::Atom;
                for sub in exprs {
                    let (t, e) = self.synthesize(sub, &acc);
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    last = t;
                }
                (last, row)
            }

            Expr::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let (_, cond_row) = self.synthesize(condition, ambient);
                let result = Type::Var(self.supply.fresh_type());
                let acc = ambient.combine(&cond_row);
                let mut row = cond_row;
                row = row.combine(&self.check(then_branch, &result, &acc));
                match else_branch {
                    Some(else_branch) => {
                        row = row.combine(&self.check(else_branch, &result, &acc));
                    }
                    None => {
                        // A skipped branch evaluates to nil
                        self.unify_or_note(&result, &Type::Atom, Some(span));
                    }
                }
                (self.substitution.apply_to_type(&result), row)
            }

            Expr::Case { scrutinee, clauses } => {
                let (scrutinee_type, scrutinee_row) = self.synthesize(scrutinee, ambient);
                let result = Type::Var(self.supply.fresh_type());
                let acc = ambient.combine(&scrutinee_row);
                let mut row = scrutinee_row;
                for clause in clauses {
                    self.env.enter_scope();
                    let skeleton = self.bind_pattern(&clause.pattern, span);
                    self.unify_or_note(&skeleton, &scrutinee_type, Some(span));
                    if let Some(guard) = &clause.guard {
                        let (_, guard_row) = self.synthesize(guard, &acc);
                        row = row.combine(&guard_row);
                    }
                    row = row.combine(&self.check(&clause.body, &result, &acc));
                    self.env.exit_scope();
                }
                (self.substitution.apply_to_type(&result), row)
            }

            Expr::Call { target, args } => self.infer_call_with(target, None, args, span, ambient),

            Expr::Apply { fun, args } => {
                let (fun_type, fun_row) = self.synthesize(fun, ambient);
                let mut acc = ambient.combine(&fun_row);
                let mut row = fun_row;
                let mut arg_types = Vec::new();
                for arg in args {
                    let (t, e) = self.synthesize(arg, &acc);
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    arg_types.push(t);
                }
                let (result, apply_row) = self.infer_apply(&fun_type, arg_types, span);
                (result, row.combine(&apply_row))
            }

            Expr::Lambda(clauses) => self.infer_lambda(clauses, ambient, span),

            Expr::CaptureRef {
                module,
                function,
                arity,
            } => {
                let mfa = Mfa::new(module.clone(), function.clone(), *arity);
                let latent = match self.registry.effect_of(&mfa) {
                    Some(compact) => from_compact(&compact, &mut self.supply),
                    None => {
                        self.errors.push(Error::registry_miss(&mfa));
                        EffectRow::single(EffectLabel::Unknown)
                    }
                };
                let params = (0..*arity)
                    .map(|_| Type::Var(self.supply.fresh_type()))
                    .collect();
                let ret = Type::Var(self.supply.fresh_type());
                (Type::function(params, latent, ret), EffectRow::Empty)
            }

            Expr::Raise { exception, message } => {
                // The exception constructor is structural machinery, not
                // an observable call: type-check arguments without
                // recording call edges
                if let Some(message) = message {
                    self.synthesize_for_typing_only(message, ambient);
                }
                let exn = match exception {
                    RaiseTarget::Alias(module) => ExceptionType::named(module.clone()),
                    RaiseTarget::Dynamic(value) => {
                        self.synthesize_for_typing_only(value, ambient);
                        ExceptionType::Dynamic
                    }
                };
                (
                    Type::Var(self.supply.fresh_type()),
                    EffectRow::single(EffectLabel::Exception(exn)),
                )
            }

            Expr::Try {
                body,
                rescues,
                after,
            } => {
                let (body_type, body_row) = self.synthesize(body, ambient);
                let result = Type::Var(self.supply.fresh_type());
                self.unify_or_note(&body_type, &result, Some(span));

                // Each rescue clause strips exactly one matching
                // occurrence from the body's row
                let mut residual = body_row;
                for rescue in rescues {
                    if rescue.exceptions.is_empty() {
                        residual = residual.remove_one_exception(None).0;
                    } else {
                        for name in &rescue.exceptions {
                            residual = residual.remove_one_exception(Some(name)).0;
                        }
                    }
                }

                let mut row = residual;
                for rescue in rescues {
                    self.env.enter_scope();
                    if let Some(binding) = &rescue.binding {
                        let bound = match rescue.exceptions.as_slice() {
                            [single] => Type::struct_of(single.clone()),
                            _ => Type::Any,
                        };
                        self.env.bind(binding.clone(), TypeScheme::monomorphic(bound));
                    }
                    let (rescue_type, rescue_row) = self.synthesize(&rescue.body, ambient);
                    self.env.exit_scope();
                    self.unify_or_note(&rescue_type, &result, Some(span));
                    row = row.combine(&rescue_row);
                }

                if let Some(after) = after {
                    let (_, after_row) = self.synthesize(after, ambient);
                    row = row.combine(&after_row);
                }

                (self.substitution.apply_to_type(&result), row)
            }

            Expr::Throw(value) | Expr::Exit(value) => {
                let (_, row) = self.synthesize(value, ambient);
                (
                    Type::Var(self.supply.fresh_type()),
                    row.combine(&EffectRow::single(EffectLabel::Exception(
                        ExceptionType::Generic,
                    ))),
                )
            }

            Expr::Pipeline { head, stages } => {
                let (mut current, mut row) = self.synthesize(head, ambient);
                let mut acc = ambient.combine(&row);
                for stage in stages {
                    let (t, e) = match &stage.inner {
                        Expr::Call { target, args } => {
                            self.infer_call_with(target, Some(current.clone()), args, stage.span, &acc)
                        }
                        _ => {
                            // A bare function value in a pipeline applies
                            // to the piped argument
                            let (fun_type, fun_row) = self.synthesize(stage, &acc);
                            let (t, apply_row) =
                                self.infer_apply(&fun_type, vec![current.clone()], stage.span);
                            (t, fun_row.combine(&apply_row))
                        }
                    };
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    current = t;
                }
                (current, row)
            }

            Expr::ListLit(elements) => {
                let element = Type::Var(self.supply.fresh_type());
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                for sub in elements {
                    let (t, e) = self.synthesize(sub, &acc);
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    self.unify_or_note(&t, &element, Some(span));
                }
                (
                    Type::list(self.substitution.apply_to_type(&element)),
                    row,
                )
            }

            Expr::TupleLit(elements) => {
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                let mut types = Vec::new();
                for sub in elements {
                    let (t, e) = self.synthesize(sub, &acc);
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    types.push(t);
                }
                (Type::Tuple(types), row)
            }

            Expr::MapLit(entries) => {
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                for (key, value) in entries {
                    let (_, ke) = self.synthesize(key, &acc);
                    acc = acc.combine(&ke);
                    row = row.combine(&ke);
                    let (_, ve) = self.synthesize(value, &acc);
                    acc = acc.combine(&ve);
                    row = row.combine(&ve);
                }
                (Type::map_of(Type::Any, Type::Any), row)
            }

            Expr::StructLiteral { module, fields } => {
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                let mut typed_fields = Vec::new();
                for (name, value) in fields {
                    let (t, e) = self.synthesize(value, &acc);
                    acc = acc.combine(&e);
                    row = row.combine(&e);
                    typed_fields.push((name.clone(), t));
                }
                (
                    Type::Struct {
                        module: module.clone(),
                        fields: typed_fields,
                    },
                    row,
                )
            }

            Expr::Comprehension { generators, body } => {
                self.env.enter_scope();
                let mut acc = ambient.clone();
                let mut row = EffectRow::Empty;
                for (pattern, source) in generators {
                    let (source_type, source_row) = self.synthesize(source, &acc);
                    acc = acc.combine(&source_row);
                    row = row.combine(&source_row);
                    let element = match self.substitution.apply_to_type(&source_type) {
                        Type::List(element) => *element,
                        _ => Type::Any,
                    };
                    let skeleton = self.bind_pattern(pattern, span);
                    self.unify_or_note(&skeleton, &element, Some(span));
                }
                let (body_type, body_row) = self.synthesize(body, &acc);
                row = row.combine(&body_row);
                self.env.exit_scope();
                (Type::list(body_type), row)
            }

            // Module aliases are compile-time atoms; they never introduce
            // effect variables
            Expr::Aliases(_) => (Type::Atom, EffectRow::Empty),
        }
    }

    /// Checking: `Γ ⊢ e ⇐ T ⇒ E`.
    pub fn check(&mut self, expr: &Spanned<Expr>, expected: &Type, ambient: &EffectRow) -> EffectRow {
        let span = expr.span;
        let (synthesized, row) = self.synthesize(expr, ambient);
        self.unify_or_note(&synthesized, expected, Some(span));
        row
    }

    // ============= CALLS =============

    fn infer_call_with(
        &mut self,
        target: &CallTarget,
        piped: Option<Type>,
        args: &[Spanned<Expr>],
        span: Span,
        ambient: &EffectRow,
    ) -> (Type, EffectRow) {
        let mut acc = ambient.clone();
        let mut row = EffectRow::Empty;
        let mut arg_types: Vec<Type> = piped.into_iter().collect();
        for arg in args {
            let (t, e) = self.synthesize(arg, &acc);
            acc = acc.combine(&e);
            row = row.combine(&e);
            arg_types.push(t);
        }
        let arity = arg_types.len() as u8;

        match target {
            CallTarget::Local(name) => {
                let mfa = Mfa::new(self.module.clone(), name.clone(), arity);
                self.calls.push(mfa.clone());
                let call_row = self.registry_row(&mfa, &arg_types);
                (
                    Type::Var(self.supply.fresh_type()),
                    row.combine(&call_row),
                )
            }
            CallTarget::Remote { module, function } => {
                if let Some((protocol, index)) =
                    self.resolver.dispatch_site(module, function, arity)
                {
                    let (result, site_row) =
                        self.infer_dispatch(module, function, arity, protocol, index, &arg_types);
                    return (result, row.combine(&site_row));
                }

                let mfa = Mfa::new(module.clone(), function.clone(), arity);
                self.calls.push(mfa.clone());
                let call_row = self.registry_row(&mfa, &arg_types);
                let result = self.call_result_type(module, function, &arg_types, span);
                (result, row.combine(&call_row))
            }
        }
    }

    fn infer_dispatch(
        &mut self,
        module: &str,
        function: &str,
        arity: u8,
        protocol: crate::effects::Protocol,
        receiver_index: usize,
        arg_types: &[Type],
    ) -> (Type, EffectRow) {
        let entry = Mfa::new(module.to_string(), function.to_string(), arity);
        self.calls.push(entry.clone());

        let receiver = arg_types
            .get(receiver_index)
            .map(|t| self.substitution.apply_to_type(t))
            .unwrap_or(Type::Any);

        let entry_effect = self.registry.effect_of(&entry);
        let site_row = match self.resolver.resolve(protocol, &receiver) {
            Resolution::Impl(impl_mfa) => {
                let base = match self.registry.effect_of(&impl_mfa) {
                    Some(compact) => from_compact(&compact, &mut self.supply),
                    None => {
                        self.errors.push(Error::registry_miss(&impl_mfa));
                        EffectRow::single(EffectLabel::Unknown)
                    }
                };
                // The implementation's effect plus whatever the argument
                // lambdas do, plus the entry point's own effect (fetch!
                // raises regardless of the enumerable it walks)
                let mut combined = base;
                let lambda_entry = matches!(&entry_effect, Some(CompactEffect::Lambda));
                match entry_effect {
                    Some(CompactEffect::Lambda) | None => {}
                    Some(compact) => {
                        combined = combined.combine(&from_compact(&compact, &mut self.supply));
                    }
                }
                let argument_rows = if lambda_entry {
                    self.hof_argument_rows(arg_types)
                } else {
                    self.latent_arg_rows(arg_types)
                };
                for latent in argument_rows {
                    combined = combined.combine(&latent);
                }
                combined
            }
            Resolution::Unknown => EffectRow::single(EffectLabel::Unknown),
        };

        let result = self.resolver.enum_result_type(module, function, &receiver);
        (result, site_row)
    }

    fn infer_apply(&mut self, fun_type: &Type, arg_types: Vec<Type>, span: Span) -> (Type, EffectRow) {
        let resolved = self.substitution.apply_to_type(fun_type);
        match resolved {
            Type::Function {
                params,
                effects,
                ret,
            } => {
                if params.len() != arg_types.len() {
                    self.errors.push(Error::cannot_unify(
                        Type::Function {
                            params: params.clone(),
                            effects: effects.clone(),
                            ret: ret.clone(),
                        },
                        format!("function of arity {}", arg_types.len()),
                        Some(span),
                    ));
                }
                for (param, arg) in params.iter().zip(arg_types.iter()) {
                    self.unify_or_note(arg, param, Some(span));
                }
                (self.substitution.apply_to_type(&ret), effects)
            }
            Type::Closure {
                ret,
                captured,
                body,
            } => (
                self.substitution.apply_to_type(&ret),
                captured.combine(&body),
            ),
            Type::Var(_) => {
                // Applying an unconstrained value: give it a function type
                // with a fresh latent row; that row is what makes the
                // enclosing function lambda-dependent
                let latent = EffectRow::var(self.supply.fresh_effect());
                let ret = Type::Var(self.supply.fresh_type());
                let fn_type = Type::function(arg_types, latent.clone(), ret.clone());
                self.unify_or_note(&resolved, &fn_type, Some(span));
                (ret, latent)
            }
            Type::Any => (Type::Any, EffectRow::single(EffectLabel::Unknown)),
            other => {
                self.errors.push(Error::cannot_unify(
                    "a function or closure",
                    &other,
                    Some(span),
                ));
                (Type::Var(self.supply.fresh_type()), EffectRow::Empty)
            }
        }
    }

    fn infer_lambda(
        &mut self,
        clauses: &[LambdaClause],
        ambient: &EffectRow,
        span: Span,
    ) -> (Type, EffectRow) {
        if clauses.is_empty() {
            return (Type::Var(self.supply.fresh_type()), EffectRow::Empty);
        }
        let captured = ambient.normalize();
        let mut results = Vec::new();
        for clause in clauses {
            self.env.enter_scope();
            let mut params = Vec::new();
            for pattern in &clause.params {
                params.push(self.bind_pattern(pattern, span));
            }
            let mut clause_row = EffectRow::Empty;
            if let Some(guard) = &clause.guard {
                let (_, guard_row) = self.synthesize(guard, &EffectRow::Empty);
                clause_row = clause_row.combine(&guard_row);
            }
            let (ret, body_row) = self.synthesize(&clause.body, &EffectRow::Empty);
            clause_row = clause_row.combine(&body_row);
            self.env.exit_scope();
            results.push(ClauseResult {
                params,
                ret,
                row: clause_row,
            });
        }

        for window in results.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            for (p1, p2) in a.params.iter().zip(b.params.iter()) {
                self.unify_or_note(p1, p2, Some(span));
            }
            self.unify_or_note(&a.ret, &b.ret, Some(span));
        }

        let mut body_row = EffectRow::Empty;
        for clause in &results {
            body_row = body_row.combine(&clause.row);
        }
        let body_row = self.substitution.apply_to_row(&body_row);

        let params: Vec<Type> = results[0]
            .params
            .iter()
            .map(|t| self.substitution.apply_to_type(t))
            .collect();
        let ret = self.substitution.apply_to_type(&results[0].ret);

        // The lambda itself contributes no outer effect: body effects are
        // latent and captured effects already fired
        let ty = if captured.is_pure() {
            Type::function(params, body_row, ret)
        } else {
            Type::closure(ret, captured, body_row)
        };
        (ty, EffectRow::Empty)
    }

    // ============= HELPERS =============

    /// Expands a registry effect into the row a call site contributes.
    ///
    /// Lambda entries take the rows of their function arguments; with no
    /// function argument at all there is nothing latent to fire and the
    /// site contributes nothing. A registry miss degrades to `unknown`.
    fn registry_row(&mut self, mfa: &Mfa, arg_types: &[Type]) -> EffectRow {
        match self.registry.effect_of(mfa) {
            Some(CompactEffect::Lambda) => {
                let mut row = EffectRow::Empty;
                for latent in self.hof_argument_rows(arg_types) {
                    row = row.combine(&latent);
                }
                row
            }
            Some(compact) => from_compact(&compact, &mut self.supply),
            None => {
                self.errors.push(Error::registry_miss(mfa));
                EffectRow::single(EffectLabel::Unknown)
            }
        }
    }

    /// Latent rows of function-typed arguments.
    ///
    /// Captured rows of closure arguments are not re-fired: they were
    /// counted where the closure was created.
    fn latent_arg_rows(&self, arg_types: &[Type]) -> Vec<EffectRow> {
        arg_types
            .iter()
            .filter_map(|t| match self.substitution.apply_to_type(t) {
                Type::Function { effects, .. } => Some(effects),
                Type::Closure { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    /// Rows the function arguments of a lambda-registered call contribute.
    ///
    /// Concrete function arguments contribute their latent bodies. When
    /// none are present but the trailing argument is still an
    /// unconstrained variable (higher-order operations take the function
    /// last), that variable is forced to a function value whose fresh
    /// body row ties the site's effect to the parameter feeding it. With
    /// no function argument at all the result is empty.
    fn hof_argument_rows(&mut self, arg_types: &[Type]) -> Vec<EffectRow> {
        let latents = self.latent_arg_rows(arg_types);
        if !latents.is_empty() {
            return latents;
        }
        if let Some(last) = arg_types.last() {
            if matches!(self.substitution.apply_to_type(last), Type::Var(_)) {
                let body = EffectRow::var(self.supply.fresh_effect());
                let callable = Type::closure(
                    Type::Var(self.supply.fresh_type()),
                    EffectRow::Empty,
                    body.clone(),
                );
                self.unify_or_note(last, &callable, None);
                return vec![body];
            }
        }
        Vec::new()
    }

    /// Result type of a remote call, narrowed where possible.
    fn call_result_type(
        &mut self,
        module: &str,
        function: &str,
        arg_types: &[Type],
        _span: Span,
    ) -> Type {
        if let Some(narrowed) = self.resolver.known_constructor(module, function) {
            return narrowed;
        }
        if module == "MapSet" || module == "Stream" {
            let receiver = arg_types
                .first()
                .map(|t| self.substitution.apply_to_type(t))
                .unwrap_or(Type::Any);
            return self.resolver.enum_result_type(module, function, &receiver);
        }
        Type::Any
    }

    /// Synthesizes an expression for its type alone: effects and call
    /// edges are discarded.
    fn synthesize_for_typing_only(&mut self, expr: &Spanned<Expr>, ambient: &EffectRow) {
        let mark = self.calls.len();
        let _ = self.synthesize(expr, ambient);
        self.calls.truncate(mark);
    }

    fn bind_pattern(&mut self, pattern: &Pattern, span: Span) -> Type {
        let mut out = PatternBindings::new();
        let skeleton = pattern_skeleton(pattern, &mut self.supply, &mut out);
        for (name, ty) in out.bindings {
            self.env.bind(name, TypeScheme::monomorphic(ty));
        }
        for (a, b) in out.constraints {
            self.unify_or_note(&a, &b, Some(span));
        }
        skeleton
    }

    /// Unifies, recording failure as a local error and proceeding.
    fn unify_or_note(&mut self, left: &Type, right: &Type, span: Option<Span>) {
        let mut unifier = Unifier::with_substitution(self.substitution.clone(), &mut self.supply);
        match unifier.unify(left, right, span) {
            Ok(()) => self.substitution = unifier.into_substitution(),
            Err(error) => self.errors.push(*error),
        }
    }
}
