//! The two-phase analyzer: symbol registration, then body resolution.

use crate::overload::{resolve_overload, Callee, OverloadError};
use crate::program::{
    Function, Method, Program, ScopeId, Symbol, Type, TypeId, Variable, VariableId,
};
use crate::tree;
use colang_ast as ast;
use colang_diag::{Issue, IssueCode, SourceSpan};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Analyzes translation units into one resolved program.
///
/// Units share the root namespace and are registered in order, so the caller
/// passes the prelude first and user code after it. Analysis never aborts:
/// every diagnosable problem becomes an issue and the affected expression
/// gets the absorbing error type.
pub fn analyze(units: &[&ast::TranslationUnit]) -> (Program, Vec<Issue>) {
    let mut analyzer = Analyzer::new();
    analyzer.register_types(units);
    analyzer.register_conversions();
    analyzer.cache_well_known();
    analyzer.register_signatures(units);
    analyzer.resolve_bodies();
    (analyzer.program, analyzer.issues)
}

/// A function or method body waiting for phase two.
struct PendingBody<'a> {
    scope: ScopeId,
    block: &'a ast::Block,
    callee: Callee,
}

struct Analyzer<'a> {
    program: Program,
    issues: Vec<Issue>,

    bodies: Vec<PendingBody<'a>>,
    global_inits: Vec<(VariableId, &'a ast::Expr)>,

    // Well-known prelude types, falling back to the error type when the
    // prelude does not provide them.
    void_ty: TypeId,
    int_ty: TypeId,
    float_ty: TypeId,
    bool_ty: TypeId,
    string_ty: TypeId,

    // Per-body state.
    current_return: TypeId,
    used_vars: HashSet<VariableId>,
    declared_locals: Vec<VariableId>,
}

impl<'a> Analyzer<'a> {
    fn new() -> Self {
        let program = Program::new();
        let error = program.error_type;
        Self {
            program,
            issues: Vec::new(),
            bodies: Vec::new(),
            global_inits: Vec::new(),
            void_ty: error,
            int_ty: error,
            float_ty: error,
            bool_ty: error,
            string_ty: error,
            current_return: error,
            used_vars: HashSet::new(),
            declared_locals: Vec::new(),
        }
    }

    fn error_expr(&self, span: SourceSpan) -> tree::Expr {
        tree::Expr {
            kind: tree::ExprKind::Error,
            ty: self.program.error_type,
            span,
        }
    }

    fn is_error(&self, ty: TypeId) -> bool {
        ty == self.program.error_type
    }

    // ===== Phase 1: registration =====

    fn register_types(&mut self, units: &[&'a ast::TranslationUnit]) {
        for unit in units {
            for def in &unit.defs {
                if let ast::GlobalDef::Type(def) = def {
                    self.declare_type(def);
                }
            }
        }
    }

    fn declare_type(&mut self, def: &ast::TypeDef) {
        if def.name.synthesized {
            return;
        }
        if self.report_duplicate(self.program.root_scope, &def.name) {
            return;
        }
        let id = self.program.add_type(Type {
            name: def.name.name.clone(),
            native: def.specifiers.native,
            def_span: Some(def.name.span),
            methods: IndexMap::new(),
            converts_to: Vec::new(),
        });
        self.program
            .bind(self.program.root_scope, def.name.name.clone(), Symbol::Type(id));
    }

    /// Conversions are registered while the prelude's native types are being
    /// set up; user code has no syntax for them.
    fn register_conversions(&mut self) {
        if let (Some(int), Some(float)) = (
            self.program.lookup_type("int"),
            self.program.lookup_type("float"),
        ) {
            if self.program.ty(int).native && self.program.ty(float).native {
                self.program.ty_mut(int).converts_to.push(float);
            }
        }
    }

    fn cache_well_known(&mut self) {
        let error = self.program.error_type;
        self.void_ty = self.program.lookup_type("void").unwrap_or(error);
        self.int_ty = self.program.lookup_type("int").unwrap_or(error);
        self.float_ty = self.program.lookup_type("float").unwrap_or(error);
        self.bool_ty = self.program.lookup_type("bool").unwrap_or(error);
        self.string_ty = self.program.lookup_type("string").unwrap_or(error);
    }

    fn register_signatures(&mut self, units: &[&'a ast::TranslationUnit]) {
        for unit in units {
            for def in &unit.defs {
                match def {
                    ast::GlobalDef::Type(def) => {
                        if let (Some(owner), Some(body)) =
                            (self.program.lookup_type(&def.name.name), &def.body)
                        {
                            for method in &body.methods {
                                self.declare_method(owner, method);
                            }
                        }
                    }
                    ast::GlobalDef::Function(def) => self.declare_function(def),
                    ast::GlobalDef::Variable(def) => self.declare_global(def),
                }
            }
        }
    }

    /// Resolves a parameter list into variables bound in the body scope.
    fn declare_params(&mut self, scope: ScopeId, params: &ast::ParamList) -> Vec<VariableId> {
        let mut ids = Vec::new();
        for param in &params.params {
            let ty = self.resolve_type_expr(&param.ty);
            let id = self.program.add_variable(Variable {
                name: param.name.name.clone(),
                ty,
                scope,
                def_span: param.name.span,
                init: None,
            });
            ids.push(id);
            if !param.name.synthesized {
                if !self.report_duplicate(scope, &param.name) {
                    self.program
                        .bind(scope, param.name.name.clone(), Symbol::Variable(id));
                }
            }
        }
        ids
    }

    fn declare_function(&mut self, def: &'a ast::FunctionDef) {
        if def.name.synthesized {
            return;
        }
        let return_type = self.resolve_type_expr(&def.return_type);
        let scope = self.program.new_scope(self.program.root_scope);
        let params = self.declare_params(scope, &def.params);

        // A function may share its name only with other functions whose
        // parameter types differ.
        let param_types: Vec<TypeId> =
            params.iter().map(|&p| self.program.variable(p).ty).collect();
        let bindings = self.program.bindings_in(self.program.root_scope, &def.name.name);
        let conflict = bindings.iter().copied().find(|symbol| match symbol {
            Symbol::Function(other) => {
                let other_types: Vec<TypeId> = self
                    .program
                    .function(*other)
                    .params
                    .iter()
                    .map(|&p| self.program.variable(p).ty)
                    .collect();
                other_types == param_types
            }
            _ => true,
        });
        if let Some(first) = conflict {
            self.duplicate_issue(&def.name, self.symbol_span(first));
            return;
        }

        if def.body.is_none() && !def.specifiers.native {
            self.issues.push(Issue::error(
                IssueCode::MalformedConstruct,
                def.name.span,
                format!("function '{}' has no body and is not native", def.name.name),
            ));
        }

        let id = self.program.add_function(Function {
            name: def.name.name.clone(),
            return_type,
            params,
            body: None,
            def_span: def.name.span,
            native: def.specifiers.native,
        });
        self.program
            .bind(self.program.root_scope, def.name.name.clone(), Symbol::Function(id));

        if let Some(block) = &def.body {
            self.bodies.push(PendingBody {
                scope,
                block,
                callee: Callee::Function(id),
            });
        }
    }

    fn declare_method(&mut self, owner: TypeId, def: &'a ast::FunctionDef) {
        if def.name.synthesized {
            return;
        }
        let return_type = self.resolve_type_expr(&def.return_type);
        let scope = self.program.new_scope(self.program.root_scope);

        // The receiver is visible in the body as `this`.
        let this = self.program.add_variable(Variable {
            name: "this".to_string(),
            ty: owner,
            scope,
            def_span: def.name.span,
            init: None,
        });
        self.program.bind(scope, "this", Symbol::Variable(this));

        let params = self.declare_params(scope, &def.params);
        let param_types: Vec<TypeId> =
            params.iter().map(|&p| self.program.variable(p).ty).collect();

        let duplicate = self
            .program
            .method_overloads(owner, &def.name.name)
            .iter()
            .copied()
            .find(|&other| {
                let other_types: Vec<TypeId> = self
                    .program
                    .method(other)
                    .params
                    .iter()
                    .map(|&p| self.program.variable(p).ty)
                    .collect();
                other_types == param_types
            });
        if let Some(other) = duplicate {
            let other_span = self.program.method(other).def_span;
            self.duplicate_issue(&def.name, Some(other_span));
            return;
        }

        if def.body.is_none() && !def.specifiers.native {
            self.issues.push(Issue::error(
                IssueCode::MalformedConstruct,
                def.name.span,
                format!("method '{}' has no body and is not native", def.name.name),
            ));
        }

        let id = self.program.add_method(Method {
            owner,
            name: def.name.name.clone(),
            return_type,
            this_var: this,
            params,
            body: None,
            def_span: def.name.span,
            native: def.specifiers.native,
        });
        self.program
            .ty_mut(owner)
            .methods
            .entry(def.name.name.clone())
            .or_default()
            .push(id);

        if let Some(block) = &def.body {
            self.bodies.push(PendingBody {
                scope,
                block,
                callee: Callee::Method(id),
            });
        }
    }

    fn declare_global(&mut self, def: &'a ast::VariableDef) {
        if def.name.synthesized {
            return;
        }
        if self.report_duplicate(self.program.root_scope, &def.name) {
            return;
        }
        let ty = self.resolve_type_expr(&def.ty);
        let id = self.program.add_variable(Variable {
            name: def.name.name.clone(),
            ty,
            scope: self.program.root_scope,
            def_span: def.name.span,
            init: None,
        });
        self.program
            .bind(self.program.root_scope, def.name.name.clone(), Symbol::Variable(id));
        self.program.globals.push(id);
        if let Some(init) = &def.init {
            self.global_inits.push((id, init));
        }
    }

    fn resolve_type_expr(&mut self, te: &ast::TypeExpr) -> TypeId {
        if te.name.synthesized {
            return self.program.error_type;
        }
        match self.program.lookup_type(&te.name.name) {
            Some(id) => id,
            None => {
                self.issues.push(Issue::error(
                    IssueCode::UnknownType,
                    te.span,
                    format!("unknown type '{}'", te.name.name),
                ));
                self.program.error_type
            }
        }
    }

    fn symbol_span(&self, symbol: Symbol) -> Option<SourceSpan> {
        match symbol {
            Symbol::Type(id) => self.program.ty(id).def_span,
            Symbol::Function(id) => Some(self.program.function(id).def_span),
            Symbol::Variable(id) => Some(self.program.variable(id).def_span),
        }
    }

    /// Reports a duplicate if `name` already has any binding in `scope`.
    fn report_duplicate(&mut self, scope: ScopeId, name: &ast::Ident) -> bool {
        if let Some(&first) = self.program.bindings_in(scope, &name.name).first() {
            self.duplicate_issue(name, self.symbol_span(first));
            true
        } else {
            false
        }
    }

    fn duplicate_issue(&mut self, name: &ast::Ident, first: Option<SourceSpan>) {
        self.issues.push(
            Issue::error(
                IssueCode::DuplicateSymbol,
                name.span,
                format!("duplicate definition of '{}'", name.name),
            )
            .with_note(first, "previously defined here"),
        );
    }

    // ===== Phase 2: body resolution =====

    fn resolve_bodies(&mut self) {
        let global_inits = std::mem::take(&mut self.global_inits);
        for (variable, init) in global_inits {
            let ty = self.program.variable(variable).ty;
            let init = self.resolve_expr(self.program.root_scope, init);
            let init = self.coerce_or_report(init, ty);
            self.program.variable_mut(variable).init = Some(init);
        }

        let bodies = std::mem::take(&mut self.bodies);
        for pending in bodies {
            self.current_return = match pending.callee {
                Callee::Function(id) => self.program.function(id).return_type,
                Callee::Method(id) => self.program.method(id).return_type,
            };
            self.used_vars.clear();
            self.declared_locals.clear();

            let block = self.resolve_block(pending.scope, pending.block);
            match pending.callee {
                Callee::Function(id) => self.program.function_mut(id).body = Some(block),
                Callee::Method(id) => self.program.method_mut(id).body = Some(block),
            }

            let locals = std::mem::take(&mut self.declared_locals);
            for local in locals {
                if !self.used_vars.contains(&local) {
                    let variable = self.program.variable(local);
                    self.issues.push(Issue::warning(
                        IssueCode::UnusedSymbol,
                        variable.def_span,
                        format!("unused variable '{}'", variable.name),
                    ));
                }
            }
        }
    }

    fn resolve_block(&mut self, parent: ScopeId, block: &ast::Block) -> tree::Block {
        let scope = self.program.new_scope(parent);
        let stmts = block
            .stmts
            .iter()
            .map(|stmt| self.resolve_stmt(scope, stmt))
            .collect();
        tree::Block {
            stmts,
            span: block.span,
        }
    }

    fn resolve_stmt(&mut self, scope: ScopeId, stmt: &ast::Stmt) -> tree::Stmt {
        match stmt {
            ast::Stmt::Block(block) => tree::Stmt::Block(self.resolve_block(scope, block)),

            ast::Stmt::If(stmt) => {
                let cond = self.resolve_expr(scope, &stmt.cond);
                self.check_condition(&cond);
                let then_branch = Box::new(self.resolve_stmt(scope, &stmt.then_branch));
                let else_branch = stmt
                    .else_branch
                    .as_ref()
                    .map(|s| Box::new(self.resolve_stmt(scope, s)));
                tree::Stmt::If(tree::IfStmt {
                    cond,
                    then_branch,
                    else_branch,
                    span: stmt.span,
                })
            }

            ast::Stmt::While(stmt) => {
                let cond = self.resolve_expr(scope, &stmt.cond);
                self.check_condition(&cond);
                let body = Box::new(self.resolve_stmt(scope, &stmt.body));
                tree::Stmt::While(tree::WhileStmt {
                    cond,
                    body,
                    span: stmt.span,
                })
            }

            ast::Stmt::Return(stmt) => {
                let value = stmt.value.as_ref().map(|v| {
                    let value = self.resolve_expr(scope, v);
                    if self.current_return != self.void_ty {
                        self.coerce_or_report(value, self.current_return)
                    } else {
                        value
                    }
                });
                tree::Stmt::Return(tree::ReturnStmt {
                    value,
                    span: stmt.span,
                })
            }

            ast::Stmt::VarDef(def) => self.resolve_local(scope, def),

            ast::Stmt::Expr(stmt) => tree::Stmt::Expr(self.resolve_expr(scope, &stmt.expr)),
        }
    }

    fn resolve_local(&mut self, scope: ScopeId, def: &ast::VariableDef) -> tree::Stmt {
        let ty = self.resolve_type_expr(&def.ty);
        // The initializer sees the surrounding bindings, not the new one.
        let init = def.init.as_ref().map(|init| {
            let init = self.resolve_expr(scope, init);
            self.coerce_or_report(init, ty)
        });

        if def.name.synthesized {
            return tree::Stmt::Expr(self.error_expr(def.span));
        }
        if self.report_duplicate(scope, &def.name) {
            return tree::Stmt::Expr(self.error_expr(def.span));
        }

        let id = self.program.add_variable(Variable {
            name: def.name.name.clone(),
            ty,
            scope,
            def_span: def.name.span,
            init: None,
        });
        self.program
            .bind(scope, def.name.name.clone(), Symbol::Variable(id));
        self.declared_locals.push(id);

        tree::Stmt::VarDef(tree::LocalDef {
            variable: id,
            init,
            span: def.span,
        })
    }

    fn check_condition(&mut self, cond: &tree::Expr) {
        if cond.ty != self.bool_ty && !self.is_error(cond.ty) {
            self.issues.push(Issue::error(
                IssueCode::TypeMismatch,
                cond.span,
                format!(
                    "condition must be of type 'bool', found '{}'",
                    self.program.ty(cond.ty).name
                ),
            ));
        }
    }

    /// Inserts an implicit conversion, or reports a type mismatch when none
    /// applies. Error types pass through silently.
    fn coerce_or_report(&mut self, expr: tree::Expr, to: TypeId) -> tree::Expr {
        if expr.ty == to || self.is_error(expr.ty) || self.is_error(to) {
            return expr;
        }
        if self.program.is_subtype(expr.ty, to) {
            return tree::Expr {
                span: expr.span,
                ty: to,
                kind: tree::ExprKind::Convert {
                    value: Box::new(expr),
                },
            };
        }
        self.issues.push(Issue::error(
            IssueCode::TypeMismatch,
            expr.span,
            format!(
                "expected '{}', found '{}'",
                self.program.ty(to).name,
                self.program.ty(expr.ty).name
            ),
        ));
        self.error_expr(expr.span)
    }

    // ===== Expressions =====

    fn resolve_expr(&mut self, scope: ScopeId, expr: &ast::Expr) -> tree::Expr {
        match expr {
            ast::Expr::Literal(lit) => self.resolve_literal(lit),
            ast::Expr::Var(var) => self.resolve_var(scope, var),
            ast::Expr::Call(call) => self.resolve_call(scope, call),
            ast::Expr::Member(member) => {
                // A bare member access: methods are not values in CO.
                let receiver = self.resolve_expr(scope, &member.receiver);
                if !self.is_error(receiver.ty) && !member.name.synthesized {
                    self.issues.push(Issue::error(
                        IssueCode::TypeMismatch,
                        member.span,
                        format!("method '{}' must be called", member.name.name),
                    ));
                }
                self.error_expr(member.span)
            }
            ast::Expr::Subscript(sub) => self.resolve_subscript(scope, sub),
            ast::Expr::Increment(inc) => self.resolve_increment(scope, inc),
            ast::Expr::Binary(binary) => self.resolve_binary(scope, binary),
            ast::Expr::Assign(assign) => self.resolve_assign(scope, assign),
        }
    }

    fn resolve_literal(&mut self, lit: &ast::LiteralExpr) -> tree::Expr {
        let (kind, ty) = match &lit.value {
            ast::LiteralValue::Int(v) => (tree::ExprKind::IntLiteral(*v), self.int_ty),
            ast::LiteralValue::Float(v) => (tree::ExprKind::FloatLiteral(*v), self.float_ty),
            ast::LiteralValue::Str(v) => {
                (tree::ExprKind::StringLiteral(v.clone()), self.string_ty)
            }
        };
        tree::Expr {
            kind,
            ty,
            span: lit.span,
        }
    }

    fn resolve_var(&mut self, scope: ScopeId, var: &ast::VarExpr) -> tree::Expr {
        if var.name.synthesized {
            return self.error_expr(var.span);
        }
        let symbols: Vec<Symbol> = self.program.lookup(scope, &var.name.name).to_vec();
        if symbols.is_empty() {
            self.issues.push(Issue::error(
                IssueCode::UnknownIdentifier,
                var.span,
                format!("unknown identifier '{}'", var.name.name),
            ));
            return self.error_expr(var.span);
        }
        match symbols[0] {
            Symbol::Variable(id) => {
                self.used_vars.insert(id);
                tree::Expr {
                    kind: tree::ExprKind::VarRef(id),
                    ty: self.program.variable(id).ty,
                    span: var.span,
                }
            }
            Symbol::Function(_) => {
                self.issues.push(Issue::error(
                    IssueCode::TypeMismatch,
                    var.span,
                    format!("function '{}' must be called", var.name.name),
                ));
                self.error_expr(var.span)
            }
            Symbol::Type(_) => {
                self.issues.push(Issue::error(
                    IssueCode::TypeMismatch,
                    var.span,
                    format!("type '{}' cannot be used as a value", var.name.name),
                ));
                self.error_expr(var.span)
            }
        }
    }

    fn resolve_args(&mut self, scope: ScopeId, args: &[ast::Expr]) -> Vec<tree::Expr> {
        args.iter().map(|arg| self.resolve_expr(scope, arg)).collect()
    }

    /// Applies an overload-resolution verdict, converting arguments to the
    /// winner's parameter types.
    fn apply_overload(
        &mut self,
        candidates: &[Callee],
        args: Vec<tree::Expr>,
        name: &str,
        span: SourceSpan,
    ) -> Result<(Callee, Vec<tree::Expr>), ()> {
        let arg_types: Vec<TypeId> = args.iter().map(|a| a.ty).collect();
        match resolve_overload(&self.program, candidates, &arg_types) {
            Ok(winner) => {
                let param_types = winner.param_types(&self.program);
                let args = args
                    .into_iter()
                    .zip(param_types)
                    .map(|(arg, ty)| self.coerce_or_report(arg, ty))
                    .collect();
                Ok((winner, args))
            }
            Err(OverloadError::NoMatch) => {
                self.issues.push(Issue::error(
                    IssueCode::NoMatchingOverload,
                    span,
                    format!("no matching overload for '{name}'"),
                ));
                Err(())
            }
            Err(OverloadError::Ambiguous(minima)) => {
                let mut issue = Issue::error(
                    IssueCode::AmbiguousCall,
                    span,
                    format!("ambiguous call to '{name}'"),
                );
                for candidate in &minima {
                    let candidate_span = match candidate {
                        Callee::Function(id) => self.program.function(*id).def_span,
                        Callee::Method(id) => self.program.method(*id).def_span,
                    };
                    issue = issue.with_note(Some(candidate_span), "candidate");
                }
                self.issues.push(issue);
                Err(())
            }
        }
    }

    fn resolve_call(&mut self, scope: ScopeId, call: &ast::CallExpr) -> tree::Expr {
        let args = self.resolve_args(scope, &call.args);

        match call.callee.as_ref() {
            ast::Expr::Var(var) => {
                if var.name.synthesized {
                    return self.error_expr(call.span);
                }
                let symbols: Vec<Symbol> = self.program.lookup(scope, &var.name.name).to_vec();
                if symbols.is_empty() {
                    self.issues.push(Issue::error(
                        IssueCode::UnknownIdentifier,
                        var.span,
                        format!("unknown identifier '{}'", var.name.name),
                    ));
                    return self.error_expr(call.span);
                }
                let candidates: Vec<Callee> = symbols
                    .iter()
                    .filter_map(|symbol| match symbol {
                        Symbol::Function(id) => Some(Callee::Function(*id)),
                        _ => None,
                    })
                    .collect();
                if candidates.is_empty() {
                    self.issues.push(Issue::error(
                        IssueCode::TypeMismatch,
                        var.span,
                        format!("'{}' is not a function", var.name.name),
                    ));
                    return self.error_expr(call.span);
                }
                match self.apply_overload(&candidates, args, &var.name.name, call.span) {
                    Ok((Callee::Function(function), args)) => tree::Expr {
                        ty: self.program.function(function).return_type,
                        kind: tree::ExprKind::Call { function, args },
                        span: call.span,
                    },
                    _ => self.error_expr(call.span),
                }
            }

            ast::Expr::Member(member) => {
                let receiver = self.resolve_expr(scope, &member.receiver);
                if self.is_error(receiver.ty) || member.name.synthesized {
                    return self.error_expr(call.span);
                }
                let candidates: Vec<Callee> = self
                    .program
                    .method_overloads(receiver.ty, &member.name.name)
                    .iter()
                    .map(|&id| Callee::Method(id))
                    .collect();
                if candidates.is_empty() {
                    self.issues.push(Issue::error(
                        IssueCode::UnknownIdentifier,
                        member.name.span,
                        format!(
                            "type '{}' has no method '{}'",
                            self.program.ty(receiver.ty).name,
                            member.name.name
                        ),
                    ));
                    return self.error_expr(call.span);
                }
                match self.apply_overload(&candidates, args, &member.name.name, call.span) {
                    Ok((Callee::Method(method), args)) => tree::Expr {
                        ty: self.program.method(method).return_type,
                        kind: tree::ExprKind::MethodCall {
                            receiver: Box::new(receiver),
                            method,
                            args,
                        },
                        span: call.span,
                    },
                    _ => self.error_expr(call.span),
                }
            }

            other => {
                let callee = self.resolve_expr(scope, other);
                if !self.is_error(callee.ty) {
                    self.issues.push(Issue::error(
                        IssueCode::TypeMismatch,
                        callee.span,
                        "expression is not callable",
                    ));
                }
                self.error_expr(call.span)
            }
        }
    }

    /// Subscripts resolve as calls to a `get` method on the receiver type.
    fn resolve_subscript(&mut self, scope: ScopeId, sub: &ast::SubscriptExpr) -> tree::Expr {
        let receiver = self.resolve_expr(scope, &sub.receiver);
        let index = self.resolve_expr(scope, &sub.index);
        if self.is_error(receiver.ty) {
            return self.error_expr(sub.span);
        }
        let candidates: Vec<Callee> = self
            .program
            .method_overloads(receiver.ty, "get")
            .iter()
            .map(|&id| Callee::Method(id))
            .collect();
        if candidates.is_empty() {
            self.issues.push(Issue::error(
                IssueCode::NoMatchingOverload,
                sub.span,
                format!(
                    "type '{}' cannot be subscripted",
                    self.program.ty(receiver.ty).name
                ),
            ));
            return self.error_expr(sub.span);
        }
        match self.apply_overload(&candidates, vec![index], "get", sub.span) {
            Ok((Callee::Method(method), args)) => tree::Expr {
                ty: self.program.method(method).return_type,
                kind: tree::ExprKind::MethodCall {
                    receiver: Box::new(receiver),
                    method,
                    args,
                },
                span: sub.span,
            },
            _ => self.error_expr(sub.span),
        }
    }

    fn resolve_increment(&mut self, scope: ScopeId, inc: &ast::IncrementExpr) -> tree::Expr {
        let target = self.resolve_expr(scope, &inc.receiver);
        if self.is_error(target.ty) {
            return self.error_expr(inc.span);
        }
        if !target.is_place() {
            self.issues.push(Issue::error(
                IssueCode::NotAssignable,
                target.span,
                "expression is not assignable",
            ));
            return self.error_expr(inc.span);
        }
        if target.ty != self.int_ty {
            self.issues.push(Issue::error(
                IssueCode::TypeMismatch,
                inc.span,
                format!(
                    "'++' requires an 'int' operand, found '{}'",
                    self.program.ty(target.ty).name
                ),
            ));
            return self.error_expr(inc.span);
        }
        tree::Expr {
            ty: target.ty,
            kind: tree::ExprKind::Increment {
                target: Box::new(target),
            },
            span: inc.span,
        }
    }

    fn is_numeric(&self, ty: TypeId) -> bool {
        ty == self.int_ty || ty == self.float_ty
    }

    fn resolve_binary(&mut self, scope: ScopeId, binary: &ast::BinaryExpr) -> tree::Expr {
        use ast::BinaryOp::*;

        let lhs = self.resolve_expr(scope, &binary.lhs);
        let rhs = self.resolve_expr(scope, &binary.rhs);
        if self.is_error(lhs.ty) || self.is_error(rhs.ty) {
            return self.error_expr(binary.span);
        }

        // Built-in operators over the native numeric and boolean types; a
        // mixed int/float pair converts the int side.
        let builtin = match binary.op {
            Add | Sub | Mul | Div => {
                if lhs.ty == self.int_ty && rhs.ty == self.int_ty {
                    Some((self.int_ty, self.int_ty))
                } else if self.is_numeric(lhs.ty) && self.is_numeric(rhs.ty) {
                    Some((self.float_ty, self.float_ty))
                } else {
                    None
                }
            }
            Rem => {
                if lhs.ty == self.int_ty && rhs.ty == self.int_ty {
                    Some((self.int_ty, self.int_ty))
                } else {
                    None
                }
            }
            Lt | LtEq | Gt | GtEq => {
                if lhs.ty == self.int_ty && rhs.ty == self.int_ty {
                    Some((self.int_ty, self.bool_ty))
                } else if self.is_numeric(lhs.ty) && self.is_numeric(rhs.ty) {
                    Some((self.float_ty, self.bool_ty))
                } else {
                    None
                }
            }
            Eq | NotEq => {
                if self.is_numeric(lhs.ty) && self.is_numeric(rhs.ty) {
                    let operand = if lhs.ty == rhs.ty { lhs.ty } else { self.float_ty };
                    Some((operand, self.bool_ty))
                } else if lhs.ty == rhs.ty && lhs.ty == self.bool_ty {
                    Some((self.bool_ty, self.bool_ty))
                } else {
                    None
                }
            }
            And | Or => {
                if lhs.ty == self.bool_ty && rhs.ty == self.bool_ty {
                    Some((self.bool_ty, self.bool_ty))
                } else {
                    None
                }
            }
        };

        if let Some((operand_ty, result_ty)) = builtin {
            let lhs = self.coerce_or_report(lhs, operand_ty);
            let rhs = self.coerce_or_report(rhs, operand_ty);
            return tree::Expr {
                ty: result_ty,
                kind: tree::ExprKind::Binary {
                    op: binary.op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span: binary.span,
            };
        }

        // Otherwise the operator dispatches as a method on the left operand.
        let candidates: Vec<Callee> = self
            .program
            .method_overloads(lhs.ty, binary.op.method_name())
            .iter()
            .map(|&id| Callee::Method(id))
            .collect();
        if candidates.is_empty() {
            self.issues.push(Issue::error(
                IssueCode::TypeMismatch,
                binary.span,
                format!(
                    "operator '{}' cannot be applied to '{}' and '{}'",
                    binary.op.symbol(),
                    self.program.ty(lhs.ty).name,
                    self.program.ty(rhs.ty).name
                ),
            ));
            return self.error_expr(binary.span);
        }
        match self.apply_overload(&candidates, vec![rhs], binary.op.method_name(), binary.span) {
            Ok((Callee::Method(method), args)) => tree::Expr {
                ty: self.program.method(method).return_type,
                kind: tree::ExprKind::MethodCall {
                    receiver: Box::new(lhs),
                    method,
                    args,
                },
                span: binary.span,
            },
            _ => self.error_expr(binary.span),
        }
    }

    fn resolve_assign(&mut self, scope: ScopeId, assign: &ast::AssignExpr) -> tree::Expr {
        let target = self.resolve_expr(scope, &assign.target);
        let value = self.resolve_expr(scope, &assign.value);

        if !target.is_place() && !self.is_error(target.ty) {
            self.issues.push(Issue::error(
                IssueCode::NotAssignable,
                target.span,
                "expression is not assignable",
            ));
            return self.error_expr(assign.span);
        }

        let value = self.coerce_or_report(value, target.ty);
        tree::Expr {
            ty: target.ty,
            kind: tree::ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            span: assign.span,
        }
    }
}
