//! Emission of the C translation unit.

use crate::{CodegenError, CodegenResult, NameGen};
use colang_sema::{
    Block, Expr, ExprKind, FunctionId, MethodId, Program, Stmt, TypeId, VariableId,
};
use std::collections::HashMap;
use std::fmt::Write;

/// Emits the whole program as one C translation unit.
pub fn emit(program: &Program) -> CodegenResult<String> {
    Emitter::new(program).emit()
}

struct Emitter<'p> {
    program: &'p Program,
    names: NameGen,
    type_names: HashMap<TypeId, String>,
    fn_names: HashMap<FunctionId, String>,
    method_names: HashMap<MethodId, String>,
    var_names: HashMap<VariableId, String>,
    out: String,
}

impl<'p> Emitter<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            program,
            names: NameGen::new(),
            type_names: HashMap::new(),
            fn_names: HashMap::new(),
            method_names: HashMap::new(),
            var_names: HashMap::new(),
            out: String::new(),
        }
    }

    fn emit(mut self) -> CodegenResult<String> {
        self.preamble();
        self.declare_types()?;
        self.define_native_functions()?;
        self.declare_callables()?;
        self.define_globals();
        self.define_bodies();
        self.entry_point();
        Ok(self.out)
    }

    fn preamble(&mut self) {
        self.out.push_str(
            "/* Generated by the colang compiler. Do not edit. */\n\
             #include <stdio.h>\n\
             #include <stdbool.h>\n\
             \n\
             typedef long long co_int;\n\
             typedef double co_float;\n\
             typedef bool co_bool;\n\
             typedef const char *co_string;\n\n",
        );
    }

    /// Maps native types to their registered C names and emits typedefs for
    /// user structs. CO structs carry no fields, so the typedef is a
    /// one-byte placeholder that still gives every value a distinct C type.
    fn declare_types(&mut self) -> CodegenResult<()> {
        for (index, ty) in self.program.types.iter().enumerate() {
            let id = TypeId(index as u32);
            if id == self.program.error_type {
                continue;
            }
            if ty.native {
                let c_name = match ty.name.as_str() {
                    "void" => "void",
                    "int" => "co_int",
                    "float" => "co_float",
                    "bool" => "co_bool",
                    "string" => "co_string",
                    _ => {
                        return Err(CodegenError::UnknownNativeType {
                            name: ty.name.clone(),
                        })
                    }
                };
                self.type_names.insert(id, c_name.to_string());
            } else {
                let c_name = self.names.fresh("t", &ty.name);
                let _ = writeln!(self.out, "typedef struct {{ char unused_; }} {c_name};");
                self.type_names.insert(id, c_name);
            }
        }
        self.out.push('\n');
        Ok(())
    }

    fn c_type(&self, ty: TypeId) -> String {
        self.type_names.get(&ty).cloned().unwrap_or_else(|| "int".to_string())
    }

    fn var_name(&mut self, id: VariableId) -> String {
        if let Some(name) = self.var_names.get(&id) {
            return name.clone();
        }
        let name = self.names.fresh("v", &self.program.variable(id).name);
        self.var_names.insert(id, name.clone());
        name
    }

    /// The prelude's native functions are defined here, mapped by name and
    /// parameter types onto the C runtime the preamble provides.
    fn define_native_functions(&mut self) -> CodegenResult<()> {
        for (index, function) in self.program.functions.iter().enumerate() {
            if !function.native {
                continue;
            }
            let id = FunctionId(index as u32);
            let c_name = self.names.fresh("n", &function.name);
            let param_types: Vec<String> = function
                .params
                .iter()
                .map(|&p| self.program.ty(self.program.variable(p).ty).name.clone())
                .collect();
            let param_names: Vec<String> =
                function.params.iter().map(|&p| self.var_name(p)).collect();

            let key: Vec<&str> = param_types.iter().map(String::as_str).collect();
            let body = match (function.name.as_str(), key.as_slice()) {
                ("print", ["int"]) => {
                    format!("printf(\"%lld\\n\", (long long){});", param_names[0])
                }
                ("print", ["float"]) => format!("printf(\"%g\\n\", {});", param_names[0]),
                ("print", ["string"]) => format!("printf(\"%s\\n\", {});", param_names[0]),
                ("println", []) => "printf(\"\\n\");".to_string(),
                ("readInt", []) => "long long value = 0;\n    \
                                    if (scanf(\"%lld\", &value) != 1) { value = 0; }\n    \
                                    return (co_int)value;"
                    .to_string(),
                _ => {
                    return Err(CodegenError::UnknownNativeFunction {
                        name: function.name.clone(),
                    })
                }
            };

            let signature = self.callable_signature(function.return_type, &c_name, None, &function.params);
            let _ = writeln!(self.out, "static {signature} {{\n    {body}\n}}\n");
            self.fn_names.insert(id, c_name);
        }

        for method in &self.program.methods {
            if method.native {
                return Err(CodegenError::UnknownNativeFunction {
                    name: method.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn callable_signature(
        &mut self,
        return_type: TypeId,
        c_name: &str,
        this: Option<VariableId>,
        params: &[VariableId],
    ) -> String {
        let mut parts = Vec::new();
        if let Some(this) = this {
            let ty = self.program.variable(this).ty;
            parts.push(format!("{} {}", self.c_type(ty), self.var_name(this)));
        }
        for &param in params {
            let ty = self.program.variable(param).ty;
            parts.push(format!("{} {}", self.c_type(ty), self.var_name(param)));
        }
        let params = if parts.is_empty() {
            "void".to_string()
        } else {
            parts.join(", ")
        };
        format!("{} {}({})", self.c_type(return_type), c_name, params)
    }

    /// Names every user function and method and emits forward prototypes so
    /// definition order never matters.
    fn declare_callables(&mut self) -> CodegenResult<()> {
        for (index, function) in self.program.functions.iter().enumerate() {
            if function.native {
                continue;
            }
            let id = FunctionId(index as u32);
            let c_name = self.names.fresh("f", &function.name);
            let signature =
                self.callable_signature(function.return_type, &c_name, None, &function.params);
            let _ = writeln!(self.out, "static {signature};");
            self.fn_names.insert(id, c_name);
        }
        for (index, method) in self.program.methods.iter().enumerate() {
            let id = MethodId(index as u32);
            let owner = &self.program.ty(method.owner).name;
            let c_name = self.names.fresh("m", &format!("{owner}_{}", method.name));
            let signature = self.callable_signature(
                method.return_type,
                &c_name,
                Some(method.this_var),
                &method.params,
            );
            let _ = writeln!(self.out, "static {signature};");
            self.method_names.insert(id, c_name);
        }
        self.out.push('\n');
        Ok(())
    }

    fn define_globals(&mut self) {
        // Name every global first so initializers can refer to any of them.
        for &global in &self.program.globals {
            let name = self.names.fresh("g", &self.program.variable(global).name);
            self.var_names.insert(global, name);
        }
        for &global in &self.program.globals {
            let name = self.var_names[&global].clone();
            let ty = self.c_type(self.program.variable(global).ty);
            match &self.program.variable(global).init {
                Some(init) => {
                    let init = self.expr(init);
                    let _ = writeln!(self.out, "static {ty} {name} = {init};");
                }
                None => {
                    let _ = writeln!(self.out, "static {ty} {name};");
                }
            }
        }
        if !self.program.globals.is_empty() {
            self.out.push('\n');
        }
    }

    fn define_bodies(&mut self) {
        for (index, function) in self.program.functions.iter().enumerate() {
            let id = FunctionId(index as u32);
            if let Some(body) = &function.body {
                let c_name = self.fn_names[&id].clone();
                let signature =
                    self.callable_signature(function.return_type, &c_name, None, &function.params);
                let _ = writeln!(self.out, "static {signature} {{");
                self.block_stmts(body, 1);
                self.out.push_str("}\n\n");
            }
        }
        for (index, method) in self.program.methods.iter().enumerate() {
            let id = MethodId(index as u32);
            if let Some(body) = &method.body {
                let c_name = self.method_names[&id].clone();
                let signature = self.callable_signature(
                    method.return_type,
                    &c_name,
                    Some(method.this_var),
                    &method.params,
                );
                let _ = writeln!(self.out, "static {signature} {{");
                self.block_stmts(body, 1);
                self.out.push_str("}\n\n");
            }
        }
    }

    /// Bridges the C entry point to the program's `main`, when there is one.
    fn entry_point(&mut self) {
        let main = self.program.functions.iter().enumerate().find(|(_, f)| {
            !f.native && f.name == "main" && f.params.is_empty() && f.body.is_some()
        });
        if let Some((index, function)) = main {
            let c_name = self.fn_names[&FunctionId(index as u32)].clone();
            let returns_int = self.program.ty(function.return_type).name == "int";
            if returns_int {
                let _ = writeln!(self.out, "int main(void) {{ return (int){c_name}(); }}");
            } else {
                let _ = writeln!(self.out, "int main(void) {{ {c_name}(); return 0; }}");
            }
        }
    }

    // ===== Statements and expressions =====

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block_stmts(&mut self, block: &Block, indent: usize) {
        for stmt in &block.stmts {
            self.stmt(stmt, indent);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Block(block) => {
                self.line(indent, "{");
                self.block_stmts(block, indent + 1);
                self.line(indent, "}");
            }
            Stmt::If(stmt) => {
                let cond = self.expr(&stmt.cond);
                self.line(indent, &format!("if ({cond}) {{"));
                self.stmt(&stmt.then_branch, indent + 1);
                match &stmt.else_branch {
                    Some(else_branch) => {
                        self.line(indent, "} else {");
                        self.stmt(else_branch, indent + 1);
                        self.line(indent, "}");
                    }
                    None => self.line(indent, "}"),
                }
            }
            Stmt::While(stmt) => {
                let cond = self.expr(&stmt.cond);
                self.line(indent, &format!("while ({cond}) {{"));
                self.stmt(&stmt.body, indent + 1);
                self.line(indent, "}");
            }
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => {
                    let value = self.expr(value);
                    self.line(indent, &format!("return {value};"));
                }
                None => self.line(indent, "return;"),
            },
            Stmt::VarDef(def) => {
                let ty = self.c_type(self.program.variable(def.variable).ty);
                let name = self.var_name(def.variable);
                match &def.init {
                    Some(init) => {
                        let init = self.expr(init);
                        self.line(indent, &format!("{ty} {name} = {init};"));
                    }
                    None => self.line(indent, &format!("{ty} {name};")),
                }
            }
            Stmt::Expr(expr) => {
                let expr = self.expr(expr);
                self.line(indent, &format!("{expr};"));
            }
        }
    }

    /// Renders an expression fully parenthesized, so CO precedence survives
    /// the trip through C untouched.
    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::IntLiteral(value) => format!("{value}LL"),
            ExprKind::FloatLiteral(value) => format!("{value:?}"),
            ExprKind::StringLiteral(value) => escape_c_string(value),
            ExprKind::VarRef(id) => self.var_name(*id),
            ExprKind::Call { function, args } => {
                let name = self.fn_names[function].clone();
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{name}({})", args.join(", "))
            }
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                let name = self.method_names[method].clone();
                let mut all = vec![self.expr(receiver)];
                all.extend(args.iter().map(|a| self.expr(a)));
                format!("{name}({})", all.join(", "))
            }
            ExprKind::Convert { value } => {
                let inner = self.expr(value);
                format!("(({}){inner})", self.c_type(expr.ty))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.expr(lhs);
                let rhs = self.expr(rhs);
                format!("({lhs} {} {rhs})", op.symbol())
            }
            ExprKind::Assign { target, value } => {
                let target = self.expr(target);
                let value = self.expr(value);
                format!("({target} = {value})")
            }
            ExprKind::Increment { target } => {
                let target = self.expr(target);
                format!("({target}++)")
            }
            // Unreachable when the front-end reported no errors; emit a
            // harmless constant so the output stays parseable regardless.
            ExprKind::Error => "0".to_string(),
        }
    }
}

fn escape_c_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use colang_diag::FileId;
    use colang_lexer::tokenize;
    use colang_parser::parse;
    use colang_sema::analyze;

    const PRELUDE: &str = "native struct void;\n\
                           native struct int;\n\
                           native struct float;\n\
                           native struct bool;\n\
                           native struct string;\n\
                           native void print(int value);\n\
                           native void print(float value);\n\
                           native void println();\n\
                           native int readInt();\n";

    fn emit_source(source: &str) -> String {
        let (prelude_tokens, _) = tokenize(FileId(0), PRELUDE);
        let (prelude, issues) = parse(&prelude_tokens);
        assert!(issues.is_empty());
        let (tokens, _) = tokenize(FileId(1), source);
        let (unit, issues) = parse(&tokens);
        assert!(issues.is_empty());
        let (program, issues) = analyze(&[&prelude, &unit]);
        assert!(issues.is_empty(), "{issues:?}");
        emit(&program).expect("emission succeeds")
    }

    #[test]
    fn hello_world_emits_a_complete_unit() {
        let c = emit_source("void main() { print(42); }");
        assert!(c.contains("#include <stdio.h>"));
        assert!(c.contains("printf(\"%lld\\n\""));
        assert!(c.contains("(42LL)"));
        assert!(c.contains("int main(void)"));
        assert!(!c.is_empty());
    }

    #[test]
    fn int_main_returns_its_value() {
        let c = emit_source("int main() { return 7; }");
        assert!(c.contains("return (int)"));
        assert!(c.contains("return 7LL;"));
    }

    #[test]
    fn conversions_become_casts() {
        let c = emit_source("void main() { float f = 1; print(f); }");
        assert!(c.contains("((co_float)1LL)"));
    }

    #[test]
    fn methods_take_the_receiver_first() {
        let c = emit_source(
            "struct Counter { int bump(int amount) { return amount + 1; } }\n\
             Counter c;\n\
             void main() { print(c.bump(41)); }",
        );
        assert!(c.contains("typedef struct"));
        // The method call passes the receiver before the arguments.
        let call_line = c
            .lines()
            .find(|l| l.contains("co_m_Counter_bump") && l.contains("co_g_c"))
            .expect("method call emitted");
        let method_pos = call_line.find("co_m_Counter_bump").unwrap();
        let receiver_pos = call_line.find("co_g_c").unwrap();
        assert!(method_pos < receiver_pos);
    }

    #[test]
    fn while_loops_and_increment() {
        let c = emit_source(
            "void main() { int i = 0; while (i < 3) { print(i); i++; } }",
        );
        assert!(c.contains("while ("));
        assert!(c.contains("++"));
    }
}
