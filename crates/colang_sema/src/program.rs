//! The resolved program: arenas of named entities and the scope graph.
//!
//! Entities live in flat arenas addressed by stable ids; scopes hold ids
//! rather than owning the entities, so a type, its methods and its containing
//! scope never form an ownership cycle.

use colang_diag::SourceSpan;
use indexmap::IndexMap;

use crate::tree::{Block, Expr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariableId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// A type: identity is the qualified name; natives come from the prelude.
#[derive(Debug)]
pub struct Type {
    pub name: String,
    pub native: bool,
    pub def_span: Option<SourceSpan>,
    /// Method overload sets, keyed by method name. Methods are not
    /// inherited; this table is the whole dispatch surface of the type.
    pub methods: IndexMap<String, Vec<MethodId>>,
    /// Registered one-step implicit conversion targets.
    pub converts_to: Vec<TypeId>,
}

/// A free function.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub return_type: TypeId,
    pub params: Vec<VariableId>,
    pub body: Option<Block>,
    pub def_span: SourceSpan,
    pub native: bool,
}

/// A function bound to a containing type. Not itself a named symbol; it is
/// reached through its owner's method table.
#[derive(Debug)]
pub struct Method {
    pub owner: TypeId,
    pub name: String,
    pub return_type: TypeId,
    /// The implicit receiver, visible in the body as `this`.
    pub this_var: VariableId,
    pub params: Vec<VariableId>,
    pub body: Option<Block>,
    pub def_span: SourceSpan,
    pub native: bool,
}

/// A global or local variable, or a parameter.
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub ty: TypeId,
    pub scope: ScopeId,
    pub def_span: SourceSpan,
    /// Set for globals whose initializer has been resolved.
    pub init: Option<Expr>,
}

/// What a name in a scope refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Type(TypeId),
    Function(FunctionId),
    Variable(VariableId),
}

/// A named container in the scope chain. The binding sets are ordered so
/// diagnostics and code generation are deterministic.
#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub symbols: IndexMap<String, Vec<Symbol>>,
}

/// The resolved program handed to the backend.
pub struct Program {
    pub types: Vec<Type>,
    pub functions: Vec<Function>,
    pub methods: Vec<Method>,
    pub variables: Vec<Variable>,
    pub scopes: Vec<Scope>,
    pub root_scope: ScopeId,
    /// The absorbing placeholder substituted for failed resolutions. It is
    /// `<:`-related to every type in both directions so one error never
    /// cascades.
    pub error_type: TypeId,
    /// Global variables in declaration order.
    pub globals: Vec<VariableId>,
}

impl Program {
    pub fn new() -> Self {
        let mut program = Self {
            types: Vec::new(),
            functions: Vec::new(),
            methods: Vec::new(),
            variables: Vec::new(),
            scopes: vec![Scope::default()],
            root_scope: ScopeId(0),
            error_type: TypeId(0),
            globals: Vec::new(),
        };
        program.error_type = program.add_type(Type {
            name: "<error>".to_string(),
            native: false,
            def_span: None,
            methods: IndexMap::new(),
            converts_to: Vec::new(),
        });
        program
    }

    pub fn add_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    pub fn add_method(&mut self, method: Method) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(method);
        id
    }

    pub fn add_variable(&mut self, variable: Variable) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(variable);
        id
    }

    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            symbols: IndexMap::new(),
        });
        id
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id.0 as usize]
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.0 as usize]
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.0 as usize]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut Method {
        &mut self.methods[id.0 as usize]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0 as usize]
    }

    pub fn variable_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.variables[id.0 as usize]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Adds a binding to a scope without any duplicate checking; the
    /// analyzer diagnoses duplicates before calling this.
    pub fn bind(&mut self, scope: ScopeId, name: impl Into<String>, symbol: Symbol) {
        self.scopes[scope.0 as usize]
            .symbols
            .entry(name.into())
            .or_default()
            .push(symbol);
    }

    /// Bindings for `name` in `scope` only, without walking the chain.
    pub fn bindings_in(&self, scope: ScopeId, name: &str) -> &[Symbol] {
        self.scope(scope)
            .symbols
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Walks the scope chain leaf-to-root and returns the binding set of the
    /// first scope that knows the name. The whole set is returned; overload
    /// selection happens at the use site.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> &[Symbol] {
        let mut current = Some(scope);
        while let Some(id) = current {
            let bindings = self.bindings_in(id, name);
            if !bindings.is_empty() {
                return bindings;
            }
            current = self.scope(id).parent;
        }
        &[]
    }

    /// Looks up a type by name from the root namespace.
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.lookup(self.root_scope, name)
            .iter()
            .find_map(|symbol| match symbol {
                Symbol::Type(id) => Some(*id),
                _ => None,
            })
    }

    /// The subtyping / implicit-conversion order: `a <: b` iff the types are
    /// equal, either side is the error type, or a one-step conversion from
    /// `a` to `b` is registered. Conversion chains do not compose.
    pub fn is_subtype(&self, a: TypeId, b: TypeId) -> bool {
        a == b || a == self.error_type || b == self.error_type || self.ty(a).converts_to.contains(&b)
    }

    /// The smallest common supertype of `a` and `b` under `<:`, if a unique
    /// one exists. The error type ties with every type in both directions,
    /// so it is short-circuited rather than treated as a candidate.
    pub fn least_upper_bound(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if a == self.error_type {
            return Some(b);
        }
        if b == self.error_type {
            return Some(a);
        }
        let candidates: Vec<TypeId> = (0..self.types.len() as u32)
            .map(TypeId)
            .filter(|&c| {
                c != self.error_type && self.is_subtype(a, c) && self.is_subtype(b, c)
            })
            .collect();
        let minima: Vec<TypeId> = candidates
            .iter()
            .copied()
            .filter(|&m| {
                !candidates
                    .iter()
                    .any(|&n| n != m && self.is_subtype(n, m) && !self.is_subtype(m, n))
            })
            .collect();
        match minima.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    pub fn method_overloads(&self, ty: TypeId, name: &str) -> &[MethodId] {
        self.ty(ty)
            .methods
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_type(name: &str) -> Type {
        Type {
            name: name.to_string(),
            native: true,
            def_span: None,
            methods: IndexMap::new(),
            converts_to: Vec::new(),
        }
    }

    #[test]
    fn subtyping_is_reflexive_and_follows_conversions() {
        let mut program = Program::new();
        let int = program.add_type(plain_type("int"));
        let float = program.add_type(plain_type("float"));
        program.ty_mut(int).converts_to.push(float);

        assert!(program.is_subtype(int, int));
        assert!(program.is_subtype(int, float));
        assert!(!program.is_subtype(float, int));
    }

    #[test]
    fn error_type_absorbs_both_ways() {
        let mut program = Program::new();
        let int = program.add_type(plain_type("int"));
        let error = program.error_type;
        assert!(program.is_subtype(error, int));
        assert!(program.is_subtype(int, error));
    }

    #[test]
    fn conversions_do_not_chain() {
        let mut program = Program::new();
        let a = program.add_type(plain_type("a"));
        let b = program.add_type(plain_type("b"));
        let c = program.add_type(plain_type("c"));
        program.ty_mut(a).converts_to.push(b);
        program.ty_mut(b).converts_to.push(c);
        assert!(!program.is_subtype(a, c));
    }

    #[test]
    fn least_upper_bound_of_related_types() {
        let mut program = Program::new();
        let int = program.add_type(plain_type("int"));
        let float = program.add_type(plain_type("float"));
        program.ty_mut(int).converts_to.push(float);

        assert_eq!(program.least_upper_bound(int, float), Some(float));
        assert_eq!(program.least_upper_bound(int, int), Some(int));
    }

    #[test]
    fn least_upper_bound_of_unrelated_types_is_none() {
        let mut program = Program::new();
        let a = program.add_type(plain_type("a"));
        let b = program.add_type(plain_type("b"));
        assert_eq!(program.least_upper_bound(a, b), None);
    }

    #[test]
    fn lookup_walks_the_chain_and_nearest_binding_wins() {
        let mut program = Program::new();
        let int = program.add_type(plain_type("int"));
        let root = program.root_scope;
        let inner = program.new_scope(root);
        let outer_var = program.add_variable(Variable {
            name: "x".to_string(),
            ty: int,
            scope: root,
            def_span: SourceSpan::point(colang_diag::FileId(0), 0, 0),
            init: None,
        });
        let inner_var = program.add_variable(Variable {
            name: "x".to_string(),
            ty: int,
            scope: inner,
            def_span: SourceSpan::point(colang_diag::FileId(0), 1, 0),
            init: None,
        });
        program.bind(root, "x", Symbol::Variable(outer_var));
        program.bind(inner, "x", Symbol::Variable(inner_var));

        assert_eq!(program.lookup(inner, "x"), &[Symbol::Variable(inner_var)]);
        assert_eq!(program.lookup(root, "x"), &[Symbol::Variable(outer_var)]);
        assert!(program.lookup(inner, "y").is_empty());
    }
}
