//! Call-site overload selection.
//!
//! A name lookup produces a whole overload set; this module picks the winner
//! for a concrete argument type vector. Candidates are first filtered by
//! arity and by argument-to-parameter subtyping, then narrowed to the minima
//! of the component-wise `<:` order with a pairwise dominance filter. Exact
//! matches beat converted matches for free: a converted parameter vector is
//! strictly above the exact one.

use crate::program::{FunctionId, MethodId, Program, TypeId};

/// A callable candidate in an overload set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Callee {
    Function(FunctionId),
    Method(MethodId),
}

impl Callee {
    pub fn param_types(&self, program: &Program) -> Vec<TypeId> {
        let params = match self {
            Callee::Function(id) => &program.function(*id).params,
            Callee::Method(id) => &program.method(*id).params,
        };
        params.iter().map(|&v| program.variable(v).ty).collect()
    }

    pub fn name<'p>(&self, program: &'p Program) -> &'p str {
        match self {
            Callee::Function(id) => &program.function(*id).name,
            Callee::Method(id) => &program.method(*id).name,
        }
    }
}

/// Why no single overload could be chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadError {
    /// No candidate accepts the argument types.
    NoMatch,
    /// More than one incomparable minimum survived; the call is ambiguous.
    Ambiguous(Vec<Callee>),
}

/// Picks the unique best candidate for the given argument types.
///
/// Deterministic: the same candidate set and argument vector always produce
/// the same winner or the same error.
pub fn resolve_overload(
    program: &Program,
    candidates: &[Callee],
    arg_types: &[TypeId],
) -> Result<Callee, OverloadError> {
    let applicable: Vec<(Callee, Vec<TypeId>)> = candidates
        .iter()
        .map(|&c| (c, c.param_types(program)))
        .filter(|(_, params)| {
            params.len() == arg_types.len()
                && arg_types
                    .iter()
                    .zip(params.iter())
                    .all(|(&arg, &param)| program.is_subtype(arg, param))
        })
        .collect();

    if applicable.is_empty() {
        return Err(OverloadError::NoMatch);
    }

    let below = |a: &[TypeId], b: &[TypeId]| {
        a.iter()
            .zip(b.iter())
            .all(|(&x, &y)| program.is_subtype(x, y))
    };

    let minima: Vec<Callee> = applicable
        .iter()
        .filter(|(me, params)| {
            !applicable.iter().any(|(other, other_params)| {
                other != me && below(other_params, params) && !below(params, other_params)
            })
        })
        .map(|(callee, _)| *callee)
        .collect();

    match minima.as_slice() {
        [winner] => Ok(*winner),
        _ => Err(OverloadError::Ambiguous(minima)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{Function, Symbol, Type, Variable};
    use colang_diag::{FileId, SourceSpan};
    use indexmap::IndexMap;

    fn span() -> SourceSpan {
        SourceSpan::point(FileId(0), 0, 0)
    }

    fn add_type(program: &mut Program, name: &str) -> TypeId {
        let id = program.add_type(Type {
            name: name.to_string(),
            native: false,
            def_span: None,
            methods: IndexMap::new(),
            converts_to: Vec::new(),
        });
        program.bind(program.root_scope, name, Symbol::Type(id));
        id
    }

    fn add_function(program: &mut Program, name: &str, param_types: &[TypeId]) -> Callee {
        let void = program.error_type;
        let params: Vec<_> = param_types
            .iter()
            .enumerate()
            .map(|(i, &ty)| {
                program.add_variable(Variable {
                    name: format!("p{i}"),
                    ty,
                    scope: program.root_scope,
                    def_span: span(),
                    init: None,
                })
            })
            .collect();
        let id = program.add_function(Function {
            name: name.to_string(),
            return_type: void,
            params,
            body: None,
            def_span: span(),
            native: false,
        });
        Callee::Function(id)
    }

    #[test]
    fn arity_mismatch_is_no_match() {
        let mut program = Program::new();
        let int = add_type(&mut program, "int");
        let f = add_function(&mut program, "f", &[int, int]);
        assert_eq!(
            resolve_overload(&program, &[f], &[int]),
            Err(OverloadError::NoMatch)
        );
    }

    #[test]
    fn exact_match_beats_converted_match() {
        let mut program = Program::new();
        let int = add_type(&mut program, "int");
        let float = add_type(&mut program, "float");
        program.ty_mut(int).converts_to.push(float);

        let f_int = add_function(&mut program, "f", &[int]);
        let f_float = add_function(&mut program, "f", &[float]);

        assert_eq!(
            resolve_overload(&program, &[f_int, f_float], &[int]),
            Ok(f_int)
        );
        assert_eq!(
            resolve_overload(&program, &[f_int, f_float], &[float]),
            Ok(f_float)
        );
    }

    #[test]
    fn incomparable_minima_are_ambiguous() {
        let mut program = Program::new();
        let a = add_type(&mut program, "A");
        let b = add_type(&mut program, "B");
        let c = add_type(&mut program, "C");
        program.ty_mut(c).converts_to.push(a);
        program.ty_mut(c).converts_to.push(b);

        let f_a = add_function(&mut program, "f", &[a]);
        let f_b = add_function(&mut program, "f", &[b]);

        match resolve_overload(&program, &[f_a, f_b], &[c]) {
            Err(OverloadError::Ambiguous(candidates)) => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut program = Program::new();
        let int = add_type(&mut program, "int");
        let float = add_type(&mut program, "float");
        program.ty_mut(int).converts_to.push(float);
        let f_int = add_function(&mut program, "f", &[int]);
        let f_float = add_function(&mut program, "f", &[float]);

        let first = resolve_overload(&program, &[f_int, f_float], &[int]);
        for _ in 0..10 {
            assert_eq!(resolve_overload(&program, &[f_int, f_float], &[int]), first);
        }
    }
}
