//! Top-level definition nodes.

use crate::{Block, Expr, Ident};
use colang_diag::SourceSpan;

/// An entire source file: an ordered sequence of global definitions.
#[derive(Clone, Debug)]
pub struct TranslationUnit {
    pub defs: Vec<GlobalDef>,
    pub span: SourceSpan,
}

/// A top-level symbol definition.
#[derive(Clone, Debug)]
pub enum GlobalDef {
    Type(TypeDef),
    Function(FunctionDef),
    Variable(VariableDef),
}

impl GlobalDef {
    pub fn span(&self) -> SourceSpan {
        match self {
            GlobalDef::Type(d) => d.span,
            GlobalDef::Function(d) => d.span,
            GlobalDef::Variable(d) => d.span,
        }
    }
}

/// The set of specifiers preceding a definition. Duplicates and misplaced
/// specifiers are diagnosed during parsing, so by the time a node is built
/// the set is normalized.
#[derive(Clone, Copy, Debug, Default)]
pub struct Specifiers {
    pub native: bool,
}

/// A type expression. CO types are always plain names.
#[derive(Clone, Debug)]
pub struct TypeExpr {
    pub name: Ident,
    pub span: SourceSpan,
}

/// `[specifiers] struct Name { methods }` or `[specifiers] struct Name;`
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub specifiers: Specifiers,
    pub name: Ident,
    pub body: Option<TypeBody>,
    pub span: SourceSpan,
}

/// The brace-delimited body of a type definition.
#[derive(Clone, Debug)]
pub struct TypeBody {
    pub methods: Vec<FunctionDef>,
    pub span: SourceSpan,
}

/// `[specifiers] ReturnType name(params) { body }` or `... ;` for bodiless
/// (native) functions and method headers.
#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub specifiers: Specifiers,
    pub return_type: TypeExpr,
    pub name: Ident,
    pub params: ParamList,
    pub body: Option<Block>,
    pub span: SourceSpan,
}

/// A parenthesized parameter list.
#[derive(Clone, Debug)]
pub struct ParamList {
    pub params: Vec<Param>,
    pub span: SourceSpan,
}

/// One `Type name` parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Ident,
    pub span: SourceSpan,
}

/// `Type name = init;` at global or statement position.
#[derive(Clone, Debug)]
pub struct VariableDef {
    pub ty: TypeExpr,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: SourceSpan,
}
