//! Invariant violations raised while building the tree, and the
//! boundary type that attaches a source location to them.
//!
//! Every constructor in this crate checks its invariants eagerly and
//! returns an [`AstError`] on failure. None of these are user errors:
//! malformed source is expected to be rejected by the parser before any
//! node is built, so an `AstError` always means an upstream pass handed
//! the core something inconsistent.
//!
//! The core has no notion of source position. A parser or transform
//! that does can wrap the failure with [`AstError::at`] (or the
//! [`Locate`] extension on results) to get a miette diagnostic with the
//! offending text underlined.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::ExprKind;
use crate::types::{Type, TypeTag};

/// Byte offset range in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

// ── Invariant violations ────────────────────────────────────────────

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum AstError {
    #[error("scalar constructor called for non-scalar type tag {tag}")]
    #[diagnostic(code(ksc::ast::compound_as_scalar))]
    CompoundTagAsScalar { tag: TypeTag },

    #[error("compound constructor called for scalar type tag {tag}")]
    #[diagnostic(code(ksc::ast::scalar_as_compound))]
    ScalarTagAsCompound { tag: TypeTag },

    #[error("{tag} takes {expected} sub-types, got {found}")]
    #[diagnostic(code(ksc::ast::compound_arity))]
    CompoundArity {
        tag: TypeTag,
        expected: usize,
        found: usize,
    },

    #[error("{what} must be Bool, found {found}")]
    #[diagnostic(code(ksc::ast::not_bool))]
    NotBool { what: &'static str, found: Type },

    #[error("condition branches disagree: {then_ty} vs {else_ty}")]
    #[diagnostic(code(ksc::ast::branch_mismatch))]
    BranchMismatch { then_ty: Type, else_ty: Type },

    #[error("expected a tuple, found {found}")]
    #[diagnostic(code(ksc::ast::not_a_tuple))]
    NotATuple { found: Type },

    #[error("expected a vector, found {found}")]
    #[diagnostic(code(ksc::ast::not_a_vector))]
    NotAVector { found: Type },

    #[error("tuple index {index} outside 1..={bound}")]
    #[diagnostic(code(ksc::ast::tuple_index))]
    TupleIndexOutOfRange { index: usize, bound: usize },

    #[error("get bound {bound} exceeds tuple size {size}")]
    #[diagnostic(code(ksc::ast::tuple_too_small))]
    TupleTooSmall { bound: usize, size: usize },

    #[error("expected {expected} node, found {found}")]
    #[diagnostic(code(ksc::ast::kind_mismatch))]
    KindMismatch { expected: ExprKind, found: ExprKind },

    #[error("{what} index {index} out of range (len {len})")]
    #[diagnostic(code(ksc::ast::index_out_of_range))]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{kind} node used before its type was finalized")]
    #[diagnostic(
        code(ksc::ast::unfinalized_type),
        help("resolve the call or type the variable before composing it")
    )]
    UnfinalizedType { kind: ExprKind },

    #[error("{kind} node already has type {current}, cannot finalize as {requested}")]
    #[diagnostic(code(ksc::ast::type_already_final))]
    TypeAlreadyFinalized {
        kind: ExprKind,
        current: Type,
        requested: Type,
    },

    #[error("block with {len} children may only appear at program top level")]
    #[diagnostic(code(ksc::ast::nested_block))]
    NestedBlock { len: usize },

    #[error("variable '{name}' has type {declared}, but is bound to {found}")]
    #[diagnostic(code(ksc::ast::binding_mismatch))]
    BindingTypeMismatch {
        name: String,
        declared: Type,
        found: Type,
    },

    #[error("tuple binding names {names} variables, initializer has {arity} elements")]
    #[diagnostic(code(ksc::ast::binding_arity))]
    TupleBindingArity { names: usize, arity: usize },

    #[error("tuple binding must name at least one variable")]
    #[diagnostic(code(ksc::ast::empty_binding))]
    EmptyTupleBinding,

    #[error("{what} must be Integer, found {found}")]
    #[diagnostic(code(ksc::ast::not_integer))]
    NotInteger { what: &'static str, found: Type },

    #[error("float literal must be finite, got {value}")]
    #[diagnostic(code(ksc::ast::non_finite_float))]
    NonFiniteFloat { value: String },

    #[error("fold {what} has type {found}, expected {expected}")]
    #[diagnostic(code(ksc::ast::fold_mismatch))]
    FoldMismatch {
        what: &'static str,
        expected: Type,
        found: Type,
    },

    #[error("no declaration with id {id}")]
    #[diagnostic(code(ksc::ast::unknown_declaration))]
    UnknownDeclaration { id: usize },

    #[error("declaration {signature} already registered")]
    #[diagnostic(code(ksc::ast::duplicate_declaration))]
    DuplicateDeclaration { signature: String },

    #[error("definition of {name} takes {expected}, arguments have {found}")]
    #[diagnostic(code(ksc::ast::definition_args))]
    DefinitionArgs {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("definition of {name} returns {expected}, body has {found}")]
    #[diagnostic(code(ksc::ast::definition_return))]
    DefinitionReturn {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("call to {callee} has type {current}, cannot rebind to a declaration returning {found}")]
    #[diagnostic(code(ksc::ast::rebind_mismatch))]
    RebindMismatch {
        callee: String,
        current: Type,
        found: Type,
    },

    #[error("rule '{name}' rewrites {pattern} into {result}")]
    #[diagnostic(code(ksc::ast::rule_mismatch))]
    RuleMismatch {
        name: String,
        pattern: Type,
        result: Type,
    },
}

impl AstError {
    /// Attach a source location to this failure. Intended for the
    /// parser/transform boundary, which knows where the node came from.
    pub fn at(self, src: &str, span: Span, label: impl Into<String>) -> LocatedError {
        LocatedError {
            error: self,
            src: src.to_string(),
            span: span.into(),
            label: label.into(),
        }
    }
}

// ── Boundary diagnostics ────────────────────────────────────────────

/// An [`AstError`] with source location information.
#[derive(Error, Debug, Diagnostic)]
#[error("{error}")]
pub struct LocatedError {
    pub error: AstError,

    #[source_code]
    pub src: String,

    #[label("{label}")]
    pub span: SourceSpan,

    pub label: String,
}

/// Result extension for locating construction failures at the boundary.
pub trait Locate<T> {
    fn located(self, src: &str, span: Span, label: &str) -> Result<T, LocatedError>;
}

impl<T> Locate<T> for Result<T, AstError> {
    fn located(self, src: &str, span: Span, label: &str) -> Result<T, LocatedError> {
        self.map_err(|e| e.at(src, span, label))
    }
}
