//! Typed syntax trees for the ksc functional IR.
//!
//! # Where this sits
//!
//! ```text
//! Source (.ks)
//!     │
//!     ▼
//! ┌──────────┐
//! │  Parser   │  builds nodes bottom-up through the constructors here
//! └────┬─────┘
//!      │  well-typed Expr tree + DeclTable
//!      ▼
//! ┌──────────┐
//! │ AD / rules│  derivative names, tangent types, rule patterns
//! └────┬─────┘
//!      │
//!      ▼
//! ┌──────────┐
//! │ Lowering  │  consumes the finished tree
//! └──────────┘
//! ```
//!
//! Only the middle column's data model lives in this crate:
//!
//! - [`types`]: the closed type language and tangent types.
//! - [`names`]: structured, derivation-aware function names and their
//!   mangled identities.
//! - [`ast`] and [`binding`]: the node kinds. Every constructor types
//!   its node from already-typed children or fails, so no tree is ever
//!   partially typed.
//! - [`decls`]: the declaration table calls resolve against.
//! - [`print`]: canonical s-expression rendering.
//! - [`derivation`]: declarations of `fwd`/`rev`/`D` derivatives.

pub mod ast;
pub mod binding;
pub mod decls;
pub mod derivation;
pub mod errors;
pub mod names;
pub mod print;
pub mod types;

pub use ast::{
    Assert, Block, Build, Call, Condition, Declaration, Definition, Expr, ExprKind, Fold, Get, Let,
    Literal, Rule, Tuple, Variable,
};
pub use binding::{Binding, BindingPattern, Lambda};
pub use decls::{DeclId, DeclTable};
pub use errors::{AstError, Locate, LocatedError, Span};
pub use names::{Signature, StructuredName};
pub use types::{Type, TypeTag};
