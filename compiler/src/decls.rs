//! Declaration table used by symbol resolution.
//!
//! Calls do not own or borrow the declaration they target. They hold a
//! [`DeclId`] into a `DeclTable` owned by whoever performs resolution
//! (the parser, or a transform that introduces new functions). Binding
//! a call is storing an index; rebinding is replacing it.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::ast::Declaration;
use crate::errors::AstError;
use crate::names::{Signature, StructuredName};
use crate::types::Type;

/// Handle to a declaration in a [`DeclTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declarations in registration order, indexed by signature.
#[derive(Debug, Clone, Default)]
pub struct DeclTable {
    decls: Vec<Declaration>,
    by_signature: BTreeMap<Signature, DeclId>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. Each signature may be declared once.
    pub fn insert(&mut self, decl: Declaration) -> Result<DeclId, AstError> {
        if self.by_signature.contains_key(decl.signature()) {
            return Err(AstError::DuplicateDeclaration {
                signature: decl.signature().to_string(),
            });
        }
        let id = DeclId(self.decls.len());
        debug!(%id, name = %decl.mangled_name(), "declaration registered");
        self.by_signature.insert(decl.signature().clone(), id);
        self.decls.push(decl);
        Ok(id)
    }

    pub fn get(&self, id: DeclId) -> Result<&Declaration, AstError> {
        self.decls
            .get(id.0)
            .ok_or(AstError::UnknownDeclaration { id: id.0 })
    }

    pub fn lookup(&self, signature: &Signature) -> Option<DeclId> {
        self.by_signature.get(signature).copied()
    }

    /// Find the overload of `name` that accepts `arg_type`.
    pub fn resolve(&self, name: &StructuredName, arg_type: &Type) -> Option<DeclId> {
        self.lookup(&Signature::new(name.clone(), arg_type.clone()))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls.iter().enumerate().map(|(i, d)| (DeclId(i), d))
    }
}
