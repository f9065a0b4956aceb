//! Structured function names and signatures.
//!
//! A [`StructuredName`] is one of:
//!
//! ```text
//! sin                        base name
//! [pow (Tuple Float Integer)] base name + disambiguating argument type
//! [fwd [sin Float]]          derivation(s) wrapped around either of the above
//! ```
//!
//! Derivations are stored outermost first, so wrapping `[fwd f]` with
//! `rev` gives `[rev [fwd f]]` with derivations `["rev", "fwd"]`.
//!
//! The mangled form is the name's identity as a single string: it is
//! the lookup key for symbol resolution and the symbol that gets
//! emitted. Two names mangle to the same string exactly when they are
//! structurally equal, which is what lets passes compare identities by
//! string.

use std::fmt;

use crate::types::Type;

/// Separator between derivation tags and the base name.
const DERIVATION_SEP: char = '$';
/// Separator introducing a mangled type code.
const TYPE_SEP: char = '@';
const ESCAPE: char = '%';

/// Escape the mangling separators so user-chosen names can never forge
/// a different structure.
fn escape_component(component: &str, out: &mut String) {
    for c in component.chars() {
        match c {
            ESCAPE => out.push_str("%25"),
            DERIVATION_SEP => out.push_str("%24"),
            TYPE_SEP => out.push_str("%40"),
            other => out.push(other),
        }
    }
}

// ── StructuredName ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructuredName {
    /// Outermost first.
    derivations: Vec<String>,
    base_name: String,
    arg_type: Option<Type>,
}

impl StructuredName {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            derivations: Vec::new(),
            base_name: base_name.into(),
            arg_type: None,
        }
    }

    /// A base name disambiguated by argument type. `Type::NONE` counts
    /// as "no type", so `with_arg_type(f, None)` equals `new(f)`.
    pub fn with_arg_type(base_name: impl Into<String>, arg_type: Type) -> Self {
        Self {
            derivations: Vec::new(),
            base_name: base_name.into(),
            arg_type: (!arg_type.is_none()).then_some(arg_type),
        }
    }

    /// Wrap `inner` in one more derivation, which becomes the outermost.
    pub fn derived(derivation: impl Into<String>, inner: StructuredName) -> Self {
        let mut name = inner;
        name.derivations.insert(0, derivation.into());
        name
    }

    pub fn derivations(&self) -> &[String] {
        &self.derivations
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn arg_type(&self) -> Option<&Type> {
        self.arg_type.as_ref()
    }

    pub fn is_derivation(&self) -> bool {
        !self.derivations.is_empty()
    }

    pub fn has_type(&self) -> bool {
        self.arg_type.is_some()
    }

    /// `rev$fwd$f@<fi>` style identity string.
    pub fn mangled_name(&self) -> String {
        let mut out = String::new();
        for derivation in &self.derivations {
            escape_component(derivation, &mut out);
            out.push(DERIVATION_SEP);
        }
        escape_component(&self.base_name, &mut out);
        if let Some(ty) = &self.arg_type {
            out.push(TYPE_SEP);
            out.push_str(&ty.mangled());
        }
        out
    }

    fn fmt_base(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg_type {
            Some(ty) => write!(f, "[{} {}]", self.base_name, ty),
            None => write!(f, "{}", self.base_name),
        }
    }
}

impl From<&str> for StructuredName {
    fn from(base_name: &str) -> Self {
        StructuredName::new(base_name)
    }
}

impl From<String> for StructuredName {
    fn from(base_name: String) -> Self {
        StructuredName::new(base_name)
    }
}

impl fmt::Display for StructuredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for derivation in &self.derivations {
            write!(f, "[{} ", derivation)?;
        }
        self.fmt_base(f)?;
        for _ in &self.derivations {
            write!(f, "]")?;
        }
        Ok(())
    }
}

// ── Signature ───────────────────────────────────────────────────────

/// A name plus the full argument type at the call site. Overloads that
/// share a base name differ here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    pub name: StructuredName,
    pub arg_type: Type,
}

impl Signature {
    pub fn new(name: impl Into<StructuredName>, arg_type: Type) -> Self {
        Self {
            name: name.into(),
            arg_type,
        }
    }

    /// The name's mangled form followed by the argument type code. The
    /// argument code is always present, so a signature never collides
    /// with a bare name.
    pub fn mangled_name(&self) -> String {
        let mut out = self.name.mangled_name();
        out.push(TYPE_SEP);
        out.push_str(&self.arg_type.mangled());
        out
    }
}

/// Argument list rendering used by signatures and `edef`: a tuple shows
/// its elements, anything else shows as itself.
pub(crate) struct ArgTypes<'a>(pub &'a Type);

impl fmt::Display for ArgTypes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.is_tuple() {
            return write!(f, "{}", self.0);
        }
        write!(f, "(")?;
        for (i, ty) in self.0.sub_types().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, ArgTypes(&self.arg_type))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
