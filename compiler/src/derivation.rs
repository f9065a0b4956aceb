//! Signatures of derived functions.
//!
//! The differentiation pass turns a call to `f` into a call to one of
//! its derivatives. This module computes what that derivative is
//! declared as, from `f`'s declaration alone, using tangent types:
//!
//! | derivation | argument           | result            |
//! |------------|--------------------|-------------------|
//! | `fwd`      | `(Tuple A dA)`     | `dR`              |
//! | `rev`      | `(Tuple A dR)`     | `dA`              |
//! | `D`        | `A`                | `(LM dA dR)`      |
//!
//! where `A` is the argument type, `R` the return type and `dX` the
//! tangent type of `X`. The name is `f`'s name wrapped in the
//! derivation tag, so derivatives of derivatives stack up naturally.

use std::fmt;

use crate::ast::Declaration;
use crate::names::{Signature, StructuredName};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// Forward mode: pushes an argument tangent through to a result tangent.
    Fwd,
    /// Reverse mode: pulls a result tangent back to an argument tangent.
    Rev,
    /// The full linear map between tangent spaces.
    D,
}

impl Derivation {
    pub fn tag(self) -> &'static str {
        match self {
            Derivation::Fwd => "fwd",
            Derivation::Rev => "rev",
            Derivation::D => "D",
        }
    }

    /// Name of the derivative of `name`.
    pub fn wrap(self, name: &StructuredName) -> StructuredName {
        StructuredName::derived(self.tag(), name.clone())
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Declaration of the `derivation` of `decl`.
pub fn derive_declaration(derivation: Derivation, decl: &Declaration) -> Declaration {
    let arg = decl.arg_type();
    let ret = decl.return_type();
    let (arg_type, return_type) = match derivation {
        Derivation::Fwd => (
            Type::tuple(vec![arg.clone(), arg.tangent_type()]),
            ret.tangent_type(),
        ),
        Derivation::Rev => (
            Type::tuple(vec![arg.clone(), ret.tangent_type()]),
            arg.tangent_type(),
        ),
        Derivation::D => (
            arg.clone(),
            Type::lm(arg.tangent_type(), ret.tangent_type()),
        ),
    };
    Declaration::new(
        Signature::new(derivation.wrap(decl.name()), arg_type),
        return_type,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_float() -> Declaration {
        Declaration::new(Signature::new("to_float", Type::INTEGER), Type::FLOAT)
    }

    fn mul() -> Declaration {
        let ff = Type::tuple(vec![Type::FLOAT, Type::FLOAT]);
        Declaration::new(Signature::new("mul", ff), Type::FLOAT)
    }

    #[test]
    fn test_fwd_of_to_float() {
        let d = derive_declaration(Derivation::Fwd, &to_float());
        assert_eq!(d.name().derivations(), ["fwd"]);
        assert_eq!(d.arg_type(), &Type::tuple(vec![Type::INTEGER, Type::NONE]));
        assert_eq!(d.return_type(), &Type::FLOAT);
        assert_eq!(d.to_string(), "(edef [fwd to_float] Float (Integer None))");
    }

    #[test]
    fn test_rev_of_mul() {
        let d = derive_declaration(Derivation::Rev, &mul());
        let ff = Type::tuple(vec![Type::FLOAT, Type::FLOAT]);
        assert_eq!(d.arg_type(), &Type::tuple(vec![ff.clone(), Type::FLOAT]));
        assert_eq!(d.return_type(), &ff);
    }

    #[test]
    fn test_linear_map_of_mul() {
        let d = derive_declaration(Derivation::D, &mul());
        let ff = Type::tuple(vec![Type::FLOAT, Type::FLOAT]);
        assert_eq!(d.arg_type(), &ff);
        assert_eq!(d.return_type(), &Type::lm(ff, Type::FLOAT));
    }

    #[test]
    fn test_derivatives_stack() {
        let fwd = derive_declaration(Derivation::Fwd, &mul());
        let rev_fwd = derive_declaration(Derivation::Rev, &fwd);
        assert_eq!(rev_fwd.name().derivations(), ["rev", "fwd"]);
        assert_ne!(rev_fwd.mangled_name(), fwd.mangled_name());
        assert!(rev_fwd.mangled_name().starts_with("rev$fwd$mul@"));
    }
}
