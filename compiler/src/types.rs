//! The ksc type system.
//!
//! A [`Type`] is a tag plus an ordered list of sub-types. Scalars
//! (`None`, `String`, `Bool`, `Integer`, `Float`) never carry sub-types;
//! compounds always do:
//!
//! | tag      | sub-types                  | rendering          |
//! |----------|----------------------------|--------------------|
//! | `Tuple`  | any number                 | `(Tuple T₁ … Tₙ)`  |
//! | `Vector` | exactly one (the element)  | `(Vec T)`          |
//! | `Lambda` | exactly two (arg, result)  | `(Lam S T)`        |
//! | `LM`     | exactly two (arg, result)  | `(LM S T)`         |
//!
//! Equality and ordering are structural. Types are small immutable
//! values and are cloned freely.
//!
//! # Tangent types
//!
//! [`Type::tangent_type`] gives the type of the differential of a value,
//! which the AD passes use to build derivative signatures:
//!
//! ```text
//! Float        ↦ Float
//! Vec T        ↦ Vec (tangent T)
//! Tuple T₁…Tₙ  ↦ Tuple (tangent T₁)…(tangent Tₙ)
//! anything else ↦ None
//! ```

use std::fmt;

use crate::errors::AstError;

// ── Type tags ───────────────────────────────────────────────────────

/// The head of a type. Declaration order is the ordering used by
/// [`Type`]'s `Ord`: scalars sort before compounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    None,
    String,
    Bool,
    Integer,
    Float,
    Tuple,
    Vector,
    Lambda,
    /// Linear map. Not a valid runtime type, but AD signatures use it.
    LM,
}

impl TypeTag {
    pub fn is_scalar(self) -> bool {
        self <= TypeTag::Float
    }

    /// Number of sub-types a compound tag requires, or `None` for any.
    fn arity(self) -> Option<usize> {
        match self {
            TypeTag::Vector => Some(1),
            TypeTag::Lambda | TypeTag::LM => Some(2),
            TypeTag::Tuple => None,
            _ => Some(0),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeTag::None => "None",
            TypeTag::String => "String",
            TypeTag::Bool => "Bool",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::Tuple => "Tuple",
            TypeTag::Vector => "Vec",
            TypeTag::Lambda => "Lam",
            TypeTag::LM => "LM",
        };
        f.write_str(s)
    }
}

// ── Type representation ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Type {
    tag: TypeTag,
    sub_types: Vec<Type>,
}

impl Default for Type {
    fn default() -> Self {
        Type::NONE
    }
}

impl Type {
    pub const NONE: Type = Type::leaf(TypeTag::None);
    pub const STRING: Type = Type::leaf(TypeTag::String);
    pub const BOOL: Type = Type::leaf(TypeTag::Bool);
    pub const INTEGER: Type = Type::leaf(TypeTag::Integer);
    pub const FLOAT: Type = Type::leaf(TypeTag::Float);

    const fn leaf(tag: TypeTag) -> Type {
        Type {
            tag,
            sub_types: Vec::new(),
        }
    }

    /// Scalar constructor. Fails for compound tags.
    pub fn scalar(tag: TypeTag) -> Result<Type, AstError> {
        if !tag.is_scalar() {
            return Err(AstError::CompoundTagAsScalar { tag });
        }
        Ok(Type::leaf(tag))
    }

    /// Compound constructor. Fails for scalar tags and for sub-type
    /// lists of the wrong length.
    pub fn compound(tag: TypeTag, sub_types: Vec<Type>) -> Result<Type, AstError> {
        if tag.is_scalar() {
            return Err(AstError::ScalarTagAsCompound { tag });
        }
        if let Some(expected) = tag.arity() {
            if sub_types.len() != expected {
                return Err(AstError::CompoundArity {
                    tag,
                    expected,
                    found: sub_types.len(),
                });
            }
        }
        Ok(Type { tag, sub_types })
    }

    // The factories below cannot violate arity, so they skip the checks.

    pub fn vector(element: Type) -> Type {
        Type {
            tag: TypeTag::Vector,
            sub_types: vec![element],
        }
    }

    pub fn tuple(elements: Vec<Type>) -> Type {
        Type {
            tag: TypeTag::Tuple,
            sub_types: elements,
        }
    }

    pub fn lambda(arg: Type, result: Type) -> Type {
        Type {
            tag: TypeTag::Lambda,
            sub_types: vec![arg, result],
        }
    }

    pub fn lm(arg: Type, result: Type) -> Type {
        Type {
            tag: TypeTag::LM,
            sub_types: vec![arg, result],
        }
    }

    /// Pack a call's argument types into the single argument type used
    /// by signatures: one argument stands for itself, anything else
    /// becomes a tuple (so zero arguments is the empty tuple).
    pub fn from_args(args: &[Type]) -> Type {
        match args {
            [single] => single.clone(),
            _ => Type::tuple(args.to_vec()),
        }
    }

    // ── Predicates and accessors ────────────────────────────────────

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn is_none(&self) -> bool {
        self.tag == TypeTag::None
    }

    pub fn is_string(&self) -> bool {
        self.tag == TypeTag::String
    }

    pub fn is_scalar(&self) -> bool {
        self.tag.is_scalar()
    }

    pub fn is_vector(&self) -> bool {
        self.tag == TypeTag::Vector
    }

    pub fn is_tuple(&self) -> bool {
        self.tag == TypeTag::Tuple
    }

    pub fn is_tuple_of(&self, size: usize) -> bool {
        self.is_tuple() && self.sub_types.len() == size
    }

    pub fn sub_types(&self) -> &[Type] {
        &self.sub_types
    }

    /// Zero-based sub-type access.
    pub fn sub_type(&self, idx: usize) -> Result<&Type, AstError> {
        self.sub_types.get(idx).ok_or(AstError::IndexOutOfRange {
            what: "sub-type",
            index: idx,
            len: self.sub_types.len(),
        })
    }

    /// Element type of a vector.
    pub fn element_type(&self) -> Result<&Type, AstError> {
        match (self.tag, self.sub_types.as_slice()) {
            (TypeTag::Vector, [element]) => Ok(element),
            _ => Err(AstError::NotAVector {
                found: self.clone(),
            }),
        }
    }

    /// Type of the AD differential of a value of this type.
    pub fn tangent_type(&self) -> Type {
        match self.tag {
            TypeTag::Float => Type::FLOAT,
            TypeTag::Vector | TypeTag::Tuple => Type {
                tag: self.tag,
                sub_types: self.sub_types.iter().map(Type::tangent_type).collect(),
            },
            _ => Type::NONE,
        }
    }

    // ── Mangling ────────────────────────────────────────────────────

    /// Prefix-free code used inside mangled names. Distinct types always
    /// produce distinct codes.
    pub fn mangled(&self) -> String {
        let mut out = String::new();
        self.mangle_into(&mut out);
        out
    }

    fn mangle_into(&self, out: &mut String) {
        match self.tag {
            TypeTag::None => out.push('n'),
            TypeTag::String => out.push('s'),
            TypeTag::Bool => out.push('b'),
            TypeTag::Integer => out.push('i'),
            TypeTag::Float => out.push('f'),
            TypeTag::Vector => {
                out.push('v');
                self.mangle_subs(out);
            }
            TypeTag::Tuple => {
                out.push('<');
                self.mangle_subs(out);
                out.push('>');
            }
            TypeTag::Lambda => {
                out.push_str("l<");
                self.mangle_subs(out);
                out.push('>');
            }
            TypeTag::LM => {
                out.push_str("LM<");
                self.mangle_subs(out);
                out.push('>');
            }
        }
    }

    fn mangle_subs(&self, out: &mut String) {
        for sub in &self.sub_types {
            sub.mangle_into(out);
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            return write!(f, "{}", self.tag);
        }
        write!(f, "({}", self.tag)?;
        for sub in &self.sub_types {
            write!(f, " {}", sub)?;
        }
        write!(f, ")")
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SCALARS: [TypeTag; 5] = [
        TypeTag::None,
        TypeTag::String,
        TypeTag::Bool,
        TypeTag::Integer,
        TypeTag::Float,
    ];

    #[test]
    fn test_scalar_constructor_accepts_scalars() {
        for tag in SCALARS {
            let ty = Type::scalar(tag).unwrap();
            assert!(ty.is_scalar());
            assert!(ty.sub_types().is_empty());
            assert_eq!(ty.tag(), tag);
        }
    }

    #[test]
    fn test_scalar_constructor_rejects_compounds() {
        for tag in [TypeTag::Tuple, TypeTag::Vector, TypeTag::Lambda, TypeTag::LM] {
            assert_eq!(
                Type::scalar(tag),
                Err(AstError::CompoundTagAsScalar { tag })
            );
        }
    }

    #[test]
    fn test_compound_constructor() {
        let v = Type::compound(TypeTag::Vector, vec![Type::FLOAT]).unwrap();
        assert!(!v.is_scalar());
        assert_eq!(v, Type::vector(Type::FLOAT));

        let t = Type::compound(TypeTag::Tuple, vec![]).unwrap();
        assert!(t.is_tuple_of(0));

        let l = Type::compound(TypeTag::LM, vec![Type::FLOAT, Type::FLOAT]).unwrap();
        assert_eq!(l, Type::lm(Type::FLOAT, Type::FLOAT));
    }

    #[test]
    fn test_compound_constructor_rejects_scalars_and_bad_arity() {
        assert_eq!(
            Type::compound(TypeTag::Float, vec![Type::FLOAT]),
            Err(AstError::ScalarTagAsCompound {
                tag: TypeTag::Float
            })
        );
        assert_eq!(
            Type::compound(TypeTag::Vector, vec![]),
            Err(AstError::CompoundArity {
                tag: TypeTag::Vector,
                expected: 1,
                found: 0
            })
        );
        assert!(Type::compound(TypeTag::Lambda, vec![Type::FLOAT]).is_err());
    }

    #[test]
    fn test_tangent_of_scalars() {
        assert_eq!(Type::FLOAT.tangent_type(), Type::FLOAT);
        assert_eq!(Type::INTEGER.tangent_type(), Type::NONE);
        assert_eq!(Type::BOOL.tangent_type(), Type::NONE);
        assert_eq!(Type::STRING.tangent_type(), Type::NONE);
        assert_eq!(Type::NONE.tangent_type(), Type::NONE);
    }

    #[test]
    fn test_tangent_of_compounds() {
        let ty = Type::tuple(vec![
            Type::vector(Type::FLOAT),
            Type::INTEGER,
            Type::vector(Type::tuple(vec![Type::FLOAT, Type::BOOL])),
        ]);
        let expected = Type::tuple(vec![
            Type::vector(Type::FLOAT),
            Type::NONE,
            Type::vector(Type::tuple(vec![Type::FLOAT, Type::NONE])),
        ]);
        assert_eq!(ty.tangent_type(), expected);
        assert_eq!(
            Type::lambda(Type::FLOAT, Type::FLOAT).tangent_type(),
            Type::NONE
        );
    }

    #[test]
    fn test_predicates() {
        let t = Type::tuple(vec![Type::FLOAT, Type::INTEGER]);
        assert!(t.is_tuple());
        assert!(t.is_tuple_of(2));
        assert!(!t.is_tuple_of(3));
        assert!(!t.is_vector());
        assert!(Type::STRING.is_string());
        assert!(Type::default().is_none());
    }

    #[test]
    fn test_element_and_sub_type_access() {
        let v = Type::vector(Type::INTEGER);
        assert_eq!(v.element_type(), Ok(&Type::INTEGER));
        assert!(Type::FLOAT.element_type().is_err());
        assert_eq!(v.sub_type(0), Ok(&Type::INTEGER));
        assert_eq!(
            v.sub_type(1),
            Err(AstError::IndexOutOfRange {
                what: "sub-type",
                index: 1,
                len: 1
            })
        );
    }

    #[test]
    fn test_from_args() {
        assert_eq!(Type::from_args(&[]), Type::tuple(vec![]));
        assert_eq!(Type::from_args(&[Type::FLOAT]), Type::FLOAT);
        assert_eq!(
            Type::from_args(&[Type::FLOAT, Type::INTEGER]),
            Type::tuple(vec![Type::FLOAT, Type::INTEGER])
        );
    }

    #[test]
    fn test_ordering_is_structural() {
        assert!(Type::INTEGER < Type::FLOAT);
        assert!(Type::FLOAT < Type::tuple(vec![]));
        assert!(Type::tuple(vec![Type::BOOL]) < Type::tuple(vec![Type::FLOAT]));
        assert!(Type::tuple(vec![Type::FLOAT]) < Type::tuple(vec![Type::FLOAT, Type::BOOL]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::FLOAT.to_string(), "Float");
        assert_eq!(
            Type::tuple(vec![Type::FLOAT, Type::vector(Type::INTEGER)]).to_string(),
            "(Tuple Float (Vec Integer))"
        );
        assert_eq!(
            Type::lm(Type::FLOAT, Type::tuple(vec![])).to_string(),
            "(LM Float (Tuple))"
        );
        assert_eq!(
            Type::lambda(Type::INTEGER, Type::BOOL).to_string(),
            "(Lam Integer Bool)"
        );
    }

    #[test]
    fn test_mangled_codes_distinguish_nesting() {
        let a = Type::tuple(vec![Type::tuple(vec![Type::FLOAT]), Type::FLOAT]);
        let b = Type::tuple(vec![Type::tuple(vec![Type::FLOAT, Type::FLOAT])]);
        let c = Type::tuple(vec![Type::NONE, Type::FLOAT]);
        let d = Type::tuple(vec![Type::FLOAT]);
        assert_eq!(a.mangled(), "<<f>f>");
        assert_eq!(b.mangled(), "<<ff>>");
        assert_ne!(c.mangled(), d.mangled());
        assert_eq!(Type::vector(Type::vector(Type::FLOAT)).mangled(), "vvf");
        assert_eq!(Type::lm(Type::FLOAT, Type::INTEGER).mangled(), "LM<fi>");
        assert_eq!(Type::lambda(Type::FLOAT, Type::INTEGER).mangled(), "l<fi>");
    }
}
