//! Canonical s-expression rendering.
//!
//! Every node prints in the same prefix notation the parser reads, for
//! example `(let (x 10) (add x 10))` or `(get$7$9 t)`. Output depends
//! only on the tree: no addresses, no hash-map iteration order.
//!
//! Variables print as plain names where they are referenced and as
//! `(x : Float)` where they are introduced (definition arguments,
//! lambda parameters, rule variables). A program block prints one
//! top-level form per line.

use std::fmt;

use crate::ast::{
    Assert, Block, Build, Call, Condition, Declaration, Definition, Expr, Fold, Get, Let, Literal,
    Rule, Tuple, Variable,
};
use crate::binding::{Binding, BindingPattern, Lambda};
use crate::names::ArgTypes;

/// A variable in binder position: `(x : Float)`.
struct Param<'a>(&'a Variable);

impl fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} : {})", self.0.name(), self.0.ty())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            other => write!(f, "{}", other)?,
        }
    }
    write!(f, "\"")
}

/// Writes ` a b c`, each item preceded by a space.
fn write_spaced<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for item in items {
        write!(f, " {}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Block(n) => fmt::Display::fmt(n, f),
            Expr::Literal(n) => fmt::Display::fmt(n, f),
            Expr::Variable(n) => fmt::Display::fmt(n, f),
            Expr::Let(n) => fmt::Display::fmt(n, f),
            Expr::Declaration(n) => fmt::Display::fmt(n, f),
            Expr::Call(n) => fmt::Display::fmt(n, f),
            Expr::Definition(n) => fmt::Display::fmt(n, f),
            Expr::Condition(n) => fmt::Display::fmt(n, f),
            Expr::Build(n) => fmt::Display::fmt(n, f),
            Expr::Tuple(n) => fmt::Display::fmt(n, f),
            Expr::Get(n) => fmt::Display::fmt(n, f),
            Expr::Fold(n) => fmt::Display::fmt(n, f),
            Expr::Rule(n) => fmt::Display::fmt(n, f),
            Expr::Assert(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, child) in self.children().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", child)?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ty().is_string() {
            write_quoted(f, self.value())
        } else {
            f.write_str(self.value())
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern() {
            BindingPattern::Single(var) => write!(f, "({} {})", var, self.init()),
            BindingPattern::Tuple(vars) => {
                write!(f, "((")?;
                for (i, var) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", var)?;
                }
                write!(f, ") {})", self.init())
            }
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lam {} {})", Param(self.variable()), self.body())
    }
}

impl fmt::Display for Let {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(let {} {})", self.binding(), self.body())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(edef {} {} {})",
            self.name(),
            self.return_type(),
            ArgTypes(self.arg_type())
        )
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.callee())?;
        write_spaced(f, self.operands())?;
        write!(f, ")")
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(def {} {} (",
            self.name(),
            self.declaration().return_type()
        )?;
        for (i, arg) in self.arguments().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", Param(arg))?;
        }
        write!(f, ") {})", self.body())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(if {} {} {})",
            self.cond(),
            self.then_branch(),
            self.else_branch()
        )
    }
}

impl fmt::Display for Assert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(assert {} {})", self.cond(), self.body())
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(build {} {})", self.size(), self.lambda())
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(fold {} {} {})",
            self.lambda(),
            self.init(),
            self.vector()
        )
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(tuple")?;
        write_spaced(f, self.elements())?;
        write!(f, ")")
    }
}

impl fmt::Display for Get {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(get${}${} {})", self.index(), self.bound(), self.expr())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(rule ")?;
        write_quoted(f, self.name())?;
        write!(
            f,
            " {} {} {})",
            Param(self.variable()),
            self.pattern(),
            self.result()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn test_string_literal_is_quoted() {
        assert_eq!(Literal::string("a \"b\"\n").to_string(), r#""a \"b\"\n""#);
        assert_eq!(Literal::integer(-4).to_string(), "-4");
        assert_eq!(Literal::float(2.0).unwrap().to_string(), "2.0");
    }

    #[test]
    fn test_param_form() {
        let v = Variable::new("x", Type::vector(Type::FLOAT));
        assert_eq!(Param(&v).to_string(), "(x : (Vec Float))");
        assert_eq!(v.to_string(), "x");
    }

    #[test]
    fn test_empty_tuple_and_block() {
        assert_eq!(Tuple::new(vec![]).unwrap().to_string(), "(tuple)");
        assert_eq!(Block::default().to_string(), "");
    }
}
