//! Helper structures that live inside `let`, `build` and `fold` nodes.
//!
//! Neither is an expression on its own: a [`Binding`] only appears as
//! the head of a `let`, and a [`Lambda`] only as the body of a `build`
//! or `fold`.

use crate::ast::{child_type, index_of, Expr, ExprKind, Variable};
use crate::errors::AstError;
use crate::types::Type;

// ── Binding ─────────────────────────────────────────────────────────

/// What a binding introduces: one name, or several names destructured
/// from a tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingPattern {
    /// `(x init)`
    Single(Variable),
    /// `((a b c) init)`
    Tuple(Vec<Variable>),
}

/// A variable (or tuple of variables) with its initializer.
///
/// Untyped variables take the initializer's type; typed ones must agree
/// with it. Expanding a tuple-unpacking binding into individual `get`s
/// is left to lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pattern: BindingPattern,
    init: Box<Expr>,
}

impl Binding {
    pub fn single(mut var: Variable, init: Expr) -> Result<Self, AstError> {
        let init_ty = child_type(&init)?;
        bind_variable(&mut var, init_ty)?;
        Ok(Self {
            pattern: BindingPattern::Single(var),
            init: Box::new(init),
        })
    }

    pub fn tuple(mut vars: Vec<Variable>, init: Expr) -> Result<Self, AstError> {
        if vars.is_empty() {
            return Err(AstError::EmptyTupleBinding);
        }
        let init_ty = child_type(&init)?;
        if !init_ty.is_tuple() {
            return Err(AstError::NotATuple {
                found: init_ty.clone(),
            });
        }
        if !init_ty.is_tuple_of(vars.len()) {
            return Err(AstError::TupleBindingArity {
                names: vars.len(),
                arity: init_ty.sub_types().len(),
            });
        }
        for (var, ty) in vars.iter_mut().zip(init_ty.sub_types()) {
            bind_variable(var, ty)?;
        }
        Ok(Self {
            pattern: BindingPattern::Tuple(vars),
            init: Box::new(init),
        })
    }

    pub fn pattern(&self) -> &BindingPattern {
        &self.pattern
    }

    pub fn is_tuple_unpacking(&self) -> bool {
        matches!(self.pattern, BindingPattern::Tuple(_))
    }

    /// The bound variable of a single binding.
    pub fn variable(&self) -> Option<&Variable> {
        match &self.pattern {
            BindingPattern::Single(var) => Some(var),
            BindingPattern::Tuple(_) => None,
        }
    }

    /// The bound variables of a tuple-unpacking binding.
    pub fn tuple_variables(&self) -> Option<&[Variable]> {
        match &self.pattern {
            BindingPattern::Single(_) => None,
            BindingPattern::Tuple(vars) => Some(vars),
        }
    }

    pub fn tuple_variable(&self, idx: usize) -> Result<&Variable, AstError> {
        index_of(self.tuple_variables().unwrap_or_default(), idx, "tuple variable")
    }

    /// Every name this binding brings into scope, in order.
    pub fn variables(&self) -> &[Variable] {
        match &self.pattern {
            BindingPattern::Single(var) => std::slice::from_ref(var),
            BindingPattern::Tuple(vars) => vars,
        }
    }

    pub fn init(&self) -> &Expr {
        &self.init
    }

    /// The initializer must keep its type: the bound variables were
    /// typed from it.
    pub fn init_mut(&mut self) -> &mut Expr {
        &mut self.init
    }
}

fn bind_variable(var: &mut Variable, ty: &Type) -> Result<(), AstError> {
    if !var.is_typed() {
        return var.finalize_type(ty.clone());
    }
    if var.ty() != ty {
        return Err(AstError::BindingTypeMismatch {
            name: var.name().to_string(),
            declared: var.ty().clone(),
            found: ty.clone(),
        });
    }
    Ok(())
}

// ── Lambda ──────────────────────────────────────────────────────────

/// `(lam (i : Integer) body)`: one typed parameter and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    var: Variable,
    body: Box<Expr>,
    ty: Type,
}

impl Lambda {
    pub fn new(var: Variable, body: Expr) -> Result<Self, AstError> {
        if !var.is_typed() {
            return Err(AstError::UnfinalizedType {
                kind: ExprKind::Variable,
            });
        }
        let ty = Type::lambda(var.ty().clone(), child_type(&body)?.clone());
        Ok(Self {
            var,
            body: Box::new(body),
            ty,
        })
    }

    pub fn variable(&self) -> &Variable {
        &self.var
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        &mut self.body
    }

    /// `(Lam param result)`.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn param_type(&self) -> &Type {
        self.var.ty()
    }

    pub fn result_type(&self) -> &Type {
        self.body.ty()
    }
}
