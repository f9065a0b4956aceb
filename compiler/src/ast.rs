//! Abstract Syntax Tree: typed nodes for the ksc IR.
//!
//! The tree is built bottom-up: leaves (literals, variables) first, then
//! every composite from children that already exist and are already
//! typed. Each constructor computes its own type from its children and
//! checks its invariants on the spot, so a tree that was built is a
//! tree that is well-typed. Later passes rely on that without
//! re-checking.
//!
//! [`Expr`] is a closed sum over the fourteen node kinds. Passes
//! dispatch with `match`; code that knows which kind it expects can use
//! the checked accessors (`as_let`, `as_call`, …), which report a
//! [`AstError::KindMismatch`] instead of guessing. Each accessor has a
//! `_mut` twin, and [`Expr::children_mut`] walks a built tree mutably,
//! which is how resolution rebinds calls nested inside it.
//!
//! Ownership is strictly a tree. The one non-owning edge, from a
//! [`Call`] to the declaration it targets, is a [`DeclId`] into an
//! externally owned [`DeclTable`].
//!
//! Two kinds of node may start life without a final type: an untyped
//! [`Variable`] (a reference whose binder is not known yet) and an
//! unresolved [`Call`]. Both get their type exactly once through
//! [`Expr::finalize_type`] or [`Call::bind`]. Composites refuse
//! children whose type is still pending.

use std::fmt;

use tracing::debug;

use crate::binding::{Binding, Lambda};
use crate::decls::{DeclId, DeclTable};
use crate::errors::AstError;
use crate::names::{Signature, StructuredName};
use crate::types::{Type, TypeTag};

// ── Node kinds ──────────────────────────────────────────────────────

/// Kind tag of an [`Expr`], for diagnostics and quick dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Block,
    Literal,
    Variable,
    Let,
    Declaration,
    Call,
    Definition,
    Condition,
    Build,
    Tuple,
    Get,
    Fold,
    Rule,
    Assert,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExprKind::Block => "block",
            ExprKind::Literal => "literal",
            ExprKind::Variable => "variable",
            ExprKind::Let => "let",
            ExprKind::Declaration => "edef",
            ExprKind::Call => "call",
            ExprKind::Definition => "def",
            ExprKind::Condition => "if",
            ExprKind::Build => "build",
            ExprKind::Tuple => "tuple",
            ExprKind::Get => "get",
            ExprKind::Fold => "fold",
            ExprKind::Rule => "rule",
            ExprKind::Assert => "assert",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Block(Block),
    Literal(Literal),
    Variable(Variable),
    Let(Let),
    Declaration(Declaration),
    Call(Call),
    Definition(Definition),
    Condition(Condition),
    Build(Build),
    Tuple(Tuple),
    Get(Get),
    Fold(Fold),
    Rule(Rule),
    Assert(Assert),
}

impl Expr {
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Block(_) => ExprKind::Block,
            Expr::Literal(_) => ExprKind::Literal,
            Expr::Variable(_) => ExprKind::Variable,
            Expr::Let(_) => ExprKind::Let,
            Expr::Declaration(_) => ExprKind::Declaration,
            Expr::Call(_) => ExprKind::Call,
            Expr::Definition(_) => ExprKind::Definition,
            Expr::Condition(_) => ExprKind::Condition,
            Expr::Build(_) => ExprKind::Build,
            Expr::Tuple(_) => ExprKind::Tuple,
            Expr::Get(_) => ExprKind::Get,
            Expr::Fold(_) => ExprKind::Fold,
            Expr::Rule(_) => ExprKind::Rule,
            Expr::Assert(_) => ExprKind::Assert,
        }
    }

    /// The node's type. A node whose type is still pending reports
    /// `None`; use [`Expr::is_type_finalized`] to tell the two apart.
    pub fn ty(&self) -> &Type {
        match self {
            Expr::Block(n) => &n.ty,
            Expr::Literal(n) => &n.ty,
            Expr::Variable(n) => n.ty(),
            Expr::Let(n) => &n.ty,
            Expr::Declaration(n) => &n.return_type,
            Expr::Call(n) => n.ty.get(),
            Expr::Definition(n) => &n.decl.return_type,
            Expr::Condition(n) => &n.ty,
            Expr::Build(n) => &n.ty,
            Expr::Tuple(n) => &n.ty,
            Expr::Get(n) => &n.ty,
            Expr::Fold(n) => &n.ty,
            Expr::Rule(_) => &PENDING,
            Expr::Assert(n) => &n.ty,
        }
    }

    pub fn is_type_finalized(&self) -> bool {
        match self {
            Expr::Variable(n) => n.is_typed(),
            Expr::Call(n) => n.ty.is_final(),
            _ => true,
        }
    }

    /// Give a pending node its type. Finalizing with the type a node
    /// already has is a no-op; any other type is rejected.
    pub fn finalize_type(&mut self, ty: Type) -> Result<(), AstError> {
        match self {
            Expr::Variable(n) => n.finalize_type(ty),
            Expr::Call(n) => n.ty.finalize(ExprKind::Call, ty),
            other if other.ty() == &ty => Ok(()),
            other => Err(AstError::TypeAlreadyFinalized {
                kind: other.kind(),
                current: other.ty().clone(),
                requested: ty,
            }),
        }
    }

    /// Direct sub-expressions in source order. Parameter-role variables
    /// (definition arguments, lambda and rule variables, binders) are
    /// reached through their owning node instead.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Block(n) => n.children.iter().collect(),
            Expr::Literal(_) | Expr::Variable(_) | Expr::Declaration(_) => Vec::new(),
            Expr::Let(n) => vec![n.binding.init(), &n.body],
            Expr::Call(n) => n.operands.iter().collect(),
            Expr::Definition(n) => vec![&n.body],
            Expr::Condition(n) => vec![&n.cond, &n.then_branch, &n.else_branch],
            Expr::Build(n) => vec![&n.size, n.lam.body()],
            Expr::Tuple(n) => n.elements.iter().collect(),
            Expr::Get(n) => vec![&n.expr],
            Expr::Fold(n) => vec![n.lam.body(), &n.init, &n.vector],
            Expr::Rule(n) => vec![&n.pattern, &n.result],
            Expr::Assert(n) => vec![&n.cond, &n.body],
        }
    }

    /// Mutable counterpart of [`Expr::children`], in the same order.
    ///
    /// This is how a pass reaches nested nodes to rebind calls or
    /// finalize types. Parents do not recompute their type, so a child
    /// replaced through one of these references must keep its type.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Block(n) => n.children.iter_mut().collect(),
            Expr::Literal(_) | Expr::Variable(_) | Expr::Declaration(_) => Vec::new(),
            Expr::Let(n) => vec![n.binding.init_mut(), &mut *n.body],
            Expr::Call(n) => n.operands.iter_mut().collect(),
            Expr::Definition(n) => vec![&mut *n.body],
            Expr::Condition(n) => vec![
                &mut *n.cond,
                &mut *n.then_branch,
                &mut *n.else_branch,
            ],
            Expr::Build(n) => vec![&mut *n.size, n.lam.body_mut()],
            Expr::Tuple(n) => n.elements.iter_mut().collect(),
            Expr::Get(n) => vec![&mut *n.expr],
            Expr::Fold(n) => vec![n.lam.body_mut(), &mut *n.init, &mut *n.vector],
            Expr::Rule(n) => vec![&mut *n.pattern, &mut *n.result],
            Expr::Assert(n) => vec![&mut *n.cond, &mut *n.body],
        }
    }

    /// Visit every call in the tree, operands before the call itself,
    /// stopping at the first error. Resolution passes bind through this.
    pub fn try_for_each_call_mut<F>(&mut self, f: &mut F) -> Result<(), AstError>
    where
        F: FnMut(&mut Call) -> Result<(), AstError>,
    {
        for child in self.children_mut() {
            child.try_for_each_call_mut(f)?;
        }
        if let Expr::Call(call) = self {
            f(call)?;
        }
        Ok(())
    }
}

/// Checked downcasts plus `From<Node> for Expr`, one set per kind.
macro_rules! node_kinds {
    ($($method:ident, $method_mut:ident => $variant:ident),* $(,)?) => {
        impl Expr {
            $(
                pub fn $method(&self) -> Result<&$variant, AstError> {
                    match self {
                        Expr::$variant(node) => Ok(node),
                        other => Err(AstError::KindMismatch {
                            expected: ExprKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }

                pub fn $method_mut(&mut self) -> Result<&mut $variant, AstError> {
                    match self {
                        Expr::$variant(node) => Ok(node),
                        other => Err(AstError::KindMismatch {
                            expected: ExprKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }
            )*
        }

        $(
            impl From<$variant> for Expr {
                fn from(node: $variant) -> Self {
                    Expr::$variant(node)
                }
            }
        )*
    };
}

node_kinds! {
    as_block, as_block_mut => Block,
    as_literal, as_literal_mut => Literal,
    as_variable, as_variable_mut => Variable,
    as_let, as_let_mut => Let,
    as_declaration, as_declaration_mut => Declaration,
    as_call, as_call_mut => Call,
    as_definition, as_definition_mut => Definition,
    as_condition, as_condition_mut => Condition,
    as_build, as_build_mut => Build,
    as_tuple, as_tuple_mut => Tuple,
    as_get, as_get_mut => Get,
    as_fold, as_fold_mut => Fold,
    as_rule, as_rule_mut => Rule,
    as_assert, as_assert_mut => Assert,
}

// ── Construction helpers ────────────────────────────────────────────

/// Reported by pending nodes, and by rules, which have no runtime type.
static PENDING: Type = Type::NONE;

/// A type that is fixed at construction, or pending until finalized once.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypeSlot(Option<Type>);

impl TypeSlot {
    fn fixed(ty: Type) -> Self {
        TypeSlot(Some(ty))
    }

    fn pending() -> Self {
        TypeSlot(None)
    }

    fn get(&self) -> &Type {
        self.0.as_ref().unwrap_or(&PENDING)
    }

    fn is_final(&self) -> bool {
        self.0.is_some()
    }

    fn finalize(&mut self, kind: ExprKind, ty: Type) -> Result<(), AstError> {
        match &self.0 {
            Some(current) if *current == ty => Ok(()),
            Some(current) => Err(AstError::TypeAlreadyFinalized {
                kind,
                current: current.clone(),
                requested: ty,
            }),
            None => {
                debug!(%kind, %ty, "type finalized");
                self.0 = Some(ty);
                Ok(())
            }
        }
    }
}

/// Type of a node about to become a child. Rejects pending types and
/// multi-child blocks, which are only valid as the program itself.
pub(crate) fn child_type(expr: &Expr) -> Result<&Type, AstError> {
    if let Expr::Block(block) = expr {
        if block.len() != 1 {
            return Err(AstError::NestedBlock { len: block.len() });
        }
    }
    if !expr.is_type_finalized() {
        return Err(AstError::UnfinalizedType { kind: expr.kind() });
    }
    Ok(expr.ty())
}

pub(crate) fn index_of<'a, T>(
    items: &'a [T],
    idx: usize,
    what: &'static str,
) -> Result<&'a T, AstError> {
    items.get(idx).ok_or(AstError::IndexOutOfRange {
        what,
        index: idx,
        len: items.len(),
    })
}

pub(crate) fn index_of_mut<'a, T>(
    items: &'a mut [T],
    idx: usize,
    what: &'static str,
) -> Result<&'a mut T, AstError> {
    let len = items.len();
    items.get_mut(idx).ok_or(AstError::IndexOutOfRange {
        what,
        index: idx,
        len,
    })
}

fn child_types(exprs: &[Expr]) -> Result<Vec<Type>, AstError> {
    exprs.iter().map(|e| child_type(e).cloned()).collect()
}

// ── Block ───────────────────────────────────────────────────────────

/// A sequence of nodes; its type is that of the last one.
///
/// A program is a block of any length. Anywhere else a block may only
/// wrap a single node (redundant parentheses), and then it simply
/// passes that node's value through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    children: Vec<Expr>,
    ty: Type,
}

impl Block {
    pub fn new(children: Vec<Expr>) -> Result<Self, AstError> {
        let types = child_types(&children)?;
        let ty = types.last().cloned().unwrap_or_default();
        Ok(Self { children, ty })
    }

    pub fn single(child: Expr) -> Result<Self, AstError> {
        Self::new(vec![child])
    }

    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Expr] {
        &mut self.children
    }

    pub fn child(&self, idx: usize) -> Result<&Expr, AstError> {
        index_of(&self.children, idx, "block child")
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

// ── Leaves ──────────────────────────────────────────────────────────

/// A constant: `"Hello"`, `10.0`, `123`, `false`. The payload is the
/// source text; the type comes from the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    value: String,
    ty: Type,
}

impl Literal {
    pub fn new(value: impl Into<String>, tag: TypeTag) -> Result<Self, AstError> {
        Ok(Self {
            value: value.into(),
            ty: Type::scalar(tag)?,
        })
    }

    pub fn integer(value: i64) -> Self {
        Self {
            value: value.to_string(),
            ty: Type::INTEGER,
        }
    }

    /// Positional decimal text with a `.`: `2.0`, `10000000000000000.0`,
    /// `0.0000001`. NaN and infinities have no literal form.
    pub fn float(value: f64) -> Result<Self, AstError> {
        if !value.is_finite() {
            return Err(AstError::NonFiniteFloat {
                value: value.to_string(),
            });
        }
        // Display never uses an exponent, but drops `.0` on whole numbers.
        let mut text = value.to_string();
        if !text.contains('.') {
            text.push_str(".0");
        }
        Ok(Self {
            value: text,
            ty: Type::FLOAT,
        })
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            value: value.to_string(),
            ty: Type::BOOL,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ty: Type::STRING,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// A named value. Plays two roles: the typed parameter `(x : Float)` in
/// binders, and a reference `x` in expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    ty: TypeSlot,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty: TypeSlot::fixed(ty),
        }
    }

    /// A variable whose type is filled in later, by its binding or by
    /// [`Variable::finalize_type`].
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeSlot::pending(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        self.ty.get()
    }

    pub fn is_typed(&self) -> bool {
        self.ty.is_final()
    }

    pub fn finalize_type(&mut self, ty: Type) -> Result<(), AstError> {
        self.ty.finalize(ExprKind::Variable, ty)
    }
}

// ── Let ─────────────────────────────────────────────────────────────

/// `(let (x 10) (add x 10))`. The bound names are visible only in the
/// body, and the let has the body's type.
#[derive(Debug, Clone, PartialEq)]
pub struct Let {
    binding: Binding,
    body: Box<Expr>,
    ty: Type,
}

impl Let {
    pub fn new(binding: Binding, body: Expr) -> Result<Self, AstError> {
        let ty = child_type(&body)?.clone();
        Ok(Self {
            binding,
            body: Box::new(body),
            ty,
        })
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        &mut self.body
    }
}

// ── Functions ───────────────────────────────────────────────────────

/// `(edef max Float (Float Float))`: a prototype for an external or
/// not-yet-defined function.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    signature: Signature,
    return_type: Type,
}

impl Declaration {
    pub fn new(signature: Signature, return_type: Type) -> Self {
        Self {
            signature,
            return_type,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn name(&self) -> &StructuredName {
        &self.signature.name
    }

    pub fn arg_type(&self) -> &Type {
        &self.signature.arg_type
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn mangled_name(&self) -> String {
        self.signature.mangled_name()
    }
}

/// `(add x 3)`, `(fwd$to_float 10 dx)`.
///
/// The call's type is its declaration's return type. Whether the
/// operands actually fit the declaration is the resolver's business.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    callee: StructuredName,
    decl: Option<DeclId>,
    operands: Vec<Expr>,
    ty: TypeSlot,
}

impl Call {
    /// A call already bound to `decl`.
    pub fn new(table: &DeclTable, decl: DeclId, operands: Vec<Expr>) -> Result<Self, AstError> {
        let target = table.get(decl)?;
        child_types(&operands)?;
        Ok(Self {
            callee: target.name().clone(),
            decl: Some(decl),
            operands,
            ty: TypeSlot::fixed(target.return_type().clone()),
        })
    }

    /// A call whose target is not known yet. Its type stays pending
    /// until [`Call::bind`] or [`Expr::finalize_type`].
    pub fn unresolved(callee: StructuredName, operands: Vec<Expr>) -> Result<Self, AstError> {
        child_types(&operands)?;
        Ok(Self {
            callee,
            decl: None,
            operands,
            ty: TypeSlot::pending(),
        })
    }

    /// Point this call at `decl`, replacing any previous target. Once
    /// the call has a type, the new target must return that same type.
    pub fn bind(&mut self, table: &DeclTable, decl: DeclId) -> Result<(), AstError> {
        let target = table.get(decl)?;
        if self.ty.is_final() && self.ty.get() != target.return_type() {
            return Err(AstError::RebindMismatch {
                callee: self.callee.to_string(),
                current: self.ty.get().clone(),
                found: target.return_type().clone(),
            });
        }
        self.ty.finalize(ExprKind::Call, target.return_type().clone())?;
        debug!(
            from = %self.callee,
            to = %target.name(),
            %decl,
            "call bound"
        );
        self.callee = target.name().clone();
        self.decl = Some(decl);
        Ok(())
    }

    pub fn callee(&self) -> &StructuredName {
        &self.callee
    }

    pub fn declaration(&self) -> Option<DeclId> {
        self.decl
    }

    pub fn is_resolved(&self) -> bool {
        self.decl.is_some()
    }

    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }

    pub fn operands_mut(&mut self) -> &mut [Expr] {
        &mut self.operands
    }

    pub fn operand(&self, idx: usize) -> Result<&Expr, AstError> {
        index_of(&self.operands, idx, "operand")
    }

    pub fn operand_mut(&mut self, idx: usize) -> Result<&mut Expr, AstError> {
        index_of_mut(&mut self.operands, idx, "operand")
    }

    pub fn len(&self) -> usize {
        self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    /// The packed operand type, as a resolver would look it up.
    pub fn arg_type(&self) -> Type {
        let types: Vec<Type> = self.operands.iter().map(|e| e.ty().clone()).collect();
        Type::from_args(&types)
    }

    pub fn ty(&self) -> &Type {
        self.ty.get()
    }
}

/// `(def f Float ((x : Float) (y : Float)) body)`.
///
/// The arguments must pack to the declaration's argument type and the
/// body must produce the declared return type.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    decl: Declaration,
    args: Vec<Variable>,
    body: Box<Expr>,
}

impl Definition {
    pub fn new(decl: Declaration, args: Vec<Variable>, body: Expr) -> Result<Self, AstError> {
        if args.iter().any(|a| !a.is_typed()) {
            return Err(AstError::UnfinalizedType {
                kind: ExprKind::Variable,
            });
        }
        let arg_types: Vec<Type> = args.iter().map(|a| a.ty().clone()).collect();
        let packed = Type::from_args(&arg_types);
        if &packed != decl.arg_type() {
            return Err(AstError::DefinitionArgs {
                name: decl.name().to_string(),
                expected: decl.arg_type().clone(),
                found: packed,
            });
        }
        let body_ty = child_type(&body)?;
        if body_ty != decl.return_type() {
            return Err(AstError::DefinitionReturn {
                name: decl.name().to_string(),
                expected: decl.return_type().clone(),
                found: body_ty.clone(),
            });
        }
        Ok(Self {
            decl,
            args,
            body: Box::new(body),
        })
    }

    pub fn declaration(&self) -> &Declaration {
        &self.decl
    }

    pub fn name(&self) -> &StructuredName {
        self.decl.name()
    }

    pub fn mangled_name(&self) -> String {
        self.decl.mangled_name()
    }

    pub fn arguments(&self) -> &[Variable] {
        &self.args
    }

    pub fn argument(&self, idx: usize) -> Result<&Variable, AstError> {
        index_of(&self.args, idx, "argument")
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        &mut self.body
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

// ── Control flow ────────────────────────────────────────────────────

/// `(if (or x y) (add x y) 0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    cond: Box<Expr>,
    then_branch: Box<Expr>,
    else_branch: Box<Expr>,
    ty: Type,
}

impl Condition {
    pub fn new(cond: Expr, then_branch: Expr, else_branch: Expr) -> Result<Self, AstError> {
        let cond_ty = child_type(&cond)?;
        if *cond_ty != Type::BOOL {
            return Err(AstError::NotBool {
                what: "condition",
                found: cond_ty.clone(),
            });
        }
        let then_ty = child_type(&then_branch)?;
        let else_ty = child_type(&else_branch)?;
        if then_ty != else_ty {
            return Err(AstError::BranchMismatch {
                then_ty: then_ty.clone(),
                else_ty: else_ty.clone(),
            });
        }
        let ty = then_ty.clone();
        Ok(Self {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            ty,
        })
    }

    pub fn cond(&self) -> &Expr {
        &self.cond
    }

    pub fn cond_mut(&mut self) -> &mut Expr {
        &mut self.cond
    }

    pub fn then_branch(&self) -> &Expr {
        &self.then_branch
    }

    pub fn then_branch_mut(&mut self) -> &mut Expr {
        &mut self.then_branch
    }

    pub fn else_branch(&self) -> &Expr {
        &self.else_branch
    }

    pub fn else_branch_mut(&mut self) -> &mut Expr {
        &mut self.else_branch
    }
}

/// `(assert cond body)`: checks `cond` then evaluates to `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assert {
    cond: Box<Expr>,
    body: Box<Expr>,
    ty: Type,
}

impl Assert {
    pub fn new(cond: Expr, body: Expr) -> Result<Self, AstError> {
        let cond_ty = child_type(&cond)?;
        if *cond_ty != Type::BOOL {
            return Err(AstError::NotBool {
                what: "assert condition",
                found: cond_ty.clone(),
            });
        }
        let ty = child_type(&body)?.clone();
        Ok(Self {
            cond: Box::new(cond),
            body: Box::new(body),
            ty,
        })
    }

    pub fn cond(&self) -> &Expr {
        &self.cond
    }

    pub fn cond_mut(&mut self) -> &mut Expr {
        &mut self.cond
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        &mut self.body
    }
}

// ── Loops ───────────────────────────────────────────────────────────

/// `(build N (lam (i : Integer) expr))`.
///
/// Evaluates the lambda body once for every index in `0..N` and
/// collects the results into a vector of length `N`. Only the indexed
/// result is defined; evaluation order across indices is not.
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    size: Box<Expr>,
    lam: Lambda,
    ty: Type,
}

impl Build {
    pub fn new(size: Expr, lam: Lambda) -> Result<Self, AstError> {
        let size_ty = child_type(&size)?;
        if *size_ty != Type::INTEGER {
            return Err(AstError::NotInteger {
                what: "build size",
                found: size_ty.clone(),
            });
        }
        if *lam.param_type() != Type::INTEGER {
            return Err(AstError::NotInteger {
                what: "build index",
                found: lam.param_type().clone(),
            });
        }
        let ty = Type::vector(lam.result_type().clone());
        Ok(Self {
            size: Box::new(size),
            lam,
            ty,
        })
    }

    pub fn size(&self) -> &Expr {
        &self.size
    }

    pub fn size_mut(&mut self) -> &mut Expr {
        &mut self.size
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lam
    }

    pub fn lambda_mut(&mut self) -> &mut Lambda {
        &mut self.lam
    }

    pub fn variable(&self) -> &Variable {
        self.lam.variable()
    }

    pub fn body(&self) -> &Expr {
        self.lam.body()
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        self.lam.body_mut()
    }
}

/// `(fold (lam (acc_x : (Tuple Acc Elem)) expr) init vector)`.
///
/// Left fold: the accumulator starts as `init`, and for every element
/// `e` of `vector` in order becomes `lam((tuple acc e))`. The result
/// type is given by the caller and must be `Acc`; the lambda, the
/// initial value and the vector are checked against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    lam: Lambda,
    init: Box<Expr>,
    vector: Box<Expr>,
    ty: Type,
}

impl Fold {
    pub fn new(ty: Type, lam: Lambda, init: Expr, vector: Expr) -> Result<Self, AstError> {
        let element = child_type(&vector)?.element_type()?;
        let init_ty = child_type(&init)?;
        if *init_ty != ty {
            return Err(AstError::FoldMismatch {
                what: "initial value",
                expected: ty,
                found: init_ty.clone(),
            });
        }
        let param = Type::tuple(vec![ty.clone(), element.clone()]);
        if *lam.param_type() != param {
            return Err(AstError::FoldMismatch {
                what: "lambda parameter",
                expected: param,
                found: lam.param_type().clone(),
            });
        }
        if *lam.result_type() != ty {
            return Err(AstError::FoldMismatch {
                what: "lambda result",
                expected: ty,
                found: lam.result_type().clone(),
            });
        }
        Ok(Self {
            lam,
            init: Box::new(init),
            vector: Box::new(vector),
            ty,
        })
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lam
    }

    pub fn lambda_mut(&mut self) -> &mut Lambda {
        &mut self.lam
    }

    pub fn lambda_parameter(&self) -> &Variable {
        self.lam.variable()
    }

    pub fn body(&self) -> &Expr {
        self.lam.body()
    }

    pub fn body_mut(&mut self) -> &mut Expr {
        self.lam.body_mut()
    }

    pub fn init(&self) -> &Expr {
        &self.init
    }

    pub fn init_mut(&mut self) -> &mut Expr {
        &mut self.init
    }

    pub fn vector(&self) -> &Expr {
        &self.vector
    }

    pub fn vector_mut(&mut self) -> &mut Expr {
        &mut self.vector
    }
}

// ── Tuples ──────────────────────────────────────────────────────────

/// `(tuple 10.0 42 (add 1.0 2.0))`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    elements: Vec<Expr>,
    ty: Type,
}

impl Tuple {
    pub fn new(elements: Vec<Expr>) -> Result<Self, AstError> {
        let ty = Type::tuple(child_types(&elements)?);
        Ok(Self { elements, ty })
    }

    pub fn elements(&self) -> &[Expr] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [Expr] {
        &mut self.elements
    }

    pub fn element(&self, idx: usize) -> Result<&Expr, AstError> {
        index_of(&self.elements, idx, "tuple element")
    }

    pub fn element_mut(&mut self, idx: usize) -> Result<&mut Expr, AstError> {
        index_of_mut(&mut self.elements, idx, "tuple element")
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// `(get$7$9 t)`: element 7 of a tuple of (at least) 9. Indices are
/// 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    index: usize,
    bound: usize,
    expr: Box<Expr>,
    ty: Type,
}

impl Get {
    pub fn new(index: usize, bound: usize, expr: Expr) -> Result<Self, AstError> {
        let source = child_type(&expr)?;
        if !source.is_tuple() {
            return Err(AstError::NotATuple {
                found: source.clone(),
            });
        }
        if index == 0 || index > bound {
            return Err(AstError::TupleIndexOutOfRange { index, bound });
        }
        if source.sub_types().len() < bound {
            return Err(AstError::TupleTooSmall {
                bound,
                size: source.sub_types().len(),
            });
        }
        let ty = source.sub_type(index - 1)?.clone();
        Ok(Self {
            index,
            bound,
            expr: Box::new(expr),
            ty,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn expr_mut(&mut self) -> &mut Expr {
        &mut self.expr
    }

    /// The selected element itself, when the source is a literal tuple.
    pub fn element(&self) -> Option<&Expr> {
        match self.expr.as_ref() {
            Expr::Tuple(tuple) => tuple.elements.get(self.index - 1),
            _ => None,
        }
    }
}

// ── Rules ───────────────────────────────────────────────────────────

/// `(rule "mul2" (v : Float) (mul v 2.0) (add v v))`.
///
/// Wherever `pattern` matches (with `variable` free in it), a rewrite
/// engine may substitute `result`. Rules have no runtime type.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    variable: Variable,
    pattern: Box<Expr>,
    result: Box<Expr>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        variable: Variable,
        pattern: Expr,
        result: Expr,
    ) -> Result<Self, AstError> {
        let name = name.into();
        if !variable.is_typed() {
            return Err(AstError::UnfinalizedType {
                kind: ExprKind::Variable,
            });
        }
        let pattern_ty = child_type(&pattern)?;
        let result_ty = child_type(&result)?;
        if pattern_ty != result_ty {
            return Err(AstError::RuleMismatch {
                name,
                pattern: pattern_ty.clone(),
                result: result_ty.clone(),
            });
        }
        Ok(Self {
            name,
            variable,
            pattern: Box::new(pattern),
            result: Box::new(result),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn pattern(&self) -> &Expr {
        &self.pattern
    }

    pub fn pattern_mut(&mut self) -> &mut Expr {
        &mut self.pattern
    }

    pub fn result(&self) -> &Expr {
        &self.result
    }

    pub fn result_mut(&mut self) -> &mut Expr {
        &mut self.result
    }
}

// ── Tests ───────────────────────────────────────────────────────────
