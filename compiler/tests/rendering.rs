use insta::assert_snapshot;
use ksc_ast::{
    Assert, Binding, Block, Build, Call, Condition, DeclId, DeclTable, Declaration, Definition,
    Expr, Fold, Get, Lambda, Let, Literal, Rule, Signature, StructuredName, Tuple, Type, Variable,
};

fn pair(ty: Type) -> Type {
    Type::tuple(vec![ty.clone(), ty])
}

fn var(name: &str, ty: Type) -> Expr {
    Variable::new(name, ty).into()
}

fn declare(table: &mut DeclTable, name: &str, arg: Type, ret: Type) -> DeclId {
    table
        .insert(Declaration::new(Signature::new(name, arg), ret))
        .unwrap()
}

fn call(table: &DeclTable, id: DeclId, operands: Vec<Expr>) -> Expr {
    Call::new(table, id, operands).unwrap().into()
}

#[test]
fn let_with_call_body() {
    let mut table = DeclTable::new();
    let add = declare(&mut table, "add", pair(Type::INTEGER), Type::INTEGER);

    let binding = Binding::single(Variable::untyped("x"), Literal::integer(10).into()).unwrap();
    let body = call(
        &table,
        add,
        vec![var("x", Type::INTEGER), Literal::integer(10).into()],
    );
    let expr: Expr = Let::new(binding, body).unwrap().into();

    assert_eq!(expr.ty(), &Type::INTEGER);
    assert_snapshot!(expr.to_string(), @"(let (x 10) (add x 10))");
}

#[test]
fn build_over_index() {
    let mut table = DeclTable::new();
    let mul = declare(&mut table, "mul", pair(Type::INTEGER), Type::INTEGER);

    let body = call(
        &table,
        mul,
        vec![var("i", Type::INTEGER), var("i", Type::INTEGER)],
    );
    let lam = Lambda::new(Variable::new("i", Type::INTEGER), body).unwrap();
    let expr: Expr = Build::new(var("N", Type::INTEGER), lam).unwrap().into();

    assert_eq!(expr.ty(), &Type::vector(Type::INTEGER));
    assert_snapshot!(expr.to_string(), @"(build N (lam (i : Integer) (mul i i)))");
}

#[test]
fn get_from_tuple() {
    let t = Type::tuple(vec![Type::FLOAT, Type::INTEGER, Type::BOOL]);
    let expr: Expr = Get::new(2, 3, var("t", t)).unwrap().into();
    assert_snapshot!(expr.to_string(), @"(get$2$3 t)");
}

#[test]
fn external_declaration() {
    let decl: Expr = Declaration::new(Signature::new("max", pair(Type::FLOAT)), Type::FLOAT).into();
    assert_snapshot!(decl.to_string(), @"(edef max Float (Float Float))");
}

#[test]
fn derived_definition() {
    let name = StructuredName::derived("fwd", "to_float".into());
    let arg = Type::tuple(vec![Type::INTEGER, Type::tuple(vec![])]);
    let decl = Declaration::new(Signature::new(name, arg), Type::FLOAT);
    let def: Expr = Definition::new(
        decl,
        vec![
            Variable::new("x", Type::INTEGER),
            Variable::new("dx", Type::tuple(vec![])),
        ],
        Literal::float(0.0).unwrap().into(),
    )
    .unwrap()
    .into();

    assert_snapshot!(def.to_string(), @"(def [fwd to_float] Float ((x : Integer) (dx : (Tuple))) 0.0)");
    assert_eq!(def.as_definition().unwrap().mangled_name(), "fwd$to_float@<i<>>");
}

#[test]
fn rewrite_rule() {
    let mut table = DeclTable::new();
    let mul = declare(&mut table, "mul", pair(Type::FLOAT), Type::FLOAT);
    let add = declare(&mut table, "add", pair(Type::FLOAT), Type::FLOAT);

    let v = || var("v", Type::FLOAT);
    let rule: Expr = Rule::new(
        "mul2",
        Variable::new("v", Type::FLOAT),
        call(&table, mul, vec![v(), Literal::float(2.0).unwrap().into()]),
        call(&table, add, vec![v(), v()]),
    )
    .unwrap()
    .into();

    assert_snapshot!(rule.to_string(), @r#"(rule "mul2" (v : Float) (mul v 2.0) (add v v))"#);
}

#[test]
fn fold_sum() {
    let mut table = DeclTable::new();
    let add = declare(&mut table, "add", pair(Type::FLOAT), Type::FLOAT);

    let acc_x = || var("acc_x", pair(Type::FLOAT));
    let body = call(
        &table,
        add,
        vec![
            Get::new(1, 2, acc_x()).unwrap().into(),
            Get::new(2, 2, acc_x()).unwrap().into(),
        ],
    );
    let lam = Lambda::new(Variable::new("acc_x", pair(Type::FLOAT)), body).unwrap();
    let fold: Expr = Fold::new(
        Type::FLOAT,
        lam,
        Literal::float(0.0).unwrap().into(),
        var("v", Type::vector(Type::FLOAT)),
    )
    .unwrap()
    .into();

    assert_eq!(fold.ty(), &Type::FLOAT);
    assert_snapshot!(
        fold.to_string(),
        @"(fold (lam (acc_x : (Tuple Float Float)) (add (get$1$2 acc_x) (get$2$2 acc_x))) 0.0 v)"
    );
}

#[test]
fn tuple_unpacking_let() {
    let init: Expr = Tuple::new(vec![
        Literal::float(1.0).unwrap().into(),
        Literal::integer(2).into(),
    ])
    .unwrap()
    .into();
    let binding =
        Binding::tuple(vec![Variable::untyped("a"), Variable::untyped("b")], init).unwrap();
    let body: Expr = Condition::new(
        Literal::boolean(true).into(),
        var("a", Type::FLOAT),
        Literal::float(3.0).unwrap().into(),
    )
    .unwrap()
    .into();
    let expr: Expr = Let::new(binding, body).unwrap().into();

    assert_eq!(expr.ty(), &Type::FLOAT);
    assert_snapshot!(expr.to_string(), @"(let ((a b) (tuple 1.0 2)) (if true a 3.0))");
}

#[test]
fn assert_then_value() {
    let expr: Expr = Assert::new(Literal::boolean(true).into(), Literal::string("ok").into())
        .unwrap()
        .into();
    assert_snapshot!(expr.to_string(), @r#"(assert true "ok")"#);
}

#[test]
fn program_block_one_form_per_line() {
    let mut table = DeclTable::new();
    let add_decl = Declaration::new(Signature::new("add", pair(Type::INTEGER)), Type::INTEGER);
    let add = table.insert(add_decl.clone()).unwrap();

    let twice = Definition::new(
        Declaration::new(Signature::new("twice", Type::INTEGER), Type::INTEGER),
        vec![Variable::new("x", Type::INTEGER)],
        call(
            &table,
            add,
            vec![var("x", Type::INTEGER), var("x", Type::INTEGER)],
        ),
    )
    .unwrap();
    let program = Block::new(vec![add_decl.into(), twice.into()]).unwrap();

    assert_eq!(Expr::from(program.clone()).ty(), &Type::INTEGER);
    assert_snapshot!(program.to_string(), @r"
    (edef add Integer (Integer Integer))
    (def twice Integer ((x : Integer)) (add x x))
    ");
}

#[test]
fn rendering_is_deterministic() {
    let build = || -> String {
        let mut table = DeclTable::new();
        let add = declare(&mut table, "add", pair(Type::FLOAT), Type::FLOAT);
        let e = call(
            &table,
            add,
            vec![Literal::float(1.0).unwrap().into(), Literal::float(2.0).unwrap().into()],
        );
        Tuple::new(vec![e.clone(), e]).unwrap().to_string()
    };
    assert_eq!(build(), build());
    assert_eq!(build(), "(tuple (add 1.0 2.0) (add 1.0 2.0))");
}

#[test]
fn float_literals_stay_positional() {
    let expr: Expr = Tuple::new(vec![
        Literal::float(1e16).unwrap().into(),
        Literal::float(1e-7).unwrap().into(),
        Literal::float(-2.0).unwrap().into(),
    ])
    .unwrap()
    .into();
    assert_snapshot!(expr.to_string(), @"(tuple 10000000000000000.0 0.0000001 -2.0)");
    assert!(Literal::float(f64::NAN).is_err());
}
