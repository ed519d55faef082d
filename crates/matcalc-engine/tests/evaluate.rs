use expect_test::expect;
use matcalc_core::{Matrix, SolutionSet, Value};
use matcalc_engine::{
    evaluate, matrix_from_text, Context, Environment, EvalError, EvalOptions, Evaluate,
    Evaluator, Host, ParseError, Session, TextRange,
};

/// Answers interactive commands from canned text.
#[derive(Default)]
struct ScriptedHost {
    matrices: Vec<&'static str>,
    warnings: usize,
}

impl Host for ScriptedHost {
    fn random_matrix(&mut self, _eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        Ok(Matrix::from_rows(vec![vec![4.0, 4.0], vec![4.0, 4.0]])?)
    }

    fn read_matrix(&mut self, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        let text = if self.matrices.is_empty() {
            ""
        } else {
            self.matrices.remove(0)
        };
        matrix_from_text(text, eval)
    }

    fn warn_extreme_magnitude(&mut self, _low: f64, _high: f64) {
        self.warnings += 1;
    }
}

fn session(matrices: Vec<&'static str>) -> Session<ScriptedHost> {
    let host = ScriptedHost {
        matrices,
        warnings: 0,
    };
    Session::new(host, EvalOptions::default())
}

fn matrix(rows: Vec<Vec<f64>>) -> Value {
    Value::Matrix(Matrix::from_rows(rows).unwrap())
}

fn assert_close(actual: &Value, expected: &[f64]) {
    let m = actual.as_matrix().expect("a matrix");
    assert_eq!(m.data().len(), expected.len());
    for (a, e) in m.data().iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} != {:?}", m.data(), expected);
    }
}

#[test]
fn test_arithmetic() {
    let mut ctx = Context::new();
    assert_eq!(
        evaluate("2 + 3 * 4", &mut ctx).unwrap(),
        Some(Value::Number(14.0))
    );
    assert_eq!(
        evaluate("1,5 * 2", &mut ctx).unwrap(),
        Some(Value::Number(3.0))
    );
    assert_eq!(
        evaluate("((1 + 1)) ^ 3", &mut ctx).unwrap(),
        Some(Value::Number(8.0))
    );
}

#[test]
fn test_matrix_commands() {
    let mut s = session(vec!["1 2; 3 4"]);
    s.run("m =").unwrap();
    assert_eq!(
        s.context().get_variable("m").unwrap(),
        matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
    );

    let det = s.run("det $m").unwrap().unwrap();
    assert!((det.scalar().unwrap() + 2.0).abs() < 1e-12);
    assert_eq!(s.run("Tr $m").unwrap(), Some(Value::Number(5.0)));
    assert_eq!(
        s.run("$m ^ T").unwrap(),
        Some(matrix(vec![vec![1.0, 3.0], vec![2.0, 4.0]]))
    );
    assert_eq!(
        s.run("$m + E").unwrap(),
        Some(matrix(vec![vec![2.0, 2.0], vec![3.0, 5.0]]))
    );

    let inverse = s.run("$m ^ (-1)").unwrap().unwrap();
    assert_close(&inverse, &[-2.0, 1.0, 1.5, -0.5]);
    let canonical = s.run("$m ~").unwrap().unwrap();
    assert_close(&canonical, &[1.0, 0.0, 0.0, 1.0]);

    let joined = s.run("$m _ $m | ($m _ $m)").unwrap().unwrap();
    assert_eq!(joined.as_matrix().map(Matrix::size), Some((4, 4)));
    assert!(s.run("$m | $m _ $m").is_err());
    let det = s.run("DeT $m").unwrap().unwrap();
    assert!((det.scalar().unwrap() + 2.0).abs() < 1e-12);
    let transposed = Some(matrix(vec![vec![1.0, 3.0], vec![2.0, 4.0]]));
    assert_eq!(s.run("$m ^ t").unwrap(), transposed);
    assert_eq!(s.run("($m)T").unwrap(), transposed);
}

#[test]
fn test_prompt_errors_have_no_span() {
    let mut s = session(vec!["1 2*"]);
    let err = s.run("b =").unwrap_err();
    assert!(
        matches!(err, EvalError::Parse(ParseError::MissingOperand { .. })),
        "{:?}",
        err
    );
    assert_eq!(err.span(), None);
    assert!(s.context().get_variable("b").is_err());
}

#[test]
fn test_matrix_entries_are_expressions() {
    let mut s = session(vec!["$a 0; 0 (1+1)"]);
    s.run("a = 3").unwrap();
    assert_eq!(
        s.run("b =").unwrap(),
        Some(matrix(vec![vec![3.0, 0.0], vec![0.0, 2.0]]))
    );
}

#[test]
fn test_solve_renders_equations() {
    let mut s = session(vec!["1 1 3; 1 -1 1"]);
    s.run("s =").unwrap();
    let solution = s.run("solve $s").unwrap().unwrap();
    let Value::Solution(solution) = solution else {
        panic!("Expected a solution, got {:?}", solution);
    };
    let SolutionSet::Equations(lines) = solution.render() else {
        panic!("Expected equations");
    };
    expect![[r#"
        x1 = 2
        x2 = 1"#]]
    .assert_eq(&lines.join("\n"));
}

#[test]
fn test_matrix_by_matrix_division_fails() {
    let mut s = session(vec!["1 2; 3 4"]);
    s.run("m =").unwrap();
    let err = s.run("$m / $m").unwrap_err();
    assert_eq!(err.category(), "computation error");
}

#[test]
fn test_lists() {
    let mut ctx = Context::new();
    let list = evaluate("[], 1, 2", &mut ctx).unwrap();
    assert_eq!(
        list,
        Some(Value::List(vec![Value::Number(1.0), Value::Number(2.0)]))
    );
    assert!(evaluate("[] + 1", &mut ctx).is_err());
}

#[test]
fn test_failed_run_rolls_back() {
    let mut s = session(Vec::new());
    s.run("x = 5").unwrap();
    assert_eq!(s.run("$x + 1").unwrap(), Some(Value::Number(6.0)));
    assert!(s.run("(x = 7) + []").is_err());
    assert_eq!(s.context().get_variable("x").unwrap(), Value::Number(5.0));
    assert_eq!(s.context().get_variable("_").unwrap(), Value::Number(6.0));
}

#[test]
fn test_unbalanced_brackets() {
    let mut ctx = Context::new();
    match evaluate("(1 + 2", &mut ctx) {
        Err(EvalError::Parse(ParseError::UnbalancedBrackets { span })) => {
            assert_eq!(span, Some(TextRange::new(0.into(), 1.into())));
        }
        other => panic!("Expected unbalanced brackets, got {:?}", other),
    }
    match evaluate("1 + 2)", &mut ctx) {
        Err(EvalError::Parse(ParseError::UnbalancedBrackets { span })) => {
            assert_eq!(span, Some(TextRange::new(5.into(), 6.into())));
        }
        other => panic!("Expected unbalanced brackets, got {:?}", other),
    }
}

#[test]
fn test_parse_errors() {
    let mut ctx = Context::new();
    assert!(matches!(
        evaluate("1.2.3 + 1", &mut ctx),
        Err(EvalError::Parse(ParseError::MalformedNumber { .. }))
    ));
    assert!(matches!(
        evaluate("* 2", &mut ctx),
        Err(EvalError::Parse(ParseError::MissingOperand { .. }))
    ));
    assert!(matches!(
        evaluate("det 2", &mut ctx),
        Err(EvalError::Computation(_))
    ));
}

#[test]
fn test_interactive_commands_need_a_host() {
    let mut ctx = Context::new();
    let err = evaluate("rand", &mut ctx).unwrap_err();
    assert_eq!(err.category(), "computation error");

    let mut s = session(Vec::new());
    assert_eq!(
        s.run("r = rand").unwrap(),
        Some(matrix(vec![vec![4.0, 4.0], vec![4.0, 4.0]]))
    );
}

#[test]
fn test_precision_warning_fires_once() {
    let mut s = session(Vec::new());
    s.run("2000 + 1").unwrap();
    s.run("3000 * 2").unwrap();
    assert_eq!(s.host_mut().warnings, 1);
    assert!(s.evaluator().has_warned());

    let mut evaluator = Evaluator::default();
    let mut host = ScriptedHost::default();
    evaluator
        .evaluate("0.5 * 2", &mut Context::new(), &mut host)
        .unwrap();
    assert_eq!(host.warnings, 0);
}

#[test]
fn test_iteration_limit() {
    let options = EvalOptions {
        max_iterations: 0,
        ..EvalOptions::default()
    };
    let mut evaluator = Evaluator::new(options);
    let mut host = ScriptedHost::default();
    let err = evaluator
        .evaluate("1 + 1", &mut Context::new(), &mut host)
        .unwrap_err();
    assert!(matches!(err, EvalError::Parse(ParseError::TooComplex { .. })));
}
