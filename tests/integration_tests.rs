// End-to-end tests over the mode entry points: each case feeds source text
// through a mode and checks the captured stdout and the exit code.

use setker::runner;

#[derive(Clone, Copy)]
enum Mode {
    Tokenize,
    Parse,
    Evaluate,
    Run,
}

struct TestCase {
    name: &'static str,
    mode: Mode,
    source: &'static str,
    expected_output: &'static str,
    expected_exit: i32,
}

fn run_case(case: &TestCase) {
    let mut out: Vec<u8> = Vec::new();
    let exit = match case.mode {
        Mode::Tokenize => runner::tokenize(case.source, &mut out),
        Mode::Parse => runner::parse(case.source, &mut out),
        Mode::Evaluate => runner::evaluate(case.source, &mut out),
        Mode::Run => runner::run(case.source, &mut out),
    };
    let output = String::from_utf8(out).expect("non-utf8 output");

    assert_eq!(
        exit, case.expected_exit,
        "[{}] wrong exit code (stdout: {:?})",
        case.name, output
    );
    assert_eq!(
        output, case.expected_output,
        "[{}] wrong stdout",
        case.name
    );
}

fn run_suite(cases: &[TestCase]) {
    for case in cases {
        run_case(case);
    }
}

#[test]
fn tokenize_mode() {
    run_suite(&[
        TestCase {
            name: "declaration statement",
            mode: Mode::Tokenize,
            source: "var x = 42;",
            expected_output: "VAR var null\n\
                              IDENTIFIER x null\n\
                              EQUAL = null\n\
                              NUMBER 42 42.0\n\
                              SEMICOLON ; null\n\
                              EOF  null\n",
            expected_exit: 0,
        },
        TestCase {
            name: "string and number literals",
            mode: Mode::Tokenize,
            source: "\"hi\" 1.500",
            expected_output: "STRING \"hi\" hi\nNUMBER 1.500 1.5\nEOF  null\n",
            expected_exit: 0,
        },
        TestCase {
            name: "empty file",
            mode: Mode::Tokenize,
            source: "",
            expected_output: "EOF  null\n",
            expected_exit: 0,
        },
        TestCase {
            name: "number then lone dot",
            mode: Mode::Tokenize,
            source: "123.",
            expected_output: "NUMBER 123 123.0\nDOT . null\nEOF  null\n",
            expected_exit: 0,
        },
        TestCase {
            name: "comments are invisible",
            mode: Mode::Tokenize,
            source: "1 // two\n<| three |> 4",
            expected_output: "NUMBER 1 1.0\nNUMBER 4 4.0\nEOF  null\n",
            expected_exit: 0,
        },
        TestCase {
            name: "unexpected character still prints tokens",
            mode: Mode::Tokenize,
            source: "var @ x",
            expected_output: "VAR var null\nIDENTIFIER x null\nEOF  null\n",
            expected_exit: 65,
        },
        TestCase {
            name: "unterminated string",
            mode: Mode::Tokenize,
            source: "\"abc",
            expected_output: "EOF  null\n",
            expected_exit: 65,
        },
    ]);
}

#[test]
fn parse_mode() {
    run_suite(&[
        TestCase {
            name: "precedence",
            mode: Mode::Parse,
            source: "1 + 2 * 3;",
            expected_output: "(+ 1.0 (* 2.0 3.0))\n",
            expected_exit: 0,
        },
        TestCase {
            name: "grouping and unary",
            mode: Mode::Parse,
            source: "-(1 + 2);",
            expected_output: "(- (group (+ 1.0 2.0)))\n",
            expected_exit: 0,
        },
        TestCase {
            name: "assignment chain",
            mode: Mode::Parse,
            source: "var a; var b; a = b = 1;",
            expected_output: "(program (var a) (var b) (= a (= b 1.0)))\n",
            expected_exit: 0,
        },
        TestCase {
            name: "syntax error",
            mode: Mode::Parse,
            source: "1 + ;",
            expected_output: "",
            expected_exit: 65,
        },
        TestCase {
            name: "scan error stops the pipeline",
            mode: Mode::Parse,
            source: "1 + @;",
            expected_output: "",
            expected_exit: 65,
        },
        TestCase {
            name: "invalid assignment target",
            mode: Mode::Parse,
            source: "1 = 2;",
            expected_output: "",
            expected_exit: 65,
        },
    ]);
}

#[test]
fn evaluate_mode() {
    run_suite(&[
        TestCase {
            name: "arithmetic",
            mode: Mode::Evaluate,
            source: "(3 + 4) * 2",
            expected_output: "14\n",
            expected_exit: 0,
        },
        TestCase {
            name: "string concatenation",
            mode: Mode::Evaluate,
            source: "\"foo\" + \"bar\"",
            expected_output: "foobar\n",
            expected_exit: 0,
        },
        TestCase {
            name: "last statement wins",
            mode: Mode::Evaluate,
            source: "1; 2; 1 + 2",
            expected_output: "3\n",
            expected_exit: 0,
        },
        TestCase {
            name: "nil result",
            mode: Mode::Evaluate,
            source: "print 1;",
            expected_output: "1\nnil\n",
            expected_exit: 0,
        },
        TestCase {
            name: "runtime error",
            mode: Mode::Evaluate,
            source: "print 1 + \"x\";",
            expected_output: "",
            expected_exit: 70,
        },
    ]);
}

#[test]
fn run_mode() {
    run_suite(&[
        TestCase {
            name: "closure counter",
            mode: Mode::Run,
            source: "fun makeCounter() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }\n\
                     var c = makeCounter();\n\
                     print c(); print c(); print c();",
            expected_output: "1\n2\n3\n",
            expected_exit: 0,
        },
        TestCase {
            name: "short circuit",
            mode: Mode::Run,
            source: "fun bang() { print \"bang\"; return true; }\n\
                     print true or bang();\n\
                     print false and bang();",
            expected_output: "true\nfalse\n",
            expected_exit: 0,
        },
        TestCase {
            name: "for loop",
            mode: Mode::Run,
            source: "for (var i = 0; i < 3; i = i + 1) print i;",
            expected_output: "0\n1\n2\n",
            expected_exit: 0,
        },
        TestCase {
            name: "fibonacci",
            mode: Mode::Run,
            source: "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
                     print fib(15);",
            expected_output: "610\n",
            expected_exit: 0,
        },
        TestCase {
            name: "lexical scoping",
            mode: Mode::Run,
            source: "var x = \"outer\";\n\
                     { var x = \"inner\"; print x; }\n\
                     print x;",
            expected_output: "inner\nouter\n",
            expected_exit: 0,
        },
        TestCase {
            name: "mixed concatenation",
            mode: Mode::Run,
            source: "print \"n=\" + 3; print true + \"!\"; print \"v:\" + nil;",
            expected_output: "n=3\ntrue!\nv:nil\n",
            expected_exit: 0,
        },
        TestCase {
            name: "operand type error",
            mode: Mode::Run,
            source: "print 1 + \"x\";",
            expected_output: "",
            expected_exit: 70,
        },
        TestCase {
            name: "undefined variable",
            mode: Mode::Run,
            source: "print missing;",
            expected_output: "",
            expected_exit: 70,
        },
        TestCase {
            name: "arity mismatch",
            mode: Mode::Run,
            source: "fun f(a) { return a; } f(1, 2);",
            expected_output: "",
            expected_exit: 70,
        },
        TestCase {
            name: "partial output before runtime error",
            mode: Mode::Run,
            source: "print 1; print missing;",
            expected_output: "1\n",
            expected_exit: 70,
        },
        TestCase {
            name: "parse error",
            mode: Mode::Run,
            source: "print ;",
            expected_output: "",
            expected_exit: 65,
        },
    ]);
}

// The S-expression output is a print form, not an input form: feeding it
// back to the parser must not succeed in general. Golden-output equality in
// parse_mode is the round-trip guarantee.
#[test]
fn sexpr_output_is_not_reparseable() {
    let mut out: Vec<u8> = Vec::new();
    let exit = runner::parse("var a = 1;", &mut out);
    assert_eq!(exit, 0);
    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed, "(var a = 1.0)\n");

    let mut second: Vec<u8> = Vec::new();
    assert_eq!(runner::parse(printed.trim(), &mut second), 65);
}
