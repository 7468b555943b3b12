use crate::ast::Program;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::io::Write;

/// The four mode entry points. Each takes the raw source text and the
/// stdout sink, prints errors to stderr, and returns the process exit code
/// (0 clean, 65 lex/parse, 70 runtime).

pub fn tokenize<W: Write>(source: &str, out: &mut W) -> i32 {
    let result = Lexer::new(source).scan_tokens();

    for error in &result.errors {
        error.report();
    }

    // Tokens print even when the scan reported errors
    for token in &result.tokens {
        let _ = writeln!(out, "{}", token);
    }

    if result.had_error() {
        65
    } else {
        0
    }
}

pub fn parse<W: Write>(source: &str, out: &mut W) -> i32 {
    let program = match scan_and_parse(source) {
        Ok(program) => program,
        Err(code) => return code,
    };

    let _ = writeln!(out, "{}", program.to_sexpr());
    0
}

pub fn evaluate<W: Write>(source: &str, out: &mut W) -> i32 {
    let program = match scan_and_parse(source) {
        Ok(program) => program,
        Err(code) => return code,
    };

    let mut evaluator = Evaluator::new(&mut *out);
    match evaluator.evaluate_program(&program) {
        Ok(value) => {
            let _ = writeln!(out, "{}", value);
            0
        }
        Err(error) => {
            error.report();
            error.exit_code()
        }
    }
}

pub fn run<W: Write>(source: &str, out: &mut W) -> i32 {
    let program = match scan_and_parse(source) {
        Ok(program) => program,
        Err(code) => return code,
    };

    let mut evaluator = Evaluator::new(out);
    match evaluator.evaluate_program(&program) {
        Ok(_) => 0,
        Err(error) => {
            error.report();
            error.exit_code()
        }
    }
}

/// Shared front half of the pipeline. Scan errors stop the run before the
/// parser sees the tokens; the first parse error stops it after.
fn scan_and_parse(source: &str) -> Result<Program, i32> {
    let scanned = Lexer::new(source).scan_tokens();
    if scanned.had_error() {
        for error in &scanned.errors {
            error.report();
        }
        return Err(65);
    }

    Parser::new(scanned.tokens).parse().map_err(|error| {
        error.report();
        error.exit_code()
    })
}
