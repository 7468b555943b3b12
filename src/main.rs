use clap::{Arg, Command};
use setker::runner;
use std::fs;
use std::io;
use std::process;

fn main() {
    let matches = Command::new("setker")
        .about("A tree-walking interpreter for the Setker scripting language")
        .arg(
            Arg::new("command")
                .help("One of: tokenize, parse, evaluate, run, help")
                .value_name("COMMAND")
                .index(1),
        )
        .arg(
            Arg::new("file")
                .help("The script file to process")
                .value_name("FILE")
                .index(2),
        )
        .get_matches();

    // Both positionals stay optional in clap so missing arguments land on
    // the usage path with exit code 1 instead of clap's own exit code.
    let command = match matches.get_one::<String>("command") {
        Some(command) => command.as_str(),
        None => {
            usage();
            process::exit(1);
        }
    };

    if command == "help" {
        print_help();
        return;
    }

    if !matches!(command, "tokenize" | "parse" | "evaluate" | "run") {
        eprintln!("Unknown command: {}", command);
        usage();
        process::exit(1);
    }

    let file = match matches.get_one::<String>("file") {
        Some(file) => file,
        None => {
            usage();
            process::exit(1);
        }
    };

    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file, e);
            process::exit(1);
        }
    };

    let mut stdout = io::stdout();
    let code = match command {
        "tokenize" => runner::tokenize(&source, &mut stdout),
        "parse" => runner::parse(&source, &mut stdout),
        "evaluate" => runner::evaluate(&source, &mut stdout),
        "run" => runner::run(&source, &mut stdout),
        _ => unreachable!(),
    };

    process::exit(code);
}

fn usage() {
    eprintln!("Usage: setker <tokenize|parse|evaluate|run|help> [file]");
}

fn print_help() {
    println!("Available commands:");
    println!("  tokenize <file>  - Print the token stream");
    println!("  parse <file>     - Print the parsed syntax tree");
    println!("  evaluate <file>  - Evaluate and print the final value");
    println!("  run <file>       - Execute the program");
    println!("  help             - Show this help message");
}
