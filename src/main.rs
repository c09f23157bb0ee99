use std::env;
use std::process;

mod command;
mod executor;
mod jobs;
mod parser;
mod prompt;
mod shell;
mod wiring;

fn print_help() {
    println!("pipesh - pipeline shell");
    println!();
    println!("Usage: pipesh [OPTIONS]");
    println!("  -h, --help       Print this help");
    println!("  -v, --version    Print version");
}

fn print_version() {
    println!("pipesh v {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        process::exit(0);
    }

    if args.iter().any(|a| a == "-v" || a == "--version" || a == "-V") {
        print_version();
        process::exit(0);
    }

    let mut shell = shell::Shell::new();
    if let Err(e) = shell.run() {
        eprintln!("pipesh: {}", e);
        process::exit(1);
    }
}
