//! Opal CLI

use opalc::commands::{
    exec_file, explain_error, parse_run_args, read_forms, run_file, tokens_file,
};

fn main() {
    opalc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" | "exec" => {
            let (path, options) = match parse_run_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    eprintln!("Usage: opal {command} <file> [--max-depth=N] [--profile]");
                    std::process::exit(1);
                }
            };
            if command == "run" {
                run_file(&path, &options);
            } else {
                exec_file(&path, &options);
            }
        }
        "tokens" => {
            if args.len() < 3 {
                eprintln!("Usage: opal tokens <file.opal>");
                std::process::exit(1);
            }
            tokens_file(&args[2]);
        }
        "read" => {
            if args.len() < 3 {
                eprintln!("Usage: opal read <file.opal>");
                std::process::exit(1);
            }
            read_forms(&args[2]);
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: opal explain <ERROR_CODE>");
                eprintln!("Example: opal explain E6008");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("Opal {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // A bare source path runs it
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("opal"))
            {
                run_file(command, &opalc::commands::RunOptions::default());
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("Opal - a token-stream machine for a small S-expression language");
    println!();
    println!("Usage: opal <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.opal>      Compile and run an Opal program");
    println!("  exec <file.ops>      Verify and run an opcode listing");
    println!("  tokens <file.opal>   Compile and print the opcode listing");
    println!("  read <file.opal>     Print the desugared forms");
    println!("  explain <code>       Explain an error code (e.g., E6008)");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Run options:");
    println!("  --max-depth=<N>      Call depth limit (default: 10000)");
    println!("  --profile            Print evaluation counters to stderr");
    println!();
    println!("Environment:");
    println!("  OPAL_LOG             Tracing filter, e.g. opal_eval=debug (falls back to RUST_LOG)");
    println!();
    println!("Examples:");
    println!("  opal run fib.opal");
    println!("  opal run fib.opal --max-depth=100000 --profile");
    println!("  opal tokens fib.opal > fib.ops");
    println!("  opal exec fib.ops");
}
