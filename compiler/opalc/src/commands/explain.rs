//! The `explain` command: describe an error code.

use opal_diagnostic::ErrorCode;

pub fn explain_error(code_str: &str) {
    let Some(code) = ErrorCode::parse(code_str) else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX where X is a digit.");
        eprintln!("Examples: E0001, E1003, E6008");
        std::process::exit(1);
    };

    println!("{code}: {}", code.description());
}
