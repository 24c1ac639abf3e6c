//! Debug commands: `read` and `tokens` for inspecting the front end.

use opal_compile::disassemble;
use opal_reader::read_program;

use super::{fail, read_file};
use crate::{compile_source, PipelineError};

/// Print the desugared forms of a file, one per line.
pub fn read_forms(path: &str) {
    let source = read_file(path);
    match read_program(&source) {
        Ok(forms) => {
            for form in &forms {
                println!("{form}");
            }
        }
        Err(err) => fail(path, &source, &PipelineError::from(err)),
    }
}

/// Compile a file and print its opcode listing.
pub fn tokens_file(path: &str) {
    let source = read_file(path);
    match compile_source(&source) {
        Ok(program) => print!("{}", disassemble(&program)),
        Err(err) => fail(path, &source, &err),
    }
}
