//! A brain-dead silent `cmp` toolbox binary.
//!
//! `cmp [-s] file1 file2` — exit 0 if the files are byte-identical, 1
//! otherwise. Only a leading `-s` is recognized, and regardless of `-s`
//! the comparison result itself is never printed; only usage and open
//! errors produce output.

use std::path::Path;
use std::process::ExitCode;

use probekit_core::compare::{CompareVerdict, compare_files};

fn main() -> ExitCode {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().is_some_and(|a| a == "-s") {
        args.remove(0);
    }
    if args.len() != 2 {
        println!("Usage: cmp [-s] file1 file2");
        return ExitCode::from(1);
    }

    match compare_files(Path::new(&args[0]), Path::new(&args[1])) {
        Ok(CompareVerdict::Equal) => ExitCode::SUCCESS,
        Ok(CompareVerdict::Differ) => ExitCode::from(1),
        Err(err) => {
            println!("ERROR: {err}");
            ExitCode::from(1)
        }
    }
}
