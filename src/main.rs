//! Example build description: keeps itself up to date, then compiles
//! `main.c` into `exe`.

use std::process::exit;

use clap::Parser;

/// Rebuild this program if its source changed, then build `exe` from `main.c`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    flint::logging::init();

    flint::rebuild_yourself!();

    match try_main() {
        Ok(status) => exit(status),
        Err(e) => {
            flint::logging::report_failure(e);
            exit(1);
        }
    }
}

fn try_main() -> flint::FlintResult<i32> {
    flint::cmd!("cc", "main.c", "-o", "exe").run()
}
