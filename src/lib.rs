//! flint - a self-rebuilding build utility.
//!
//! A build description is an ordinary program. It starts with
//! [`rebuild_yourself!`], which recompiles and re-executes it when its source
//! is newer than the running binary, and then drives the real build through
//! [`Command`]s:
//!
//! ```no_run
//! flint::logging::init();
//! flint::rebuild_yourself!();
//!
//! let status = flint::cmd!("cc", "main.c", "-o", "exe").run()?;
//! std::process::exit(status);
//! # Ok::<(), flint::FlintError>(())
//! ```

#[macro_use]
extern crate log;

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod rebuild;

pub use command::{Command, run_cmd};
pub use config::{CompileMode, RebuildConfig};
pub use error::{FlintError, FlintResult};
pub use process::{Runner, System};
pub use rebuild::{Outcome, Rebuilder, Staleness, check_staleness, rebuild_or_exit};

/// Build a [`Command`] from a list of arguments.
///
/// `cmd!("cc", "main.c", "-o", "exe")` is the same as appending each argument
/// in order to `Command::new()`.
#[macro_export]
macro_rules! cmd {
    ($($arg:expr),* $(,)?) => {{
        let mut cmd = $crate::Command::new();
        $( cmd.arg($arg); )*
        cmd
    }};
}

/// Rebuild and re-execute the calling binary if its source changed.
///
/// Watches the file the macro is invoked from, treats the running executable
/// as the artifact and rebuilds it with `cargo build --bin <name>` (plus
/// `--release` for release builds). `FLINT_*` variables override any of it.
/// Returns only when no rebuild was needed.
#[macro_export]
macro_rules! rebuild_yourself {
    () => {
        $crate::rebuild_or_exit($crate::RebuildConfig::for_binary(
            ::std::path::Path::new(env!("CARGO_MANIFEST_DIR")),
            file!(),
            option_env!("CARGO_BIN_NAME").unwrap_or(env!("CARGO_PKG_NAME")),
            !cfg!(debug_assertions),
        ))
    };
}
