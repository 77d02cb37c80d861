//! Process boundary: exit-status normalisation and the `Runner` seam.

use std::process::ExitStatus;

use crate::{Command, FlintResult};

/// Offset added to a terminating signal number, as shells report it.
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Flatten an `ExitStatus` into a single integer.
///
/// A normal exit yields its code. Death by signal yields `128 + signal`, so
/// it can never be mistaken for a clean exit.
#[cfg(unix)]
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => SIGNAL_EXIT_BASE + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Executes commands on behalf of the rebuild controller.
pub trait Runner {
    fn run(&mut self, cmd: &Command) -> FlintResult<i32>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct System;

impl Runner for System {
    fn run(&mut self, cmd: &Command) -> FlintResult<i32> {
        cmd.run()
    }
}
