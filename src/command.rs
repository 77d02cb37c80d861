//! A single child-process invocation.
//!
//! `Command` is an ordered argument list whose first element is the program.
//! Running it echoes a `[CMD]` line, spawns the program with inherited
//! standard streams and blocks until it exits.

use core::fmt::{self, Display};
use std::io::ErrorKind;

use crate::logging::{self, ColorCode, report_failure};
use crate::process;
use crate::{FlintError, FlintResult};

/// Status reported when the program could not be found.
pub const STATUS_NOT_FOUND: i32 = 127;
/// Status reported when the program was found but could not be executed.
pub const STATUS_NOT_EXECUTABLE: i32 = 126;

const TAG: &str = "CMD";

/// An ordered list of arguments; `args[0]` names the program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
}

impl Command {
    /// Create an empty command.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Append one argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append an ordered batch of arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Drop every argument, leaving the command as if newly created.
    pub fn clear(&mut self) {
        self.args = Vec::new();
    }

    /// The program name, if any argument was appended.
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The `[CMD] ...` line, uncoloured.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the rendering to stdout.
    pub fn print(&self) {
        let tag = logging::tag(TAG, ColorCode::Green, logging::stdout_is_tty());
        println!("{tag}{}", RenderedArgs(&self.args));
    }

    /// Echo, spawn, and wait for the command.
    ///
    /// Returns the child's exit status; a child killed by a signal reports
    /// `128 + signal`. A program that cannot be found or executed yields
    /// [`STATUS_NOT_FOUND`] or [`STATUS_NOT_EXECUTABLE`]. Any other spawn
    /// failure is an error, never a status.
    pub fn run(&self) -> FlintResult<i32> {
        let Some((program, rest)) = self.args.split_first() else {
            return Err(FlintError::EmptyCommand);
        };

        self.print();

        let status = match duct::cmd(program.as_str(), rest).unchecked().run() {
            Ok(output) => process::exit_code(output.status),
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    report_failure(format!("{program}: command not found"));
                    STATUS_NOT_FOUND
                }
                ErrorKind::PermissionDenied => {
                    report_failure(format!("{program}: permission denied"));
                    STATUS_NOT_EXECUTABLE
                }
                _ => {
                    return Err(FlintError::Spawn {
                        program: program.clone(),
                        source: err,
                    });
                }
            },
        };

        if status != 0 {
            report_failure(format!("{program} exited abnormally with code {status}"));
        }

        Ok(status)
    }
}

/// Space-prefixed arguments, whitespace-bearing ones single-quoted.
struct RenderedArgs<'a>(&'a [String]);

impl Display for RenderedArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arg in self.0 {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{TAG}]{}", RenderedArgs(&self.args))
    }
}

impl<S: Into<String>> FromIterator<S> for Command {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut cmd = Command::new();
        cmd.args(iter);
        cmd
    }
}

impl<S: Into<String>> Extend<S> for Command {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.args(iter);
    }
}

/// Build a command from `args` and run it once.
pub fn run_cmd<I, S>(args: I) -> FlintResult<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().collect::<Command>().run()
}
