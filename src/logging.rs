//! Console colours and the `log` backend.

use core::fmt::{self, Display};
use std::io::{IsTerminal, Write};

use log::Level;

pub const COLOR_RESET: &str = "\u{1B}[0m";

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCode {
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Cyan = 36,
    White = 37,
    BrightBlack = 90,
}

impl Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{1B}[0;{}m", *self as u8)
    }
}

impl ColorCode {
    /// Colour used for the level tag of a log line.
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Error => ColorCode::Red,
            Level::Warn => ColorCode::Yellow,
            Level::Info => ColorCode::Green,
            Level::Debug => ColorCode::Cyan,
            Level::Trace => ColorCode::BrightBlack,
        }
    }
}

/// Wraps `text` in a bracketed tag, coloured when `color` is set.
///
/// `tag("CMD", ColorCode::Green, false)` yields `[CMD]`.
pub fn tag(text: &str, code: ColorCode, color: bool) -> String {
    if color {
        format!("[{code}{text}{COLOR_RESET}]")
    } else {
        format!("[{text}]")
    }
}

/// Whether stdout is attached to a terminal.
pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Write an `[ERROR]` line to stderr.
///
/// Unlike `error!`, this ignores the log filter: failures stay visible even
/// with `RUST_LOG=off`.
pub fn report_failure(msg: impl Display) {
    let tag = tag("ERROR", ColorCode::Red, std::io::stderr().is_terminal());
    eprintln!("{tag} {msg}");
}

/// Initialize the logger.
///
/// Filter comes from `RUST_LOG` and defaults to `info`. Lines look like
/// `[INFO] message`, without timestamps or module paths.
pub fn init() {
    let color = std::io::stderr().is_terminal();
    // A second init (tests, embedding binaries) keeps the first logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let level = record.level();
            writeln!(
                buf,
                "{} {}",
                tag(level.as_str(), ColorCode::for_level(level), color),
                record.args()
            )
        })
        .try_init();
}
