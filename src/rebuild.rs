//! Self-rebuild controller.
//!
//! On start-up a build description compares the modification time of its own
//! source with that of its compiled artifact. When the source is newer it
//! recompiles itself, runs the fresh artifact, and ends with that run's
//! status instead of carrying on with stale logic.
//!
//! [`Rebuilder::check`] reports the decision as an [`Outcome`] and leaves
//! ending the process to the caller; [`rebuild_or_exit`] and the
//! `rebuild_yourself!()` macro are the variants binaries call, which do exit.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::config::{CompileMode, RebuildConfig};
use crate::logging::report_failure;
use crate::process::{Runner, System};
use crate::{Command, FlintResult};

/// Status used when a successful compile still leaves the artifact stale.
pub const STATUS_STILL_STALE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    ArtifactMissing,
    SourceNewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    Stale(StaleReason),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

/// What the caller should do after a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The artifact is current; run the normal build logic.
    Proceed,
    /// A rebuild happened. The process must end with this status.
    Terminated(i32),
}

fn mtime(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

fn stamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Decide whether `artifact` is out of date with respect to `source`.
///
/// A missing artifact is always stale. Otherwise the source must be strictly
/// newer. Any other unreadable timestamp counts as fresh.
pub fn check_staleness(source: &Path, artifact: &Path) -> Staleness {
    let artifact_time = match mtime(artifact) {
        Ok(time) => time,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist", artifact.display());
            return Staleness::Stale(StaleReason::ArtifactMissing);
        }
        Err(err) => {
            warn!("cannot stat {}: {err}", artifact.display());
            return Staleness::Fresh;
        }
    };

    let source_time = match mtime(source) {
        Ok(time) => time,
        Err(err) => {
            warn!("cannot stat {}: {err}", source.display());
            return Staleness::Fresh;
        }
    };

    debug!(
        "{} modified {}, {} modified {}",
        source.display(),
        stamp(source_time),
        artifact.display(),
        stamp(artifact_time)
    );

    if source_time > artifact_time {
        Staleness::Stale(StaleReason::SourceNewer)
    } else {
        Staleness::Fresh
    }
}

/// Path used to execute `artifact`; a bare file name gets a `./` prefix so
/// it is never resolved through `PATH`.
fn exec_path(artifact: &Path) -> PathBuf {
    if artifact.is_relative() && artifact.components().count() == 1 {
        Path::new(".").join(artifact)
    } else {
        artifact.to_path_buf()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub struct Rebuilder<R = System> {
    config: RebuildConfig,
    runner: R,
}

impl Rebuilder<System> {
    pub fn new(config: RebuildConfig) -> Self {
        Self::with_runner(config, System)
    }
}

impl<R: Runner> Rebuilder<R> {
    pub fn with_runner(config: RebuildConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &RebuildConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn staleness(&self) -> Staleness {
        check_staleness(&self.config.source, &self.config.artifact)
    }

    /// `compiler flags.. source -o artifact`, or `compiler flags..` in
    /// cargo mode.
    pub fn compile_command(&self) -> Command {
        let mut cmd = Command::new();
        cmd.arg(self.config.compiler.as_str()).args(&self.config.flags);
        if self.config.mode == CompileMode::Direct {
            cmd.arg(path_arg(&self.config.source))
                .arg("-o")
                .arg(path_arg(&self.config.artifact));
        }
        cmd
    }

    pub fn exec_command(&self) -> Command {
        let mut cmd = Command::new();
        cmd.arg(path_arg(&exec_path(&self.config.artifact)));
        cmd
    }

    /// Run the staleness check and, if needed, rebuild and re-execute.
    ///
    /// A failed compile terminates with the compiler's status and the
    /// artifact is not run. Neither is an artifact the compile did not
    /// refresh (e.g. cargo wrote its output elsewhere), which would
    /// otherwise rebuild and re-execute itself forever.
    pub fn check(&mut self) -> FlintResult<Outcome> {
        let reason = match self.staleness() {
            Staleness::Fresh => return Ok(Outcome::Proceed),
            Staleness::Stale(reason) => reason,
        };

        match reason {
            StaleReason::ArtifactMissing => info!(
                "{} not found, building it from {}",
                self.config.artifact.display(),
                self.config.source.display()
            ),
            StaleReason::SourceNewer => info!(
                "{} changed, rebuilding {}",
                self.config.source.display(),
                self.config.artifact.display()
            ),
        }

        let status = self.runner.run(&self.compile_command())?;
        if status != 0 {
            report_failure("rebuild failed");
            return Ok(Outcome::Terminated(status));
        }

        if self.staleness().is_stale() {
            report_failure(format!(
                "{} is still older than {} after rebuilding",
                self.config.artifact.display(),
                self.config.source.display()
            ));
            return Ok(Outcome::Terminated(STATUS_STILL_STALE));
        }

        let status = self.runner.run(&self.exec_command())?;
        Ok(Outcome::Terminated(status))
    }
}

/// Rebuild and re-execute the running program if its source changed.
///
/// `defaults` are layered under the `FLINT_*` environment. Returns only when
/// no rebuild was needed; otherwise the process exits with the status of the
/// rebuilt program (or of the failed compile).
pub fn rebuild_or_exit(defaults: FlintResult<RebuildConfig>) {
    let outcome = defaults
        .and_then(RebuildConfig::load_with)
        .and_then(|config| Rebuilder::new(config).check());

    match outcome {
        Ok(Outcome::Proceed) => {}
        Ok(Outcome::Terminated(code)) => std::process::exit(code),
        Err(err) => {
            report_failure(err);
            std::process::exit(1);
        }
    }
}
