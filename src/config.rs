//! Rebuild configuration.
//!
//! [`RebuildConfig::default`] describes a standalone build script `flint.rs`
//! compiled by `rustc` into `./flint`. Binaries built by cargo use
//! [`RebuildConfig::for_binary`] instead (through `rebuild_yourself!()`),
//! which watches the binary's own source, treats the running executable as
//! the artifact and rebuilds it with `cargo build`.
//!
//! Each key may be overridden through a `FLINT_`-prefixed environment
//! variable, e.g. `FLINT_COMPILER=clang` or `FLINT_MODE=direct`.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::FlintResult;

pub const ENV_PREFIX: &str = "FLINT_";

/// How the compile command is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// `compiler flags.. source -o artifact`
    #[default]
    Direct,
    /// `compiler flags..`; the tool decides where the artifact goes.
    Cargo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildConfig {
    /// Build-description source watched for changes.
    pub source: PathBuf,
    /// Compiled form of `source`; normally the running program itself.
    pub artifact: PathBuf,
    pub compiler: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub mode: CompileMode,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("flint.rs"),
            artifact: PathBuf::from("flint"),
            compiler: String::from("rustc"),
            flags: Vec::new(),
            mode: CompileMode::Direct,
        }
    }
}

impl RebuildConfig {
    /// Defaults for a cargo-built binary.
    ///
    /// `file` is the binary's `file!()`, which rustc reports relative to the
    /// workspace root; it is resolved against `manifest_dir` and its
    /// ancestors. The artifact is the running executable.
    pub fn for_binary(manifest_dir: &Path, file: &str, bin: &str, release: bool) -> FlintResult<Self> {
        let source = manifest_dir
            .ancestors()
            .map(|dir| dir.join(file))
            .find(|path| path.exists())
            .unwrap_or_else(|| manifest_dir.join(file));
        let artifact = std::env::current_exe()?;

        let mut flags = vec![
            String::from("build"),
            String::from("--manifest-path"),
            manifest_dir.join("Cargo.toml").to_string_lossy().into_owned(),
            String::from("--bin"),
            String::from(bin),
        ];
        if release {
            flags.push(String::from("--release"));
        }

        Ok(Self {
            source,
            artifact,
            compiler: String::from("cargo"),
            flags,
            mode: CompileMode::Cargo,
        })
    }

    /// `defaults` layered under the environment.
    pub fn figment_with(defaults: RebuildConfig) -> Figment {
        Figment::from(Serialized::defaults(defaults)).merge(
            Env::prefixed(ENV_PREFIX).only(&["source", "artifact", "compiler", "flags", "mode"]),
        )
    }

    pub fn figment() -> Figment {
        Self::figment_with(RebuildConfig::default())
    }

    pub fn load() -> FlintResult<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn load_with(defaults: RebuildConfig) -> FlintResult<Self> {
        Ok(Self::figment_with(defaults).extract()?)
    }
}
