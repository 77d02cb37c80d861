#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Output;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

const FAKE_CC: &str = "#!/bin/sh
echo 'cc running'
for arg; do out=$arg; done
echo built > \"$out\"
exit 3
";

/// Copies the source (third argument from the end) over the artifact (last).
const COPY_COMPILER: &str = "#!/bin/sh
for arg; do src=$dash; dash=$out; out=$arg; done
cp \"$src\" \"$out\" && chmod +x \"$out\"
";

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A work directory with a fake `cc` first on `PATH`.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("bin")).unwrap();
    write_script(&dir.path().join("bin/cc"), FAKE_CC);
    fs::write(dir.path().join("main.c"), "int main(void) { return 0; }\n").unwrap();
    dir
}

fn flint(dir: &TempDir, env: &[(&str, String)]) -> Output {
    let path = format!(
        "{}:{}",
        dir.path().join("bin").display(),
        std::env::var("PATH").unwrap_or_default()
    );
    // duct gives the innermost (earliest) env setting precedence, so the
    // per-test overrides are applied before the blanket removals.
    let mut expr = duct::cmd!(env!("CARGO_BIN_EXE_flint"));
    for (key, value) in env {
        expr = expr.env(*key, value.as_str());
    }
    expr.dir(dir.path())
        .env("PATH", path)
        .env("RUST_LOG", "off")
        .env_remove("FLINT_SOURCE")
        .env_remove("FLINT_ARTIFACT")
        .env_remove("FLINT_COMPILER")
        .env_remove("FLINT_FLAGS")
        .env_remove("FLINT_MODE")
        .stdout_capture().stderr_capture().unchecked().run().unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn up_to_date_binary_runs_its_build_step() {
    let dir = workspace();
    let source = dir.path().join("old.rs");
    fs::write(&source, "").unwrap();
    fs::File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();

    let output = flint(&dir, &[("FLINT_SOURCE", source.display().to_string())]);
    let stdout = text(&output.stdout);
    let stderr = text(&output.stderr);

    assert_eq!(output.status.code(), Some(3), "stdout: {stdout}\nstderr: {stderr}");
    assert_eq!(fs::read_to_string(dir.path().join("exe")).unwrap(), "built\n");

    let echoed = stdout.find("[CMD] cc main.c -o exe").unwrap();
    let ran = stdout.find("cc running").unwrap();
    assert!(echoed < ran, "stdout: {stdout}");

    // Still reported with logging switched off.
    assert!(stderr.contains("[ERROR] cc exited abnormally with code 3"), "stderr: {stderr}");
}

#[test]
fn stale_binary_rebuilds_reexecs_and_stops() {
    let dir = workspace();
    let source = dir.path().join("build.sh");
    let artifact = dir.path().join("build");
    let compiler = dir.path().join("compile");
    fs::write(&source, "#!/bin/sh\necho rebuilt\nexit 7\n").unwrap();
    write_script(&compiler, COPY_COMPILER);

    let output = flint(
        &dir,
        &[
            ("FLINT_SOURCE", source.display().to_string()),
            ("FLINT_ARTIFACT", artifact.display().to_string()),
            ("FLINT_COMPILER", compiler.display().to_string()),
            ("FLINT_MODE", String::from("direct")),
        ],
    );
    let stdout = text(&output.stdout);

    assert_eq!(output.status.code(), Some(7), "stdout: {stdout}");
    assert!(stdout.contains(&format!(
        "{} -o {}",
        source.display(),
        artifact.display()
    )));
    assert!(stdout.contains(&format!("[CMD] {}\n", artifact.display())));
    assert!(stdout.contains("rebuilt"));

    // The build step after the rebuild never ran.
    assert!(!stdout.contains("cc running"));
    assert!(!dir.path().join("exe").exists());
}

#[test]
fn failed_rebuild_exits_with_compiler_status() {
    let dir = workspace();
    let source = dir.path().join("build.sh");
    let compiler = dir.path().join("compile");
    fs::write(&source, "#!/bin/sh\nexit 0\n").unwrap();
    write_script(&compiler, "#!/bin/sh\nexit 4\n");

    let output = flint(
        &dir,
        &[
            ("FLINT_SOURCE", source.display().to_string()),
            ("FLINT_ARTIFACT", dir.path().join("build").display().to_string()),
            ("FLINT_COMPILER", compiler.display().to_string()),
        ],
    );

    assert_eq!(output.status.code(), Some(4));
    assert!(text(&output.stderr).contains("[ERROR] rebuild failed"));
    assert!(!dir.path().join("exe").exists());
}

#[test]
fn arguments_are_rejected() {
    let dir = workspace();
    let output = duct::cmd!(env!("CARGO_BIN_EXE_flint"), "extra")
        .dir(dir.path())
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("exe").exists());
}
