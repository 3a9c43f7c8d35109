//! A test suite to test the `stackcheck` CLI itself.
//!
//! This test suite will look for `*.json` modules in the `tests/cli/**`
//! directory, recursively. Each module may have a sibling `*.args` file with
//! a directive of the form:
//!
//!     RUN: ...
//!
//! where `...` is a space-separate set of command to pass to the `stackcheck`
//! CLI. The `%` argument is replaced with the path to the module. For
//! example:
//!
//!     RUN: dump %
//!
//! would execute `stackcheck dump the-current-file.json`. A `FAIL: ...`
//! directive runs the same way but expects the command to fail. Modules
//! without an `*.args` file run `validate %`. The `cli` directory
//! additionally contains `*.stdout` and `*.stderr` files to assert the output
//! of the subcommand. Files are not present if the stdout/stderr are empty.
//!
//! Use `BLESS=1` in the environment to auto-update expectation files. Be sure
//! to look at the diff!

use anyhow::{bail, Context, Result};
use libtest_mimic::{Arguments, Trial};
use pretty_assertions::StrComparison;
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn main() {
    let mut tests = Vec::new();
    find_tests("tests/cli".as_ref(), &mut tests);
    tests.sort();
    let bless = env::var("BLESS").is_ok();

    let mut trials = Vec::new();
    for test in tests {
        let trial = Trial::test(format!("{test:?}"), move || {
            run_test(&test, bless)
                .with_context(|| format!("failed test {test:?}"))
                .map_err(|e| format!("{e:?}").into())
        });
        trials.push(trial);
    }

    let args = Arguments::from_args();
    libtest_mimic::run(&args, trials).exit();
}

fn stackcheck_exe() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stackcheck"))
}

fn run_test(test: &Path, bless: bool) -> Result<()> {
    let args = test.with_extension("args");
    let directive = if args.exists() {
        std::fs::read_to_string(&args).with_context(|| format!("failed to read {args:?}"))?
    } else {
        "RUN: validate %".to_string()
    };
    let (line, should_fail) = directive
        .lines()
        .filter_map(|l| {
            let run = l.strip_prefix("RUN: ");
            let fail = l.strip_prefix("FAIL: ");
            run.map(|l| (l, false)).or(fail.map(|l| (l, true)))
        })
        .next()
        .with_context(|| format!("no line found with `RUN: ` directive in {args:?}"))?;

    let mut cmd = stackcheck_exe();
    let tempdir = TempDir::new()?;
    for arg in line.split_whitespace() {
        if arg == "%" {
            cmd.arg(test);
        } else if arg == "%tmpdir" {
            cmd.arg(tempdir.path());
        } else {
            cmd.arg(arg);
        }
    }

    let output = execute(&mut cmd, should_fail)?;
    let extension = test.extension().and_then(|s| s.to_str()).unwrap_or("json");
    assert_output(
        bless,
        &output.stdout,
        &test.with_extension(format!("{extension}.stdout")),
        &tempdir,
    )
    .context("failed to check stdout expectation (auto-update with BLESS=1)")?;
    assert_output(
        bless,
        &output.stderr,
        &test.with_extension(format!("{extension}.stderr")),
        &tempdir,
    )
    .context("failed to check stderr expectation (auto-update with BLESS=1)")?;
    Ok(())
}

fn execute(cmd: &mut Command, should_fail: bool) -> Result<Output> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    // Keep log output and error reports independent of the outer
    // environment.
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("RUST_BACKTRACE");
    cmd.env_remove("RUST_LIB_BACKTRACE");
    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn {cmd:?}"))?;

    if !output.status.success() {
        if !should_fail {
            bail!(
                "{cmd:?} failed:
                status: {}
                stdout: {}
                stderr: {}",
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    } else if should_fail {
        bail!(
            "{cmd:?} succeeded instead of failed
                stdout: {}
                stderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

fn assert_output(bless: bool, output: &[u8], path: &Path, tempdir: &TempDir) -> Result<()> {
    let tempdir = tempdir.path().to_string_lossy();
    // sanitize the output to be consistent across platforms and handle per-test
    // differences such as `%tmpdir`.
    let output = String::from_utf8_lossy(output)
        .replace(tempdir.as_ref(), "%tmpdir")
        .replace('\\', "/");

    if bless {
        if output.is_empty() {
            drop(std::fs::remove_file(path));
        } else {
            std::fs::write(path, output).with_context(|| format!("failed to write {path:?}"))?;
        }
        return Ok(());
    }

    if output.is_empty() {
        if path.exists() {
            bail!("command had no output but {path:?} exists");
        } else {
            Ok(())
        }
    } else {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {path:?}"))?
            .replace("\r\n", "\n");
        if output != contents {
            bail!(
                "failed test: result is not as expected:{}",
                StrComparison::new(&contents, &output),
            );
        }
        Ok(())
    }
}

fn find_tests(path: &Path, tests: &mut Vec<PathBuf>) {
    for f in path.read_dir().unwrap() {
        let f = f.unwrap();
        if f.file_type().unwrap().is_dir() {
            find_tests(&f.path(), tests);
            continue;
        }
        match f.path().extension().and_then(|s| s.to_str()) {
            Some("json") => {}
            _ => continue,
        }
        tests.push(f.path());
    }
}
