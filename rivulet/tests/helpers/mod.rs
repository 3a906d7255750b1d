//! Runs the `rivulet` binary for the integration tests.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use wait_timeout::ChildExt;

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) success: bool,
    pub(crate) stdout: String,
}

impl Run {
    /// The lines of the output which are not log messages.
    pub(crate) fn output_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter(|line| !line.starts_with('%'))
            .collect()
    }

    pub(crate) fn count_lines(&self, expected: &str) -> usize {
        self.output_lines()
            .into_iter()
            .filter(|&line| line == expected)
            .count()
    }
}

pub(crate) fn run_rivulet<'a>(args: impl IntoIterator<Item = &'a str>) -> Run {
    let binary = PathBuf::from(env!("CARGO_BIN_EXE_rivulet"));

    let mut child = Command::new(binary)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("could not spawn rivulet");

    let status = match child
        .wait_timeout(TEST_TIMEOUT)
        .expect("failed to run rivulet")
    {
        Some(status) => status,
        None => {
            child.kill().expect("could not kill rivulet");
            let _ = child.wait().expect("could not wait for rivulet");
            panic!("rivulet ran for longer than {} seconds", TEST_TIMEOUT.as_secs());
        }
    };

    let mut stdout = String::new();
    let _ = child
        .stdout
        .take()
        .expect("stdout is piped")
        .read_to_string(&mut stdout)
        .expect("stdout is valid UTF-8");

    Run {
        success: status.success(),
        stdout,
    }
}
