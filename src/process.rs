//! # External Commands
//!
//! Every `svn`, `git`, `rsync` and bootstrap invocation goes through the
//! `CommandRunner` trait. The default `SystemRunner` spawns real processes;
//! tests substitute a scripted runner that records what would have been run
//! and answers with canned exit codes, so the reconciliation logic can be
//! exercised without any VCS binary installed.
//!
//! Commands never rely on the process working directory: each `CommandSpec`
//! carries the directory it runs in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// A command line plus the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: &str, cwd: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line as a single string, for logs and errors.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Exit status and (for captured runs) output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into `Error::CommandFailed`.
    pub fn check(self, spec: &CommandSpec) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: spec.command_line(),
                code: self.code,
            })
        }
    }
}

/// Runs external commands - allows mocking in tests
pub trait CommandRunner: Send + Sync {
    /// Run with inherited stdio so the user sees VCS progress as it happens.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run with stdout and stderr captured.
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Whether `program` can be found on the `PATH`.
    fn is_available(&self, program: &str) -> bool;
}

/// The default implementation of `CommandRunner`, which spawns real
/// processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).current_dir(&spec.cwd);
        command
    }

    fn spawn_error(spec: &CommandSpec, err: std::io::Error) -> Error {
        Error::CommandSpawn {
            command: spec.command_line(),
            message: err.to_string(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("execute {} (in {})", spec, spec.cwd.display());
        let status = Self::command(spec)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(spec, e))?;
        Ok(CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        })
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("capture {} (in {})", spec, spec.cwd.display());
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(spec, e))?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        find_on_path(program).is_some()
    }
}

/// Locate `program` in the directories of `PATH`.
///
/// On Windows the usual executable extensions are tried as well.
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    let extensions: &[&str] = if cfg!(windows) {
        &["", ".exe", ".bat", ".cmd"]
    } else {
        &[""]
    };
    std::env::split_paths(&path).find_map(|dir| {
        extensions.iter().find_map(|ext| {
            let candidate = dir.join(format!("{}{}", program, ext));
            candidate.is_file().then_some(candidate)
        })
    })
}
