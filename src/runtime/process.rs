//! Child process operations (awaited commands and detached shell commands).

use anyhow::{Context, Result, bail};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::RealRuntime;

/// How a package manager process is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Working directory of the child process (the project root)
    pub cwd: PathBuf,
    /// Variables added on top of the inherited environment
    pub env: BTreeMap<String, String>,
    /// Discard the child's stdout and stderr
    pub silent: bool,
}

impl ExecutionOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: BTreeMap::new(),
            silent: false,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn stdout(&self) -> Stdio {
        if self.silent {
            Stdio::null()
        } else {
            Stdio::inherit()
        }
    }

    fn stderr(&self) -> Stdio {
        if self.silent {
            Stdio::null()
        } else {
            Stdio::inherit()
        }
    }
}

#[cfg(not(windows))]
fn shell_command(command: &str, cwd: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str, cwd: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.arg("/C").arg(command).current_dir(cwd);
    cmd
}

#[cfg(not(windows))]
fn program_command(program: &str, args: &[String]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args);
    cmd
}

// Started directly rather than through `cmd /C`, so std applies batch file
// argument escaping to `.cmd` shims and ranges like `^4.6.3` or
// `>=1.0.0 <2.0.0` reach the package manager intact.
#[cfg(windows)]
fn program_command(program: &str, args: &[String]) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(windows_program(program));
    cmd.args(args);
    cmd
}

/// `bun` ships a real `.exe`; npm, yarn and pnpm are `.cmd` shims.
#[cfg(windows)]
fn windows_program(program: &str) -> PathBuf {
    if Path::new(program).extension().is_some() {
        return PathBuf::from(program);
    }

    let exe = PathBuf::from(format!("{}.exe", program));
    let has_exe = if exe.components().count() > 1 {
        exe.is_file()
    } else {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(&exe).is_file()))
            .unwrap_or(false)
    };

    if has_exe {
        exe
    } else {
        PathBuf::from(format!("{}.cmd", program))
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self, options))]
    pub(crate) async fn run_command_impl(
        &self,
        program: &str,
        args: &[String],
        options: &ExecutionOptions,
    ) -> Result<()> {
        debug!("Running {} {:?} in {:?}", program, args, options.cwd);

        let status = program_command(program, args)
            .current_dir(&options.cwd)
            .envs(&options.env)
            .stdin(Stdio::inherit())
            .stdout(options.stdout())
            .stderr(options.stderr())
            .status()
            .await
            .with_context(|| format!("Failed to start {}", program))?;

        if !status.success() {
            bail!("{} {} failed with {}", program, args.join(" "), status);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, options))]
    pub(crate) fn spawn_detached_impl(
        &self,
        command: &str,
        options: &ExecutionOptions,
    ) -> Result<()> {
        let mut cmd = shell_command(command, &options.cwd);
        cmd.envs(&options.env)
            .stdin(Stdio::null())
            .stdout(options.stdout())
            .stderr(options.stderr());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group, so the child outlives a Ctrl-C aimed at us.
            cmd.process_group(0);
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        // The child handle is dropped right away: it is neither waited on nor killed.
        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", command))?;
        debug!("Detached process {} started: {}", child.id(), command);
        Ok(())
    }
}
