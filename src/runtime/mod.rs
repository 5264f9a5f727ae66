//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over system operations,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Environment variables and working directory
//! - `fs` - File system operations (read, write, existence checks)
//! - `process` - Awaited and detached child processes

mod env;
mod fs;
mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::env as std_env;
use std::path::{Path, PathBuf};

pub use process::ExecutionOptions;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    // Processes
    /// Run `program` with `args` and wait for it to exit.
    /// A non-zero exit status is an error.
    async fn run_command(
        &self,
        program: &str,
        args: &[String],
        options: &ExecutionOptions,
    ) -> Result<()>;

    /// Launch `command` through the platform shell as a detached process.
    /// Returns as soon as the process has been started; its exit status is never observed.
    fn spawn_detached(&self, command: &str, options: &ExecutionOptions) -> Result<()>;
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    async fn run_command(
        &self,
        program: &str,
        args: &[String],
        options: &ExecutionOptions,
    ) -> Result<()> {
        self.run_command_impl(program, args, options).await
    }

    fn spawn_detached(&self, command: &str, options: &ExecutionOptions) -> Result<()> {
        self.spawn_detached_impl(command, options)
    }
}
