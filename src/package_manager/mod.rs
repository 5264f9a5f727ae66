//! Node package manager handles.
//!
//! The [`PackageManager`] trait is the seam between install orchestration and
//! the actual `npm`/`yarn`/`pnpm`/`bun` processes, so orchestration can be
//! tested without spawning anything.

mod command;
mod kind;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::runtime::{ExecutionOptions, Runtime};

pub use command::{FOLLOW_UP_COMMAND, self_upgrade_command, versioned_specs, with_passthrough};
pub use kind::PackageManagerKind;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Display name, e.g. `yarn`
    fn name(&self) -> &str;

    /// Executable used to build shell commands
    fn bin(&self) -> &str;

    /// How processes of this package manager are launched
    fn options(&self) -> &ExecutionOptions;

    /// Full argument list (without the executable) for adding runtime dependencies.
    fn add_command_options(&self, args: &[String]) -> Vec<String>;

    /// Full argument list (without the executable) for adding development dependencies.
    fn add_dev_command_options(&self, args: &[String]) -> Vec<String>;

    /// Add runtime dependencies. `args` may mix flags and `name@range` specs.
    async fn add(&self, args: &[String]) -> Result<()>;

    /// Add development dependencies.
    async fn add_dev(&self, args: &[String]) -> Result<()>;
}

/// A package manager driven through its command line interface.
pub struct NodePackageManager<R: Runtime> {
    kind: PackageManagerKind,
    runtime: Arc<R>,
    options: ExecutionOptions,
}

impl<R: Runtime> NodePackageManager<R> {
    pub fn new(kind: PackageManagerKind, runtime: Arc<R>, mut options: ExecutionOptions) -> Self {
        // Silence install-time advertisements
        for key in ["ADBLOCK", "DISABLE_OPENCOLLECTIVE"] {
            options
                .env
                .entry(key.to_string())
                .or_insert_with(|| "1".to_string());
        }

        Self {
            kind,
            runtime,
            options,
        }
    }

    fn command_options(leading: &[&str], args: &[String]) -> Vec<String> {
        leading
            .iter()
            .map(|s| s.to_string())
            .chain(args.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl<R: Runtime> PackageManager for NodePackageManager<R> {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn bin(&self) -> &str {
        self.kind.bin()
    }

    fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    fn add_command_options(&self, args: &[String]) -> Vec<String> {
        Self::command_options(self.kind.add_args(), args)
    }

    fn add_dev_command_options(&self, args: &[String]) -> Vec<String> {
        Self::command_options(self.kind.add_dev_args(), args)
    }

    #[tracing::instrument(skip(self), fields(manager = self.kind.name()))]
    async fn add(&self, args: &[String]) -> Result<()> {
        let argv = self.add_command_options(args);
        self.runtime
            .run_command(self.bin(), &argv, &self.options)
            .await
    }

    #[tracing::instrument(skip(self), fields(manager = self.kind.name()))]
    async fn add_dev(&self, args: &[String]) -> Result<()> {
        let argv = self.add_dev_command_options(args);
        self.runtime
            .run_command(self.bin(), &argv, &self.options)
            .await
    }
}
