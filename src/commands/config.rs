use anyhow::{Context, Result, bail};
use log::debug;
use std::path::PathBuf;

use crate::{
    package_manager::PackageManagerKind,
    runtime::{ExecutionOptions, Runtime},
};

/// Environment variable naming the package manager to use when no flag is given.
pub const PACKAGE_MANAGER_ENV: &str = "SDKFIX_PACKAGE_MANAGER";

pub struct Config {
    pub project_root: PathBuf,
    pub package_manager: PackageManagerKind,
    pub execution: ExecutionOptions,
}

impl Config {
    /// Resolve the project root and package manager.
    ///
    /// The package manager comes from the explicit choice, then `SDKFIX_PACKAGE_MANAGER`,
    /// then the nearest lockfile.
    pub fn new<R: Runtime>(
        runtime: &R,
        project_root: Option<PathBuf>,
        package_manager: Option<PackageManagerKind>,
        silent: bool,
    ) -> Result<Self> {
        let project_root = match project_root {
            Some(path) => path,
            None => runtime.current_dir()?,
        };
        if !runtime.is_dir(&project_root) {
            bail!("Project root {:?} is not a directory", project_root);
        }

        let package_manager = match package_manager {
            Some(kind) => kind,
            None => match runtime.env_var(PACKAGE_MANAGER_ENV) {
                Ok(value) => value
                    .parse()
                    .with_context(|| format!("Invalid {}", PACKAGE_MANAGER_ENV))?,
                Err(_) => PackageManagerKind::detect(runtime, &project_root),
            },
        };
        debug!("Using {} in {:?}", package_manager, project_root);

        let execution = ExecutionOptions {
            silent,
            ..ExecutionOptions::new(&project_root)
        };

        Ok(Self {
            project_root,
            package_manager,
            execution,
        })
    }
}
