//! Fix use case - brings mismatched dependencies to the versions an SDK expects.
//!
//! Given descriptors that already carry their expected versions, this use case either:
//! - hands off to a detached `expo` upgrade followed by a fresh fix run, when the
//!   core package itself is out of date, or
//! - installs runtime dependencies (then applies their config plugins) and
//!   development dependencies, one after the other.

use std::path::Path;

use anyhow::Result;
use log::{debug, warn};

use crate::package::{
    CORE_PACKAGE, OperationCounts, PackageDescriptor, classify, find_core_upgrade, operation_log,
};
use crate::package_manager::{
    FOLLOW_UP_COMMAND, PackageManager, self_upgrade_command, versioned_specs, with_passthrough,
};
use crate::plugins::PluginApplier;
use crate::runtime::Runtime;
use crate::ui::Logger;

/// Options for the fix use case
#[derive(Debug, Clone, Default)]
pub struct FixPackagesOptions {
    /// Packages at the wrong version, with resolved expected versions
    pub packages: Vec<PackageDescriptor>,
    /// SDK the packages are versioned for, e.g. `47.0.0`
    pub sdk_version: String,
    /// Extra arguments passed to every package manager invocation, e.g. `--no-save`
    pub package_manager_arguments: Vec<String>,
}

/// Fix use case - decides between a core self-upgrade and a direct install
pub struct FixPackagesUseCase<'a, R: Runtime> {
    runtime: &'a R,
    package_manager: &'a dyn PackageManager,
    plugins: &'a dyn PluginApplier,
    logger: &'a dyn Logger,
}

impl<'a, R: Runtime> FixPackagesUseCase<'a, R> {
    pub fn new(
        runtime: &'a R,
        package_manager: &'a dyn PackageManager,
        plugins: &'a dyn PluginApplier,
        logger: &'a dyn Logger,
    ) -> Self {
        Self {
            runtime,
            package_manager,
            plugins,
            logger,
        }
    }

    /// Install the expected versions of `options.packages`.
    ///
    /// Errors from the package manager and the plugin applier are returned as is.
    /// A failing runtime install stops before plugins and development dependencies.
    #[tracing::instrument(skip(self, options), fields(packages = options.packages.len()))]
    pub async fn fix_packages(&self, project_root: &Path, options: &FixPackagesOptions) -> Result<()> {
        if options.packages.is_empty() {
            return Ok(());
        }

        let (dependencies, dev_dependencies) = classify(&options.packages);
        debug!(
            "{} runtime and {} development dependencies to fix",
            dependencies.len(),
            dev_dependencies.len()
        );

        if let Some(core) = find_core_upgrade(&dependencies) {
            self.upgrade_core(core, &options.package_manager_arguments);
            return Ok(());
        }

        let summary = operation_log(OperationCounts {
            // Everything fixable here is versioned by the SDK
            others_count: 0,
            native_modules_count: options.packages.len(),
            sdk_version: &options.sdk_version,
        });
        let summary = if summary.is_empty() {
            String::new()
        } else {
            format!("{} ", summary.join(" and "))
        };
        self.logger.log(&format!(
            "\u{203a} Installing {}using {}",
            summary,
            self.package_manager.name()
        ));

        // Runtime then development: both rewrite the same manifest and lockfile.
        if !dependencies.is_empty() {
            let specs = versioned_specs(&dependencies);
            self.package_manager
                .add(&with_passthrough(&options.package_manager_arguments, &specs))
                .await?;
            self.plugins.apply_plugins(project_root, &specs).await?;
        }

        if !dev_dependencies.is_empty() {
            let specs = versioned_specs(&dev_dependencies);
            self.package_manager
                .add_dev(&with_passthrough(&options.package_manager_arguments, &specs))
                .await?;
        }

        Ok(())
    }

    /// Start the core upgrade and the follow-up fix in a detached shell, without waiting.
    fn upgrade_core(&self, core: &PackageDescriptor, passthrough: &[String]) {
        self.logger.log(&format!(
            "\u{203a} Updating {} using {} and then running {} under the updated {} version.",
            CORE_PACKAGE,
            self.package_manager.name(),
            FOLLOW_UP_COMMAND,
            CORE_PACKAGE
        ));

        let command = self_upgrade_command(
            self.package_manager,
            passthrough,
            &core.expected_version_or_range,
        );
        debug!("Handing off to `{}`", command);

        if let Err(e) = self
            .runtime
            .spawn_detached(&command, self.package_manager.options())
        {
            warn!("Failed to start `{}`: {:#}", command, e);
        }
    }
}
