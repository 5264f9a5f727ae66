//! Building package manager argument lists and the self-upgrade shell command.

use crate::package::{CORE_PACKAGE, PackageDescriptor};

use super::PackageManager;

/// Re-runs the fix under the freshly installed core package.
pub const FOLLOW_UP_COMMAND: &str = "npx expo install --fix";

/// `name@range` tokens for each descriptor, in order.
pub fn versioned_specs(packages: &[&PackageDescriptor]) -> Vec<String> {
    packages.iter().map(|dep| dep.versioned_spec()).collect()
}

/// Passthrough arguments first, then the package specs.
pub fn with_passthrough(passthrough: &[String], specs: &[String]) -> Vec<String> {
    passthrough.iter().chain(specs).cloned().collect()
}

/// Shell command that upgrades the core package and, only if that succeeds,
/// runs the fix again under the new version.
pub fn self_upgrade_command(
    package_manager: &dyn PackageManager,
    passthrough: &[String],
    core_version: &str,
) -> String {
    let args = with_passthrough(passthrough, &[format!("{}@{}", CORE_PACKAGE, core_version)]);
    format!(
        "{} {} && {}",
        package_manager.bin(),
        package_manager.add_command_options(&args).join(" "),
        FOLLOW_UP_COMMAND
    )
}
