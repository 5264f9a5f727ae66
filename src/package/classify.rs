//! Splitting descriptors by dependency set and spotting a core package upgrade.

use super::{PackageDescriptor, PackageKind};

/// Name of the package that carries the CLI itself.
pub const CORE_PACKAGE: &str = "expo";

/// Partition descriptors into (runtime, development), keeping input order within each group.
pub fn classify(
    packages: &[PackageDescriptor],
) -> (Vec<&PackageDescriptor>, Vec<&PackageDescriptor>) {
    packages
        .iter()
        .partition(|dep| dep.kind == PackageKind::Runtime)
}

/// Find the core package among the runtime dependencies. The first match wins.
pub fn find_core_upgrade<'a>(dependencies: &[&'a PackageDescriptor]) -> Option<&'a PackageDescriptor> {
    dependencies
        .iter()
        .copied()
        .find(|dep| dep.name == CORE_PACKAGE)
}
