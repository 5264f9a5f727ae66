//! Package descriptors and the pure logic that works on them.
//!
//! This module knows nothing about package managers or processes: it splits
//! descriptors by dependency set, spots an upgrade of the core package, and
//! formats operation summaries.

mod classify;
mod descriptor;
mod operation_log;

pub use classify::{CORE_PACKAGE, classify, find_core_upgrade};
pub use descriptor::{PackageDescriptor, PackageKind, parse_descriptors_json};
pub use operation_log::{OperationCounts, operation_log};
