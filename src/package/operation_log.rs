//! Human readable summaries of what an install is about to change.

/// Counts describing an install operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationCounts<'a> {
    pub others_count: usize,
    pub native_modules_count: usize,
    /// e.g. `47.0.0`
    pub sdk_version: &'a str,
}

/// Build the summary phrases for an install, e.g.
/// `["2 SDK 47.0.0 compatible native modules", "1 other package"]`.
/// Zero counts produce no phrase.
pub fn operation_log(counts: OperationCounts<'_>) -> Vec<String> {
    let mut messages = Vec::new();

    if counts.native_modules_count > 0 {
        messages.push(format!(
            "{} SDK {} compatible native {}",
            counts.native_modules_count,
            counts.sdk_version,
            plural(counts.native_modules_count, "module", "modules")
        ));
    }

    if counts.others_count > 0 {
        messages.push(format!(
            "{} other {}",
            counts.others_count,
            plural(counts.others_count, "package", "packages")
        ));
    }

    messages
}

fn plural<'s>(count: usize, one: &'s str, many: &'s str) -> &'s str {
    if count == 1 { one } else { many }
}
