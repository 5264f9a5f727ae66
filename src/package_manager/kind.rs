//! Supported Node package managers and lockfile based detection.

use anyhow::anyhow;
use log::debug;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerKind {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManagerKind {
    /// Detection order when several lockfiles sit in the same directory.
    pub const ALL: [PackageManagerKind; 4] = [
        PackageManagerKind::Yarn,
        PackageManagerKind::Npm,
        PackageManagerKind::Pnpm,
        PackageManagerKind::Bun,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PackageManagerKind::Npm => "npm",
            PackageManagerKind::Yarn => "yarn",
            PackageManagerKind::Pnpm => "pnpm",
            PackageManagerKind::Bun => "bun",
        }
    }

    /// Executable name, looked up on PATH.
    pub fn bin(&self) -> &'static str {
        self.name()
    }

    pub fn lockfiles(&self) -> &'static [&'static str] {
        match self {
            PackageManagerKind::Npm => &["package-lock.json"],
            PackageManagerKind::Yarn => &["yarn.lock"],
            PackageManagerKind::Pnpm => &["pnpm-lock.yaml"],
            PackageManagerKind::Bun => &["bun.lockb", "bun.lock"],
        }
    }

    /// Leading arguments of the command that adds runtime dependencies.
    pub fn add_args(&self) -> &'static [&'static str] {
        match self {
            PackageManagerKind::Npm => &["install", "--save"],
            PackageManagerKind::Yarn | PackageManagerKind::Pnpm | PackageManagerKind::Bun => {
                &["add"]
            }
        }
    }

    /// Leading arguments of the command that adds development dependencies.
    pub fn add_dev_args(&self) -> &'static [&'static str] {
        match self {
            PackageManagerKind::Npm => &["install", "--save-dev"],
            PackageManagerKind::Yarn | PackageManagerKind::Bun => &["add", "--dev"],
            PackageManagerKind::Pnpm => &["add", "--save-dev"],
        }
    }

    /// Pick the package manager owning the project, based on the nearest lockfile
    /// found in `project_root` or any of its ancestors. Falls back to npm.
    #[tracing::instrument(skip(runtime))]
    pub fn detect<R: Runtime + ?Sized>(runtime: &R, project_root: &Path) -> PackageManagerKind {
        for dir in project_root.ancestors() {
            for kind in Self::ALL {
                if let Some(lockfile) = kind
                    .lockfiles()
                    .iter()
                    .find(|lockfile| runtime.exists(&dir.join(lockfile)))
                {
                    debug!("Found {} in {:?}, using {}", lockfile, dir, kind);
                    return kind;
                }
            }
        }

        debug!("No lockfile found above {:?}, defaulting to npm", project_root);
        PackageManagerKind::Npm
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageManagerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown package manager '{}'. Expected one of: npm, yarn, pnpm, bun.",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    fn runtime_with_files(files: Vec<PathBuf>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(move |p| files.iter().any(|f| f == p));
        runtime
    }

    #[test]
    fn test_detect_yarn_in_project_root() {
        let runtime = runtime_with_files(vec![PathBuf::from("/work/app/yarn.lock")]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/app"));
        assert_eq!(kind, PackageManagerKind::Yarn);
    }

    #[test]
    fn test_detect_lockfile_in_workspace_root() {
        // Monorepo: the lockfile lives above the app directory
        let runtime = runtime_with_files(vec![PathBuf::from("/work/pnpm-lock.yaml")]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/apps/mobile"));
        assert_eq!(kind, PackageManagerKind::Pnpm);
    }

    #[test]
    fn test_detect_nearest_lockfile_wins() {
        let runtime = runtime_with_files(vec![
            PathBuf::from("/work/yarn.lock"),
            PathBuf::from("/work/app/bun.lockb"),
        ]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/app"));
        assert_eq!(kind, PackageManagerKind::Bun);
    }

    #[test]
    fn test_detect_prefers_yarn_over_npm_in_same_dir() {
        let runtime = runtime_with_files(vec![
            PathBuf::from("/work/app/package-lock.json"),
            PathBuf::from("/work/app/yarn.lock"),
        ]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/app"));
        assert_eq!(kind, PackageManagerKind::Yarn);
    }

    #[test]
    fn test_detect_text_bun_lockfile() {
        let runtime = runtime_with_files(vec![PathBuf::from("/work/app/bun.lock")]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/app"));
        assert_eq!(kind, PackageManagerKind::Bun);
    }

    #[test]
    fn test_detect_defaults_to_npm() {
        let runtime = runtime_with_files(vec![]);
        let kind = PackageManagerKind::detect(&runtime, Path::new("/work/app"));
        assert_eq!(kind, PackageManagerKind::Npm);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("pnpm".parse::<PackageManagerKind>().unwrap(), PackageManagerKind::Pnpm);
        assert_eq!(" Yarn ".parse::<PackageManagerKind>().unwrap(), PackageManagerKind::Yarn);
        let err = "cargo".parse::<PackageManagerKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown package manager"));
    }

    #[test]
    fn test_add_args() {
        assert_eq!(PackageManagerKind::Npm.add_args(), &["install", "--save"]);
        assert_eq!(
            PackageManagerKind::Npm.add_dev_args(),
            &["install", "--save-dev"]
        );
        assert_eq!(PackageManagerKind::Yarn.add_dev_args(), &["add", "--dev"]);
        assert_eq!(PackageManagerKind::Pnpm.add_dev_args(), &["add", "--save-dev"]);
        assert_eq!(PackageManagerKind::Bun.add_args(), &["add"]);
    }
}
