use anyhow::Result;
use clap::Parser;
use sdkfix::commands::{self, FixRequest};
use sdkfix::package_manager::PackageManagerKind;
use std::path::PathBuf;

/// sdkfix - install the dependency versions an Expo SDK expects
///
/// Takes packages that are at the wrong version, with the versions they should be at,
/// and installs those versions with the project's package manager. When `expo` itself
/// is out of date it is upgraded first and `npx expo install --fix` takes over.
///
/// Examples:
///   sdkfix fix --sdk-version 47.0.0 react-native@0.70.5 --dev @types/react@~18.0.24
///   sdkfix fix --sdk-version 47.0.0 --from fix.json --yarn -- --network-timeout 100000
#[derive(Parser, Debug)]
#[command(author, version = env!("SDKFIX_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory (defaults to the current directory; also via SDKFIX_PROJECT_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "SDKFIX_PROJECT_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub project_root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install the expected versions of mismatched packages
    Fix(FixArgs),

    /// Print the package manager used by the project
    Detect,
}

#[derive(clap::Args, Debug)]
pub struct FixArgs {
    /// Runtime dependencies in the format "name@version"
    #[arg(value_name = "NAME@VERSION")]
    pub packages: Vec<String>,

    /// Development dependency in the format "name@version" (can be repeated)
    #[arg(long = "dev", value_name = "NAME@VERSION")]
    pub dev_packages: Vec<String>,

    /// JSON file with resolved packages
    /// ([{"packageName", "expectedVersionOrRange", "packageType"}])
    #[arg(long = "from", value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// SDK version the packages are versioned for, e.g. 47.0.0
    #[arg(long = "sdk-version", value_name = "VERSION")]
    pub sdk_version: String,

    /// Use npm to install dependencies
    #[arg(long, group = "manager")]
    pub npm: bool,

    /// Use yarn to install dependencies
    #[arg(long, group = "manager")]
    pub yarn: bool,

    /// Use pnpm to install dependencies
    #[arg(long, group = "manager")]
    pub pnpm: bool,

    /// Use bun to install dependencies
    #[arg(long, group = "manager")]
    pub bun: bool,

    /// Hide package manager output
    #[arg(long)]
    pub silent: bool,

    /// Extra arguments passed to the package manager
    #[arg(last = true, value_name = "ARGS")]
    pub package_manager_arguments: Vec<String>,
}

impl FixArgs {
    fn package_manager(&self) -> Option<PackageManagerKind> {
        if self.npm {
            Some(PackageManagerKind::Npm)
        } else if self.yarn {
            Some(PackageManagerKind::Yarn)
        } else if self.pnpm {
            Some(PackageManagerKind::Pnpm)
        } else if self.bun {
            Some(PackageManagerKind::Bun)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = sdkfix::runtime::RealRuntime;

    match cli.command {
        Commands::Fix(args) => {
            let request = FixRequest {
                project_root: cli.project_root,
                package_manager: args.package_manager(),
                specs: args.packages,
                dev_specs: args.dev_packages,
                from: args.from,
                sdk_version: args.sdk_version,
                package_manager_arguments: args.package_manager_arguments,
                silent: args.silent,
            };
            commands::fix(runtime, request).await?
        }
        Commands::Detect => commands::detect(runtime, cli.project_root)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_fix_parsing() {
        let cli = Cli::try_parse_from([
            "sdkfix",
            "fix",
            "--sdk-version",
            "47.0.0",
            "react-native@0.70.5",
            "--dev",
            "@types/react@~18.0.24",
        ])
        .unwrap();
        match cli.command {
            Commands::Fix(args) => {
                assert_eq!(args.packages, vec!["react-native@0.70.5"]);
                assert_eq!(args.dev_packages, vec!["@types/react@~18.0.24"]);
                assert_eq!(args.sdk_version, "47.0.0");
                assert_eq!(args.package_manager(), None);
                assert!(args.package_manager_arguments.is_empty());
            }
            _ => panic!("Expected Fix command"),
        }
        assert_eq!(cli.project_root, None);
    }

    #[test]
    fn test_cli_passthrough_arguments() {
        let cli = Cli::try_parse_from([
            "sdkfix",
            "fix",
            "--sdk-version",
            "47.0.0",
            "--yarn",
            "expo-camera@~13.0.0",
            "--",
            "--network-timeout",
            "100000",
        ])
        .unwrap();
        match cli.command {
            Commands::Fix(args) => {
                assert_eq!(args.packages, vec!["expo-camera@~13.0.0"]);
                assert_eq!(args.package_manager(), Some(PackageManagerKind::Yarn));
                assert_eq!(
                    args.package_manager_arguments,
                    vec!["--network-timeout", "100000"]
                );
            }
            _ => panic!("Expected Fix command"),
        }
    }

    #[test]
    fn test_cli_conflicting_managers_fail() {
        let result = Cli::try_parse_from([
            "sdkfix",
            "fix",
            "--sdk-version",
            "47.0.0",
            "--npm",
            "--bun",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_fix_requires_sdk_version() {
        let result = Cli::try_parse_from(["sdkfix", "fix", "react-native@0.70.5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from(["sdkfix", "--root", "/tmp", "detect"]).unwrap();
        assert_eq!(cli.project_root, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["sdkfix", "react-native@0.70.5"]);
        assert!(result.is_err());
    }
}
