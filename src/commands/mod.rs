use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    application::{FixPackagesOptions, FixPackagesUseCase},
    package::{PackageDescriptor, PackageKind, parse_descriptors_json},
    package_manager::{NodePackageManager, PackageManagerKind},
    plugins::ConfigPluginApplier,
    runtime::Runtime,
    ui::{ConsoleLogger, Logger},
};

pub mod config;

use config::Config;

/// Everything the `fix` command was asked to do.
#[derive(Debug, Clone, Default)]
pub struct FixRequest {
    pub project_root: Option<PathBuf>,
    pub package_manager: Option<PackageManagerKind>,
    /// Runtime dependencies as `name@range`
    pub specs: Vec<String>,
    /// Development dependencies as `name@range`
    pub dev_specs: Vec<String>,
    /// JSON file with resolved descriptors
    pub from: Option<PathBuf>,
    pub sdk_version: String,
    pub package_manager_arguments: Vec<String>,
    pub silent: bool,
}

#[tracing::instrument(skip(runtime))]
pub async fn fix<R: Runtime + 'static>(runtime: R, request: FixRequest) -> Result<()> {
    let config = Config::new(
        &runtime,
        request.project_root.clone(),
        request.package_manager,
        request.silent,
    )?;
    let packages = collect_packages(&runtime, &request)?;
    let options = FixPackagesOptions {
        packages,
        sdk_version: request.sdk_version,
        package_manager_arguments: request.package_manager_arguments,
    };
    run(Arc::new(runtime), config, options, &ConsoleLogger).await
}

#[tracing::instrument(skip(runtime, config, logger))]
pub async fn run<R: Runtime + 'static>(
    runtime: Arc<R>,
    config: Config,
    options: FixPackagesOptions,
    logger: &dyn Logger,
) -> Result<()> {
    let package_manager = NodePackageManager::new(
        config.package_manager,
        Arc::clone(&runtime),
        config.execution.clone(),
    );
    let plugins = ConfigPluginApplier::new(Arc::clone(&runtime));

    FixPackagesUseCase::new(runtime.as_ref(), &package_manager, &plugins, logger)
        .fix_packages(&config.project_root, &options)
        .await
}

/// Print the package manager that would be used for a project
#[tracing::instrument(skip(runtime))]
pub fn detect<R: Runtime>(runtime: R, project_root: Option<PathBuf>) -> Result<()> {
    let config = Config::new(&runtime, project_root, None, false)?;
    println!("{}", config.package_manager);
    Ok(())
}

/// Descriptors from `--from` first, then runtime specs, then dev specs.
fn collect_packages<R: Runtime>(runtime: &R, request: &FixRequest) -> Result<Vec<PackageDescriptor>> {
    let mut packages = match &request.from {
        Some(path) => {
            let json = runtime
                .read_to_string(path)
                .with_context(|| format!("Failed to read package list {:?}", path))?;
            parse_descriptors_json(&json)?
        }
        None => Vec::new(),
    };

    for spec in &request.specs {
        packages.push(PackageDescriptor::parse(spec, PackageKind::Runtime)?);
    }
    for spec in &request.dev_specs {
        packages.push(PackageDescriptor::parse(spec, PackageKind::Development)?);
    }

    debug!("Fixing {} package(s)", packages.len());
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ExecutionOptions, MockRuntime};
    use crate::ui::MockLogger;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::path::Path;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn test_config(kind: PackageManagerKind) -> Config {
        Config {
            project_root: PathBuf::from("/work/app"),
            package_manager: kind,
            execution: ExecutionOptions::new("/work/app"),
        }
    }

    #[test]
    fn test_collect_packages_from_specs() {
        let runtime = MockRuntime::new();
        let request = FixRequest {
            specs: strings(&["react-native@0.70.5"]),
            dev_specs: strings(&["@types/react@~18.0.24"]),
            ..Default::default()
        };

        let packages = collect_packages(&runtime, &request).unwrap();
        assert_eq!(
            packages,
            vec![
                PackageDescriptor::new("react-native", "0.70.5", PackageKind::Runtime),
                PackageDescriptor::new("@types/react", "~18.0.24", PackageKind::Development),
            ]
        );
    }

    #[test]
    fn test_collect_packages_from_file_comes_first() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("fix.json")))
            .times(1)
            .returning(|_| {
                Ok(r#"[{"packageName": "expo", "expectedVersionOrRange": "~47.0.0", "packageType": "dependencies"}]"#.to_string())
            });

        let request = FixRequest {
            from: Some(PathBuf::from("fix.json")),
            specs: strings(&["expo-camera@~13.0.0"]),
            ..Default::default()
        };

        let packages = collect_packages(&runtime, &request).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["expo", "expo-camera"]);
    }

    #[test]
    fn test_collect_packages_invalid_spec() {
        let runtime = MockRuntime::new();
        let request = FixRequest {
            specs: strings(&["react-native"]),
            ..Default::default()
        };

        assert!(collect_packages(&runtime, &request).is_err());
    }

    #[tokio::test]
    async fn test_run_installs_with_npm() {
        let mut runtime = MockRuntime::new();
        let mut seq = Sequence::new();

        runtime
            .expect_run_command()
            .withf(|program, args, options| {
                program == "npm"
                    && args
                        == strings(&["install", "--save", "--no-audit", "expo-camera@~13.0.0"])
                            .as_slice()
                    && options.env.get("ADBLOCK").map(String::as_str) == Some("1")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        // No app.json: plugin step is a no-op
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/app/app.json")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| false);
        runtime
            .expect_run_command()
            .withf(|program, args, _| {
                program == "npm"
                    && args
                        == strings(&["install", "--save-dev", "--no-audit", "jest@^29.2.1"])
                            .as_slice()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        runtime.expect_spawn_detached().never();

        let mut logger = MockLogger::new();
        logger
            .expect_log()
            .withf(|msg| msg == "\u{203a} Installing 2 SDK 47.0.0 compatible native modules using npm")
            .times(1)
            .return_const(());

        let options = FixPackagesOptions {
            packages: vec![
                PackageDescriptor::new("expo-camera", "~13.0.0", PackageKind::Runtime),
                PackageDescriptor::new("jest", "^29.2.1", PackageKind::Development),
            ],
            sdk_version: "47.0.0".into(),
            package_manager_arguments: strings(&["--no-audit"]),
        };

        run(
            Arc::new(runtime),
            test_config(PackageManagerKind::Npm),
            options,
            &logger,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_hands_off_core_upgrade() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_spawn_detached()
            .withf(|command, options| {
                command == "pnpm add expo@^48.0.0 && npx expo install --fix"
                    && options.cwd == Path::new("/work/app")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        runtime.expect_run_command().never();
        runtime.expect_exists().never();

        let mut logger = MockLogger::new();
        logger
            .expect_log()
            .withf(|msg| msg.starts_with("\u{203a} Updating expo using pnpm"))
            .times(1)
            .return_const(());

        let options = FixPackagesOptions {
            packages: vec![
                PackageDescriptor::new("expo", "^48.0.0", PackageKind::Runtime),
                PackageDescriptor::new("jest", "^29.2.1", PackageKind::Development),
            ],
            sdk_version: "48.0.0".into(),
            package_manager_arguments: vec![],
        };

        run(
            Arc::new(runtime),
            test_config(PackageManagerKind::Pnpm),
            options,
            &logger,
        )
        .await
        .unwrap();
    }
}
