//! Registering config plugins of freshly installed packages in `app.json`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::runtime::Runtime;

const APP_CONFIG_FILE: &str = "app.json";
const PLUGIN_ENTRY_FILE: &str = "app.plugin.js";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PluginApplier: Send + Sync {
    /// Apply the config plugins shipped by `installed`, a list of `name@range` specs.
    async fn apply_plugins(&self, project_root: &Path, installed: &[String]) -> Result<()>;
}

/// Adds packages that ship an `app.plugin.js` to the `plugins` list of the project's `app.json`.
pub struct ConfigPluginApplier<R: Runtime> {
    runtime: Arc<R>,
}

impl<R: Runtime> ConfigPluginApplier<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self { runtime }
    }

    fn has_config_plugin(&self, project_root: &Path, package_name: &str) -> bool {
        self.runtime.exists(
            &project_root
                .join("node_modules")
                .join(package_name)
                .join(PLUGIN_ENTRY_FILE),
        )
    }

    fn save_config(&self, path: &Path, config: &Value) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(config)?;
        contents.push('\n');

        let tmp_path = path.with_extension("json.tmp");
        self.runtime.write(&tmp_path, contents.as_bytes())?;
        self.runtime.rename(&tmp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl<R: Runtime> PluginApplier for ConfigPluginApplier<R> {
    #[tracing::instrument(skip(self))]
    async fn apply_plugins(&self, project_root: &Path, installed: &[String]) -> Result<()> {
        let config_path = project_root.join(APP_CONFIG_FILE);
        if !self.runtime.exists(&config_path) {
            debug!("No {} in {:?}, skipping config plugins", APP_CONFIG_FILE, project_root);
            return Ok(());
        }

        let candidates: Vec<&str> = installed
            .iter()
            .map(|spec| package_name(spec))
            .filter(|name| self.has_config_plugin(project_root, name))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let contents = self
            .runtime
            .read_to_string(&config_path)
            .with_context(|| format!("Failed to read {:?}", config_path))?;
        let mut config: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {:?}", config_path))?;

        let added = add_plugins(&mut config, &candidates)
            .with_context(|| format!("Unexpected structure in {:?}", config_path))?;
        if added.is_empty() {
            debug!("Config plugins already registered: {:?}", candidates);
            return Ok(());
        }

        self.save_config(&config_path, &config)?;
        info!("Added config plugins: {}", added.join(", "));
        Ok(())
    }
}

/// Name part of a `name@range` spec.
fn package_name(spec: &str) -> &str {
    match spec.rfind('@') {
        Some(pos) if pos > 0 => &spec[..pos],
        _ => spec,
    }
}

/// Append missing plugin names to the app config, returning the names that were added.
/// Plugins live under `expo.plugins` or, for configs without an `expo` key, top-level `plugins`.
fn add_plugins(config: &mut Value, names: &[&str]) -> Result<Vec<String>> {
    let root = config
        .as_object_mut()
        .context("app config is not a JSON object")?;
    let target = if matches!(root.get("expo"), Some(Value::Object(_))) {
        root.get_mut("expo")
            .and_then(Value::as_object_mut)
            .context("`expo` is not an object")?
    } else {
        root
    };

    let plugins = target
        .entry("plugins")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .context("`plugins` is not an array")?;

    let mut added = Vec::new();
    for name in names {
        let registered = plugins.iter().any(|entry| match entry {
            Value::String(s) => s == name,
            // ["plugin-name", { ...props }]
            Value::Array(items) => items.first().and_then(Value::as_str) == Some(*name),
            _ => false,
        });
        if !registered {
            plugins.push(Value::String(name.to_string()));
            added.push(name.to_string());
        }
    }
    Ok(added)
}
