//! Toolset resolution for `--toolset`.
//!
//! A toolset spec is either a file path or a toolset name:
//! - `./ops.json`, `/etc/eks-mcp/ops.json` → used directly
//! - `cloudwatch` → `{config_dir}/eks-mcp/toolset/cloudwatch.json`, then
//!   the toolsets bundled into the binary
//!
//! `config_dir` is `~/.config` on Linux, `~/Library/Application Support`
//! on macOS and `%APPDATA%` on Windows.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Toolset file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsetConfig {
    /// List of individual tool names to enable
    pub tools: Vec<String>,
}

/// Where a toolset spec resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolsetSource {
    File(PathBuf),
    Embedded(String),
}

fn is_path_spec(spec: &str) -> bool {
    let path = Path::new(spec);
    path.is_absolute()
        || spec.contains('/')
        || spec.contains(MAIN_SEPARATOR)
        || spec.starts_with('.')
        || path.extension().is_some()
}

/// User toolset directory, if the platform has a config dir.
pub fn user_toolset_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eks-mcp").join("toolset"))
}

/// Resolve a `--toolset` argument.
pub fn resolve_toolset(spec: &str) -> Result<ToolsetSource> {
    resolve_toolset_in(spec, user_toolset_dir().as_deref())
}

pub(crate) fn resolve_toolset_in(spec: &str, user_dir: Option<&Path>) -> Result<ToolsetSource> {
    if is_path_spec(spec) {
        let path = PathBuf::from(spec);
        if !path.exists() {
            bail!("Toolset file not found: {}", path.display());
        }
        return Ok(ToolsetSource::File(path));
    }

    if let Some(dir) = user_dir {
        let candidate = dir.join(format!("{spec}.json"));
        if candidate.is_file() {
            return Ok(ToolsetSource::File(candidate));
        }
    }

    if crate::embedded::get_file(&format!("toolset/{spec}.json")).is_some() {
        return Ok(ToolsetSource::Embedded(spec.to_string()));
    }

    bail!(
        "Toolset '{spec}' not found in {} or the bundled toolsets ({})",
        user_dir.map_or_else(|| "<no config dir>".to_string(), |d| d.display().to_string()),
        crate::embedded::list_toolsets().join(", ")
    )
}

/// Load the tool names a toolset enables.
pub async fn load_toolset(source: &ToolsetSource) -> Result<Vec<String>> {
    let config: ToolsetConfig = match source {
        ToolsetSource::Embedded(name) => {
            let content = crate::embedded::get_file(&format!("toolset/{name}.json"))
                .with_context(|| format!("Embedded toolset '{name}' not found"))?;
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse embedded toolset '{name}'"))?
        }
        ToolsetSource::File(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read toolset file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse toolset file: {}", path.display()))?
        }
    };

    Ok(config.tools)
}
