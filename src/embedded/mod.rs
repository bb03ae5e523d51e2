//! Toolsets bundled into the binary at compile time.
//!
//! Mirrors the `.eks-mcp/` directory of the source tree so `--toolset NAME`
//! works without any files installed.

use include_dir::{Dir, include_dir};

/// Embedded `.eks-mcp` directory
///
/// ```text
/// .eks-mcp/
/// └── toolset/
///     ├── cloudwatch.json
///     ├── metrics-only.json
///     └── troubleshoot.json
/// ```
pub static EKS_MCP_ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/.eks-mcp");

/// Get an embedded file by path relative to `.eks-mcp/`, e.g.
/// `toolset/cloudwatch.json`.
pub fn get_file(path: &str) -> Option<&'static str> {
    EKS_MCP_ASSETS.get_file(path)?.contents_utf8()
}

/// Names of the bundled toolsets (without `.json`), sorted.
pub fn list_toolsets() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = EKS_MCP_ASSETS
        .get_dir("toolset")
        .map(|dir| {
            dir.files()
                .filter_map(|file| {
                    let name = file.path().file_name()?.to_str()?;
                    name.strip_suffix(".json")
                })
                .collect()
        })
        .unwrap_or_default();
    names.sort_unstable();
    names
}
