//! Configuration discovery and effective settings resolution.
//!
//! opvet reads `opvet.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `schema`: `schema/operator_schema.yml`
//! - `operators_dir`: `operators`
//! - `output`: `human`
//! - `info`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `opvet.toml|yaml`.
pub struct OpvetConfig {
    pub schema: Option<String>,
    pub operators_dir: Option<String>,
    pub output: Option<String>,
    pub info: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub schema: String,
    pub operators_dir: String,
    pub output: String,
    pub show_info: bool,
}

impl Effective {
    pub fn schema_path(&self) -> PathBuf {
        self.repo_root.join(&self.schema)
    }

    pub fn operators_path(&self) -> PathBuf {
        self.repo_root.join(&self.operators_dir)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `opvet.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("opvet.toml").exists()
            || cur.join("opvet.yaml").exists()
            || cur.join("opvet.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `OpvetConfig` from `opvet.toml` or `opvet.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<OpvetConfig> {
    let toml_path = root.join("opvet.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: OpvetConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["opvet.yaml", "opvet.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: OpvetConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_schema: Option<&str>,
    cli_operators_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_info: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let schema = cli_schema
        .map(|s| s.to_string())
        .or(cfg.schema)
        .unwrap_or_else(|| "schema/operator_schema.yml".to_string());

    let operators_dir = cli_operators_dir
        .map(|s| s.to_string())
        .or(cfg.operators_dir)
        .unwrap_or_else(|| "operators".to_string());

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let show_info = cli_info.or(cfg.info).unwrap_or(false);

    Effective {
        repo_root,
        schema,
        operators_dir,
        output,
        show_info,
    }
}
