//! Operator scaffolding.
//!
//! Builds a new operator directory (`vars.yml` + `README.md`) from one of
//! three templates. Template values are constructed fresh on every call;
//! nothing here holds shared mutable defaults between invocations. The new
//! operator's name is checked against the schema's own `operator_name`
//! rule so a scaffolded operator starts out valid.

use crate::models::schema::{anchored_pattern, RuleSpec, SchemaDocument};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_NAME_PATTERN: &str = "^[a-z][a-z0-9_]*$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Scaffolding template, from bare shell setup to all four sections.
pub enum TemplateKind {
    Minimal,
    Standard,
    Advanced,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Minimal,
        TemplateKind::Standard,
        TemplateKind::Advanced,
    ];

    pub fn parse(name: &str) -> Option<TemplateKind> {
        match name {
            "minimal" => Some(TemplateKind::Minimal),
            "standard" => Some(TemplateKind::Standard),
            "advanced" => Some(TemplateKind::Advanced),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Minimal => "minimal",
            TemplateKind::Standard => "standard",
            TemplateKind::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone)]
/// Inputs for one scaffolding run.
pub struct ScaffoldRequest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: Option<String>,
    pub parent: Option<String>,
    pub tags: Vec<String>,
    pub template: TemplateKind,
}

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("invalid operator name '{name}' (expected pattern '{pattern}')")]
    InvalidName { name: String, pattern: String },
    #[error("operator '{0}' already exists")]
    AlreadyExists(String),
    #[error("parent operator '{0}' not found")]
    UnknownParent(String),
    #[error("failed to write operator files: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates operator directories under a fixed operators root.
pub struct Scaffolder<'a> {
    operators_dir: PathBuf,
    schema: &'a SchemaDocument,
}

impl<'a> Scaffolder<'a> {
    pub fn new(operators_dir: impl Into<PathBuf>, schema: &'a SchemaDocument) -> Self {
        Scaffolder {
            operators_dir: operators_dir.into(),
            schema,
        }
    }

    /// Existing operators usable as parents, alphabetical.
    pub fn available_parents(&self) -> Vec<String> {
        available_parents(&self.operators_dir)
    }

    /// Create the operator directory; returns its path.
    pub fn create(&self, req: &ScaffoldRequest) -> Result<PathBuf, ScaffoldError> {
        self.check_name(&req.name)?;
        if self.operators_dir.join(&req.name).join("vars.yml").exists() {
            return Err(ScaffoldError::AlreadyExists(req.name.clone()));
        }
        if let Some(parent) = &req.parent {
            if !self.available_parents().iter().any(|p| p == parent) {
                return Err(ScaffoldError::UnknownParent(parent.clone()));
            }
        }

        let config = build_operator(req);
        let dir = self.operators_dir.join(&req.name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("vars.yml"), render_vars_yml(req, &config))?;
        fs::write(dir.join("README.md"), render_readme(req))?;
        Ok(dir)
    }

    fn check_name(&self, name: &str) -> Result<(), ScaffoldError> {
        let pattern = match self.schema.operator_metadata.field_types.get("operator_name") {
            Some(RuleSpec::String {
                pattern: Some(pattern),
                ..
            }) => pattern.as_str(),
            _ => DEFAULT_NAME_PATTERN,
        };
        // The schema's patterns were compiled at load; the fallback is a
        // known-good literal.
        let ok = Regex::new(&anchored_pattern(pattern))
            .map(|re| re.is_match(name))
            .unwrap_or(false);
        if ok {
            Ok(())
        } else {
            Err(ScaffoldError::InvalidName {
                name: name.to_string(),
                pattern: pattern.to_string(),
            })
        }
    }
}

/// Existing operators usable as parents: directories under
/// `operators_dir` that contain a `vars.yml`, alphabetical.
pub fn available_parents(operators_dir: &Path) -> Vec<String> {
    let mut parents = Vec::new();
    let Ok(entries) = fs::read_dir(operators_dir) else {
        return parents;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && path.join("vars.yml").exists() {
            if let Some(name) = path.file_name() {
                parents.push(name.to_string_lossy().to_string());
            }
        }
    }
    parents.sort();
    parents
}

/// Section names included by each template, for the listing command.
pub fn template_sections(kind: TemplateKind) -> Vec<String> {
    let req = ScaffoldRequest {
        name: "sample".into(),
        version: "1.0.0".into(),
        description: "sample".into(),
        author: None,
        parent: None,
        tags: Vec::new(),
        template: kind,
    };
    build_operator(&req)
        .iter()
        .filter_map(|(k, _)| k.as_str())
        .filter(|k| k.ends_with("_config"))
        .map(str::to_string)
        .collect()
}

fn entry(map: &mut Mapping, key: &str, value: Value) {
    map.insert(Value::String(key.to_string()), value);
}

fn strings(items: &[&str]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::String(s.to_string())).collect())
}

fn string_map(pairs: &[(&str, &str)]) -> Value {
    let mut map = Mapping::new();
    for (k, v) in pairs {
        entry(&mut map, k, Value::String(v.to_string()));
    }
    Value::Mapping(map)
}

fn tool_list(tools: &[(&str, &str)]) -> Value {
    Value::Sequence(
        tools
            .iter()
            .copied()
            .map(|(name, description)| string_map(&[("name", name), ("description", description)]))
            .collect(),
    )
}

/// Assemble the full operator mapping for a request. Metadata first, then
/// template sections, matching the order validators and readers expect.
fn build_operator(req: &ScaffoldRequest) -> Mapping {
    let mut root = Mapping::new();
    entry(&mut root, "operator_name", Value::String(req.name.clone()));
    entry(&mut root, "operator_version", Value::String(req.version.clone()));
    entry(
        &mut root,
        "operator_description",
        Value::String(req.description.clone()),
    );
    if let Some(author) = &req.author {
        entry(&mut root, "operator_author", Value::String(author.clone()));
    }
    if !req.tags.is_empty() {
        entry(
            &mut root,
            "operator_tags",
            Value::Sequence(req.tags.iter().cloned().map(Value::String).collect()),
        );
    }
    if let Some(parent) = &req.parent {
        entry(&mut root, "extends", Value::String(parent.clone()));
    }

    match req.template {
        TemplateKind::Minimal => {
            entry(&mut root, "shell_config", minimal_shell());
        }
        TemplateKind::Standard => {
            entry(&mut root, "shell_config", standard_shell());
            entry(&mut root, "tmux_config", standard_tmux());
            entry(&mut root, "tools_config", standard_tools());
        }
        TemplateKind::Advanced => {
            entry(&mut root, "shell_config", advanced_shell());
            entry(&mut root, "tmux_config", advanced_tmux());
            entry(&mut root, "tools_config", advanced_tools());
            entry(&mut root, "docker_config", advanced_docker());
        }
    }
    root
}

fn minimal_shell() -> Value {
    let mut shell = Mapping::new();
    entry(&mut shell, "preferred_shell", Value::String("zsh".into()));
    entry(&mut shell, "oh_my_zsh_theme", Value::String("robbyrussell".into()));
    entry(&mut shell, "oh_my_zsh_plugins", strings(&["git", "docker"]));
    entry(
        &mut shell,
        "aliases",
        string_map(&[("ll", "ls -alF"), ("la", "ls -A"), ("gs", "git status")]),
    );
    entry(
        &mut shell,
        "environment",
        string_map(&[("EDITOR", "vim"), ("PAGER", "less")]),
    );
    Value::Mapping(shell)
}

fn standard_shell() -> Value {
    let mut shell = Mapping::new();
    entry(&mut shell, "preferred_shell", Value::String("zsh".into()));
    entry(&mut shell, "oh_my_zsh_theme", Value::String("robbyrussell".into()));
    entry(
        &mut shell,
        "oh_my_zsh_plugins",
        strings(&["git", "docker", "zsh-autosuggestions", "zsh-syntax-highlighting"]),
    );
    entry(
        &mut shell,
        "aliases",
        string_map(&[
            ("..", "cd .."),
            ("ll", "ls -alF"),
            ("la", "ls -A"),
            ("gs", "git status"),
            ("ga", "git add"),
            ("gc", "git commit"),
            ("gp", "git push"),
            ("d", "docker"),
            ("dc", "docker compose"),
        ]),
    );
    entry(
        &mut shell,
        "environment",
        string_map(&[("EDITOR", "vim"), ("PAGER", "less"), ("LANG", "en_US.UTF-8")]),
    );
    Value::Mapping(shell)
}

fn standard_tmux() -> Value {
    let mut tmux = Mapping::new();
    entry(&mut tmux, "prefix", Value::String("C-a".into()));
    let mut settings = Mapping::new();
    entry(&mut settings, "base_index", Value::Number(1.into()));
    entry(&mut settings, "history_limit", Value::Number(10000.into()));
    entry(&mut settings, "mouse", Value::Bool(true));
    entry(&mut tmux, "settings", Value::Mapping(settings));
    Value::Mapping(tmux)
}

fn standard_tools() -> Value {
    let mut tools = Mapping::new();
    entry(
        &mut tools,
        "essential_tools",
        tool_list(&[
            ("fd", "Better find"),
            ("ripgrep", "Better grep"),
            ("fzf", "Fuzzy finder"),
            ("tree", "Directory tree"),
            ("htop", "Process viewer"),
        ]),
    );
    Value::Mapping(tools)
}

fn advanced_shell() -> Value {
    let mut shell = Mapping::new();
    entry(&mut shell, "preferred_shell", Value::String("zsh".into()));
    entry(&mut shell, "framework", Value::String("oh-my-zsh".into()));
    entry(
        &mut shell,
        "oh_my_zsh_theme",
        Value::String("powerlevel10k/powerlevel10k".into()),
    );
    entry(
        &mut shell,
        "oh_my_zsh_plugins",
        strings(&[
            "git",
            "docker",
            "kubectl",
            "zsh-autosuggestions",
            "zsh-syntax-highlighting",
            "colored-man-pages",
        ]),
    );
    entry(
        &mut shell,
        "aliases",
        string_map(&[
            ("..", "cd .."),
            ("ll", "ls -alF"),
            ("la", "ls -A"),
            ("gs", "git status"),
            ("ga", "git add"),
            ("gc", "git commit"),
            ("gp", "git push"),
            ("gl", "git pull"),
            ("gd", "git diff"),
            ("d", "docker"),
            ("dc", "docker compose"),
            ("k", "kubectl"),
        ]),
    );
    entry(
        &mut shell,
        "environment",
        string_map(&[
            ("EDITOR", "vim"),
            ("VISUAL", "vim"),
            ("PAGER", "less"),
            ("LANG", "en_US.UTF-8"),
            ("HISTSIZE", "10000"),
        ]),
    );
    entry(&mut shell, "paths", strings(&["$HOME/.local/bin", "$HOME/bin"]));
    Value::Mapping(shell)
}

fn advanced_tmux() -> Value {
    let mut tmux = Mapping::new();
    entry(&mut tmux, "theme", Value::String("matrix".into()));
    entry(&mut tmux, "prefix", Value::String("C-a".into()));
    entry(&mut tmux, "terminal", Value::String("tmux-256color".into()));
    let mut settings = Mapping::new();
    entry(&mut settings, "base_index", Value::Number(1.into()));
    entry(&mut settings, "pane_base_index", Value::Number(1.into()));
    entry(&mut settings, "history_limit", Value::Number(50000.into()));
    entry(&mut settings, "escape_time", Value::Number(0.into()));
    entry(&mut settings, "mouse", Value::Bool(true));
    entry(&mut tmux, "settings", Value::Mapping(settings));
    let mut plugins = Mapping::new();
    for p in ["enabled", "sensible", "resurrect", "continuum", "yank"] {
        entry(&mut plugins, p, Value::Bool(true));
    }
    entry(&mut tmux, "plugins", Value::Mapping(plugins));
    let mut status = Mapping::new();
    entry(&mut status, "position", Value::String("bottom".into()));
    entry(&mut status, "justify", Value::String("left".into()));
    entry(&mut status, "interval", Value::Number(5.into()));
    entry(&mut tmux, "status_bar", Value::Mapping(status));
    Value::Mapping(tmux)
}

fn advanced_tools() -> Value {
    let mut tools = Mapping::new();
    entry(
        &mut tools,
        "essential_tools",
        tool_list(&[
            ("fd", "Better find"),
            ("ripgrep", "Better grep"),
            ("fzf", "Fuzzy finder"),
            ("tree", "Directory tree"),
            ("htop", "Process viewer"),
        ]),
    );
    entry(
        &mut tools,
        "modern_cli_tools",
        tool_list(&[
            ("eza", "Better ls"),
            ("bat", "Better cat"),
            ("delta", "Better git diff"),
        ]),
    );
    entry(
        &mut tools,
        "development_tools",
        tool_list(&[
            ("jq", "JSON processor"),
            ("yq", "YAML processor"),
            ("httpie", "HTTP client"),
        ]),
    );
    Value::Mapping(tools)
}

fn advanced_docker() -> Value {
    let mut docker = Mapping::new();
    entry(&mut docker, "install_compose", Value::Bool(true));
    entry(&mut docker, "compose_version", Value::String("v2".into()));
    entry(&mut docker, "install_buildx", Value::Bool(true));
    entry(&mut docker, "enable_buildkit", Value::Bool(true));
    let mut security = Mapping::new();
    entry(&mut security, "userns_remap", Value::Bool(false));
    entry(&mut docker, "security", Value::Mapping(security));
    Value::Mapping(docker)
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn render_vars_yml(req: &ScaffoldRequest, config: &Mapping) -> String {
    let body = serde_yaml::to_string(&Value::Mapping(config.clone())).unwrap_or_default();
    let mut lines = Vec::new();
    lines.push("---".to_string());
    lines.push(format!("# {} operator configuration", title_case(&req.name)));
    if let Some(parent) = &req.parent {
        lines.push(format!("# Extends: {parent}"));
    }
    lines.push(String::new());
    lines.push(body.trim_end().to_string());
    lines.join("\n") + "\n"
}

fn render_readme(req: &ScaffoldRequest) -> String {
    format!(
        "# {title} Operator\n\n{description}\n\n## Version\n\n{version}\n\n## Validation\n\n```bash\nopvet validate {name}\n```\n\n## Customization\n\nEdit `vars.yml` to customize this operator's behavior.\n",
        title = title_case(&req.name),
        description = req.description,
        version = req.version,
        name = req.name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inherit::DirParentLocator;
    use crate::validate::validate_document;
    use crate::models::operator::OperatorDoc;
    use tempfile::tempdir;

    fn shipped_schema() -> SchemaDocument {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("schema")
            .join("operator_schema.yml");
        SchemaDocument::load(&path).unwrap()
    }

    fn request(name: &str, template: TemplateKind) -> ScaffoldRequest {
        ScaffoldRequest {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: "Test operator".to_string(),
            author: None,
            parent: None,
            tags: vec!["development".to_string()],
            template,
        }
    }

    #[test]
    fn test_create_writes_vars_and_readme() {
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);

        let created = scaffolder.create(&request("myop", TemplateKind::Minimal)).unwrap();
        assert!(created.join("vars.yml").exists());
        assert!(created.join("README.md").exists());

        let vars = fs::read_to_string(created.join("vars.yml")).unwrap();
        assert!(vars.starts_with("---\n# Myop operator configuration"));
        assert!(vars.contains("operator_name: myop"));
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);
        let err = scaffolder
            .create(&request("Bad-Name!", TemplateKind::Minimal))
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidName { .. }));
    }

    #[test]
    fn test_existing_operator_is_rejected() {
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);
        scaffolder.create(&request("myop", TemplateKind::Minimal)).unwrap();
        let err = scaffolder
            .create(&request("myop", TemplateKind::Minimal))
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists(_)));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);
        let mut req = request("child", TemplateKind::Minimal);
        req.parent = Some("ghost".to_string());
        let err = scaffolder.create(&req).unwrap_err();
        assert!(matches!(err, ScaffoldError::UnknownParent(_)));
    }

    #[test]
    fn test_parent_reference_is_recorded() {
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);
        scaffolder.create(&request("base", TemplateKind::Minimal)).unwrap();

        let mut req = request("child", TemplateKind::Minimal);
        req.parent = Some("base".to_string());
        let created = scaffolder.create(&req).unwrap();

        let vars = fs::read_to_string(created.join("vars.yml")).unwrap();
        assert!(vars.contains("# Extends: base"));
        assert!(vars.contains("extends: base"));
        assert_eq!(scaffolder.available_parents(), vec!["base", "child"]);
    }

    #[test]
    fn test_scaffolded_operators_validate_cleanly() {
        // Every template must produce an operator the shipped schema
        // accepts without findings.
        let dir = tempdir().unwrap();
        let schema = shipped_schema();
        let scaffolder = Scaffolder::new(dir.path(), &schema);
        let locator = DirParentLocator::new(dir.path());

        for (i, kind) in TemplateKind::ALL.iter().enumerate() {
            let created = scaffolder.create(&request(&format!("op{i}"), *kind)).unwrap();
            let text = fs::read_to_string(created.join("vars.yml")).unwrap();
            let doc = OperatorDoc::from_str(&text).unwrap();
            let diags = validate_document(&schema, &doc, &locator);
            assert!(diags.is_empty(), "{} template: {diags:?}", kind.name());
        }
    }

    #[test]
    fn test_template_sections_grow_with_template() {
        assert_eq!(template_sections(TemplateKind::Minimal), vec!["shell_config"]);
        assert_eq!(
            template_sections(TemplateKind::Advanced),
            vec!["shell_config", "tmux_config", "tools_config", "docker_config"]
        );
    }
}
