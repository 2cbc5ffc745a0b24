//! Configuration loading with multi-layer merge

use super::WorkflowFile;
use crate::graph::AgentMarkers;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Agent-host naming convention
    #[serde(default)]
    pub classifier: AgentMarkers,

    /// Routing model checks
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Routing model settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Treat dangling edge references as validation failures
    #[serde(default)]
    pub strict: bool,
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Also write logs to this file (`~` is expanded)
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file
            .as_deref()
            .map(|f| PathBuf::from(shellexpand::tilde(f).into_owned()))
    }
}

impl RouterConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/superstep/config.toml
    /// 3. .superstep/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let user_config = Self::load_file(&user_config_path)
                    .with_context(|| format!("loading {}", user_config_path.display()))?;
                config.merge(user_config);
            }
        }

        let project_config_path = project_dir
            .map(|p| p.join(".superstep/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".superstep/config.toml"));

        if project_config_path.exists() {
            let project_config = Self::load_file(&project_config_path)
                .with_context(|| format!("loading {}", project_config_path.display()))?;
            config.merge(project_config);
        }

        tracing::debug!(strict = config.routing.strict, "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Get the user config path (~/.config/superstep/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("superstep/config.toml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        // Markers merge field by field: a layer that leaves one unset comes
        // back with its serde default, which must not clobber earlier layers.
        let defaults = AgentMarkers::default();
        if other.classifier.agent_type_marker != defaults.agent_type_marker {
            self.classifier.agent_type_marker = other.classifier.agent_type_marker;
        }
        if other.classifier.agent_namespace_marker != defaults.agent_namespace_marker {
            self.classifier.agent_namespace_marker = other.classifier.agent_namespace_marker;
        }
        if other.routing.strict {
            self.routing.strict = true;
        }
        if other.logging.file.is_some() {
            self.logging.file = other.logging.file;
        }
    }
}

/// Load a workflow file
///
/// `name` may be a path to an existing file. Otherwise the search order is
/// (first match wins):
/// 1. .superstep/workflows/{name}.toml (project)
/// 2. ~/.config/superstep/workflows/{name}.toml (user)
pub fn load_workflow(name: &str, project_dir: Option<&Path>) -> Result<WorkflowFile> {
    let direct = PathBuf::from(shellexpand::tilde(name).into_owned());
    if direct.is_file() {
        return load_workflow_file(&direct);
    }

    let filename = format!("{}.toml", name);

    let project_path = project_dir
        .map(|p| p.join(".superstep/workflows").join(&filename))
        .unwrap_or_else(|| PathBuf::from(".superstep/workflows").join(&filename));

    if project_path.exists() {
        return load_workflow_file(&project_path);
    }

    if let Some(user_dir) = dirs::config_dir() {
        let user_path = user_dir.join("superstep/workflows").join(&filename);
        if user_path.exists() {
            return load_workflow_file(&user_path);
        }
    }

    anyhow::bail!("workflow '{}' not found", name)
}

fn load_workflow_file(path: &Path) -> Result<WorkflowFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let workflow: WorkflowFile = toml::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;

    workflow.validate().map_err(|errors| {
        anyhow::anyhow!("workflow validation failed:\n  {}", errors.join("\n  "))
    })?;

    tracing::debug!(
        workflow = %workflow.name,
        path = %path.display(),
        executors = workflow.executors.len(),
        edges = workflow.edges.len(),
        "Loaded workflow file"
    );

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
        name = "loop"
        start = "a"

        [[executors]]
        id = "a"

        [[executors]]
        id = "b"

        [[edges]]
        source = "a"
        sink = "b"

        [[edges]]
        source = "b"
        sink = "a"
    "#;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.classifier, AgentMarkers::default());
        assert!(!config.routing.strict);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
            [classifier]
            agent_type_marker = "AgentHost"

            [routing]
            strict = true
        "#
        )
        .unwrap();

        let config = RouterConfig::load_file(&config_path).unwrap();
        assert_eq!(config.classifier.agent_type_marker, "AgentHost");
        assert_eq!(
            config.classifier.agent_namespace_marker,
            AgentMarkers::default().agent_namespace_marker
        );
        assert!(config.routing.strict);
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".superstep")).unwrap();
        std::fs::write(
            dir.path().join(".superstep/config.toml"),
            "[logging]\nfile = \"/tmp/superstep.log\"\n",
        )
        .unwrap();

        let config = RouterConfig::load(Some(dir.path())).unwrap();
        assert_eq!(
            config.logging.file_path(),
            Some(PathBuf::from("/tmp/superstep.log"))
        );
    }

    #[test]
    fn test_config_merge() {
        let mut base = RouterConfig::default();
        base.logging.file = Some("base.log".into());

        let mut other = RouterConfig::default();
        other.classifier.agent_namespace_marker = "agents::hosting".into();
        other.routing.strict = true;

        base.merge(other);

        assert_eq!(base.classifier.agent_namespace_marker, "agents::hosting");
        assert!(base.routing.strict);
        // Unset in the override layer, so the base value survives
        assert_eq!(base.logging.file, Some("base.log".into()));
    }

    #[test]
    fn test_merge_classifier_fields_independently() {
        let dir = TempDir::new().unwrap();
        let user_path = dir.path().join("user.toml");
        let project_path = dir.path().join("project.toml");
        std::fs::write(
            &user_path,
            "[classifier]\nagent_namespace_marker = \"agents::hosting\"\n",
        )
        .unwrap();
        std::fs::write(
            &project_path,
            "[classifier]\nagent_type_marker = \"AgentHost\"\n",
        )
        .unwrap();

        let mut config = RouterConfig::default();
        config.merge(RouterConfig::load_file(&user_path).unwrap());
        config.merge(RouterConfig::load_file(&project_path).unwrap());

        assert_eq!(config.classifier.agent_type_marker, "AgentHost");
        assert_eq!(config.classifier.agent_namespace_marker, "agents::hosting");
    }

    #[test]
    fn test_load_workflow_from_project() {
        let dir = TempDir::new().unwrap();
        let workflows = dir.path().join(".superstep/workflows");
        std::fs::create_dir_all(&workflows).unwrap();
        std::fs::write(workflows.join("loop.toml"), MINIMAL).unwrap();

        let workflow = load_workflow("loop", Some(dir.path())).unwrap();
        assert_eq!(workflow.name, "loop");
        assert_eq!(workflow.edges.len(), 2);
    }

    #[test]
    fn test_load_workflow_by_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let workflow = load_workflow(path.to_str().unwrap(), None).unwrap();
        assert_eq!(workflow.start, "a");
    }

    #[test]
    fn test_load_workflow_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_workflow("definitely-missing", Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_workflow_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "name = \"bad\"\nstart = \"a\"\n[[executors]]\nid = \"a\"\n[[executors]]\nid = \"a\"\n",
        )
        .unwrap();

        let err = load_workflow(path.to_str().unwrap(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate executor id"));
    }
}
