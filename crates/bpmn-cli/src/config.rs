//! # Tool Configuration
//!
//! The schema modules and sample documents the tools run over. The
//! defaults reproduce the lists the Python helper scripts hardcoded;
//! a YAML file may override any subset of them:
//!
//! ```yaml
//! base_schema: schemas/bpmn-process.json
//! structure_samples:
//!   - test-data/simple-process.json
//! validator:
//!   program: ajv
//!   args: [validate, --spec=draft7]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use bpmn_schema::ExternalValidator;
use serde::Deserialize;

/// File lists and validator settings for both subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Schema modules to combine, in merge order.
    pub schemas: Vec<PathBuf>,
    /// The module whose definitions keep their names. Must be in `schemas`.
    pub base_schema: PathBuf,
    /// Where the combined schema is written.
    pub combined_output: PathBuf,
    /// Samples validated against the combined schema.
    pub combine_samples: Vec<PathBuf>,
    /// Samples given the structural check.
    pub structure_samples: Vec<PathBuf>,
    /// External validator invocation.
    pub validator: ExternalValidator,
}

impl Default for ToolConfig {
    fn default() -> Self {
        let combine_samples = [
            "test-data/simple-process.json",
            "test-data/parallel-gateway.json",
            "test-data/exclusive-gateway.json",
        ];
        let structure_only = [
            "test-data/subprocess.json",
            "test-data/ai-human-collab.json",
            "test-data/dynamic-assignment.json",
            "test-data/invalid-bpmn.json",
        ];
        Self {
            schemas: [
                "schemas/bpmn-common.json",
                "schemas/bpmn-flow-objects.json",
                "schemas/bpmn-connectors.json",
                "schemas/bpmn-artifacts.json",
                "schemas/bpmn-agents.json",
                "schemas/bpmn-process.json",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
            base_schema: PathBuf::from("schemas/bpmn-process.json"),
            combined_output: PathBuf::from("schemas/bpmn-combined.json"),
            combine_samples: combine_samples.iter().map(PathBuf::from).collect(),
            structure_samples: combine_samples
                .iter()
                .chain(&structure_only)
                .map(PathBuf::from)
                .collect(),
            validator: ExternalValidator::default(),
        }
    }
}

impl ToolConfig {
    /// Load a YAML configuration file. Keys it omits keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded tool configuration");
        Ok(config)
    }

    /// Rebase every relative path onto `root`.
    pub fn rooted_at(self, root: &Path) -> Self {
        let rebase = |p: PathBuf| crate::resolve_path(&p, root);
        let rebase_all =
            |list: Vec<PathBuf>| -> Vec<PathBuf> { list.into_iter().map(rebase).collect() };
        Self {
            schemas: rebase_all(self.schemas),
            base_schema: rebase(self.base_schema),
            combined_output: rebase(self.combined_output),
            combine_samples: rebase_all(self.combine_samples),
            structure_samples: rebase_all(self.structure_samples),
            validator: self.validator,
        }
    }
}
