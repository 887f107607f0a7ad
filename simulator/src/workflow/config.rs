use anyhow::Context;
use rlancore::LocatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub n_rays: usize,
    pub locator: LocatorConfig,
    pub generator: GeneratorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            n_rays: 10,
            locator: LocatorConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .locator
            .validate()
            .with_context(|| format!("validating locator config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        n_gates: Option<usize>,
        n_rays: Option<usize>,
        seed: Option<u64>,
    ) -> Self {
        if let Some(n_gates) = n_gates {
            self.generator.n_gates = n_gates;
        }
        if let Some(n_rays) = n_rays {
            self.n_rays = n_rays;
        }
        if let Some(seed) = seed {
            self.generator.seed = seed;
        }
        self
    }
}
