//! # Workflow configuration
//!
//! One JSON file describes a whole workflow run: the mechanism files, the species of interest,
//! the condition lists, solver and plot settings, and the parameter changes to apply before the
//! second simulation. Relative paths are resolved against the directory of the configuration
//! file. See `data/cyclopropane/workflow.json`.
use crate::ReactorsIVP::conditions::ConditionSet;
use crate::ReactorsIVP::simulation_driver::{DriverSettings, TerminationConversion};
use crate::ReactorsIVP::reactor_solver::SolverConfig;
use crate::ReactorsIVP::units::Quantity;
use crate::Utils::plot_trajectories::PlotSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid workflow file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// a parameter change applied after the first round of simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// shift the enthalpy of a species (label or `smiles:...`) at every temperature
    SpeciesEnthalpy { species: String, delta_h: Quantity },
    /// multiply the rate constant of a reaction (position in the mechanism)
    ReactionPrefactor { reaction: usize, factor: f64 },
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub mechanism: PathBuf,
    pub species_dictionary: PathBuf,
    #[serde(default)]
    pub transport: Option<PathBuf>,
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
    /// structure of the species the run is about, reported after loading
    #[serde(default)]
    pub target_smiles: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    pub conditions: ConditionSet,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub plot: PlotSettings,
    #[serde(default)]
    pub termination: Option<TerminationConversion>,
    #[serde(default)]
    pub save_csv: bool,
    #[serde(default)]
    pub mutations: Vec<Mutation>,
}

impl WorkflowConfig {
    pub fn from_json(text: &str, name: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: name.to_string(),
            source,
        })
    }

    /// reads the file and makes every relative path relative to its directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_json(&text, &path.display().to_string())?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.mechanism);
        resolve(&mut self.species_dictionary);
        resolve(&mut self.output_directory);
        if let Some(p) = self.transport.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.log_file.as_mut() {
            resolve(p);
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            output_directory: self.output_directory.clone(),
            solver: self.solver.clone(),
            plot: self.plot.clone(),
            termination: self.termination.clone(),
            save_csv: self.save_csv,
        }
    }
}
