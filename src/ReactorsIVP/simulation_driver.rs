//! # Simulation driver
//!
//! Owns the source mechanism (species and reactions as loaded), the combustion model compiled
//! from it and the scenarios to run. The workflow is
//! `load_model -> generate_conditions -> simulate -> plot`, optionally followed by parameter
//! changes and another `simulate`.
//!
//! Parameter changes are written straight into the model, not into the source collections:
//!  - `modify_reaction_kinetics` is read by the very next `simulate`
//!  - `modify_species_thermo` changes only the thermo definition; `refresh_model` must run before
//!    the rate and energy equations see it
//!
//! So the model may diverge from the sources. `SyncState` makes that visible:
//! `thermo_refresh_pending` is set until the next refresh, and the changed entries are listed until
//! `sync_mutations_to_source` copies them back. A `load_model` with unsynced changes rebuilds from
//! the sources, logs a warning and drops them.
use crate::Kinetics::rate_expressions::{RateCoefficient, ReactionType};
use crate::Kinetics::reaction::Reaction;
use crate::Mechanism::mechanism_loader::Mechanism;
use crate::Mechanism::species::Species;
use crate::ReactorsIVP::combustion_model::CombustionModel;
use crate::ReactorsIVP::conditions::{ConditionBuilder, ConditionError, ConditionSet, Scenario, print_scenarios};
use crate::ReactorsIVP::reactor_equations::{CONVERSION, ReactorEquations};
use crate::ReactorsIVP::reactor_solver::{SolverConfig, SolverError, solve_ivp};
use crate::ReactorsIVP::trajectory::Trajectory;
use crate::Utils::plot_trajectories::{PlotError, PlotSettings, plot_trajectories};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DriverError {
    #[error("combustion model is not loaded, call load_model first")]
    ModelNotLoaded,
    #[error("no scenarios, call generate_conditions first")]
    NoConditions,
    #[error("invalid conditions: {0}")]
    Condition(#[from] ConditionError),
    #[error("termination species '{0}' is not in the mechanism")]
    UnknownTerminationSpecies(String),
    #[error("termination conversion must be in (0, 1], got {0}")]
    InvalidConversion(f64),
}

/// integration failure of one scenario; the other scenarios are not affected
#[derive(Debug, Error, Clone, PartialEq)]
#[error("scenario {scenario}: {source}")]
pub struct SimulationError {
    pub scenario: usize,
    pub source: SolverError,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MutationError {
    #[error("combustion model is not loaded, call load_model first")]
    ModelNotLoaded,
    #[error("species index {index} out of range, the model has {count} species")]
    SpeciesIndex { index: usize, count: usize },
    #[error("reaction index {index} out of range, the model has {count} reactions")]
    ReactionIndex { index: usize, count: usize },
    #[error("species '{0}' is not in the model")]
    UnknownSpecies(String),
    #[error("reaction {index} has {expected} kinetics, the update has {found}")]
    KineticsTypeMismatch {
        index: usize,
        expected: ReactionType,
        found: ReactionType,
    },
}

/// stop a scenario early once `species` has lost this fraction of its initial amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationConversion {
    pub species: String,
    pub conversion: f64,
}

/// everything a workflow run configures; one instance per driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub output_directory: PathBuf,
    pub solver: SolverConfig,
    pub plot: PlotSettings,
    pub termination: Option<TerminationConversion>,
    /// also write `{index}_trajectory.csv` next to the plots
    pub save_csv: bool,
}

impl Default for DriverSettings {
    fn default() -> Self {
        DriverSettings {
            output_directory: PathBuf::from("output"),
            solver: SolverConfig::default(),
            plot: PlotSettings::default(),
            termination: None,
            save_csv: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// a thermo definition was changed and the model was not refreshed since
    pub thermo_refresh_pending: bool,
    /// species whose thermo in the model differs from the source collection
    pub unsynced_species: BTreeSet<usize>,
    /// reactions whose kinetics in the model differs from the source collection
    pub unsynced_reactions: BTreeSet<usize>,
}

impl SyncState {
    pub fn unsynced_mutations(&self) -> bool {
        !self.unsynced_species.is_empty() || !self.unsynced_reactions.is_empty()
    }
}

pub struct SimulationDriver {
    species: Vec<Species>,
    reactions: Vec<Reaction>,
    settings: DriverSettings,
    model: Option<CombustionModel>,
    scenarios: Vec<Scenario>,
    sync: SyncState,
}

impl SimulationDriver {
    pub fn new(mechanism: Mechanism, settings: DriverSettings) -> Self {
        SimulationDriver {
            species: mechanism.species,
            reactions: mechanism.reactions,
            settings,
            model: None,
            scenarios: Vec::new(),
            sync: SyncState::default(),
        }
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn model(&self) -> Option<&CombustionModel> {
        self.model.as_ref()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    /// Builds the combustion model from the source species and reactions. Calling it again
    /// without changes gives an identical model.
    pub fn load_model(&mut self) -> &CombustionModel {
        if self.sync.unsynced_mutations() {
            warn!(
                "load_model discards unsynced changes of species {:?} and reactions {:?}",
                self.sync.unsynced_species, self.sync.unsynced_reactions
            );
        }
        self.sync = SyncState::default();
        info!(
            "building combustion model: {} species, {} reactions",
            self.species.len(),
            self.reactions.len()
        );
        self.model.insert(CombustionModel::build(&self.species, &self.reactions))
    }

    /// Rebuilds the model from its own current definitions, so the direct changes survive and the
    /// thermo snapshot picks up every changed definition.
    pub fn refresh_model(&mut self) -> Result<(), DriverError> {
        let model = self.model.as_ref().ok_or(DriverError::ModelNotLoaded)?;
        self.model = Some(model.rebuilt());
        self.sync.thermo_refresh_pending = false;
        info!("combustion model refreshed");
        Ok(())
    }

    pub fn generate_conditions(&mut self, set: &ConditionSet) -> Result<&[Scenario], DriverError> {
        self.scenarios = ConditionBuilder::new(&self.species).generate_conditions(set)?;
        Ok(&self.scenarios)
    }

    pub fn print_scenarios(&self) {
        print_scenarios(&self.scenarios, &self.species);
    }

    fn check_termination(&self, model: &CombustionModel) -> Result<Option<(usize, f64)>, DriverError> {
        let Some(termination) = &self.settings.termination else {
            return Ok(None);
        };
        if !(termination.conversion > 0.0 && termination.conversion <= 1.0) {
            return Err(DriverError::InvalidConversion(termination.conversion));
        }
        let index = model
            .species_index(&termination.species)
            .ok_or_else(|| DriverError::UnknownTerminationSpecies(termination.species.clone()))?;
        Ok(Some((index, termination.conversion)))
    }

    /// Runs every stored scenario against the current model, in scenario order. A scenario that
    /// fails to integrate yields its error in place and the rest still run.
    pub fn simulate(&self) -> Result<Vec<Result<Trajectory, SimulationError>>, DriverError> {
        let model = self.model.as_ref().ok_or(DriverError::ModelNotLoaded)?;
        if self.scenarios.is_empty() {
            return Err(DriverError::NoConditions);
        }
        if self.sync.thermo_refresh_pending {
            warn!("thermo changes are pending, simulating with the previous thermo until refresh_model");
        }
        let termination = self.check_termination(model)?;
        let results: Vec<_> = self
            .scenarios
            .iter()
            .map(|scenario| {
                let result = simulate_scenario(model, scenario, &self.settings.solver, termination);
                match &result {
                    Ok(trajectory) => info!(
                        "scenario {} ({}, {:.1} K, {:.0} Pa): {} points",
                        scenario.index,
                        scenario.reactor_type,
                        scenario.T,
                        scenario.P,
                        trajectory.len()
                    ),
                    Err(e) => error!("{}", e),
                }
                result
            })
            .collect();
        if self.settings.save_csv {
            self.save_trajectories(&results);
        }
        Ok(results)
    }

    fn save_trajectories(&self, results: &[Result<Trajectory, SimulationError>]) {
        if let Err(e) = std::fs::create_dir_all(&self.settings.output_directory) {
            warn!("cannot create {}: {}", self.settings.output_directory.display(), e);
            return;
        }
        for trajectory in results.iter().flatten() {
            let path = self
                .settings
                .output_directory
                .join(format!("{}_trajectory.csv", trajectory.scenario_index));
            if let Err(e) = trajectory.save_csv(&path) {
                warn!("cannot write {}: {}", path.display(), e);
            }
        }
    }

    /// plots into the configured output directory
    pub fn plot(&self, results: &[Result<Trajectory, SimulationError>]) -> Vec<Result<PathBuf, PlotError>> {
        self.plot_into(results, &self.settings.output_directory)
    }

    pub fn plot_into(
        &self,
        results: &[Result<Trajectory, SimulationError>],
        output_directory: &Path,
    ) -> Vec<Result<PathBuf, PlotError>> {
        plot_trajectories(results, output_directory, &self.settings.plot)
    }

    /// Writes the thermo of `updated` into the model. The target is the species at `index`, or with
    /// `use_mechanism_identifier` the model species with the label of `updated`. Takes effect in
    /// simulations after `refresh_model`.
    pub fn modify_species_thermo(
        &mut self,
        index: usize,
        updated: &Species,
        use_mechanism_identifier: bool,
    ) -> Result<usize, MutationError> {
        let model = self.model.as_mut().ok_or(MutationError::ModelNotLoaded)?;
        let target = if use_mechanism_identifier {
            model
                .species_index(&updated.label)
                .ok_or_else(|| MutationError::UnknownSpecies(updated.label.clone()))?
        } else if index < model.species_count() {
            index
        } else {
            return Err(MutationError::SpeciesIndex {
                index,
                count: model.species_count(),
            });
        };
        model.set_thermo_definition(target, updated.thermo.clone());
        self.sync.thermo_refresh_pending = true;
        self.sync.unsynced_species.insert(target);
        info!(
            "thermo of species {} ({}) replaced, refresh_model required",
            target,
            model.labels()[target]
        );
        Ok(target)
    }

    /// Writes the kinetics of `updated` into reaction `index` of the model; read by the next
    /// simulation without a refresh. The kinetics form must stay the same.
    pub fn modify_reaction_kinetics(&mut self, index: usize, updated: &Reaction) -> Result<(), MutationError> {
        let model = self.model.as_mut().ok_or(MutationError::ModelNotLoaded)?;
        let count = model.reaction_count();
        let current = model
            .reaction(index)
            .ok_or(MutationError::ReactionIndex { index, count })?;
        let expected = current.kinetics.reaction_type();
        let found = updated.reaction_type();
        if expected != found {
            return Err(MutationError::KineticsTypeMismatch { index, expected, found });
        }
        model.set_reaction_kinetics(index, updated.kinetics.clone());
        self.sync.unsynced_reactions.insert(index);
        info!("kinetics of reaction {} replaced", index);
        Ok(())
    }

    /// Copies every direct change of the model back into the source collections, so that a later
    /// `load_model` keeps them.
    pub fn sync_mutations_to_source(&mut self) -> Result<(), MutationError> {
        let model = self.model.as_ref().ok_or(MutationError::ModelNotLoaded)?;
        for &i in &self.sync.unsynced_species {
            if let Some(thermo) = model.thermo_definition(i) {
                self.species[i] = self.species[i].with_thermo(thermo.clone());
            }
        }
        for &j in &self.sync.unsynced_reactions {
            if let Some(compiled) = model.reaction(j) {
                self.reactions[j] = self.reactions[j].with_kinetics(compiled.kinetics.clone());
            }
        }
        debug!(
            "synced {} species and {} reactions to the mechanism",
            self.sync.unsynced_species.len(),
            self.sync.unsynced_reactions.len()
        );
        self.sync.unsynced_species.clear();
        self.sync.unsynced_reactions.clear();
        Ok(())
    }
}

/// Integrates one scenario. Deterministic for a given model, scenario and settings.
pub fn simulate_scenario(
    model: &CombustionModel,
    scenario: &Scenario,
    solver: &SolverConfig,
    termination: Option<(usize, f64)>,
) -> Result<Trajectory, SimulationError> {
    let equations = ReactorEquations::new(model, scenario);
    let y0 = equations.initial_state(scenario);
    let failed = |source: SolverError| SimulationError {
        scenario: scenario.index,
        source,
    };
    let (system, unknowns, y0, stop) = match termination {
        Some((i, conversion)) if y0[i] > 0.0 => {
            let (system, unknowns) = equations.with_conversion(i, y0[i]);
            (system, unknowns, y0.push(0.0), Some((CONVERSION.to_owned(), conversion)))
        }
        _ => (equations.equations(), equations.unknowns(), y0, None),
    };
    let stopping = stop.is_some();
    let solution = solve_ivp(system, unknowns, y0, scenario.duration, solver, stop).map_err(failed)?;

    let mut trajectory = Trajectory::new(scenario.index, model.labels().to_vec());
    for k in 0..solution.len() {
        let state = equations.state(&solution.state(k));
        let enthalpy = model.mixture_enthalpy(state.T, &state.mole_fractions);
        trajectory.push(solution.t[k], state.T, state.P, state.mole_fractions, enthalpy);
    }
    let stopped_early = stopping && solution.t[solution.len() - 1] < scenario.duration * (1.0 - 1e-9);
    debug!(
        "scenario {}: {} points{}",
        scenario.index,
        solution.len(),
        if stopped_early { ", stopped at the target conversion" } else { "" }
    );
    Ok(trajectory)
}
