//! The workflow run from the command line: load a mechanism, simulate every scenario, plot, apply
//! the configured parameter changes and simulate and plot again.
use crate::Kinetics::rate_expressions::KineticsError;
use crate::Mechanism::mechanism_error::MechanismError;
use crate::Mechanism::mechanism_loader::load_chemkin_file;
use crate::Mechanism::species::Species;
use crate::Molecule::species_resolver::{ResolveError, resolve_smiles};
use crate::ReactorsIVP::conditions::ConditionError;
use crate::ReactorsIVP::simulation_driver::{DriverError, MutationError, SimulationDriver, SimulationError};
use crate::ReactorsIVP::trajectory::Trajectory;
use crate::Utils::logger::{LoggerError, init_logging};
use crate::Utils::plot_trajectories::PlotError;
use crate::Utils::workflow_config::{ConfigError, Mutation, WorkflowConfig};
use log::{info, warn};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logger(#[from] LoggerError),
    #[error(transparent)]
    Mechanism(#[from] MechanismError),
    #[error("target species: {0}")]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    Kinetics(#[from] KineticsError),
    #[error(transparent)]
    Condition(#[from] ConditionError),
    #[error("usage: KiMech <workflow.json>")]
    Usage,
}

/// what one round of simulations produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSummary {
    pub scenarios: usize,
    pub failed: Vec<usize>,
    pub plots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowReport {
    pub target_species: Option<String>,
    pub initial: RoundSummary,
    /// present when the configuration lists parameter changes
    pub modified: Option<RoundSummary>,
}

fn species_by_key(key: &str, species: &[Species]) -> Result<usize, WorkflowError> {
    match key.strip_prefix("smiles:") {
        Some(smiles) => Ok(resolve_smiles(smiles, species)?.index),
        None => species
            .iter()
            .position(|s| s.label == key)
            .ok_or_else(|| MutationError::UnknownSpecies(key.to_string()).into()),
    }
}

fn round(driver: &SimulationDriver, output: Option<PathBuf>) -> Result<RoundSummary, WorkflowError> {
    let results = driver.simulate()?;
    for trajectory in results.iter().flatten() {
        trajectory.print_final_state();
    }
    let plots = match output {
        Some(directory) => driver.plot_into(&results, &directory),
        None => driver.plot(&results),
    };
    Ok(summarize(&results, plots))
}

fn summarize(
    results: &[Result<Trajectory, SimulationError>],
    plots: Vec<Result<PathBuf, PlotError>>,
) -> RoundSummary {
    RoundSummary {
        scenarios: results.len(),
        failed: results
            .iter()
            .filter_map(|r| r.as_ref().err().map(|e| e.scenario))
            .collect(),
        plots: plots.into_iter().flatten().collect(),
    }
}

fn apply_mutation(driver: &mut SimulationDriver, mutation: &Mutation) -> Result<(), WorkflowError> {
    let model = driver.model().ok_or(MutationError::ModelNotLoaded)?;
    match mutation {
        Mutation::SpeciesEnthalpy { species, delta_h } => {
            let index = species_by_key(species, driver.species())?;
            let delta = delta_h.to_joule_per_mole()?;
            let source = &driver.species()[index];
            // the model may already carry earlier shifts that are not synced back yet
            let thermo = model
                .species_index(&source.label)
                .and_then(|i| model.thermo_definition(i))
                .ok_or_else(|| MutationError::UnknownSpecies(source.label.clone()))?;
            let updated = source.with_thermo(thermo.with_enthalpy_offset(delta));
            driver.modify_species_thermo(index, &updated, true)?;
            info!("enthalpy of {} shifted by {} J/mol", updated.label, delta);
        }
        Mutation::ReactionPrefactor { reaction, factor } => {
            let count = model.reaction_count();
            let kinetics = &model
                .reaction(*reaction)
                .ok_or(MutationError::ReactionIndex { index: *reaction, count })?
                .kinetics;
            let source = driver
                .reactions()
                .get(*reaction)
                .ok_or(MutationError::ReactionIndex { index: *reaction, count })?;
            let updated = source.with_kinetics(kinetics.with_scaled_prefactor(*factor)?);
            driver.modify_reaction_kinetics(*reaction, &updated)?;
            info!("rate constant of reaction {} multiplied by {}", reaction, factor);
        }
    }
    Ok(())
}

/// Runs the whole workflow. Loader and resolver failures stop it; failed scenarios and plots are
/// reported in the summary.
pub fn run_workflow(config: &WorkflowConfig) -> Result<WorkflowReport, WorkflowError> {
    let mechanism = load_chemkin_file(
        &config.mechanism,
        &config.species_dictionary,
        config.transport.as_ref(),
    )?;
    mechanism.print_summary();
    let target_species = match &config.target_smiles {
        Some(smiles) => {
            let species = resolve_smiles(smiles, &mechanism.species)?;
            info!("{} is species {} ({})", smiles, species.index, species.label);
            Some(species.label.clone())
        }
        None => None,
    };

    let mut driver = SimulationDriver::new(mechanism, config.driver_settings());
    driver.load_model();
    driver.generate_conditions(&config.conditions)?;
    driver.print_scenarios();
    let initial = round(&driver, None)?;

    let modified = if config.mutations.is_empty() {
        None
    } else {
        for mutation in &config.mutations {
            apply_mutation(&mut driver, mutation)?;
        }
        if driver.sync_state().thermo_refresh_pending {
            driver.refresh_model()?;
        }
        let directory = config.output_directory.join("modified");
        Some(round(&driver, Some(directory))?)
    };
    for summary in std::iter::once(&initial).chain(modified.as_ref()) {
        if !summary.failed.is_empty() {
            warn!("failed scenarios: {:?}", summary.failed);
        }
    }
    Ok(WorkflowReport {
        target_species,
        initial,
        modified,
    })
}

fn ask_for_workflow() -> Option<String> {
    println!("\x1b[34m\nKiMech: mechanism loading, reactor simulations and parameter studies\x1b[0m");
    print!("\x1b[36mPath to the workflow file (empty to exit): \x1b[0m");
    io::stdout().flush().ok()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    let input = input.trim();
    if input.is_empty() { None } else { Some(input.to_string()) }
}

/// `KiMech <workflow.json>`; without an argument the path is asked for
pub fn run_from_args() -> Result<WorkflowReport, WorkflowError> {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => ask_for_workflow().ok_or(WorkflowError::Usage)?,
    };
    let config = WorkflowConfig::load(&path)?;
    init_logging(&config.log_level, config.log_file.as_deref())?;
    info!("workflow {}", path);
    run_workflow(&config)
}
