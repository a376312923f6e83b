//! # ReactorsIVP
//! eng
//! Zero-dimensional ideal gas reactors as initial value problems: scenarios built from lists of
//! conditions, the combustion model compiled from a mechanism, the symbolic reactor equations
//! solved by the BDF/Radau solvers of RustedSciThe, and the driver that runs scenarios and applies
//! parameter changes.
//! ru
//! Нульмерные реакторы идеального газа как задачи Коши: сценарии из списков условий, модель
//! горения, собранная из механизма, символьные уравнения реактора, решаемые методами BDF/Radau
//! из RustedSciThe, и драйвер, который запускает сценарии и применяет изменения параметров.

/// rates of progress, production rates, equilibrium constants and mixture thermo of a mechanism
pub mod combustion_model;
/// reactor types, condition lists and their Cartesian product into scenarios
pub mod conditions;
pub mod reactor_equations;
/// `UniversalODESolver` with a parameter map, plus per-scenario error checks
pub mod reactor_solver;
/// # Examples
/// ```
/// use KiMech::ReactorsIVP::simulation_driver::{DriverSettings, SimulationDriver};
/// use KiMech::ReactorsIVP::conditions::{Composition, ConditionSet};
/// use KiMech::ReactorsIVP::units::Quantity;
/// use KiMech::Mechanism::mechanism_loader::load_chemkin_str;
/// let mechanism = load_chemkin_str(
///     "cyclopropane",
///     include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cyclopropane/chem.inp")),
///     include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cyclopropane/species_dictionary.txt")),
///     None,
/// )
/// .unwrap();
/// let mut driver = SimulationDriver::new(mechanism, DriverSettings::default());
/// driver.load_model();
/// let set = ConditionSet {
///     reactor_types: vec!["IdealGasConstPressureTemperatureReactor".to_string()],
///     temperatures: vec![Quantity::new(1500.0, "K")],
///     pressures: vec![Quantity::new(1.0, "bar")],
///     compositions: vec![Composition::from([("smiles:C1CC1".to_string(), 1.0)])],
///     durations: vec![Quantity::new(0.5, "ms")],
/// };
/// driver.generate_conditions(&set).unwrap();
/// let results = driver.simulate().unwrap();
/// let trajectory = results[0].as_ref().unwrap();
/// assert!(trajectory.final_mole_fraction("cC3H6(1)").unwrap() < 1.0);
/// ```
pub mod simulation_driver;
pub mod trajectory;
pub mod units;

mod simulation_driver_tests;
