//! # Reactor scenarios
//!
//! A scenario is one fully specified reactor run: reactor type, initial temperature, pressure and
//! composition, and the duration to integrate over. `ConditionBuilder::generate_conditions` turns
//! lists of each of these into scenarios by the full Cartesian product, ordered with the reactor
//! type outermost, then temperature, pressure, composition and duration innermost:
//!
//! count = reactor types × temperatures × pressures × compositions × durations
//!
//! Compositions name species by their mechanism label or by structure, `smiles:C1CC1`, and are
//! normalized to unit sum. All values are converted to SI before a scenario is built, so a
//! scenario never carries units.
use crate::Mechanism::species::Species;
use crate::Molecule::species_resolver::resolve_smiles;
use crate::ReactorsIVP::units::Quantity;
use log::info;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SMILES_PREFIX: &str = "smiles:";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConditionError {
    #[error("no {0} given")]
    Empty(&'static str),
    #[error("unknown {kind} unit '{unit}'")]
    UnknownUnit { kind: &'static str, unit: String },
    #[error("unknown reactor type '{0}'")]
    UnknownReactorType(String),
    #[error("{what} must be positive and finite, got {value}")]
    NonPositive { what: &'static str, value: f64 },
    #[error("composition {index}: unknown species '{species}'")]
    UnknownSpecies { index: usize, species: String },
    #[error("composition {index}: mole fraction of '{species}' is {value}")]
    InvalidFraction {
        index: usize,
        species: String,
        value: f64,
    },
    #[error("composition {0} has no positive mole fraction")]
    ZeroComposition(usize),
    #[error("composition {index}: cannot resolve '{key}': {message}")]
    Unresolved {
        index: usize,
        key: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactorType {
    /// adiabatic, constant volume
    IdealGasReactor,
    /// adiabatic, constant pressure
    IdealGasConstPressureReactor,
    /// isothermal, constant pressure
    IdealGasConstPressureTemperatureReactor,
}

impl ReactorType {
    pub fn name(&self) -> &'static str {
        match self {
            ReactorType::IdealGasReactor => "IdealGasReactor",
            ReactorType::IdealGasConstPressureReactor => "IdealGasConstPressureReactor",
            ReactorType::IdealGasConstPressureTemperatureReactor => "IdealGasConstPressureTemperatureReactor",
        }
    }

    pub fn is_constant_pressure(&self) -> bool {
        !matches!(self, ReactorType::IdealGasReactor)
    }

    pub fn is_isothermal(&self) -> bool {
        matches!(self, ReactorType::IdealGasConstPressureTemperatureReactor)
    }
}

impl fmt::Display for ReactorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ReactorType {
    type Err = ConditionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IdealGasReactor" => Ok(ReactorType::IdealGasReactor),
            "IdealGasConstPressureReactor" => Ok(ReactorType::IdealGasConstPressureReactor),
            "IdealGasConstPressureTemperatureReactor" => Ok(ReactorType::IdealGasConstPressureTemperatureReactor),
            other => Err(ConditionError::UnknownReactorType(other.to_string())),
        }
    }
}

/// species key (label or `smiles:...`) -> mole fraction, as given by the user
pub type Composition = BTreeMap<String, f64>;

/// lists the scenarios are generated from; deserialized from the workflow file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub reactor_types: Vec<String>,
    pub temperatures: Vec<Quantity>,
    pub pressures: Vec<Quantity>,
    pub compositions: Vec<Composition>,
    pub durations: Vec<Quantity>,
}

/// one reactor run, all values in SI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// position in the generated sequence; names the output files
    pub index: usize,
    pub reactor_type: ReactorType,
    /// K
    pub T: f64,
    /// Pa
    pub P: f64,
    /// by species index, sums to 1
    pub mole_fractions: Vec<f64>,
    /// position of the composition in the input list
    pub composition_index: usize,
    /// s
    pub duration: f64,
}

pub struct ConditionBuilder<'a> {
    species: &'a [Species],
}

fn positive(what: &'static str, value: f64) -> Result<f64, ConditionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConditionError::NonPositive { what, value })
    }
}

fn non_empty<T>(list: &[T], what: &'static str) -> Result<(), ConditionError> {
    if list.is_empty() {
        Err(ConditionError::Empty(what))
    } else {
        Ok(())
    }
}

impl<'a> ConditionBuilder<'a> {
    pub fn new(species: &'a [Species]) -> Self {
        ConditionBuilder { species }
    }

    /// species index a composition key refers to
    fn species_of(&self, index: usize, key: &str) -> Result<usize, ConditionError> {
        if let Some(smiles) = key.strip_prefix(SMILES_PREFIX) {
            return resolve_smiles(smiles, self.species)
                .map(|s| s.index)
                .map_err(|e| ConditionError::Unresolved {
                    index,
                    key: key.to_string(),
                    message: e.to_string(),
                });
        }
        self.species
            .iter()
            .position(|s| s.label == key)
            .ok_or_else(|| ConditionError::UnknownSpecies {
                index,
                species: key.to_string(),
            })
    }

    /// normalized mole fractions by species index
    pub fn resolve_composition(&self, index: usize, composition: &Composition) -> Result<Vec<f64>, ConditionError> {
        let mut x = vec![0.0; self.species.len()];
        for (key, value) in composition {
            if !value.is_finite() || *value < 0.0 {
                return Err(ConditionError::InvalidFraction {
                    index,
                    species: key.clone(),
                    value: *value,
                });
            }
            x[self.species_of(index, key)?] += value;
        }
        let total: f64 = x.iter().sum();
        if total <= 0.0 {
            return Err(ConditionError::ZeroComposition(index));
        }
        x.iter_mut().for_each(|xi| *xi /= total);
        Ok(x)
    }

    pub fn generate_conditions(&self, set: &ConditionSet) -> Result<Vec<Scenario>, ConditionError> {
        non_empty(&set.reactor_types, "reactor types")?;
        non_empty(&set.temperatures, "temperatures")?;
        non_empty(&set.pressures, "pressures")?;
        non_empty(&set.compositions, "compositions")?;
        non_empty(&set.durations, "durations")?;

        let reactor_types = set
            .reactor_types
            .iter()
            .map(|r| r.parse::<ReactorType>())
            .collect::<Result<Vec<_>, _>>()?;
        let temperatures = set
            .temperatures
            .iter()
            .map(|q| q.to_kelvin().and_then(|T| positive("temperature", T)))
            .collect::<Result<Vec<_>, _>>()?;
        let pressures = set
            .pressures
            .iter()
            .map(|q| q.to_pascal().and_then(|P| positive("pressure", P)))
            .collect::<Result<Vec<_>, _>>()?;
        let durations = set
            .durations
            .iter()
            .map(|q| q.to_seconds().and_then(|t| positive("duration", t)))
            .collect::<Result<Vec<_>, _>>()?;
        let compositions = set
            .compositions
            .iter()
            .enumerate()
            .map(|(i, c)| self.resolve_composition(i, c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut scenarios = Vec::with_capacity(
            reactor_types.len() * temperatures.len() * pressures.len() * compositions.len() * durations.len(),
        );
        for reactor_type in &reactor_types {
            for T in &temperatures {
                for P in &pressures {
                    for (composition_index, x) in compositions.iter().enumerate() {
                        for duration in &durations {
                            scenarios.push(Scenario {
                                index: scenarios.len(),
                                reactor_type: *reactor_type,
                                T: *T,
                                P: *P,
                                mole_fractions: x.clone(),
                                composition_index,
                                duration: *duration,
                            });
                        }
                    }
                }
            }
        }
        info!("{} scenarios generated", scenarios.len());
        Ok(scenarios)
    }
}

pub fn print_scenarios(scenarios: &[Scenario], species: &[Species]) {
    let mut table = Table::new();
    table.add_row(row!["#", "Reactor", "T, K", "P, bar", "Composition", "Duration, ms"]);
    for scenario in scenarios {
        let composition = scenario
            .mole_fractions
            .iter()
            .enumerate()
            .filter(|(_, x)| **x > 0.0)
            .map(|(i, x)| {
                let label = species.get(i).map(|s| s.label.as_str()).unwrap_or("?");
                format!("{}:{:.3}", label, x)
            })
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(row![
            scenario.index,
            scenario.reactor_type,
            format!("{:.1}", scenario.T),
            format!("{:.4}", scenario.P / 1e5),
            composition,
            format!("{:.4}", scenario.duration * 1e3)
        ]);
    }
    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mechanism::fixtures::cyclopropane_mechanism;
    use approx::assert_relative_eq;

    fn set() -> ConditionSet {
        ConditionSet {
            reactor_types: vec!["IdealGasConstPressureReactor".to_string()],
            temperatures: vec![Quantity::new(1400.0, "K"), Quantity::new(1500.0, "K"), Quantity::new(1326.85, "C")],
            pressures: vec![Quantity::new(1.0, "bar"), Quantity::new(10.0, "bar")],
            compositions: vec![
                Composition::from([("smiles:C1CC1".to_string(), 1.0)]),
                Composition::from([("cC3H6(1)".to_string(), 1.0), ("Ar".to_string(), 4.0)]),
            ],
            durations: vec![Quantity::new(0.5, "ms"), Quantity::new(1.0, "ms")],
        }
    }

    #[test]
    fn test_cartesian_count_and_order() {
        let mechanism = cyclopropane_mechanism();
        let scenarios = ConditionBuilder::new(&mechanism.species).generate_conditions(&set()).unwrap();
        assert_eq!(scenarios.len(), 3 * 2 * 2 * 2);
        for (i, s) in scenarios.iter().enumerate() {
            assert_eq!(s.index, i);
        }
        // duration varies fastest, temperature slowest
        assert_relative_eq!(scenarios[0].duration, 5e-4);
        assert_relative_eq!(scenarios[1].duration, 1e-3);
        assert_eq!(scenarios[2].composition_index, 1);
        assert_relative_eq!(scenarios[4].P, 1e6);
        assert_relative_eq!(scenarios[8].T, 1500.0);
        assert_relative_eq!(scenarios[16].T, 1600.0, epsilon = 1e-9);
        let mut sorted = scenarios.clone();
        sorted.sort_by(|a, b| {
            (a.T, a.P, a.composition_index, a.duration)
                .partial_cmp(&(b.T, b.P, b.composition_index, b.duration))
                .unwrap()
        });
        assert_eq!(sorted, scenarios);
    }

    #[test]
    fn test_compositions_are_normalized_and_resolved() {
        let mechanism = cyclopropane_mechanism();
        let scenarios = ConditionBuilder::new(&mechanism.species).generate_conditions(&set()).unwrap();
        assert_eq!(scenarios[0].mole_fractions, vec![0.0, 1.0, 0.0]);
        assert_relative_eq!(scenarios[2].mole_fractions[0], 0.8);
        assert_relative_eq!(scenarios[2].mole_fractions[1], 0.2);
        assert_relative_eq!(scenarios[2].mole_fractions.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let mechanism = cyclopropane_mechanism();
        let builder = ConditionBuilder::new(&mechanism.species);

        let mut empty = set();
        empty.durations.clear();
        assert_eq!(builder.generate_conditions(&empty).unwrap_err(), ConditionError::Empty("durations"));

        let mut unit = set();
        unit.pressures.push(Quantity::new(1.0, "furlong"));
        assert!(matches!(builder.generate_conditions(&unit), Err(ConditionError::UnknownUnit { .. })));

        let mut reactor = set();
        reactor.reactor_types.push("PlugFlowReactor".to_string());
        assert!(matches!(
            builder.generate_conditions(&reactor),
            Err(ConditionError::UnknownReactorType(_))
        ));

        let mut cold = set();
        cold.temperatures.push(Quantity::new(-300.0, "C"));
        assert!(matches!(builder.generate_conditions(&cold), Err(ConditionError::NonPositive { .. })));

        let mut unknown = set();
        unknown.compositions.push(Composition::from([("CH4".to_string(), 1.0)]));
        assert_eq!(
            builder.generate_conditions(&unknown).unwrap_err(),
            ConditionError::UnknownSpecies {
                index: 2,
                species: "CH4".to_string()
            }
        );

        let mut absent = set();
        absent.compositions.push(Composition::from([("smiles:CCC".to_string(), 1.0)]));
        assert!(matches!(
            builder.generate_conditions(&absent),
            Err(ConditionError::Unresolved { index: 2, .. })
        ));

        let mut zero = set();
        zero.compositions.push(Composition::from([("Ar".to_string(), 0.0)]));
        assert_eq!(builder.generate_conditions(&zero).unwrap_err(), ConditionError::ZeroComposition(2));

        let mut negative = set();
        negative.compositions.push(Composition::from([("Ar".to_string(), -1.0)]));
        assert!(matches!(
            builder.generate_conditions(&negative),
            Err(ConditionError::InvalidFraction { .. })
        ));
    }

    #[test]
    fn test_reactor_type_names() {
        for name in [
            "IdealGasReactor",
            "IdealGasConstPressureReactor",
            "IdealGasConstPressureTemperatureReactor",
        ] {
            assert_eq!(name.parse::<ReactorType>().unwrap().to_string(), name);
        }
        assert!(ReactorType::IdealGasConstPressureTemperatureReactor.is_isothermal());
        assert!(!ReactorType::IdealGasReactor.is_constant_pressure());
    }
}
