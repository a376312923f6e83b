//! # Mechanism loading
//!
//! A generated mechanism comes as up to three files: the Chemkin file (species, NASA7 thermo and
//! reactions), the species dictionary (one adjacency list per species) and optionally a Chemkin
//! transport file. `load_chemkin_file` reads all of them and assembles a `Mechanism`: the ordered
//! species list, where every species carries its structure, thermodynamic model and (if given)
//! transport data, and the ordered reaction list whose stoichiometry refers to species positions.
//!
//! Referential integrity is checked once here: species indices equal their positions, labels are
//! unique, every reaction (and every collision efficiency) refers to an existing species.
use crate::Kinetics::reaction::Reaction;
use crate::Mechanism::chemkin_parser::parse_chemkin;
use crate::Mechanism::mechanism_error::MechanismError;
use crate::Mechanism::species::Species;
use crate::Mechanism::species_dictionary::parse_species_dictionary;
use crate::Mechanism::transport_parser::parse_transport;
use crate::Thermodynamics::thermo_model::{ThermoCalculator, ThermoModel};
use log::{debug, info, warn};
use prettytable::{Table, row};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Mechanism {
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
}

impl Mechanism {
    /// builds a mechanism from already assembled parts, with the same checks the loader applies
    pub fn from_parts(species: Vec<Species>, reactions: Vec<Reaction>) -> Result<Self, MechanismError> {
        let mechanism = Mechanism { species, reactions };
        mechanism.validate()?;
        Ok(mechanism)
    }

    pub fn validate(&self) -> Result<(), MechanismError> {
        let mut labels = HashSet::new();
        for (position, species) in self.species.iter().enumerate() {
            if species.index != position {
                return Err(MechanismError::MisplacedSpecies {
                    position,
                    index: species.index,
                });
            }
            if !labels.insert(species.label.as_str()) {
                return Err(MechanismError::DuplicateSpecies(species.label.clone()));
            }
        }
        let count = self.species.len();
        for (i, reaction) in self.reactions.iter().enumerate() {
            let colliders = reaction
                .kinetics
                .efficiencies()
                .map(|eff| eff.efficiencies.keys().copied().collect::<Vec<_>>())
                .unwrap_or_default();
            if let Some(species) = reaction
                .species_indices()
                .chain(colliders)
                .find(|s| *s >= count)
            {
                return Err(MechanismError::DanglingSpecies {
                    reaction: i,
                    species,
                    count,
                });
            }
        }
        Ok(())
    }

    pub fn species_labels(&self) -> Vec<String> {
        self.species.iter().map(|s| s.label.clone()).collect()
    }

    pub fn species_index(&self, label: &str) -> Option<usize> {
        self.species.iter().position(|s| s.label == label)
    }

    pub fn print_summary(&self) {
        let labels = self.species_labels();
        let mut species_table = Table::new();
        species_table.add_row(row!["#", "Species", "Formula", "M, g/mol", "Thermo", "H298, kJ/mol"]);
        for s in &self.species {
            species_table.add_row(row![
                s.index,
                s.label,
                s.structure.formula_string(),
                format!("{:.3}", s.molecular_weight() * 1000.0),
                s.thermo.kind(),
                format!("{:.2}", s.thermo.enthalpy(298.15) / 1000.0)
            ]);
        }
        species_table.printstd();

        let mut reaction_table = Table::new();
        reaction_table.add_row(row!["#", "Equation", "Type", "Duplicate"]);
        for (i, reaction) in self.reactions.iter().enumerate() {
            reaction_table.add_row(row![
                i,
                reaction.equation(&labels),
                reaction.reaction_type(),
                if reaction.duplicate { "yes" } else { "" }
            ]);
        }
        reaction_table.printstd();
    }
}

/// contents of one input file and the name its errors are reported under
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

/// assembles a mechanism from file contents; errors name the dictionary and transport inputs
/// after `name` too, e.g. "h2o2 (species dictionary)"
pub fn load_chemkin_str(
    name: &str,
    mechanism: &str,
    dictionary: &str,
    transport: Option<&str>,
) -> Result<Mechanism, MechanismError> {
    let dictionary_name = format!("{} (species dictionary)", name);
    let transport_name = format!("{} (transport)", name);
    load_chemkin_sources(
        Source { name, text: mechanism },
        Source {
            name: &dictionary_name,
            text: dictionary,
        },
        transport.map(|text| Source {
            name: &transport_name,
            text,
        }),
    )
}

pub fn load_chemkin_sources(
    mechanism: Source,
    dictionary: Source,
    transport: Option<Source>,
) -> Result<Mechanism, MechanismError> {
    let name = mechanism.name;
    let data = parse_chemkin(mechanism.text, name)?;
    let structures = parse_species_dictionary(dictionary.text, dictionary.name)?;
    let transport = transport
        .map(|source| parse_transport(source.text, source.name))
        .transpose()?;

    let mut species = Vec::with_capacity(data.species.len());
    for (index, label) in data.species.iter().enumerate() {
        let nasa = data
            .thermo
            .get(label)
            .ok_or_else(|| MechanismError::MissingThermo(label.clone()))?;
        let structure = structures
            .get(label)
            .ok_or_else(|| MechanismError::MissingStructure(label.clone()))?;
        let mut entry = Species::new(label, index, structure.clone(), ThermoModel::from(nasa.clone()));
        if let Some(table) = &transport {
            entry.transport = table.get(label).cloned();
            if entry.transport.is_none() {
                warn!("no transport data for species {}", label);
            }
        }
        species.push(entry);
    }
    for label in structures.keys().filter(|l| !data.species.contains(*l)) {
        debug!("dictionary entry {} is not used by the mechanism", label);
    }
    let mechanism = Mechanism::from_parts(species, data.reactions)?;
    info!(
        "mechanism {}: {} species, {} reactions",
        name,
        mechanism.species.len(),
        mechanism.reactions.len()
    );
    Ok(mechanism)
}

fn read_file(path: &Path) -> Result<String, MechanismError> {
    std::fs::read_to_string(path).map_err(|source| MechanismError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loads the Chemkin file, the species dictionary and optionally the transport file.
pub fn load_chemkin_file<P: AsRef<Path>>(
    mechanism: P,
    dictionary: P,
    transport: Option<P>,
) -> Result<Mechanism, MechanismError> {
    let mechanism = mechanism.as_ref();
    let dictionary = dictionary.as_ref();
    info!("loading mechanism from {}", mechanism.display());
    let mechanism_text = read_file(mechanism)?;
    let dictionary_text = read_file(dictionary)?;
    let transport = match &transport {
        Some(path) => Some((file_name(path.as_ref()), read_file(path.as_ref())?)),
        None => None,
    };
    let (mechanism_name, dictionary_name) = (file_name(mechanism), file_name(dictionary));
    load_chemkin_sources(
        Source {
            name: &mechanism_name,
            text: &mechanism_text,
        },
        Source {
            name: &dictionary_name,
            text: &dictionary_text,
        },
        transport.as_ref().map(|(name, text)| Source { name, text }),
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
