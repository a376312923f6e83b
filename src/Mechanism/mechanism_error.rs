//! Errors raised while reading or assembling a mechanism. Any of them stops the workflow: nothing
//! downstream can run without a consistent set of species and reactions.
use crate::Kinetics::rate_expressions::KineticsError;
use crate::Molecule::molecule_graph::StructureError;
use crate::Thermodynamics::thermo_model::ThermoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MechanismError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}, line {line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },
    #[error("{file}, line {line}: species '{species}' is not declared in the SPECIES section")]
    UnknownSpecies {
        file: String,
        line: usize,
        species: String,
    },
    #[error("species '{0}' is declared twice")]
    DuplicateSpecies(String),
    #[error("no thermodynamic data for species '{0}'")]
    MissingThermo(String),
    #[error("species dictionary has no structure for species '{0}'")]
    MissingStructure(String),
    #[error("structure of species '{species}': {source}")]
    Structure {
        species: String,
        #[source]
        source: StructureError,
    },
    #[error("thermodynamic data of species '{species}': {source}")]
    Thermo {
        species: String,
        #[source]
        source: ThermoError,
    },
    #[error("{file}, line {line}: {source}")]
    Kinetics {
        file: String,
        line: usize,
        #[source]
        source: KineticsError,
    },
    #[error("reaction {reaction} refers to species index {species}, but only {count} species exist")]
    DanglingSpecies {
        reaction: usize,
        species: usize,
        count: usize,
    },
    #[error("species at position {position} carries index {index}")]
    MisplacedSpecies { position: usize, index: usize },
    #[error("{0} contains no reactions section")]
    NoReactions(String),
}
