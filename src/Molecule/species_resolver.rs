//! Finds the species of a mechanism whose dictionary structure is the same molecule as a
//! user-given structure. Labels are never compared: generated mechanisms name species like
//! `C3H6(2)`, so the only reliable key is the molecular graph.
use crate::Mechanism::species::Species;
use crate::Molecule::molecule_graph::{Molecule, StructureError};
use crate::Molecule::smiles::parse_smiles;
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no species of the mechanism has the structure of {formula}")]
    NotFound { formula: String },
    #[error("structure {formula} matches several species: {labels:?}")]
    Ambiguous { formula: String, labels: Vec<String> },
    #[error("invalid structure: {0}")]
    Structure(#[from] StructureError),
}

/// returns the single species isomorphic to `target`
pub fn resolve_species<'a>(
    target: &Molecule,
    species: &'a [Species],
) -> Result<&'a Species, ResolveError> {
    let formula = target.formula_string();
    let matches: Vec<&Species> = species
        .iter()
        .filter(|s| s.structure.is_isomorphic(target))
        .collect();
    debug!("{} candidate(s) for structure {}", matches.len(), formula);
    match matches.as_slice() {
        [single] => {
            info!("structure {} resolved to species {}", formula, single.label);
            Ok(*single)
        }
        [] => Err(ResolveError::NotFound { formula }),
        several => Err(ResolveError::Ambiguous {
            formula,
            labels: several.iter().map(|s| s.label.clone()).collect(),
        }),
    }
}

pub fn resolve_smiles<'a>(smiles: &str, species: &'a [Species]) -> Result<&'a Species, ResolveError> {
    let target = parse_smiles(smiles)?;
    resolve_species(&target, species)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mechanism::fixtures::{cyclopropane_mechanism, h2o2_mechanism};

    #[test]
    fn test_isomers_are_told_apart() {
        let mechanism = cyclopropane_mechanism();
        let cyclopropane = resolve_smiles("C1CC1", &mechanism.species).unwrap();
        assert_eq!(cyclopropane.label, "cC3H6(1)");
        let propene = resolve_smiles("C=CC", &mechanism.species).unwrap();
        assert_eq!(propene.label, "C3H6(2)");
        // same molecule written from the other end
        let propene_again = resolve_smiles("CC=C", &mechanism.species).unwrap();
        assert_eq!(propene_again.index, propene.index);
    }

    #[test]
    fn test_absent_structure_is_not_found() {
        let mechanism = cyclopropane_mechanism();
        let err = resolve_smiles("CCC", &mechanism.species).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { ref formula } if formula == "C3H8"));
        assert!(matches!(
            resolve_smiles("C1CC", &mechanism.species),
            Err(ResolveError::Structure(_))
        ));
    }

    #[test]
    fn test_radicals_and_legacy_entries() {
        let mechanism = h2o2_mechanism();
        assert_eq!(resolve_smiles("[OH]", &mechanism.species).unwrap().label, "OH");
        assert_eq!(resolve_smiles("[O][O]", &mechanism.species).unwrap().label, "O2");
        assert_eq!(resolve_smiles("OO", &mechanism.species).unwrap().label, "H2O2");
        assert_eq!(resolve_smiles("[Ar]", &mechanism.species).unwrap().label, "AR");
        // singlet O2 is a different molecule
        assert!(resolve_smiles("O=O", &mechanism.species).is_err());
    }

    #[test]
    fn test_duplicate_structures_are_ambiguous() {
        let mut mechanism = cyclopropane_mechanism();
        let mut copy = mechanism.species[1].clone();
        copy.label = "copy".to_string();
        copy.index = mechanism.species.len();
        mechanism.species.push(copy);
        match resolve_smiles("C1CC1", &mechanism.species) {
            Err(ResolveError::Ambiguous { labels, .. }) => {
                assert_eq!(labels, vec!["cC3H6(1)".to_string(), "copy".to_string()])
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|s| s.label.clone())),
        }
    }
}
