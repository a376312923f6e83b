//! Species dictionary: adjacency lists separated by blank lines, each starting with the species
//! label used in the mechanism file.
use crate::Mechanism::mechanism_error::MechanismError;
use crate::Molecule::adjacency_list::parse_adjacency_list;
use crate::Molecule::molecule_graph::Molecule;
use log::debug;
use std::collections::HashMap;

pub fn parse_species_dictionary(text: &str, file: &str) -> Result<HashMap<String, Molecule>, MechanismError> {
    let mut dictionary = HashMap::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 0;
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            add_block(&block, block_start, file, &mut dictionary)?;
            block.clear();
        } else {
            if block.is_empty() {
                block_start = i + 1;
            }
            block.push(line);
        }
    }
    add_block(&block, block_start, file, &mut dictionary)?;
    debug!("{}: {} structures", file, dictionary.len());
    Ok(dictionary)
}

fn add_block(
    block: &[&str],
    line: usize,
    file: &str,
    dictionary: &mut HashMap<String, Molecule>,
) -> Result<(), MechanismError> {
    if block.iter().all(|l| l.trim().starts_with("//")) {
        return Ok(());
    }
    let text = block.join("\n");
    let (label, molecule) = parse_adjacency_list(&text).map_err(|source| MechanismError::Structure {
        species: block[0].trim().to_string(),
        source,
    })?;
    let label = label.ok_or_else(|| MechanismError::Syntax {
        file: file.to_string(),
        line,
        message: "adjacency list without a species label".to_string(),
    })?;
    if dictionary.insert(label.clone(), molecule).is_some() {
        return Err(MechanismError::DuplicateSpecies(label));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h2o2_dictionary() {
        let dictionary =
            parse_species_dictionary(include_str!("../../data/h2o2/species_dictionary.txt"), "dict.txt").unwrap();
        assert_eq!(dictionary.len(), 10);
        assert_eq!(dictionary["H2O2"].formula_string(), "H2O2");
        assert_eq!(dictionary["O2"].total_unpaired_electrons(), 2);
        assert_eq!(dictionary["O2"].multiplicity, Some(3));
        // legacy single-line entry
        assert_eq!(dictionary["AR"].formula_string(), "Ar");
    }

    #[test]
    fn test_unlabelled_and_broken_blocks() {
        let unlabelled = parse_species_dictionary("H2\n1 H u0 {2,S}\n2 H u0 {1,S}\n\n1 H u1\n", "dict.txt").unwrap_err();
        assert!(matches!(unlabelled, MechanismError::Syntax { line: 5, .. }));

        let broken = parse_species_dictionary("OH\n1 O u1 {2,S}\n2 H u0\n", "dict.txt").unwrap_err();
        assert!(matches!(broken, MechanismError::Structure { ref species, .. } if species == "OH"));

        let twice = parse_species_dictionary("H\n1 H u1\n\nH\n1 H u1\n", "dict.txt").unwrap_err();
        assert!(matches!(twice, MechanismError::DuplicateSpecies(_)));
    }
}
