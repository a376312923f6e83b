//! # SMILES reader
//!
//! Supported: organic-subset atoms (B C N O P S F Cl Br I), bracket atoms with isotope, hydrogen
//! count, charge and atom class, bonds `- = # $` (stereo bonds `/` `\` are read as single),
//! branches, ring closures (`1`..`9`, `%nn`) and dot-separated fragments.
//!
//! Aromatic lowercase atoms are not supported: the Kekulé form has to be used instead.
//!
//! Hydrogens are made explicit. An organic-subset atom receives hydrogens up to the lowest
//! standard valence that fits its bonds. A bracket atom receives exactly the hydrogens written
//! and its remaining free valence becomes unpaired electrons, so `[CH3]` is the methyl radical
//! and `[O][O]` is triplet oxygen.
use crate::Molecule::elements::find_element;
use crate::Molecule::molecule_graph::{Atom, BondOrder, Molecule, StructureError};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

const ORGANIC_SUBSET: [&str; 10] = ["Cl", "Br", "B", "C", "N", "O", "P", "S", "F", "I"];

enum HydrogenRule {
    Implicit,
    Bracket { hydrogens: u8 },
}

struct SmilesReader<'a> {
    text: &'a str,
    chars: Vec<char>,
    position: usize,
    molecule: Molecule,
    rules: Vec<(NodeIndex, HydrogenRule)>,
}

impl<'a> SmilesReader<'a> {
    fn new(text: &'a str) -> Self {
        SmilesReader {
            text,
            chars: text.chars().collect(),
            position: 0,
            molecule: Molecule::new(),
            rules: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> StructureError {
        StructureError::Smiles {
            smiles: self.text.to_string(),
            position: self.position,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn read_number(&mut self) -> Result<Option<u32>, StructureError> {
        let start = self.position;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.position += 1;
        }
        if start == self.position {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.position].iter().collect();
        digits
            .parse()
            .map(Some)
            .map_err(|_| self.error(format!("number {} is too large", digits)))
    }

    fn organic_atom(&mut self) -> Result<NodeIndex, StructureError> {
        let c = self.peek().unwrap_or(' ');
        if matches!(c, 'b' | 'c' | 'n' | 'o' | 'p' | 's') {
            return Err(self.error(format!(
                "aromatic atom '{}' is not supported, write the Kekule structure",
                c
            )));
        }
        for symbol in ORGANIC_SUBSET {
            let matched = symbol
                .chars()
                .enumerate()
                .all(|(i, s)| self.peek_at(i) == Some(s));
            if matched {
                self.position += symbol.len();
                let node = self.molecule.add_atom(Atom::new(symbol)?);
                self.rules.push((node, HydrogenRule::Implicit));
                return Ok(node);
            }
        }
        Err(self.error(format!("unexpected character '{}'", c)))
    }

    fn bracket_atom(&mut self) -> Result<NodeIndex, StructureError> {
        // skip '['
        self.position += 1;
        let _isotope = self.read_number()?;
        let first = self
            .peek()
            .ok_or_else(|| self.error("unterminated bracket atom"))?;
        if first.is_ascii_lowercase() {
            return Err(self.error(format!(
                "aromatic atom '{}' is not supported, write the Kekule structure",
                first
            )));
        }
        if !first.is_ascii_uppercase() {
            return Err(self.error(format!("expected element symbol, found '{}'", first)));
        }
        let mut symbol = first.to_string();
        if let Some(second) = self.peek_at(1).filter(|c| c.is_ascii_lowercase()) {
            let two: String = [first, second].iter().collect();
            if find_element(&two).is_some() {
                symbol = two;
            } else {
                return Err(StructureError::UnknownElement(two));
            }
        }
        self.position += symbol.len();
        while self.peek() == Some('@') {
            self.position += 1;
        }
        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.position += 1;
            hydrogens = match self.read_number()? {
                Some(n) => u8::try_from(n).map_err(|_| self.error(format!("hydrogen count {} is out of range", n)))?,
                None => 1,
            };
        }
        let mut charge: i8 = 0;
        while let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
            self.position += 1;
            let magnitude = match self.read_number()? {
                Some(n) => i8::try_from(n).map_err(|_| self.error(format!("charge {} is out of range", n)))?,
                None => 1,
            };
            let step = if sign == '+' { magnitude } else { -magnitude };
            charge = charge
                .checked_add(step)
                .ok_or_else(|| self.error("total charge is out of range"))?;
        }
        if self.peek() == Some(':') {
            self.position += 1;
            let _class = self.read_number()?;
        }
        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.position += 1;
        let atom = Atom::new(&symbol)?.with_charge(charge);
        let node = self.molecule.add_atom(atom);
        self.rules.push((node, HydrogenRule::Bracket { hydrogens }));
        Ok(node)
    }

    fn read(mut self) -> Result<Molecule, StructureError> {
        let mut previous: Option<NodeIndex> = None;
        let mut pending_bond: Option<BondOrder> = None;
        let mut branches: Vec<NodeIndex> = Vec::new();
        let mut rings: HashMap<u32, (NodeIndex, Option<BondOrder>, usize)> = HashMap::new();

        while let Some(c) = self.peek() {
            match c {
                '-' | '/' | '\\' => {
                    pending_bond = Some(BondOrder::Single);
                    self.position += 1;
                }
                '=' => {
                    pending_bond = Some(BondOrder::Double);
                    self.position += 1;
                }
                '#' => {
                    pending_bond = Some(BondOrder::Triple);
                    self.position += 1;
                }
                '$' => {
                    pending_bond = Some(BondOrder::Quadruple);
                    self.position += 1;
                }
                ':' => return Err(self.error("aromatic bonds are not supported")),
                '(' => {
                    let current = previous.ok_or_else(|| self.error("branch without atom"))?;
                    branches.push(current);
                    self.position += 1;
                }
                ')' => {
                    previous = Some(
                        branches
                            .pop()
                            .ok_or_else(|| self.error("unbalanced ')'"))?,
                    );
                    self.position += 1;
                }
                '.' => {
                    if pending_bond.is_some() {
                        return Err(self.error("bond before '.'"));
                    }
                    previous = None;
                    self.position += 1;
                }
                '%' | '0'..='9' => {
                    let start = self.position;
                    let label = if c == '%' {
                        self.position += 1;
                        let digits: Option<u32> = match (self.peek(), self.peek_at(1)) {
                            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                                self.position += 2;
                                a.to_digit(10).zip(b.to_digit(10)).map(|(a, b)| a * 10 + b)
                            }
                            _ => None,
                        };
                        digits.ok_or_else(|| self.error("'%' must be followed by two digits"))?
                    } else {
                        self.position += 1;
                        c.to_digit(10).unwrap_or(0)
                    };
                    let current = previous.ok_or_else(|| self.error("ring closure without atom"))?;
                    match rings.remove(&label) {
                        Some((opening, opening_bond, _)) => {
                            let order = match (opening_bond, pending_bond) {
                                (Some(a), Some(b)) if a != b => {
                                    return Err(self.error(format!(
                                        "ring bond {} has conflicting orders",
                                        label
                                    )));
                                }
                                (a, b) => b.or(a).unwrap_or(BondOrder::Single),
                            };
                            self.molecule
                                .add_bond(opening, current, order)
                                .map_err(|e| self.error(e.to_string()))?;
                        }
                        None => {
                            rings.insert(label, (current, pending_bond, start));
                        }
                    }
                    pending_bond = None;
                }
                '[' => {
                    let node = self.bracket_atom()?;
                    self.connect(previous, node, pending_bond.take())?;
                    previous = Some(node);
                }
                _ => {
                    let node = self.organic_atom()?;
                    self.connect(previous, node, pending_bond.take())?;
                    previous = Some(node);
                }
            }
        }
        if pending_bond.is_some() {
            return Err(self.error("dangling bond at end of string"));
        }
        if !branches.is_empty() {
            return Err(self.error("unclosed branch"));
        }
        if let Some((label, (_, _, position))) = rings.iter().min_by_key(|(_, v)| v.2) {
            return Err(StructureError::Smiles {
                smiles: self.text.to_string(),
                position: *position,
                message: format!("ring {} is not closed", label),
            });
        }
        if self.molecule.is_empty() {
            return Err(StructureError::Empty);
        }
        self.add_hydrogens()?;
        Ok(self.molecule)
    }

    fn connect(
        &mut self,
        previous: Option<NodeIndex>,
        node: NodeIndex,
        bond: Option<BondOrder>,
    ) -> Result<(), StructureError> {
        match previous {
            Some(previous) => self
                .molecule
                .add_bond(previous, node, bond.unwrap_or(BondOrder::Single)),
            None if bond.is_some() => Err(self.error("bond without preceding atom")),
            None => Ok(()),
        }
    }

    fn add_hydrogens(&mut self) -> Result<(), StructureError> {
        let rules = std::mem::take(&mut self.rules);
        for (node, rule) in rules {
            let atom = self.molecule.atom(node).clone();
            let element = find_element(&atom.element)
                .ok_or_else(|| StructureError::UnknownElement(atom.element.clone()))?;
            let bonds = self.molecule.bond_order_sum(node).round() as i32;
            let hydrogens = match rule {
                HydrogenRule::Implicit => {
                    let valence = element
                        .valences
                        .iter()
                        .map(|v| *v as i32)
                        .find(|v| *v >= bonds)
                        .unwrap_or(bonds);
                    (valence - bonds) as u8
                }
                HydrogenRule::Bracket { hydrogens } => {
                    let base = element.valences.first().copied().unwrap_or(0) as i32;
                    let charge = atom.charge as i32;
                    let valence = match atom.element.as_str() {
                        "C" | "Si" => base - charge.abs(),
                        "B" => base - charge,
                        _ => base + charge,
                    };
                    let unpaired = (valence - bonds - hydrogens as i32).max(0) as u8;
                    self.molecule.atom_mut(node).unpaired_electrons = unpaired;
                    hydrogens
                }
            };
            for _ in 0..hydrogens {
                let h = self.molecule.add_atom(Atom::new("H")?);
                self.molecule.add_bond(node, h, BondOrder::Single)?;
            }
        }
        Ok(())
    }
}

/// Parses a SMILES string into a molecule with explicit hydrogens.
pub fn parse_smiles(smiles: &str) -> Result<Molecule, StructureError> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(StructureError::Empty);
    }
    SmilesReader::new(trimmed).read()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Molecule::adjacency_list::parse_adjacency_list;
    use approx::assert_relative_eq;

    #[test]
    fn test_implicit_hydrogens() {
        assert_eq!(parse_smiles("C").unwrap().formula_string(), "CH4");
        assert_eq!(parse_smiles("CCO").unwrap().formula_string(), "C2H6O");
        assert_eq!(parse_smiles("C#N").unwrap().formula_string(), "CHN");
        assert_eq!(parse_smiles("O=C=O").unwrap().formula_string(), "CO2");
        assert_eq!(parse_smiles("CC(C)(C)C").unwrap().formula_string(), "C5H12");
        assert_eq!(parse_smiles("ClCBr").unwrap().formula_string(), "CH2BrCl");
        assert_relative_eq!(
            parse_smiles("C").unwrap().molecular_weight(),
            0.016043,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_ring_closures() {
        let cyclopropane = parse_smiles("C1CC1").unwrap();
        assert_eq!(cyclopropane.formula_string(), "C3H6");
        assert_eq!(cyclopropane.bond_count(), 9);
        let same = parse_smiles("C%10CC%10").unwrap();
        assert!(cyclopropane.is_isomorphic(&same));
        let benzene = parse_smiles("C1=CC=CC=C1").unwrap();
        assert_eq!(benzene.formula_string(), "C6H6");
    }

    #[test]
    fn test_bracket_atoms_and_radicals() {
        let methyl = parse_smiles("[CH3]").unwrap();
        assert_eq!(methyl.total_unpaired_electrons(), 1);
        let oxygen = parse_smiles("[O][O]").unwrap();
        assert_eq!(oxygen.total_unpaired_electrons(), 2);
        let atom = parse_smiles("[O]").unwrap();
        assert_eq!(atom.total_unpaired_electrons(), 2);
        let hydroxyl = parse_smiles("[OH]").unwrap();
        assert_eq!(hydroxyl.total_unpaired_electrons(), 1);
        let ammonium = parse_smiles("[NH4+]").unwrap();
        assert_eq!(ammonium.total_charge(), 1);
        assert_eq!(ammonium.total_unpaired_electrons(), 0);
        let hydroxide = parse_smiles("[OH-]").unwrap();
        assert_eq!(hydroxide.total_unpaired_electrons(), 0);
        let argon = parse_smiles("[Ar]").unwrap();
        assert_eq!(argon.formula_string(), "Ar");
        assert_eq!(parse_smiles("[H][H]").unwrap().total_unpaired_electrons(), 0);
        assert_eq!(parse_smiles("[13CH4]").unwrap().formula_string(), "CH4");
    }

    #[test]
    fn test_matches_dictionary_structures() {
        let (_, from_dictionary) = parse_adjacency_list(
            "OH\nmultiplicity 2\n1 O u1 p2 c0 {2,S}\n2 H u0 p0 c0 {1,S}",
        )
        .unwrap();
        assert!(parse_smiles("[OH]").unwrap().is_isomorphic(&from_dictionary));
        assert!(!parse_smiles("O").unwrap().is_isomorphic(&from_dictionary));
    }

    #[test]
    fn test_invalid_strings() {
        assert!(matches!(parse_smiles("c1ccccc1"), Err(StructureError::Smiles { position: 0, .. })));
        assert!(matches!(parse_smiles("C1CC"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("C(C"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("CC)"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("C="), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("[CH4"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("[Xx]"), Err(StructureError::UnknownElement(_))));
        assert_eq!(parse_smiles("  ").unwrap_err(), StructureError::Empty);
    }

    #[test]
    fn test_bracket_numbers_out_of_range() {
        assert!(matches!(parse_smiles("[C+100+100]"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("[C+200]"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("[CH300]"), Err(StructureError::Smiles { .. })));
        assert!(matches!(parse_smiles("[C-99999999999]"), Err(StructureError::Smiles { .. })));
        assert_eq!(parse_smiles("[NH4+1]").unwrap().total_charge(), 1);
        assert_eq!(parse_smiles("[OH-1]").unwrap().total_charge(), -1);
    }
}
