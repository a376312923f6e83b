//! Reader of adjacency lists as written in species dictionaries.
//!
//! Two layouts are accepted
//!  - the current one: `1 C u0 p0 c0 {2,S} {3,D}` (unpaired electrons, lone pairs, charge)
//!  - the legacy one: `1 C 0 {2,S}` where the third field is the radical count (possibly with a
//!    spin suffix like `2T`)
//!
//! An optional label line may precede the atoms and an optional `multiplicity N` line may follow
//! it. Atom labels of the form `*1` are skipped. Every bond must be declared on both atoms with
//! the same order.
use crate::Molecule::molecule_graph::{Atom, BondOrder, Molecule, StructureError};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

struct AtomLine {
    number: usize,
    atom: Atom,
    bonds: Vec<(usize, BondOrder)>,
}

fn syntax(line: usize, message: impl Into<String>) -> StructureError {
    StructureError::Syntax {
        line,
        message: message.into(),
    }
}

fn parse_bond(token: &str, line: usize) -> Result<(usize, BondOrder), StructureError> {
    let inner = token
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| syntax(line, format!("malformed bond '{}'", token)))?;
    let (partner, order) = inner
        .split_once(',')
        .ok_or_else(|| syntax(line, format!("malformed bond '{}'", token)))?;
    let partner: usize = partner
        .trim()
        .parse()
        .map_err(|_| syntax(line, format!("bad atom number in bond '{}'", token)))?;
    let order = BondOrder::from_symbol(order.trim())
        .ok_or_else(|| syntax(line, format!("unknown bond order in '{}'", token)))?;
    Ok((partner, order))
}

fn parse_small_number<T: std::str::FromStr>(text: &str, line: usize, what: &str) -> Result<T, StructureError> {
    text.parse::<T>()
        .map_err(|_| syntax(line, format!("bad {} '{}'", what, text)))
}

fn parse_atom_line(text: &str, line: usize) -> Result<AtomLine, StructureError> {
    let mut tokens = text.split_whitespace().peekable();
    let number: usize = match tokens.next() {
        Some(t) => parse_small_number(t, line, "atom number")?,
        None => return Err(syntax(line, "empty atom line")),
    };
    if tokens.peek().is_some_and(|t| t.starts_with('*')) {
        tokens.next();
    }
    let element = tokens
        .next()
        .ok_or_else(|| syntax(line, "missing element"))?;
    let mut atom = Atom::new(element)?;
    let mut bonds = Vec::new();
    for token in tokens {
        if token.starts_with('{') {
            bonds.push(parse_bond(token, line)?);
        } else if let Some(rest) = token.strip_prefix('u') {
            atom.unpaired_electrons = parse_small_number(rest, line, "unpaired electrons")?;
        } else if let Some(rest) = token.strip_prefix('p') {
            atom.lone_pairs = Some(parse_small_number(rest, line, "lone pairs")?);
        } else if let Some(rest) = token.strip_prefix('c') {
            let rest = rest.strip_prefix('+').unwrap_or(rest);
            atom.charge = parse_small_number(rest, line, "charge")?;
        } else if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            // legacy radical count, e.g. "0", "1", "2T"
            let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
            atom.unpaired_electrons = parse_small_number(&digits, line, "radical count")?;
        } else {
            return Err(syntax(line, format!("unexpected token '{}'", token)));
        }
    }
    Ok(AtomLine {
        number,
        atom,
        bonds,
    })
}

/// Parses one adjacency list block. Returns the label line (if present) and the molecule.
pub fn parse_adjacency_list(text: &str) -> Result<(Option<String>, Molecule), StructureError> {
    let mut label = None;
    let mut multiplicity = None;
    let mut atom_lines = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = raw.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("multiplicity") {
            multiplicity = Some(parse_small_number(rest.trim(), line_number, "multiplicity")?);
            continue;
        }
        let starts_with_digit = line.chars().next().is_some_and(|c| c.is_ascii_digit());
        if !starts_with_digit {
            if label.is_none() && atom_lines.is_empty() && multiplicity.is_none() {
                label = Some(line.to_string());
                continue;
            }
            return Err(syntax(line_number, format!("unexpected line '{}'", line)));
        }
        atom_lines.push(parse_atom_line(line, line_number)?);
    }
    if atom_lines.is_empty() {
        return Err(StructureError::Empty);
    }

    let mut molecule = Molecule::new();
    molecule.multiplicity = multiplicity;
    let mut nodes: HashMap<usize, NodeIndex> = HashMap::new();
    for atom_line in &atom_lines {
        let node = molecule.add_atom(atom_line.atom.clone());
        if nodes.insert(atom_line.number, node).is_some() {
            return Err(syntax(0, format!("atom {} defined twice", atom_line.number)));
        }
    }
    // every bond must be mirrored on the partner atom
    let mut declared: HashMap<(usize, usize), BondOrder> = HashMap::new();
    for atom_line in &atom_lines {
        for (partner, order) in &atom_line.bonds {
            if *partner == atom_line.number {
                return Err(StructureError::SelfBond(*partner));
            }
            if !nodes.contains_key(partner) {
                return Err(StructureError::MissingAtom(*partner));
            }
            declared.insert((atom_line.number, *partner), *order);
        }
    }
    let mut pairs: Vec<(&(usize, usize), &BondOrder)> = declared.iter().collect();
    pairs.sort_by_key(|(key, _)| **key);
    for ((a, b), order) in pairs {
        match declared.get(&(*b, *a)) {
            Some(mirror) if mirror == order => {
                if a < b {
                    molecule.add_bond(nodes[a], nodes[b], *order)?;
                }
            }
            _ => return Err(StructureError::AsymmetricBond(*a, *b)),
        }
    }
    Ok((label, molecule))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPENE: &str = "C3H6(2)
1 C u0 p0 c0 {2,D} {4,S} {5,S}
2 C u0 p0 c0 {1,D} {3,S} {6,S}
3 C u0 p0 c0 {2,S} {7,S} {8,S} {9,S}
4 H u0 p0 c0 {1,S}
5 H u0 p0 c0 {1,S}
6 H u0 p0 c0 {2,S}
7 H u0 p0 c0 {3,S}
8 H u0 p0 c0 {3,S}
9 H u0 p0 c0 {3,S}";

    #[test]
    fn test_parse_current_format() {
        let (label, molecule) = parse_adjacency_list(PROPENE).unwrap();
        assert_eq!(label.as_deref(), Some("C3H6(2)"));
        assert_eq!(molecule.formula_string(), "C3H6");
        assert_eq!(molecule.atom_count(), 9);
        assert_eq!(molecule.bond_count(), 8);
        assert_eq!(molecule.multiplicity, None);
    }

    #[test]
    fn test_parse_radical_with_multiplicity_and_labels() {
        let text = "O2\nmultiplicity 3\n1 *1 O u1 p2 c0 {2,S}\n2 O u1 p2 c0 {1,S}\n";
        let (label, molecule) = parse_adjacency_list(text).unwrap();
        assert_eq!(label.as_deref(), Some("O2"));
        assert_eq!(molecule.multiplicity, Some(3));
        assert_eq!(molecule.total_unpaired_electrons(), 2);
    }

    #[test]
    fn test_parse_legacy_format() {
        let (label, argon) = parse_adjacency_list("AR\n1 Ar 0").unwrap();
        assert_eq!(label.as_deref(), Some("AR"));
        assert_eq!(argon.formula_string(), "Ar");

        let (_, methyl) =
            parse_adjacency_list("1 C 1 {2,S} {3,S} {4,S}\n2 H 0 {1,S}\n3 H 0 {1,S}\n4 H 0 {1,S}")
                .unwrap();
        assert_eq!(methyl.total_unpaired_electrons(), 1);
        let (_, triplet) = parse_adjacency_list("1 C 2T {2,S} {3,S}\n2 H 0 {1,S}\n3 H 0 {1,S}").unwrap();
        assert_eq!(triplet.total_unpaired_electrons(), 2);
    }

    #[test]
    fn test_charges() {
        let (_, hydroxide) = parse_adjacency_list("1 O u0 p3 c-1 {2,S}\n2 H u0 p0 c0 {1,S}").unwrap();
        assert_eq!(hydroxide.total_charge(), -1);
        let (_, cation) = parse_adjacency_list("1 N u0 p0 c+1 {2,S} {3,S} {4,S} {5,S}\n2 H u0 p0 c0 {1,S}\n3 H u0 p0 c0 {1,S}\n4 H u0 p0 c0 {1,S}\n5 H u0 p0 c0 {1,S}").unwrap();
        assert_eq!(cation.total_charge(), 1);
    }

    #[test]
    fn test_inconsistent_bonds_rejected() {
        assert_eq!(
            parse_adjacency_list("1 C u0 {2,S}\n2 C u0 {1,D}").unwrap_err(),
            StructureError::AsymmetricBond(1, 2)
        );
        assert_eq!(
            parse_adjacency_list("1 C u0 {2,S}\n2 C u0").unwrap_err(),
            StructureError::AsymmetricBond(1, 2)
        );
        assert_eq!(
            parse_adjacency_list("1 C u0 {3,S}").unwrap_err(),
            StructureError::MissingAtom(3)
        );
        assert!(matches!(
            parse_adjacency_list("1 C u0 {2,X}\n2 C u0 {1,X}"),
            Err(StructureError::Syntax { line: 1, .. })
        ));
        assert_eq!(parse_adjacency_list("label only\n").unwrap_err(), StructureError::Empty);
        assert!(matches!(
            parse_adjacency_list("1 Xx u0"),
            Err(StructureError::UnknownElement(_))
        ));
    }
}
