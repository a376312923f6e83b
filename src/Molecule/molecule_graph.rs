//! # Molecular graph
//!
//! A molecule is stored as an undirected graph: nodes are atoms (element, number of unpaired
//! electrons, formal charge and, when the source notation gives it, the number of lone pairs),
//! edges are bonds carrying their order. Hydrogens are always explicit nodes, so two molecules
//! written in different notations (SMILES with implicit hydrogens, adjacency lists with explicit
//! ones) end up in the same representation and can be compared structurally.
//!
//! Structural identity is graph isomorphism with matching node and edge labels. Lone pairs are
//! not compared because older dictionaries do not carry them.
use crate::Molecule::elements::{atomic_mass, canonical_symbol};
use petgraph::algo::is_isomorphic_matching;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureError {
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("bond refers to atom {0} which is not defined")]
    MissingAtom(usize),
    #[error("bond {0}-{1} is not declared identically on both atoms")]
    AsymmetricBond(usize, usize),
    #[error("atom {0} is bonded to itself")]
    SelfBond(usize),
    #[error("SMILES '{smiles}', position {position}: {message}")]
    Smiles {
        smiles: String,
        position: usize,
        message: String,
    },
    #[error("structure has no atoms")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// canonical element symbol ("C", "Ar", ...)
    pub element: String,
    pub unpaired_electrons: u8,
    pub charge: i8,
    pub lone_pairs: Option<u8>,
}

impl Atom {
    pub fn new(element: &str) -> Result<Atom, StructureError> {
        let symbol = canonical_symbol(element)
            .ok_or_else(|| StructureError::UnknownElement(element.to_string()))?;
        Ok(Atom {
            element: symbol.to_string(),
            unpaired_electrons: 0,
            charge: 0,
            lone_pairs: None,
        })
    }

    pub fn with_unpaired_electrons(mut self, unpaired: u8) -> Self {
        self.unpaired_electrons = unpaired;
        self
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_lone_pairs(mut self, lone_pairs: Option<u8>) -> Self {
        self.lone_pairs = lone_pairs;
        self
    }

    /// label comparison used during isomorphism
    pub fn matches(&self, other: &Atom) -> bool {
        self.element == other.element
            && self.unpaired_electrons == other.unpaired_electrons
            && self.charge == other.charge
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Benzene,
}

impl BondOrder {
    /// letters used by adjacency lists: S, D, T, Q, B
    pub fn from_symbol(symbol: &str) -> Option<BondOrder> {
        match symbol {
            "S" => Some(BondOrder::Single),
            "D" => Some(BondOrder::Double),
            "T" => Some(BondOrder::Triple),
            "Q" => Some(BondOrder::Quadruple),
            "B" => Some(BondOrder::Benzene),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BondOrder::Single => "S",
            BondOrder::Double => "D",
            BondOrder::Triple => "T",
            BondOrder::Quadruple => "Q",
            BondOrder::Benzene => "B",
        }
    }

    pub fn order(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Quadruple => 4.0,
            BondOrder::Benzene => 1.5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: UnGraph<Atom, BondOrder>,
    /// spin multiplicity when the source notation states it
    pub multiplicity: Option<u8>,
}

impl Molecule {
    pub fn new() -> Self {
        Molecule {
            graph: UnGraph::new_undirected(),
            multiplicity: None,
        }
    }

    pub fn add_atom(&mut self, atom: Atom) -> NodeIndex {
        self.graph.add_node(atom)
    }

    /// adds a bond; a second bond between the same pair of atoms is rejected
    pub fn add_bond(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        order: BondOrder,
    ) -> Result<(), StructureError> {
        if a == b {
            return Err(StructureError::SelfBond(a.index() + 1));
        }
        if self.graph.find_edge(a, b).is_some() {
            return Err(StructureError::Syntax {
                line: 0,
                message: format!("atoms {} and {} are bonded twice", a.index() + 1, b.index() + 1),
            });
        }
        self.graph.add_edge(a, b, order);
        Ok(())
    }

    pub fn graph(&self) -> &UnGraph<Atom, BondOrder> {
        &self.graph
    }

    pub fn atom(&self, index: NodeIndex) -> &Atom {
        &self.graph[index]
    }

    pub fn atom_mut(&mut self, index: NodeIndex) -> &mut Atom {
        &mut self.graph[index]
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.graph.node_weights()
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// sum of the orders of all bonds of an atom
    pub fn bond_order_sum(&self, index: NodeIndex) -> f64 {
        self.graph
            .edges(index)
            .map(|edge| edge.weight().order())
            .sum()
    }

    pub fn hydrogen_neighbours(&self, index: NodeIndex) -> usize {
        self.graph
            .neighbors(index)
            .filter(|n| self.graph[*n].is_hydrogen())
            .count()
    }

    /// element -> number of atoms
    pub fn formula(&self) -> BTreeMap<String, usize> {
        let mut formula = BTreeMap::new();
        for atom in self.graph.node_weights() {
            *formula.entry(atom.element.clone()).or_insert(0) += 1;
        }
        formula
    }

    /// Hill order: C, then H, then the rest alphabetically; without carbon everything is alphabetical
    pub fn formula_string(&self) -> String {
        let formula = self.formula();
        let mut order: Vec<&String> = Vec::new();
        let has_carbon = formula.contains_key("C");
        if has_carbon {
            for first in ["C", "H"] {
                if let Some((key, _)) = formula.get_key_value(first) {
                    order.push(key);
                }
            }
        }
        for key in formula.keys() {
            if has_carbon && (key == "C" || key == "H") {
                continue;
            }
            order.push(key);
        }
        order
            .into_iter()
            .map(|element| match formula[element] {
                1 => element.clone(),
                count => format!("{}{}", element, count),
            })
            .collect()
    }

    /// molar mass, kg/mol
    pub fn molecular_weight(&self) -> f64 {
        self.graph
            .node_weights()
            .map(|atom| atomic_mass(&atom.element).unwrap_or(0.0))
            .sum::<f64>()
            * 1e-3
    }

    pub fn total_unpaired_electrons(&self) -> usize {
        self.graph
            .node_weights()
            .map(|atom| atom.unpaired_electrons as usize)
            .sum()
    }

    pub fn total_charge(&self) -> i32 {
        self.graph.node_weights().map(|atom| atom.charge as i32).sum()
    }

    /// structural identity: same atoms, same connectivity, same bond orders
    pub fn is_isomorphic(&self, other: &Molecule) -> bool {
        if self.atom_count() != other.atom_count()
            || self.bond_count() != other.bond_count()
            || self.formula() != other.formula()
            || self.total_unpaired_electrons() != other.total_unpaired_electrons()
        {
            return false;
        }
        is_isomorphic_matching(
            &self.graph,
            &other.graph,
            |a: &Atom, b: &Atom| a.matches(b),
            |x: &BondOrder, y: &BondOrder| x == y,
        )
    }
}

impl fmt::Display for Molecule {
    /// adjacency-list rendering
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(multiplicity) = self.multiplicity {
            writeln!(f, "multiplicity {}", multiplicity)?;
        }
        for node in self.graph.node_indices() {
            let atom = &self.graph[node];
            write!(
                f,
                "{} {} u{} p{} c{}",
                node.index() + 1,
                atom.element,
                atom.unpaired_electrons,
                atom.lone_pairs.unwrap_or(0),
                atom.charge
            )?;
            let mut bonds: Vec<(usize, BondOrder)> = self
                .graph
                .edges(node)
                .map(|edge| {
                    let other = if edge.source() == node {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    (other.index() + 1, *edge.weight())
                })
                .collect();
            bonds.sort_by_key(|(index, _)| *index);
            for (index, order) in bonds {
                write!(f, " {{{},{}}}", index, order.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
