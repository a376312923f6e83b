/// standard atomic weights and valences of the elements met in gas-phase mechanisms
pub mod elements;
/// molecule as an undirected graph of atoms and bonds, structural isomorphism
pub mod molecule_graph;
/// reader of the adjacency lists written into species dictionaries by mechanism generators
///
///  # Examples
/// ```
/// use KiMech::Molecule::adjacency_list::parse_adjacency_list;
/// let text = "OH\nmultiplicity 2\n1 O u1 p2 c0 {2,S}\n2 H u0 p0 c0 {1,S}";
/// let (label, molecule) = parse_adjacency_list(text).unwrap();
/// assert_eq!(label, Some("OH".to_string()));
/// assert_eq!(molecule.formula_string(), "HO");
/// ```
pub mod adjacency_list;
/// reader of the SMILES line notation (organic subset, bracket atoms, rings and branches)
///
///  # Examples
/// ```
/// use KiMech::Molecule::smiles::parse_smiles;
/// let cyclopropane = parse_smiles("C1CC1").unwrap();
/// let propene = parse_smiles("C=CC").unwrap();
/// assert_eq!(cyclopropane.formula_string(), propene.formula_string());
/// assert!(!cyclopropane.is_isomorphic(&propene));
/// ```
pub mod smiles;
/// search of a species of the mechanism by its molecular structure
pub mod species_resolver;
