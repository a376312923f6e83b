//! Mechanisms shipped under `data/` for tests.
use crate::Mechanism::mechanism_loader::{Mechanism, load_chemkin_str};

pub const CYCLOPROPANE_CHEMKIN: &str = include_str!("../../data/cyclopropane/chem.inp");
pub const CYCLOPROPANE_DICTIONARY: &str = include_str!("../../data/cyclopropane/species_dictionary.txt");
pub const CYCLOPROPANE_TRANSPORT: &str = include_str!("../../data/cyclopropane/tran.dat");
pub const H2O2_CHEMKIN: &str = include_str!("../../data/h2o2/chem.inp");
pub const H2O2_DICTIONARY: &str = include_str!("../../data/h2o2/species_dictionary.txt");
pub const SMILES_LABELS_CHEMKIN: &str = include_str!("../../data/smiles_labels/chem.inp");
pub const SMILES_LABELS_DICTIONARY: &str = include_str!("../../data/smiles_labels/species_dictionary.txt");
pub const SMILES_LABELS_TRANSPORT: &str = include_str!("../../data/smiles_labels/tran.dat");

/// Ar, cC3H6(1), C3H6(2) and the single isomerisation cC3H6(1) => C3H6(2)
pub fn cyclopropane_mechanism() -> Mechanism {
    load_chemkin_str(
        "cyclopropane",
        CYCLOPROPANE_CHEMKIN,
        CYCLOPROPANE_DICTIONARY,
        Some(CYCLOPROPANE_TRANSPORT),
    )
    .unwrap()
}

pub fn h2o2_mechanism() -> Mechanism {
    load_chemkin_str("h2o2", H2O2_CHEMKIN, H2O2_DICTIONARY, None).unwrap()
}

/// ethylene + H chemistry with generator labels such as `C=C(1)`, `C#C(4)` and `[H][H](5)`
pub fn smiles_labels_mechanism() -> Mechanism {
    load_chemkin_str(
        "smiles_labels",
        SMILES_LABELS_CHEMKIN,
        SMILES_LABELS_DICTIONARY,
        Some(SMILES_LABELS_TRANSPORT),
    )
    .unwrap()
}
