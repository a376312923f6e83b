//! # Mechanism
//! eng
//! Loading of mechanisms written by reaction mechanism generators: the Chemkin file, the species
//! dictionary with molecular structures and the optional transport file.
//! ru
//! Загрузка механизмов, созданных генераторами механизмов реакций: файл Chemkin, словарь веществ
//! со структурами молекул и (необязательно) файл транспортных свойств.
pub mod chemkin_parser;
pub mod mechanism_error;
/// # Examples
/// ```
/// use KiMech::Mechanism::mechanism_loader::load_chemkin_str;
/// let chem = "SPECIES H H2 END\nTHERMO\n300 1000 5000\nEND\nREACTIONS\nEND";
/// let err = load_chemkin_str("tiny", chem, "", None).unwrap_err();
/// assert!(err.to_string().contains("no thermodynamic data for species 'H'"));
/// ```
pub mod mechanism_loader;
pub mod species;
pub mod species_dictionary;
pub mod transport;
pub mod transport_parser;

#[cfg(test)]
pub mod fixtures;
