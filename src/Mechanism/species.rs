//! A species of a mechanism: its label as written in the mechanism file, its position in the
//! species list, its molecular structure from the species dictionary and its thermodynamic and
//! transport data.
use crate::Mechanism::transport::TransportData;
use crate::Molecule::molecule_graph::Molecule;
use crate::Thermodynamics::thermo_model::ThermoModel;

#[derive(Debug, Clone)]
pub struct Species {
    pub label: String,
    pub index: usize,
    pub structure: Molecule,
    pub thermo: ThermoModel,
    pub transport: Option<TransportData>,
}

impl Species {
    pub fn new(label: &str, index: usize, structure: Molecule, thermo: ThermoModel) -> Self {
        Species {
            label: label.to_string(),
            index,
            structure,
            thermo,
            transport: None,
        }
    }

    /// copy of the species carrying other thermodynamic data
    pub fn with_thermo(&self, thermo: ThermoModel) -> Species {
        Species {
            thermo,
            ..self.clone()
        }
    }

    /// kg/mol
    pub fn molecular_weight(&self) -> f64 {
        self.structure.molecular_weight()
    }
}
