//! Lennard-Jones transport parameters of a species, as written in Chemkin transport files, and the
//! pure-species viscosity that follows from them.
// Hirschfelder. The Molecular Theory of Gases and Liquids
// Гиршфельдер. Молекулярная теория газов и жидкостей
use serde::{Deserialize, Serialize};

const K_B: f64 = 1.380649e-23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry {
    Atom,
    Linear,
    Nonlinear,
}

impl Geometry {
    /// Chemkin index: 0 atom, 1 linear, 2 nonlinear
    pub fn from_index(index: u8) -> Option<Geometry> {
        match index {
            0 => Some(Geometry::Atom),
            1 => Some(Geometry::Linear),
            2 => Some(Geometry::Nonlinear),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Geometry::Atom => 0,
            Geometry::Linear => 1,
            Geometry::Nonlinear => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportData {
    pub geometry: Geometry,
    /// Lennard-Jones well depth ε/k_B, K
    pub well_depth: f64,
    /// Lennard-Jones collision diameter, Å
    pub diameter: f64,
    /// dipole moment, Debye
    pub dipole: f64,
    /// polarizability, Å^3
    pub polarizability: f64,
    /// number of rotational relaxation collisions at 298 K
    pub rot_relax: f64,
}

impl TransportData {
    /// reduced dipole moment δ
    fn delta(&self) -> f64 {
        1e-19 * self.dipole.powi(2) / (2.0 * self.well_depth * K_B * self.diameter.powi(3))
    }

    /// collision integral Ω(2,2)* (Neufeld fit with the Stockmayer correction)
    pub fn omega_22(&self, T: f64) -> f64 {
        let T1 = T / self.well_depth;
        let (a1, b1, c1, d1, e1, f1) = (1.16145, 0.14874, 0.52487, 0.77320, 2.16178, 2.43787);
        a1 / T1.powf(b1) + c1 / (d1 * T1).exp() + e1 / (f1 * T1).exp() + 0.2 * self.delta().powi(2) / T1
    }

    /// Chapman-Enskog viscosity, Pa s; `M` in kg/mol
    pub fn viscosity(&self, T: f64, M: f64) -> f64 {
        let M = M * 1000.0;
        1e-7 * 26.69 * (M * T).sqrt() / (self.diameter.powi(2) * self.omega_22(T))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nitrogen_viscosity() {
        let n2 = TransportData {
            geometry: Geometry::Linear,
            well_depth: 97.53,
            diameter: 3.621,
            dipole: 0.0,
            polarizability: 1.76,
            rot_relax: 4.0,
        };
        // measured 1.78e-5 Pa s at 300 K
        assert_relative_eq!(n2.viscosity(300.0, 0.028014), 1.78e-5, max_relative = 0.03);
        assert!(n2.viscosity(1000.0, 0.028014) > n2.viscosity(300.0, 0.028014));
    }

    #[test]
    fn test_geometry_index() {
        for index in 0..3 {
            assert_eq!(Geometry::from_index(index).unwrap().index(), index);
        }
        assert!(Geometry::from_index(3).is_none());
    }
}
