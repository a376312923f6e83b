//! # Species thermodynamic model
//!
//! `ThermoModel` is the closed set of thermodynamic representations a species of a mechanism can
//! carry. All of them answer the same questions through the `ThermoCalculator` trait (heat
//! capacity, enthalpy and entropy as functions of temperature, all per mole and in SI units);
//! the dispatch from the enum to the concrete representation is generated by `enum_dispatch`.
//!
//! Changing thermochemistry never mutates a model in place. The update commands
//! (`with_enthalpy_offset`, `with_entropy_offset`) take the current model and a delta and return
//! a new model, so a species held by the mechanism and a copy held by a simulation never alias.
use crate::Thermodynamics::nasa_polynomials::Nasa7;
use crate::Thermodynamics::thermo_data::ThermoData;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// universal gas constant, J/mol/K
pub const R: f64 = 8.314462618;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThermoError {
    #[error("invalid heat capacity table: {0}")]
    InvalidTable(String),
    #[error("invalid NASA polynomial: {0}")]
    InvalidPolynomial(String),
}

/// K, width over which piecewise thermochemistry is smoothed in symbolic form
pub const SMOOTHING_WIDTH: f64 = 1e-3;

/// smooth version of the unit step, (1 + x/sqrt(x² + ε²))/2
pub fn smooth_step(x: Expr) -> Expr {
    let eps2 = Expr::Const(SMOOTHING_WIDTH * SMOOTHING_WIDTH);
    let root = (x.clone().pow(Expr::Const(2.0)) + eps2).pow(Expr::Const(0.5));
    Expr::Const(0.5) * (Expr::Const(1.0) + x / root)
}

/// smooth version of max(0, x), (x + sqrt(x² + ε²))/2
pub fn smooth_ramp(x: Expr) -> Expr {
    let eps2 = Expr::Const(SMOOTHING_WIDTH * SMOOTHING_WIDTH);
    let root = (x.clone().pow(Expr::Const(2.0)) + eps2).pow(Expr::Const(0.5));
    Expr::Const(0.5) * (x + root)
}

#[enum_dispatch]
pub trait ThermoCalculator {
    /// heat capacity at constant pressure, J/mol/K
    fn heat_capacity(&self, T: f64) -> f64;
    /// enthalpy including the enthalpy of formation, J/mol
    fn enthalpy(&self, T: f64) -> f64;
    /// standard entropy at the reference pressure, J/mol/K
    fn entropy(&self, T: f64) -> f64;
    /// temperatures between which the data are fitted, K
    fn temperature_range(&self) -> (f64, f64);
    /// standard Gibbs energy, J/mol
    fn gibbs_energy(&self, T: f64) -> f64 {
        self.enthalpy(T) - T * self.entropy(T)
    }
    /// symbolic heat capacity as a function of the expression `T`
    fn Cp_sym(&self, T: &Expr) -> Expr;
    fn dh_sym(&self, T: &Expr) -> Expr;
    fn ds_sym(&self, T: &Expr) -> Expr;
    fn dG_sym(&self, T: &Expr) -> Expr {
        self.dh_sym(T) - T.clone() * self.ds_sym(T)
    }
}

impl ThermoCalculator for Nasa7 {
    fn Cp_sym(&self, T: &Expr) -> Expr {
        Nasa7::Cp_sym(self, T)
    }
    fn dh_sym(&self, T: &Expr) -> Expr {
        Nasa7::dh_sym(self, T)
    }
    fn ds_sym(&self, T: &Expr) -> Expr {
        Nasa7::ds_sym(self, T)
    }
    fn heat_capacity(&self, T: f64) -> f64 {
        self.Cp(T)
    }
    fn enthalpy(&self, T: f64) -> f64 {
        self.dh(T)
    }
    fn entropy(&self, T: f64) -> f64 {
        self.ds(T)
    }
    fn temperature_range(&self) -> (f64, f64) {
        (self.t_low, self.t_high)
    }
}

impl ThermoCalculator for ThermoData {
    fn Cp_sym(&self, T: &Expr) -> Expr {
        ThermoData::Cp_sym(self, T)
    }
    fn dh_sym(&self, T: &Expr) -> Expr {
        ThermoData::dh_sym(self, T)
    }
    fn ds_sym(&self, T: &Expr) -> Expr {
        ThermoData::ds_sym(self, T)
    }
    fn heat_capacity(&self, T: f64) -> f64 {
        self.Cp(T)
    }
    fn enthalpy(&self, T: f64) -> f64 {
        self.dh(T)
    }
    fn entropy(&self, T: f64) -> f64 {
        self.ds(T)
    }
    fn temperature_range(&self) -> (f64, f64) {
        ThermoData::temperature_range(self)
    }
}

#[enum_dispatch(ThermoCalculator)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThermoModel {
    Nasa7(Nasa7),
    ThermoData(ThermoData),
}

impl ThermoModel {
    /// new model with the enthalpy raised by `delta_h` J/mol at every temperature
    pub fn with_enthalpy_offset(&self, delta_h: f64) -> ThermoModel {
        match self {
            ThermoModel::Nasa7(nasa) => ThermoModel::Nasa7(nasa.shifted_enthalpy(delta_h)),
            ThermoModel::ThermoData(data) => {
                let mut shifted = data.clone();
                shifted.H298 += delta_h;
                ThermoModel::ThermoData(shifted)
            }
        }
    }

    /// new model with the entropy raised by `delta_s` J/mol/K at every temperature
    pub fn with_entropy_offset(&self, delta_s: f64) -> ThermoModel {
        match self {
            ThermoModel::Nasa7(nasa) => ThermoModel::Nasa7(nasa.shifted_entropy(delta_s)),
            ThermoModel::ThermoData(data) => {
                let mut shifted = data.clone();
                shifted.S298 += delta_s;
                ThermoModel::ThermoData(shifted)
            }
        }
    }

    /// dimensionless standard Gibbs energy g/RT, the quantity equilibrium constants are built from
    pub fn g_RT(&self, T: f64) -> f64 {
        self.gibbs_energy(T) / (R * T)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ThermoModel::Nasa7(_) => "NASA7",
            ThermoModel::ThermoData(_) => "ThermoData",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thermodynamics::thermo_data::T_REF;
    use approx::assert_relative_eq;

    fn models() -> Vec<ThermoModel> {
        vec![
            ThermoModel::from(Nasa7::constant_cp(4.0, -1200.0, 3.0)),
            ThermoModel::from(
                ThermoData::from_cal(
                    vec![300.0, 400.0, 500.0, 600.0, 800.0, 1000.0, 1500.0],
                    vec![1.50, 2.58, 3.40, 4.00, 4.73, 5.13, 5.57],
                    -11.26,
                    0.44,
                )
                .unwrap(),
            ),
        ]
    }

    #[test]
    fn test_dispatch() {
        let models = models();
        assert_relative_eq!(models[0].heat_capacity(1000.0), 4.0 * R);
        assert_relative_eq!(models[0].enthalpy(1000.0), R * (4000.0 - 1200.0), epsilon = 1e-9);
        assert_relative_eq!(models[1].enthalpy(T_REF), -11.26 * 4184.0, epsilon = 1e-9);
        assert_eq!(models[0].temperature_range(), (200.0, 6000.0));
        assert_eq!(models[1].temperature_range(), (300.0, 1500.0));
        assert_eq!(models[1].kind(), "ThermoData");
    }

    #[test]
    fn test_symbolic_gibbs_energy() {
        let T = Expr::Var("T".to_owned());
        for model in models() {
            let G = model.dG_sym(&T).lambdify_owned(vec!["T"]);
            for t in [320.0, 870.0, 1900.0] {
                assert_relative_eq!(G(vec![t]), model.gibbs_energy(t), epsilon = 1e-2);
            }
        }
    }

    #[test]
    fn test_smooth_step_and_ramp() {
        let x = Expr::Var("x".to_owned());
        let step = smooth_step(x.clone()).lambdify_owned(vec!["x"]);
        let ramp = smooth_ramp(x).lambdify_owned(vec!["x"]);
        assert_relative_eq!(step(vec![0.0]), 0.5);
        assert_relative_eq!(step(vec![-10.0]), 0.0, epsilon = 1e-8);
        assert_relative_eq!(step(vec![10.0]), 1.0, epsilon = 1e-8);
        assert_relative_eq!(ramp(vec![-10.0]), 0.0, epsilon = 1e-7);
        assert_relative_eq!(ramp(vec![25.0]), 25.0, epsilon = 1e-7);
    }

    #[test]
    fn test_offsets_are_pure_and_uniform() {
        for model in models() {
            let before = model.clone();
            let hot = model.with_enthalpy_offset(-2500.0);
            let ordered = model.with_entropy_offset(4.0);
            assert_eq!(model, before);
            for T in [350.0, 900.0, 1800.0] {
                assert_relative_eq!(hot.enthalpy(T) - model.enthalpy(T), -2500.0, epsilon = 1e-8);
                assert_relative_eq!(hot.entropy(T), model.entropy(T), epsilon = 1e-12);
                assert_relative_eq!(ordered.entropy(T) - model.entropy(T), 4.0, epsilon = 1e-10);
                assert_relative_eq!(
                    ordered.gibbs_energy(T) - model.gibbs_energy(T),
                    -4.0 * T,
                    epsilon = 1e-7
                );
            }
        }
    }
}
