//! # Zero-dimensional reactor equations
//!
//! The state of every reactor is y = [n_0, …, n_{N-1}, T]: moles of each species in a batch whose
//! initial volume is 1 m3, and the temperature.
//!
//! Constant pressure (V follows from the ideal gas law):
//! ```text
//! V = Σn R T / P,  C = n / V
//! dn_i/dt = ω_i V
//! dT/dt = -Σ h_i dn_i/dt / Σ n_i cp_i
//! ```
//! Constant volume (P follows from the ideal gas law):
//! ```text
//! P = Σn R T / V,  C = n / V
//! dn_i/dt = ω_i V
//! dT/dt = -Σ u_i dn_i/dt / Σ n_i cv_i,   u = h - RT,  cv = cp - R
//! ```
//! The isothermal reactor keeps dT/dt = 0.
//!
//! The equations are symbolic expressions of the variables `N0`, `N1`, … and `T`, in the form
//! `UniversalODESolver` takes them. Pressure-dependent kinetics is evaluated at the initial
//! pressure of the scenario.
use crate::ReactorsIVP::combustion_model::CombustionModel;
use crate::ReactorsIVP::conditions::{ReactorType, Scenario};
use crate::Thermodynamics::thermo_model::R;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use nalgebra::DVector;

/// initial batch volume, m3
pub const V0: f64 = 1.0;

/// name of the conversion variable appended for early termination
pub const CONVERSION: &str = "X";

pub struct ReactorEquations<'a> {
    pub model: &'a CombustionModel,
    pub reactor_type: ReactorType,
    /// Pa; the fixed pressure of constant-pressure reactors
    pub P: f64,
    /// m3; the fixed volume of the constant-volume reactor
    pub V: f64,
}

/// thermodynamic state recovered from a solver state vector
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorState {
    pub T: f64,
    pub P: f64,
    pub V: f64,
    /// mol/m3
    pub concentrations: Vec<f64>,
    pub mole_fractions: Vec<f64>,
}

impl<'a> ReactorEquations<'a> {
    pub fn new(model: &'a CombustionModel, scenario: &Scenario) -> Self {
        ReactorEquations {
            model,
            reactor_type: scenario.reactor_type,
            P: scenario.P,
            V: V0,
        }
    }

    /// moles of every species and the temperature at the start of the scenario
    pub fn initial_state(&self, scenario: &Scenario) -> DVector<f64> {
        let total = scenario.P * V0 / (R * scenario.T);
        let mut y = DVector::zeros(self.model.species_count() + 1);
        for (i, x) in scenario.mole_fractions.iter().enumerate() {
            y[i] = x * total;
        }
        y[self.model.species_count()] = scenario.T;
        y
    }

    pub fn state(&self, y: &DVector<f64>) -> ReactorState {
        let n_species = self.model.species_count();
        let T = y[n_species];
        let moles: Vec<f64> = y.iter().take(n_species).map(|n| n.max(0.0)).collect();
        let total: f64 = moles.iter().sum();
        let (P, V) = if self.reactor_type.is_constant_pressure() {
            (self.P, total * R * T / self.P)
        } else {
            (total * R * T / self.V, self.V)
        };
        let mole_fractions = if total > 0.0 {
            moles.iter().map(|n| n / total).collect()
        } else {
            vec![0.0; n_species]
        };
        ReactorState {
            T,
            P,
            V,
            concentrations: moles.iter().map(|n| n / V).collect(),
            mole_fractions,
        }
    }

    /// names of the state variables, in the order of the state vector
    pub fn unknowns(&self) -> Vec<String> {
        let mut unknowns: Vec<String> = (0..self.model.species_count()).map(|i| format!("N{}", i)).collect();
        unknowns.push("T".to_owned());
        unknowns
    }

    /// right-hand sides dN_i/dt and dT/dt
    pub fn equations(&self) -> Vec<Expr> {
        let n_species = self.model.species_count();
        let T = Expr::Var("T".to_owned());
        let N: Vec<Expr> = (0..n_species).map(|i| Expr::Var(format!("N{}", i))).collect();
        let V = if self.reactor_type.is_constant_pressure() {
            let mut total = Expr::Const(0.0);
            for Ni in &N {
                total += Ni.clone();
            }
            Expr::Const(R / self.P) * total * T.clone()
        } else {
            Expr::Const(self.V)
        };
        let C: Vec<Expr> = N.iter().map(|Ni| Ni.clone() / V.clone()).collect();
        let omega = self.model.net_production_expr(&T, self.P, &C);
        let mut dy: Vec<Expr> = omega.into_iter().map(|w| w * V.clone()).collect();
        if self.reactor_type.is_isothermal() {
            dy.push(Expr::Const(0.0));
            return dy;
        }
        let h = self.model.species_enthalpies_expr(&T);
        let cp = self.model.species_heat_capacities_expr(&T);
        let mut heat_release = Expr::Const(0.0);
        let mut heat_capacity = Expr::Const(0.0);
        for i in 0..n_species {
            if self.reactor_type.is_constant_pressure() {
                heat_release += h[i].clone() * dy[i].clone();
                heat_capacity += N[i].clone() * cp[i].clone();
            } else {
                // u = h - RT, cv = cp - R
                heat_release += (h[i].clone() - Expr::Const(R) * T.clone()) * dy[i].clone();
                heat_capacity += N[i].clone() * (cp[i].clone() - Expr::Const(R));
            }
        }
        dy.push(-heat_release / heat_capacity);
        dy
    }

    /// the equations extended by the conversion X of `species`, dX/dt = -(dN/dt)/N0
    pub fn with_conversion(&self, species: usize, initial_moles: f64) -> (Vec<Expr>, Vec<String>) {
        let mut equations = self.equations();
        let mut unknowns = self.unknowns();
        equations.push(-equations[species].clone() / Expr::Const(initial_moles));
        unknowns.push(CONVERSION.to_owned());
        (equations, unknowns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mechanism::fixtures::{cyclopropane_mechanism, h2o2_mechanism};
    use crate::ReactorsIVP::reactor_solver::rhs_at;
    use approx::assert_relative_eq;

    fn rhs(equations: &ReactorEquations, y: &DVector<f64>) -> DVector<f64> {
        rhs_at(&equations.equations(), &equations.unknowns(), y)
    }

    fn scenario(reactor_type: ReactorType) -> Scenario {
        Scenario {
            index: 0,
            reactor_type,
            T: 1500.0,
            P: 1e5,
            mole_fractions: vec![0.5, 0.5, 0.0],
            composition_index: 0,
            duration: 1e-3,
        }
    }

    #[test]
    fn test_initial_state_and_ideal_gas() {
        let mechanism = cyclopropane_mechanism();
        let model = CombustionModel::build(&mechanism.species, &mechanism.reactions);
        let s = scenario(ReactorType::IdealGasConstPressureReactor);
        let equations = ReactorEquations::new(&model, &s);
        let y = equations.initial_state(&s);
        assert_eq!(y.len(), equations.unknowns().len());
        assert_eq!(equations.unknowns(), vec!["N0", "N1", "N2", "T"]);
        let state = equations.state(&y);
        assert_relative_eq!(state.V, V0, max_relative = 1e-12);
        assert_relative_eq!(state.P, 1e5);
        assert_relative_eq!(state.mole_fractions[1], 0.5, max_relative = 1e-12);
        assert_relative_eq!(state.concentrations[1], 0.5 * 1e5 / (R * 1500.0), max_relative = 1e-12);
    }

    #[test]
    fn test_isomerisation_conserves_moles_and_energy() {
        let mechanism = cyclopropane_mechanism();
        let model = CombustionModel::build(&mechanism.species, &mechanism.reactions);
        for reactor_type in [ReactorType::IdealGasConstPressureReactor, ReactorType::IdealGasReactor] {
            let s = scenario(reactor_type);
            let equations = ReactorEquations::new(&model, &s);
            let y = equations.initial_state(&s);
            let dy = rhs(&equations, &y);
            assert!(dy[1] < 0.0);
            assert_relative_eq!(dy[1] + dy[2], 0.0, epsilon = 1e-12 * dy[1].abs());
            // cC3H6 -> C3H6 releases heat
            assert!(dy[3] > 0.0);
            let h = model.species_enthalpies(1500.0);
            let cp = model.species_heat_capacities(1500.0);
            if reactor_type.is_constant_pressure() {
                let C_total: f64 = (0..3).map(|i| y[i] * cp[i]).sum();
                let dH: f64 = (0..3).map(|i| h[i] * dy[i]).sum::<f64>() + C_total * dy[3];
                assert!(dH.abs() < 1e-6 * (h[1] * dy[1]).abs());
            }
        }
        let s = scenario(ReactorType::IdealGasConstPressureTemperatureReactor);
        let equations = ReactorEquations::new(&model, &s);
        let dy = rhs(&equations, &equations.initial_state(&s));
        assert_eq!(dy[3], 0.0);
    }

    #[test]
    fn test_species_equations_follow_production_rates() {
        let mechanism = h2o2_mechanism();
        let model = CombustionModel::build(&mechanism.species, &mechanism.reactions);
        let n = model.species_count();
        let mut s = scenario(ReactorType::IdealGasReactor);
        s.T = 1600.0;
        s.mole_fractions = (0..n).map(|i| (i + 1) as f64).collect();
        let total: f64 = s.mole_fractions.iter().sum();
        s.mole_fractions.iter_mut().for_each(|x| *x /= total);
        let equations = ReactorEquations::new(&model, &s);
        let y = equations.initial_state(&s);
        let state = equations.state(&y);
        let omega = model.net_production_rates(state.T, state.P, &state.concentrations);
        let dy = rhs(&equations, &y);
        for i in 0..n {
            assert_relative_eq!(dy[i], omega[i] * state.V, epsilon = 1e-9, max_relative = 1e-5);
        }
        assert!(dy[n].is_finite());
    }

    #[test]
    fn test_conversion_variable() {
        let mechanism = cyclopropane_mechanism();
        let model = CombustionModel::build(&mechanism.species, &mechanism.reactions);
        let s = scenario(ReactorType::IdealGasConstPressureTemperatureReactor);
        let equations = ReactorEquations::new(&model, &s);
        let mut y = equations.initial_state(&s);
        let n0 = y[1];
        let (system, unknowns) = equations.with_conversion(1, n0);
        assert_eq!(unknowns.last().map(|u| u.as_str()), Some(CONVERSION));
        y = y.push(0.0);
        let dy = rhs_at(&system, &unknowns, &y);
        assert_relative_eq!(dy[4], -dy[1] / n0, max_relative = 1e-12);
        assert!(dy[4] > 0.0);
    }
}
