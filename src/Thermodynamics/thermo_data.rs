//! # Tabulated thermochemistry
//!
//! Mechanism generators estimate the thermochemistry of a species as a short table of heat
//! capacities (typically at 300, 400, 500, 600, 800, 1000 and 1500 K) together with the standard
//! enthalpy and entropy at 298.15 K. Between table points cp is linear in T, outside the table it
//! is held at the nearest tabulated value. Enthalpy and entropy are the exact integrals of that
//! piecewise function:
//!
//! H(T) = H298 + ∫ cp dT,  S(T) = S298 + ∫ cp/T dT   (from 298.15 K to T)
//!
//! For the symbolic forms the piecewise cp is written as a sum of ramps,
//! cp = c0 + Σ Δk max(0, T - tk), where Δk is the change of slope at table point tk. Each ramp
//! integrates in closed form and is smoothed over `SMOOTHING_WIDTH` so that the expressions are
//! differentiable everywhere.
use crate::Thermodynamics::thermo_model::{ThermoError, smooth_ramp};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};

pub const T_REF: f64 = 298.15;
const CAL: f64 = 4.184;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermoData {
    /// K, strictly increasing
    pub Tdata: Vec<f64>,
    /// J/mol/K
    pub Cpdata: Vec<f64>,
    /// J/mol
    pub H298: f64,
    /// J/mol/K
    pub S298: f64,
}

impl ThermoData {
    pub fn new(Tdata: Vec<f64>, Cpdata: Vec<f64>, H298: f64, S298: f64) -> Result<Self, ThermoError> {
        if Tdata.is_empty() || Tdata.len() != Cpdata.len() {
            return Err(ThermoError::InvalidTable(format!(
                "{} temperatures for {} heat capacities",
                Tdata.len(),
                Cpdata.len()
            )));
        }
        if Tdata.windows(2).any(|w| w[1] <= w[0]) || Tdata[0] <= 0.0 {
            return Err(ThermoError::InvalidTable(
                "temperatures must be positive and strictly increasing".to_string(),
            ));
        }
        Ok(ThermoData {
            Tdata,
            Cpdata,
            H298,
            S298,
        })
    }

    /// the units generators usually print: cp and S298 in cal/mol/K, H298 in kcal/mol
    pub fn from_cal(Tdata: Vec<f64>, Cpdata_cal: Vec<f64>, H298_kcal: f64, S298_cal: f64) -> Result<Self, ThermoError> {
        let Cpdata = Cpdata_cal.iter().map(|cp| cp * CAL).collect();
        ThermoData::new(Tdata, Cpdata, H298_kcal * 1000.0 * CAL, S298_cal * CAL)
    }

    pub fn Cp(&self, T: f64) -> f64 {
        let n = self.Tdata.len();
        if T <= self.Tdata[0] {
            return self.Cpdata[0];
        }
        if T >= self.Tdata[n - 1] {
            return self.Cpdata[n - 1];
        }
        let i = self.Tdata.partition_point(|t| *t <= T) - 1;
        let (t1, t2) = (self.Tdata[i], self.Tdata[i + 1]);
        let (c1, c2) = (self.Cpdata[i], self.Cpdata[i + 1]);
        c1 + (c2 - c1) * (T - t1) / (t2 - t1)
    }

    /// ∫ cp dT (or ∫ cp/T dT) from the first table point to `x`
    fn integral_from_start(&self, x: f64, over_T: bool) -> f64 {
        let t0 = self.Tdata[0];
        let c0 = self.Cpdata[0];
        if x <= t0 {
            return if over_T { c0 * (x / t0).ln() } else { c0 * (x - t0) };
        }
        let mut total = 0.0;
        for i in 0..self.Tdata.len() - 1 {
            let (t1, t2) = (self.Tdata[i], self.Tdata[i + 1]);
            if x <= t1 {
                return total;
            }
            let upper = x.min(t2);
            let (c1, c2) = (self.Cpdata[i], self.Cpdata[i + 1]);
            let slope = (c2 - c1) / (t2 - t1);
            total += if over_T {
                (c1 - slope * t1) * (upper / t1).ln() + slope * (upper - t1)
            } else {
                c1 * (upper - t1) + 0.5 * slope * (upper - t1).powi(2)
            };
        }
        let last = self.Tdata.len() - 1;
        let (tn, cn) = (self.Tdata[last], self.Cpdata[last]);
        if x > tn {
            total += if over_T { cn * (x / tn).ln() } else { cn * (x - tn) };
        }
        total
    }

    pub fn dh(&self, T: f64) -> f64 {
        self.H298 + self.integral_from_start(T, false) - self.integral_from_start(T_REF, false)
    }

    pub fn ds(&self, T: f64) -> f64 {
        self.S298 + self.integral_from_start(T, true) - self.integral_from_start(T_REF, true)
    }

    pub fn temperature_range(&self) -> (f64, f64) {
        (self.Tdata[0], self.Tdata[self.Tdata.len() - 1])
    }

    /// (tk, Δk): table points where the slope of cp changes and by how much
    fn slope_changes(&self) -> Vec<(f64, f64)> {
        let n = self.Tdata.len();
        let slope = |k: usize| -> f64 {
            if k + 1 >= n {
                0.0
            } else {
                (self.Cpdata[k + 1] - self.Cpdata[k]) / (self.Tdata[k + 1] - self.Tdata[k])
            }
        };
        let mut previous = 0.0;
        let mut changes = Vec::new();
        for k in 0..n {
            let current = slope(k);
            if current != previous {
                changes.push((self.Tdata[k], current - previous));
            }
            previous = current;
        }
        changes
    }

    pub fn Cp_sym(&self, T: &Expr) -> Expr {
        let mut Cp = Expr::Const(self.Cpdata[0]);
        for (tk, delta) in self.slope_changes() {
            Cp += Expr::Const(delta) * smooth_ramp(T.clone() - Expr::Const(tk));
        }
        Cp
    }

    pub fn dh_sym(&self, T: &Expr) -> Expr {
        let c0 = self.Cpdata[0];
        let mut H = Expr::Const(self.H298 - c0 * T_REF) + Expr::Const(c0) * T.clone();
        for (tk, delta) in self.slope_changes() {
            let ramp = smooth_ramp(T.clone() - Expr::Const(tk));
            let at_ref = (T_REF - tk).max(0.0);
            H += Expr::Const(0.5 * delta) * ramp.pow(Expr::Const(2.0)) - Expr::Const(0.5 * delta * at_ref * at_ref);
        }
        H
    }

    pub fn ds_sym(&self, T: &Expr) -> Expr {
        let c0 = self.Cpdata[0];
        let mut S = Expr::Const(self.S298) + Expr::Const(c0) * Expr::ln(T.clone() / Expr::Const(T_REF));
        for (tk, delta) in self.slope_changes() {
            // ∫ max(0, T - tk)/T dT = r - tk ln(1 + r/tk), r = max(0, T - tk)
            let ramp = smooth_ramp(T.clone() - Expr::Const(tk));
            let g = ramp.clone() - Expr::Const(tk) * Expr::ln(Expr::Const(1.0) + ramp / Expr::Const(tk));
            let r_ref = (T_REF - tk).max(0.0);
            let g_ref = r_ref - tk * (1.0 + r_ref / tk).ln();
            S += Expr::Const(delta) * g - Expr::Const(delta * g_ref);
        }
        S
    }
}
