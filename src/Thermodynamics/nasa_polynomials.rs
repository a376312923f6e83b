//! # NASA 7-coefficient polynomials
//!
//! cp/R = a1 + a2 T + a3 T^2 + a4 T^3 + a5 T^4
//!
//! h/RT = a1 + a2 T/2 + a3 T^2/3 + a4 T^3/4 + a5 T^4/5 + a6/T
//!
//! s/R = a1 ln T + a2 T + a3 T^2/2 + a4 T^3/3 + a5 T^4/4 + a7
//!
//! The low-temperature set is used below `t_mid`, the high-temperature set at and above it.
//! Evaluation outside [t_low, t_high] extrapolates the nearest polynomial, which is what
//! reactor codes do in practice; callers that care can check `temperature_range`.
//!
//! The symbolic forms (`Cp_sym`, `dh_sym`, `ds_sym`) sew the two ranges together with a smooth
//! step of width `SMOOTHING_WIDTH` centred at `t_mid`, so the reactor equations stay
//! differentiable for the implicit solver.
use crate::Thermodynamics::thermo_model::{R, smooth_step};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use serde::{Deserialize, Serialize};

/// sum of c T^p over the nonzero coefficients
fn power_series(terms: &[(f64, f64)], T: &Expr) -> Expr {
    let mut sum = Expr::Const(0.0);
    for (c, p) in terms.iter().filter(|(c, _)| *c != 0.0) {
        sum += if *p == 0.0 {
            Expr::Const(*c)
        } else if *p == 1.0 {
            Expr::Const(*c) * T.clone()
        } else {
            Expr::Const(*c) * T.clone().pow(Expr::Const(*p))
        };
    }
    sum
}

fn cp_sym(a: &[f64; 7], T: &Expr) -> Expr {
    Expr::Const(R) * power_series(&[(a[0], 0.0), (a[1], 1.0), (a[2], 2.0), (a[3], 3.0), (a[4], 4.0)], T)
}

fn dh_sym(a: &[f64; 7], T: &Expr) -> Expr {
    let terms = [
        (a[5], 0.0),
        (a[0], 1.0),
        (a[1] / 2.0, 2.0),
        (a[2] / 3.0, 3.0),
        (a[3] / 4.0, 4.0),
        (a[4] / 5.0, 5.0),
    ];
    Expr::Const(R) * power_series(&terms, T)
}

fn ds_sym(a: &[f64; 7], T: &Expr) -> Expr {
    let terms = [
        (a[6], 0.0),
        (a[1], 1.0),
        (a[2] / 2.0, 2.0),
        (a[3] / 3.0, 3.0),
        (a[4] / 4.0, 4.0),
    ];
    Expr::Const(R) * (Expr::Const(a[0]) * Expr::ln(T.clone()) + power_series(&terms, T))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nasa7 {
    pub t_low: f64,
    pub t_mid: f64,
    pub t_high: f64,
    pub low: [f64; 7],
    pub high: [f64; 7],
}

impl Nasa7 {
    pub fn new(t_low: f64, t_mid: f64, t_high: f64, low: [f64; 7], high: [f64; 7]) -> Self {
        Nasa7 {
            t_low,
            t_mid,
            t_high,
            low,
            high,
        }
    }

    /// the same coefficient set on both ranges: constant cp/R = a1, h = R (a1 T + a6), s = R (a1 ln T + a7)
    pub fn constant_cp(a1: f64, a6: f64, a7: f64) -> Self {
        let a = [a1, 0.0, 0.0, 0.0, 0.0, a6, a7];
        Nasa7::new(200.0, 1000.0, 6000.0, a, a)
    }

    pub fn coefficients(&self, T: f64) -> &[f64; 7] {
        if T < self.t_mid { &self.low } else { &self.high }
    }

    pub fn cp_R(&self, T: f64) -> f64 {
        let a = self.coefficients(T);
        a[0] + T * (a[1] + T * (a[2] + T * (a[3] + T * a[4])))
    }

    pub fn h_RT(&self, T: f64) -> f64 {
        let a = self.coefficients(T);
        a[0] + T * (a[1] / 2.0 + T * (a[2] / 3.0 + T * (a[3] / 4.0 + T * a[4] / 5.0))) + a[5] / T
    }

    pub fn s_R(&self, T: f64) -> f64 {
        let a = self.coefficients(T);
        a[0] * T.ln() + T * (a[1] + T * (a[2] / 2.0 + T * (a[3] / 3.0 + T * a[4] / 4.0))) + a[6]
    }

    pub fn g_RT(&self, T: f64) -> f64 {
        self.h_RT(T) - self.s_R(T)
    }

    /// J/mol/K
    pub fn Cp(&self, T: f64) -> f64 {
        R * self.cp_R(T)
    }

    /// J/mol
    pub fn dh(&self, T: f64) -> f64 {
        R * T * self.h_RT(T)
    }

    /// J/mol/K
    pub fn ds(&self, T: f64) -> f64 {
        R * self.s_R(T)
    }

    fn sewn(&self, T: &Expr, part: fn(&[f64; 7], &Expr) -> Expr) -> Expr {
        let low = part(&self.low, T);
        if self.low == self.high {
            return low;
        }
        let high = part(&self.high, T);
        low.clone() + (high - low) * smooth_step(T.clone() - Expr::Const(self.t_mid))
    }

    /// J/mol/K
    pub fn Cp_sym(&self, T: &Expr) -> Expr {
        self.sewn(T, cp_sym)
    }

    /// J/mol
    pub fn dh_sym(&self, T: &Expr) -> Expr {
        self.sewn(T, dh_sym)
    }

    /// J/mol/K
    pub fn ds_sym(&self, T: &Expr) -> Expr {
        self.sewn(T, ds_sym)
    }

    /// new polynomial whose enthalpy is shifted by `delta_h` (J/mol) at every temperature
    pub fn shifted_enthalpy(&self, delta_h: f64) -> Nasa7 {
        let mut shifted = self.clone();
        shifted.low[5] += delta_h / R;
        shifted.high[5] += delta_h / R;
        shifted
    }

    /// new polynomial whose entropy is shifted by `delta_s` (J/mol/K) at every temperature
    pub fn shifted_entropy(&self, delta_s: f64) -> Nasa7 {
        let mut shifted = self.clone();
        shifted.low[6] += delta_s / R;
        shifted.high[6] += delta_s / R;
        shifted
    }
}
