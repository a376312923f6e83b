//! # Rate constant functions
//!
//! The kinetics of every reaction of a mechanism is one of four forms:
//!  - elementary: modified Arrhenius k = A (T/T0)^n exp(-Ea/RT)
//!  - three-body: Arrhenius multiplied by the effective third body concentration [M]
//!  - falloff: Lindemann or Troe blending between the low- and high-pressure limits
//!  - pressure (PLOG): Arrhenius sets tabulated at several pressures, ln k interpolated in ln P
//!
//! All parameters are stored in SI units (m, mol, s, J/mol, Pa). `K_const` returns the effective
//! rate constant that multiplies the product of reactant concentrations, so for three-body and
//! falloff reactions the third body concentration is already folded in.
//!
//! `K_expr` builds the same rate constant as a symbolic expression of the temperature, which is
//! what the reactor equations hand to the IVP solver.
//!
//! Every update of the kinetic parameters goes through functions that return a new value
//! (`with_scaled_prefactor`, `with_prefactor`) instead of writing into shared data.
use crate::Thermodynamics::thermo_model::R;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KineticsError {
    #[error("{0} kinetics has no single prefactor")]
    NoSinglePrefactor(&'static str),
    #[error("prefactor must be finite and non-negative, got {0}")]
    InvalidPrefactor(f64),
    #[error("invalid PLOG table: {0}")]
    InvalidPressureTable(String),
}

/// kind of rate constant function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionType {
    Elem,
    ThreeBody,
    Falloff,
    Pressure,
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ReactionType::Elem => "elementary",
            ReactionType::ThreeBody => "three-body",
            ReactionType::Falloff => "falloff",
            ReactionType::Pressure => "pressure",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrhenius {
    /// prefactor in SI units of the reaction order
    pub A: f64,
    pub n: f64,
    /// activation energy, J/mol
    pub Ea: f64,
    /// reference temperature, K
    pub T0: f64,
}

impl Arrhenius {
    pub fn new(A: f64, n: f64, Ea: f64) -> Self {
        Arrhenius { A, n, Ea, T0: 1.0 }
    }

    pub fn with_T0(mut self, T0: f64) -> Self {
        self.T0 = T0;
        self
    }

    pub fn K_const(&self, T: f64) -> f64 {
        self.A * (T / self.T0).powf(self.n) * f64::exp(-self.Ea / (R * T))
    }

    pub fn K_expr(&self, T: Expr) -> Expr {
        let A = Expr::Const(self.A);
        let Ea = Expr::Const(self.Ea);
        let k0 = if self.n == 0.0 {
            A
        } else {
            A * (T.clone() / Expr::Const(self.T0)).pow(Expr::Const(self.n))
        };
        if self.Ea == 0.0 {
            return k0;
        }
        k0 * (-Ea / (Expr::Const(R) * T)).exp()
    }

    pub fn scaled(&self, factor: f64) -> Arrhenius {
        Arrhenius {
            A: self.A * factor,
            ..self.clone()
        }
    }
}

#[enum_dispatch]
pub trait RateCoefficient {
    /// effective rate constant at temperature `T` (K), pressure `P` (Pa) and third body
    /// concentration `M` (mol/m3); `M` is ignored by kinetics without a third body
    fn K_const(&self, T: f64, P: f64, M: f64) -> f64;
    /// the same rate constant as an expression of the temperature `T` and the third body
    /// concentration `M`; pressure-dependent tables are evaluated at the fixed pressure `P`
    fn K_expr(&self, T: Expr, P: f64, M: Expr) -> Expr;
    fn reaction_type(&self) -> ReactionType;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementaryStruct {
    pub arrhenius: Arrhenius,
}

impl RateCoefficient for ElementaryStruct {
    fn K_const(&self, T: f64, _P: f64, _M: f64) -> f64 {
        self.arrhenius.K_const(T)
    }
    fn K_expr(&self, T: Expr, _P: f64, _M: Expr) -> Expr {
        self.arrhenius.K_expr(T)
    }
    fn reaction_type(&self) -> ReactionType {
        ReactionType::Elem
    }
}

/// collision efficiencies by species index; species not listed collide with `default_efficiency`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Efficiencies {
    pub efficiencies: BTreeMap<usize, f64>,
    pub default_efficiency: f64,
}

impl Default for Efficiencies {
    fn default() -> Self {
        Efficiencies {
            efficiencies: BTreeMap::new(),
            default_efficiency: 1.0,
        }
    }
}

impl Efficiencies {
    /// a single species acts as the collider, e.g. `(+AR)`
    pub fn single_collider(species: usize) -> Self {
        Efficiencies {
            efficiencies: BTreeMap::from([(species, 1.0)]),
            default_efficiency: 0.0,
        }
    }

    pub fn is_single_collider(&self) -> Option<usize> {
        if self.default_efficiency == 0.0 && self.efficiencies.len() == 1 {
            self.efficiencies
                .iter()
                .next()
                .filter(|(_, eff)| **eff == 1.0)
                .map(|(species, _)| *species)
        } else {
            None
        }
    }

    /// [M] = Σ eff_i C_i
    pub fn third_body_concentration(&self, concentrations: &[f64]) -> f64 {
        concentrations
            .iter()
            .enumerate()
            .map(|(i, C)| {
                self.efficiencies
                    .get(&i)
                    .copied()
                    .unwrap_or(self.default_efficiency)
                    * C
            })
            .sum()
    }

    pub fn third_body_expr(&self, concentrations: &[Expr]) -> Expr {
        let mut M = Expr::Const(0.0);
        for (i, C) in concentrations.iter().enumerate() {
            let eff = self.efficiencies.get(&i).copied().unwrap_or(self.default_efficiency);
            if eff == 1.0 {
                M += C.clone();
            } else if eff != 0.0 {
                M += Expr::Const(eff) * C.clone();
            }
        }
        M
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeBodyStruct {
    pub arrhenius: Arrhenius,
    pub eff: Efficiencies,
}

impl RateCoefficient for ThreeBodyStruct {
    fn K_const(&self, T: f64, _P: f64, M: f64) -> f64 {
        self.arrhenius.K_const(T) * M
    }
    fn K_expr(&self, T: Expr, _P: f64, M: Expr) -> Expr {
        self.arrhenius.K_expr(T) * M
    }
    fn reaction_type(&self) -> ReactionType {
        ReactionType::ThreeBody
    }
}

/// Troe blending parameters; `T2` is optional in Chemkin files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Troe {
    pub alpha: f64,
    pub T3: f64,
    pub T1: f64,
    pub T2: Option<f64>,
}

impl Troe {
    pub fn F_cent(&self, T: f64) -> f64 {
        let mut F_c = (1.0 - self.alpha) * f64::exp(-T / self.T3) + self.alpha * f64::exp(-T / self.T1);
        if let Some(T2) = self.T2 {
            F_c += f64::exp(-T2 / T);
        }
        F_c
    }

    /// broadening factor F for reduced pressure `P_r`
    pub fn F(&self, T: f64, P_r: f64) -> f64 {
        let F_c = self.F_cent(T).max(1e-300);
        let log_F_c = F_c.log10();
        let C = -0.4 - 0.67 * log_F_c;
        let N = 0.75 - 1.27 * log_F_c;
        let log_P_r = P_r.max(1e-300).log10();
        let f_1 = (log_P_r + C) / (N - 0.14 * (log_P_r + C));
        10f64.powf(log_F_c / (1.0 + f_1 * f_1))
    }

    pub fn F_cent_expr(&self, T: Expr) -> Expr {
        let alpha = Expr::Const(self.alpha);
        let mut F_c = (Expr::Const(1.0) - alpha.clone()) * (-T.clone() / Expr::Const(self.T3)).exp()
            + alpha * (-T.clone() / Expr::Const(self.T1)).exp();
        if let Some(T2) = self.T2 {
            F_c += (-Expr::Const(T2) / T).exp();
        }
        F_c
    }

    pub fn F_expr(&self, T: Expr, P_r: Expr) -> Expr {
        let log_F_c = self.F_cent_expr(T).log10();
        let C = Expr::Const(-0.4) - Expr::Const(0.67) * log_F_c.clone();
        let N = Expr::Const(0.75) - Expr::Const(1.27) * log_F_c.clone();
        // keeps the logarithm finite when [M] = 0
        let log_P_r = (P_r + Expr::Const(1e-300)).log10();
        let f_1 = (log_P_r.clone() + C.clone()) / (N - Expr::Const(0.14) * (log_P_r + C));
        Expr::Const(10.0).pow(log_F_c / (Expr::Const(1.0) + f_1.pow(Expr::Const(2.0))))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalloffStruct {
    pub high_rate: Arrhenius,
    pub low_rate: Arrhenius,
    pub troe: Option<Troe>,
    pub eff: Efficiencies,
}

impl RateCoefficient for FalloffStruct {
    fn K_const(&self, T: f64, _P: f64, M: f64) -> f64 {
        let K_inf = self.high_rate.K_const(T);
        let K0 = self.low_rate.K_const(T);
        if K_inf <= 0.0 {
            return 0.0;
        }
        let P_r = K0 * M / K_inf;
        if P_r <= 0.0 {
            return 0.0;
        }
        let F = match &self.troe {
            Some(troe) => troe.F(T, P_r),
            None => 1.0,
        };
        K_inf * (P_r / (1.0 + P_r)) * F
    }
    fn K_expr(&self, T: Expr, _P: f64, M: Expr) -> Expr {
        let K_inf = self.high_rate.K_expr(T.clone());
        let K0 = self.low_rate.K_expr(T.clone());
        let P_r = K0 * M / K_inf.clone();
        let lindemann = K_inf * (P_r.clone() / (Expr::Const(1.0) + P_r.clone()));
        match &self.troe {
            Some(troe) => lindemann * troe.F_expr(T, P_r),
            None => lindemann,
        }
    }
    fn reaction_type(&self) -> ReactionType {
        ReactionType::Falloff
    }
}

/// PLOG table: pressures (Pa) in increasing order, each with one or more Arrhenius sets whose
/// rate constants are summed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureStruct {
    pub rates: Vec<(f64, Vec<Arrhenius>)>,
}

impl PressureStruct {
    /// groups entries with equal pressures and sorts the table
    pub fn new(entries: Vec<(f64, Arrhenius)>) -> Result<Self, KineticsError> {
        if entries.is_empty() {
            return Err(KineticsError::InvalidPressureTable("no entries".to_string()));
        }
        let mut rates: Vec<(f64, Vec<Arrhenius>)> = Vec::new();
        for (P, arrhenius) in entries {
            if !(P > 0.0) || !P.is_finite() {
                return Err(KineticsError::InvalidPressureTable(format!(
                    "non-positive pressure {}",
                    P
                )));
            }
            match rates.iter_mut().find(|(p, _)| (*p - P).abs() <= 1e-12 * P) {
                Some((_, list)) => list.push(arrhenius),
                None => rates.push((P, vec![arrhenius])),
            }
        }
        rates.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(PressureStruct { rates })
    }

    fn k_at(&self, i: usize, T: f64) -> f64 {
        self.rates[i].1.iter().map(|a| a.K_const(T)).sum()
    }

    fn k_expr_at(&self, i: usize, T: Expr) -> Expr {
        let mut list = self.rates[i].1.iter();
        let mut k = match list.next() {
            Some(first) => first.K_expr(T.clone()),
            None => Expr::Const(0.0),
        };
        for arrhenius in list {
            k += arrhenius.K_expr(T.clone());
        }
        k
    }
}

impl RateCoefficient for PressureStruct {
    fn K_const(&self, T: f64, P: f64, _M: f64) -> f64 {
        let last = self.rates.len() - 1;
        if P <= self.rates[0].0 {
            return self.k_at(0, T);
        }
        if P >= self.rates[last].0 {
            return self.k_at(last, T);
        }
        let i = self.rates.partition_point(|(p, _)| *p <= P) - 1;
        let (P1, P2) = (self.rates[i].0, self.rates[i + 1].0);
        let (k1, k2) = (self.k_at(i, T), self.k_at(i + 1, T));
        if k1 <= 0.0 || k2 <= 0.0 {
            // logarithms undefined, fall back to linear interpolation
            return k1 + (k2 - k1) * (P - P1) / (P2 - P1);
        }
        let w = (P.ln() - P1.ln()) / (P2.ln() - P1.ln());
        f64::exp(k1.ln() + w * (k2.ln() - k1.ln()))
    }
    fn K_expr(&self, T: Expr, P: f64, _M: Expr) -> Expr {
        let last = self.rates.len() - 1;
        if P <= self.rates[0].0 {
            return self.k_expr_at(0, T);
        }
        if P >= self.rates[last].0 {
            return self.k_expr_at(last, T);
        }
        let i = self.rates.partition_point(|(p, _)| *p <= P) - 1;
        let (P1, P2) = (self.rates[i].0, self.rates[i + 1].0);
        let w = (P.ln() - P1.ln()) / (P2.ln() - P1.ln());
        // ln k = (1 - w) ln k1 + w ln k2
        self.k_expr_at(i, T.clone()).pow(Expr::Const(1.0 - w)) * self.k_expr_at(i + 1, T).pow(Expr::Const(w))
    }
    fn reaction_type(&self) -> ReactionType {
        ReactionType::Pressure
    }
}

/// kinetics of one reaction
#[enum_dispatch(RateCoefficient)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReactionKinetics {
    Elementary(ElementaryStruct),
    ThreeBody(ThreeBodyStruct),
    Falloff(FalloffStruct),
    Pressure(PressureStruct),
}

impl ReactionKinetics {
    pub fn elementary(arrhenius: Arrhenius) -> Self {
        ReactionKinetics::Elementary(ElementaryStruct { arrhenius })
    }

    /// collision efficiencies when the reaction needs a third body
    pub fn efficiencies(&self) -> Option<&Efficiencies> {
        match self {
            ReactionKinetics::ThreeBody(data) => Some(&data.eff),
            ReactionKinetics::Falloff(data) => Some(&data.eff),
            _ => None,
        }
    }

    pub fn third_body_concentration(&self, concentrations: &[f64]) -> f64 {
        self.efficiencies()
            .map(|eff| eff.third_body_concentration(concentrations))
            .unwrap_or(0.0)
    }

    /// prefactor of the (high-pressure) Arrhenius expression, none for PLOG tables
    pub fn prefactor(&self) -> Option<f64> {
        match self {
            ReactionKinetics::Elementary(data) => Some(data.arrhenius.A),
            ReactionKinetics::ThreeBody(data) => Some(data.arrhenius.A),
            ReactionKinetics::Falloff(data) => Some(data.high_rate.A),
            ReactionKinetics::Pressure(data) => match data.rates.as_slice() {
                [(_, list)] if list.len() == 1 => Some(list[0].A),
                _ => None,
            },
        }
    }

    /// new kinetics whose rate constant is `factor` times the current one at every T and P
    pub fn with_scaled_prefactor(&self, factor: f64) -> Result<ReactionKinetics, KineticsError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(KineticsError::InvalidPrefactor(factor));
        }
        let scaled = match self {
            ReactionKinetics::Elementary(data) => ReactionKinetics::Elementary(ElementaryStruct {
                arrhenius: data.arrhenius.scaled(factor),
            }),
            ReactionKinetics::ThreeBody(data) => ReactionKinetics::ThreeBody(ThreeBodyStruct {
                arrhenius: data.arrhenius.scaled(factor),
                eff: data.eff.clone(),
            }),
            // scaling both limits keeps the reduced pressure, so the whole curve scales
            ReactionKinetics::Falloff(data) => ReactionKinetics::Falloff(FalloffStruct {
                high_rate: data.high_rate.scaled(factor),
                low_rate: data.low_rate.scaled(factor),
                troe: data.troe.clone(),
                eff: data.eff.clone(),
            }),
            ReactionKinetics::Pressure(data) => ReactionKinetics::Pressure(PressureStruct {
                rates: data
                    .rates
                    .iter()
                    .map(|(P, list)| (*P, list.iter().map(|a| a.scaled(factor)).collect()))
                    .collect(),
            }),
        };
        Ok(scaled)
    }

    /// new kinetics with prefactor `A` (SI units); the temperature dependence is kept
    pub fn with_prefactor(&self, A: f64) -> Result<ReactionKinetics, KineticsError> {
        if !A.is_finite() || A < 0.0 {
            return Err(KineticsError::InvalidPrefactor(A));
        }
        let current = self
            .prefactor()
            .ok_or(KineticsError::NoSinglePrefactor("pressure-dependent"))?;
        match self {
            ReactionKinetics::Elementary(data) => Ok(ReactionKinetics::Elementary(ElementaryStruct {
                arrhenius: Arrhenius { A, ..data.arrhenius.clone() },
            })),
            ReactionKinetics::ThreeBody(data) => Ok(ReactionKinetics::ThreeBody(ThreeBodyStruct {
                arrhenius: Arrhenius { A, ..data.arrhenius.clone() },
                eff: data.eff.clone(),
            })),
            _ if current > 0.0 => self.with_scaled_prefactor(A / current),
            _ => Err(KineticsError::NoSinglePrefactor("zero-prefactor falloff")),
        }
    }
}
