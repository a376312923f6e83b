//! # Combustion model
//!
//! The compiled form of a mechanism the reactor equations are evaluated against. It is built
//! deterministically from the species and reaction collections and keeps two copies of the
//! thermochemistry:
//!  - `definitions`: what the species currently say; parameter changes are written here
//!  - `active thermo`: the snapshot the rate and energy equations read; it is replaced only when
//!    the model is rebuilt
//!
//! Reaction kinetics has no such snapshot, so a kinetics change is seen by the very next
//! evaluation while a thermochemistry change waits for `rebuilt()`.
//!
//! Rates of progress follow the mass-action law with reverse rates from equilibrium:
//!
//! q = k_f Π C_i^ν'_i - k_r Π C_i^ν''_i,   k_r = k_f / K_c,
//!
//! K_c = exp(-Σ ν_i g_i/RT) (P0/RT)^Δn,  P0 = 1 bar
//!
//! The `*_expr` functions return the same quantities as symbolic expressions of the temperature
//! and of the concentrations; the reactor equations are assembled from them.
use crate::Kinetics::rate_expressions::{Arrhenius, RateCoefficient, ReactionKinetics};
use crate::Kinetics::reaction::Reaction;
use crate::Mechanism::species::Species;
use crate::Thermodynamics::thermo_model::{R, ThermoCalculator, ThermoModel};
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::debug;

/// standard state pressure, Pa
pub const P0: f64 = 1e5;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledReaction {
    pub reactants: Vec<(usize, f64)>,
    pub products: Vec<(usize, f64)>,
    /// net stoichiometric coefficients, products positive
    pub net: Vec<(usize, f64)>,
    pub delta_n: f64,
    pub reversible: bool,
    pub kinetics: ReactionKinetics,
    pub reverse_kinetics: Option<Arrhenius>,
}

impl CompiledReaction {
    fn compile(reaction: &Reaction) -> Self {
        let mut net: Vec<(usize, f64)> = Vec::new();
        for s in reaction.species_indices() {
            if net.iter().all(|(i, _)| *i != s) {
                let nu = reaction.net_coefficient(s);
                if nu != 0.0 {
                    net.push((s, nu));
                }
            }
        }
        CompiledReaction {
            reactants: reaction.reactants.clone(),
            products: reaction.products.clone(),
            net,
            delta_n: reaction.delta_moles(),
            reversible: reaction.reversible,
            kinetics: reaction.kinetics.clone(),
            reverse_kinetics: reaction.reverse_kinetics.clone(),
        }
    }
}

fn mass_action(terms: &[(usize, f64)], C: &[f64]) -> f64 {
    terms
        .iter()
        .map(|(i, nu)| {
            let c = C[*i].max(0.0);
            if *nu == 1.0 { c } else { c.powf(*nu) }
        })
        .product()
}

fn mass_action_expr(terms: &[(usize, f64)], C: &[Expr]) -> Expr {
    let mut product = Expr::Const(1.0);
    for (i, nu) in terms {
        let c = C[*i].clone();
        if nu.fract() == 0.0 && *nu >= 1.0 && *nu <= 4.0 {
            for _ in 0..(*nu as usize) {
                product = product * c.clone();
            }
        } else {
            product = product * c.pow(Expr::Const(*nu));
        }
    }
    product
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombustionModel {
    labels: Vec<String>,
    molecular_weights: Vec<f64>,
    definitions: Vec<ThermoModel>,
    active_thermo: Vec<ThermoModel>,
    reactions: Vec<CompiledReaction>,
}

impl CombustionModel {
    pub fn build(species: &[Species], reactions: &[Reaction]) -> Self {
        let definitions: Vec<ThermoModel> = species.iter().map(|s| s.thermo.clone()).collect();
        let model = CombustionModel {
            labels: species.iter().map(|s| s.label.clone()).collect(),
            molecular_weights: species.iter().map(|s| s.molecular_weight()).collect(),
            active_thermo: definitions.clone(),
            definitions,
            reactions: reactions.iter().map(CompiledReaction::compile).collect(),
        };
        debug!(
            "combustion model built: {} species, {} reactions",
            model.labels.len(),
            model.reactions.len()
        );
        model
    }

    /// new model whose active thermochemistry is the current definitions; kinetics carried over
    pub fn rebuilt(&self) -> Self {
        CombustionModel {
            active_thermo: self.definitions.clone(),
            ..self.clone()
        }
    }

    pub fn species_count(&self) -> usize {
        self.labels.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn species_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// kg/mol
    pub fn molecular_weights(&self) -> &[f64] {
        &self.molecular_weights
    }

    pub fn thermo_definition(&self, species: usize) -> Option<&ThermoModel> {
        self.definitions.get(species)
    }

    pub fn active_thermo(&self, species: usize) -> Option<&ThermoModel> {
        self.active_thermo.get(species)
    }

    pub fn reaction(&self, index: usize) -> Option<&CompiledReaction> {
        self.reactions.get(index)
    }

    /// true while a thermochemistry definition differs from the active snapshot
    pub fn thermo_pending(&self) -> bool {
        self.definitions != self.active_thermo
    }

    pub(crate) fn set_thermo_definition(&mut self, species: usize, thermo: ThermoModel) {
        self.definitions[species] = thermo;
    }

    pub(crate) fn set_reaction_kinetics(&mut self, reaction: usize, kinetics: ReactionKinetics) {
        self.reactions[reaction].kinetics = kinetics;
    }

    /// J/mol for every species
    pub fn species_enthalpies(&self, T: f64) -> Vec<f64> {
        self.active_thermo.iter().map(|t| t.enthalpy(T)).collect()
    }

    /// J/mol/K for every species
    pub fn species_heat_capacities(&self, T: f64) -> Vec<f64> {
        self.active_thermo.iter().map(|t| t.heat_capacity(T)).collect()
    }

    /// molar enthalpy of a mixture with mole fractions `x`, J/mol
    pub fn mixture_enthalpy(&self, T: f64, x: &[f64]) -> f64 {
        self.active_thermo
            .iter()
            .zip(x)
            .map(|(t, xi)| xi * t.enthalpy(T))
            .sum()
    }

    /// molar heat capacity at constant pressure of a mixture, J/mol/K
    pub fn mixture_cp(&self, T: f64, x: &[f64]) -> f64 {
        self.active_thermo
            .iter()
            .zip(x)
            .map(|(t, xi)| xi * t.heat_capacity(T))
            .sum()
    }

    /// equilibrium constant in concentration units (m3/mol)^-Δn
    pub fn equilibrium_constant(&self, reaction: usize, T: f64) -> f64 {
        let r = &self.reactions[reaction];
        let delta_g_RT: f64 = r
            .net
            .iter()
            .map(|(i, nu)| nu * self.active_thermo[*i].g_RT(T))
            .sum();
        f64::exp(-delta_g_RT) * (P0 / (R * T)).powf(r.delta_n)
    }

    /// rates of progress of all reactions, mol/m3/s; `C` in mol/m3
    pub fn rates_of_progress(&self, T: f64, P: f64, C: &[f64]) -> Vec<f64> {
        (0..self.reactions.len())
            .map(|j| {
                let r = &self.reactions[j];
                let M = r.kinetics.third_body_concentration(C);
                let k_f = r.kinetics.K_const(T, P, M);
                let forward = k_f * mass_action(&r.reactants, C);
                if !r.reversible {
                    return forward;
                }
                let k_r = match &r.reverse_kinetics {
                    Some(reverse) => match &r.kinetics {
                        ReactionKinetics::ThreeBody(_) => reverse.K_const(T) * M,
                        _ => reverse.K_const(T),
                    },
                    None => {
                        let K_c = self.equilibrium_constant(j, T);
                        if K_c > 0.0 && K_c.is_finite() { k_f / K_c } else { 0.0 }
                    }
                };
                forward - k_r * mass_action(&r.products, C)
            })
            .collect()
    }

    pub fn species_enthalpies_expr(&self, T: &Expr) -> Vec<Expr> {
        self.active_thermo.iter().map(|t| t.dh_sym(T)).collect()
    }

    pub fn species_heat_capacities_expr(&self, T: &Expr) -> Vec<Expr> {
        self.active_thermo.iter().map(|t| t.Cp_sym(T)).collect()
    }

    pub fn equilibrium_constant_expr(&self, reaction: usize, T: &Expr) -> Expr {
        let r = &self.reactions[reaction];
        let mut delta_g = Expr::Const(0.0);
        for (i, nu) in &r.net {
            delta_g += Expr::Const(*nu) * self.active_thermo[*i].dG_sym(T);
        }
        let K_c = (-delta_g / (Expr::Const(R) * T.clone())).exp();
        if r.delta_n == 0.0 {
            K_c
        } else {
            K_c * (Expr::Const(P0 / R) / T.clone()).pow(Expr::Const(r.delta_n))
        }
    }

    /// rates of progress as expressions of `T` and of the concentrations `C`; `P` selects the
    /// branch of pressure-dependent tables
    pub fn rates_of_progress_expr(&self, T: &Expr, P: f64, C: &[Expr]) -> Vec<Expr> {
        (0..self.reactions.len())
            .map(|j| {
                let r = &self.reactions[j];
                let M = match r.kinetics.efficiencies() {
                    Some(eff) => eff.third_body_expr(C),
                    None => Expr::Const(0.0),
                };
                let k_f = r.kinetics.K_expr(T.clone(), P, M.clone());
                let forward = k_f.clone() * mass_action_expr(&r.reactants, C);
                if !r.reversible {
                    return forward;
                }
                let k_r = match &r.reverse_kinetics {
                    Some(reverse) => match &r.kinetics {
                        ReactionKinetics::ThreeBody(_) => reverse.K_expr(T.clone()) * M,
                        _ => reverse.K_expr(T.clone()),
                    },
                    None => k_f / self.equilibrium_constant_expr(j, T),
                };
                forward - k_r * mass_action_expr(&r.products, C)
            })
            .collect()
    }

    pub fn net_production_expr(&self, T: &Expr, P: f64, C: &[Expr]) -> Vec<Expr> {
        let q = self.rates_of_progress_expr(T, P, C);
        let mut omega = vec![Expr::Const(0.0); self.labels.len()];
        for (r, q_j) in self.reactions.iter().zip(q) {
            for (i, nu) in &r.net {
                omega[*i] += Expr::Const(*nu) * q_j.clone();
            }
        }
        omega
    }

    /// net molar production rates of all species, mol/m3/s
    pub fn net_production_rates(&self, T: f64, P: f64, C: &[f64]) -> Vec<f64> {
        let q = self.rates_of_progress(T, P, C);
        let mut omega = vec![0.0; self.labels.len()];
        for (r, q_j) in self.reactions.iter().zip(&q) {
            for (i, nu) in &r.net {
                omega[*i] += nu * q_j;
            }
        }
        omega
    }
}
