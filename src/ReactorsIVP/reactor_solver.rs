//! # IVP solver for reactor equations
//!
//! Thin layer over `UniversalODESolver`: the symbolic right-hand sides built by
//! `ReactorEquations` go in together with a map of solver parameters, the time grid and the
//! state matrix come out. Before the solver is started the right-hand side is evaluated at the
//! initial state, so a scenario whose rates overflow fails with an error of its own instead of
//! taking the whole batch down.
//!
//! ## Parameters
//! `SolverConfig` holds the method and overrides of the parameter map. The map starts from the
//! defaults below; `max_step` and `step_size` are scaled with the duration of the scenario unless
//! overridden.
//!
//! | key            | default          |
//! |----------------|------------------|
//! | step_size      | duration / 1000  |
//! | tolerance      | 1e-6             |
//! | max_iterations | 100000           |
//! | rtol           | 1e-6             |
//! | atol           | 1e-10            |
//! | max_step       | duration / 10    |
//! | first_step     | None             |
//! | vectorized     | false            |
//! | jac_sparsity   | None             |
//! | parallel       | true             |
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::numerical::Radau::Radau_main::RadauOrder;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// name of the independent variable of every reactor system
pub const TIME: &str = "t";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("non-finite state or derivative at t = {t}")]
    NonFinite { t: f64 },
    #[error("integration interval must be positive and finite, got t_end = {t_end}")]
    InvalidInterval { t_end: f64 },
    #[error("the solver returned no solution")]
    NoSolution,
    #[error("the solver stopped at t = {t} before reaching t_end = {t_end}")]
    Incomplete { t: f64, t_end: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolverMethod {
    #[default]
    BDF,
    Radau3,
    Radau7,
    BackwardEuler,
}

impl SolverMethod {
    pub fn solver_type(&self) -> SolverType {
        match self {
            SolverMethod::BDF => SolverType::BDF,
            SolverMethod::Radau3 => SolverType::Radau(RadauOrder::Order3),
            SolverMethod::Radau7 => SolverType::Radau(RadauOrder::Order7),
            SolverMethod::BackwardEuler => SolverType::BackwardEuler,
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverMethod::BDF => "BDF",
            SolverMethod::Radau3 => "Radau (order 3)",
            SolverMethod::Radau7 => "Radau (order 7)",
            SolverMethod::BackwardEuler => "Backward Euler",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: SolverMethod,
    /// overrides of the parameter map, by key
    pub parameters: BTreeMap<String, f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            method: SolverMethod::BDF,
            parameters: BTreeMap::new(),
        }
    }
}

impl SolverConfig {
    /// parameter map handed to `UniversalODESolver` for a scenario of the given duration
    pub fn solver_params(&self, duration: f64) -> HashMap<String, SolverParam> {
        let mut map_of_params = HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(duration / 1000.0)),
            ("tolerance".to_owned(), SolverParam::Float(1e-6)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(1e-6)),
            ("atol".to_owned(), SolverParam::Float(1e-10)),
            ("max_step".to_owned(), SolverParam::Float(duration / 10.0)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(None)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            ("parallel".to_owned(), SolverParam::Bool(true)),
        ]);
        for (key, value) in &self.parameters {
            let param = match key.as_str() {
                "max_iterations" => SolverParam::Int(value.round().max(1.0) as _),
                "first_step" => SolverParam::OptionalFloat(Some(*value)),
                "vectorized" | "parallel" => SolverParam::Bool(*value != 0.0),
                "step_size" | "tolerance" | "rtol" | "atol" | "max_step" => SolverParam::Float(*value),
                _ => {
                    warn!("unknown solver parameter {} ignored", key);
                    continue;
                }
            };
            map_of_params.insert(key.clone(), param);
        }
        map_of_params
    }
}

/// time grid and states; row `k` of `y` is the state at `t[k]`
#[derive(Debug, Clone, PartialEq)]
pub struct IvpSolution {
    pub t: DVector<f64>,
    pub y: DMatrix<f64>,
}

impl IvpSolution {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn state(&self, k: usize) -> DVector<f64> {
        self.y.row(k).transpose()
    }

    /// keeps the points up to and including `last`
    fn truncated(&self, last: usize) -> IvpSolution {
        IvpSolution {
            t: self.t.rows(0, last + 1).into_owned(),
            y: self.y.rows(0, last + 1).into_owned(),
        }
    }
}

/// values of the right-hand sides at the state `y`
pub fn rhs_at(equations: &[Expr], unknowns: &[String], y: &DVector<f64>) -> DVector<f64> {
    let args: Vec<&str> = unknowns.iter().map(|s| s.as_str()).collect();
    let point: Vec<f64> = y.iter().copied().collect();
    DVector::from_iterator(
        equations.len(),
        equations.iter().map(|eq| {
            let f = eq.clone().lambdify_owned(args.clone());
            f(point.clone())
        }),
    )
}

/// Integrates `equations` for `unknowns` from t = 0 to `t_end`.
///
/// `stop` names an increasing variable and the value at which integration ends early; the
/// solution then finishes at the first point where the variable reaches that value.
pub fn solve_ivp(
    equations: Vec<Expr>,
    unknowns: Vec<String>,
    y0: DVector<f64>,
    t_end: f64,
    config: &SolverConfig,
    stop: Option<(String, f64)>,
) -> Result<IvpSolution, SolverError> {
    if !(t_end > 0.0) || !t_end.is_finite() {
        return Err(SolverError::InvalidInterval { t_end });
    }
    let dy0 = rhs_at(&equations, &unknowns, &y0);
    if y0.iter().chain(dy0.iter()).any(|v| !v.is_finite()) {
        return Err(SolverError::NonFinite { t: 0.0 });
    }
    let stop_column = stop
        .as_ref()
        .and_then(|(name, value)| unknowns.iter().position(|u| u == name).map(|i| (i, *value)));

    let mut ode = UniversalODESolver::new(
        equations,
        unknowns.clone(),
        TIME.to_owned(),
        config.method.solver_type(),
        0.0,
        y0,
        t_end,
    );
    ode.set_parameters(config.solver_params(t_end));
    if let Some((name, value)) = stop {
        ode.set_stop_condition(HashMap::from([(name, value)]));
    }
    info!("solving {} equations with {} up to t = {}", unknowns.len(), config.method, t_end);
    ode.initialize();
    ode.solve();

    let (t, y) = ode.get_result();
    let (t, y) = match (t, y) {
        (Some(t), Some(y)) if !t.is_empty() => (t, y),
        _ => return Err(SolverError::NoSolution),
    };
    let y = if y.nrows() == t.len() {
        y
    } else if y.ncols() == t.len() {
        y.transpose()
    } else {
        return Err(SolverError::NoSolution);
    };
    let solution = IvpSolution { t, y };

    for k in 0..solution.len() {
        if !solution.t[k].is_finite() || solution.y.row(k).iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite { t: solution.t[k] });
        }
    }
    if let Some((column, value)) = stop_column {
        if let Some(k) = (0..solution.len()).find(|k| solution.y[(*k, column)] >= value) {
            return Ok(solution.truncated(k));
        }
    }
    let t_last = solution.t[solution.len() - 1];
    if t_last < t_end * (1.0 - 1e-9) {
        return Err(SolverError::Incomplete { t: t_last, t_end });
    }
    Ok(solution)
}
