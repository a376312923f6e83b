/// eng
/// Rate constant functions of gas-phase reactions: elementary (modified Arrhenius), three-body,
/// falloff (Lindemann and Troe) and pressure-dependent PLOG tables, all in SI units, together with
/// the pure update functions used to change a prefactor.
/// ----------------------------------------------------------------
/// ru
/// Функции констант скорости газофазных реакций: элементарные (модифицированный Аррениус),
/// с третьим телом, falloff (Линдеман и Трое) и зависящие от давления таблицы PLOG, все в СИ,
/// а также чистые функции изменения предэкспоненциального множителя.
/// # Examples
/// ```
/// use KiMech::Kinetics::rate_expressions::{Arrhenius, RateCoefficient, ReactionKinetics};
/// let kinetics = ReactionKinetics::elementary(Arrhenius::new(1e13, 0.0, 65.0 * 4184.0));
/// let faster = kinetics.with_scaled_prefactor(10.0).unwrap();
/// let (T, P) = (1500.0, 1e5);
/// let ratio = faster.K_const(T, P, 0.0) / kinetics.K_const(T, P, 0.0);
/// assert!((ratio - 10.0).abs() < 1e-9);
/// ```
pub mod rate_expressions;
/// reaction: stoichiometry by species index, reversibility, kinetics, Chemkin equation rendering
pub mod reaction;
