/// two-range NASA 7-coefficient polynomials, as found in the THERMO section of Chemkin files
pub mod nasa_polynomials;
/// tabulated heat capacity with standard enthalpy and entropy at 298 K
pub mod thermo_data;
/// common interface of the species thermodynamic models and the pure update commands
///
///  # Examples
/// ```
/// use KiMech::Thermodynamics::nasa_polynomials::Nasa7;
/// use KiMech::Thermodynamics::thermo_model::{ThermoCalculator, ThermoModel};
/// let argon = ThermoModel::from(Nasa7::constant_cp(2.5, -745.375, 4.366));
/// let shifted = argon.with_enthalpy_offset(1000.0);
/// let dh = shifted.enthalpy(1500.0) - argon.enthalpy(1500.0);
/// assert!((dh - 1000.0).abs() < 1e-9);
/// assert_eq!(shifted.heat_capacity(1500.0), argon.heat_capacity(1500.0));
/// ```
pub mod thermo_model;
