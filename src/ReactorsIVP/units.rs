//! Physical quantities given as a value with a unit string, and their conversion to SI.
//! An empty unit string means the value is already in SI.
use crate::ReactorsIVP::conditions::ConditionError;
use serde::{Deserialize, Serialize};

const ATM: f64 = 101325.0;
const TORR: f64 = ATM / 760.0;
const PSI: f64 = 6894.757293168;
const CAL: f64 = 4.184;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: &str) -> Self {
        Quantity {
            value,
            unit: unit.to_string(),
        }
    }

    fn unknown(&self, kind: &'static str) -> ConditionError {
        ConditionError::UnknownUnit {
            kind,
            unit: self.unit.clone(),
        }
    }

    /// K
    pub fn to_kelvin(&self) -> Result<f64, ConditionError> {
        let v = self.value;
        match self.unit.trim() {
            "" | "K" | "kelvin" => Ok(v),
            "C" | "degC" | "°C" | "celsius" => Ok(v + 273.15),
            "F" | "degF" | "°F" | "fahrenheit" => Ok((v - 32.0) * 5.0 / 9.0 + 273.15),
            "R" | "degR" | "rankine" => Ok(v * 5.0 / 9.0),
            _ => Err(self.unknown("temperature")),
        }
    }

    /// Pa
    pub fn to_pascal(&self) -> Result<f64, ConditionError> {
        let factor = match self.unit.trim() {
            "" | "Pa" => 1.0,
            "hPa" => 1e2,
            "kPa" => 1e3,
            "MPa" => 1e6,
            "mbar" => 1e2,
            "bar" => 1e5,
            "atm" => ATM,
            "torr" | "Torr" | "mmHg" => TORR,
            "psi" => PSI,
            _ => return Err(self.unknown("pressure")),
        };
        Ok(self.value * factor)
    }

    /// s
    pub fn to_seconds(&self) -> Result<f64, ConditionError> {
        let factor = match self.unit.trim() {
            "" | "s" | "sec" => 1.0,
            "ms" => 1e-3,
            "us" | "µs" | "μs" => 1e-6,
            "ns" => 1e-9,
            "min" => 60.0,
            "h" | "hr" => 3600.0,
            _ => return Err(self.unknown("time")),
        };
        Ok(self.value * factor)
    }

    /// J/mol
    pub fn to_joule_per_mole(&self) -> Result<f64, ConditionError> {
        let factor = match self.unit.trim() {
            "" | "J/mol" => 1.0,
            "kJ/mol" => 1e3,
            "cal/mol" => CAL,
            "kcal/mol" => 1e3 * CAL,
            _ => return Err(self.unknown("molar energy")),
        };
        Ok(self.value * factor)
    }

    /// J/mol/K
    pub fn to_joule_per_mole_kelvin(&self) -> Result<f64, ConditionError> {
        let factor = match self.unit.trim() {
            "" | "J/mol/K" | "J/(mol*K)" => 1.0,
            "cal/mol/K" | "cal/(mol*K)" => CAL,
            _ => return Err(self.unknown("molar entropy")),
        };
        Ok(self.value * factor)
    }
}
