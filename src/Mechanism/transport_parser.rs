//! Chemkin transport file: one line per species
//! `name geometry well_depth diameter dipole polarizability rot_relax`, comments after `!`.
use crate::Mechanism::chemkin_parser::parse_number;
use crate::Mechanism::mechanism_error::MechanismError;
use crate::Mechanism::transport::{Geometry, TransportData};
use std::collections::HashMap;

pub fn parse_transport(text: &str, file: &str) -> Result<HashMap<String, TransportData>, MechanismError> {
    let mut table = HashMap::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('!').next().unwrap_or("");
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].eq_ignore_ascii_case("END") {
            continue;
        }
        let syntax = |message: String| MechanismError::Syntax {
            file: file.to_string(),
            line: i + 1,
            message,
        };
        if fields.len() < 7 {
            return Err(syntax(format!(
                "expected 6 transport parameters for {}, found {}",
                fields[0],
                fields.len() - 1
            )));
        }
        let geometry = fields[1]
            .parse::<u8>()
            .ok()
            .and_then(Geometry::from_index)
            .ok_or_else(|| syntax(format!("bad geometry index '{}'", fields[1])))?;
        let mut values = [0.0; 5];
        for (k, field) in fields[2..7].iter().enumerate() {
            values[k] = parse_number(field).ok_or_else(|| syntax(format!("bad number '{}'", field)))?;
        }
        if values[0] <= 0.0 || values[1] <= 0.0 {
            return Err(syntax(format!(
                "well depth and diameter of {} must be positive",
                fields[0]
            )));
        }
        table.insert(
            fields[0].to_string(),
            TransportData {
                geometry,
                well_depth: values[0],
                diameter: values[1],
                dipole: values[2],
                polarizability: values[3],
                rot_relax: values[4],
            },
        );
    }
    Ok(table)
}
