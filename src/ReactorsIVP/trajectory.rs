//! Time-resolved output of one scenario. Built by the driver while integrating and read-only
//! afterwards.
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub scenario_index: usize,
    pub species_labels: Vec<String>,
    /// s
    pub times: Vec<f64>,
    /// K
    pub temperatures: Vec<f64>,
    /// Pa
    pub pressures: Vec<f64>,
    /// one row per time point, one column per species
    pub mole_fractions: Vec<Vec<f64>>,
    /// mixture molar enthalpy, J/mol
    pub enthalpies: Vec<f64>,
}

impl Trajectory {
    pub fn new(scenario_index: usize, species_labels: Vec<String>) -> Self {
        Trajectory {
            scenario_index,
            species_labels,
            times: Vec::new(),
            temperatures: Vec::new(),
            pressures: Vec::new(),
            mole_fractions: Vec::new(),
            enthalpies: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, t: f64, T: f64, P: f64, x: Vec<f64>, enthalpy: f64) {
        self.times.push(t);
        self.temperatures.push(T);
        self.pressures.push(P);
        self.mole_fractions.push(x);
        self.enthalpies.push(enthalpy);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn species_position(&self, label: &str) -> Option<usize> {
        self.species_labels.iter().position(|l| l == label)
    }

    pub fn final_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    pub fn final_mole_fraction(&self, label: &str) -> Option<f64> {
        let i = self.species_position(label)?;
        self.mole_fractions.last().map(|row| row[i])
    }

    pub fn mole_fraction_series(&self, label: &str) -> Option<Vec<f64>> {
        let i = self.species_position(label)?;
        Some(self.mole_fractions.iter().map(|row| row[i]).collect())
    }

    /// largest mole fraction each species reaches
    pub fn peak_mole_fractions(&self) -> Vec<f64> {
        let mut peaks = vec![0.0_f64; self.species_labels.len()];
        for row in &self.mole_fractions {
            for (peak, x) in peaks.iter_mut().zip(row) {
                *peak = peak.max(*x);
            }
        }
        peaks
    }

    pub fn print_final_state(&self) {
        let (Some(t), Some(row)) = (self.final_time(), self.mole_fractions.last()) else {
            println!("scenario {}: empty trajectory", self.scenario_index);
            return;
        };
        println!(
            "scenario {}: t = {:.4e} s, T = {:.2} K, P = {:.2} Pa",
            self.scenario_index,
            t,
            self.temperatures.last().copied().unwrap_or(f64::NAN),
            self.pressures.last().copied().unwrap_or(f64::NAN)
        );
        let mut table = Table::new();
        table.add_row(row!["Species", "initial x", "final x"]);
        for (i, label) in self.species_labels.iter().enumerate() {
            table.add_row(row![
                label,
                format!("{:.6e}", self.mole_fractions[0][i]),
                format!("{:.6e}", row[i])
            ]);
        }
        table.printstd();
    }

    /// columns: t, T, P, H, then one mole fraction column per species
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let mut header = vec!["t_s".to_string(), "T_K".to_string(), "P_Pa".to_string(), "H_J_per_mol".to_string()];
        header.extend(self.species_labels.iter().map(|l| format!("X_{}", l)));
        writeln!(writer, "{}", header.join(","))?;
        for k in 0..self.len() {
            let mut fields = vec![
                format!("{:e}", self.times[k]),
                format!("{}", self.temperatures[k]),
                format!("{}", self.pressures[k]),
                format!("{}", self.enthalpies[k]),
            ];
            fields.extend(self.mole_fractions[k].iter().map(|x| format!("{:e}", x)));
            writeln!(writer, "{}", fields.join(","))?;
        }
        writer.flush()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(io::Error::other)
    }
}
