//! Mole fraction plots, one SVG per scenario named `{index}_mole_fractions.svg`.
//! SVG output needs no system fonts. Existing files are overwritten.
use crate::ReactorsIVP::simulation_driver::SimulationError;
use crate::ReactorsIVP::trajectory::Trajectory;
use log::{info, warn};
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

pub const PLOT_SUFFIX: &str = "_mole_fractions.svg";

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("cannot create output directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("drawing {path} failed: {message}")]
    Drawing { path: String, message: String },
    #[error("scenario {0}: nothing to plot")]
    Empty(usize),
    #[error("cannot open {path} in a viewer: {source}")]
    Viewer {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// species with the largest peak mole fractions that get a line
    pub top_species: usize,
    pub width: u32,
    pub height: u32,
    /// open every written plot in the platform viewer
    pub display: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            top_species: 10,
            width: 800,
            height: 600,
            display: false,
        }
    }
}

pub fn plot_file_name(scenario_index: usize) -> String {
    format!("{}{}", scenario_index, PLOT_SUFFIX)
}

/// positions of the `n` species with the largest peak mole fraction, largest first
pub fn top_species(trajectory: &Trajectory, n: usize) -> Vec<usize> {
    let peaks = trajectory.peak_mole_fractions();
    let mut order: Vec<usize> = (0..peaks.len()).filter(|i| peaks[*i] > 0.0).collect();
    order.sort_by(|a, b| peaks[*b].total_cmp(&peaks[*a]).then(a.cmp(b)));
    order.truncate(n);
    order
}

fn drawing_error<E: std::fmt::Display>(path: &Path, e: E) -> PlotError {
    PlotError::Drawing {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

pub fn plot_trajectory(
    trajectory: &Trajectory,
    output_directory: &Path,
    settings: &PlotSettings,
) -> Result<PathBuf, PlotError> {
    if trajectory.is_empty() {
        return Err(PlotError::Empty(trajectory.scenario_index));
    }
    std::fs::create_dir_all(output_directory).map_err(|source| PlotError::Io {
        path: output_directory.display().to_string(),
        source,
    })?;
    let path = output_directory.join(plot_file_name(trajectory.scenario_index));
    draw(trajectory, &path, settings)?;
    info!("plot written to {}", path.display());
    Ok(path)
}

fn draw(trajectory: &Trajectory, path: &Path, settings: &PlotSettings) -> Result<(), PlotError> {
    let species = top_species(trajectory, settings.top_species);
    let t_end = trajectory.final_time().unwrap_or(0.0) * 1e3;
    let t_end = if t_end > 0.0 { t_end } else { 1.0 };
    let peaks = trajectory.peak_mole_fractions();
    let x_max = species.iter().map(|i| peaks[*i]).fold(0.0_f64, f64::max);
    let x_max = if x_max > 0.0 { x_max * 1.05 } else { 1.0 };

    let root = SVGBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| drawing_error(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Scenario {}: mole fractions", trajectory.scenario_index),
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..t_end, 0.0..x_max)
        .map_err(|e| drawing_error(path, e))?;
    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Mole fraction")
        .draw()
        .map_err(|e| drawing_error(path, e))?;

    for (k, i) in species.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        let points = trajectory
            .times
            .iter()
            .zip(&trajectory.mole_fractions)
            .map(|(t, row)| (t * 1e3, row[*i]));
        chart
            .draw_series(LineSeries::new(points, &color))
            .map_err(|e| drawing_error(path, e))?
            .label(trajectory.species_labels[*i].clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| drawing_error(path, e))?;
    root.present().map_err(|e| drawing_error(path, e))
}

/// One plot per successful scenario, in scenario order. A failed scenario or a failed plot is
/// reported and skipped; results already computed are never touched.
pub fn plot_trajectories(
    results: &[Result<Trajectory, SimulationError>],
    output_directory: &Path,
    settings: &PlotSettings,
) -> Vec<Result<PathBuf, PlotError>> {
    let mut written = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(trajectory) => {
                let plot = plot_trajectory(trajectory, output_directory, settings);
                match &plot {
                    Ok(path) if settings.display => {
                        if let Err(e) = display_image(path) {
                            warn!("{}", e);
                        }
                    }
                    Err(e) => warn!("{}", e),
                    _ => {}
                }
                written.push(plot);
            }
            Err(e) => warn!("no plot for failed {}", e),
        }
    }
    written
}

/// opens the file in the platform's default viewer
pub fn display_image(path: &Path) -> Result<(), PlotError> {
    let viewer = |source| PlotError::Viewer {
        path: path.display().to_string(),
        source,
    };
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("")
            .arg(path)
            .spawn()
            .map_err(viewer)?;
    }
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(path).spawn().map_err(viewer)?;
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Command::new("xdg-open").arg(path).spawn().map_err(viewer)?;
    }
    Ok(())
}
