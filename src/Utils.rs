/// simplelog setup for the terminal and an optional log file
pub mod logger;
/// SVG plots of mole fraction trajectories and opening them in a viewer
pub mod plot_trajectories;
pub mod workflow_config;
