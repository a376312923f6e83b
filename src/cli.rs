/// command line entry: workflow file in, plots and summaries out
pub mod cli_main;
