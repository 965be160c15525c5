//! Defines command-line interface options using `clap` for roms_gridcalc.

use clap::Parser;
use roms_gridcalc::axes::AxisSpec;
use roms_gridcalc::grid::{HPosition, SPosition};
use std::path::PathBuf;

/// A CLI tool for grid-aware means and sums of ROMS output
#[derive(Parser, Debug)]
#[command(
    version,
    name = "roms_gridcalc",
    about = "Grid-aware weighted means and sums of ROMS NetCDF output"
)]
pub struct Args {
    /// Path to the ROMS NetCDF file holding the variable
    #[arg(short, long)]
    pub file: PathBuf,

    /// Path to the ROMS grid file. Defaults to the data file.
    #[arg(short, long)]
    pub grid_file: Option<PathBuf>,

    /// Weighted mean of a variable over grid axes, formatted as <var>:<axes>, e.g. u:Y,X
    #[arg(long, value_parser = parse_reduction_arg)]
    pub gridmean: Option<(String, AxisSpec)>,

    /// Weighted sum of a variable over grid axes, formatted as <var>:<axes>, e.g. u:Z,X
    #[arg(long, value_parser = parse_reduction_arg)]
    pub gridsum: Option<(String, AxisSpec)>,

    /// Horizontal position to place the result on (rho, u, v, psi)
    #[arg(long, value_parser = parse_hposition)]
    pub hcoord: Option<HPosition>,

    /// Vertical position to place the result on (s_rho, s_w)
    #[arg(long, value_parser = parse_sposition)]
    pub scoord: Option<SPosition>,

    /// Path to save result as NetCDF. If not set, prints to terminal.
    #[arg(long)]
    pub output_netcdf: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

fn parse_reduction_arg(s: &str) -> Result<(String, AxisSpec), String> {
    match s.split_once(':') {
        Some((var, axes)) if !var.is_empty() => {
            let axes = axes.parse::<AxisSpec>().map_err(|e| e.to_string())?;
            Ok((var.to_string(), axes))
        }
        _ => Err("Invalid format: Expected '<variable>:<axes>'.".to_string()),
    }
}

fn parse_hposition(s: &str) -> Result<HPosition, String> {
    s.parse().map_err(|e: roms_gridcalc::GridCalcError| e.to_string())
}

fn parse_sposition(s: &str) -> Result<SPosition, String> {
    s.parse().map_err(|e: roms_gridcalc::GridCalcError| e.to_string())
}
