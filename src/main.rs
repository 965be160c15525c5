//! Entry point for the roms_gridcalc application.
//! Handles CLI parsing, file loading, and dispatches grid means and sums.

use clap::Parser;
use netcdf::open;
use roms_gridcalc::prelude::*;
use roms_gridcalc::{get_parallel_info, list_variables, read_field, read_grid};
use std::sync::Arc;

mod cli;

use cli::Args;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    if args.verbose {
        get_parallel_info().print_info();
    }

    let file = open(&args.file)?;
    println!("Successfully opened NetCDF file: {}", args.file.display());

    let (var, axes, operation) = match (args.gridmean, args.gridsum) {
        (Some(_), Some(_)) => {
            return Err("Use only one of --gridmean and --gridsum per run".into());
        }
        (Some((var, axes)), None) => (var, axes, GridOperation::Mean),
        (None, Some((var, axes))) => (var, axes, GridOperation::Sum),
        (None, None) => {
            list_variables(&file)?;
            return Ok(());
        }
    };

    let grid = match &args.grid_file {
        Some(path) => {
            let grid_file = open(path)?;
            if args.verbose {
                println!("📐 Reading grid metrics from {}", path.display());
            }
            read_grid(&grid_file)?
        }
        None => read_grid(&file)?,
    };
    let grid = Arc::new(grid);
    if args.verbose {
        let (nz, ny, nx) = grid.shape();
        println!("📐 Grid has {nz} levels and {ny} x {nx} rho points");
    }

    let field = read_field(&file, &var)?;
    println!(
        "⚡ Computing grid {} of '{}' over {} using parallel processing",
        operation.as_str(),
        var,
        axes
    );

    let reducer = GridReducer::new(grid);
    let options = ReduceOptions {
        metadata: MetadataPolicy::Derive,
        target_h_position: args.hcoord,
        target_s_position: args.scoord,
    };
    let result = match operation {
        GridOperation::Mean => reducer.mean(&field, &axes, options)?,
        GridOperation::Sum => reducer.sum(&field, &axes, options)?,
    };

    if let Some(output_path) = args.output_netcdf {
        let axes_tag: String = axes.axes().iter().map(|a| a.as_str()).collect();
        let new_var_name = format!("{var}_grid{}_over_{axes_tag}", operation.as_str());
        GridResultWriter::new(&output_path).write_result(&result, &new_var_name)?;
        println!("✅ Saved result to {}", output_path.display());
    } else {
        if let Some(long_name) = result.attrs().and_then(|a| a.long_name.as_deref()) {
            println!("{long_name}");
        }
        println!("Dims: [{}]", result.dims().join(", "));
        println!("Result: {:?}", result.values());
    }

    Ok(())
}
