//! End-to-end tests of gridmean and gridsum on ROMS-shaped grids
//!
//! The reductions are checked against the explicit cell-weighted formulas,
//! against each other when applied one axis at a time, and through a NetCDF
//! round trip.

use ndarray::{Array1, Array2, Array3, ArrayD, IxDyn};
use netcdf::{create, open, AttributeValue};
use roms_gridcalc::prelude::*;
use roms_gridcalc::{gridmean_value, gridsum_value, read_field, read_grid};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

const NZ: usize = 3;
const NY: usize = 4;
const NX: usize = 5;

/// Curvilinear grid: every metric varies in both horizontal directions
fn curvilinear_grid() -> Arc<RomsGrid> {
    let dx = Array2::from_shape_fn((NY, NX), |(j, i)| 1000.0 + 50.0 * i as f64 + 10.0 * j as f64);
    let dy = Array2::from_shape_fn((NY, NX), |(j, i)| 800.0 + 30.0 * j as f64 + 5.0 * i as f64);
    let dz = Array3::from_shape_fn((NZ, NY, NX), |(k, j, i)| {
        2.0 + k as f64 + 0.1 * i as f64 + 0.2 * j as f64
    });
    Arc::new(RomsGrid::new(dx, dy, dz).expect("valid grid"))
}

/// Rectilinear grid: dx varies only along xi, dy only along eta
fn rectilinear_grid() -> Arc<RomsGrid> {
    let dx = Array2::from_shape_fn((NY, NX), |(_, i)| 1000.0 + 75.0 * i as f64);
    let dy = Array2::from_shape_fn((NY, NX), |(j, _)| 900.0 + 40.0 * j as f64);
    let dz = Array3::from_shape_fn((NZ, NY, NX), |(k, j, i)| {
        1.5 + 0.5 * k as f64 + 0.05 * (i + j) as f64
    });
    Arc::new(RomsGrid::new(dx, dy, dz).expect("valid grid"))
}

/// A u-point field shaped (s_rho, eta_rho, xi_u)
fn u_field() -> Field {
    let values = ArrayD::from_shape_fn(IxDyn(&[NZ, NY, NX - 1]), |idx| {
        let (k, j, i) = (idx[0] as f64, idx[1] as f64, idx[2] as f64);
        0.37 * (7.0 * k + 3.0 * j + i) - 2.0 + (0.5 * i * j).sin()
    });
    Field::new(values, vec!["s_rho", "eta_rho", "xi_u"])
        .expect("valid field")
        .with_name("u")
}

fn assert_close(actual: &ArrayD<f64>, expected: &ArrayD<f64>, tol: f64) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.iter().zip(expected.iter()) {
        let scale = e.abs().max(1.0);
        assert!((a - e).abs() <= tol * scale, "{a} != {e}");
    }
}

#[test]
fn test_gridmean_matches_weighted_formula() -> Result<()> {
    let grid = curvilinear_grid();
    let u = u_field();

    let mean = gridmean(
        &u,
        &grid,
        &AxisSpec::parse("Y,X")?,
        MetadataPolicy::Derive,
        None,
        None,
    )?;
    assert_eq!(mean.dims(), &["s_rho"]);

    // (u*dy_u*dx_u).sum(eta_rho, xi_u) / (dy_u*dx_u).sum(eta_rho, xi_u)
    let area = grid.dy(HPosition::U).multiply(grid.dx(HPosition::U))?;
    let numerator = u.multiply(&area)?.sum_over(&["eta_rho", "xi_u"])?;
    let denominator = area.sum_over(&["eta_rho", "xi_u"])?.values().sum();
    let expected = numerator.values() / denominator;

    assert_close(mean.values(), &expected, 1e-12);
    Ok(())
}

#[test]
fn test_gridsum_matches_weighted_formula() -> Result<()> {
    let grid = curvilinear_grid();
    let u = u_field();

    let sum = gridsum(
        &u,
        &grid,
        &AxisSpec::parse("Z,X")?,
        MetadataPolicy::Derive,
        None,
        None,
    )?;
    assert_eq!(sum.dims(), &["eta_rho"]);

    // (u*dz_u*dx_u).sum(s_rho, xi_u)
    let expected = u
        .multiply(grid.dz(SPosition::Rho, HPosition::U))?
        .multiply(grid.dx(HPosition::U))?
        .sum_over(&["s_rho", "xi_u"])?;

    assert_close(sum.values(), expected.values(), 1e-12);
    Ok(())
}

#[test]
fn test_sequential_reduction_composes() -> Result<()> {
    let grid = rectilinear_grid();
    let u = u_field();

    let joint = gridmean(&u, &grid, &AxisSpec::parse("Y,X")?, MetadataPolicy::Derive, None, None)?;
    let over_y = gridmean(&u, &grid, &AxisSpec::parse("Y")?, MetadataPolicy::Derive, None, None)?;
    assert_eq!(over_y.dims(), &["s_rho", "xi_u"]);
    let stepwise = gridmean(&over_y, &grid, &AxisSpec::parse("X")?, MetadataPolicy::Derive, None, None)?;
    assert_close(stepwise.values(), joint.values(), 1e-12);
    assert_eq!(
        stepwise.attrs().and_then(|a| a.long_name.as_deref()),
        Some("var, grid mean over dim Y, grid mean over dim X")
    );

    let joint = gridsum(&u, &grid, &AxisSpec::parse("Y,X")?, MetadataPolicy::None, None, None)?;
    let over_y = gridsum(&u, &grid, &AxisSpec::parse("Y")?, MetadataPolicy::None, None, None)?;
    let stepwise = gridsum(&over_y, &grid, &AxisSpec::parse("X")?, MetadataPolicy::None, None, None)?;
    assert_close(stepwise.values(), joint.values(), 1e-12);
    Ok(())
}

#[test]
fn test_uniform_grid_reduces_to_plain_statistics() -> Result<()> {
    let grid = Arc::new(RomsGrid::uniform(2, 3, 4, 2.0, 3.0, 1.0)?);
    let values = ndarray::arr2(&[[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0], [9.0, 10.0, 11.0, 12.0]]);
    let temp = Field::new(values.into_dyn(), vec!["eta_rho", "xi_rho"])?;

    let mean = gridmean(&temp, &grid, &AxisSpec::parse("X")?, MetadataPolicy::None, None, None)?;
    assert_eq!(mean.values().as_slice(), Some(&[2.5, 6.5, 10.5][..]));

    let sum = gridsum(&temp, &grid, &AxisSpec::parse("X")?, MetadataPolicy::None, None, None)?;
    assert_eq!(sum.values().as_slice(), Some(&[20.0, 52.0, 84.0][..]));

    let area_sum = gridsum(&temp, &grid, &AxisSpec::parse("Y,X")?, MetadataPolicy::None, None, None)?;
    assert_eq!(area_sum.ndim(), 0);
    assert_eq!(area_sum.values().sum(), 78.0 * 6.0);
    Ok(())
}

#[test]
fn test_mean_ignores_missing_cells() -> Result<()> {
    let grid = Arc::new(RomsGrid::uniform(1, 2, 4, 1.0, 1.0, 1.0)?);
    let values = ndarray::arr2(&[[1.0, f64::NAN, 3.0, 5.0], [f64::NAN, f64::NAN, f64::NAN, f64::NAN]]);
    let temp = Field::new(values.into_dyn(), vec!["eta_rho", "xi_rho"])?;

    let mean = gridmean(&temp, &grid, &AxisSpec::parse("X")?, MetadataPolicy::None, None, None)?;
    assert_eq!(mean.values()[[0]], 3.0);
    assert!(mean.values()[[1]].is_nan());
    Ok(())
}

#[test]
fn test_explicit_metadata_is_attached_verbatim() -> Result<()> {
    let grid = curvilinear_grid();
    let u = u_field().with_attrs(Metadata::new().with_long_name("u-momentum component"));

    let record = Metadata::new()
        .with_name("ubar_area")
        .with_long_name("custom")
        .with_extra("note", json!("kept as is"));
    let mean = gridmean(
        &u,
        &grid,
        &AxisSpec::parse("Y,X")?,
        MetadataPolicy::Explicit(record.clone()),
        None,
        None,
    )?;

    assert_eq!(mean.attrs(), Some(&record));
    assert_eq!(mean.name(), Some("ubar_area"));
    Ok(())
}

#[test]
fn test_derived_metadata_on_result() -> Result<()> {
    let grid = curvilinear_grid();
    let handle: GridRef = grid.clone();
    let u = u_field().with_attrs(
        Metadata::new()
            .with_units("meter second-1")
            .with_long_name("u-momentum component"),
    );

    let sum = gridsum(&u, &grid, &AxisSpec::parse("Z")?, MetadataPolicy::Derive, None, None)?;
    let attrs = sum.attrs().expect("derived metadata");
    assert_eq!(attrs.name.as_deref(), Some("var"));
    assert_eq!(attrs.units.as_deref(), Some("meter second-1"));
    assert_eq!(
        attrs.long_name.as_deref(),
        Some("u-momentum component, grid sum over dim Z")
    );
    assert!(attrs.refers_to(&handle));
    assert_eq!(sum.name(), Some("var"));

    // The input keeps its own record
    assert_eq!(
        u.attrs().and_then(|a| a.long_name.as_deref()),
        Some("u-momentum component")
    );
    assert!(u.attrs().and_then(|a| a.grid.as_ref()).is_none());

    let bare = gridmean(&u_field(), &grid, &AxisSpec::parse("Y,X")?, MetadataPolicy::Derive, None, None)?;
    assert_eq!(
        bare.attrs().and_then(|a| a.long_name.as_deref()),
        Some("var, grid mean over dim Y, X")
    );

    let none = gridmean(&u, &grid, &AxisSpec::parse("X")?, MetadataPolicy::None, None, None)?;
    assert!(none.attrs().is_none());
    assert_eq!(none.name(), Some("u"));
    Ok(())
}

#[test]
fn test_rejects_badly_shaped_axes() -> Result<()> {
    let grid = curvilinear_grid();
    let u = u_field();

    for bad in [json!(1), json!({"dim": "X"}), json!(null), json!([["Y"], "X"])] {
        let mean = gridmean_value(&u, &grid, &bad, ReduceOptions::default());
        assert!(matches!(mean, Err(GridCalcError::InvalidArgument(_))));
        let sum = gridsum_value(&u, &grid, &bad, ReduceOptions::default());
        assert!(matches!(sum, Err(GridCalcError::InvalidArgument(_))));
    }

    let mean = gridmean_value(&u, &grid, &json!(["Y", "X"]), ReduceOptions::default())?;
    assert_eq!(mean.dims(), &["s_rho"]);
    let sum = gridsum_value(&u, &grid, &json!("Z"), ReduceOptions::default())?;
    assert_eq!(sum.dims(), &["eta_rho", "xi_u"]);
    Ok(())
}

#[test]
fn test_grid_errors_propagate() -> Result<()> {
    let grid = curvilinear_grid();
    let surface = Field::new(ArrayD::zeros(IxDyn(&[NY, NX])), vec!["eta_rho", "xi_rho"])?;

    match gridmean(&surface, &grid, &AxisSpec::parse("Z")?, MetadataPolicy::Derive, None, None) {
        Err(GridCalcError::AxisNotFound { axis, dims }) => {
            assert_eq!(axis, "Z");
            assert_eq!(dims, vec!["eta_rho", "xi_rho"]);
        }
        other => panic!("Expected AxisNotFound error, got {other:?}"),
    }

    let wrong_size = Field::new(ArrayD::zeros(IxDyn(&[NY, NX + 2])), vec!["eta_rho", "xi_rho"])?;
    assert!(matches!(
        gridsum(&wrong_size, &grid, &AxisSpec::parse("X")?, MetadataPolicy::Derive, None, None),
        Err(GridCalcError::ShapeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_rejects_empty_or_repeated_axis_lists() {
    let grid = curvilinear_grid();
    let u = u_field();

    for bad in [AxisSpec::Many(vec![]), AxisSpec::Many(vec![GridAxis::X, GridAxis::X])] {
        let mean = gridmean(&u, &grid, &bad, MetadataPolicy::Derive, None, None);
        assert!(matches!(mean, Err(GridCalcError::InvalidArgument(_))), "{bad:?}");
        let sum = gridsum(&u, &grid, &bad, MetadataPolicy::Derive, None, None);
        assert!(matches!(sum, Err(GridCalcError::InvalidArgument(_))), "{bad:?}");
        assert!(matches!(
            grid.average(&u, &bad),
            Err(GridCalcError::InvalidArgument(_))
        ));
        assert!(matches!(
            grid.integrate(&u, &bad),
            Err(GridCalcError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_result_placed_on_target_position() -> Result<()> {
    let grid = curvilinear_grid();
    let u = u_field();
    let axes = AxisSpec::parse("Z")?;

    let at_u = gridmean(&u, &grid, &axes, MetadataPolicy::None, None, None)?;
    let at_rho = gridmean(&u, &grid, &axes, MetadataPolicy::None, Some(HPosition::Rho), None)?;
    assert_eq!(at_rho.dims(), &["eta_rho", "xi_rho"]);
    assert_eq!(at_rho.shape(), &[NY, NX]);

    let src = at_u.values();
    let dst = at_rho.values();
    for j in 0..NY {
        assert_eq!(dst[[j, 0]], src[[j, 0]]);
        assert_eq!(dst[[j, NX - 1]], src[[j, NX - 2]]);
        for i in 1..NX - 1 {
            assert!((dst[[j, i]] - 0.5 * (src[[j, i - 1]] + src[[j, i]])).abs() < 1e-12);
        }
    }

    let at_psi = gridmean(&u, &grid, &axes, MetadataPolicy::None, Some(HPosition::Psi), None)?;
    assert_eq!(at_psi.dims(), &["eta_v", "xi_u"]);
    assert_eq!(at_psi.shape(), &[NY - 1, NX - 1]);

    let section = gridmean(
        &u,
        &grid,
        &AxisSpec::parse("X")?,
        MetadataPolicy::None,
        Some(HPosition::V),
        Some(SPosition::W),
    )?;
    assert_eq!(section.dims(), &["s_w", "eta_v"]);
    assert_eq!(section.shape(), &[NZ + 1, NY - 1]);
    Ok(())
}

#[test]
fn test_grid_reducer_wrapper() -> Result<()> {
    let grid = curvilinear_grid();
    let reducer = GridReducer::new(Arc::clone(&grid));
    let u = u_field();
    let axes = AxisSpec::parse("Y,X")?;

    let direct = gridmean(&u, &grid, &axes, MetadataPolicy::Derive, None, None)?;
    let wrapped = reducer.mean(&u, &axes, ReduceOptions::default())?;
    assert_eq!(wrapped.values(), direct.values());
    assert_eq!(wrapped.attrs(), direct.attrs());

    let summed = reducer.sum(
        &u,
        &axes,
        ReduceOptions {
            target_s_position: Some(SPosition::W),
            ..ReduceOptions::default()
        },
    )?;
    assert_eq!(summed.dims(), &["s_w"]);
    assert!(Arc::ptr_eq(reducer.grid(), &grid));
    Ok(())
}

#[test]
fn test_netcdf_round_trip() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("ocean_his.nc");
    let out_path = temp_dir.path().join("ubar.nc");

    let h = Array2::from_shape_fn((NY, NX), |(j, i)| 40.0 + 5.0 * i as f64 + 2.0 * j as f64);
    let pm = Array2::from_shape_fn((NY, NX), |(_, i)| 1.0 / (1000.0 + 20.0 * i as f64));
    let pn = Array2::from_elem((NY, NX), 1.0 / 800.0);
    let s_w = Array1::linspace(-1.0, 0.0, NZ + 1);
    let cs_w = s_w.mapv(|s: f64| -(s * s));
    let u_values = u_field().into_values();

    // Create a small ROMS-like file
    {
        let mut file = create(&file_path)?;
        file.add_dimension("s_rho", NZ)?;
        file.add_dimension("s_w", NZ + 1)?;
        file.add_dimension("eta_rho", NY)?;
        file.add_dimension("xi_rho", NX)?;
        file.add_dimension("xi_u", NX - 1)?;
        file.add_dimension("one", 1)?;

        let mut var = file.add_variable::<f64>("pm", &["eta_rho", "xi_rho"])?;
        var.put(pm.view(), ..)?;
        let mut var = file.add_variable::<f64>("pn", &["eta_rho", "xi_rho"])?;
        var.put(pn.view(), ..)?;
        let mut var = file.add_variable::<f64>("h", &["eta_rho", "xi_rho"])?;
        var.put(h.view(), ..)?;
        let mut var = file.add_variable::<f64>("s_w", &["s_w"])?;
        var.put(s_w.view(), ..)?;
        let mut var = file.add_variable::<f64>("Cs_w", &["s_w"])?;
        var.put(cs_w.view(), ..)?;
        let mut var = file.add_variable::<f64>("hc", &["one"])?;
        var.put(Array1::from_elem(1, 10.0).view(), ..)?;
        let mut var = file.add_variable::<f64>("Vtransform", &["one"])?;
        var.put(Array1::from_elem(1, 2.0).view(), ..)?;

        let mut filled = u_values.clone();
        filled[[0, 0, 0]] = -999.0;
        let mut var = file.add_variable::<f64>("u", &["s_rho", "eta_rho", "xi_u"])?;
        var.put_attribute("units", "meter second-1")?;
        var.put_attribute("long_name", "u-momentum component")?;
        var.put_attribute("_FillValue", -999.0f64)?;
        var.put(filled.view(), ..)?;
    }

    let file = open(&file_path)?;
    let grid = Arc::new(read_grid(&file)?);
    assert_eq!(grid.shape(), (NZ, NY, NX));
    let column = grid.dz(SPosition::Rho, HPosition::Rho).sum_over(&["s_rho"])?;
    assert_close(column.values(), &h.clone().into_dyn(), 1e-9);

    let u = read_field(&file, "u")?;
    assert_eq!(u.dims(), &["s_rho", "eta_rho", "xi_u"]);
    assert!(u.values()[[0, 0, 0]].is_nan());
    assert_eq!(u.values()[[1, 2, 3]], u_values[[1, 2, 3]]);
    let attrs = u.attrs().expect("attributes read");
    assert_eq!(attrs.units.as_deref(), Some("meter second-1"));
    assert_eq!(attrs.long_name.as_deref(), Some("u-momentum component"));
    assert!(attrs.extra.get("_FillValue").is_none());

    assert!(matches!(
        read_field(&file, "missing"),
        Err(GridCalcError::VariableNotFound { .. })
    ));

    let mean = gridmean(&u, &grid, &AxisSpec::parse("Y,X")?, MetadataPolicy::Derive, None, None)?;
    assert!(mean.values().iter().all(|v| v.is_finite()));

    GridResultWriter::new(&out_path).write_result(&mean, "u_gridmean_over_YX")?;
    // Writing twice replaces the file
    GridResultWriter::new(&out_path).write_result(&mean, "u_gridmean_over_YX")?;

    let written = open(&out_path)?;
    let var = written
        .variable("u_gridmean_over_YX")
        .expect("Variable should exist");
    assert_eq!(var.dimensions().len(), 1);
    assert_eq!(var.dimensions()[0].name(), "s_rho");
    let read_back: Vec<f64> = var.get_values::<f64, _>(..)?;
    assert_close(
        &ArrayD::from_shape_vec(IxDyn(&[NZ]), read_back)?,
        mean.values(),
        1e-12,
    );

    match var.attribute("long_name").expect("long_name written").value()? {
        AttributeValue::Str(s) => assert_eq!(s, "u-momentum component, grid mean over dim Y, X"),
        other => panic!("Expected string attribute, got {other:?}"),
    }
    match var.attribute("units").expect("units written").value()? {
        AttributeValue::Str(s) => assert_eq!(s, "meter second-1"),
        other => panic!("Expected string attribute, got {other:?}"),
    }
    assert!(written.attribute("history").is_some());

    Ok(())
}
