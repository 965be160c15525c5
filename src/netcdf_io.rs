//! NetCDF I/O for ROMS fields and grids
//!
//! This module loads model variables as labeled [`Field`]s, builds a
//! [`RomsGrid`] from the grid variables of a ROMS history or grid file, and
//! writes reduction results back out with their metadata.

use crate::errors::{GridCalcError, Result};
use crate::field::Field;
use crate::grid::RomsGrid;
use crate::metadata::Metadata;
use chrono::Utc;
use ndarray::{Array1, Array2, Array3, ArrayD, Ix1, Ix2, Ix3};
use netcdf::{create, AttributeValue, File};
use serde_json::{json, Value as JsonValue};
use std::{fs, path::Path};

/// Reads a variable as a field.
///
/// `units`, `long_name` and `name` attributes fill the matching metadata
/// entries, other string and numeric attributes land in `extra`. Values equal
/// to `_FillValue` or `missing_value` become NaN.
pub fn read_field(file: &File, var_name: &str) -> Result<Field> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| GridCalcError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var
        .dimensions()
        .iter()
        .map(netcdf::Dimension::len)
        .collect();
    let mut data = var.get_values::<f64, _>(..)?;

    let mut record = Metadata::new();
    let mut fill_values = Vec::new();
    for attr in var.attributes() {
        let value = attr.value()?;
        match attr.name() {
            "_FillValue" | "missing_value" => {
                if let Some(fv) = attribute_to_json(value).and_then(|v| v.as_f64()) {
                    fill_values.push(fv);
                }
            }
            "units" => record.units = attribute_to_string(value),
            "long_name" => record.long_name = attribute_to_string(value),
            "name" => record.name = attribute_to_string(value),
            other => {
                if let Some(json) = attribute_to_json(value) {
                    record.extra.insert(other.to_string(), json);
                }
            }
        }
    }

    if !fill_values.is_empty() {
        for v in &mut data {
            if fill_values.contains(v) {
                *v = f64::NAN;
            }
        }
    }

    let values = ArrayD::from_shape_vec(shape, data)?;
    Ok(Field::new(values, dims)?
        .with_name(var_name)
        .with_attrs(record))
}

/// Builds a ROMS grid from `pm`/`pn` and either a `dz` variable or the
/// bathymetry `h` with the s-coordinate variables `s_w`, `Cs_w`, `hc` and
/// `Vtransform` (1 if absent).
pub fn read_grid(file: &File) -> Result<RomsGrid> {
    let pm: Array2<f64> = read_array(file, "pm")?.into_dimensionality::<Ix2>()?;
    let pn: Array2<f64> = read_array(file, "pn")?.into_dimensionality::<Ix2>()?;
    let dx = pm.mapv(|v| 1.0 / v);
    let dy = pn.mapv(|v| 1.0 / v);

    if file.variable("dz").is_some() {
        let dz: Array3<f64> = read_array(file, "dz")?.into_dimensionality::<Ix3>()?;
        return RomsGrid::new(dx, dy, dz);
    }

    let h: Array2<f64> = read_array(file, "h")?.into_dimensionality::<Ix2>()?;
    let s_w: Array1<f64> = read_array(file, "s_w")?.into_dimensionality::<Ix1>()?;
    let cs_w: Array1<f64> = read_array(file, "Cs_w")?.into_dimensionality::<Ix1>()?;
    let hc = read_scalar(file, "hc")?;
    let vtransform = if file.variable("Vtransform").is_some() {
        read_scalar(file, "Vtransform")?
    } else {
        1.0
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let vtransform = vtransform.round() as u8;
    RomsGrid::from_depths(dx, dy, &h, &s_w, &cs_w, hc, vtransform)
}

fn read_array(file: &File, var_name: &str) -> Result<ArrayD<f64>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| GridCalcError::VariableNotFound {
            var: var_name.to_string(),
        })?;
    let shape: Vec<usize> = var
        .dimensions()
        .iter()
        .map(netcdf::Dimension::len)
        .collect();
    let data = var.get_values::<f64, _>(..)?;
    Ok(ArrayD::from_shape_vec(shape, data)?)
}

fn read_scalar(file: &File, var_name: &str) -> Result<f64> {
    read_array(file, var_name)?
        .iter()
        .next()
        .copied()
        .ok_or_else(|| GridCalcError::Generic(format!("Variable '{var_name}' holds no value")))
}

fn attribute_to_string(value: AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Str(s) => Some(s),
        other => attribute_to_json(other).map(|v| v.to_string()),
    }
}

fn attribute_to_json(value: AttributeValue) -> Option<JsonValue> {
    match value {
        AttributeValue::Str(s) => Some(JsonValue::String(s)),
        AttributeValue::Strs(ss) => Some(json!(ss)),
        AttributeValue::Float(v) => Some(json!(f64::from(v))),
        AttributeValue::Floats(vs) => Some(json!(vs.into_iter().map(f64::from).collect::<Vec<_>>())),
        AttributeValue::Double(v) => Some(json!(v)),
        AttributeValue::Doubles(vs) => Some(json!(vs)),
        AttributeValue::Int(v) => Some(json!(v)),
        AttributeValue::Ints(vs) => Some(json!(vs)),
        AttributeValue::Short(v) => Some(json!(v)),
        AttributeValue::Shorts(vs) => Some(json!(vs)),
        AttributeValue::Uchar(v) => Some(json!(v)),
        AttributeValue::Ushort(v) => Some(json!(v)),
        AttributeValue::Uint(v) => Some(json!(v)),
        _ => None,
    }
}

/// Writer for reduction results
pub struct GridResultWriter<'a> {
    output_path: &'a Path,
}

impl<'a> GridResultWriter<'a> {
    /// Create a new writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write `field` as variable `var_name`, replacing any existing file.
    ///
    /// Metadata entries become variable attributes; the grid handle is
    /// recorded by its description only.
    pub fn write_result(&self, field: &Field, var_name: &str) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;

        for (dim_name, &dim_len) in field.dims().iter().zip(field.shape()) {
            file.add_dimension(dim_name, dim_len)?;
        }

        let dim_refs: Vec<&str> = field.dims().iter().map(String::as_str).collect();
        let mut new_var = file.add_variable::<f64>(var_name, &dim_refs)?;
        new_var.put_attribute("_FillValue", f64::NAN)?;

        if let Some(record) = field.attrs() {
            for (key, value) in record.attributes() {
                match value {
                    JsonValue::String(s) => {
                        new_var.put_attribute(&key, s)?;
                    }
                    JsonValue::Number(n) => {
                        if let Some(v) = n.as_f64() {
                            new_var.put_attribute(&key, v)?;
                        }
                    }
                    JsonValue::Bool(b) => {
                        new_var.put_attribute(&key, b.to_string())?;
                    }
                    _ => {
                        println!("⚠ Skipped unsupported attribute type for '{}'", key);
                    }
                }
            }
            if let Some(grid) = &record.grid {
                new_var.put_attribute("grid", format!("{grid:?}"))?;
            }
        }

        new_var.put(field.values().view(), ..)?;

        file.add_attribute(
            "history",
            format!("Created by roms_gridcalc on {}", Utc::now().to_rfc3339()),
        )?;

        Ok(())
    }
}

/// Lists all variables with their dimensions and key attributes.
pub fn list_variables(file: &File) -> Result<()> {
    println!("\n Variables");
    println!("=============");

    let mut variables: Vec<_> = file.variables().collect();
    variables.sort_by_key(|v| v.name().to_string());

    if variables.is_empty() {
        println!("   (No variables found)");
        return Ok(());
    }

    for var in variables {
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| format!("{}[{}]", d.name(), d.len()))
            .collect();
        if dims.is_empty() {
            println!("    {}: scalar", var.name());
        } else {
            println!("    {} ({})", var.name(), dims.join(", "));
        }

        if let Some(units) = var
            .attribute("units")
            .and_then(|a| a.value().ok())
            .and_then(attribute_to_string)
        {
            println!("      └─ units: {}", units);
        }
    }

    println!("\n💡 Tip: Use --gridmean <variable>:<axes> to average over grid axes, e.g. u:Y,X");

    Ok(())
}
