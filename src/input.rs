//! Common routines for handling input data.
//!
//! The input document is JSON. It is read into raw `serde` structs which mirror the document
//! layout, then normalised into a [`UCInput`], which is what the formulation works with.
use crate::config::ModelConfig;
use crate::error::{ScucError, ScucResult};
use crate::grid::BusID;
use crate::instance::UCInput;
use crate::network::NetworkFactors;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

mod contingency;
use contingency::{RawContingency, preprocess_contingencies, read_contingency_lines};
mod generator;
use generator::{RawGenerator, read_generators};
mod load;
use load::{RawPriceSensitiveLoad, read_price_sensitive_loads};
mod network;
use network::{RawBus, RawLine, read_buses, read_lines, read_reference_bus};
mod reserve;
use reserve::{RawReserve, read_reserves};
mod series;
pub use series::TimeSeries;

/// Read a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().to_string_lossy())
}

/// The `Parameters` section of the input document
#[derive(Debug, Deserialize, PartialEq)]
struct RawParameters {
    #[serde(rename = "Time horizon (h)")]
    time_horizon: usize,
    #[serde(rename = "Reference bus", default)]
    reference_bus: Option<String>,
    #[serde(rename = "Power balance penalty ($/MW)", default)]
    power_balance_penalty: Option<f64>,
}

/// The whole input document
#[derive(Debug, Deserialize, PartialEq)]
struct InputDocument {
    #[serde(rename = "Parameters")]
    parameters: RawParameters,
    #[serde(rename = "Buses")]
    buses: IndexMap<String, RawBus>,
    #[serde(rename = "Transmission lines", default)]
    lines: IndexMap<String, RawLine>,
    #[serde(rename = "Generators", default)]
    generators: IndexMap<String, RawGenerator>,
    #[serde(rename = "Price-sensitive loads", default)]
    price_sensitive_loads: IndexMap<String, RawPriceSensitiveLoad>,
    #[serde(rename = "Reserves", default)]
    reserves: IndexMap<String, RawReserve>,
    #[serde(rename = "Contingencies", default)]
    contingencies: IndexMap<String, RawContingency>,
}

/// Read and normalise the input document at the given path.
///
/// # Arguments
///
/// * `file_path` - Path to the JSON input document
/// * `config` - Defaults and network factor options
///
/// # Returns
///
/// The normalised problem instance or an error identifying the offending field.
pub fn load_input(file_path: &Path, config: &ModelConfig) -> Result<UCInput> {
    let json = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let input = parse_input(&json, config).with_context(|| input_err_msg(file_path))?;
    info!(
        "Loaded {} buses, {} lines, {} thermal units and {} profiled units over {} hours",
        input.buses.len(),
        input.lines.len(),
        input.thermal_gens.len(),
        input.profiled_gens.len(),
        input.time_horizon
    );

    Ok(input)
}

/// Parse and normalise an input document held in memory
pub fn parse_input(json: &str, config: &ModelConfig) -> ScucResult<UCInput> {
    let doc: InputDocument =
        serde_json::from_str(json).map_err(|err| ScucError::input("document", err.to_string()))?;

    let time_horizon = doc.parameters.time_horizon;
    if time_horizon == 0 {
        return Err(ScucError::input(
            "Parameters.Time horizon (h)",
            "must be at least one hour",
        ));
    }

    let curtail_penalty = match doc.parameters.power_balance_penalty {
        Some(penalty) if !penalty.is_finite() || penalty < 0.0 => {
            return Err(ScucError::input(
                "Parameters.Power balance penalty ($/MW)",
                "must be a finite, non-negative number",
            ));
        }
        Some(penalty) => penalty,
        None => config.curtail_penalty,
    };

    let (buses, bus_loads) = read_buses(&doc.buses, time_horizon)?;
    let bus_index = crate::id::index_by_id(buses.iter().map(|bus| &bus.id));
    let reference_bus = read_reference_bus(doc.parameters.reference_bus.as_deref(), &bus_index)?;
    let lines = read_lines(&doc.lines, &bus_index, config)?;

    let reserves = read_reserves(&doc.reserves, time_horizon)?;
    let reserve_index = crate::id::index_by_id(reserves.iter().map(|reserve| &reserve.id));
    let (thermal_gens, profiled_gens) =
        read_generators(&doc.generators, &bus_index, &reserve_index, time_horizon)?;
    let price_sensitive_loads =
        read_price_sensitive_loads(&doc.price_sensitive_loads, &bus_index, time_horizon)?;

    // Transpose bus loads into [t][b] and total them
    let nodal_demand: Vec<Vec<f64>> = (0..time_horizon)
        .map(|t| bus_loads.iter().map(|load| load[t]).collect())
        .collect();
    let system_demand = nodal_demand.iter().map(|loads| loads.iter().sum()).collect();

    let factors = NetworkFactors::compute(buses.len(), &lines, reference_bus, config)?;
    let line_index = crate::id::index_by_id(lines.iter().map(|line| &line.id));
    let contingency_lines = read_contingency_lines(&doc.contingencies, &line_index)?;
    let relevant_pairs = preprocess_contingencies(
        &lines,
        &contingency_lines,
        &factors,
        config.islanding_outages,
    )?;
    debug!(
        "{} contingencies give {} relevant N-1 pairs",
        contingency_lines.len(),
        relevant_pairs.len()
    );

    Ok(UCInput {
        time_horizon,
        reference_bus,
        buses,
        lines,
        thermal_gens,
        profiled_gens,
        price_sensitive_loads,
        reserves,
        nodal_demand,
        system_demand,
        curtail_penalty,
        factors,
        contingency_lines,
        relevant_pairs,
    })
}

/// Check that a number is finite and non-negative
fn check_non_negative(field: &str, value: f64) -> ScucResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScucError::input(
            field,
            format!("expected a finite, non-negative number, got {value}"),
        ));
    }

    Ok(())
}

/// Resolve a bus name to its index
fn lookup_bus(field: &str, name: &str, bus_index: &IndexMap<BusID, usize>) -> ScucResult<usize> {
    bus_index
        .get(name)
        .copied()
        .ok_or_else(|| ScucError::input(field, format!("unknown bus `{name}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, single_bus_json};
    use float_cmp::assert_approx_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_parse_single_bus() {
        let input = parse_input(&single_bus_json(), &ModelConfig::default()).unwrap();
        assert_eq!(input.time_horizon, 2);
        assert_eq!(input.buses.len(), 1);
        assert_eq!(input.thermal_gens.len(), 1);
        assert_eq!(input.system_demand, [50.0, 50.0]);
        assert_eq!(input.nodal_demand, [[50.0], [50.0]]);
        assert_approx_eq!(f64, input.curtail_penalty, 100_000.0);
        assert!(input.relevant_pairs.is_empty());
    }

    #[test]
    fn test_parse_power_balance_penalty() {
        let json = r#"{
            "Parameters": {"Time horizon (h)": 1, "Power balance penalty ($/MW)": 500},
            "Buses": {"b1": {"Load (MW)": 10}}
        }"#;
        let input = parse_input(json, &ModelConfig::default()).unwrap();
        assert_approx_eq!(f64, input.curtail_penalty, 500.0);
    }

    #[test]
    fn test_parse_zero_horizon() {
        let json = r#"{"Parameters": {"Time horizon (h)": 0}, "Buses": {"b1": {}}}"#;
        assert!(matches!(
            parse_input(json, &ModelConfig::default()),
            Err(ScucError::InputFormat { .. })
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_input("{", &ModelConfig::default()),
            Err(ScucError::InputFormat { .. })
        ));
        assert!(matches!(
            parse_input(r#"{"Buses": {}}"#, &ModelConfig::default()),
            Err(ScucError::InputFormat { .. })
        ));
    }

    #[test]
    fn test_load_input() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("input.json");
        {
            let mut file = File::create(&file_path).unwrap();
            write!(file, "{}", single_bus_json()).unwrap();
        }

        let input = load_input(&file_path, &ModelConfig::default()).unwrap();
        assert_eq!(input.thermal_gens[0].id.to_string(), "g1");
    }

    #[test]
    fn test_load_input_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.json");
        assert_error!(
            load_input(&file_path, &ModelConfig::default()),
            input_err_msg(&file_path)
        );
    }
}
