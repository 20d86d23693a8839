//! Code for reading buses and transmission lines.
use super::*;
use crate::grid::{Bus, Line};

/// A bus as written in the input document
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawBus {
    #[serde(rename = "Load (MW)", default)]
    load: Option<TimeSeries>,
}

/// A transmission line as written in the input document
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawLine {
    #[serde(rename = "Source bus")]
    source_bus: String,
    #[serde(rename = "Target bus")]
    target_bus: String,
    #[serde(rename = "Reactance (ohms)", default)]
    reactance: Option<f64>,
    #[serde(rename = "Susceptance (S)", default)]
    susceptance: Option<f64>,
    #[serde(rename = "Normal flow limit (MW)", default)]
    normal_limit: Option<f64>,
    #[serde(rename = "Emergency flow limit (MW)", default)]
    emergency_limit: Option<f64>,
    #[serde(rename = "Flow limit penalty ($/MW)", default)]
    flow_penalty: Option<f64>,
}

/// Read buses and their fixed loads.
///
/// # Returns
///
/// The buses in document order and, for each, its load in every hour (indexed as `[b][t]`).
pub fn read_buses(
    raw_buses: &IndexMap<String, RawBus>,
    time_horizon: usize,
) -> ScucResult<(Vec<Bus>, Vec<Vec<f64>>)> {
    if raw_buses.is_empty() {
        return Err(ScucError::input("Buses", "at least one bus is required"));
    }

    let mut buses = Vec::with_capacity(raw_buses.len());
    let mut loads = Vec::with_capacity(raw_buses.len());
    for (name, raw) in raw_buses {
        let load = TimeSeries::expand(
            raw.load.as_ref(),
            time_horizon,
            &format!("Buses.{name}.Load (MW)"),
        )?;
        buses.push(Bus {
            id: name.as_str().into(),
        });
        loads.push(load);
    }

    Ok((buses, loads))
}

/// Resolve the reference bus, defaulting to the first bus in the document
pub fn read_reference_bus(
    name: Option<&str>,
    bus_index: &IndexMap<BusID, usize>,
) -> ScucResult<usize> {
    match name {
        None => Ok(0),
        Some(name) => lookup_bus("Parameters.Reference bus", name, bus_index),
    }
}

/// Read transmission lines, filling in missing limits and penalties from `config`
pub fn read_lines(
    raw_lines: &IndexMap<String, RawLine>,
    bus_index: &IndexMap<BusID, usize>,
    config: &ModelConfig,
) -> ScucResult<Vec<Line>> {
    raw_lines
        .iter()
        .map(|(name, raw)| read_line(name, raw, bus_index, config))
        .collect()
}

fn read_line(
    name: &str,
    raw: &RawLine,
    bus_index: &IndexMap<BusID, usize>,
    config: &ModelConfig,
) -> ScucResult<Line> {
    let field = |key: &str| format!("Transmission lines.{name}.{key}");

    let from_bus = lookup_bus(&field("Source bus"), &raw.source_bus, bus_index)?;
    let to_bus = lookup_bus(&field("Target bus"), &raw.target_bus, bus_index)?;
    if from_bus == to_bus {
        return Err(ScucError::input(
            field("Target bus"),
            "source and target buses must differ",
        ));
    }

    let susceptance = match (raw.susceptance, raw.reactance) {
        (Some(susceptance), _) => {
            if !susceptance.is_finite() || susceptance == 0.0 {
                return Err(ScucError::input(
                    field("Susceptance (S)"),
                    "must be a finite, non-zero number",
                ));
            }
            susceptance
        }
        (None, Some(reactance)) => {
            if !reactance.is_finite() || reactance == 0.0 {
                return Err(ScucError::input(
                    field("Reactance (ohms)"),
                    "must be a finite, non-zero number",
                ));
            }
            1.0 / reactance
        }
        (None, None) => {
            return Err(ScucError::input(
                field("Reactance (ohms)"),
                "either a reactance or a susceptance is required",
            ));
        }
    };

    let normal_limit = raw.normal_limit.unwrap_or(config.default_line_limit_mw);
    check_non_negative(&field("Normal flow limit (MW)"), normal_limit)?;
    let emergency_limit = raw.emergency_limit.unwrap_or(normal_limit);
    check_non_negative(&field("Emergency flow limit (MW)"), emergency_limit)?;
    let flow_penalty = raw.flow_penalty.unwrap_or(config.default_flow_penalty);
    check_non_negative(&field("Flow limit penalty ($/MW)"), flow_penalty)?;

    Ok(Line {
        id: name.into(),
        from_bus,
        to_bus,
        susceptance,
        normal_limit,
        emergency_limit,
        flow_penalty,
    })
}
