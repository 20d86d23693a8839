//! Code for reading thermal and profiled generators.
use super::series::expand_optional;
use super::*;
use crate::generator::{
    CostSegment, Generator, ProfiledGenerator, StartupStage, ThermalGenerator,
};
use crate::reserve::ReserveID;
use itertools::Itertools;
use log::warn;

/// The kind of generator, given by the `Type` field
#[derive(Debug, Default, Deserialize, PartialEq, Clone, Copy)]
enum GeneratorType {
    #[default]
    Thermal,
    Profiled,
}

/// A generator as written in the input document.
///
/// Fields which only apply to one type of unit are optional here and checked when the generator
/// is converted.
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawGenerator {
    #[serde(rename = "Bus")]
    bus: String,
    #[serde(rename = "Type", default)]
    kind: GeneratorType,
    #[serde(rename = "Production cost curve (MW)", default)]
    cost_curve_mw: Vec<f64>,
    #[serde(rename = "Production cost curve ($)", default)]
    cost_curve_dollars: Vec<f64>,
    #[serde(rename = "Startup delays (h)", default)]
    startup_delays: Option<Vec<u32>>,
    #[serde(rename = "Startup costs ($)", default)]
    startup_costs: Option<Vec<f64>>,
    #[serde(rename = "Ramp up limit (MW)", default)]
    ramp_up: Option<f64>,
    #[serde(rename = "Ramp down limit (MW)", default)]
    ramp_down: Option<f64>,
    #[serde(rename = "Startup limit (MW)", default)]
    startup_limit: Option<f64>,
    #[serde(rename = "Shutdown limit (MW)", default)]
    shutdown_limit: Option<f64>,
    #[serde(rename = "Minimum uptime (h)", default)]
    min_uptime: Option<u32>,
    #[serde(rename = "Minimum downtime (h)", default)]
    min_downtime: Option<u32>,
    #[serde(rename = "Initial status (h)", default)]
    initial_status: Option<i32>,
    #[serde(rename = "Initial power (MW)", default)]
    initial_power: Option<f64>,
    #[serde(rename = "Must run?", default)]
    must_run: bool,
    #[serde(rename = "Reserve eligibility", default)]
    reserve_eligibility: Vec<String>,
    #[serde(rename = "Commitment status", default)]
    commitment_status: Option<Vec<Option<bool>>>,
    #[serde(rename = "Minimum power (MW)", default)]
    min_power: Option<TimeSeries>,
    #[serde(rename = "Maximum power (MW)", default)]
    max_power: Option<TimeSeries>,
    #[serde(rename = "Cost ($/MW)", default)]
    cost: Option<f64>,
}

/// Read all generators, split by kind.
///
/// # Arguments
///
/// * `raw_generators` - Generators from the input document
/// * `bus_index` - Lookup from bus name to index
/// * `reserve_index` - Lookup from reserve name to index
/// * `time_horizon` - Number of hours
pub fn read_generators(
    raw_generators: &IndexMap<String, RawGenerator>,
    bus_index: &IndexMap<BusID, usize>,
    reserve_index: &IndexMap<ReserveID, usize>,
    time_horizon: usize,
) -> ScucResult<(Vec<ThermalGenerator>, Vec<ProfiledGenerator>)> {
    let mut thermal_gens = Vec::new();
    let mut profiled_gens = Vec::new();
    for (name, raw) in raw_generators {
        match read_generator(name, raw, bus_index, reserve_index, time_horizon)? {
            Generator::Thermal(unit) => thermal_gens.push(unit),
            Generator::Profiled(unit) => profiled_gens.push(unit),
        }
    }

    Ok((thermal_gens, profiled_gens))
}

fn read_generator(
    name: &str,
    raw: &RawGenerator,
    bus_index: &IndexMap<BusID, usize>,
    reserve_index: &IndexMap<ReserveID, usize>,
    time_horizon: usize,
) -> ScucResult<Generator> {
    let field = |key: &str| format!("Generators.{name}.{key}");
    let bus = lookup_bus(&field("Bus"), &raw.bus, bus_index)?;

    match raw.kind {
        GeneratorType::Thermal => Ok(Generator::Thermal(read_thermal(
            name,
            raw,
            bus,
            reserve_index,
            time_horizon,
            &field,
        )?)),
        GeneratorType::Profiled => Ok(Generator::Profiled(read_profiled(
            name,
            raw,
            bus,
            time_horizon,
            &field,
        )?)),
    }
}

fn read_thermal(
    name: &str,
    raw: &RawGenerator,
    bus: usize,
    reserve_index: &IndexMap<ReserveID, usize>,
    time_horizon: usize,
    field: &dyn Fn(&str) -> String,
) -> ScucResult<ThermalGenerator> {
    let (p_min, p_max, no_load_cost, cost_segments) = read_cost_curve(
        &raw.cost_curve_mw,
        &raw.cost_curve_dollars,
        &field("Production cost curve (MW)"),
    )?;
    let startup_stages = read_startup_stages(
        raw.startup_delays.as_deref().unwrap_or(&[1]),
        raw.startup_costs.as_deref().unwrap_or(&[0.0]),
        &field("Startup delays (h)"),
    )?;

    let limit = |key: &str, value: Option<f64>| -> ScucResult<f64> {
        let value = value.unwrap_or(p_max);
        check_non_negative(&field(key), value)?;
        Ok(value)
    };
    let ramp_up = limit("Ramp up limit (MW)", raw.ramp_up)?;
    let ramp_down = limit("Ramp down limit (MW)", raw.ramp_down)?;
    let startup_limit = limit("Startup limit (MW)", raw.startup_limit)?;
    let shutdown_limit = limit("Shutdown limit (MW)", raw.shutdown_limit)?;

    let initial_status = match raw.initial_status {
        None => return Err(ScucError::input(field("Initial status (h)"), "is required")),
        Some(0) => {
            return Err(ScucError::input(
                field("Initial status (h)"),
                "must be non-zero",
            ));
        }
        Some(status) => status,
    };
    let initial_power = raw
        .initial_power
        .ok_or_else(|| ScucError::input(field("Initial power (MW)"), "is required"))?;
    check_non_negative(&field("Initial power (MW)"), initial_power)?;
    if initial_status < 0 && initial_power > 0.0 {
        return Err(ScucError::input(
            field("Initial power (MW)"),
            "must be zero for a unit which is initially off",
        ));
    }
    if initial_power > p_max {
        return Err(ScucError::input(
            field("Initial power (MW)"),
            format!("{initial_power} exceeds the maximum power of {p_max}"),
        ));
    }

    let reserves = raw
        .reserve_eligibility
        .iter()
        .map(|reserve| {
            reserve_index.get(reserve.as_str()).copied().ok_or_else(|| {
                ScucError::input(
                    field("Reserve eligibility"),
                    format!("unknown reserve `{reserve}`"),
                )
            })
        })
        .collect::<ScucResult<Vec<_>>>()?;

    let commitment_status = expand_optional(
        raw.commitment_status.as_ref(),
        time_horizon,
        &field("Commitment status"),
    )?;
    if raw.must_run && commitment_status.contains(&Some(false)) {
        warn!("Must-run unit {name} has hours fixed off; the problem will be infeasible");
    }

    Ok(ThermalGenerator {
        id: name.into(),
        bus,
        p_min,
        p_max,
        ramp_up,
        ramp_down,
        startup_limit,
        shutdown_limit,
        min_uptime: raw.min_uptime.unwrap_or(1),
        min_downtime: raw.min_downtime.unwrap_or(1),
        no_load_cost,
        must_run: raw.must_run,
        initial_status,
        initial_power,
        cost_segments,
        startup_stages,
        commitment_status,
        reserves,
    })
}

/// Convert a cumulative cost curve into minimum/maximum power, no-load cost and segments.
///
/// The first point gives minimum power and the cost of running there. Segments of zero width
/// are dropped.
fn read_cost_curve(
    mw: &[f64],
    dollars: &[f64],
    field: &str,
) -> ScucResult<(f64, f64, f64, Vec<CostSegment>)> {
    if mw.is_empty() {
        return Err(ScucError::input(field, "at least one point is required"));
    }
    if mw.len() != dollars.len() {
        return Err(ScucError::input(
            field,
            format!(
                "has {} points but the cost curve has {}",
                mw.len(),
                dollars.len()
            ),
        ));
    }
    for &value in mw.iter().chain(dollars) {
        check_non_negative(field, value)?;
    }
    if mw.iter().tuple_windows().any(|(a, b)| b < a) {
        return Err(ScucError::input(field, "points must be non-decreasing"));
    }

    let segments = mw
        .iter()
        .zip(dollars)
        .tuple_windows()
        .filter(|((p0, _), (p1, _))| p1 > p0)
        .map(|((p0, c0), (p1, c1))| CostSegment {
            length: p1 - p0,
            slope: (c1 - c0) / (p1 - p0),
        })
        .collect();

    Ok((mw[0], mw[mw.len() - 1], dollars[0], segments))
}

/// Pair startup delays with costs, checking the delays are strictly increasing from one hour
fn read_startup_stages(
    delays: &[u32],
    costs: &[f64],
    field: &str,
) -> ScucResult<Vec<StartupStage>> {
    if delays.is_empty() || delays.len() != costs.len() {
        return Err(ScucError::input(
            field,
            "must be non-empty and match the number of startup costs",
        ));
    }
    if delays[0] < 1 || delays.iter().tuple_windows().any(|(a, b)| b <= a) {
        return Err(ScucError::input(
            field,
            "delays must be at least one hour and strictly increasing",
        ));
    }
    for &cost in costs {
        check_non_negative(field, cost)?;
    }

    Ok(delays
        .iter()
        .zip(costs)
        .map(|(&delay, &cost)| StartupStage { delay, cost })
        .collect())
}

fn read_profiled(
    name: &str,
    raw: &RawGenerator,
    bus: usize,
    time_horizon: usize,
    field: &dyn Fn(&str) -> String,
) -> ScucResult<ProfiledGenerator> {
    if raw.max_power.is_none() {
        return Err(ScucError::input(field("Maximum power (MW)"), "is required"));
    }
    let p_min = TimeSeries::expand(
        raw.min_power.as_ref(),
        time_horizon,
        &field("Minimum power (MW)"),
    )?;
    let p_max = TimeSeries::expand(
        raw.max_power.as_ref(),
        time_horizon,
        &field("Maximum power (MW)"),
    )?;
    for (t, (&lower, &upper)) in p_min.iter().zip(&p_max).enumerate() {
        if lower < 0.0 || upper < lower {
            return Err(ScucError::input(
                field("Maximum power (MW)"),
                format!("hour {t}: need 0 <= minimum ({lower}) <= maximum ({upper})"),
            ));
        }
    }

    let cost = raw.cost.unwrap_or(0.0);
    if !cost.is_finite() {
        return Err(ScucError::input(field("Cost ($/MW)"), "must be finite"));
    }

    Ok(ProfiledGenerator {
        id: name.into(),
        bus,
        p_min,
        p_max,
        cost,
    })
}
