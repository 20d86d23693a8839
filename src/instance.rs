//! The fully normalised problem instance consumed by the formulation.
use crate::generator::{ProfiledGenerator, ThermalGenerator};
use crate::grid::{Bus, ContingencyPair, Line};
use crate::load::PriceSensitiveLoad;
use crate::network::NetworkFactors;
use crate::reserve::ReserveRequirement;

/// Everything the model builders need, with defaults applied and factors computed.
///
/// Built once by the [`input`](crate::input) module and only ever read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UCInput {
    /// Number of hours in the horizon
    pub time_horizon: usize,
    /// Index of the reference bus
    pub reference_bus: usize,
    /// All buses
    pub buses: Vec<Bus>,
    /// All transmission lines
    pub lines: Vec<Line>,
    /// Thermal units
    pub thermal_gens: Vec<ThermalGenerator>,
    /// Profiled units
    pub profiled_gens: Vec<ProfiledGenerator>,
    /// Price-sensitive loads
    pub price_sensitive_loads: Vec<PriceSensitiveLoad>,
    /// Reserve requirements
    pub reserves: Vec<ReserveRequirement>,
    /// Fixed demand, indexed as `[t][b]` (MW)
    pub nodal_demand: Vec<Vec<f64>>,
    /// Total fixed demand per hour (MW)
    pub system_demand: Vec<f64>,
    /// Penalty for curtailed load ($/MW)
    pub curtail_penalty: f64,
    /// PTDF and LODF matrices
    pub factors: NetworkFactors,
    /// Lines whose outage is to be checked
    pub contingency_lines: Vec<usize>,
    /// The N-1 pairs kept after preprocessing
    pub relevant_pairs: Vec<ContingencyPair>,
}

impl UCInput {
    /// Iterate over the hours of the horizon
    pub fn hours(&self) -> std::ops::Range<usize> {
        0..self.time_horizon
    }

    /// Indices of the thermal units that may contribute to the given reserve requirement
    pub fn eligible_units(&self, reserve: usize) -> impl Iterator<Item = usize> + '_ {
        self.thermal_gens
            .iter()
            .enumerate()
            .filter(move |(_, unit)| unit.reserves.contains(&reserve))
            .map(|(g, _)| g)
    }
}
