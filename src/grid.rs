//! Buses, transmission lines and N-1 contingency pairs.
use crate::id::define_id_type;

define_id_type! {BusID}
define_id_type! {LineID}

/// A network bus. Its index is its position in [`UCInput::buses`](crate::instance::UCInput).
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    /// Unique identifier
    pub id: BusID,
}

/// A transmission line with all limits and penalties resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Unique identifier
    pub id: LineID,
    /// Index of the source bus
    pub from_bus: usize,
    /// Index of the target bus
    pub to_bus: usize,
    /// Series susceptance
    pub susceptance: f64,
    /// Flow limit in the base case (MW)
    pub normal_limit: f64,
    /// Flow limit after a contingency (MW)
    pub emergency_limit: f64,
    /// Penalty for exceeding either limit ($/MW)
    pub flow_penalty: f64,
}

/// A single N-1 scenario to enforce: the flow on `monitored` after `outaged` trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContingencyPair {
    /// Index of the outaged line
    pub outaged: usize,
    /// Index of the monitored line
    pub monitored: usize,
}
