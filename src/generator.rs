//! Thermal and profiled generating units.
use crate::id::define_id_type;

define_id_type! {GeneratorID}

/// Piecewise-linear production cost segment above minimum power
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostSegment {
    /// Width of the segment (MW)
    pub length: f64,
    /// Marginal cost within the segment ($/MW)
    pub slope: f64,
}

/// Startup cost category: applies when the unit has been off for at least `delay` hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartupStage {
    /// Hours offline before this category applies
    pub delay: u32,
    /// Cost of a startup in this category ($)
    pub cost: f64,
}

/// A thermal unit with commitment decisions
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalGenerator {
    /// Unique identifier
    pub id: GeneratorID,
    /// Index of the bus the unit is connected to
    pub bus: usize,
    /// Minimum output when committed (MW)
    pub p_min: f64,
    /// Maximum output (MW)
    pub p_max: f64,
    /// Maximum increase in output between consecutive hours (MW)
    pub ramp_up: f64,
    /// Maximum decrease in output between consecutive hours (MW)
    pub ramp_down: f64,
    /// Maximum output in the hour the unit starts (MW)
    pub startup_limit: f64,
    /// Maximum output in the hour before the unit shuts down (MW)
    pub shutdown_limit: f64,
    /// Minimum hours online once started
    pub min_uptime: u32,
    /// Minimum hours offline once shut down
    pub min_downtime: u32,
    /// Cost of running at minimum output for one hour ($)
    pub no_load_cost: f64,
    /// Whether the unit must be committed in every hour
    pub must_run: bool,
    /// Positive: hours already online. Negative: hours already offline.
    pub initial_status: i32,
    /// Output in the hour before the horizon starts (MW)
    pub initial_power: f64,
    /// Cost segments ordered by marginal cost
    pub cost_segments: Vec<CostSegment>,
    /// Startup categories ordered by delay
    pub startup_stages: Vec<StartupStage>,
    /// Pinned commitment per hour (empty when there is no schedule)
    pub commitment_status: Vec<Option<bool>>,
    /// Indices of the reserve requirements the unit may contribute to
    pub reserves: Vec<usize>,
}

impl ThermalGenerator {
    /// Whether the unit was online in the hour before the horizon
    pub fn initially_on(&self) -> bool {
        self.initial_status > 0
    }

    /// Range of output above minimum power (MW)
    pub fn headroom(&self) -> f64 {
        self.p_max - self.p_min
    }

    /// The pinned commitment for hour `t`, if any
    pub fn fixed_commitment(&self, t: usize) -> Option<bool> {
        self.commitment_status.get(t).copied().flatten()
    }

    /// Whether the unit can provide reserve
    pub fn is_reserve_eligible(&self) -> bool {
        !self.reserves.is_empty()
    }

    /// Whether ramp-up or startup limits can ever bind
    pub fn has_binding_ramp_up(&self) -> bool {
        self.ramp_up < self.p_max || self.startup_limit < self.p_max
    }

    /// Whether ramp-down or shutdown limits can ever bind
    pub fn has_binding_ramp_down(&self) -> bool {
        self.ramp_down < self.p_max || self.shutdown_limit < self.p_max
    }
}

/// A unit whose output is bounded by exogenous time series (e.g. wind or solar)
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledGenerator {
    /// Unique identifier
    pub id: GeneratorID,
    /// Index of the bus the unit is connected to
    pub bus: usize,
    /// Minimum output per hour (MW)
    pub p_min: Vec<f64>,
    /// Maximum output per hour (MW)
    pub p_max: Vec<f64>,
    /// Cost of production ($/MW)
    pub cost: f64,
}

/// The closed set of generator kinds read from the input document
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    /// A thermal unit
    Thermal(ThermalGenerator),
    /// A profiled unit
    Profiled(ProfiledGenerator),
}
