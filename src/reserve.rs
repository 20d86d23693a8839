//! Spinning reserve requirements.
use crate::id::define_id_type;

define_id_type! {ReserveID}

/// A system-wide reserve requirement
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveRequirement {
    /// Unique identifier
    pub id: ReserveID,
    /// Required amount per hour (MW)
    pub amount: Vec<f64>,
    /// Penalty for unmet reserve ($/MW). Non-positive values make the requirement hard.
    pub shortfall_penalty: f64,
}

impl ReserveRequirement {
    /// Whether the requirement may be violated at a cost
    pub fn shortfall_enabled(&self) -> bool {
        self.shortfall_penalty > 0.0
    }

    /// Whether there is anything to enforce at hour `t`
    pub fn is_active(&self, t: usize) -> bool {
        self.amount[t] > 0.0
    }
}
