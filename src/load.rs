//! Price-sensitive loads.
use crate::id::define_id_type;

define_id_type! {LoadID}

/// A load that is served only when its revenue covers the cost of supplying it
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSensitiveLoad {
    /// Unique identifier
    pub id: LoadID,
    /// Index of the bus the load is connected to
    pub bus: usize,
    /// Maximum demand per hour (MW)
    pub demand: Vec<f64>,
    /// Revenue per hour for each MW served ($/MW)
    pub revenue: Vec<f64>,
}
