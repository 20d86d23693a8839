//! Code for reading price-sensitive loads.
use super::*;
use crate::load::PriceSensitiveLoad;

/// A price-sensitive load as written in the input document
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawPriceSensitiveLoad {
    #[serde(rename = "Bus")]
    bus: String,
    #[serde(rename = "Demand (MW)", default)]
    demand: Option<TimeSeries>,
    #[serde(rename = "Revenue ($/MW)", default)]
    revenue: Option<TimeSeries>,
}

/// Read price-sensitive loads, resolving their buses
pub fn read_price_sensitive_loads(
    raw_loads: &IndexMap<String, RawPriceSensitiveLoad>,
    bus_index: &IndexMap<BusID, usize>,
    time_horizon: usize,
) -> ScucResult<Vec<PriceSensitiveLoad>> {
    raw_loads
        .iter()
        .map(|(name, raw)| {
            let field = |key: &str| format!("Price-sensitive loads.{name}.{key}");
            let bus = lookup_bus(&field("Bus"), &raw.bus, bus_index)?;
            let demand =
                TimeSeries::expand(raw.demand.as_ref(), time_horizon, &field("Demand (MW)"))?;
            for &value in &demand {
                check_non_negative(&field("Demand (MW)"), value)?;
            }
            let revenue = TimeSeries::expand(
                raw.revenue.as_ref(),
                time_horizon,
                &field("Revenue ($/MW)"),
            )?;

            Ok(PriceSensitiveLoad {
                id: name.as_str().into(),
                bus,
                demand,
                revenue,
            })
        })
        .collect()
}
