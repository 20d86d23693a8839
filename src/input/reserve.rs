//! Code for reading reserve requirements.
use super::*;
use crate::reserve::ReserveRequirement;

/// Shortfall penalty used when none is given, making the requirement hard
const DEFAULT_SHORTFALL_PENALTY: f64 = -1.0;

/// A reserve requirement as written in the input document
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawReserve {
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "Amount (MW)", default)]
    amount: Option<TimeSeries>,
    #[serde(rename = "Shortfall penalty ($/MW)", default)]
    shortfall_penalty: Option<f64>,
}

/// Read reserve requirements. Only spinning reserve is supported.
pub fn read_reserves(
    raw_reserves: &IndexMap<String, RawReserve>,
    time_horizon: usize,
) -> ScucResult<Vec<ReserveRequirement>> {
    raw_reserves
        .iter()
        .map(|(name, raw)| {
            let field = |key: &str| format!("Reserves.{name}.{key}");
            match raw.kind.as_deref() {
                None => {}
                Some(kind) if kind.eq_ignore_ascii_case("spinning") => {}
                Some(kind) => {
                    return Err(ScucError::input(
                        field("Type"),
                        format!("unsupported reserve type `{kind}`"),
                    ));
                }
            }

            let amount =
                TimeSeries::expand(raw.amount.as_ref(), time_horizon, &field("Amount (MW)"))?;
            for &value in &amount {
                check_non_negative(&field("Amount (MW)"), value)?;
            }

            let shortfall_penalty = raw.shortfall_penalty.unwrap_or(DEFAULT_SHORTFALL_PENALTY);
            if !shortfall_penalty.is_finite() {
                return Err(ScucError::input(
                    field("Shortfall penalty ($/MW)"),
                    "must be finite",
                ));
            }

            Ok(ReserveRequirement {
                id: name.as_str().into(),
                amount,
                shortfall_penalty,
            })
        })
        .collect()
}
