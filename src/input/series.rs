//! Time series fields, which may be given as null, a scalar or a per-hour array.
use crate::error::{ScucError, ScucResult};
use serde::Deserialize;

/// A time series as written in the input document.
///
/// A missing or `null` field is represented by `None` at the use site.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimeSeries {
    /// The same value in every hour
    Scalar(f64),
    /// One value per hour
    Array(Vec<f64>),
}

impl TimeSeries {
    /// Expand into one value per hour.
    ///
    /// # Arguments
    ///
    /// * `series` - The value from the document (`None` for null or missing)
    /// * `time_horizon` - Number of hours
    /// * `field` - Path of the field, for error messages
    pub fn expand(
        series: Option<&TimeSeries>,
        time_horizon: usize,
        field: &str,
    ) -> ScucResult<Vec<f64>> {
        let values = match series {
            None => vec![0.0; time_horizon],
            Some(TimeSeries::Scalar(value)) => vec![*value; time_horizon],
            Some(TimeSeries::Array(values)) => {
                if values.len() != time_horizon {
                    return Err(ScucError::DimensionMismatch {
                        field: field.to_string(),
                        expected: time_horizon,
                        found: values.len(),
                    });
                }
                values.clone()
            }
        };

        if let Some(value) = values.iter().find(|x| !x.is_finite()) {
            return Err(ScucError::input(field, format!("{value} is not a finite number")));
        }

        Ok(values)
    }
}

/// Expand a per-hour array of optional values, checking its length
pub fn expand_optional<T: Clone>(
    values: Option<&Vec<Option<T>>>,
    time_horizon: usize,
    field: &str,
) -> ScucResult<Vec<Option<T>>> {
    match values {
        None => Ok(Vec::new()),
        Some(values) if values.len() == time_horizon => Ok(values.clone()),
        Some(values) => Err(ScucError::DimensionMismatch {
            field: field.to_string(),
            expected: time_horizon,
            found: values.len(),
        }),
    }
}
