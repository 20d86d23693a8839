//! Code for reading contingencies and selecting the N-1 pairs to enforce.
use super::*;
use crate::config::IslandingPolicy;
use crate::grid::{ContingencyPair, Line, LineID};
use log::warn;

/// A contingency as written in the input document
#[derive(Debug, Deserialize, PartialEq)]
pub struct RawContingency {
    #[serde(rename = "Affected lines", default)]
    affected_lines: Vec<String>,
    #[serde(rename = "Affected generators", default)]
    affected_generators: Vec<String>,
}

/// Resolve contingencies to the indices of their outaged lines.
///
/// Each contingency must take out exactly one line. Generator outages are not modelled, so
/// contingencies which only affect generators are ignored with a warning. Duplicate lines are
/// removed.
pub fn read_contingency_lines(
    raw_contingencies: &IndexMap<String, RawContingency>,
    line_index: &IndexMap<LineID, usize>,
) -> ScucResult<Vec<usize>> {
    let mut contingency_lines = Vec::new();
    for (name, raw) in raw_contingencies {
        let field = format!("Contingencies.{name}.Affected lines");
        if !raw.affected_generators.is_empty() {
            warn!("Ignoring generator outages in contingency {name}");
        }

        match raw.affected_lines.as_slice() {
            [] if !raw.affected_generators.is_empty() => continue,
            [line] => {
                let idx = line_index.get(line.as_str()).copied().ok_or_else(|| {
                    ScucError::input(&field, format!("unknown transmission line `{line}`"))
                })?;
                if !contingency_lines.contains(&idx) {
                    contingency_lines.push(idx);
                }
            }
            _ => {
                return Err(ScucError::input(
                    field,
                    "exactly one affected line is required",
                ));
            }
        }
    }

    Ok(contingency_lines)
}

/// Select the (outaged, monitored) pairs whose post-outage flow needs a constraint.
///
/// Islanding outages are skipped or rejected according to `policy`. For the rest, a pair is kept
/// only if the LODF linking the two lines survived the sparsity cutoff.
pub fn preprocess_contingencies(
    lines: &[Line],
    contingency_lines: &[usize],
    factors: &NetworkFactors,
    policy: IslandingPolicy,
) -> ScucResult<Vec<ContingencyPair>> {
    let mut pairs = Vec::new();
    for &outaged in contingency_lines {
        if factors.is_islanding(outaged) {
            match policy {
                IslandingPolicy::Skip => {
                    warn!(
                        "Skipping contingency on line {}: its outage islands part of the network",
                        lines[outaged].id
                    );
                    continue;
                }
                IslandingPolicy::Fail => {
                    return Err(ScucError::ContingencySingularity {
                        line: lines[outaged].id.to_string(),
                    });
                }
            }
        }

        pairs.extend(
            (0..lines.len())
                .filter(|&monitored| {
                    monitored != outaged && factors.lodf(monitored, outaged) != 0.0
                })
                .map(|monitored| ContingencyPair { outaged, monitored }),
        );
    }

    Ok(pairs)
}
