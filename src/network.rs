//! Sensitivity factors for the DC network model.
//!
//! The PTDF gives the change in flow on each line per MW injected at each bus (and withdrawn at
//! the reference bus). The LODF gives the fraction of a line's pre-outage flow that shifts onto
//! each other line when it trips. Both are computed from the reduced bus reactance matrix, i.e.
//! the inverse of the nodal susceptance matrix with the reference bus removed.
use crate::config::ModelConfig;
use crate::error::{ScucError, ScucResult};
use crate::grid::Line;
use log::debug;
use nalgebra::DMatrix;
use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;

/// PTDF and LODF matrices for a network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkFactors {
    /// `ptdf[(l, b)]`: flow on line `l` per MW injected at bus `b`
    ptdf: DMatrix<f64>,
    /// `lodf[(l, k)]`: change in flow on `l` per MW of pre-outage flow on `k`
    lodf: DMatrix<f64>,
    /// Whether the outage of each line islands part of the network
    islanding: Vec<bool>,
}

impl NetworkFactors {
    /// Compute the factors for the given network.
    ///
    /// # Arguments
    ///
    /// * `num_buses` - Number of buses
    /// * `lines` - The lines, with bus indices and susceptances resolved
    /// * `reference_bus` - Index of the bus whose voltage angle is fixed at zero
    /// * `config` - Sparsity cutoffs and the islanding tolerance
    pub fn compute(
        num_buses: usize,
        lines: &[Line],
        reference_bus: usize,
        config: &ModelConfig,
    ) -> ScucResult<Self> {
        check_connected(num_buses, lines)?;

        let susceptance = build_susceptance_matrix(num_buses, lines);
        let reactance = invert_reduced(susceptance, reference_bus)?;
        let mut ptdf = compute_ptdf(&reactance, lines);
        let (mut lodf, islanding) =
            compute_lodf(&ptdf, lines, config.lodf_singularity_tolerance);

        // Cut off only after the LODF has been derived from the exact PTDF
        apply_sparsity_cutoff(&mut ptdf, config.ptdf_sparsity_cutoff);
        apply_sparsity_cutoff(&mut lodf, config.lodf_sparsity_cutoff);

        debug!(
            "Computed network factors: {} non-zero PTDF entries, {} non-zero LODF entries, {} \
            islanding outages",
            count_non_zero(&ptdf),
            count_non_zero(&lodf),
            islanding.iter().filter(|x| **x).count()
        );

        Ok(Self {
            ptdf,
            lodf,
            islanding,
        })
    }

    /// PTDF of line `line` with respect to bus `bus`
    pub fn ptdf(&self, line: usize, bus: usize) -> f64 {
        self.ptdf[(line, bus)]
    }

    /// LODF of monitored line `line` with respect to the outage of line `outaged`
    pub fn lodf(&self, line: usize, outaged: usize) -> f64 {
        self.lodf[(line, outaged)]
    }

    /// Whether the outage of line `line` islands part of the network
    pub fn is_islanding(&self, line: usize) -> bool {
        self.islanding[line]
    }

    /// Number of lines (rows of the PTDF)
    pub fn num_lines(&self) -> usize {
        self.ptdf.nrows()
    }

    /// Number of buses (columns of the PTDF)
    pub fn num_buses(&self) -> usize {
        self.ptdf.ncols()
    }

    /// Iterate over the non-zero PTDF entries for a line as `(bus, factor)` pairs
    pub fn iter_ptdf_row(&self, line: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.ptdf.ncols())
            .map(move |bus| (bus, self.ptdf[(line, bus)]))
            .filter(|(_, factor)| *factor != 0.0)
    }
}

/// Check that every bus can be reached from every other bus
fn check_connected(num_buses: usize, lines: &[Line]) -> ScucResult<()> {
    if num_buses == 0 {
        return Err(ScucError::Topology("network has no buses".into()));
    }

    let mut graph = UnGraph::<(), ()>::with_capacity(num_buses, lines.len());
    let nodes: Vec<_> = (0..num_buses).map(|_| graph.add_node(())).collect();
    for line in lines {
        graph.add_edge(nodes[line.from_bus], nodes[line.to_bus], ());
    }

    let components = connected_components(&graph);
    if components > 1 {
        return Err(ScucError::Topology(format!(
            "network is split into {components} disconnected parts"
        )));
    }

    Ok(())
}

/// Build the nodal susceptance matrix `B = A' diag(b) A`
fn build_susceptance_matrix(num_buses: usize, lines: &[Line]) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(num_buses, num_buses);
    for line in lines {
        let (i, j, b) = (line.from_bus, line.to_bus, line.susceptance);
        matrix[(i, i)] += b;
        matrix[(j, j)] += b;
        matrix[(i, j)] -= b;
        matrix[(j, i)] -= b;
    }

    matrix
}

/// Invert `B` with the reference bus removed, then reinsert a zero row and column for it.
///
/// The reduced matrix is symmetric positive definite for a connected network with positive
/// susceptances, so Cholesky is tried first. Negative susceptances (series compensation) make it
/// indefinite, in which case LU is used instead.
fn invert_reduced(susceptance: DMatrix<f64>, reference_bus: usize) -> ScucResult<DMatrix<f64>> {
    let num_buses = susceptance.nrows();
    if num_buses == 1 {
        return Ok(DMatrix::zeros(1, 1));
    }

    let reduced = susceptance
        .remove_row(reference_bus)
        .remove_column(reference_bus);

    let inverse = match reduced.clone().cholesky() {
        Some(cholesky) => cholesky.inverse(),
        None => reduced.lu().try_inverse().ok_or_else(|| {
            ScucError::Topology("reduced susceptance matrix is singular".into())
        })?,
    };

    if inverse.iter().any(|x| !x.is_finite()) {
        return Err(ScucError::Topology(
            "reduced susceptance matrix is numerically singular".into(),
        ));
    }

    Ok(inverse
        .insert_row(reference_bus, 0.0)
        .insert_column(reference_bus, 0.0))
}

/// `PTDF[l][b] = b_l * (X[from(l)][b] - X[to(l)][b])`
fn compute_ptdf(reactance: &DMatrix<f64>, lines: &[Line]) -> DMatrix<f64> {
    let num_buses = reactance.ncols();
    DMatrix::from_fn(lines.len(), num_buses, |l, b| {
        let line = &lines[l];
        line.susceptance * (reactance[(line.from_bus, b)] - reactance[(line.to_bus, b)])
    })
}

/// Compute the LODF matrix and flag islanding outages.
///
/// For an outage of line `k` from bus `i` to bus `j`:
///
/// ```text
/// LODF[l][k] = (PTDF[l][i] - PTDF[l][j]) / (1 - (PTDF[k][i] - PTDF[k][j]))
/// ```
///
/// with `LODF[k][k] = -1`. When the denominator vanishes, the line is the only path between two
/// parts of the network and the outage cannot be represented; its column is left as zero.
fn compute_lodf(ptdf: &DMatrix<f64>, lines: &[Line], tolerance: f64) -> (DMatrix<f64>, Vec<bool>) {
    let num_lines = lines.len();
    let mut lodf = DMatrix::zeros(num_lines, num_lines);
    let mut islanding = vec![false; num_lines];

    for (k, outaged) in lines.iter().enumerate() {
        let transfer = |l: usize| ptdf[(l, outaged.from_bus)] - ptdf[(l, outaged.to_bus)];
        let denominator = 1.0 - transfer(k);
        if denominator.abs() < tolerance {
            islanding[k] = true;
            continue;
        }

        for l in 0..num_lines {
            lodf[(l, k)] = if l == k {
                -1.0
            } else {
                transfer(l) / denominator
            };
        }
    }

    (lodf, islanding)
}

/// Zero every entry whose magnitude is below `cutoff`
fn apply_sparsity_cutoff(matrix: &mut DMatrix<f64>, cutoff: f64) {
    for x in matrix.iter_mut() {
        if x.abs() < cutoff {
            *x = 0.0;
        }
    }
}

fn count_non_zero(matrix: &DMatrix<f64>) -> usize {
    matrix.iter().filter(|x| **x != 0.0).count()
}
