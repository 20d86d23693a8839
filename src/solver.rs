//! Solving the MILP with HiGHS.
//!
//! The abstract [`Problem`] is translated column by column and row by row, so [`VarId`]s map
//! directly onto HiGHS columns.
use crate::config::ModelConfig;
use crate::error::{ScucError, ScucResult};
use crate::milp::{Problem, VarId};
use highs::{HighsModelStatus, RowProblem, Sense};
use log::{debug, info, log_enabled, warn};
use serde::Serialize;
use strum::Display;

/// Largest bound, row or integrality violation accepted for an incumbent returned on a time limit
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Outcome of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Solved to within the requested gap
    #[strum(to_string = "optimal")]
    Optimal,
    /// A limit was reached but a feasible solution was found
    #[strum(to_string = "feasible")]
    Feasible,
    /// No feasible solution exists
    #[strum(to_string = "infeasible")]
    Infeasible,
    /// The objective can be decreased without bound
    #[strum(to_string = "unbounded")]
    Unbounded,
    /// The solver failed or stopped without a usable solution
    #[strum(to_string = "error")]
    Error,
}

/// A solution to the problem
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Either [`SolveStatus::Optimal`] or [`SolveStatus::Feasible`]
    pub status: SolveStatus,
    /// Objective value of `values`
    pub objective_value: f64,
    /// Value of every column, indexed by [`VarId`]
    pub values: Vec<f64>,
    /// Relative gap between the incumbent and the solver's best bound, if the problem has integer
    /// columns and the solver could bound it
    pub gap: Option<f64>,
}

impl Solution {
    /// The value of a variable
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }
}

/// Solve the problem.
///
/// The time limit and target gap come from `config`. Infeasible, unbounded and failed solves are
/// returned as [`ScucError::SolverStatus`]; no partial solution is produced.
pub fn solve(problem: &Problem, config: &ModelConfig) -> ScucResult<Solution> {
    info!(
        "Solving with a time limit of {}s and a target gap of {}",
        config.solver_time_limit_sec, config.relative_gap
    );

    let (status, values, gap) = run_highs(problem, config)?;
    let objective_value = problem.objective_value(&values);
    let gap_pct = gap.map_or_else(|| "n/a".to_string(), |gap| format!("{:.2}%", gap * 100.0));
    match status {
        SolveStatus::Optimal => {
            info!("Found optimal solution with objective {objective_value} (gap {gap_pct})");
        }
        _ => warn!("Stopped before proving optimality: objective {objective_value}, gap {gap_pct}"),
    }

    Ok(Solution {
        status,
        objective_value,
        values,
        gap,
    })
}

/// Run HiGHS on the problem, returning the status, column values and MIP gap
fn run_highs(
    problem: &Problem,
    config: &ModelConfig,
) -> ScucResult<(SolveStatus, Vec<f64>, Option<f64>)> {
    let mut model = to_highs(problem).optimise(Sense::Minimise);
    model.set_option("time_limit", f64::from(config.solver_time_limit_sec));
    model.set_option("mip_rel_gap", config.relative_gap);
    configure_logging(&mut model);

    let solved = model.try_solve().map_err(|status| {
        debug!("HiGHS returned {status:?}");
        ScucError::SolverStatus {
            status: SolveStatus::Error,
        }
    })?;

    let highs_status = solved.status();
    debug!("HiGHS finished with model status {highs_status:?}");
    let status = classify_status(highs_status);
    let values = solved.get_solution().columns().to_vec();
    check_incumbent(problem, status, &values)?;

    // HiGHS reports an infinite gap for problems without integer columns
    let gap = if problem.num_integer_columns() > 0 {
        Some(solved.mip_gap()).filter(|gap| gap.is_finite())
    } else {
        None
    };

    Ok((status, values, gap))
}

/// Map a HiGHS model status onto our own
fn classify_status(status: HighsModelStatus) -> SolveStatus {
    match status {
        HighsModelStatus::Optimal => SolveStatus::Optimal,
        HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
            SolveStatus::Feasible
        }
        // Presolve does not always tell these apart
        HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
            SolveStatus::Infeasible
        }
        HighsModelStatus::Unbounded => SolveStatus::Unbounded,
        _ => SolveStatus::Error,
    }
}

/// Check that the solver stopped with a usable solution.
///
/// A solution returned on a limit is only accepted if it satisfies every bound, row and
/// integrality requirement.
fn check_incumbent(problem: &Problem, status: SolveStatus, values: &[f64]) -> ScucResult<()> {
    if !matches!(status, SolveStatus::Optimal | SolveStatus::Feasible) {
        return Err(ScucError::SolverStatus { status });
    }

    if status == SolveStatus::Feasible && problem.max_violation(values) > FEASIBILITY_TOLERANCE {
        // The limit was reached before any incumbent was found
        return Err(ScucError::SolverStatus {
            status: SolveStatus::Error,
        });
    }

    Ok(())
}

/// Translate the abstract problem into a HiGHS row-wise problem
fn to_highs(problem: &Problem) -> RowProblem {
    let mut highs_problem = RowProblem::default();
    let cols: Vec<_> = problem
        .columns()
        .iter()
        .map(|col| {
            if col.integer {
                highs_problem.add_integer_column(col.cost, col.lower..=col.upper)
            } else {
                highs_problem.add_column(col.cost, col.lower..=col.upper)
            }
        })
        .collect();

    for row in problem.rows() {
        highs_problem.add_row(
            row.lower..=row.upper,
            row.terms.iter().map(|(var, coeff)| (cols[var.0], *coeff)),
        );
    }

    highs_problem
}

/// Silence HiGHS unless debug logging is enabled.
///
/// HiGHS writes straight to stdout rather than through our logger, so its output is not included
/// in the log files.
fn configure_logging(model: &mut highs::Model) {
    let verbose = log_enabled!(log::Level::Debug);
    model.set_option("output_flag", verbose);
    model.set_option("log_to_console", verbose);
}
