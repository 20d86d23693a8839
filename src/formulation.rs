//! Construction of the security-constrained unit commitment MILP.
//!
//! Variables are allocated first by the [`VariableManager`]; the objective and constraint builders
//! then reference them by index. The input is only ever read.
use crate::error::ScucResult;
use crate::instance::UCInput;
use crate::milp::{LinearExpr, Problem};
use log::{debug, info};

mod constraints;
mod objective;
mod variables;
pub use variables::{VariableBlock, VariableManager};

/// A fully built problem together with the index of its variables
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    /// The MILP handed to the solver
    pub problem: Problem,
    /// Lookup from (entity, hour) to column
    pub vars: VariableManager,
}

/// Build the complete MILP for the given instance.
///
/// # Arguments
///
/// * `input` - The normalised problem instance, including network factors
///
/// # Returns
///
/// The problem and the variable index needed to read a solution back.
pub fn build_formulation(input: &UCInput) -> ScucResult<Formulation> {
    let mut problem = Problem::default();
    let vars = VariableManager::build(&mut problem, input)?;
    for (family, block) in vars.iter_blocks().filter(|(_, block)| !block.is_empty()) {
        debug!(
            "{family}: {} entities over {} hours",
            block.num_entities(),
            vars.time_horizon()
        );
    }
    objective::add_objective(&mut problem, input, &vars);
    constraints::add_constraints(&mut problem, input, &vars);

    info!(
        "Built model with {} columns ({} integer) and {} rows",
        problem.num_columns(),
        problem.num_integer_columns(),
        problem.num_rows()
    );

    Ok(Formulation { problem, vars })
}

/// Output of thermal unit `g` in hour `t`, i.e. `p_min * u(g, t) + p(g, t)`.
///
/// Hour `-1` (`t == None`) gives the constant initial output.
pub fn thermal_output(
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
    t: Option<usize>,
) -> LinearExpr {
    let unit = &input.thermal_gens[g];
    match t {
        None => {
            let mut expr = LinearExpr::new();
            expr.add_constant(unit.initial_power);
            expr
        }
        Some(t) => {
            let mut expr = LinearExpr::from_var(vars.commitment(g, t), unit.p_min);
            expr.add_term(vars.production(g, t), 1.0);
            expr
        }
    }
}

/// Commitment of thermal unit `g` in hour `t`, with hour `-1` given by the initial status
pub fn commitment_expr(
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
    t: Option<usize>,
) -> LinearExpr {
    match t {
        None => {
            let mut expr = LinearExpr::new();
            if input.thermal_gens[g].initially_on() {
                expr.add_constant(1.0);
            }
            expr
        }
        Some(t) => LinearExpr::from_var(vars.commitment(g, t), 1.0),
    }
}

/// Shutdown indicator of unit `g` in hour `t`: `u(t - 1) - u(t) + w(t)`
pub fn shutdown_expr(input: &UCInput, vars: &VariableManager, g: usize, t: usize) -> LinearExpr {
    let mut expr = commitment_expr(input, vars, g, t.checked_sub(1));
    expr.add_term(vars.commitment(g, t), -1.0)
        .add_term(vars.startup(g, t), 1.0);
    expr
}

/// Net injection at every bus in hour `t` (generation minus load, with curtailment counted as
/// negative load)
pub fn net_injections(input: &UCInput, vars: &VariableManager, t: usize) -> Vec<LinearExpr> {
    let mut injections: Vec<LinearExpr> = input.nodal_demand[t]
        .iter()
        .enumerate()
        .map(|(b, demand)| {
            let mut expr = LinearExpr::from_var(vars.curtailment(b, t), 1.0);
            expr.add_constant(-demand);
            expr
        })
        .collect();

    for (g, unit) in input.thermal_gens.iter().enumerate() {
        injections[unit.bus].add_scaled(&thermal_output(input, vars, g, Some(t)), 1.0);
    }
    for (p, unit) in input.profiled_gens.iter().enumerate() {
        injections[unit.bus].add_term(vars.profiled(p, t), 1.0);
    }
    for (d, load) in input.price_sensitive_loads.iter().enumerate() {
        injections[load.bus].add_term(vars.served(d, t), -1.0);
    }

    injections
}

/// Base-case flow on line `l`: the PTDF-weighted sum of the net injections
pub fn base_flow(input: &UCInput, injections: &[LinearExpr], l: usize) -> LinearExpr {
    let mut flow = LinearExpr::new();
    for (b, factor) in input.factors.iter_ptdf_row(l) {
        flow.add_scaled(&injections[b], factor);
    }
    flow
}
