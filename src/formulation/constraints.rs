//! Code for adding constraints to the unit commitment problem.
use super::{VariableManager, net_injections};
use crate::instance::UCInput;
use crate::milp::{LinearExpr, Problem};
use log::debug;

mod network;
mod thermal;

/// Add every constraint family.
///
/// Rows whose terms all cancel or fall below the coefficient tolerance are omitted.
///
/// # Arguments
///
/// * `problem` - The problem, with all variables already added
/// * `input` - The normalised instance
/// * `vars` - The variable index
pub fn add_constraints(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    let mut rows = problem.num_rows();
    add_power_balance_constraints(problem, input, vars);
    rows = log_rows_added("power balance", problem, rows);
    add_reserve_constraints(problem, input, vars);
    rows = log_rows_added("reserve", problem, rows);
    for g in 0..input.thermal_gens.len() {
        thermal::add_thermal_constraints(problem, input, vars, g);
    }
    rows = log_rows_added("thermal unit", problem, rows);
    add_profiled_constraints(problem, input, vars);
    add_price_sensitive_load_constraints(problem, input, vars);
    rows = log_rows_added("profiled unit and load", problem, rows);
    network::add_network_constraints(problem, input, vars);
    log_rows_added("transmission", problem, rows);
}

/// Log how many rows have been added since `before` and return the new row count
fn log_rows_added(name: &str, problem: &Problem, before: usize) -> usize {
    debug!("Added {} {name} constraints", problem.num_rows() - before);
    problem.num_rows()
}

/// System-wide balance: the net injections over all buses sum to zero in every hour.
///
/// This is thermal plus profiled output, less price-sensitive demand served, plus curtailment,
/// equal to the fixed demand.
fn add_power_balance_constraints(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    for t in input.hours() {
        let mut balance = LinearExpr::new();
        for injection in net_injections(input, vars, t) {
            balance.add_scaled(&injection, 1.0);
        }
        problem.add_eq(&balance, 0.0);
    }
}

/// Reserve adequacy: eligible provision plus shortfall covers the requirement.
///
/// Only added for hours in which the requirement is positive.
fn add_reserve_constraints(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    for (r, reserve) in input.reserves.iter().enumerate() {
        for t in input.hours().filter(|&t| reserve.is_active(t)) {
            let mut expr = LinearExpr::from_var(vars.shortfall(r, t), 1.0);
            for g in input.eligible_units(r) {
                if let Some(var) = vars.reserve(g, t) {
                    expr.add_term(var, 1.0);
                }
            }
            problem.add_ge(&expr, reserve.amount[t]);
        }
    }
}

/// Profiled output lies between its minimum and maximum series
fn add_profiled_constraints(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    for (p, unit) in input.profiled_gens.iter().enumerate() {
        for t in input.hours() {
            let expr = LinearExpr::from_var(vars.profiled(p, t), 1.0);
            problem.add_row(&expr, unit.p_min[t]..=unit.p_max[t]);
        }
    }
}

/// Price-sensitive demand served is at most the demand
fn add_price_sensitive_load_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
) {
    for (d, load) in input.price_sensitive_loads.iter().enumerate() {
        for t in input.hours() {
            let expr = LinearExpr::from_var(vars.served(d, t), 1.0);
            problem.add_le(&expr, load.demand[t]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{meshed_input, single_bus_input};
    use crate::milp::RowSense;
    use rstest::rstest;

    fn build(input: &UCInput) -> (Problem, VariableManager) {
        let mut problem = Problem::default();
        let vars = VariableManager::build(&mut problem, input).unwrap();
        (problem, vars)
    }

    #[rstest]
    fn test_power_balance(single_bus_input: UCInput) {
        let (mut problem, vars) = build(&single_bus_input);
        add_power_balance_constraints(&mut problem, &single_bus_input, &vars);
        assert_eq!(problem.num_rows(), 2);

        let row = &problem.rows()[0];
        assert_eq!(row.sense(), RowSense::Equal);
        assert_eq!(row.lower, 50.0);

        // Dispatching 50 MW meets demand; curtailing all of it does too
        let mut values = vec![0.0; problem.num_columns()];
        for t in 0..2 {
            values[vars.commitment(0, t).0] = 1.0;
            values[vars.production(0, t).0] = 50.0;
        }
        assert_eq!(problem.max_violation(&values), 0.0);
        values[vars.production(0, 1).0] = 0.0;
        values[vars.curtailment(0, 1).0] = 50.0;
        assert_eq!(problem.max_violation(&values), 0.0);
    }

    #[rstest]
    fn test_reserve_only_when_active(meshed_input: UCInput) {
        let (mut problem, vars) = build(&meshed_input);
        add_reserve_constraints(&mut problem, &meshed_input, &vars);

        // The requirement is zero in the final hour
        assert_eq!(problem.num_rows(), 2);
        let row = &problem.rows()[0];
        assert_eq!(row.sense(), RowSense::GreaterEqual);
        assert_eq!(row.lower, 5.0);
        assert_eq!(row.terms.len(), 3);
        assert!(row.terms.contains(&(vars.reserve(1, 0).unwrap(), 1.0)));
    }

    #[rstest]
    fn test_profiled_and_load_bounds(meshed_input: UCInput) {
        let (mut problem, vars) = build(&meshed_input);
        add_profiled_constraints(&mut problem, &meshed_input, &vars);
        add_price_sensitive_load_constraints(&mut problem, &meshed_input, &vars);
        assert_eq!(problem.num_rows(), 6);

        let mut values = vec![0.0; problem.num_columns()];
        values[vars.profiled(0, 2).0] = 6.0;
        assert_eq!(problem.max_violation(&values), 1.0);
        values[vars.profiled(0, 2).0] = 5.0;
        values[vars.served(0, 1).0] = 7.0;
        assert_eq!(problem.max_violation(&values), 2.0);
    }
}
