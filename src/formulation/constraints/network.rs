//! Transmission constraints for the base case and for N-1 line outages.
use crate::formulation::{VariableManager, base_flow, net_injections};
use crate::instance::UCInput;
use crate::milp::{LinearExpr, Problem, VarId};

/// Bound flows on every line, before and after each relevant outage.
///
/// Base-case flow on line `l` must lie within its normal limit and post-outage flow within its
/// emergency limit. Either may be exceeded at a cost through the violation slacks.
pub fn add_network_constraints(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    if input.lines.is_empty() {
        return;
    }

    for t in input.hours() {
        let injections = net_injections(input, vars, t);
        let flows: Vec<LinearExpr> = (0..input.lines.len())
            .map(|l| base_flow(input, &injections, l))
            .collect();

        for (l, line) in input.lines.iter().enumerate() {
            add_flow_limit(
                problem,
                &flows[l],
                line.normal_limit,
                vars.flow_violation(l, t),
            );
        }

        for (i, pair) in input.relevant_pairs.iter().enumerate() {
            // Flow on the monitored line once the outaged line's flow has been redistributed
            let factor = input.factors.lodf(pair.monitored, pair.outaged);
            let mut flow = flows[pair.monitored].clone();
            flow.add_scaled(&flows[pair.outaged], factor);

            let limit = input.lines[pair.monitored].emergency_limit;
            add_flow_limit(problem, &flow, limit, vars.contingency_violation(i, t));
        }
    }
}

/// Add `-limit - violation <= flow <= limit + violation` as two rows.
///
/// Nothing is added when the flow has no terms left after the sparsity cutoffs and is within the
/// limit, as the rows could never bind.
fn add_flow_limit(
    problem: &mut Problem,
    flow: &LinearExpr,
    limit: f64,
    violation: VarId,
) {
    if flow.merged_terms().is_empty() && flow.constant().abs() <= limit {
        return;
    }

    let mut upper = flow.clone();
    upper.add_term(violation, -1.0);
    problem.add_le(&upper, limit);

    let mut lower = flow.clone();
    lower.add_term(violation, 1.0);
    problem.add_ge(&lower, -limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::fixture::{meshed_input, two_bus_input};
    use crate::input::parse_input;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_base_case_violation(two_bus_input: UCInput) {
        let mut problem = Problem::default();
        let vars = VariableManager::build(&mut problem, &two_bus_input).unwrap();
        add_network_constraints(&mut problem, &two_bus_input, &vars);
        assert_eq!(problem.num_rows(), 2);

        let mut values = vec![0.0; problem.num_columns()];
        values[vars.commitment(0, 0).0] = 1.0;
        values[vars.production(0, 0).0] = 100.0;
        assert_approx_eq!(f64, problem.max_violation(&values), 50.0, epsilon = 1e-9);

        values[vars.flow_violation(0, 0).0] = 50.0;
        assert_approx_eq!(f64, problem.max_violation(&values), 0.0, epsilon = 1e-9);
    }

    #[rstest]
    fn test_contingency_rows(meshed_input: UCInput) {
        let mut problem = Problem::default();
        let vars = VariableManager::build(&mut problem, &meshed_input).unwrap();
        add_network_constraints(&mut problem, &meshed_input, &vars);

        let lines = meshed_input.lines.len();
        let pairs = meshed_input.relevant_pairs.len();
        assert!(pairs > 0);
        assert_eq!(problem.num_rows(), 2 * 3 * (lines + pairs));
    }

    #[rstest]
    fn test_post_outage_flow(meshed_input: UCInput) {
        let mut problem = Problem::default();
        let vars = VariableManager::build(&mut problem, &meshed_input).unwrap();

        // 30 MW from b1 to b2 (profiled unit "off", load curtailed elsewhere)
        let mut values = vec![0.0; problem.num_columns()];
        values[vars.commitment(0, 0).0] = 1.0;
        values[vars.production(0, 0).0] = 10.0;
        values[vars.curtailment(0, 0).0] = 20.0;
        values[vars.curtailment(3, 0).0] = 10.0;
        let injections = net_injections(&meshed_input, &vars, 0);
        let flows: Vec<f64> = (0..4)
            .map(|l| base_flow(&meshed_input, &injections, l).evaluate(&values))
            .collect();

        // Two paths between b1 and b2: direct, and via b3 with twice the reactance
        assert_approx_eq!(f64, flows[0], 20.0, epsilon = 1e-9);
        assert_approx_eq!(f64, flows[1], -10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, flows[2], 10.0, epsilon = 1e-9);
        assert_approx_eq!(f64, flows[3], 0.0, epsilon = 1e-9);

        // Losing l1 sends everything round via b3
        let lodf = meshed_input.factors.lodf(2, 0);
        assert_approx_eq!(f64, flows[2] + lodf * flows[0], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negligible_line_has_no_rows() {
        // Almost nothing flows on l3 as the path via b is a thousand times stronger
        let json = r#"{
            "Parameters": {"Time horizon (h)": 2, "Reference bus": "a"},
            "Buses": {"a": {}, "b": {"Load (MW)": 10}, "c": {"Load (MW)": 20}},
            "Transmission lines": {
                "l1": {"Source bus": "a", "Target bus": "b", "Reactance (ohms)": 0.01,
                       "Normal flow limit (MW)": 100},
                "l2": {"Source bus": "b", "Target bus": "c", "Reactance (ohms)": 0.01,
                       "Normal flow limit (MW)": 100},
                "l3": {"Source bus": "a", "Target bus": "c", "Reactance (ohms)": 10,
                       "Normal flow limit (MW)": 100}
            },
            "Generators": {
                "g1": {"Bus": "a", "Production cost curve (MW)": [0, 100],
                       "Production cost curve ($)": [0, 1000],
                       "Initial status (h)": 1, "Initial power (MW)": 30}
            }
        }"#;
        let input = parse_input(json, &ModelConfig::default()).unwrap();
        assert_eq!(input.factors.iter_ptdf_row(2).count(), 0);

        let mut problem = Problem::default();
        let vars = VariableManager::build(&mut problem, &input).unwrap();
        add_network_constraints(&mut problem, &input, &vars);

        // Two rows per hour for each of l1 and l2 only
        assert_eq!(problem.num_rows(), 2 * 2 * 2);
        for t in input.hours() {
            let slack = vars.flow_violation(2, t);
            assert!(
                problem
                    .rows()
                    .iter()
                    .all(|row| row.terms.iter().all(|(var, _)| *var != slack))
            );
        }
    }
}
