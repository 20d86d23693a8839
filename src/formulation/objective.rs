//! The cost-minimising objective.
use super::VariableManager;
use crate::instance::UCInput;
use crate::milp::Problem;

/// Register every cost term with the problem.
///
/// All coefficients are costs per hour: production and startup costs, profiled output cost and
/// the penalties on slack variables, less the revenue from price-sensitive loads.
pub fn add_objective(problem: &mut Problem, input: &UCInput, vars: &VariableManager) {
    for t in input.hours() {
        for (g, unit) in input.thermal_gens.iter().enumerate() {
            problem.add_objective_term(vars.commitment(g, t), unit.no_load_cost);
            for (s, segment) in unit.cost_segments.iter().enumerate() {
                problem.add_objective_term(vars.segment(g, s, t), segment.slope);
            }
            for (c, stage) in unit.startup_stages.iter().enumerate() {
                problem.add_objective_term(vars.startup_category(g, c, t), stage.cost);
            }
        }

        for (p, unit) in input.profiled_gens.iter().enumerate() {
            problem.add_objective_term(vars.profiled(p, t), unit.cost);
        }

        for (d, load) in input.price_sensitive_loads.iter().enumerate() {
            problem.add_objective_term(vars.served(d, t), -load.revenue[t]);
        }

        for b in 0..input.buses.len() {
            problem.add_objective_term(vars.curtailment(b, t), input.curtail_penalty);
        }

        for (r, reserve) in input.reserves.iter().enumerate() {
            if reserve.shortfall_enabled() {
                problem.add_objective_term(vars.shortfall(r, t), reserve.shortfall_penalty);
            }
        }

        for (l, line) in input.lines.iter().enumerate() {
            problem.add_objective_term(vars.flow_violation(l, t), line.flow_penalty);
        }

        for (i, pair) in input.relevant_pairs.iter().enumerate() {
            let penalty = input.lines[pair.monitored].flow_penalty;
            problem.add_objective_term(vars.contingency_violation(i, t), penalty);
        }
    }
}
