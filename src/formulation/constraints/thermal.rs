//! Constraints for thermal units: output decomposition, ramping, minimum up/down times, initial
//! conditions, fixed commitments and startup categories.
//!
//! Hour `t - 1` for `t == 0` refers to the state before the horizon, which is a constant given by
//! the initial status and initial power.
use crate::formulation::{VariableManager, commitment_expr, shutdown_expr, thermal_output};
use crate::instance::UCInput;
use crate::milp::{LinearExpr, Problem};

/// Add all constraints for thermal unit `g`
pub fn add_thermal_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    add_segment_constraints(problem, input, vars, g);
    add_capacity_constraints(problem, input, vars, g);
    add_startup_linking_constraints(problem, input, vars, g);
    add_ramp_constraints(problem, input, vars, g);
    add_min_uptime_constraints(problem, input, vars, g);
    add_min_downtime_constraints(problem, input, vars, g);
    add_initial_status_constraints(problem, input, vars, g);
    add_fixed_commitment_constraints(problem, input, vars, g);
    add_startup_category_constraints(problem, input, vars, g);
}

/// Output above minimum equals the sum of the segment outputs, and each segment is available
/// only while the unit is committed
fn add_segment_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    if unit.cost_segments.is_empty() {
        return;
    }

    for t in input.hours() {
        let mut total = LinearExpr::from_var(vars.production(g, t), 1.0);
        for (s, segment) in unit.cost_segments.iter().enumerate() {
            total.add_term(vars.segment(g, s, t), -1.0);

            let mut limit = LinearExpr::from_var(vars.segment(g, s, t), 1.0);
            limit.add_term(vars.commitment(g, t), -segment.length);
            problem.add_le(&limit, 0.0);
        }
        problem.add_eq(&total, 0.0);
    }
}

/// Output above minimum plus reserve fits within the headroom of a committed unit
fn add_capacity_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    for t in input.hours() {
        let mut expr = LinearExpr::from_var(vars.production(g, t), 1.0);
        if let Some(reserve) = vars.reserve(g, t) {
            expr.add_term(reserve, 1.0);
        }
        expr.add_term(vars.commitment(g, t), -unit.headroom());
        problem.add_le(&expr, 0.0);
    }
}

/// `w(t)` is one exactly when the unit is off in hour `t - 1` and on in hour `t`
fn add_startup_linking_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    for t in input.hours() {
        let previous = commitment_expr(input, vars, g, t.checked_sub(1));

        // w(t) >= u(t) - u(t - 1)
        let mut lower = LinearExpr::from_var(vars.startup(g, t), 1.0);
        lower
            .add_term(vars.commitment(g, t), -1.0)
            .add_scaled(&previous, 1.0);
        problem.add_ge(&lower, 0.0);

        // w(t) <= u(t)
        let mut on = LinearExpr::from_var(vars.startup(g, t), 1.0);
        on.add_term(vars.commitment(g, t), -1.0);
        problem.add_le(&on, 0.0);

        // w(t) <= 1 - u(t - 1)
        let mut was_off = LinearExpr::from_var(vars.startup(g, t), 1.0);
        was_off.add_scaled(&previous, 1.0);
        problem.add_le(&was_off, 1.0);
    }
}

/// Limit changes in output between consecutive hours.
///
/// The startup limit applies in the hour a unit starts and the shutdown limit in the hour before
/// it stops. Reserve counts towards the increase. Families which cannot bind are skipped.
fn add_ramp_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    let ramp_up = unit.has_binding_ramp_up();
    let ramp_down = unit.has_binding_ramp_down();
    if !ramp_up && !ramp_down {
        return;
    }

    for t in input.hours() {
        let previous = t.checked_sub(1);
        let output = thermal_output(input, vars, g, Some(t));
        let previous_output = thermal_output(input, vars, g, previous);

        if ramp_up {
            // P(t) + r(t) - P(t - 1) <= RU * u(t - 1) + SU * w(t)
            let mut expr = output.clone();
            if let Some(reserve) = vars.reserve(g, t) {
                expr.add_term(reserve, 1.0);
            }
            expr.add_scaled(&previous_output, -1.0)
                .add_scaled(&commitment_expr(input, vars, g, previous), -unit.ramp_up)
                .add_term(vars.startup(g, t), -unit.startup_limit);
            problem.add_le(&expr, 0.0);
        }

        if ramp_down {
            // P(t - 1) - P(t) <= RD * u(t) + SD * z(t)
            let mut expr = previous_output;
            expr.add_scaled(&output, -1.0)
                .add_term(vars.commitment(g, t), -unit.ramp_down)
                .add_scaled(&shutdown_expr(input, vars, g, t), -unit.shutdown_limit);
            problem.add_le(&expr, 0.0);
        }
    }
}

/// A unit started in any of the last `min_uptime` hours must still be on
fn add_min_uptime_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let window = input.thermal_gens[g].min_uptime as usize;
    if window <= 1 {
        return;
    }

    for t in input.hours() {
        let mut expr = LinearExpr::from_var(vars.commitment(g, t), -1.0);
        for i in window_start(t, window)..=t {
            expr.add_term(vars.startup(g, i), 1.0);
        }
        problem.add_le(&expr, 0.0);
    }
}

/// A unit shut down in any of the last `min_downtime` hours must still be off
fn add_min_downtime_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let window = input.thermal_gens[g].min_downtime as usize;
    if window <= 1 {
        return;
    }

    for t in input.hours() {
        let mut expr = LinearExpr::from_var(vars.commitment(g, t), 1.0);
        for i in window_start(t, window)..=t {
            expr.add_scaled(&shutdown_expr(input, vars, g, i), 1.0);
        }
        problem.add_le(&expr, 1.0);
    }
}

/// First hour of a sliding window of `window` hours ending at `t`
fn window_start(t: usize, window: usize) -> usize {
    (t + 1).saturating_sub(window)
}

/// Carry minimum up/down times over from before the horizon.
///
/// A unit that has been on for fewer than `min_uptime` hours stays on until the requirement is
/// met, and likewise for a unit that has been off.
fn add_initial_status_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    let elapsed = unit.initial_status.unsigned_abs() as usize;
    let (required, value) = if unit.initially_on() {
        (unit.min_uptime as usize, 1.0)
    } else {
        (unit.min_downtime as usize, 0.0)
    };

    let remaining = required.saturating_sub(elapsed).min(input.time_horizon);
    for t in 0..remaining {
        problem.add_eq(&LinearExpr::from_var(vars.commitment(g, t), 1.0), value);
    }
}

/// Pin commitment where a schedule is given and in every hour for must-run units
fn add_fixed_commitment_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    for t in input.hours() {
        let fixed = match (unit.must_run, unit.fixed_commitment(t)) {
            (_, Some(on)) => on,
            (true, None) => true,
            (false, None) => continue,
        };

        let expr = LinearExpr::from_var(vars.commitment(g, t), 1.0);
        problem.add_eq(&expr, if fixed { 1.0 } else { 0.0 });
    }
}

/// Select the startup category matching the time the unit has been off.
///
/// Exactly one category is chosen per startup. Category `c` (other than the last) may only be
/// chosen in hour `t` if the unit shut down between `D_c` and `D_{c+1} - 1` hours before, where
/// `D` are the category delays. For a unit which has been off since before the horizon, the
/// shutdown time is known and the right-hand side is a constant.
fn add_startup_category_constraints(
    problem: &mut Problem,
    input: &UCInput,
    vars: &VariableManager,
    g: usize,
) {
    let unit = &input.thermal_gens[g];
    let stages = &unit.startup_stages;
    let offline_before =
        (!unit.initially_on()).then(|| unit.initial_status.unsigned_abs() as usize);

    for t in input.hours() {
        let mut selection = LinearExpr::from_var(vars.startup(g, t), -1.0);
        for c in 0..stages.len() {
            selection.add_term(vars.startup_category(g, c, t), 1.0);
        }
        problem.add_eq(&selection, 0.0);

        for (c, (stage, next)) in stages.iter().zip(stages.iter().skip(1)).enumerate() {
            let delays = stage.delay as usize..next.delay as usize;

            let mut expr = LinearExpr::from_var(vars.startup_category(g, c, t), 1.0);
            for i in delays.clone().filter(|&i| i <= t) {
                expr.add_scaled(&shutdown_expr(input, vars, g, t - i), -1.0);
            }

            let initial = match offline_before {
                Some(hours) if delays.contains(&(hours + t)) => 1.0,
                _ => 0.0,
            };
            problem.add_le(&expr, initial);
        }
    }
}
