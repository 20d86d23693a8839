//! End-to-end scenarios: load an input document, build the model, solve it with HiGHS and check
//! the schedule.
use float_cmp::assert_approx_eq;
use proptest::prelude::*;
use scuc::config::ModelConfig;
use scuc::error::ScucError;
use scuc::formulation::build_formulation;
use scuc::input::parse_input;
use scuc::output::ScheduleReport;
use scuc::solver::{SolveStatus, solve};

/// Solve an input document with the default configuration
fn solve_json(json: &str) -> Result<ScheduleReport, ScucError> {
    let config = ModelConfig::default();
    let input = parse_input(json, &config)?;
    let formulation = build_formulation(&input)?;
    let solution = solve(&formulation.problem, &config)?;

    Ok(ScheduleReport::new(&input, &formulation.vars, &solution))
}

/// A single bus whose only generator `g1` is defined by the JSON fields in `g1`
fn single_unit_json(time_horizon: usize, load: f64, g1: &str) -> String {
    format!(
        r#"{{
            "Parameters": {{"Time horizon (h)": {time_horizon}}},
            "Buses": {{"b1": {{"Load (MW)": {load}}}}},
            "Generators": {{"g1": {{"Bus": "b1", {g1}}}}}
        }}"#
    )
}

#[test]
fn test_single_bus_single_unit() {
    let json = single_unit_json(
        2,
        50.0,
        r#""Production cost curve (MW)": [0, 100],
           "Production cost curve ($)": [0, 1000],
           "Initial status (h)": -1,
           "Initial power (MW)": 0"#,
    );
    let report = solve_json(&json).unwrap();

    assert_eq!(report.status, SolveStatus::Optimal);
    assert_approx_eq!(f64, report.objective_value, 1000.0, epsilon = 1e-4);
    let unit = &report.thermal_units["g1"];
    assert_eq!(unit.commitment, [true, true]);
    for production in &unit.production {
        assert_approx_eq!(f64, *production, 50.0, epsilon = 1e-6);
    }
    assert_approx_eq!(f64, report.total_curtailment(), 0.0);
}

#[test]
fn test_two_bus_congestion() {
    let json = r#"{
        "Parameters": {"Time horizon (h)": 1, "Reference bus": "A"},
        "Buses": {"A": {"Load (MW)": 0}, "B": {"Load (MW)": 100}},
        "Transmission lines": {
            "l1": {"Source bus": "A", "Target bus": "B", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 50, "Flow limit penalty ($/MW)": 10000}
        },
        "Generators": {
            "g1": {"Bus": "A", "Production cost curve (MW)": [0, 200],
                   "Production cost curve ($)": [0, 2000],
                   "Initial status (h)": 1, "Initial power (MW)": 100}
        }
    }"#;
    let report = solve_json(json).unwrap();

    assert_approx_eq!(f64, report.objective_value, 501_000.0, epsilon = 1e-3);
    let line = &report.lines["l1"];
    assert_approx_eq!(f64, line.flow[0], 100.0, epsilon = 1e-6);
    assert_approx_eq!(f64, line.overflow[0], 50.0, epsilon = 1e-6);
    assert_approx_eq!(f64, report.total_curtailment(), 0.0);
}

#[test]
fn test_parallel_lines_contingency() {
    // Either line alone must be able to carry what crosses the cut, so the cheap unit at A is held
    // back to the emergency limit and the dear unit at B makes up the rest
    let json = r#"{
        "Parameters": {"Time horizon (h)": 1, "Reference bus": "A"},
        "Buses": {"A": {"Load (MW)": 0}, "B": {"Load (MW)": 100}},
        "Transmission lines": {
            "l1": {"Source bus": "A", "Target bus": "B", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 60, "Emergency flow limit (MW)": 80},
            "l2": {"Source bus": "A", "Target bus": "B", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 60, "Emergency flow limit (MW)": 80}
        },
        "Generators": {
            "cheap": {"Bus": "A", "Production cost curve (MW)": [0, 200],
                      "Production cost curve ($)": [0, 2000],
                      "Initial status (h)": 1, "Initial power (MW)": 100},
            "dear": {"Bus": "B", "Production cost curve (MW)": [0, 200],
                     "Production cost curve ($)": [0, 10000],
                     "Initial status (h)": 1, "Initial power (MW)": 0}
        },
        "Contingencies": {
            "c1": {"Affected lines": ["l1"]},
            "c2": {"Affected lines": ["l2"]}
        }
    }"#;
    let report = solve_json(json).unwrap();

    assert_approx_eq!(f64, report.thermal_units["cheap"].production[0], 80.0, epsilon = 1e-6);
    assert_approx_eq!(f64, report.thermal_units["dear"].production[0], 20.0, epsilon = 1e-6);
    assert_approx_eq!(f64, report.objective_value, 1800.0, epsilon = 1e-3);
    for line in report.lines.values() {
        assert_approx_eq!(f64, line.flow[0], 40.0, epsilon = 1e-6);
    }
    assert!(report.contingency_overflows.is_empty());
}

#[test]
fn test_reserve_shortfall() {
    // Only 10 MW of headroom is available for a 30 MW requirement
    let json = r#"{
        "Parameters": {"Time horizon (h)": 1},
        "Buses": {"b1": {"Load (MW)": 90}},
        "Generators": {
            "g1": {"Bus": "b1", "Production cost curve (MW)": [0, 100],
                   "Production cost curve ($)": [0, 1000],
                   "Initial status (h)": 1, "Initial power (MW)": 90,
                   "Reserve eligibility": ["r1"]}
        },
        "Reserves": {"r1": {"Amount (MW)": 30, "Shortfall penalty ($/MW)": 100}}
    }"#;
    let report = solve_json(json).unwrap();

    assert_approx_eq!(f64, report.thermal_units["g1"].reserve[0], 10.0, epsilon = 1e-6);
    assert_approx_eq!(f64, report.total_reserve_shortfall(), 20.0, epsilon = 1e-6);
    assert_approx_eq!(f64, report.objective_value, 900.0 + 2000.0, epsilon = 1e-3);
}

#[test]
fn test_infeasible_must_run() {
    // Minimum output exceeds the load and surplus generation cannot be spilled
    let json = single_unit_json(
        1,
        50.0,
        r#""Production cost curve (MW)": [80, 100],
           "Production cost curve ($)": [800, 1000],
           "Must run?": true,
           "Initial status (h)": 1,
           "Initial power (MW)": 80"#,
    );

    assert_eq!(
        solve_json(&json).unwrap_err(),
        ScucError::SolverStatus {
            status: SolveStatus::Infeasible
        }
    );
}

#[test]
fn test_segment_costs() {
    // 70 MW spans both segments: 50 MW at $10 and 20 MW at $30 on top of the $200 no-load cost
    let json = single_unit_json(
        1,
        70.0,
        r#""Production cost curve (MW)": [0, 50, 100],
           "Production cost curve ($)": [200, 700, 2200],
           "Initial status (h)": 1,
           "Initial power (MW)": 70"#,
    );
    let report = solve_json(&json).unwrap();

    assert_approx_eq!(f64, report.objective_value, 200.0 + 500.0 + 600.0, epsilon = 1e-3);
}

#[test]
fn test_startup_category_selection() {
    // Off for `hours` before a startup in the first hour, which picks the category whose delay
    // range contains `hours`
    let cases = [
        (1, 100.0),
        (2, 100.0),
        (3, 200.0),
        (5, 200.0),
        (6, 400.0),
        (12, 400.0),
    ];
    for (hours, startup_cost) in cases {
        let json = single_unit_json(
            1,
            50.0,
            &format!(
                r#""Production cost curve (MW)": [0, 100],
                   "Production cost curve ($)": [0, 1000],
                   "Startup delays (h)": [1, 3, 6],
                   "Startup costs ($)": [100, 200, 400],
                   "Initial status (h)": -{hours},
                   "Initial power (MW)": 0"#
            ),
        );
        let report = solve_json(&json).unwrap();

        assert!(report.thermal_units["g1"].startup[0]);
        assert_approx_eq!(
            f64,
            report.objective_value,
            500.0 + startup_cost,
            epsilon = 1e-3
        );
    }
}

/// Commitment of `g1` in a case where it is forced on at hour `start` and is otherwise only a cost
fn solve_min_uptime(min_uptime: u32, start: usize, time_horizon: usize) -> Vec<bool> {
    let mut schedule = vec!["null"; time_horizon];
    schedule[start] = "true";
    let json = single_unit_json(
        time_horizon,
        0.0,
        &format!(
            r#""Production cost curve (MW)": [0, 100],
               "Production cost curve ($)": [100, 1100],
               "Minimum uptime (h)": {min_uptime},
               "Initial status (h)": -10,
               "Initial power (MW)": 0,
               "Commitment status": [{}]"#,
            schedule.join(", ")
        ),
    );

    solve_json(&json).unwrap().thermal_units["g1"]
        .commitment
        .clone()
}

/// Commitment of a cheap unit forced off at hour `stop` while a dear unit covers the load
fn solve_min_downtime(min_downtime: u32, stop: usize, time_horizon: usize) -> Vec<bool> {
    let mut schedule = vec!["null"; time_horizon];
    schedule[stop] = "false";
    let json = format!(
        r#"{{
            "Parameters": {{"Time horizon (h)": {time_horizon}}},
            "Buses": {{"b1": {{"Load (MW)": 50}}}},
            "Generators": {{
                "g1": {{"Bus": "b1", "Production cost curve (MW)": [0, 100],
                        "Production cost curve ($)": [0, 1000],
                        "Minimum downtime (h)": {min_downtime},
                        "Initial status (h)": 10, "Initial power (MW)": 50,
                        "Commitment status": [{}]}},
                "g2": {{"Bus": "b1", "Production cost curve (MW)": [0, 100],
                        "Production cost curve ($)": [0, 10000],
                        "Initial status (h)": 10, "Initial power (MW)": 0}}
            }}
        }}"#,
        schedule.join(", ")
    );

    solve_json(&json).unwrap().thermal_units["g1"]
        .commitment
        .clone()
}

const TIME_HORIZON: usize = 8;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn test_min_uptime_respected(
        min_uptime in prop::sample::select(vec![1_u32, 3, 6]),
        start in 0..TIME_HORIZON,
    ) {
        let commitment = solve_min_uptime(min_uptime, start, TIME_HORIZON);
        let end = (start + min_uptime as usize).min(TIME_HORIZON);
        for (t, on) in commitment.into_iter().enumerate() {
            prop_assert_eq!(on, (start..end).contains(&t), "hour {}", t);
        }
    }

    #[test]
    fn test_min_downtime_respected(
        min_downtime in prop::sample::select(vec![1_u32, 3, 6]),
        stop in 0..TIME_HORIZON,
    ) {
        let commitment = solve_min_downtime(min_downtime, stop, TIME_HORIZON);
        let end = (stop + min_downtime as usize).min(TIME_HORIZON);
        for (t, on) in commitment.into_iter().enumerate() {
            prop_assert_eq!(on, !(stop..end).contains(&t), "hour {}", t);
        }
    }
}
