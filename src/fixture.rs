//! Fixtures for tests
use crate::config::ModelConfig;
use crate::generator::{CostSegment, StartupStage, ThermalGenerator};
use crate::input::parse_input;
use crate::instance::UCInput;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// One bus with a flat 50 MW load over two hours, served by a single 100 MW unit at $10/MW
#[fixture]
pub fn single_bus_json() -> String {
    r#"{
        "Parameters": {"Time horizon (h)": 2},
        "Buses": {"b1": {"Load (MW)": 50}},
        "Generators": {
            "g1": {
                "Bus": "b1",
                "Production cost curve (MW)": [0, 100],
                "Production cost curve ($)": [0, 1000],
                "Initial status (h)": -1,
                "Initial power (MW)": 0
            }
        }
    }"#
    .to_string()
}

/// Two buses joined by a 50 MW line, with all 100 MW of load at the far end
#[fixture]
pub fn two_bus_json() -> String {
    r#"{
        "Parameters": {"Time horizon (h)": 1, "Reference bus": "A"},
        "Buses": {"A": {}, "B": {"Load (MW)": 100}},
        "Transmission lines": {
            "l1": {
                "Source bus": "A",
                "Target bus": "B",
                "Reactance (ohms)": 0.1,
                "Normal flow limit (MW)": 50
            }
        },
        "Generators": {
            "g1": {
                "Bus": "A",
                "Production cost curve (MW)": [0, 200],
                "Production cost curve ($)": [0, 2000],
                "Initial status (h)": 1,
                "Initial power (MW)": 100
            }
        }
    }"#
    .to_string()
}

/// A triangle of buses with a spur, a reserve, a profiled unit, a price-sensitive load and a
/// contingency, exercising every variable family
#[fixture]
pub fn meshed_json() -> String {
    r#"{
        "Parameters": {"Time horizon (h)": 3},
        "Buses": {
            "b1": {"Load (MW)": [20, 30, 40]},
            "b2": {"Load (MW)": 30},
            "b3": {"Load (MW)": null},
            "b4": {"Load (MW)": [10, 10, 10]}
        },
        "Transmission lines": {
            "l1": {"Source bus": "b1", "Target bus": "b2", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 100, "Emergency flow limit (MW)": 120},
            "l2": {"Source bus": "b2", "Target bus": "b3", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 100},
            "l3": {"Source bus": "b1", "Target bus": "b3", "Reactance (ohms)": 0.1,
                   "Normal flow limit (MW)": 100},
            "l4": {"Source bus": "b3", "Target bus": "b4", "Reactance (ohms)": 0.2}
        },
        "Generators": {
            "g1": {
                "Bus": "b1",
                "Production cost curve (MW)": [20, 60, 100],
                "Production cost curve ($)": [400, 800, 1400],
                "Startup delays (h)": [1, 3],
                "Startup costs ($)": [100, 200],
                "Ramp up limit (MW)": 50,
                "Ramp down limit (MW)": 50,
                "Minimum uptime (h)": 2,
                "Minimum downtime (h)": 2,
                "Initial status (h)": 4,
                "Initial power (MW)": 50,
                "Reserve eligibility": ["r1"]
            },
            "g2": {
                "Bus": "b3",
                "Production cost curve (MW)": [0, 80],
                "Production cost curve ($)": [0, 2400],
                "Initial status (h)": -3,
                "Initial power (MW)": 0,
                "Reserve eligibility": ["r1"]
            },
            "w1": {
                "Bus": "b2",
                "Type": "Profiled",
                "Maximum power (MW)": [10, 20, 5],
                "Cost ($/MW)": 1
            }
        },
        "Price-sensitive loads": {
            "ps1": {"Bus": "b2", "Demand (MW)": 5, "Revenue ($/MW)": 50}
        },
        "Reserves": {
            "r1": {"Amount (MW)": [5, 5, 0], "Shortfall penalty ($/MW)": 1000}
        },
        "Contingencies": {
            "c1": {"Affected lines": ["l1"]}
        }
    }"#
    .to_string()
}

#[fixture]
pub fn single_bus_input(single_bus_json: String) -> UCInput {
    parse_input(&single_bus_json, &ModelConfig::default()).unwrap()
}

#[fixture]
pub fn two_bus_input(two_bus_json: String) -> UCInput {
    parse_input(&two_bus_json, &ModelConfig::default()).unwrap()
}

#[fixture]
pub fn meshed_input(meshed_json: String) -> UCInput {
    parse_input(&meshed_json, &ModelConfig::default()).unwrap()
}

/// A 100 MW unit with two cost segments and two startup categories, initially off for 2 hours
#[fixture]
pub fn thermal_unit() -> ThermalGenerator {
    ThermalGenerator {
        id: "g1".into(),
        bus: 0,
        p_min: 20.0,
        p_max: 100.0,
        ramp_up: 100.0,
        ramp_down: 100.0,
        startup_limit: 100.0,
        shutdown_limit: 100.0,
        min_uptime: 1,
        min_downtime: 1,
        no_load_cost: 100.0,
        must_run: false,
        initial_status: -2,
        initial_power: 0.0,
        cost_segments: vec![
            CostSegment {
                length: 40.0,
                slope: 10.0,
            },
            CostSegment {
                length: 40.0,
                slope: 20.0,
            },
        ],
        startup_stages: vec![
            StartupStage {
                delay: 1,
                cost: 50.0,
            },
            StartupStage {
                delay: 4,
                cost: 150.0,
            },
        ],
        commitment_status: Vec::new(),
        reserves: Vec::new(),
    }
}
