//! The module responsible for writing results to disk.
use crate::formulation::{VariableManager, base_flow, net_injections};
use crate::generator::GeneratorID;
use crate::grid::{BusID, LineID};
use crate::instance::UCInput;
use crate::load::LoadID;
use crate::reserve::ReserveID;
use crate::solver::{Solution, SolveStatus};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// The root folder in which case-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "scuc_results";

/// The output file name for the full schedule
const SOLUTION_FILE_NAME: &str = "solution.json";

/// The output file name for generator dispatch
const DISPATCH_FILE_NAME: &str = "dispatch.csv";

/// The file name input documents are given when they live in a folder named after the case
const DEFAULT_INPUT_FILE_STEM: &str = "input";

/// Slack values below this are reported as zero
const SLACK_TOLERANCE: f64 = 1e-6;

/// Get the default output directory for the input document at the given path.
///
/// The case name is the file stem, unless the file is called `input.json`, in which case the name
/// of the containing folder is used instead.
pub fn get_output_dir(input_path: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified a relative path with no parent
    let input_path = input_path
        .canonicalize()
        .context("Could not resolve path to input file")?;

    let stem = input_path
        .file_stem()
        .context("Input path has no file name")?
        .to_str()
        .context("Invalid chars in input file name")?;

    let case_name = if stem == DEFAULT_INPUT_FILE_STEM {
        input_path
            .parent()
            .and_then(Path::file_name)
            .context("Input file cannot be in root folder")?
            .to_str()
            .context("Invalid chars in case folder name")?
    } else {
        stem
    };

    Ok([OUTPUT_DIRECTORY_ROOT, case_name].iter().collect())
}

/// Create a new output directory, clearing out an existing one if allowed.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether an existing non-empty folder may be overwritten
///
/// # Returns
///
/// Whether an existing folder with contents was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// The schedule of a thermal unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalSchedule {
    /// Whether the unit is on in each hour
    pub commitment: Vec<bool>,
    /// Whether the unit starts up in each hour
    pub startup: Vec<bool>,
    /// Total output in each hour (MW)
    pub production: Vec<f64>,
    /// Reserve provided in each hour (MW)
    pub reserve: Vec<f64>,
}

/// Base-case flows on a line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSchedule {
    /// Flow from source to target bus in each hour (MW)
    pub flow: Vec<f64>,
    /// Amount by which the normal limit is exceeded in each hour (MW)
    pub overflow: Vec<f64>,
}

/// Limit violations on a monitored line following an outage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyOverflow {
    /// The line taken out of service
    pub outaged_line: LineID,
    /// The line whose post-contingency flow is limited
    pub monitored_line: LineID,
    /// Amount by which the emergency limit is exceeded in each hour (MW)
    pub overflow: Vec<f64>,
}

/// A solved schedule, keyed by the names used in the input document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleReport {
    /// How the solve finished
    pub status: SolveStatus,
    /// Total cost of the schedule ($)
    pub objective_value: f64,
    /// Relative gap between the schedule and the solver's best bound
    pub gap: Option<f64>,
    /// Thermal unit schedules
    pub thermal_units: IndexMap<GeneratorID, ThermalSchedule>,
    /// Profiled unit output (MW)
    pub profiled_units: IndexMap<GeneratorID, Vec<f64>>,
    /// Demand served for each price-sensitive load (MW)
    pub price_sensitive_loads: IndexMap<LoadID, Vec<f64>>,
    /// Curtailed load per bus (MW)
    pub curtailment: IndexMap<BusID, Vec<f64>>,
    /// Reserve shortfall per requirement (MW)
    pub reserve_shortfall: IndexMap<ReserveID, Vec<f64>>,
    /// Base-case line flows
    pub lines: IndexMap<LineID, LineSchedule>,
    /// Post-contingency violations, for pairs with any violation only
    pub contingency_overflows: Vec<ContingencyOverflow>,
}

impl ScheduleReport {
    /// Read a schedule back from a solution.
    ///
    /// # Arguments
    ///
    /// * `input` - The instance which was solved
    /// * `vars` - The variables of the formulation which was solved
    /// * `solution` - The values found by the solver
    pub fn new(input: &UCInput, vars: &VariableManager, solution: &Solution) -> Self {
        let slack = |value: f64| if value < SLACK_TOLERANCE { 0.0 } else { value };

        let thermal_units = input
            .thermal_gens
            .iter()
            .enumerate()
            .map(|(g, unit)| {
                let schedule = ThermalSchedule {
                    commitment: input
                        .hours()
                        .map(|t| solution.value(vars.commitment(g, t)) > 0.5)
                        .collect(),
                    startup: input
                        .hours()
                        .map(|t| solution.value(vars.startup(g, t)) > 0.5)
                        .collect(),
                    production: hourly(input, |t| {
                        unit.p_min * solution.value(vars.commitment(g, t))
                            + solution.value(vars.production(g, t))
                    }),
                    reserve: hourly(input, |t| {
                        vars.reserve(g, t)
                            .map_or(0.0, |var| solution.value(var))
                    }),
                };
                (unit.id.clone(), schedule)
            })
            .collect();

        let profiled_units = input
            .profiled_gens
            .iter()
            .enumerate()
            .map(|(p, unit)| {
                let output = hourly(input, |t| solution.value(vars.profiled(p, t)));
                (unit.id.clone(), output)
            })
            .collect();

        let price_sensitive_loads = input
            .price_sensitive_loads
            .iter()
            .enumerate()
            .map(|(d, load)| {
                let served = hourly(input, |t| solution.value(vars.served(d, t)));
                (load.id.clone(), served)
            })
            .collect();

        let curtailment = input
            .buses
            .iter()
            .enumerate()
            .map(|(b, bus)| {
                let curtailed = hourly(input, |t| slack(solution.value(vars.curtailment(b, t))));
                (bus.id.clone(), curtailed)
            })
            .collect();

        let reserve_shortfall = input
            .reserves
            .iter()
            .enumerate()
            .map(|(r, reserve)| {
                let shortfall = hourly(input, |t| slack(solution.value(vars.shortfall(r, t))));
                (reserve.id.clone(), shortfall)
            })
            .collect();

        let injections: Vec<_> = input.hours().map(|t| net_injections(input, vars, t)).collect();
        let lines = input
            .lines
            .iter()
            .enumerate()
            .map(|(l, line)| {
                let schedule = LineSchedule {
                    flow: hourly(input, |t| {
                        base_flow(input, &injections[t], l).evaluate(&solution.values)
                    }),
                    overflow: hourly(input, |t| slack(solution.value(vars.flow_violation(l, t)))),
                };
                (line.id.clone(), schedule)
            })
            .collect();

        let contingency_overflows = input
            .relevant_pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| ContingencyOverflow {
                outaged_line: input.lines[pair.outaged].id.clone(),
                monitored_line: input.lines[pair.monitored].id.clone(),
                overflow: hourly(input, |t| {
                    slack(solution.value(vars.contingency_violation(i, t)))
                }),
            })
            .filter(|overflow| overflow.overflow.iter().any(|value| *value > 0.0))
            .collect();

        Self {
            status: solution.status,
            objective_value: solution.objective_value,
            gap: solution.gap,
            thermal_units,
            profiled_units,
            price_sensitive_loads,
            curtailment,
            reserve_shortfall,
            lines,
            contingency_overflows,
        }
    }

    /// Total curtailed load over all buses and hours (MWh)
    pub fn total_curtailment(&self) -> f64 {
        self.curtailment.values().flatten().sum()
    }

    /// Total reserve shortfall over all requirements and hours (MWh)
    pub fn total_reserve_shortfall(&self) -> f64 {
        self.reserve_shortfall.values().flatten().sum()
    }

    /// Number of line-hours with a base-case overflow
    pub fn num_overflows(&self) -> usize {
        self.lines
            .values()
            .flat_map(|line| &line.overflow)
            .filter(|value| **value > 0.0)
            .count()
    }
}

/// Evaluate a value for every hour of the horizon
fn hourly(input: &UCInput, value: impl Fn(usize) -> f64) -> Vec<f64> {
    input.hours().map(value).collect()
}

/// Represents a row in the dispatch CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DispatchRow {
    generator_id: GeneratorID,
    hour: usize,
    committed: bool,
    startup: bool,
    production: f64,
    reserve: f64,
}

/// Write the whole schedule as pretty-printed JSON
pub fn write_solution_json(output_dir: &Path, report: &ScheduleReport) -> Result<()> {
    let file_path = output_dir.join(SOLUTION_FILE_NAME);
    let file = File::create(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(())
}

/// Write one row per generator and hour to the dispatch CSV file.
///
/// Profiled units are always reported as committed, with no startups or reserve.
pub fn write_dispatch_csv(output_dir: &Path, report: &ScheduleReport) -> Result<()> {
    let file_path = output_dir.join(DISPATCH_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;

    for (generator_id, schedule) in &report.thermal_units {
        for (hour, production) in schedule.production.iter().enumerate() {
            writer.serialize(DispatchRow {
                generator_id: generator_id.clone(),
                hour,
                committed: schedule.commitment[hour],
                startup: schedule.startup[hour],
                production: *production,
                reserve: schedule.reserve[hour],
            })?;
        }
    }

    for (generator_id, output) in &report.profiled_units {
        for (hour, production) in output.iter().enumerate() {
            writer.serialize(DispatchRow {
                generator_id: generator_id.clone(),
                hour,
                committed: true,
                startup: false,
                production: *production,
                reserve: 0.0,
            })?;
        }
    }

    writer.flush()?;

    Ok(())
}

/// Write all output files for a solved schedule
pub fn write_results(output_dir: &Path, report: &ScheduleReport) -> Result<()> {
    write_solution_json(output_dir, report)?;
    write_dispatch_csv(output_dir, report)?;
    info!("Results written to {}", output_dir.display());

    Ok(())
}

/// Summarise a schedule in the log
pub fn log_report(report: &ScheduleReport) {
    info!(
        "Solve status: {}, total cost: {:.2}",
        report.status, report.objective_value
    );
    if report.status == SolveStatus::Feasible {
        match report.gap {
            Some(gap) => warn!("Schedule is not proven optimal (gap {:.2}%)", gap * 100.0),
            None => warn!("Schedule is not proven optimal"),
        }
    }

    let num_startups: usize = report
        .thermal_units
        .values()
        .map(|unit| unit.startup.iter().filter(|started| **started).count())
        .sum();
    info!("{num_startups} unit startups scheduled");

    let curtailment = report.total_curtailment();
    if curtailment > 0.0 {
        warn!("{curtailment:.2} MWh of load curtailed");
    }

    let shortfall = report.total_reserve_shortfall();
    if shortfall > 0.0 {
        warn!("{shortfall:.2} MWh of reserve shortfall");
    }

    let num_overflows = report.num_overflows();
    if num_overflows > 0 {
        warn!("Line limits exceeded in {num_overflows} line-hours");
    }
    if !report.contingency_overflows.is_empty() {
        warn!(
            "Emergency limits exceeded for {} contingency pairs",
            report.contingency_overflows.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{single_bus_input, two_bus_input};
    use crate::formulation::build_formulation;
    use float_cmp::assert_approx_eq;
    use itertools::{Itertools, assert_equal};
    use rstest::rstest;
    use tempfile::tempdir;

    /// A solution with every column at zero except those set by `assign`
    fn solution_with(
        input: &UCInput,
        assign: impl FnOnce(&VariableManager, &mut Vec<f64>),
    ) -> (VariableManager, Solution) {
        let formulation = build_formulation(input).unwrap();
        let mut values = vec![0.0; formulation.problem.num_columns()];
        assign(&formulation.vars, &mut values);
        let solution = Solution {
            status: SolveStatus::Optimal,
            objective_value: formulation.problem.objective_value(&values),
            values,
            gap: None,
        };

        (formulation.vars, solution)
    }

    fn single_bus_report(input: &UCInput) -> ScheduleReport {
        let (vars, solution) = solution_with(input, |vars, values| {
            for t in input.hours() {
                values[vars.commitment(0, t).0] = 1.0;
                values[vars.production(0, t).0] = 50.0;
                values[vars.segment(0, 0, t).0] = 50.0;
            }
            values[vars.startup(0, 0).0] = 1.0;
        });

        ScheduleReport::new(input, &vars, &solution)
    }

    #[rstest]
    fn test_report_thermal(single_bus_input: UCInput) {
        let report = single_bus_report(&single_bus_input);
        let unit = &report.thermal_units["g1"];
        assert_eq!(unit.commitment, [true, true]);
        assert_eq!(unit.startup, [true, false]);
        assert_eq!(unit.production, [50.0, 50.0]);
        assert_eq!(unit.reserve, [0.0, 0.0]);
        assert_approx_eq!(f64, report.objective_value, 1000.0);
        assert_approx_eq!(f64, report.total_curtailment(), 0.0);
        assert!(report.lines.is_empty());
    }

    #[rstest]
    fn test_report_flows(two_bus_input: UCInput) {
        let (vars, solution) = solution_with(&two_bus_input, |vars, values| {
            values[vars.commitment(0, 0).0] = 1.0;
            values[vars.production(0, 0).0] = 100.0;
            values[vars.segment(0, 0, 0).0] = 100.0;
            values[vars.flow_violation(0, 0).0] = 50.0;
        });
        let report = ScheduleReport::new(&two_bus_input, &vars, &solution);

        let line = &report.lines["l1"];
        assert_approx_eq!(f64, line.flow[0], 100.0, epsilon = 1e-9);
        assert_approx_eq!(f64, line.overflow[0], 50.0);
        assert_eq!(report.num_overflows(), 1);
        assert!(report.contingency_overflows.is_empty());
    }

    #[rstest]
    fn test_write_dispatch_csv(single_bus_input: UCInput) {
        let report = single_bus_report(&single_bus_input);
        let dir = tempdir().unwrap();
        write_dispatch_csv(dir.path(), &report).unwrap();

        let expected = [0, 1].map(|hour| DispatchRow {
            generator_id: "g1".into(),
            hour,
            committed: true,
            startup: hour == 0,
            production: 50.0,
            reserve: 0.0,
        });
        let records: Vec<DispatchRow> = csv::Reader::from_path(dir.path().join(DISPATCH_FILE_NAME))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap();
        assert_equal(records, expected);
    }

    #[rstest]
    fn test_write_solution_json(single_bus_input: UCInput) {
        let report = single_bus_report(&single_bus_input);
        let dir = tempdir().unwrap();
        write_solution_json(dir.path(), &report).unwrap();

        let contents = fs::read_to_string(dir.path().join(SOLUTION_FILE_NAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(json["status"], "optimal");
        assert_eq!(json["thermal_units"]["g1"]["commitment"][1], true);
        assert_eq!(json["curtailment"]["b1"][0], 0.0);
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let case_dir = dir.path().join("my_case");
        fs::create_dir(&case_dir).unwrap();
        for name in ["input.json", "winter_peak.json"] {
            File::create(case_dir.join(name)).unwrap();
        }

        assert_eq!(
            get_output_dir(&case_dir.join("input.json")).unwrap(),
            PathBuf::from_iter([OUTPUT_DIRECTORY_ROOT, "my_case"])
        );
        assert_eq!(
            get_output_dir(&case_dir.join("winter_peak.json")).unwrap(),
            PathBuf::from_iter([OUTPUT_DIRECTORY_ROOT, "winter_peak"])
        );
        assert!(get_output_dir(&case_dir.join("missing.json")).is_err());
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        // New folder
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing empty folder
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Existing folder with contents
        File::create(output_dir.join("file.txt")).unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("file.txt").exists());
    }
}
