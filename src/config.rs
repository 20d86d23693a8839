//! Defines the [`ModelConfig`] struct, the immutable configuration handed to every component that
//! needs default values or solver options.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_solver_time_limit_sec, u32, 600);
define_param_default!(default_relative_gap, f64, 0.01);
define_param_default!(default_line_limit_mw, f64, 10_000.0);
define_param_default!(default_flow_penalty, f64, 10_000.0);
define_param_default!(default_curtail_penalty, f64, 100_000.0);
define_param_default!(default_ptdf_sparsity_cutoff, f64, 0.01);
define_param_default!(default_lodf_sparsity_cutoff, f64, 0.05);
define_param_default!(default_lodf_singularity_tolerance, f64, 1e-6);

/// What to do with a contingency whose outage would island part of the network
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IslandingPolicy {
    /// Drop the contingency and carry on
    #[default]
    #[string = "skip"]
    Skip,
    /// Abort loading with an error
    #[string = "fail"]
    Fail,
}

/// Configuration for the formulation and the solver.
///
/// Once loaded (and any command-line overrides applied) this is never modified.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ModelConfig {
    /// Wall-clock limit handed to the solver, in seconds
    #[serde(default = "default_solver_time_limit_sec")]
    pub solver_time_limit_sec: u32,
    /// Target relative optimality gap (best effort)
    #[serde(default = "default_relative_gap")]
    pub relative_gap: f64,
    /// Line limit used when a line has no normal flow limit (MW)
    #[serde(default = "default_line_limit_mw")]
    pub default_line_limit_mw: f64,
    /// Flow violation penalty used when a line has none ($/MW)
    #[serde(default = "default_flow_penalty")]
    pub default_flow_penalty: f64,
    /// Penalty for curtailed load ($/MWh)
    #[serde(default = "default_curtail_penalty")]
    pub curtail_penalty: f64,
    /// PTDF entries with a smaller magnitude are stored as zero
    #[serde(default = "default_ptdf_sparsity_cutoff")]
    pub ptdf_sparsity_cutoff: f64,
    /// LODF entries with a smaller magnitude are stored as zero
    #[serde(default = "default_lodf_sparsity_cutoff")]
    pub lodf_sparsity_cutoff: f64,
    /// An outage is treated as islanding when `|1 - PTDF_kk|` falls below this value
    #[serde(default = "default_lodf_singularity_tolerance")]
    pub lodf_singularity_tolerance: f64,
    /// How islanding contingencies are handled
    #[serde(default)]
    pub islanding_outages: IslandingPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        toml::from_str("").expect("Cannot create config from empty TOML file")
    }
}

/// Check that a value is finite and not negative
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that a value is finite and strictly positive
fn check_positive(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

impl ModelConfig {
    /// Read a config file from the specified path.
    ///
    /// # Returns
    ///
    /// The file contents as a [`ModelConfig`] or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<ModelConfig> {
        let config: ModelConfig = read_toml(file_path)?;

        config
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(config)
    }

    /// Check that all values are within range
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.solver_time_limit_sec > 0,
            "solver_time_limit_sec cannot be zero"
        );
        ensure!(
            (0.0..1.0).contains(&self.relative_gap),
            "relative_gap must be at least zero and less than one"
        );
        check_positive("default_line_limit_mw", self.default_line_limit_mw)?;
        check_non_negative("default_flow_penalty", self.default_flow_penalty)?;
        check_non_negative("curtail_penalty", self.curtail_penalty)?;
        check_non_negative("ptdf_sparsity_cutoff", self.ptdf_sparsity_cutoff)?;
        check_non_negative("lodf_sparsity_cutoff", self.lodf_sparsity_cutoff)?;
        check_positive(
            "lodf_singularity_tolerance",
            self.lodf_singularity_tolerance,
        )?;

        Ok(())
    }
}
