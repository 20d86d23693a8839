//! Formulation and solution of security-constrained unit commitment (SCUC) problems.
//!
//! An input document describing a power network, its generators and loads over a horizon of
//! hourly steps is normalised into a [`instance::UCInput`], formulated as a mixed-integer linear
//! program with DC power flow and N-1 line contingency constraints, and solved with HiGHS.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod config;
pub mod error;
pub mod formulation;
pub mod generator;
pub mod grid;
pub mod id;
pub mod input;
pub mod instance;
pub mod load;
pub mod log;
pub mod milp;
pub mod network;
pub mod output;
pub mod reserve;
pub mod settings;
pub mod solver;

#[cfg(test)]
mod fixture;

/// Get the folder where program settings are stored.
///
/// Falls back to the working directory on platforms with no user config folder.
pub fn get_scuc_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("scuc");

    path
}
