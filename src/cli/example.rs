//! Code related to the bundled example cases and the CLI commands for interacting with them.
use super::{RunOpts, handle_run_command};
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the example cases.
static EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The name of the input document in each example folder
const EXAMPLE_INPUT_FILE_NAME: &str = "input.json";

/// The name of the description file in each example folder
const EXAMPLE_README_FILE_NAME: &str = "README.txt";

/// The available subcommands for managing example cases.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example case to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Run an example.
    Run {
        /// The name of the example to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run { name, opts } => handle_example_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// The names of the bundled examples
pub fn example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES_DIR
        .dirs()
        .filter_map(|dir| dir.path().file_name()?.to_str())
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for name in example_names() {
        println!("{name}");
    }
}

/// Get the description of the specified example
fn example_info(name: &str) -> Result<&'static str> {
    let path: PathBuf = [name, EXAMPLE_README_FILE_NAME].iter().collect();
    EXAMPLES_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    println!("{}", example_info(name)?);

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    let sub_dir = EXAMPLES_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    // Copy the contents of the subdirectory to the destination
    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::Dir(dir) => bail!(
                "Unexpected subdirectory in example: {}",
                dir.path().display()
            ),
            DirEntry::File(f) => {
                let file_name = f
                    .path()
                    .file_name()
                    .context("Example file has no name")?;
                fs::write(new_path.join(file_name), f.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let case_path = temp_dir.path().join(name);
    extract_example(name, &case_path)?;
    handle_run_command(&case_path.join(EXAMPLE_INPUT_FILE_NAME), opts, settings)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::formulation::build_formulation;
    use crate::input::parse_input;
    use tempfile::tempdir;

    #[test]
    fn test_examples_have_input_and_readme() {
        assert!(example_names().count() > 0);
        for name in example_names() {
            assert!(!example_info(name).unwrap().is_empty());
            let dir = EXAMPLES_DIR.get_dir(name).unwrap();
            assert!(dir.get_file(dir.path().join(EXAMPLE_INPUT_FILE_NAME)).is_some());
        }
    }

    #[test]
    fn test_examples_build() {
        for name in example_names() {
            let path: PathBuf = [name, EXAMPLE_INPUT_FILE_NAME].iter().collect();
            let json = EXAMPLES_DIR.get_file(path).unwrap().contents_utf8().unwrap();
            let input = parse_input(json, &ModelConfig::default()).unwrap();
            build_formulation(&input).unwrap();
        }
    }

    #[test]
    fn test_example_info_missing() {
        assert!(example_info("no_such_example").is_err());
    }

    #[test]
    fn test_extract_example() {
        let name = example_names().next().unwrap();
        let dir = tempdir().unwrap();
        let dest = dir.path().join(name);
        extract_example(name, &dest).unwrap();
        assert!(dest.join(EXAMPLE_INPUT_FILE_NAME).is_file());
        assert!(dest.join(EXAMPLE_README_FILE_NAME).is_file());

        // Won't overwrite
        assert!(extract_example(name, &dest).is_err());
    }
}
