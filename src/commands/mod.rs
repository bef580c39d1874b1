pub mod review;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config;
use crate::pipeline::identity::parse_flexible_date;
use crate::pipeline::{PhysicianDirectory, ReviewError};

#[derive(Parser, Debug)]
#[command(name = "cppt-review")]
#[command(version, about = "Review text generator for SIMRS CPPT exports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a numbered review batch from JSON patient exports
    Batch {
        /// Patient export files (one export or an array per file)
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Operator name, applied to every report
        #[arg(long, default_value = "")]
        operator: String,
        /// DPJP override, applied to every report
        #[arg(long)]
        dpjp: Option<String>,
        /// Review date (YYYY-MM-DD or DD/MM/YYYY); selects that day's note
        /// and enables dated follow-ups
        #[arg(long)]
        date: Option<String>,
        /// JSON physician directory replacing the built-in one
        #[arg(long)]
        directory: Option<PathBuf>,
        /// Write the review text here instead of stdout (bare flag: review.txt)
        #[arg(short, long, num_args = 0..=1, default_missing_value = config::DEFAULT_OUTPUT_NAME)]
        output: Option<PathBuf>,
    },
    /// Validate and render a hand-typed review from a JSON entry
    Manual {
        /// Manual entry file
        #[arg(short, long)]
        entry: PathBuf,
        /// Block number in the output
        #[arg(long, default_value_t = 1)]
        index: usize,
        /// JSON physician directory replacing the built-in one
        #[arg(long)]
        directory: Option<PathBuf>,
        /// Write the review text here instead of stdout (bare flag: review.txt)
        #[arg(short, long, num_args = 0..=1, default_missing_value = config::DEFAULT_OUTPUT_NAME)]
        output: Option<PathBuf>,
    },
    /// List canonical DPJP names usable with --dpjp
    Physicians {
        /// JSON physician directory replacing the built-in one
        #[arg(long)]
        directory: Option<PathBuf>,
    },
}

/// Run one command and return the text it produces.
pub fn execute(command: Commands) -> Result<String, ReviewError> {
    match command {
        Commands::Batch {
            inputs,
            operator,
            dpjp,
            date,
            directory,
            output,
        } => {
            let options = review::batch_options(
                operator,
                dpjp,
                parse_cli_date(date.as_deref())?,
                load_directory(directory.as_deref())?,
            );
            let text = review::run_batch(&inputs, &options)?;
            emit(text, output.as_deref())
        }
        Commands::Manual {
            entry,
            index,
            directory,
            output,
        } => {
            let text = review::run_manual(&entry, index, &load_directory(directory.as_deref())?)?;
            emit(text, output.as_deref())
        }
        Commands::Physicians { directory } => {
            Ok(load_directory(directory.as_deref())?.canonical_names().join("\n"))
        }
    }
}

/// `--directory`, then the environment, then the built-in table.
pub fn load_directory(explicit: Option<&Path>) -> Result<PhysicianDirectory, ReviewError> {
    match explicit.map(Path::to_path_buf).or_else(config::directory_path_from_env) {
        Some(path) => PhysicianDirectory::from_json_file(&path),
        None => Ok(PhysicianDirectory::default()),
    }
}

pub fn parse_cli_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ReviewError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => parse_flexible_date(text)
            .map(Some)
            .ok_or_else(|| ReviewError::InvalidDate(text.to_string())),
        None => Ok(None),
    }
}

/// Write to `output` when given (returning an empty string), else hand the
/// text back for stdout.
fn emit(text: String, output: Option<&Path>) -> Result<String, ReviewError> {
    match output {
        Some(path) => {
            std::fs::write(path, text.as_bytes())?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Review written");
            Ok(String::new())
        }
        None => Ok(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_batch() {
        let cli = Cli::try_parse_from([
            "cppt-review", "batch", "-i", "a.json", "b.json", "--operator", "Andi", "--date", "2026-10-19",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch { inputs, operator, date, dpjp, .. } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(operator, "Andi");
                assert_eq!(date.as_deref(), Some("2026-10-19"));
                assert!(dpjp.is_none());
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn bare_output_flag_uses_default_name() {
        let cli = Cli::try_parse_from(["cppt-review", "batch", "-i", "a.json", "-o"]).unwrap();
        match cli.command {
            Commands::Batch { output, .. } => {
                assert_eq!(output, Some(PathBuf::from(config::DEFAULT_OUTPUT_NAME)));
            }
            other => panic!("expected batch, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["cppt-review", "manual", "-e", "entry.json", "--output", "siti.txt"]).unwrap();
        match cli.command {
            Commands::Manual { output, .. } => assert_eq!(output, Some(PathBuf::from("siti.txt"))),
            other => panic!("expected manual, got {other:?}"),
        }
    }

    #[test]
    fn batch_requires_input() {
        assert!(Cli::try_parse_from(["cppt-review", "batch"]).is_err());
    }

    #[test]
    fn cli_dates() {
        assert_eq!(parse_cli_date(None).unwrap(), None);
        assert_eq!(parse_cli_date(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_cli_date(Some("19/10/2026")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19)
        );
        assert!(matches!(parse_cli_date(Some("besok")), Err(ReviewError::InvalidDate(_))));
    }

    #[test]
    fn explicit_directory_is_loaded() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"entries":[{"canonical":"drg. Nur, Sp.B.M.M.","aliases":["nur"]}]}"#,
        )
        .unwrap();
        let dir = load_directory(Some(file.path())).unwrap();
        assert_eq!(dir.canonical_names(), vec!["drg. Nur, Sp.B.M.M."]);
    }

    #[test]
    fn physicians_lists_builtin_names() {
        let file = write_default_directory();
        let text = execute(Commands::Physicians {
            directory: Some(file.path().to_path_buf()),
        })
        .unwrap();
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn output_file_receives_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::DEFAULT_OUTPUT_NAME);
        let returned = emit("1. Nama            : Budi".into(), Some(&path)).unwrap();
        assert_eq!(returned, "");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1. Nama            : Budi");
    }

    fn write_default_directory() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_vec(&PhysicianDirectory::default()).unwrap()).unwrap();
        file
    }
}
