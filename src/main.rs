//! `sonrai` command-line inspector.
//!
//! Loads one or more annotation files through the same validation the viewer
//! uses and prints per-page and per-category counts.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;

    use sonrai::config::AppConfig;
    use sonrai::format::AnnotationFile;

    #[derive(Debug, Parser)]
    #[command(name = "sonrai")]
    #[command(about = "Summarize sonrai annotation files", version)]
    pub struct Cli {
        /// Annotation files to inspect
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<PathBuf>,
    }

    /// Print a summary of every file. Returns `false` if any failed to load.
    pub fn run(cli: &Cli) -> bool {
        let mut ok = true;
        for path in &cli.paths {
            match AnnotationFile::load(path) {
                Ok(file) => print!("{}", file.summary()),
                Err(e) => {
                    log::error!("Failed to load {}: {}", path.display(), e);
                    eprintln!("{}: {}", path.display(), e);
                    ok = false;
                }
            }
        }
        ok
    }

    pub fn init_logging() {
        let config = AppConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parses_paths() {
            let cli = Cli::try_parse_from(["sonrai", "a.json", "b.json"]).unwrap();
            assert_eq!(cli.paths, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        }

        #[test]
        fn test_requires_a_path() {
            let err = Cli::try_parse_from(["sonrai"]).unwrap_err();
            assert_eq!(
                err.kind(),
                clap::error::ErrorKind::MissingRequiredArgument
            );
        }

        #[test]
        fn test_help_is_not_a_path() {
            let err = Cli::try_parse_from(["sonrai", "--help"]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        }

        #[test]
        fn test_run_reports_failure() {
            let temp = tempfile::tempdir().expect("temp dir should be created");
            let good = temp.path().join("good.json");
            std::fs::write(&good, r#"{"annotations": []}"#).unwrap();

            let ok = Cli::try_parse_from([PathBuf::from("sonrai"), good.clone()]).unwrap();
            assert!(run(&ok));

            let missing = temp.path().join("missing.json");
            let bad = Cli::try_parse_from([PathBuf::from("sonrai"), good, missing]).unwrap();
            assert!(!run(&bad));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    let cli = cli::Cli::parse();
    cli::init_logging();
    if cli::run(&cli) {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
