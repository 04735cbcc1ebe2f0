use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Convert SWMM input files into layers and sheets, and back
#[derive(Parser, Debug)]
#[command(name = "swmm", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Read settings from this file instead of ~/.swmm/config.toml
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import an input file into GeoJSON layers and CSV sheets
    Import {
        /// Path to the .inp file
        #[arg(value_hint = ValueHint::FilePath)]
        inp: PathBuf,
        /// Output directory
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
    },
    /// Write an input file from a directory produced by `import`
    Export {
        /// Directory holding layers, workbooks and verbatim sections
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        /// Path of the .inp file to write
        #[arg(long, value_hint = ValueHint::FilePath)]
        inp: PathBuf,
    },
    /// List the known sections in write order
    Sections,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::parse_from(["swmm", "import", "model.inp", "--out", "layers"]);
        match cli.command {
            Commands::Import { inp, out } => {
                assert_eq!(inp, PathBuf::from("model.inp"));
                assert_eq!(out, PathBuf::from("layers"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "swmm",
            "export",
            "layers",
            "--inp",
            "out.inp",
            "--log-level",
            "debug",
            "--config",
            "swmm.toml",
        ]);
        assert_eq!(cli.log_level, Some(tracing::Level::DEBUG));
        assert_eq!(cli.config, Some(PathBuf::from("swmm.toml")));
    }
}
