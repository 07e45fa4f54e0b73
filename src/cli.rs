use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum MetadataBackend {
    Jsonl,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Analysis,
    Archived,
}

impl From<TargetKind> for crate::historytrends::ExportKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Analysis => crate::historytrends::ExportKind::Analysis,
            TargetKind::Archived => crate::historytrends::ExportKind::Archived,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Optional path to config file (YAML)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read an export and write per-visit metadata
    Inspect {
        /// Export file (.tsv, .txt or single-file .zip)
        input: PathBuf,

        /// Output directory for metadata
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Metadata backend (overrides config when set)
        #[arg(long, value_enum)]
        metadata_backend: Option<MetadataBackend>,
    },
    /// Re-encode an export in another layout or zone
    Convert {
        /// Export file (.tsv, .txt or single-file .zip)
        input: PathBuf,

        /// Target layout (overrides config when set)
        #[arg(long, value_enum)]
        to: Option<TargetKind>,

        /// Zone for analysis output, e.g. -06:00
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<String>,

        /// Output file, or directory to place the canonical filename in
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_inspect_with_backend() {
        let opts = CliOptions::try_parse_from([
            "histrends",
            "inspect",
            "exported_archived_history_20131116.tsv",
            "--metadata-backend",
            "csv",
        ])
        .expect("parse");
        match opts.command {
            Command::Inspect {
                input,
                output,
                metadata_backend,
            } => {
                assert_eq!(input, PathBuf::from("exported_archived_history_20131116.tsv"));
                assert_eq!(output, PathBuf::from("./output"));
                assert!(matches!(metadata_backend, Some(MetadataBackend::Csv)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_convert_with_negative_offset() {
        let opts = CliOptions::try_parse_from([
            "histrends",
            "--log-json",
            "convert",
            "in.zip",
            "--to",
            "analysis",
            "--utc-offset",
            "-06:00",
            "-o",
            "out.tsv",
        ])
        .expect("parse");
        assert!(opts.log_json);
        match opts.command {
            Command::Convert {
                to, utc_offset, output, ..
            } => {
                assert_eq!(to, Some(TargetKind::Analysis));
                assert_eq!(utc_offset.as_deref(), Some("-06:00"));
                assert_eq!(output, PathBuf::from("out.tsv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_path_after_subcommand() {
        let opts = CliOptions::try_parse_from(["histrends", "inspect", "a.tsv", "--config-path", "c.yml"])
            .expect("parse");
        assert_eq!(opts.config_path, Some(PathBuf::from("c.yml")));
    }

    #[test]
    fn rejects_unknown_target_kind() {
        assert!(CliOptions::try_parse_from(["histrends", "convert", "a.tsv", "--to", "sqlite"]).is_err());
    }

    #[test]
    fn requires_subcommand() {
        assert!(CliOptions::try_parse_from(["histrends"]).is_err());
    }
}
