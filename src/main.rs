use anyhow::Result;
use tracing::info;

use histrends::cli::{self, Command};
use histrends::commands::{self, ConvertOptions, InspectOptions};
use histrends::{config, logging, util};

fn main() -> Result<()> {
    let cli_opts = cli::parse();
    logging::init_logging(cli_opts.log_json);

    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let cfg = loaded.config;
    info!("starting run_id={} config_hash={}", cfg.run_id, loaded.config_hash);

    match cli_opts.command {
        Command::Inspect {
            input,
            output,
            metadata_backend,
        } => {
            let backend = metadata_backend
                .map(util::backend_from_cli)
                .unwrap_or(cfg.metadata_backend);
            let summary = commands::inspect(
                &input,
                &InspectOptions {
                    run_id: &cfg.run_id,
                    output_dir: &output,
                    backend,
                    config_hash: &loaded.config_hash,
                },
            )?;
            println!(
                "{}\t{}\t{}\t{}",
                summary.filename,
                summary.export_kind.map(|k| k.as_str()).unwrap_or("unknown"),
                summary.export_time,
                summary.visits
            );
        }
        Command::Convert {
            input,
            to,
            utc_offset,
            output,
        } => {
            let zone = utc_offset
                .as_deref()
                .map(util::parse_utc_offset)
                .transpose()?;
            let path = commands::convert(
                &input,
                &ConvertOptions {
                    kind: to.map(Into::into).unwrap_or(cfg.convert_kind),
                    zone,
                    default_zone: cfg.convert_zone()?,
                    output,
                },
            )?;
            println!("{}", path.display());
        }
    }

    info!("histrends run finished");
    Ok(())
}
