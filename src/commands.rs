//! The `inspect` and `convert` flows behind the binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};

use crate::historytrends::{Export, ExportKind, ExportReader, export_filename};
use crate::metadata::{self, MetadataBackendKind, RunSummary, VisitRecord};
use crate::util;

pub struct InspectOptions<'a> {
    pub run_id: &'a str,
    pub output_dir: &'a Path,
    pub backend: MetadataBackendKind,
    pub config_hash: &'a str,
}

/// Stream every visit of `input` into a metadata sink under
/// `<output_dir>/<run_id>/metadata/`.
pub fn inspect(input: &Path, opts: &InspectOptions<'_>) -> Result<RunSummary> {
    let run_output_dir = opts.output_dir.join(opts.run_id);
    util::ensure_output_dir(&run_output_dir)?;

    let input_sha256 = util::sha256_file(input).with_context(|| format!("hashing {}", input.display()))?;
    let sink = metadata::build_sink(
        opts.backend,
        env!("CARGO_PKG_VERSION"),
        opts.config_hash,
        &run_output_dir,
    )?;

    let mut reader = ExportReader::open(input).with_context(|| format!("opening {}", input.display()))?;
    let filename = reader.filename().to_string();
    let mut visits = 0u64;
    while let Some(visit) = reader
        .read()
        .with_context(|| format!("reading {}", input.display()))?
    {
        visits += 1;
        let record = VisitRecord::from_visit(opts.run_id, &filename, reader.kind(), reader.record() as u64, &visit);
        sink.record_visit(&record)?;
    }
    if visits == 0 {
        warn!("{} holds no visits", filename);
    }

    let summary = RunSummary {
        run_id: opts.run_id.to_string(),
        filename,
        export_kind: reader.kind(),
        export_time: reader.time().to_rfc3339(),
        visits,
        input_sha256,
    };
    sink.record_summary(&summary)?;
    sink.flush()?;

    info!(
        "inspected {} ({} visits, kind={}, time={})",
        summary.filename,
        summary.visits,
        summary.export_kind.map(|k| k.as_str()).unwrap_or("unknown"),
        summary.export_time
    );
    Ok(summary)
}

pub struct ConvertOptions {
    pub kind: ExportKind,
    /// Explicit zone for analysis output.
    pub zone: Option<FixedOffset>,
    /// Zone for analysis output when the source carries none.
    pub default_zone: FixedOffset,
    /// A `.tsv`/`.txt` path, or a directory for the canonical filename.
    pub output: PathBuf,
}

/// Re-encode `input` as `opts.kind`, returning the written path.
pub fn convert(input: &Path, opts: &ConvertOptions) -> Result<PathBuf> {
    let export = ExportReader::open(input)
        .and_then(|mut reader| reader.read_all())
        .with_context(|| format!("reading {}", input.display()))?;

    let converted = Export {
        filename: export.filename.clone(),
        kind: Some(opts.kind),
        time: target_time(&export, opts),
        visits: export.visits,
    };

    let path = output_path(&converted, opts)?;
    if path.exists() && same_file(&path, input) {
        bail!("refusing to overwrite the input export {}", input.display());
    }

    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = converted
        .write_to(BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()?;

    info!(
        "converted {} visits from {} to {} export {}",
        converted.visits.len(),
        converted.filename,
        opts.kind,
        path.display()
    );
    Ok(path)
}

fn target_time(export: &Export, opts: &ConvertOptions) -> DateTime<FixedOffset> {
    match opts.kind {
        ExportKind::Archived => export.time.with_timezone(&Utc).fixed_offset(),
        ExportKind::Analysis => {
            let source_zone = match export.kind {
                Some(ExportKind::Analysis) => Some(*export.time.offset()),
                _ => None,
            };
            let zone = opts.zone.or(source_zone).unwrap_or(opts.default_zone);
            export.time.with_timezone(&zone)
        }
    }
}

fn output_path(export: &Export, opts: &ConvertOptions) -> Result<PathBuf> {
    let is_file = opts
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv") || e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if is_file {
        if let Some(parent) = opts.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            util::ensure_output_dir(parent)?;
        }
        return Ok(opts.output.clone());
    }
    util::ensure_output_dir(&opts.output)?;
    Ok(opts.output.join(export_filename(opts.kind, export.time.naive_local())))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
