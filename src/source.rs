use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::debug;

use crate::historytrends::ExportError;

const MAX_SIZE_HINT: u64 = 1 << 20;

/// An opened export: its byte stream and the name to match against the
/// export filename grammar.
pub struct ExportSource {
    pub name: String,
    pub reader: Box<dyn Read>,
}

impl std::fmt::Debug for ExportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSource")
            .field("name", &self.name)
            .field("reader", &"<dyn Read>")
            .finish()
    }
}

/// Open a bare `.tsv`/`.txt` export or the single file inside a `.zip`.
pub fn open_export_source(path: &Path) -> Result<ExportSource, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "tsv" | "txt" => Ok(ExportSource {
            name: base_name(path),
            reader: Box::new(File::open(path)?),
        }),
        "zip" => open_single_file_zip(path),
        _ => Err(ExportError::Format(format!(
            "bad file extension {:?}: {}",
            ext,
            path.display()
        ))),
    }
}

/// The member is buffered in memory because the zip reader borrows its
/// archive for as long as a member is open. The declared size is only a
/// capacity hint, capped at `MAX_SIZE_HINT`.
pub fn open_single_file_zip(path: &Path) -> Result<ExportSource, ExportError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    if archive.len() != 1 {
        return Err(ExportError::Format(format!(
            "zip has {} files: {}",
            archive.len(),
            path.display()
        )));
    }
    let mut member = archive.by_index(0)?;
    let name = base_name(Path::new(member.name()));
    let hint = member.size().min(MAX_SIZE_HINT);
    let mut data = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
    member.read_to_end(&mut data)?;
    debug!("read zip member {} ({} bytes) from {}", name, data.len(), path.display());
    Ok(ExportSource {
        name,
        reader: Box::new(Cursor::new(data)),
    })
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
