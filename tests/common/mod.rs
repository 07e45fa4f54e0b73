//! Shared fixtures for export tests.
//!
//! Exports are written into a tempdir under their real filenames, since the
//! reader takes kind and export time from the name.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

// ============================================================================
// Fixture Records
// ============================================================================

/// Analysis records exported at UTC-06:00, the second with sub-ms time and
/// a title full of no-break spaces, the third with the `@` host quirk.
pub const ANALYSIS_CST: &str = concat!(
    "http://example.com/\texample.com\texample.com\t1384634958041\t",
    "2013-11-16 14:49:18.041\t6\tlink\tExample\r\n",
    "https://www.bbc.co.uk/news\twww.bbc.co.uk\tbbc.co.uk\t1384635000000.5\t",
    "2013-11-16 14:50:00.000\t6\ttyped\tBBC\u{00A0}\u{00A0}News\r\n",
    "https://web.archive.org/save/https://medium.com/@user/x\tuser\t\t1384635060000\t",
    "2013-11-16 14:51:00.000\t6\tform_submit\tInbox\r\n",
);

/// Archived records: Unix-ms time, Windows-µs time, blank time, no title.
pub const ARCHIVED: &str = concat!(
    "http://example.com/\tU1384634958041\t805306368\tExample\r\n",
    "https://www.example.org/a\t13149893660345543\t1\tA page\r\n",
    "https://blank.example/\t\t8\tBlank time\r\n",
    "https://short.example/\tU1505420060345\t0\r\n",
);

// ============================================================================
// Writers
// ============================================================================

pub fn write_export(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write export");
    path
}

pub fn write_zip(dir: &Path, zip_name: &str, members: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(zip_name);
    let file = File::create(&path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in members {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start member");
        zip.write_all(body.as_bytes()).expect("write member");
    }
    zip.finish().expect("finish zip");
    path
}

/// `n` archived records with Unix-ms times one second apart.
pub fn archived_lines(n: usize) -> String {
    let mut out = String::with_capacity(n * 64);
    for i in 0..n {
        out.push_str(&format!(
            "https://site{}.example.com/page/{}\tU{}\t{}\tPage {}\r\n",
            i % 97,
            i,
            1_384_634_958_041u64 + i as u64 * 1000,
            i % 11,
            i
        ));
    }
    out
}
