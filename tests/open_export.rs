mod common;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

use histrends::historytrends::{ExportError, ExportKind, ExportReader};
use histrends::transition::PageTransition;

fn open_err(path: &std::path::Path) -> ExportError {
    match ExportReader::open(path) {
        Ok(_) => panic!("{} opened", path.display()),
        Err(err) => err,
    }
}

#[test]
fn opens_analysis_tsv_and_infers_zone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::write_export(
        dir.path(),
        "exported_analysis_history_20131116_145500.tsv",
        common::ANALYSIS_CST,
    );

    let export = ExportReader::open(&path).expect("open").read_all().expect("read");
    assert_eq!(export.filename, "exported_analysis_history_20131116_145500.tsv");
    assert_eq!(export.kind, Some(ExportKind::Analysis));

    let cst = FixedOffset::west_opt(6 * 3600).unwrap();
    assert_eq!(export.time, cst.with_ymd_and_hms(2013, 11, 16, 14, 55, 0).unwrap());
    assert_eq!(export.visits.len(), 3);

    assert_eq!(export.visits[1].page_title, "BBC News");
    assert_eq!(export.visits[1].transition, PageTransition::TYPED);
    let t = export.visits[1].visit_time.expect("time");
    assert_eq!(t.timestamp_millis(), 1_384_635_000_000);
    assert_eq!(t.timestamp_subsec_nanos(), 500_000);

    assert_eq!(export.visits[2].transition, PageTransition::FORM_SUBMIT);
}

#[test]
fn opens_archived_txt_with_mixed_time_encodings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::write_export(dir.path(), "exported_archived_history_20171001.txt", common::ARCHIVED);

    let mut reader = ExportReader::open(&path).expect("open");
    assert_eq!(reader.kind(), Some(ExportKind::Archived));
    let export = reader.read_all().expect("read");

    assert_eq!(export.time, Utc.with_ymd_and_hms(2017, 10, 1, 0, 0, 0).unwrap().fixed_offset());
    assert_eq!(reader.utc_offset(), None);
    assert_eq!(export.visits.len(), 4);

    assert_eq!(export.visits[0].transition.core(), PageTransition::LINK);
    let windows = export.visits[1].visit_time.expect("windows time");
    assert_eq!(
        windows.naive_utc(),
        NaiveDate::from_ymd_opt(2017, 9, 14)
            .unwrap()
            .and_hms_micro_opt(20, 14, 20, 345_543)
            .unwrap()
    );
    assert_eq!(export.visits[2].visit_time, None);
    assert_eq!(export.visits[3].page_title, "");
}

#[test]
fn zip_uses_inner_name_for_kind_and_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::write_zip(
        dir.path(),
        "downloaded (1).zip",
        &[("history_autobackup_20200102_incremental.tsv", common::ARCHIVED)],
    );

    let mut reader = ExportReader::open(&path).expect("open");
    assert_eq!(reader.filename(), "history_autobackup_20200102_incremental.tsv");
    let export = reader.read_all().expect("read");
    assert_eq!(export.kind, Some(ExportKind::Archived));
    assert_eq!(export.time, Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap().fixed_offset());
    assert_eq!(export.visits.len(), 4);
}

#[test]
fn zip_with_two_members_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::write_zip(
        dir.path(),
        "history_autobackup_20200102_full.zip",
        &[
            ("history_autobackup_20200102_full.tsv", common::ARCHIVED),
            ("notes.txt", "hello"),
        ],
    );
    let err = open_err(&path);
    assert!(err.is_format());
}

#[test]
fn unrecognized_filename_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = common::write_export(dir.path(), "history.tsv", common::ARCHIVED);
    let err = open_err(&path);
    assert!(err.is_format());
    assert!(err.to_string().contains("history.tsv"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = open_err(&dir.path().join("exported_archived_history_20200101.tsv"));
    assert!(err.is_io());
}
