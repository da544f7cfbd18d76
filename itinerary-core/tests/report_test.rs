//! Spreadsheet export over stored itineraries.
//!
//! Each test works in its own temporary directory.

use std::fs;

use tempfile::TempDir;

use itinerary_core::{
    Day, Itinerary, ItineraryError, ItineraryStore, Stop,
    report::{self, REPORT_CONTENT_TYPE, REPORT_FILENAME},
};

fn sample_trip() -> Itinerary {
    let mut doc = Itinerary::builtin_default();
    doc.trip_meta.title = "Sample Trip".to_string();
    doc.trip_meta.days_count = 2;
    doc.days = vec![
        Day::new(1, "2026-04-15", "Arrival", "JPY"),
        Day::new(2, "2026-04-16", "Sightseeing", "JPY"),
    ];
    doc
}

/// Read one part of a rendered workbook as text.
#[cfg(feature = "xlsx")]
fn workbook_part(bytes: &[u8], name: &str) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

/// Text between each `open` and the following `close`.
#[cfg(feature = "xlsx")]
fn between<'a>(xml: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    xml.split(open)
        .skip(1)
        .filter_map(|rest| rest.split_once(close).map(|(inner, _)| inner))
        .collect()
}

/// Cell text of the first worksheet, row by row. Cells are shared strings.
#[cfg(feature = "xlsx")]
fn first_sheet_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    let shared = workbook_part(bytes, "xl/sharedStrings.xml");
    let strings: Vec<&str> = between(&shared, "<si>", "</si>")
        .into_iter()
        .map(|si| {
            let t = si.split_once('>').map_or("", |(_, rest)| rest);
            t.split_once("</t>").map_or(t, |(text, _)| text)
        })
        .collect();

    let sheet = workbook_part(bytes, "xl/worksheets/sheet1.xml");
    between(&sheet, "<row ", "</row>")
        .into_iter()
        .map(|row| {
            between(row, "<v>", "</v>")
                .into_iter()
                .map(|index| strings[index.parse::<usize>().unwrap()].to_string())
                .collect()
        })
        .collect()
}

#[test]
fn export_without_stored_document_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));

    let err = report::export(&store).unwrap_err();
    if report::is_available() {
        assert!(matches!(err, ItineraryError::NotFound(_)), "got {err:?}");
    } else {
        assert!(matches!(err, ItineraryError::CapabilityUnavailable(_)));
    }
    assert!(!store.exists(), "export must not bootstrap a document");
}

#[test]
fn stored_trip_produces_expected_overview() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    store.save(&sample_trip()).unwrap();

    let rows = report::overview_rows(&store.read().unwrap());
    assert_eq!(
        rows,
        vec![
            ["日期".to_string(), "行程重點".to_string()],
            ["2026-04-15".to_string(), "Arrival".to_string()],
            ["2026-04-16".to_string(), "Sightseeing".to_string()],
        ]
    );
}

#[test]
fn overview_row_count_tracks_day_count() {
    let mut doc = sample_trip();
    for n in 3..=7 {
        doc.days.push(Day::new(n, format!("day {n}"), "Free", "JPY"));
    }

    let rows = report::overview_rows(&doc);
    assert_eq!(rows.len(), doc.days.len() + 1);
    for (row, day) in rows.iter().skip(1).zip(&doc.days) {
        assert_eq!(row[0], day.date);
        assert_eq!(row[1], day.theme);
    }
}

#[cfg(feature = "xlsx")]
#[test]
fn export_returns_named_workbook() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    store.save(&sample_trip()).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let report = report::export(&store).expect("export should succeed");

    assert_eq!(report.filename, REPORT_FILENAME);
    assert_eq!(report.content_type, REPORT_CONTENT_TYPE);
    assert!(report.bytes.starts_with(b"PK"));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[cfg(feature = "xlsx")]
#[test]
fn rendered_overview_sheet_lists_each_day() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    store.save(&sample_trip()).unwrap();

    let bytes = report::export(&store).unwrap().bytes;

    let workbook = workbook_part(&bytes, "xl/workbook.xml");
    let sheets = between(&workbook, "<sheet ", "/>");
    assert_eq!(sheets.len(), 2);
    assert!(sheets[0].contains(r#"name="行程總覽""#), "got {sheets:?}");
    assert!(sheets[1].contains(r#"name="消費明細""#), "got {sheets:?}");

    assert_eq!(
        first_sheet_rows(&bytes),
        vec![
            vec!["日期", "行程重點"],
            vec!["2026-04-15", "Arrival"],
            vec!["2026-04-16", "Sightseeing"],
        ]
    );
}

#[cfg(feature = "xlsx")]
#[test]
fn export_survives_extreme_costs() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    let mut doc = sample_trip();
    doc.days[1].add_stop(Stop::new("10:00", "Palace", i64::MAX, "TWD"));
    doc.days[1].add_stop(Stop::new("14:00", "Vault", i64::MAX, "TWD"));
    store.save(&doc).unwrap();

    let report = report::export(&store).expect("export should succeed");
    assert!(report.bytes.starts_with(b"PK"));
    assert_eq!(first_sheet_rows(&report.bytes).len(), doc.days.len() + 1);
}

#[cfg(feature = "xlsx")]
#[test]
fn export_of_corrupt_file_surfaces_parse_error() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    fs::write(store.path(), "{ broken").unwrap();

    let err = report::export(&store).unwrap_err();
    assert!(matches!(err, ItineraryError::Parse(_)), "got {err:?}");
}

#[cfg(not(feature = "xlsx"))]
#[test]
fn export_without_renderer_is_capability_error() {
    let tmp = TempDir::new().unwrap();
    let store = ItineraryStore::new(tmp.path().join("db.json"));
    store.save(&sample_trip()).unwrap();

    let err = report::export(&store).unwrap_err();
    assert!(matches!(err, ItineraryError::CapabilityUnavailable(_)));
    assert_eq!(err.code(), "CAPABILITY_UNAVAILABLE");
}
