//! End-to-end export from DXF files on disk
use argus_error::OutputErrorKind;
use argus_parser::DxfSource;
use argus_tracer::{export, ExtractOptions, NameFilter, OutputFormat};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Render group code/value pairs as ASCII DXF
fn dxf(groups: &[(i32, String)]) -> String {
    let mut out = String::new();
    for (code, value) in groups {
        out.push_str(&format!("{code:>3}\n{value}\n"));
    }
    out
}

fn groups(pairs: &[(i32, &str)]) -> Vec<(i32, String)> {
    pairs.iter().map(|(c, v)| (*c, v.to_string())).collect()
}

fn insert(name: &str, x: &str, y: &str, layer: &str) -> Vec<(i32, String)> {
    groups(&[
        (0, "INSERT"),
        (8, layer),
        (2, name),
        (10, x),
        (20, y),
        (30, "0"),
    ])
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// plant/area1.dxf: a VALVE with a tag and a relative xref to ../xrefs/pumps.dxf
fn write_plant(dir: &Path) -> PathBuf {
    let mut root = groups(&[
        (0, "SECTION"),
        (2, "BLOCKS"),
        (0, "BLOCK"),
        (2, "VALVE"),
        (70, "2"),
        (10, "0"),
        (20, "0"),
        (30, "0"),
        (0, "ENDBLK"),
        (0, "BLOCK"),
        (2, "PUMPS"),
        (70, "4"),
        (10, "0"),
        (20, "0"),
        (30, "0"),
        (1, r"..\xrefs\pumps.dxf"),
        (0, "ENDBLK"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
    ]);
    root.extend(insert("VALVE", "12.5", "3", "P-VALVES"));
    root.extend(groups(&[
        (66, "1"),
        (0, "ATTRIB"),
        (2, "tag"),
        (1, "V-100"),
        (0, "SEQEND"),
    ]));
    root.extend(insert("PUMPS", "100", "0", "X-REFS"));
    root.extend(groups(&[(0, "ENDSEC"), (0, "EOF")]));
    let root_path = write(dir, "plant/area1.dxf", &dxf(&root));

    let mut pumps = groups(&[
        (0, "SECTION"),
        (2, "BLOCKS"),
        (0, "BLOCK"),
        (2, "PUMP-A"),
        (70, "0"),
        (10, "0"),
        (20, "0"),
        (30, "0"),
        (0, "ENDBLK"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
    ]);
    pumps.extend(insert("PUMP-A", "1", "2", "P-PUMPS"));
    pumps.extend(groups(&[(0, "ENDSEC"), (0, "EOF")]));
    write(dir, "xrefs/pumps.dxf", &dxf(&pumps));

    root_path
}

#[test]
fn test_export_json_through_relative_xref() {
    let dir = TempDir::new().unwrap();
    let root = write_plant(dir.path());
    let output = dir.path().join("out/blocks.json");

    let report = export(
        &DxfSource::default(),
        &root,
        &output,
        ExtractOptions::default(),
        OutputFormat::Json,
    )
    .unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.references_loaded.len(), 1);

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    let canonical_root = fs::canonicalize(&root).unwrap();
    let canonical_xref = fs::canonicalize(dir.path().join("xrefs/pumps.dxf")).unwrap();

    assert_eq!(records[0]["name"], "VALVE");
    assert_eq!(records[0]["layer"], "P-VALVES");
    assert_eq!(records[0]["from_xref"], false);
    assert!(records[0].get("xref_path").is_none());
    assert_eq!(records[0]["attributes"]["TAG"], "V-100");
    assert_eq!(records[0]["position_wcs"], serde_json::json!([12.5, 3.0, 0.0]));
    assert_eq!(
        records[0]["source_drawing"],
        canonical_root.to_string_lossy().into_owned()
    );

    assert_eq!(records[1]["name"], "PUMPS");
    assert_eq!(records[2]["name"], "PUMP-A");
    assert_eq!(records[2]["from_xref"], true);
    assert_eq!(
        records[2]["xref_path"],
        canonical_xref.to_string_lossy().into_owned()
    );
    assert_eq!(records[2]["position_wcs"], serde_json::json!([101.0, 2.0, 0.0]));
    assert_eq!(
        records[2]["source_drawing"],
        canonical_root.to_string_lossy().into_owned()
    );
}

#[test]
fn test_export_flat_with_filter() {
    let dir = TempDir::new().unwrap();
    let root = write_plant(dir.path());
    let output = dir.path().join("blocks.txt");

    let options = ExtractOptions::default().with_filters(NameFilter::parse_list("pump-?"));
    export(&DxfSource::default(), &root, &output, options, OutputFormat::Flat).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "PUMP-A @ (101,2,0)\n");
}

#[test]
fn test_missing_xref_file_still_exports() {
    let dir = TempDir::new().unwrap();
    let root = write_plant(dir.path());
    fs::remove_file(dir.path().join("xrefs/pumps.dxf")).unwrap();
    let output = dir.path().join("blocks.json");

    let report = export(
        &DxfSource::default(),
        &root,
        &output,
        ExtractOptions::default(),
        OutputFormat::Json,
    )
    .unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.references_skipped.len(), 1);
    assert!(output.exists());
}

#[test]
fn test_missing_root_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("blocks.json");

    let err = export(
        &DxfSource::default(),
        &dir.path().join("missing.dxf"),
        &output,
        ExtractOptions::default(),
        OutputFormat::Json,
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert!(!output.exists());
}

#[test]
fn test_unusable_destination_fails_before_reading() {
    let dir = TempDir::new().unwrap();
    let root = write_plant(dir.path());
    // A file where the output directory should be
    let blocker = write(dir.path(), "out", "not a directory");

    let err = export(
        &DxfSource::default(),
        &root,
        &blocker.join("blocks.json"),
        ExtractOptions::default(),
        OutputFormat::Json,
    )
    .unwrap_err();
    assert_eq!(
        err.output_kind(),
        Some(OutputErrorKind::DestinationUnavailable)
    );
}
