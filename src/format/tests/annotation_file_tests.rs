//! Tests for the JSON annotation file.

use crate::format::{AnnotationFile, FormatError};
use crate::model::{Annotation, BoundingBox, Label, LabelCategory};
use crate::store::AnnotationStore;

/// Store with a file open and annotations on pages 3 and 1.
fn create_store() -> AnnotationStore {
    let mut store = AnnotationStore::new();
    store.set_file("level-2.pdf");
    store.set_total_pages(4);
    store.add_annotation(Annotation::new(
        "a",
        3,
        Label::Gpo,
        BoundingBox::new(10.0, 10.0, 20.0, 20.0),
    ));
    store.add_annotation(
        Annotation::new(
            "b",
            1,
            Label::SwitchSingle,
            BoundingBox::new(0.5, 0.25, 12.125, 8.0),
        )
        .with_text("by the door"),
    );
    store.add_annotation(Annotation::new(
        "c",
        3,
        Label::GpoDouble,
        BoundingBox::new(40.0, 10.0, 20.0, 20.0),
    ));
    store
}

fn record(id: &str, page: i64, width: f64) -> String {
    format!(
        r#"{{"id":"{id}","page":{page},"label":"downlight","bbox":{{"x":1,"y":2,"width":{width},"height":4}},"created_at":"2024-01-01T00:00:00.000Z"}}"#
    )
}

#[test]
fn test_export_shape() {
    let store = create_store();
    let file = AnnotationFile::from_state(store.state());
    let json = file.to_json().expect("export should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["file"], "level-2.pdf");
    assert_eq!(value["annotations"].as_array().unwrap().len(), 3);
    assert_eq!(value["metadata"]["total_pages"], 4);
    assert_eq!(value["metadata"]["annotated_pages"], serde_json::json!([1, 3]));
    assert!(value["metadata"]["last_modified"].as_str().unwrap().ends_with('Z'));

    let b = &value["annotations"][1];
    assert_eq!(b["label"], "switch_single");
    assert_eq!(b["text"], "by the door");
    // Absent optionals are omitted, not written as null
    assert!(value["annotations"][0].get("text").is_none());
    assert!(b.get("created_by").is_none());
}

#[test]
fn test_round_trip_preserves_records() {
    let store = create_store();
    let exported = AnnotationFile::from_state(store.state());
    let json = exported.to_json().unwrap();
    let imported = AnnotationFile::from_json(&json).expect("import should succeed");

    assert_eq!(imported.annotations, store.state().annotations);
    assert_eq!(imported.file, "level-2.pdf");
    assert_eq!(imported.metadata.total_pages, 4);
}

#[test]
fn test_import_minimal_object() {
    let json = format!(r#"{{"annotations":[{}]}}"#, record("x", 2, 3.0));
    let file = AnnotationFile::from_json(&json).expect("minimal file should load");

    assert_eq!(file.annotations.len(), 1);
    assert_eq!(file.annotations[0].label, Label::Downlight);
    assert_eq!(file.annotations[0].bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(file.version, AnnotationFile::CURRENT_VERSION);
    assert_eq!(file.metadata.annotated_pages, vec![2]);
    assert!(file.file.is_empty());
}

#[test]
fn test_import_empty_annotations() {
    let file = AnnotationFile::from_json(r#"{"annotations": []}"#).unwrap();
    assert!(file.annotations.is_empty());
}

#[test]
fn test_reject_not_json() {
    let err = AnnotationFile::from_json("{not json").unwrap_err();
    assert!(matches!(err, FormatError::Json(_)));
}

#[test]
fn test_reject_non_object() {
    let err = AnnotationFile::from_json("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, FormatError::InvalidFormat { .. }));
}

#[test]
fn test_reject_missing_annotations() {
    let err = AnnotationFile::from_json(r#"{"file": "x.pdf"}"#).unwrap_err();
    assert!(matches!(err, FormatError::MissingField { ref field } if field == "annotations"));
}

#[test]
fn test_reject_non_array_annotations() {
    let err = AnnotationFile::from_json(r#"{"annotations": {"a": 1}}"#).unwrap_err();
    assert!(matches!(err, FormatError::InvalidFormat { .. }));
}

#[test]
fn test_reject_invalid_records() {
    let cases = [
        record("neg", 1, -3.0),
        record("zero", 1, 0.0),
        record("page0", 0, 3.0),
        record("", 1, 3.0),
        // Page numbers are unsigned
        record("minus", -1, 3.0),
        r#"{"id":"x","page":1,"label":"toaster","bbox":{"x":0,"y":0,"width":1,"height":1},"created_at":""}"#
            .to_string(),
        r#"{"id":"x","page":1,"label":"gpo"}"#.to_string(),
    ];
    for case in cases {
        let json = format!(r#"{{"annotations":[{}, {case}]}}"#, record("ok", 1, 3.0));
        let err = AnnotationFile::from_json(&json).unwrap_err();
        assert!(
            matches!(err, FormatError::InvalidAnnotation { index: 1, .. }),
            "{case} -> {err:?}"
        );
    }
}

#[test]
fn test_reject_duplicate_ids() {
    let json = format!(
        r#"{{"annotations":[{}, {}]}}"#,
        record("same", 1, 3.0),
        record("same", 2, 3.0)
    );
    let err = AnnotationFile::from_json(&json).unwrap_err();
    assert!(matches!(err, FormatError::InvalidAnnotation { index: 1, .. }));
}

#[test]
fn test_version_check() {
    let ok = r#"{"version": "1.4.2", "annotations": []}"#;
    assert!(AnnotationFile::from_json(ok).is_ok());

    for version in [r#""2.0.0""#, r#""3.1""#, "7"] {
        let json = format!(r#"{{"version": {version}, "annotations": []}}"#);
        let err = AnnotationFile::from_json(&json).unwrap_err();
        assert!(matches!(err, FormatError::VersionMismatch { .. }), "{version}");
    }
}

#[test]
fn test_lenient_versions_accepted() {
    for version in [r#""1.0""#, "1", r#""0.9.0""#, r#""one""#, "null", "true", r#"{"major": 1}"#] {
        let json = format!(
            r#"{{"version": {version}, "annotations": [{}]}}"#,
            record("v", 1, 3.0)
        );
        let file = AnnotationFile::from_json(&json)
            .unwrap_or_else(|e| panic!("{version} should load: {e}"));
        assert_eq!(file.annotations.len(), 1, "{version}");
    }
}

#[test]
fn test_malformed_metadata_recomputed() {
    let cases = [
        r#"{"total_pages": 5, "annotated_pages": [1], "last_modified": null}"#,
        r#"{"total_pages": "five"}"#,
        r#"[1, 2]"#,
        r#""none""#,
    ];
    for metadata in cases {
        let json = format!(
            r#"{{"annotations": [{}, {}], "metadata": {metadata}}}"#,
            record("p2", 2, 3.0),
            record("p4", 4, 3.0)
        );
        let file = AnnotationFile::from_json(&json)
            .unwrap_or_else(|e| panic!("{metadata} should load: {e}"));
        assert_eq!(file.metadata.total_pages, 4, "{metadata}");
        assert_eq!(file.metadata.annotated_pages, vec![2, 4], "{metadata}");
    }
}

#[test]
fn test_partial_metadata_kept() {
    let json = format!(
        r#"{{"annotations": [{}], "metadata": {{"total_pages": 9}}}}"#,
        record("x", 2, 3.0)
    );
    let file = AnnotationFile::from_json(&json).unwrap();
    assert_eq!(file.metadata.total_pages, 9);
    assert_eq!(file.metadata.annotated_pages, vec![2]);
}

#[test]
fn test_parse_major() {
    assert_eq!(AnnotationFile::parse_major("1.0.0"), Some(1));
    assert_eq!(AnnotationFile::parse_major("12.3.4"), Some(12));
    assert_eq!(AnnotationFile::parse_major("1.0"), Some(1));
    assert_eq!(AnnotationFile::parse_major("2"), Some(2));
    assert_eq!(AnnotationFile::parse_major("one"), None);
    assert_eq!(AnnotationFile::parse_major(""), None);
}

#[test]
fn test_save_and_load() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("annotations-level-2.json");

    let store = create_store();
    let file = AnnotationFile::from_state(store.state());
    file.save(&path).expect("save should succeed");

    let loaded = AnnotationFile::load(&path).expect("load should succeed");
    assert_eq!(loaded.annotations, file.annotations);
    assert_eq!(loaded.metadata, file.metadata);
}

#[test]
fn test_load_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let err = AnnotationFile::load(&temp.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[test]
fn test_default_filename() {
    assert_eq!(
        AnnotationFile::default_filename("level-2.pdf"),
        "annotations-level-2.json"
    );
    assert_eq!(
        AnnotationFile::default_filename("notes"),
        "annotations-notes.json"
    );
}

#[test]
fn test_summary() {
    let store = create_store();
    let summary = AnnotationFile::from_state(store.state()).summary();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.per_page, vec![(1, 1), (3, 2)]);
    assert_eq!(
        summary.per_category,
        vec![(LabelCategory::Power, 2), (LabelCategory::Switches, 1)]
    );

    let text = summary.to_string();
    assert!(text.starts_with("level-2.pdf: 3 annotations on 2 of 4 pages"));
    assert!(text.contains("  page 3: 2"));
    assert!(text.contains("  Power: 2"));
}
