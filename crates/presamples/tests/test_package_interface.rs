//! # Package Interface Integration Tests
//!
//! Exercises the full read path over tempdir-built fixture packages: facade
//! construction, metadata projections, seed mutation, and the parameter
//! mapping over multiple irregular resources.

use std::path::Path;

use serde_json::{json, Value};

use presamples::{
    write_block, ColumnLookup, ParametersMapping, PresamplesError, PresamplesPackage,
    MANIFEST_FILENAME,
};

/// One fixture resource: a block of samples plus its name list.
struct FixtureResource {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    names: Vec<&'static str>,
}

impl FixtureResource {
    fn new(rows: usize, cols: usize, values: &[f64], names: &[&'static str]) -> Self {
        Self {
            rows,
            cols,
            values: values.to_vec(),
            names: names.to_vec(),
        }
    }
}

/// Write a complete package directory: blocks, name lists, and manifest.
fn make_package(dir: &Path, seed: i64, resources: &[FixtureResource]) {
    let mut descriptors = Vec::new();
    for (i, resource) in resources.iter().enumerate() {
        let samples_file = format!("fixture.{i}.samples.bin");
        let names_file = format!("fixture.{i}.names.json");
        write_block(
            &dir.join(&samples_file),
            resource.rows,
            resource.cols,
            &resource.values,
        )
        .unwrap();
        std::fs::write(
            dir.join(&names_file),
            serde_json::to_string(&resource.names).unwrap(),
        )
        .unwrap();
        descriptors.push(json!({
            "type": "parameters",
            "samples": {
                "filepath": samples_file,
                "shape": [resource.rows, resource.cols],
                "dtype": "float64"
            },
            "names": {"filepath": names_file},
            "profile": "data-resource",
            "format": "bin",
            "mediatype": "application/octet-stream"
        }));
    }
    let manifest = json!({
        "name": "fixture-package",
        "id": "11111111-2222-3333-4444-555555555555",
        "profile": "data-package",
        "seed": seed,
        "resources": descriptors
    });
    std::fs::write(
        dir.join(MANIFEST_FILENAME),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// Two-resource package: resource A is 2x3 with names ["x", "y"],
/// resource B is 1x3 with ["z"].
fn two_resource_fixtures() -> Vec<FixtureResource> {
    vec![
        FixtureResource::new(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["x", "y"]),
        FixtureResource::new(1, 3, &[7.0, 8.0, 9.0], &["z"]),
    ]
}

// ---------------------------------------------------------------------------
// 1. Construction and projections
// ---------------------------------------------------------------------------

#[test]
fn package_projections_match_manifest() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 42, &two_resource_fixtures());

    let package = PresamplesPackage::new(dir.path()).unwrap();
    assert_eq!(package.name().unwrap(), "fixture-package");
    assert_eq!(
        package.id().unwrap(),
        "11111111-2222-3333-4444-555555555555"
    );
    assert_eq!(package.seed().unwrap(), 42);
    assert_eq!(package.path(), dir.path());
}

#[test]
fn package_len_equals_resource_count() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let package = PresamplesPackage::new(dir.path()).unwrap();
    assert_eq!(package.len().unwrap(), package.resources().unwrap().len());
    assert_eq!(package.len().unwrap(), 2);
    assert!(!package.is_empty().unwrap());
}

#[test]
fn invalid_directory_rejected_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    // No manifest at all.
    let err = PresamplesPackage::new(dir.path()).unwrap_err();
    assert!(matches!(err, PresamplesError::InvalidPackage { .. }));
}

#[test]
fn dangling_resource_reference_rejected_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());
    std::fs::remove_file(dir.path().join("fixture.1.samples.bin")).unwrap();

    let err = PresamplesPackage::new(dir.path()).unwrap_err();
    assert!(matches!(err, PresamplesError::InvalidPackage { .. }));
    assert!(format!("{err}").contains("fixture.1.samples.bin"));
}

// ---------------------------------------------------------------------------
// 2. Parameter mapping over two irregular resources
// ---------------------------------------------------------------------------

#[test]
fn two_resource_mapping_concatenates_rows() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let mapping = package.parameters().unwrap();

    assert_eq!(mapping.len(), 3);
    assert_eq!(mapping.array().sample(0).unwrap().len(), 3);
    // "z" sits at global row 2: row 0 of resource B, stacked after A's 2 rows.
    assert_eq!(mapping.get("z").unwrap(), 7.0);
    assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
}

#[test]
fn lookups_are_column_deterministic_and_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let mapping = package.parameters().unwrap();

    // Every name resolves against the same column (0), repeatedly.
    let draw = mapping.values().unwrap();
    assert_eq!(draw, vec![1.0, 4.0, 7.0]);
    for (i, name) in ["x", "y", "z"].iter().enumerate() {
        let first = mapping.get(name).unwrap();
        let second = mapping.get(name).unwrap();
        assert!(first.is_finite());
        assert_eq!(first, second);
        assert_eq!(first, draw[i]);
    }
}

#[test]
fn unknown_parameter_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let err = package.parameters().unwrap().get("w").unwrap_err();
    assert!(matches!(
        err,
        PresamplesError::UnknownParameter { name } if name == "w"
    ));
}

#[test]
fn out_of_range_column_rejected() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let mapping = package.parameters().unwrap();
    let err = mapping.array().sample(5).unwrap_err();
    assert!(matches!(
        err,
        PresamplesError::ColumnOutOfRange {
            index: 5,
            columns: 3
        }
    ));
    assert!(matches!(
        mapping.get_at("x", 5).unwrap_err(),
        PresamplesError::ColumnOutOfRange { .. }
    ));
}

// ---------------------------------------------------------------------------
// 3. Failure surfacing: conflicts and shape mismatches
// ---------------------------------------------------------------------------

#[test]
fn name_conflict_surfaces_at_first_parameters_access() {
    let dir = tempfile::tempdir().unwrap();
    make_package(
        dir.path(),
        0,
        &[
            FixtureResource::new(2, 3, &[0.0; 6], &["x", "y"]),
            FixtureResource::new(1, 3, &[0.0; 3], &["y"]),
        ],
    );

    // Construction succeeds; the conflict is only detected when the mapping
    // is first built.
    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    assert_eq!(package.len().unwrap(), 2);

    let err = package.parameters().unwrap_err();
    match err {
        PresamplesError::NameConflict { names } => assert_eq!(names, vec!["y"]),
        other => panic!("expected NameConflict, got {other:?}"),
    }
}

#[test]
fn column_count_mismatch_surfaces_at_first_parameters_access() {
    let dir = tempfile::tempdir().unwrap();
    make_package(
        dir.path(),
        0,
        &[
            FixtureResource::new(2, 3, &[0.0; 6], &["x", "y"]),
            FixtureResource::new(1, 4, &[0.0; 4], &["z"]),
        ],
    );

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let err = package.parameters().unwrap_err();
    assert!(matches!(
        err,
        PresamplesError::ShapeMismatch {
            expected: 3,
            found: 4,
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// 4. Seed mutation and the stale parameters cache
// ---------------------------------------------------------------------------

#[test]
fn change_seed_roundtrips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 1, &two_resource_fixtures());

    let package = PresamplesPackage::new(dir.path()).unwrap();
    package.change_seed(5).unwrap();

    let raw: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap(),
    )
    .unwrap();
    assert_eq!(raw["seed"], json!(5));
    assert_eq!(package.seed().unwrap(), 5);
}

#[test]
fn parameters_cache_survives_seed_change_until_reconstruction() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 1, &two_resource_fixtures());

    let mut package = PresamplesPackage::new(dir.path()).unwrap();
    let before = package.parameters().unwrap().values().unwrap();

    package.change_seed(5).unwrap();

    // Same facade: the cached mapping is returned unchanged.
    let after = package.parameters().unwrap().values().unwrap();
    assert_eq!(before, after);

    // A new facade over the same path sees the new seed and builds a fresh
    // mapping.
    let mut rebuilt = PresamplesPackage::new(dir.path()).unwrap();
    assert_eq!(rebuilt.seed().unwrap(), 5);
    assert_eq!(rebuilt.parameters().unwrap().values().unwrap(), before);
}

// ---------------------------------------------------------------------------
// 5. Column selection strategies
// ---------------------------------------------------------------------------

#[test]
fn explicit_column_and_caching_strategies_agree() {
    let dir = tempfile::tempdir().unwrap();
    make_package(dir.path(), 0, &two_resource_fixtures());

    let package = PresamplesPackage::new(dir.path()).unwrap();
    let resources = package.resources().unwrap();
    let name = package.name().unwrap();

    let fresh = ParametersMapping::new(dir.path(), &resources, &name, Some(2)).unwrap();
    let cached = ParametersMapping::with_lookup(
        dir.path(),
        &resources,
        &name,
        Some(2),
        ColumnLookup::Cached,
    )
    .unwrap();

    assert_eq!(fresh.values().unwrap(), vec![3.0, 6.0, 9.0]);
    for param in ["x", "y", "z"] {
        assert_eq!(fresh.get(param).unwrap(), cached.get(param).unwrap());
    }
}
