//! CLI Command Tests
//!
//! End-to-end tests over fixture files on disk:
//! - fetch prints every row in the chosen projection
//! - column prints one column's values
//! - render prints markup shaped by config file and flags
//! - errors keep the code of the layer that raised them

use std::fs;
use std::path::PathBuf;

use qresult::catalog::ColumnRef;
use clap::Parser;
use qresult::cli::{self, Cli, CliErrorCode, Command, MarkupOverrides};
use qresult::markup::{parse_forest, MarkupOptions};
use qresult::result::Projection;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, value.to_string()).unwrap();
    path
}

fn shop_fixture(dir: &TempDir) -> PathBuf {
    write_json(
        dir,
        "shop.json",
        &json!({
            "tables": {
                "customers": {
                    "fields": [
                        {"name": "id", "role": "result:key", "table": "customers"},
                        {"name": "name", "table": "customers"}
                    ],
                    "rows": [[1, "Ann"], [2, "Bo"], [3, "Cy"]]
                },
                "orders": {
                    "fields": ["id", "customer_id", "item"],
                    "rows": [[10, 1, "pen"], [11, 1, "ink"], [12, 2, "cup"]]
                },
                "lines": {
                    "fields": ["order_id", "qty"],
                    "rows": [[10, 2], [11, 1], [11, 5]]
                }
            },
            "query": {
                "table": "customers",
                "bindings": [{
                    "name": "orders",
                    "parent_join": "id",
                    "child_join": "customer_id",
                    "query": {
                        "table": "orders",
                        "bindings": [{
                            "name": "quantities",
                            "mode": "single_value",
                            "parent_join": 0,
                            "child_join": "order_id",
                            "value_column": "qty",
                            "query": {"table": "lines"}
                        }]
                    }
                }]
            }
        }),
    )
}

fn tree_fixture(dir: &TempDir, strict: bool) -> PathBuf {
    write_json(
        dir,
        "tree.json",
        &json!({
            "tables": {
                "categories": {
                    "fields": ["name", "lo#role:tree:left", "hi#role:tree:right"],
                    "rows": [
                        ["all", 1, 8],
                        ["books", 2, 5],
                        ["poetry", 3, 4],
                        ["music", 6, 7],
                        ["broken", 9, 9]
                    ]
                }
            },
            "query": {"table": "categories", "nested_set": {"strict": strict}}
        }),
    )
}

// =============================================================================
// Fetch Tests
// =============================================================================

/// Keyed fetch with two levels of child bindings.
#[test]
fn test_fetch_keyed_two_levels() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);

    let data = cli::fetch(&fixture, None, Projection::Associative).unwrap();
    assert_eq!(data["1"]["orders"][1]["quantities"], json!([1, 5]));
    assert_eq!(data["2"]["orders"][0]["item"], json!("cup"));
    assert_eq!(data["3"]["orders"], json!([]));
    assert_eq!(data["1"]["orders"][0]["quantities"], json!([2]));
}

/// Per-table fetch groups the parent's columns.
#[test]
fn test_fetch_per_table() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);

    let data = cli::fetch(&fixture, None, Projection::PerTable).unwrap();
    assert_eq!(data["2"]["customers"], json!({"id": 2, "name": "Bo"}));
}

/// Nested-set fixtures fetch as root trees.
#[test]
fn test_fetch_nested_set() {
    let dir = TempDir::new().unwrap();
    let fixture = tree_fixture(&dir, false);

    let data = cli::fetch(&fixture, None, Projection::Associative).unwrap();
    let roots = data.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["children"][0]["name"], json!("poetry"));
    assert_eq!(roots[0]["children"][1]["name"], json!("music"));
}

/// Strict nested-set fixtures reject malformed rows.
#[test]
fn test_fetch_strict_nested_set() {
    let dir = TempDir::new().unwrap();
    let fixture = tree_fixture(&dir, true);

    let err = cli::fetch(&fixture, None, Projection::Associative).unwrap_err();
    assert_eq!(err.code_str(), "Q_MALFORMED_NESTING");
}

// =============================================================================
// Column Tests
// =============================================================================

/// Column values by name, position and role.
#[test]
fn test_column_references() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);

    let names = cli::column(&fixture, None, &"name".parse().unwrap()).unwrap();
    assert_eq!(names, json!(["Ann", "Bo", "Cy"]));

    let ids = cli::column(&fixture, None, &ColumnRef::role("result:key")).unwrap();
    assert_eq!(ids, json!([1, 2, 3]));

    let orders = cli::column(&fixture, None, &"#2".parse().unwrap()).unwrap();
    assert_eq!(orders[2], json!([]));
}

/// The column command addresses columns by role, position and name from
/// the command line.
#[test]
fn test_column_command_from_arguments() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);
    let path = fixture.to_str().unwrap();

    let cases = [
        ("@result:key", json!([1, 2, 3])),
        ("#1", json!(["Ann", "Bo", "Cy"])),
        ("name", json!(["Ann", "Bo", "Cy"])),
    ];
    for (reference, expected) in cases {
        let args = ["qresult", "column", "--fixture", path, "--column", reference];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Column {
                fixture, column, ..
            } => {
                let values = cli::column(&fixture, None, &column).unwrap();
                assert_eq!(values, expected, "--column {}", reference);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(args).unwrap();
        cli::run_command(cli.command).unwrap();
    }
}

// =============================================================================
// Render Tests
// =============================================================================

/// Config file options apply; flags override them.
#[test]
fn test_render_config_and_flags() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);
    let config = write_json(
        &dir,
        "qresult.json",
        &json!({"markup": {"view": "standard", "root": "shop", "declaration": false}}),
    );

    let xml = cli::render(&fixture, Some(&config), &MarkupOverrides::default()).unwrap();
    assert!(xml.starts_with(r#"<shop><row><column name="id">1</column>"#));

    let overrides = MarkupOverrides {
        view: Some("forest".to_string()),
        ..Default::default()
    };
    let xml = cli::render(&fixture, Some(&config), &overrides).unwrap();
    assert!(xml.starts_with("<shop><row><id>1</id>"));
    assert!(xml.contains("<quantities><value>1</value><value>5</value></quantities>"));
}

/// Forest output from the CLI reads back.
#[test]
fn test_render_forest_reads_back() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);
    let overrides = MarkupOverrides {
        view: Some("forest".to_string()),
        options: vec!["indent=true".to_string()],
        ..Default::default()
    };

    let xml = cli::render(&fixture, None, &overrides).unwrap();
    let config = MarkupOptions::with_view("forest").validate().unwrap();
    let rows = parse_forest(&xml, &config).unwrap();
    assert_eq!(rows[0]["orders"][1]["quantities"], json!(["1", "5"]));
    assert_eq!(rows[2]["name"], json!("Cy"));
}

/// Markup configuration errors keep their own codes.
#[test]
fn test_render_errors() {
    let dir = TempDir::new().unwrap();
    let fixture = shop_fixture(&dir);

    let overrides = MarkupOverrides {
        view: Some("bogus".to_string()),
        ..Default::default()
    };
    let err = cli::render(&fixture, None, &overrides).unwrap_err();
    assert_eq!(err.code_str(), "Q_UNSUPPORTED_VIEW");

    let overrides = MarkupOverrides {
        options: vec!["colour".to_string()],
        ..Default::default()
    };
    let err = cli::render(&fixture, None, &overrides).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);

    let bad_config = write_json(&dir, "bad.json", &json!({"markup": {"view": "bogus"}}));
    let err = cli::render(&fixture, Some(&bad_config), &MarkupOverrides::default()).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

// =============================================================================
// Fixture Error Tests
// =============================================================================

/// Unreadable or invalid fixtures are fixture errors.
#[test]
fn test_fixture_errors() {
    let dir = TempDir::new().unwrap();

    let not_json = dir.path().join("broken.json");
    fs::write(&not_json, "{ not json").unwrap();
    let err = cli::fetch(&not_json, None, Projection::Ordered).unwrap_err();
    assert_eq!(err.code_str(), "Q_CLI_FIXTURE_ERROR");

    let unknown = write_json(&dir, "unknown.json", &json!({"tables": {}, "query": {"table": "x"}}));
    let err = cli::fetch(&unknown, None, Projection::Ordered).unwrap_err();
    assert_eq!(err.code_str(), "Q_CLI_FIXTURE_ERROR");
}

/// Error envelopes carry status, code and message.
#[test]
fn test_error_envelope() {
    let envelope = cli::error_response("Q_NOT_FOUND", "Column 'x' not found");
    assert_eq!(
        envelope,
        json!({"status": "error", "code": "Q_NOT_FOUND", "message": "Column 'x' not found"})
    );
}
