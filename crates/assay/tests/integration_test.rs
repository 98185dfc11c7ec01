//! Integration tests for assay.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use assay::profile::{count_duplicate_rows, key_integrity};
use assay::{
    Assay, AssayConfig, ColumnSchema, ColumnType, FileOutcome, IntegrityStatus, KeyRelation,
    MemorySink, NamedTables, QueryOutcome, QueryParams, StageOutcome, Table, Value,
};

const USERS: &str = "\
ID,CREATED_DATE,BIRTH_DATE,STATE,LANGUAGE,GENDER
u1,2020-01-01 00:00:00.000 Z,1990-05-01 00:00:00.000 Z,WI,en,female
u2,2024-06-01 00:00:00.000 Z,2010-01-01 00:00:00.000 Z,CA,es-419,male
u3,2023-01-15 00:00:00.000 Z,2003-09-01 00:00:00.000 Z,TX,en,
";

const PRODUCTS: &str = "\
CATEGORY_1,CATEGORY_2,CATEGORY_3,CATEGORY_4,MANUFACTURER,BRAND,BARCODE
Snacks,Dips & Salsa,Salsa,,PEPSICO,TOSTITOS,100
Snacks,Dips & Salsa,Hummus,,SABRA CO,SABRA,101
Snacks,Chips,Tortilla Chips,,PEPSICO,TOSTITOS,102
Snacks,Chips,Tortilla Chips,,PEPSICO,TOSTITOS,102
Health & Wellness,Hair Care,Shampoo,,P&G,,103
Snacks,Dips & Salsa,Bean Dip,,PEPSICO,FRITOS,104
";

const TRANSACTIONS: &str = "\
RECEIPT_ID,PURCHASE_DATE,SCAN_DATE,STORE_NAME,USER_ID,BARCODE,FINAL_QUANTITY,FINAL_SALE
r1,2024-08-01,2024-08-01 10:00:00.000 Z,WALMART,u1,100,1.00,
r1,2024-08-01,2024-08-01 10:00:00.000 Z,WALMART,u1,100,zero,3.50
r2,2024-08-02,2024-08-02 11:00:00.000 Z,TARGET,u1,101,2.00,4.00
r3,2024-08-03,2024-08-03 12:00:00.000 Z,ALDI,u2,100,1.00,2.00
r4,2024-08-04,2024-08-04 09:00:00.000 Z,WALMART,u3,101,1.00,5.00
r5,2024-08-05,2024-08-05 09:00:00.000 Z,WALMART,u3,103,1.00,9.99
r6,2024-08-06,2024-08-06 09:00:00.000 Z,WALMART,u9,100,1.00,1.00
r7,2024-08-07,2024-08-07 09:00:00.000 Z,WALMART,u3,999,1.00,1.00
r8,2024-08-08,2024-08-08 09:00:00.000 Z,WALMART,u1,102,3.7,2.50
";

/// Helper to write a fixture directory with the given files.
fn create_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("Failed to write fixture");
    }
    dir
}

fn full_dir() -> TempDir {
    create_dir(&[
        ("USER_TAKEHOME.csv", USERS),
        ("PRODUCTS_TAKEHOME.csv", PRODUCTS),
        ("TRANSACTION_TAKEHOME.csv", TRANSACTIONS),
    ])
}

fn assay() -> Assay {
    let params = QueryParams::default().with_as_of(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    Assay::with_config(AssayConfig::default().with_query_params(params))
}

fn load(dir: &Path) -> NamedTables {
    assay().load(dir).expect("Load failed").into_tables()
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

// =============================================================================
// Loader
// =============================================================================

#[test]
fn test_load_directory() {
    let dir = full_dir();
    let report = assay().load(dir.path()).expect("Load failed");

    assert_eq!(report.loaded_count(), 3);
    assert_eq!(
        report.tables().names().collect::<Vec<_>>(),
        vec!["PRODUCTS_TAKEHOME", "TRANSACTION_TAKEHOME", "USER_TAKEHOME"]
    );

    let transactions = report.require("TRANSACTION_TAKEHOME").unwrap();
    assert_eq!(transactions.row_count(), 9);
    assert_eq!(transactions.column_count(), 8);
}

#[test]
fn test_empty_file_fails_others_load() {
    let dir = create_dir(&[
        ("EMPTY.csv", ""),
        ("HEADER_ONLY.csv", "a,b\n"),
        ("USER_TAKEHOME.csv", USERS),
        ("notes.json", "{}"),
    ]);
    let report = assay().load(dir.path()).expect("Load failed");

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.loaded_count(), 1);

    let failures: Vec<&str> = report.failures().map(|(file, _)| file).collect();
    assert_eq!(failures, vec!["EMPTY.csv", "HEADER_ONLY.csv"]);
    assert!(report.failures().all(|(_, reason)| reason.contains("Empty data")));
    assert!(report.tables().contains("USER_TAKEHOME"));
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(assay().load(dir.path().join("nope")).is_err());
}

#[test]
fn test_load_outcome_reports_shape() {
    let dir = create_dir(&[("USER_TAKEHOME.csv", USERS)]);
    let report = assay().load(dir.path()).unwrap();

    match &report.outcomes[0] {
        FileOutcome::Loaded {
            name,
            source,
            column_names,
        } => {
            assert_eq!(name, "USER_TAKEHOME");
            assert_eq!(source.row_count, 3);
            assert_eq!(source.column_count, 6);
            assert_eq!(source.format, "csv");
            assert!(source.hash.starts_with("sha256:"));
            assert_eq!(column_names[0], "ID");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_types_inferred_at_load() {
    let dir = full_dir();
    let tables = load(dir.path());
    let transactions = tables.get("TRANSACTION_TAKEHOME").unwrap();

    let type_of = |name: &str| transactions.column(name).unwrap().column_type;
    assert_eq!(type_of("BARCODE"), ColumnType::Integer);
    assert_eq!(type_of("FINAL_QUANTITY"), ColumnType::Text);
    assert_eq!(type_of("FINAL_SALE"), ColumnType::Float);
    assert_eq!(type_of("PURCHASE_DATE"), ColumnType::Timestamp);
    assert_eq!(type_of("SCAN_DATE"), ColumnType::Timestamp);
}

// =============================================================================
// Profiler
// =============================================================================

#[test]
fn test_profile_report() {
    let dir = full_dir();
    let tables = load(dir.path());
    let report = assay().profile(&tables);

    assert_eq!(report.duplicate_counts["PRODUCTS_TAKEHOME"], 1);
    assert_eq!(report.duplicate_counts["TRANSACTION_TAKEHOME"], 0);
    assert_eq!(report.missing_values["PRODUCTS_TAKEHOME"]["CATEGORY_4"], 6);
    assert_eq!(report.missing_values["PRODUCTS_TAKEHOME"]["BRAND"], 1);
    assert_eq!(report.missing_values["TRANSACTION_TAKEHOME"]["FINAL_SALE"], 1);
    assert_eq!(report.missing_values["USER_TAKEHOME"]["GENDER"], 1);
    assert_eq!(report.data_types["USER_TAKEHOME"]["CREATED_DATE"], ColumnType::Timestamp);
    assert_eq!(report.info["USER_TAKEHOME"].rows, 3);

    assert!(!report.is_degraded());
    let unmatched: Vec<Option<usize>> = report.key_integrity.iter().map(|c| c.unmatched()).collect();
    assert_eq!(unmatched, vec![Some(1), Some(1)]);
}

#[test]
fn test_orphaned_keys_sampled() {
    let dir = full_dir();
    let tables = load(dir.path());

    let products = KeyRelation::new(
        "products",
        "TRANSACTION_TAKEHOME",
        "BARCODE",
        "PRODUCTS_TAKEHOME",
        "BARCODE",
    );
    let result = key_integrity(&tables, &products).unwrap();
    assert_eq!(result.sample, vec!["999".to_string()]);

    // 104 is the only product never purchased
    let reversed = key_integrity(&tables, &products.reversed()).unwrap();
    assert_eq!(reversed.unmatched, 1);
    assert_eq!(reversed.sample, vec!["104".to_string()]);
}

#[test]
fn test_profile_degrades_without_users() {
    let dir = create_dir(&[
        ("PRODUCTS_TAKEHOME.csv", PRODUCTS),
        ("TRANSACTION_TAKEHOME.csv", TRANSACTIONS),
    ]);
    let tables = load(dir.path());
    let report = assay().profile(&tables);

    assert!(report.is_degraded());
    assert_eq!(report.key_integrity[0].unmatched(), Some(1));
    assert_eq!(
        report.key_integrity[1].status,
        IntegrityStatus::MissingDatasets {
            missing: vec!["USER_TAKEHOME".to_string()]
        }
    );
}

#[test]
fn test_scenario_products_and_transactions() {
    let dir = create_dir(&[
        ("products.csv", "barcode,brand\n1,A\n2,\n"),
        ("transactions.csv", "barcode\n1\n2\n3\n"),
    ]);
    let tables = load(dir.path());
    let relation = KeyRelation::new("barcodes", "transactions", "barcode", "products", "barcode");

    let result = key_integrity(&tables, &relation).unwrap();
    assert_eq!(result.unmatched, 1);
    assert_eq!(result.sample, vec!["3".to_string()]);
    assert_eq!(count_duplicate_rows(tables.get("products").unwrap()), 0);
}

// =============================================================================
// Visualizer
// =============================================================================

#[test]
fn test_visualize_every_column() {
    let dir = full_dir();
    let tables = load(dir.path());

    let mut sink = MemorySink::default();
    let report = assay().visualize(&tables, &mut sink);

    assert_eq!(report.chart_count(), 7 + 8 + 6);
    assert_eq!(sink.charts.len(), 21);

    let (_, _, brand_chart) = sink
        .charts
        .iter()
        .find(|(table, column, _)| table == "PRODUCTS_TAKEHOME" && column == "BRAND")
        .unwrap();
    let first_bar = brand_chart.lines().nth(2).unwrap();
    assert!(first_bar.starts_with("TOSTITOS"));
    assert!(first_bar.ends_with(" 3"));
}

// =============================================================================
// Query runner
// =============================================================================

#[test]
fn test_top_brands_by_receipts() {
    let dir = full_dir();
    let report = assay().query(&load(dir.path())).unwrap();
    let result = report.result("top_brands_by_receipts").unwrap();

    assert_eq!(result.columns, vec!["brand", "receipt_count"]);
    assert_eq!(
        result.rows,
        vec![
            vec![text("SABRA"), Value::Integer(2)],
            vec![text("TOSTITOS"), Value::Integer(2)],
        ]
    );
}

#[test]
fn test_top_brands_by_sales_uses_deduplicated_receipts() {
    let dir = full_dir();
    let report = assay().query(&load(dir.path())).unwrap();
    let result = report.result("top_brands_by_sales").unwrap();

    assert_eq!(
        result.rows,
        vec![
            vec![text("SABRA"), Value::Float(9.0)],
            vec![text("TOSTITOS"), Value::Float(6.0)],
        ]
    );
}

#[test]
fn test_category_lookup_searches_all_levels() {
    let dir = full_dir();
    let report = assay().query(&load(dir.path())).unwrap();
    let result = report.result("category_lookup").unwrap();

    assert_eq!(
        result.column("category").unwrap(),
        vec![&text("Bean Dip"), &text("Dips & Salsa")]
    );
}

#[test]
fn test_leading_brand_in_category() {
    let dir = full_dir();
    let report = assay().query(&load(dir.path())).unwrap();
    let result = report.result("leading_brand_in_category").unwrap();

    assert_eq!(
        result.rows,
        vec![vec![text("TOSTITOS"), Value::Integer(3), Value::Float(6.5)]]
    );
}

#[test]
fn test_duplicate_receipt_lines() {
    let dir = full_dir();
    let report = assay().query(&load(dir.path())).unwrap();
    let result = report.result("duplicate_receipt_lines").unwrap();

    assert_eq!(
        result.rows,
        vec![vec![text("r1"), Value::Integer(100), text("u1"), Value::Integer(2)]]
    );
}

#[test]
fn test_query_runs_are_deterministic() {
    let dir = full_dir();
    let tables = load(dir.path());
    let assay = assay();

    let first = assay.query(&tables).unwrap();
    let second = assay.query(&tables).unwrap();

    assert_eq!(first.failed_count(), 0);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_missing_users_fails_only_dependent_queries() {
    let dir = create_dir(&[
        ("PRODUCTS_TAKEHOME.csv", PRODUCTS),
        ("TRANSACTION_TAKEHOME.csv", TRANSACTIONS),
    ]);
    let report = assay().query(&load(dir.path())).unwrap();

    assert_eq!(report.failed_count(), 2);
    assert!(matches!(
        &report.queries[0],
        QueryOutcome::Failed { name, .. } if name == "top_brands_by_receipts"
    ));
    assert!(report.result("category_lookup").is_some());
    assert!(report.result("leading_brand_in_category").is_some());
}

#[test]
fn test_case_colliding_headers_do_not_block_queries() {
    let dir = create_dir(&[
        ("USER_TAKEHOME.csv", USERS),
        ("PRODUCTS_TAKEHOME.csv", PRODUCTS),
        ("TRANSACTION_TAKEHOME.csv", TRANSACTIONS),
        ("notes.csv", "id,ID\n1,2\n"),
    ]);
    let tables = load(dir.path());
    assert_eq!(tables.len(), 4);
    assert_eq!(tables.get("notes").unwrap().column_names(), vec!["id", "ID.1"]);

    let report = assay().query(&tables).unwrap();
    assert!(report.staging.iter().all(|o| o.is_staged()));
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.queries.len(), 5);
}

#[test]
fn test_unstageable_table_fails_only_itself() {
    let dir = full_dir();
    let clashing = Table::new(
        vec![
            ColumnSchema::new("id", 0, ColumnType::Integer),
            ColumnSchema::new("ID", 1, ColumnType::Integer),
        ],
        vec![vec![Value::Integer(1), Value::Integer(2)]],
    );
    let tables: NamedTables = load(dir.path())
        .iter()
        .map(|(name, table)| (name.to_string(), table.clone()))
        .chain([("notes".to_string(), clashing)])
        .collect();

    let report = assay().query(&tables).unwrap();

    let failed: Vec<_> = report
        .staging
        .iter()
        .filter_map(|o| match o {
            StageOutcome::Failed { relation, .. } => Some(relation.as_str()),
            StageOutcome::Staged { .. } => None,
        })
        .collect();
    assert_eq!(failed, vec!["notes"]);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(
        report.result("top_brands_by_receipts").unwrap().column("brand").unwrap(),
        vec![&text("SABRA"), &text("TOSTITOS")]
    );
}

#[test]
fn test_plain_text_files_are_not_loaded_by_default() {
    let dir = create_dir(&[
        ("PRODUCTS_TAKEHOME.csv", PRODUCTS),
        ("requirements.txt", "serde\nclap\n"),
    ]);
    let report = assay().load(dir.path()).unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert!(report.tables().contains("PRODUCTS_TAKEHOME"));
    assert!(!report.tables().contains("requirements"));
}
