use anyhow::Result;
use banketl::error::EtlError;
use banketl::load::{load_to_store, open_store};
use banketl::model::{BankRecord, RecordSet};
use banketl::query::{QueryBatch, run_queries};
use rusqlite::Connection;
use rusqlite::types::Value;
use tempfile::{TempDir, tempdir};

fn seeded_store() -> Result<(TempDir, Connection)> {
    let dir = tempdir()?;
    let mut conn = open_store(&dir.path().join("Banks.db"))?;
    let rows = (1..=7)
        .map(|i| {
            let mut row = BankRecord::new(format!("Bank {i}"), 100.0 * i as f64);
            row.mc_gbp_billion = Some(80.0 * i as f64);
            row
        })
        .collect();
    load_to_store(&mut conn, &RecordSet::new(rows), "Largest_banks")?;
    Ok((dir, conn))
}

#[test]
fn each_statement_keeps_its_own_result() -> Result<()> {
    let (_dir, conn) = seeded_store()?;
    let statements = vec![
        "SELECT * FROM Largest_banks".to_string(),
        "SELECT AVG(MC_GBP_Billion) FROM Largest_banks".to_string(),
        "SELECT Name from Largest_banks LIMIT 5".to_string(),
    ];

    let results = run_queries(&conn, statements.clone())?;

    assert_eq!(results.len(), 3);
    for (result, statement) in results.iter().zip(&statements) {
        assert_eq!(&result.statement, statement);
    }
    assert_eq!(results[0].rows.len(), 7);
    assert_eq!(results[0].columns.len(), 5);
    assert_eq!(results[1].rows, vec![vec![Value::Real(320.0)]]);
    assert_eq!(results[2].columns, vec!["Name"]);
    assert_eq!(results[2].rows.len(), 5);
    assert_eq!(results[2].rows[0], vec![Value::Text("Bank 1".to_string())]);

    let rendered: Vec<String> = results.iter().map(|r| r.to_string()).collect();
    assert!(rendered[0].starts_with("SELECT * FROM Largest_banks\n"));
    assert!(rendered[1].contains("320.0"));
    assert!(rendered[2].contains("Bank 5"));
    assert!(!rendered[2].contains("Bank 6"));

    Ok(())
}

#[test]
fn single_statement_is_accepted() -> Result<()> {
    let (_dir, conn) = seeded_store()?;

    let results = run_queries(&conn, "SELECT COUNT(*) AS n FROM Largest_banks")?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].columns, vec!["n"]);
    assert_eq!(results[0].rows, vec![vec![Value::Integer(7)]]);

    Ok(())
}

#[test]
fn batch_from_slice_preserves_order() {
    let batch = QueryBatch::from(&["SELECT 1", "SELECT 2"][..]);
    assert_eq!(batch.statements(), vec!["SELECT 1", "SELECT 2"]);
}

#[test]
fn rendered_table_is_aligned_with_row_index() -> Result<()> {
    let (_dir, conn) = seeded_store()?;

    let results = run_queries(&conn, "SELECT Name, MC_USD_Billion FROM Largest_banks LIMIT 2")?;
    let rendered = results[0].to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines,
        vec![
            "SELECT Name, MC_USD_Billion FROM Largest_banks LIMIT 2",
            "   Name    MC_USD_Billion",
            "0  Bank 1           100.0",
            "1  Bank 2           200.0",
        ]
    );

    let names = run_queries(&conn, "SELECT Name FROM Largest_banks LIMIT 1")?;
    let rendered = names[0].to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[1], "   Name  ");
    assert_eq!(lines[2], "0  Bank 1");

    Ok(())
}

#[test]
fn invalid_statement_is_a_store_error() -> Result<()> {
    let (_dir, conn) = seeded_store()?;

    let err = run_queries(&conn, "SELECT * FROM missing_table").unwrap_err();
    assert!(matches!(err, EtlError::Store { .. }));

    Ok(())
}
