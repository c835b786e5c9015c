use anyhow::Result;
use banketl::error::EtlError;
use banketl::extract::{extract_banks, parse_bank_table, parse_market_cap};
use banketl::fetch::fetch_file_document;
use scraper::Html;
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn extracts_ordered_rows_from_market_cap_section() -> Result<()> {
    let doc = fetch_file_document(&fixture("banks.html"))?;
    let records = extract_banks(&doc, "By_market_capitalization", "wikitable")?;

    let pairs: Vec<(&str, f64)> = records
        .iter()
        .map(|r| (r.name.as_str(), r.mc_usd_billion))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("JPMorgan Chase", 432.92),
            ("Bank of America", 231.52),
            ("Industrial and Commercial Bank of China", 194.56),
            ("Agricultural Bank of China", 160.68),
            ("HDFC Bank", 157.91),
            ("Wells Fargo", 155.87),
        ]
    );
    assert!(records.iter().all(|r| r.mc_gbp_billion.is_none()));

    Ok(())
}

#[test]
fn anchor_on_heading_itself_is_accepted() -> Result<()> {
    let html = Html::parse_document(
        r#"<div class="mw-heading"><h2 id="By_market_capitalization">By market capitalization</h2></div>
        <table class="wikitable"><tr><td>1</td><td>Bank A</td><td>10.5</td></tr></table>"#,
    );

    let records = parse_bank_table(&html, "By_market_capitalization", "wikitable")?;
    assert_eq!(records.len(), 1);
    assert_eq!(records.rows[0].name, "Bank A");
    assert_eq!(records.rows[0].mc_usd_billion, 10.5);

    Ok(())
}

#[test]
fn missing_section_is_reported() {
    let html = Html::parse_document(
        r#"<h2><span id="By_total_assets">By total assets</span></h2>
        <table class="wikitable"><tr><td>1</td><td>Bank A</td><td>10.5</td></tr></table>"#,
    );

    let err = parse_bank_table(&html, "By_market_capitalization", "wikitable").unwrap_err();
    assert!(
        matches!(&err, EtlError::SectionNotFound { anchor } if anchor == "By_market_capitalization")
    );
}

#[test]
fn section_without_following_table_is_reported() {
    let html = Html::parse_document(
        r#"<table class="wikitable"><tr><td>1</td><td>Early</td><td>1.0</td></tr></table>
        <h2><span id="By_market_capitalization">By market capitalization</span></h2>
        <p>No table here.</p>"#,
    );

    let err = parse_bank_table(&html, "By_market_capitalization", "wikitable").unwrap_err();
    assert!(matches!(err, EtlError::TableNotFound { .. }));
}

#[test]
fn malformed_market_cap_names_row_and_value() {
    let html = Html::parse_document(
        r#"<h2><span id="By_market_capitalization">By market capitalization</span></h2>
        <table class="wikitable">
        <tr><th>Rank</th><th>Bank</th><th>Cap</th></tr>
        <tr><td>1</td><td>Bank A</td><td>10.5</td></tr>
        <tr><td>2</td><td>Bank B</td><td>n/a</td></tr>
        </table>"#,
    );

    let err = parse_bank_table(&html, "By_market_capitalization", "wikitable").unwrap_err();
    match err {
        EtlError::MalformedRow { row, value, .. } => {
            assert_eq!(row, 3);
            assert_eq!(value, "n/a");
        }
        other => panic!("expected malformed row, got {other:?}"),
    }
}

#[test]
fn table_with_only_header_rows_is_empty() {
    let html = Html::parse_document(
        r#"<h2><span id="By_market_capitalization">By market capitalization</span></h2>
        <table class="wikitable"><tr><th>Rank</th><th>Bank</th><th>Cap</th></tr></table>"#,
    );

    let err = parse_bank_table(&html, "By_market_capitalization", "wikitable").unwrap_err();
    assert!(matches!(err, EtlError::EmptyTable { .. }));
}

#[test]
fn market_cap_coercion() {
    assert_eq!(parse_market_cap(" 432.92\n"), Ok(432.92));
    assert_eq!(parse_market_cap("1,234.5"), Ok(1234.5));
    assert!(parse_market_cap("").is_err());
    assert!(parse_market_cap("-3.0").is_err());
    assert!(parse_market_cap("NaN").is_err());
    assert!(parse_market_cap("12.3B").is_err());
}
