use crate::error::EtlError;
use crate::model::{RateTable, RecordSet, TARGET_CURRENCIES};
use std::path::Path;
use tracing::{debug, info};

pub fn load_rate_table(path: &Path) -> Result<RateTable, EtlError> {
    let rate_file_err = |source| EtlError::RateFile {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(rate_file_err)?;

    let mut table = RateTable::default();
    for result in reader.records() {
        let record = result.map_err(rate_file_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() < 2 {
            debug!(line, "skipping short rate row");
            continue;
        }

        let code = record[0].to_string();
        let raw = &record[1];
        let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let rate = cleaned
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| EtlError::RateValue {
                path: path.to_path_buf(),
                line,
                value: raw.to_string(),
            })?;
        table.rates.insert(code, rate);
    }

    info!(file = %path.display(), currencies = table.len(), "loaded rate table");
    Ok(table)
}

/// Fills the GBP, EUR and INR columns from the USD column, rounded to 2 decimals.
/// Every target code is checked before any row is touched.
pub fn apply_rates(records: &mut RecordSet, rates: &RateTable, rates_path: &Path) -> Result<(), EtlError> {
    let mut resolved = Vec::with_capacity(TARGET_CURRENCIES.len());
    for code in TARGET_CURRENCIES {
        let rate = rates.get(code).ok_or_else(|| EtlError::MissingRate {
            code: code.to_string(),
            path: rates_path.to_path_buf(),
        })?;
        resolved.push((code, rate));
    }

    for row in &mut records.rows {
        let usd = row.mc_usd_billion;
        for &(code, rate) in &resolved {
            if let Some(slot) = row.derived_mut(code) {
                *slot = Some(round2(usd * rate));
            }
        }
    }

    Ok(())
}

pub fn transform(records: &mut RecordSet, rates_path: &Path) -> Result<(), EtlError> {
    let rates = load_rate_table(rates_path)?;
    apply_rates(records, &rates, rates_path)?;
    info!(rows = records.len(), "derived currency columns");
    Ok(())
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
