use crate::error::EtlError;
use crate::model::{BankRecord, COLUMNS, RecordSet};
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::info;

pub fn write_csv(records: &RecordSet, path: &Path) -> Result<(), EtlError> {
    let csv_err = |source| EtlError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| csv_err(err.into()))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header = vec![""];
    header.extend(COLUMNS);
    writer.write_record(&header).map_err(csv_err)?;

    for (index, row) in records.iter().enumerate() {
        writer
            .write_record([
                index.to_string(),
                row.name.clone(),
                format_amount(Some(row.mc_usd_billion)),
                format_amount(row.mc_gbp_billion),
                format_amount(row.mc_eur_billion),
                format_amount(row.mc_inr_billion),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|err| csv_err(err.into()))?;
    info!(file = %path.display(), rows = records.len(), "wrote csv");
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<RecordSet, EtlError> {
    let csv_err = |source| EtlError::CsvRead {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let field = |i: usize| record.get(i).unwrap_or_default();
        let amount = |i: usize| {
            parse_amount(field(i)).map_err(|reason| EtlError::MalformedRow {
                row: index + 1,
                value: field(i).to_string(),
                reason,
            })
        };

        let mc_usd_billion = amount(2)?.ok_or_else(|| EtlError::MalformedRow {
            row: index + 1,
            value: String::new(),
            reason: format!("missing {}", COLUMNS[1]),
        })?;

        rows.push(BankRecord {
            name: field(1).to_string(),
            mc_usd_billion,
            mc_gbp_billion: amount(3)?,
            mc_eur_billion: amount(4)?,
            mc_inr_billion: amount(5)?,
        });
    }

    Ok(RecordSet::new(rows))
}

pub fn open_store(path: &Path) -> Result<Connection, EtlError> {
    let conn = Connection::open(path)
        .map_err(|err| EtlError::store(format!("opening {}", path.display()), err))?;
    info!(db = %path.display(), "store connection opened");
    Ok(conn)
}

pub fn close_store(conn: Connection) -> Result<(), EtlError> {
    conn.close()
        .map_err(|(_, err)| EtlError::store("closing connection", err))
}

pub fn load_to_store(
    conn: &mut Connection,
    records: &RecordSet,
    table: &str,
) -> Result<usize, EtlError> {
    let table_ident = quote_ident(table);
    let tx = conn
        .transaction()
        .map_err(|err| EtlError::store("starting load transaction", err))?;

    tx.execute(&format!("DROP TABLE IF EXISTS {table_ident}"), [])
        .map_err(|err| EtlError::store(format!("dropping {table}"), err))?;

    let column_defs = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = if i == 0 { "TEXT" } else { "REAL" };
            format!("{} {ty}", quote_ident(name))
        })
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute(&format!("CREATE TABLE {table_ident} ({column_defs})"), [])
        .map_err(|err| EtlError::store(format!("creating {table}"), err))?;

    {
        let column_list = COLUMNS
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {table_ident} ({column_list}) VALUES (?1, ?2, ?3, ?4, ?5)"
            ))
            .map_err(|err| EtlError::store(format!("preparing insert into {table}"), err))?;

        for row in records.iter() {
            stmt.execute(params![
                row.name,
                row.mc_usd_billion,
                row.mc_gbp_billion,
                row.mc_eur_billion,
                row.mc_inr_billion,
            ])
            .map_err(|err| EtlError::store(format!("inserting {:?} into {table}", row.name), err))?;
        }
    }

    tx.commit()
        .map_err(|err| EtlError::store(format!("committing load of {table}"), err))?;

    info!(table, rows = records.len(), "loaded table into store");
    Ok(records.len())
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn format_amount(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

fn parse_amount(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|err| format!("not a number: {err}"))
}
