// src/process/clean.rs

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::Serialize;
use std::{collections::HashSet, path::Path};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use super::RawTable;
use crate::config::CleanPolicy;
use crate::error::LoadError;
use crate::schema::{ColumnRole, TableSchema};

/// One cell that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellFailure {
    /// 1-based data row (the header is row 0).
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

/// Per-file outcome of cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_written: usize,
    pub failures: Vec<CellFailure>,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.rows_written
    }
}

/// A cleaned table plus what happened while cleaning it.
#[derive(Debug)]
pub struct CleanedTable {
    pub table: RawTable,
    pub report: CleanReport,
}

/// Keep only the last `/`-separated segment of a provider identifier.
pub fn strip_reference(value: &str) -> Result<String, String> {
    match value.rsplit('/').next() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err("identifier has an empty final path segment".into()),
    }
}

/// Rewrite a `['a', 'b']` list literal into the store's `{a, b}` form.
/// Values without brackets only lose their quotes.
pub fn to_array_literal(value: &str) -> Result<String, String> {
    let opens = value.matches('[').count();
    let closes = value.matches(']').count();
    if opens != closes {
        return Err(format!("unbalanced brackets ({} `[`, {} `]`)", opens, closes));
    }
    Ok(value
        .chars()
        .filter(|c| *c != '\'' && *c != '"')
        .map(|c| match c {
            '[' => '{',
            ']' => '}',
            other => other,
        })
        .collect())
}

/// Match header names to the table's declared columns.
pub fn column_roles(schema: &TableSchema, headers: &[String]) -> Result<Vec<ColumnRole>, LoadError> {
    let mut roles = Vec::with_capacity(headers.len());
    let mut unknown = Vec::new();
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for name in headers {
        if !seen.insert(name.as_str()) && !repeated.contains(name) {
            repeated.push(name.clone());
        }
        match schema.column(name) {
            Some(col) => roles.push(col.role),
            None => unknown.push(name.clone()),
        }
    }
    if !unknown.is_empty() {
        return Err(LoadError::UnknownColumns {
            dataset: schema.table_name().to_string(),
            columns: unknown,
        });
    }
    if !repeated.is_empty() {
        return Err(LoadError::DuplicateColumns {
            dataset: schema.table_name().to_string(),
            columns: repeated,
        });
    }
    if !headers.iter().any(|h| h == schema.primary_key) {
        return Err(LoadError::MissingPrimaryKey {
            dataset: schema.table_name().to_string(),
            column: schema.primary_key.to_string(),
        });
    }
    Ok(roles)
}

/// Clean every cell of `table` according to its column role.
///
/// Under `SkipRow`, rows with any failed cell are dropped; under `FailFile`
/// all rows are kept and the caller decides from the report.
pub fn clean_table(
    schema: &TableSchema,
    table: RawTable,
    policy: CleanPolicy,
) -> Result<CleanedTable, LoadError> {
    let roles = column_roles(schema, &table.headers)?;
    let mut report = CleanReport {
        rows_read: table.rows.len(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.into_iter().enumerate() {
        let mut row_ok = true;
        let mut cleaned = Vec::with_capacity(row.len());
        for (col, value) in row.into_iter().enumerate() {
            let role = roles.get(col).copied().unwrap_or(ColumnRole::Plain);
            let result = if value.is_empty() {
                Ok(value.clone())
            } else {
                match role {
                    ColumnRole::Plain => Ok(value.clone()),
                    ColumnRole::Reference => strip_reference(&value),
                    ColumnRole::Classification => to_array_literal(&value),
                }
            };
            match result {
                Ok(v) => cleaned.push(v),
                Err(reason) => {
                    row_ok = false;
                    report.failures.push(CellFailure {
                        row: idx + 1,
                        column: table.headers.get(col).cloned().unwrap_or_default(),
                        value: value.clone(),
                        reason,
                    });
                    cleaned.push(value);
                }
            }
        }
        if row_ok || policy == CleanPolicy::FailFile {
            rows.push(cleaned);
        }
    }
    report.rows_written = rows.len();

    Ok(CleanedTable {
        table: RawTable {
            headers: table.headers,
            rows,
        },
        report,
    })
}

/// Read a headed CSV with every value as a string.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error in {:?} at record {}", path, idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(rows = rows.len(), columns = headers.len(), "read table");
    Ok(RawTable { headers, rows })
}

/// Replace `path` with `table`: write a sibling temp file, then rename.
pub fn write_table(path: &Path, table: &RawTable) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("creating temp file in {:?}", dir))?;
    {
        let mut wtr = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut tmp);
        wtr.write_record(&table.headers)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    }
    tmp.persist(path)
        .with_context(|| format!("replacing {:?}", path))?;
    Ok(())
}

/// Clean the file at `path` in place and report per-row results.
///
/// With `FailFile`, any failed cell aborts before the file is touched.
#[instrument(level = "info", skip(path, schema), fields(path = %path.display(), table = schema.table_name()))]
pub fn clean_file(path: &Path, schema: &TableSchema, policy: CleanPolicy) -> Result<CleanReport> {
    let raw = read_table(path)?;
    let CleanedTable { table, report } = clean_table(schema, raw, policy)?;

    if let Some(first) = report.failures.first() {
        if policy == CleanPolicy::FailFile {
            return Err(LoadError::CleaningFailed {
                path: path.to_path_buf(),
                failures: report.failures.len(),
                first: format!("row {} `{}`: {}", first.row, first.column, first.reason),
            }
            .into());
        }
        for f in &report.failures {
            warn!(row = f.row, column = %f.column, value = %f.value, reason = %f.reason, "skipping row");
        }
    }

    write_table(path, &table)?;
    info!(
        rows = report.rows_written,
        skipped = report.rows_skipped(),
        "cleaned"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DatasetType;
    use std::fs;
    use tempfile::tempdir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn reference_keeps_last_segment() {
        assert_eq!(strip_reference("ocd-bill/abc/123").unwrap(), "123");
        assert_eq!(strip_reference("123").unwrap(), "123");
        assert!(strip_reference("ocd-bill/").is_err());
    }

    #[test]
    fn list_literals_become_arrays() {
        assert_eq!(to_array_literal("['bill']").unwrap(), "{bill}");
        assert_eq!(
            to_array_literal("['reading-1', 'passage']").unwrap(),
            "{reading-1, passage}"
        );
        assert_eq!(to_array_literal("[\"joint resolution\"]").unwrap(), "{joint resolution}");
        assert_eq!(to_array_literal("[]").unwrap(), "{}");
        assert_eq!(to_array_literal("'primary'").unwrap(), "primary");
        assert!(to_array_literal("['bill'").is_err());
    }

    #[test]
    fn cleans_by_declared_role() {
        let raw = table(
            &["id", "bill_id", "description", "classification"],
            &[
                &["ocd-bill-action/a1", "ocd-bill/b1", "a/b description", "['filing']"],
                &["ocd-bill-action/a2", "", "read", "[]"],
            ],
        );
        let out = clean_table(DatasetType::BillActions.schema(), raw, CleanPolicy::FailFile).unwrap();
        assert!(out.report.is_clean());
        assert_eq!(
            out.table.rows,
            vec![
                vec!["a1", "b1", "a/b description", "{filing}"],
                vec!["a2", "", "read", "{}"],
            ]
        );
    }

    #[test]
    fn skip_row_drops_failed_rows() {
        let raw = table(
            &["id", "bill_id"],
            &[&["s/1", "ocd-bill/"], &["s/2", "ocd-bill/b2"]],
        );
        let out = clean_table(DatasetType::BillSources.schema(), raw, CleanPolicy::SkipRow).unwrap();
        assert_eq!(out.report.rows_read, 2);
        assert_eq!(out.report.rows_written, 1);
        assert_eq!(out.report.rows_skipped(), 1);
        assert_eq!(out.report.failures.len(), 1);
        assert_eq!(out.report.failures[0].row, 1);
        assert_eq!(out.report.failures[0].column, "bill_id");
        assert_eq!(out.table.rows, vec![vec!["2", "b2"]]);
    }

    #[test]
    fn unknown_repeated_and_missing_columns_are_rejected() {
        let raw = table(&["id", "nickname"], &[]);
        assert!(matches!(
            clean_table(DatasetType::People.schema(), raw, CleanPolicy::FailFile),
            Err(LoadError::UnknownColumns { ref columns, .. }) if columns == &vec!["nickname".to_string()]
        ));

        let raw = table(&["id", "name", "id"], &[]);
        assert!(matches!(
            clean_table(DatasetType::People.schema(), raw, CleanPolicy::FailFile),
            Err(LoadError::DuplicateColumns { ref columns, .. }) if columns == &vec!["id".to_string()]
        ));

        let raw = table(&["name"], &[]);
        assert!(matches!(
            clean_table(DatasetType::People.schema(), raw, CleanPolicy::FailFile),
            Err(LoadError::MissingPrimaryKey { .. })
        ));
    }

    #[test]
    fn clean_file_rewrites_in_place() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("IL_103rd_bills.csv");
        fs::write(
            &path,
            "id,identifier,title,classification\n\
             ocd-bill/0f6a,HB 1,\"An Act, concerning\",['bill']\n\
             ocd-bill/1b2c,HR 2,Honoring,\"['resolution', 'bill']\"\n",
        )?;

        let report = clean_file(&path, DatasetType::Bills.schema(), CleanPolicy::FailFile)?;
        assert_eq!(report.rows_written, 2);

        let text = fs::read_to_string(&path)?;
        assert_eq!(
            text,
            "id,identifier,title,classification\n\
             0f6a,HB 1,\"An Act, concerning\",{bill}\n\
             1b2c,HR 2,Honoring,\"{resolution, bill}\"\n"
        );
        Ok(())
    }

    #[test]
    fn fail_file_leaves_file_untouched() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("IL_103rd_bill_sources.csv");
        let original = "id,bill_id\nsrc/1,ocd-bill/\n";
        fs::write(&path, original)?;

        let err = clean_file(&path, DatasetType::BillSources.schema(), CleanPolicy::FailFile)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::CleaningFailed { failures: 1, .. })
        ));
        assert_eq!(fs::read_to_string(&path)?, original);
        Ok(())
    }
}
