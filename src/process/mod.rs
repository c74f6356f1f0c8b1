// src/process/mod.rs

pub mod clean;
pub mod filename;
pub mod regions;

pub use clean::{clean_file, clean_table, read_table, CleanReport, CleanedTable};
pub use filename::{classify, data_file_name, FileMeta};
pub use regions::Region;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use tracing::{debug, instrument};

use crate::config::CleanPolicy;

/// A CSV file held in memory, every value a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Data rows, one `String` per field.
    pub rows: Vec<Vec<String>>,
}

/// Expand `inputs` into CSV files: directories are searched recursively for
/// `*.csv`, plain paths pass through. Output is sorted and deduplicated.
pub fn discover_csv(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let pattern = format!("{}/**/*.csv", Pattern::escape(&input.to_string_lossy()));
            for entry in glob(&pattern).with_context(|| format!("bad pattern {}", pattern))? {
                files.push(entry?);
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered csv files");
    Ok(files)
}

/// Classify and clean `path` in memory without writing anything back.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn inspect_file(path: &Path, policy: CleanPolicy) -> Result<(FileMeta, CleanReport)> {
    let meta = classify(path)?;
    let raw = read_table(path)?;
    let cleaned = clean_table(meta.dataset.schema(), raw, policy)?;
    Ok((meta, cleaned.report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::schema::DatasetType;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discover_walks_directories() -> Result<()> {
        let root = tempdir()?;
        let session = root.path().join("IL").join("103rd");
        fs::create_dir_all(&session)?;
        fs::write(session.join("IL_103rd_votes.csv"), "id\n")?;
        fs::write(session.join("IL_103rd_bills.csv"), "id\n")?;
        fs::write(session.join("README.md"), "")?;
        let loose = root.path().join("IL_00NA_people.csv");
        fs::write(&loose, "id\n")?;

        let found = discover_csv(&[root.path().join("IL"), loose.clone()])?;
        assert_eq!(
            found,
            vec![
                session.join("IL_103rd_bills.csv"),
                session.join("IL_103rd_votes.csv"),
                loose,
            ]
        );
        Ok(())
    }

    #[test]
    fn inspect_reports_without_writing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("IL_103rd_bill_sources.csv");
        let before = "id,bill_id,url\nsrc/1,ocd-bill/,http://a/b\nsrc/2,ocd-bill/b2,http://x\n";
        fs::write(&path, before)?;

        let (meta, report) = inspect_file(&path, CleanPolicy::SkipRow)?;
        assert_eq!(meta.dataset, DatasetType::BillSources);
        assert_eq!(report.rows_written, 1);
        assert_eq!(report.failures[0].column, "bill_id");
        assert_eq!(fs::read_to_string(&path)?, before);
        Ok(())
    }

    #[test]
    fn inspect_rejects_unknown_files() {
        let err = inspect_file(Path::new("IL_103rd_committees.csv"), CleanPolicy::FailFile)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnknownDataset(_))
        ));
    }
}
