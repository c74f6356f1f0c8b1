// src/store/load.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{pin_mut, SinkExt};
use serde::Serialize;
use tokio_postgres::Client;
use tracing::{info, instrument};

use super::{ensure_tables, Session};
use crate::config::Settings;
use crate::process::{classify, clean_file, CleanReport, Region};
use crate::schema::{ddl, dependencies, load_order, DatasetType, TableSchema};

/// What one file contributed to its region's database.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub file: PathBuf,
    pub dataset: DatasetType,
    pub region: String,
    pub session: u32,
    pub special: bool,
    /// Rows copied into staging.
    pub staged: u64,
    /// Rows that reached the permanent table.
    pub inserted: u64,
    /// Staged rows whose identifier was already present.
    pub skipped_duplicates: u64,
    pub clean: CleanReport,
}

/// Clean one bulk-data file in place and merge it into its table.
///
/// Name classification and cleaning happen before any connection is opened,
/// so an unknown dataset or a failed clean never reaches the store.
#[instrument(level = "info", skip(settings, path), fields(path = %path.display()))]
pub async fn load_file(settings: &Settings, path: &Path) -> Result<LoadOutcome> {
    // 1) classify + resolve table
    let meta = classify(path)?;
    let schema = meta.dataset.schema();

    // 2) clean in place
    let clean = clean_file(path, schema, settings.loader.on_clean_failure)?;

    // 3) cleaned bytes + header columns for COPY
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {:?}", path))?;
    let columns = header_columns(&data).with_context(|| format!("reading header of {:?}", path))?;

    // 4) one connection for this file, closed whatever happens
    let config = settings.connection(&meta.region)?;
    let mut session = Session::open(&config).await?;
    let result = stage_and_merge(session.client_mut(), schema, &columns, data).await;
    session.close().await;
    let (staged, inserted) = result.with_context(|| format!("loading {}", meta.file_name))?;

    let skipped_duplicates = staged.saturating_sub(inserted);
    info!(
        table = schema.table_name(),
        staged,
        inserted,
        skipped_duplicates,
        "loaded {}",
        meta.file_name
    );

    Ok(LoadOutcome {
        file: path.to_path_buf(),
        dataset: meta.dataset,
        region: meta.region.key(),
        session: meta.session,
        special: meta.special,
        staged,
        inserted,
        skipped_duplicates,
        clean,
    })
}

/// Create every enum type and table for `region` in one transaction.
#[instrument(level = "info", skip(settings), fields(region = %region))]
pub async fn initialize_region(settings: &Settings, region: &Region) -> Result<()> {
    let datasets = load_order()?;
    let config = settings.connection(region)?;
    let mut session = Session::open(&config).await?;

    let result = async {
        let tx = session
            .client_mut()
            .transaction()
            .await
            .context("beginning transaction")?;
        ensure_tables(&tx, &datasets).await?;
        tx.commit().await.context("committing schema")?;
        Ok::<_, anyhow::Error>(())
    }
    .await;

    session.close().await;
    result?;
    info!(tables = datasets.len(), "schema ready");
    Ok(())
}

/// Steps a-f of a file load: schema, staging, COPY, merge, commit.
/// Returns (rows staged, rows inserted). Dropping the transaction on error
/// rolls everything back.
async fn stage_and_merge(
    client: &mut Client,
    schema: &TableSchema,
    columns: &[String],
    data: Vec<u8>,
) -> Result<(u64, u64)> {
    let tx = client.transaction().await.context("beginning transaction")?;

    ensure_tables(&tx, &dependencies(schema.dataset)?).await?;
    tx.batch_execute(&ddl::create_staging_sql(schema))
        .await
        .context("creating staging table")?;

    let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
    let copy_sql = ddl::copy_into_staging_sql(schema, &cols);
    let sink = tx
        .copy_in::<str, Bytes>(copy_sql.as_str())
        .await
        .context("starting COPY")?;
    pin_mut!(sink);
    sink.send(Bytes::from(data)).await.context("streaming rows")?;
    let staged = sink.finish().await.context("finishing COPY")?;

    let merge_sql = ddl::merge_from_staging_sql(schema, &cols);
    let inserted = tx
        .execute(merge_sql.as_str(), &[])
        .await
        .context("merging staging rows")?;

    tx.commit().await.context("committing")?;
    Ok((staged, inserted))
}

fn header_columns(data: &[u8]) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(data);
    Ok(rdr.headers()?.iter().map(|h| h.trim().to_string()).collect())
}
