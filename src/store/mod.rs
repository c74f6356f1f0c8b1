// src/store/mod.rs
//! PostgreSQL access: one connection per file, one transaction per load.

pub mod load;

pub use load::{initialize_region, load_file, LoadOutcome};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config as PgConfig, NoTls, Transaction};
use tracing::{debug, error};

use crate::config::describe;
use crate::schema::{ddl, DatasetType, EnumType};

/// An open connection plus the task driving it.
pub struct Session {
    client: Client,
    driver: JoinHandle<()>,
    label: String,
}

impl Session {
    pub async fn open(config: &PgConfig) -> Result<Self> {
        let label = describe(config);
        let (client, connection) = config
            .connect(NoTls)
            .await
            .with_context(|| format!("connecting to {}", label))?;

        let conn_label = label.clone();
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(db = %conn_label, "connection error: {}", e);
            }
        });
        debug!(db = %label, "connected");
        Ok(Self {
            client,
            driver,
            label,
        })
    }

    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }

    /// Drop the client and wait for the connection task to finish.
    pub async fn close(self) {
        let Session {
            client,
            driver,
            label,
        } = self;
        drop(client);
        if let Err(e) = driver.await {
            error!(db = %label, "connection task failed: {}", e);
        }
        debug!(db = %label, "closed");
    }
}

/// Create the enum types and tables for `datasets`, in the given order.
pub(crate) async fn ensure_tables(tx: &Transaction<'_>, datasets: &[DatasetType]) -> Result<()> {
    let mut enums: Vec<&'static EnumType> = Vec::new();
    for dataset in datasets {
        for e in dataset.schema().enum_types() {
            if !enums.iter().any(|seen| seen.name == e.name) {
                enums.push(e);
            }
        }
    }

    for e in enums {
        tx.batch_execute(&ddl::create_enum_sql(e))
            .await
            .with_context(|| format!("creating enum type {}", e.name))?;
    }
    for dataset in datasets {
        tx.batch_execute(&ddl::create_table_sql(dataset.schema()))
            .await
            .with_context(|| format!("creating table {}", dataset))?;
    }
    Ok(())
}
