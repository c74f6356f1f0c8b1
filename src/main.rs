// src/main.rs

mod cli;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use legiscraper::{
    batch::load_region,
    process::{discover_csv, inspect_file, Region},
    schema::ddl,
    store::{initialize_region, load_file},
    Settings,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,legiscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) settings ─────────────────────────────────────────────────
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match cli.command {
        Command::LoadRegion {
            region,
            data_root,
            keep_going,
            report,
        } => {
            let region = Region::find(&region)?;
            let keep_going = keep_going || settings.loader.keep_going;
            let batch = load_region(&settings, &data_root, &region, keep_going).await?;
            let totals = batch.totals();
            info!(
                "{}: {} loaded, {} missing, {} failed, {} rows inserted",
                region, totals.files_loaded, totals.files_missing, totals.files_failed, totals.rows_inserted
            );
            if let Some(out) = report {
                let json = serde_json::to_string_pretty(&batch)?;
                fs::write(&out, json).with_context(|| format!("writing report {:?}", out))?;
                info!("report → {}", out.display());
            }
        }
        Command::LoadFile { paths } => {
            for path in paths {
                let outcome = load_file(&settings, &path).await?;
                info!(
                    "{}: {} inserted, {} duplicates skipped",
                    path.display(),
                    outcome.inserted,
                    outcome.skipped_duplicates
                );
            }
        }
        Command::Init { region } => {
            let region = Region::find(&region)?;
            initialize_region(&settings, &region).await?;
        }
        Command::Check { paths } => {
            let mut bad = 0usize;
            for path in discover_csv(&paths)? {
                match inspect_file(&path, settings.loader.on_clean_failure) {
                    Ok((meta, report)) => {
                        println!(
                            "{}\t{}\t{}\tsession {}{}\trows {}\tfailures {}",
                            path.display(),
                            meta.region.abbreviation,
                            meta.dataset,
                            meta.session,
                            if meta.special { " (special)" } else { "" },
                            report.rows_read,
                            report.failures.len()
                        );
                        for f in &report.failures {
                            println!("    row {} `{}` = {:?}: {}", f.row, f.column, f.value, f.reason);
                        }
                        if !report.is_clean() {
                            bad += 1;
                        }
                    }
                    Err(e) => {
                        error!("{}: {:#}", path.display(), e);
                        bad += 1;
                    }
                }
            }
            if bad > 0 {
                anyhow::bail!("{} file(s) would not load cleanly", bad);
            }
        }
        Command::Schema => {
            println!("{}", ddl::schema_script()?);
        }
    }
    Ok(())
}
