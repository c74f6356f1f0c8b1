// src/config.rs
//! Loader settings, resolved once at startup and passed to every component.
//!
//! The file is INI with one section per region key, each holding libpq
//! connection keywords, plus an optional `[loader]` section:
//!
//! ```ini
//! [loader]
//! on_clean_failure = skip_row
//!
//! [new hampshire]
//! host = db.internal
//! database = granite_state
//! user = loader
//! sslmode = disable
//! ```

use anyhow::{anyhow, bail, Context, Result};
use ini::{Ini, Properties};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::Path, str::FromStr};
use tokio_postgres::Config as PgConfig;
use tracing::{debug, info};

use crate::process::Region;

/// Default configuration filename, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "database.ini";

/// Environment variable naming an alternative configuration file.
pub const ENV_CONFIG: &str = "LEGISCRAPER_CONFIG";

/// Section holding loader options rather than connection keywords.
pub const LOADER_SECTION: &str = "loader";

/// Section whose keys every region section inherits.
const DEFAULT_SECTION: &str = "DEFAULT";

/// Region key holding a complete libpq connection string or URL.
const CONNECTION_STRING: &str = "connection_string";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_USER: &str = "postgres";
const APPLICATION_NAME: &str = "legiscraper";

/// What to do when a cell cannot be cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanPolicy {
    /// Abort the file; nothing is written or loaded.
    #[default]
    FailFile,
    /// Drop rows with a failed cell and load the rest.
    SkipRow,
}

impl FromStr for CleanPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_file" => Ok(CleanPolicy::FailFile),
            "skip_row" => Ok(CleanPolicy::SkipRow),
            other => Err(anyhow!(
                "on_clean_failure must be `fail_file` or `skip_row`, got `{}`",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderSection {
    pub on_clean_failure: CleanPolicy,

    /// Record failed files in the batch report and continue.
    pub keep_going: bool,
}

impl LoaderSection {
    fn from_properties(props: &Properties) -> Result<Self> {
        let mut loader = Self::default();
        for (key, value) in props.iter() {
            match key.to_ascii_lowercase().as_str() {
                "on_clean_failure" => loader.on_clean_failure = value.parse()?,
                "keep_going" => loader.keep_going = parse_bool(value)?,
                other => bail!("unknown key `{}` in [{}]", other, LOADER_SECTION),
            }
        }
        Ok(loader)
    }
}

/// Boolean spellings accepted by Python's `ConfigParser.getboolean`.
fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        other => Err(anyhow!("not a boolean: `{}`", other)),
    }
}

/// libpq keywords for one region, keys lower-cased.
pub type ConnectionParams = BTreeMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub loader: LoaderSection,

    /// Region key → connection keywords.
    pub regions: BTreeMap<String, ConnectionParams>,
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file; using local defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let settings = Self::from_ini_str(&text).with_context(|| format!("parsing {:?}", path))?;
        debug!(regions = settings.regions.len(), "loaded config");
        Ok(settings)
    }

    pub fn from_ini_str(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text)?;
        let mut settings = Self::default();
        let mut defaults = ConnectionParams::new();

        for (section, props) in ini.iter() {
            match section {
                None => {
                    if let Some((key, _)) = props.iter().next() {
                        bail!("`{}` appears before any [section]", key);
                    }
                }
                Some(DEFAULT_SECTION) => defaults = collect(props),
                Some(LOADER_SECTION) => settings.loader = LoaderSection::from_properties(props)?,
                Some(name) => {
                    settings.regions.insert(name.to_string(), collect(props));
                }
            }
        }

        for params in settings.regions.values_mut() {
            for (key, value) in &defaults {
                params.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        Ok(settings)
    }

    pub fn params(&self, region: &Region) -> Option<&ConnectionParams> {
        self.regions.get(&region.key())
    }

    /// Store connection for `region`.
    ///
    /// Every key of the region's section is handed to the connection parser
    /// as a libpq keyword, so an unsupported keyword is an error. Without a
    /// section the region connects to a local database named after its key.
    pub fn connection(&self, region: &Region) -> Result<PgConfig> {
        let key = region.key();
        let mut params = self.params(region).cloned().unwrap_or_default();

        let mut config = if let Some(url) = params.remove(CONNECTION_STRING) {
            if !params.is_empty() {
                let extra: Vec<&str> = params.keys().map(String::as_str).collect();
                bail!(
                    "[{}]: {} cannot be combined with {:?}",
                    key,
                    CONNECTION_STRING,
                    extra
                );
            }
            url.parse::<PgConfig>()
                .with_context(|| format!("parsing {} for [{}]", CONNECTION_STRING, key))?
        } else {
            if let Some(database) = params.remove("database") {
                params.entry("dbname".into()).or_insert(database);
            }
            params.entry("host".into()).or_insert_with(|| DEFAULT_HOST.into());
            params.entry("dbname".into()).or_insert_with(|| key.clone());
            params.entry("user".into()).or_insert_with(|| DEFAULT_USER.into());
            conninfo(&params)
                .parse::<PgConfig>()
                .with_context(|| format!("invalid connection settings for [{}]", key))?
        };

        if config.get_application_name().is_none() {
            config.application_name(APPLICATION_NAME);
        }
        Ok(config)
    }
}

fn collect(props: &Properties) -> ConnectionParams {
    props
        .iter()
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect()
}

/// `key='value' …` with libpq quoting.
fn conninfo(params: &ConnectionParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}='{}'", k, v.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `host/dbname as user` for log lines; never includes the password.
pub fn describe(config: &PgConfig) -> String {
    let host = config
        .get_hosts()
        .first()
        .map(|h| format!("{:?}", h))
        .unwrap_or_default();
    format!(
        "{}/{} as {}",
        host,
        config.get_dbname().unwrap_or(""),
        config.get_user().unwrap_or("")
    )
}
