// src/process/filename.rs

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::regions::Region;
use crate::error::LoadError;
use crate::schema::DatasetType;

/// Session token before any special-session suffix: digits plus a
/// two-letter ordinal ("103rd", "00NA").
static SESSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[A-Za-z]{2}$").expect("session regex should compile"));

/// What a bulk-data file name says about its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_name: String,
    pub region: Region,
    pub session: u32,
    pub special: bool,
    pub dataset: DatasetType,
}

/// Split `<REGION>_<SESSION>[-<SPECIAL>]_<DATASET>.csv` into its parts.
///
/// Only the final path component is inspected.
pub fn classify(path: impl AsRef<Path>) -> Result<FileMeta, LoadError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| malformed(&path.display().to_string(), "not a UTF-8 file name"))?;

    let stem = file_name.split('.').next().unwrap_or(file_name);
    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 3 || tokens.iter().any(|t| t.is_empty()) {
        return Err(malformed(
            file_name,
            "expected <REGION>_<SESSION>_<DATASET>",
        ));
    }

    let region = Region::from_abbreviation(tokens[0])?;
    let (session, special) = parse_session(tokens[1]).map_err(|r| malformed(file_name, &r))?;
    let dataset: DatasetType = tokens[2..].join("_").parse()?;

    trace!(file_name, %region, session, special, %dataset, "classified");
    Ok(FileMeta {
        file_name: file_name.to_string(),
        region,
        session,
        special,
        dataset,
    })
}

/// Numeric session and special-session flag from a session token.
pub fn parse_session(token: &str) -> Result<(u32, bool), String> {
    let (base, special) = match token.split_once('-') {
        Some((base, _)) => (base, true),
        None => (token, false),
    };
    let caps = SESSION_RE
        .captures(base)
        .ok_or_else(|| format!("session `{}` does not end in a two-letter suffix", token))?;
    let number = caps[1]
        .parse::<u32>()
        .map_err(|e| format!("session `{}`: {}", token, e))?;
    Ok((number, special))
}

/// Canonical file name for one dataset of one session.
pub fn data_file_name(region: &Region, session_token: &str, dataset: DatasetType) -> String {
    format!(
        "{}_{}_{}.csv",
        region.abbreviation.to_uppercase(),
        session_token,
        dataset.as_str()
    )
}

fn malformed(name: &str, reason: &str) -> LoadError {
    LoadError::MalformedFileName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_regular_session() {
        let meta = classify("IL_103rd_bills.csv").unwrap();
        assert_eq!(meta.region.key(), "illinois");
        assert_eq!(meta.session, 103);
        assert!(!meta.special);
        assert_eq!(meta.dataset, DatasetType::Bills);
    }

    #[test]
    fn classify_special_session_and_multi_word_dataset() {
        let meta = classify("data/TX/87th-2/TX_87th-2_bill_document_links.csv").unwrap();
        assert_eq!(meta.region.abbreviation, "TX");
        assert_eq!(meta.session, 87);
        assert!(meta.special);
        assert_eq!(meta.dataset, DatasetType::BillDocumentLinks);
        assert_eq!(meta.file_name, "TX_87th-2_bill_document_links.csv");
    }

    #[test]
    fn classify_roster_file() {
        let meta = classify("IL_00NA_people.csv").unwrap();
        assert_eq!(meta.session, 0);
        assert_eq!(meta.dataset, DatasetType::People);
    }

    #[test]
    fn every_dataset_round_trips_through_its_file_name() {
        let region = Region::from_abbreviation("NH").unwrap();
        for dataset in DatasetType::ALL {
            for (token, session, special) in [("2021st", 2021, false), ("101st-1", 101, true)] {
                let name = data_file_name(&region, token, dataset);
                let meta = classify(&name).unwrap();
                assert_eq!(
                    (meta.region, meta.session, meta.special, meta.dataset),
                    (region, session, special, dataset),
                    "{}",
                    name
                );
            }
        }
    }

    #[test]
    fn malformed_session_tokens() {
        for name in [
            "IL_103_bills.csv",
            "IL_103r_bills.csv",
            "IL_all_bills.csv",
            "IL_rd_bills.csv",
            "IL_10-3rd_bills.csv",
        ] {
            assert!(
                matches!(classify(name), Err(LoadError::MalformedFileName { .. })),
                "{}",
                name
            );
        }
    }

    #[test]
    fn too_few_tokens() {
        assert!(matches!(
            classify("IL_bills.csv"),
            Err(LoadError::MalformedFileName { .. })
        ));
    }

    #[test]
    fn unknown_dataset_and_region() {
        assert!(matches!(
            classify("IL_103rd_committees.csv"),
            Err(LoadError::UnknownDataset(ref d)) if d == "committees"
        ));
        assert!(matches!(
            classify("ZZ_103rd_bills.csv"),
            Err(LoadError::UnknownRegion(_))
        ));
    }
}
