// src/schema/registry.rs

use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::types::{Column, EnumType, ForeignKey, TableSchema};
use crate::error::LoadError;

use super::types::SqlType::{Boolean, Date, Enum, EnumArray, SmallInt, Text, Varchar};

/// The fourteen bulk-export datasets, one table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetType {
    Bills,
    People,
    BillDocuments,
    BillActions,
    BillAbstracts,
    BillSponsorships,
    BillSources,
    BillVersions,
    BillVersionLinks,
    Votes,
    VoteSources,
    VoteCounts,
    VotePeople,
    BillDocumentLinks,
}

impl DatasetType {
    pub const ALL: [DatasetType; 14] = [
        DatasetType::Bills,
        DatasetType::People,
        DatasetType::BillDocuments,
        DatasetType::BillActions,
        DatasetType::BillAbstracts,
        DatasetType::BillSponsorships,
        DatasetType::BillSources,
        DatasetType::BillVersions,
        DatasetType::BillVersionLinks,
        DatasetType::Votes,
        DatasetType::VoteSources,
        DatasetType::VoteCounts,
        DatasetType::VotePeople,
        DatasetType::BillDocumentLinks,
    ];

    /// Dataset name as it appears in file names; also the table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Bills => "bills",
            DatasetType::People => "people",
            DatasetType::BillDocuments => "bill_documents",
            DatasetType::BillActions => "bill_actions",
            DatasetType::BillAbstracts => "bill_abstracts",
            DatasetType::BillSponsorships => "bill_sponsorships",
            DatasetType::BillSources => "bill_sources",
            DatasetType::BillVersions => "bill_versions",
            DatasetType::BillVersionLinks => "bill_version_links",
            DatasetType::Votes => "votes",
            DatasetType::VoteSources => "vote_sources",
            DatasetType::VoteCounts => "vote_counts",
            DatasetType::VotePeople => "vote_people",
            DatasetType::BillDocumentLinks => "bill_document_links",
        }
    }

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            DatasetType::Bills => &BILLS,
            DatasetType::People => &PEOPLE,
            DatasetType::BillDocuments => &BILL_DOCUMENTS,
            DatasetType::BillActions => &BILL_ACTIONS,
            DatasetType::BillAbstracts => &BILL_ABSTRACTS,
            DatasetType::BillSponsorships => &BILL_SPONSORSHIPS,
            DatasetType::BillSources => &BILL_SOURCES,
            DatasetType::BillVersions => &BILL_VERSIONS,
            DatasetType::BillVersionLinks => &BILL_VERSION_LINKS,
            DatasetType::Votes => &VOTES,
            DatasetType::VoteSources => &VOTE_SOURCES,
            DatasetType::VoteCounts => &VOTE_COUNTS,
            DatasetType::VotePeople => &VOTE_PEOPLE,
            DatasetType::BillDocumentLinks => &BILL_DOCUMENT_LINKS,
        }
    }
}

impl FromStr for DatasetType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| LoadError::UnknownDataset(s.to_string()))
    }
}

impl Serialize for DatasetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── enumerated types ──────────────────────────────────────────────────

pub static ENUM_TYPES: [EnumType; 7] = [
    EnumType {
        name: "bill_action_classification",
        labels: &[
            "filing",
            "introduction",
            "reading-1",
            "reading-2",
            "reading-3",
            "referral-committee",
            "committee-passage",
            "committee-failure",
            "committee-passage-favorable",
            "amendment-passage",
            "amendment-failure",
            "amendment-introduction",
            "executive-signature",
            "executive-receipt",
            "executive-veto",
            "executive-veto-line-item",
            "veto-override-passage",
            "withdrawal",
            "passage",
            "failure",
            "became-law",
        ],
    },
    EnumType {
        name: "organization_classification_enum",
        labels: &["upper", "lower"],
    },
    EnumType {
        name: "bill_classification",
        labels: &[
            "resolution",
            "bill",
            "joint resolution",
            "constitutional amendment",
            "appointment",
        ],
    },
    EnumType {
        name: "bill_sponsorship_classification",
        labels: &["primary", "cosponsor"],
    },
    EnumType {
        name: "result_enum",
        labels: &["pass", "fail"],
    },
    EnumType {
        name: "vote_option",
        labels: &["yes", "no", "not voting", "absent", "excused", "other"],
    },
    EnumType {
        name: "party",
        labels: &[
            "Republican",
            "Democratic",
            "Libertarian",
            "Green",
            "Independent",
        ],
    },
];

const BILL_ACTION_CLASSIFICATION: &str = "bill_action_classification";
const ORGANIZATION_CLASSIFICATION: &str = "organization_classification_enum";

// ─── tables ────────────────────────────────────────────────────────────

static BILLS: TableSchema = TableSchema {
    dataset: DatasetType::Bills,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("identifier", Varchar(10)),
        Column::plain("title", Varchar(100)),
        Column::classification("classification", EnumArray("bill_classification")),
        Column::plain("subject", Varchar(10)),
        Column::plain("session_identifier", Varchar(13)),
        Column::plain("jurisdiction", Varchar(20)),
        Column::classification(
            "organization_classification",
            Enum(ORGANIZATION_CLASSIFICATION),
        ),
    ],
    foreign_keys: &[],
};

static PEOPLE: TableSchema = TableSchema {
    dataset: DatasetType::People,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("name", Varchar(50)),
        Column::plain("current_party", Enum("party")),
        Column::plain("current_district", SmallInt),
        Column::plain("current_chamber", Enum(ORGANIZATION_CLASSIFICATION)),
        Column::plain("given_name", Varchar(25)),
        Column::plain("family_name", Varchar(25)),
        Column::plain("gender", Varchar(10)),
        Column::plain("email", Varchar(50)),
        Column::plain("biography", Text),
        Column::plain("birth_date", Date),
        Column::plain("death_date", Date),
        Column::plain("image", Varchar(100)),
        Column::plain("links", Text),
        Column::plain("sources", Text),
        Column::plain("capitol_address", Varchar(100)),
        Column::plain("capitol_voice", Varchar(50)),
        Column::plain("capitol_fax", Varchar(50)),
        Column::plain("district_address", Varchar(100)),
        Column::plain("district_voice", Varchar(50)),
        Column::plain("district_fax", Varchar(50)),
        Column::plain("twitter", Varchar(50)),
        Column::plain("youtube", Varchar(50)),
        Column::plain("instagram", Varchar(50)),
        Column::plain("facebook", Varchar(50)),
    ],
    foreign_keys: &[],
};

static BILL_DOCUMENTS: TableSchema = TableSchema {
    dataset: DatasetType::BillDocuments,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("bill_id"),
        Column::plain("note", Varchar(50)),
        Column::plain("date", Date),
        Column::classification("classification", Varchar(20)),
        Column::plain("extras", Varchar(20)),
    ],
    foreign_keys: &[ForeignKey::references("bill_id", DatasetType::Bills)],
};

static BILL_ACTIONS: TableSchema = TableSchema {
    dataset: DatasetType::BillActions,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("bill_id"),
        Column::reference("organization_id"),
        Column::plain("description", Text),
        Column::plain("date", Date),
        Column::classification("classification", EnumArray(BILL_ACTION_CLASSIFICATION)),
        Column::plain("bill_order", SmallInt),
    ],
    foreign_keys: &[ForeignKey::references("bill_id", DatasetType::Bills)],
};

static BILL_ABSTRACTS: TableSchema = TableSchema {
    dataset: DatasetType::BillAbstracts,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("bill_id"),
        Column::plain("abstract", Text),
        Column::plain("note", Text),
    ],
    foreign_keys: &[ForeignKey::references("bill_id", DatasetType::Bills)],
};

static BILL_SPONSORSHIPS: TableSchema = TableSchema {
    dataset: DatasetType::BillSponsorships,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("name", Varchar(100)),
        Column::plain("entity_type", Varchar(16)),
        Column::reference("organization_id"),
        Column::reference("person_id"),
        Column::reference("bill_id"),
        Column::plain("primary_sponsor", Boolean),
        Column::classification(
            "classification",
            Enum("bill_sponsorship_classification"),
        ),
    ],
    foreign_keys: &[
        ForeignKey::references("bill_id", DatasetType::Bills),
        ForeignKey::loads_after("person_id", DatasetType::People),
    ],
};

static BILL_SOURCES: TableSchema = TableSchema {
    dataset: DatasetType::BillSources,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("note", Varchar(20)),
        Column::plain("url", Text),
        Column::reference("bill_id"),
    ],
    foreign_keys: &[ForeignKey::references("bill_id", DatasetType::Bills)],
};

static BILL_VERSIONS: TableSchema = TableSchema {
    dataset: DatasetType::BillVersions,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("bill_id"),
        Column::plain("note", Varchar(100)),
        Column::plain("date", Date),
        Column::classification("classification", Varchar(20)),
        Column::plain("extras", Varchar(20)),
    ],
    foreign_keys: &[ForeignKey::references("bill_id", DatasetType::Bills)],
};

static BILL_VERSION_LINKS: TableSchema = TableSchema {
    dataset: DatasetType::BillVersionLinks,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("media_type", Varchar(20)),
        Column::plain("url", Text),
        Column::reference("version_id"),
    ],
    foreign_keys: &[ForeignKey::references(
        "version_id",
        DatasetType::BillVersions,
    )],
};

static VOTES: TableSchema = TableSchema {
    dataset: DatasetType::Votes,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("identifier", Varchar(10)),
        Column::plain("motion_text", Varchar(50)),
        Column::classification(
            "motion_classification",
            EnumArray(BILL_ACTION_CLASSIFICATION),
        ),
        Column::plain("start_date", Date),
        Column::plain("result", Enum("result_enum")),
        Column::reference("organization_id"),
        Column::reference("bill_id"),
        Column::reference("bill_action_id"),
        Column::plain("jurisdiction", Varchar(16)),
        Column::plain("session_identifier", Varchar(16)),
    ],
    foreign_keys: &[
        ForeignKey::references("bill_id", DatasetType::Bills),
        ForeignKey::references("bill_action_id", DatasetType::BillActions),
    ],
};

static VOTE_SOURCES: TableSchema = TableSchema {
    dataset: DatasetType::VoteSources,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("url", Varchar(100)),
        Column::plain("note", Varchar(100)),
        Column::reference("vote_event_id"),
    ],
    foreign_keys: &[ForeignKey::references("vote_event_id", DatasetType::Votes)],
};

static VOTE_COUNTS: TableSchema = TableSchema {
    dataset: DatasetType::VoteCounts,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("vote_event_id"),
        Column::plain("option", Enum("vote_option")),
        Column::plain("value", SmallInt),
    ],
    foreign_keys: &[ForeignKey::references("vote_event_id", DatasetType::Votes)],
};

static VOTE_PEOPLE: TableSchema = TableSchema {
    dataset: DatasetType::VotePeople,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::reference("vote_event_id"),
        Column::plain("option", Enum("vote_option")),
        Column::plain("voter_name", Varchar(50)),
        Column::reference("voter_id"),
        Column::plain("note", Varchar(50)),
    ],
    foreign_keys: &[
        ForeignKey::references("vote_event_id", DatasetType::Votes),
        ForeignKey::loads_after("voter_id", DatasetType::People),
    ],
};

static BILL_DOCUMENT_LINKS: TableSchema = TableSchema {
    dataset: DatasetType::BillDocumentLinks,
    primary_key: "id",
    columns: &[
        Column::reference("id"),
        Column::plain("media_type", Varchar(10)),
        Column::plain("url", Text),
        Column::reference("document_id"),
    ],
    foreign_keys: &[ForeignKey::references(
        "document_id",
        DatasetType::BillDocuments,
    )],
};
