//! Catalog models
//!
//! A catalog is a JSON array of film records. Each record carries a handful
//! of fixed fields (identifier, title, enrichment flag, club info) and an open
//! mapping of provider-sourced metadata whose keys are already camelCase.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// JSON key holding the external identifier
pub const IDENTIFIER_KEY: &str = "imdbID";

pub const TITLE_KEY: &str = "title";

pub const CLUB_INFO_KEY: &str = "movieClubInfo";

/// One film in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// External identifier (IMDb id), the catalog's primary key
    #[serde(rename = "imdbID", default, deserialize_with = "lenient_string")]
    pub imdb_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether the crew lookup has ever been attempted for this record
    #[serde(rename = "enrichmentAttempted", default)]
    pub enrichment: EnrichmentStatus,

    #[serde(
        rename = "movieClubInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub club_info: Option<ClubInfo>,

    /// Provider-sourced metadata (camelCase keys)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CatalogRecord {
    /// Create a record with no club info and enrichment not yet attempted
    pub fn new(imdb_id: impl Into<String>, title: Option<String>, metadata: Map<String, Value>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title,
            enrichment: EnrichmentStatus::NotAttempted,
            club_info: None,
            metadata,
        }
    }

    /// Club info, created as an empty shell if missing
    pub fn club_info_mut(&mut self) -> &mut ClubInfo {
        self.club_info.get_or_insert_with(ClubInfo::default)
    }

    /// Club info that didn't fit the model and is held verbatim in `metadata`
    ///
    /// Such a record must not gain a fresh `club_info`, or the file would
    /// carry two `movieClubInfo` keys.
    pub fn has_unreadable_club_info(&self) -> bool {
        self.club_info.is_none() && self.metadata.contains_key(CLUB_INFO_KEY)
    }

    /// Build a record from an object whose fixed fields don't fit the model
    ///
    /// `title` and `movieClubInfo` are moved into `metadata` unchanged, so the
    /// record is written back with the same values it was read with.
    pub fn preserving(mut object: Map<String, Value>) -> serde_json::Result<Self> {
        let mut kept = Map::new();
        for key in [TITLE_KEY, CLUB_INFO_KEY] {
            if let Some(value) = object.remove(key) {
                kept.insert(key.to_string(), value);
            }
        }
        let mut record: CatalogRecord = serde_json::from_value(Value::Object(object))?;
        record.metadata.extend(kept);
        Ok(record)
    }

    /// Stored watch date text, if any
    pub fn watch_date(&self) -> Option<&str> {
        self.club_info.as_ref()?.watch_date.as_deref()
    }
}

/// Per-record crew enrichment state
///
/// Persisted as a plain boolean. Anything other than `true` (or `"true"`),
/// including an absent flag, loads as `NotAttempted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "bool")]
pub enum EnrichmentStatus {
    #[default]
    NotAttempted,
    Attempted,
}

impl EnrichmentStatus {
    pub fn is_attempted(self) -> bool {
        self == EnrichmentStatus::Attempted
    }
}

impl From<Option<Value>> for EnrichmentStatus {
    fn from(flag: Option<Value>) -> Self {
        match flag {
            Some(Value::Bool(true)) => EnrichmentStatus::Attempted,
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => {
                EnrichmentStatus::Attempted
            }
            _ => EnrichmentStatus::NotAttempted,
        }
    }
}

impl From<EnrichmentStatus> for bool {
    fn from(status: EnrichmentStatus) -> Self {
        status.is_attempted()
    }
}

/// Club state attached to a film
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubInfo {
    /// Member who picked the film
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub selector: Option<String>,

    /// Free-form date text as typed into the sheet
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub watch_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub trophy_notes: Option<String>,

    /// Opaque, never modified by the sync engine
    #[serde(default)]
    pub trophy_info: Option<Value>,

    #[serde(default, deserialize_with = "deserialize_club_ratings")]
    pub club_ratings: Vec<RatingEntry>,

    /// Keys this model doesn't know about, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClubInfo {
    /// Find a member's entry (member ids compare case-insensitively)
    pub fn rating_for(&self, member: &str) -> Option<&RatingEntry> {
        self.club_ratings
            .iter()
            .find(|entry| entry.user.eq_ignore_ascii_case(member))
    }
}

/// One member's reaction to a film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: String,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub blurb: Option<String>,
}

impl RatingEntry {
    pub fn new(user: impl Into<String>, score: Option<Score>, blurb: Option<String>) -> Self {
        Self {
            user: user.into(),
            score,
            blurb,
        }
    }
}

/// A rating score: whole number, decimal, or text that isn't a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// Any other JSON found in a stored catalog, kept as-is
    Raw(Value),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Integer(n) => write!(f, "{}", n),
            Score::Decimal(x) => write!(f, "{}", x),
            Score::Text(s) => f.write_str(s),
            Score::Raw(value) => write!(f, "{}", value),
        }
    }
}

/// Accepts strings, numbers and booleans; anything else becomes empty
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Shapes `clubRatings` has taken over time
#[derive(Deserialize)]
#[serde(untagged)]
enum RatingsShape {
    List(Vec<RatingEntry>),
    /// Older catalogs keyed ratings by member, with `null` for "no rating yet"
    ByMember(BTreeMap<String, Option<LegacyRating>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyRating {
    Entry {
        #[serde(default)]
        score: Option<Score>,
        #[serde(default)]
        blurb: Option<String>,
    },
    Bare(Score),
}

fn deserialize_club_ratings<'de, D>(deserializer: D) -> Result<Vec<RatingEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let shape = Option::<RatingsShape>::deserialize(deserializer)?;
    Ok(match shape {
        None => Vec::new(),
        Some(RatingsShape::List(entries)) => entries,
        Some(RatingsShape::ByMember(by_member)) => by_member
            .into_iter()
            .filter_map(|(member, rating)| {
                let (score, blurb) = match rating? {
                    LegacyRating::Entry { score, blurb } => (score, blurb),
                    LegacyRating::Bare(score) => (Some(score), None),
                };
                Some(RatingEntry::new(member, score, blurb))
            })
            .collect(),
    })
}
