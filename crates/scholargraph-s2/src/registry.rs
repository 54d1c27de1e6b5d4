//! First-sighting registry: which entities already have a node row

use rustc_hash::FxHashSet;

/// Entity types that can be seen more than once across records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Author,
    Organization,
    FieldOfStudy,
    Journal,
    JournalVolume,
    Conference,
    Workshop,
    Proceedings,
    City,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        Self::Author,
        Self::Organization,
        Self::FieldOfStudy,
        Self::Journal,
        Self::JournalVolume,
        Self::Conference,
        Self::Workshop,
        Self::Proceedings,
        Self::City,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Author => "authors",
            Self::Organization => "organizations",
            Self::FieldOfStudy => "fields of study",
            Self::Journal => "journals",
            Self::JournalVolume => "journal volumes",
            Self::Conference => "conferences",
            Self::Workshop => "workshops",
            Self::Proceedings => "proceedings",
            Self::City => "cities",
        }
    }
}

/// A journal volume is identified by its journal and volume label
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JournalVolumeKey {
    pub venue_id: String,
    pub volume: Option<String>,
}

impl JournalVolumeKey {
    pub fn new(venue_id: &str, volume: Option<&str>) -> Self {
        Self {
            venue_id: venue_id.to_owned(),
            volume: volume.map(str::to_owned),
        }
    }

    /// JSON array identifier written to the CSV, e.g. `["V1","12"]`
    pub fn serialized(&self) -> String {
        serde_json::json!([self.venue_id, self.volume]).to_string()
    }
}

/// Proceedings are one edition of a conference or workshop per year
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProceedingsKey {
    pub venue_id: String,
    pub year: Option<i32>,
}

impl ProceedingsKey {
    pub fn new(venue_id: &str, year: Option<i32>) -> Self {
        Self {
            venue_id: venue_id.to_owned(),
            year,
        }
    }

    /// JSON array identifier written to the CSV, e.g. `["V1",2024]`
    pub fn serialized(&self) -> String {
        serde_json::json!([self.venue_id, self.year]).to_string()
    }
}

/// Dedup key; the variant fixes the entity kind
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Author(String),
    Organization(String),
    FieldOfStudy(String),
    Journal(String),
    JournalVolume(JournalVolumeKey),
    Conference(String),
    Workshop(String),
    Proceedings(ProceedingsKey),
    City(String),
}

impl EntityKey {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Author(_) => EntityKind::Author,
            Self::Organization(_) => EntityKind::Organization,
            Self::FieldOfStudy(_) => EntityKind::FieldOfStudy,
            Self::Journal(_) => EntityKind::Journal,
            Self::JournalVolume(_) => EntityKind::JournalVolume,
            Self::Conference(_) => EntityKind::Conference,
            Self::Workshop(_) => EntityKind::Workshop,
            Self::Proceedings(_) => EntityKind::Proceedings,
            Self::City(_) => EntityKind::City,
        }
    }
}

/// One `FxHashSet` per entity kind, alive for a single run.
///
/// Only grows; nothing is ever evicted. Memory is proportional to the number
/// of distinct entities in the input.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    sets: [FxHashSet<EntityKey>; EntityKind::ALL.len()],
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, key: &EntityKey) -> bool {
        self.sets[key.kind() as usize].contains(key)
    }

    /// Record `key`; returns `true` on its first sighting.
    pub fn mark_seen(&mut self, key: EntityKey) -> bool {
        self.sets[key.kind() as usize].insert(key)
    }

    /// Distinct entities seen so far of `kind`
    pub fn len(&self, kind: EntityKind) -> usize {
        self.sets[kind as usize].len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(FxHashSet::is_empty)
    }
}
