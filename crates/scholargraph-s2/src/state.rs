//! Run kinds: which record type a prepare run consumes, which tables a generate run fills

use crate::schema::Table;

/// Input record types understood by `prepare`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Papers,
    Citations,
}

impl RecordKind {
    /// Parse CLI/config string into enum
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "papers" => Some(Self::Papers),
            "citations" => Some(Self::Citations),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Citations => "citations",
        }
    }

    /// Output tables a run of this kind opens (header-only when nothing is written)
    pub fn tables(self) -> &'static [Table] {
        match self {
            Self::Papers => &Table::PAPER_TABLES,
            Self::Citations => &Table::CITATION_TABLES,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Synthetic tables produced by `generate` after a papers run
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerateKind {
    Reviews,
    Cities,
    ProceedingsCities,
}

impl GenerateKind {
    /// Execution order: cities must exist before they are assigned to proceedings
    pub const ALL: [GenerateKind; 3] = [Self::Reviews, Self::Cities, Self::ProceedingsCities];

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "reviews" => Some(Self::Reviews),
            "cities" => Some(Self::Cities),
            "proceedings-cities" => Some(Self::ProceedingsCities),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Cities => "cities",
            Self::ProceedingsCities => "proceedings-cities",
        }
    }

    /// Table this generator replaces
    pub fn table(self) -> Table {
        match self {
            Self::Reviews => Table::Reviewed,
            Self::Cities => Table::Cities,
            Self::ProceedingsCities => Table::IsHeldIn,
        }
    }
}

impl std::fmt::Display for GenerateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
