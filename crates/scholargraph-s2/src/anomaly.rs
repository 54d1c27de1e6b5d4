//! Data-quality tally: recoverable per-record problems counted during a run

use std::collections::BTreeMap;

/// A recoverable problem with one record.
///
/// Skips drop an edge or node the record asked for and are logged at warn
/// level. Gaps are missing optional attributes: logged per record at debug
/// level, then once per kind at warn level in the run summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anomaly {
    NullAuthorId,
    MainAuthorSkipped,
    MainAuthorPromoted,
    UnknownVenueType,
    VenueWithoutId,
    CitationWithoutEndpoint,
    NoAuthors,
    MissingVenue,
    MissingVolume,
    MissingYear,
    MissingPages,
}

impl Anomaly {
    pub const ALL: [Anomaly; 11] = [
        Self::NullAuthorId,
        Self::MainAuthorSkipped,
        Self::MainAuthorPromoted,
        Self::UnknownVenueType,
        Self::VenueWithoutId,
        Self::CitationWithoutEndpoint,
        Self::NoAuthors,
        Self::MissingVenue,
        Self::MissingVolume,
        Self::MissingYear,
        Self::MissingPages,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NullAuthorId => "author without id",
            Self::MainAuthorSkipped => "main author skipped",
            Self::MainAuthorPromoted => "main author promoted",
            Self::UnknownVenueType => "unknown venue type",
            Self::VenueWithoutId => "venue without id",
            Self::CitationWithoutEndpoint => "citation without endpoint",
            Self::NoAuthors => "paper without authors",
            Self::MissingVenue => "paper without venue",
            Self::MissingVolume => "journal volume missing",
            Self::MissingYear => "proceedings year missing",
            Self::MissingPages => "pages missing",
        }
    }

    /// Whether the record lost graph structure (warn) or only an attribute (debug)
    pub fn is_skip(self) -> bool {
        matches!(
            self,
            Self::NullAuthorId
                | Self::MainAuthorSkipped
                | Self::MainAuthorPromoted
                | Self::UnknownVenueType
                | Self::VenueWithoutId
                | Self::CitationWithoutEndpoint
        )
    }

    /// Level of the per-record log line
    pub fn level(self) -> log::Level {
        if self.is_skip() {
            log::Level::Warn
        } else {
            log::Level::Debug
        }
    }
}

/// Per-run anomaly counts
#[derive(Debug, Clone, Default)]
pub struct Anomalies {
    counts: [usize; Anomaly::ALL.len()],
    venue_types: BTreeMap<String, usize>,
}

impl Anomalies {
    pub fn record(&mut self, anomaly: Anomaly) {
        self.counts[anomaly as usize] += 1;
    }

    /// Count an unmodelled venue type under its declared name
    pub fn record_venue_type(&mut self, declared: &str) {
        self.record(Anomaly::UnknownVenueType);
        *self.venue_types.entry(declared.to_owned()).or_default() += 1;
    }

    pub fn count(&self, anomaly: Anomaly) -> usize {
        self.counts[anomaly as usize]
    }

    /// Total skips (warn-level anomalies)
    pub fn skipped(&self) -> usize {
        Anomaly::ALL
            .iter()
            .filter(|a| a.is_skip())
            .map(|a| self.count(*a))
            .sum()
    }

    /// Non-zero gap counts (missing optional attributes) in declaration order
    pub fn gaps(&self) -> impl Iterator<Item = (Anomaly, usize)> + '_ {
        self.iter().filter(|(a, _)| !a.is_skip())
    }

    /// Non-zero counts in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Anomaly, usize)> + '_ {
        Anomaly::ALL
            .into_iter()
            .map(|a| (a, self.count(a)))
            .filter(|(_, n)| *n > 0)
    }

    /// Unmodelled venue types and how often each appeared
    pub fn venue_types(&self) -> &BTreeMap<String, usize> {
        &self.venue_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_log_at_warn_and_gaps_at_debug() {
        assert_eq!(Anomaly::NullAuthorId.level(), log::Level::Warn);
        assert_eq!(Anomaly::CitationWithoutEndpoint.level(), log::Level::Warn);
        assert_eq!(Anomaly::MissingPages.level(), log::Level::Debug);
        assert_eq!(Anomaly::MissingVolume.level(), log::Level::Debug);
    }

    #[test]
    fn gaps_exclude_skips() {
        let mut a = Anomalies::default();
        a.record(Anomaly::NullAuthorId);
        a.record(Anomaly::MissingPages);
        a.record(Anomaly::MissingPages);
        a.record(Anomaly::MissingYear);
        let gaps: Vec<_> = a.gaps().collect();
        assert_eq!(
            gaps,
            vec![(Anomaly::MissingYear, 1), (Anomaly::MissingPages, 2)]
        );
    }

    #[test]
    fn record_and_count() {
        let mut a = Anomalies::default();
        a.record(Anomaly::NullAuthorId);
        a.record(Anomaly::NullAuthorId);
        a.record(Anomaly::MissingPages);
        assert_eq!(a.count(Anomaly::NullAuthorId), 2);
        assert_eq!(a.count(Anomaly::MissingPages), 1);
        assert_eq!(a.count(Anomaly::NoAuthors), 0);
        assert_eq!(a.skipped(), 2);
    }

    #[test]
    fn iter_skips_zero_counts() {
        let mut a = Anomalies::default();
        a.record(Anomaly::MissingYear);
        let seen: Vec<_> = a.iter().collect();
        assert_eq!(seen, vec![(Anomaly::MissingYear, 1)]);
    }

    #[test]
    fn venue_types_are_tallied() {
        let mut a = Anomalies::default();
        a.record_venue_type("repository");
        a.record_venue_type("repository");
        a.record_venue_type("book");
        assert_eq!(a.count(Anomaly::UnknownVenueType), 3);
        assert_eq!(a.venue_types()["repository"], 2);
        assert_eq!(a.venue_types().len(), 2);
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = Anomaly::ALL.iter().map(|a| a.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Anomaly::ALL.len());
    }
}
