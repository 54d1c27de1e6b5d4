//! Output table catalog and CSV row layouts
//!
//! Every table is written as `<kind>-<name>-{batch}.csv` where kind is `nodes`
//! or `edges`. Row structs serialize positionally, so field order must match
//! the table header.

use std::path::Path;

use serde::Serialize;

use scholargraph_core::BATCH_PLACEHOLDER;

/// All node and edge tables of the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    // nodes
    Papers,
    FieldsOfStudy,
    Authors,
    Organizations,
    Journals,
    JournalVolumes,
    Conferences,
    Workshops,
    Proceedings,
    Cities,
    // edges
    HasFieldOfStudy,
    Wrote,
    MainAuthor,
    IsAffiliatedWith,
    IsPublishedInJournal,
    IsPublishedInProceedings,
    IsEditionOfJournal,
    IsEditionOfConference,
    IsEditionOfWorkshop,
    IsHeldIn,
    Cites,
    Reviewed,
}

impl Table {
    pub const ALL: [Table; 22] = [
        Self::Papers,
        Self::FieldsOfStudy,
        Self::Authors,
        Self::Organizations,
        Self::Journals,
        Self::JournalVolumes,
        Self::Conferences,
        Self::Workshops,
        Self::Proceedings,
        Self::Cities,
        Self::HasFieldOfStudy,
        Self::Wrote,
        Self::MainAuthor,
        Self::IsAffiliatedWith,
        Self::IsPublishedInJournal,
        Self::IsPublishedInProceedings,
        Self::IsEditionOfJournal,
        Self::IsEditionOfConference,
        Self::IsEditionOfWorkshop,
        Self::IsHeldIn,
        Self::Cites,
        Self::Reviewed,
    ];

    /// Tables written by a papers run
    pub const PAPER_TABLES: [Table; 19] = [
        Self::Papers,
        Self::FieldsOfStudy,
        Self::Authors,
        Self::Organizations,
        Self::Journals,
        Self::JournalVolumes,
        Self::Conferences,
        Self::Workshops,
        Self::Proceedings,
        Self::HasFieldOfStudy,
        Self::Wrote,
        Self::MainAuthor,
        Self::IsAffiliatedWith,
        Self::IsPublishedInJournal,
        Self::IsPublishedInProceedings,
        Self::IsEditionOfJournal,
        Self::IsEditionOfConference,
        Self::IsEditionOfWorkshop,
        Self::IsHeldIn,
    ];

    /// Tables written by a citations run
    pub const CITATION_TABLES: [Table; 1] = [Self::Cites];

    /// Dense index into per-table arrays
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_node(self) -> bool {
        self.index() <= Self::Cities.index()
    }

    pub fn kind(self) -> &'static str {
        if self.is_node() { "nodes" } else { "edges" }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::FieldsOfStudy => "fieldsofstudy",
            Self::Authors => "authors",
            Self::Organizations => "organizations",
            Self::Journals => "journals",
            Self::JournalVolumes => "journalvolumes",
            Self::Conferences => "conferences",
            Self::Workshops => "workshops",
            Self::Proceedings => "proceedings",
            Self::Cities => "cities",
            Self::HasFieldOfStudy => "hasfieldofstudy",
            Self::Wrote => "wrote",
            Self::MainAuthor => "mainauthor",
            Self::IsAffiliatedWith => "isaffiliatedwith",
            Self::IsPublishedInJournal => "ispublishedinjournal",
            Self::IsPublishedInProceedings => "ispublishedinproceedings",
            Self::IsEditionOfJournal => "iseditionofjournal",
            Self::IsEditionOfConference => "iseditionofconference",
            Self::IsEditionOfWorkshop => "iseditionofworkshop",
            Self::IsHeldIn => "isheldin",
            Self::Cites => "citations",
            Self::Reviewed => "reviewed",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Papers => &[
                "paperID",
                "url",
                "title",
                "abstract",
                "year",
                "isOpenAccess",
                "openAccessPDFUrl",
                "publicationTypes",
                "embedding",
                "tldr",
            ],
            Self::FieldsOfStudy | Self::Organizations | Self::Cities => &["name"],
            Self::Authors => &["authorID", "url", "name", "homepage", "hIndex"],
            Self::Journals => &["journalID", "name", "url", "alternateNames"],
            Self::Conferences => &["conferenceID", "name", "url", "alternateNames"],
            Self::Workshops => &["workshopID", "name", "url", "alternateNames"],
            Self::JournalVolumes => &["journalVolumeID", "year", "volume"],
            Self::Proceedings => &["proceedingsID", "year"],
            Self::HasFieldOfStudy => &["paperID", "fieldOfStudy"],
            Self::Wrote | Self::MainAuthor => &["paperID", "authorID"],
            Self::IsAffiliatedWith => &["authorID", "organization"],
            Self::IsPublishedInJournal => &["paperID", "journalVolumeID", "pages"],
            Self::IsPublishedInProceedings => &["paperID", "proceedingsID", "pages"],
            Self::IsEditionOfJournal => &["journalVolumeID", "journalID"],
            Self::IsEditionOfConference => &["proceedingsID", "conferenceID"],
            Self::IsEditionOfWorkshop => &["proceedingsID", "workshopID"],
            Self::IsHeldIn => &["proceedingsID", "city"],
            Self::Cites => &[
                "citedPaperID",
                "citingPaperID",
                "isInfluential",
                "contextsWithIntent",
            ],
            Self::Reviewed => &["authorID", "paperID"],
        }
    }

    /// Bare file name template, e.g. `nodes-papers-{batch}.csv`
    pub fn file_template(self) -> String {
        format!("{}-{}-{BATCH_PLACEHOLDER}.csv", self.kind(), self.name())
    }

    /// Full path template inside `dir`
    pub fn path_template(self, dir: &Path) -> String {
        dir.join(self.file_template()).display().to_string()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind(), self.name())
    }
}

// === Row layouts ===

/// nodes-papers
#[derive(Debug, Serialize)]
pub struct PaperNode<'a> {
    pub paper_id: &'a str,
    pub url: Option<&'a str>,
    pub title: Option<&'a str>,
    pub abstract_text: Option<&'a str>,
    pub year: Option<i32>,
    pub is_open_access: Option<bool>,
    pub open_access_pdf_url: Option<&'a str>,
    pub publication_types: Option<String>,
    pub embedding: Option<String>,
    pub tldr: Option<String>,
}

/// Single-column nodes keyed by name (fields of study, organizations, cities)
#[derive(Debug, Serialize)]
pub struct NameNode<'a> {
    pub name: &'a str,
}

/// nodes-authors
#[derive(Debug, Serialize)]
pub struct AuthorNode<'a> {
    pub author_id: &'a str,
    pub url: Option<&'a str>,
    pub name: Option<&'a str>,
    pub homepage: Option<&'a str>,
    pub h_index: Option<i64>,
}

/// nodes-journals, nodes-conferences, nodes-workshops
#[derive(Debug, Serialize)]
pub struct VenueNode<'a> {
    pub venue_id: &'a str,
    pub name: Option<&'a str>,
    pub url: Option<&'a str>,
    pub alternate_names: String,
}

/// nodes-journalvolumes
#[derive(Debug, Serialize)]
pub struct JournalVolumeNode<'a> {
    pub journal_volume_id: &'a str,
    pub year: Option<i32>,
    pub volume: Option<&'a str>,
}

/// nodes-proceedings
#[derive(Debug, Serialize)]
pub struct ProceedingsNode<'a> {
    pub proceedings_id: &'a str,
    pub year: Option<i32>,
}

/// Two-column edge; column meaning is given by the table header
#[derive(Debug, Serialize)]
pub struct Link<'a> {
    pub from: &'a str,
    pub to: &'a str,
}

impl<'a> Link<'a> {
    pub fn new(from: &'a str, to: &'a str) -> Self {
        Self { from, to }
    }
}

/// edges-ispublishedinjournal, edges-ispublishedinproceedings
#[derive(Debug, Serialize)]
pub struct PublishedIn<'a> {
    pub paper_id: &'a str,
    pub edition_id: &'a str,
    pub pages: Option<&'a str>,
}

/// edges-isheldin; city stays empty until assigned by `generate`
#[derive(Debug, Serialize)]
pub struct HeldIn<'a> {
    pub proceedings_id: &'a str,
    pub city: Option<&'a str>,
}

/// edges-citations
#[derive(Debug, Serialize)]
pub struct CitationEdge<'a> {
    pub cited_paper_id: &'a str,
    pub citing_paper_id: &'a str,
    pub is_influential: bool,
    pub contexts_with_intent: Option<String>,
}
