//! Record → graph rows.
//!
//! [`GraphBuilder`] consumes records one at a time and writes node and edge
//! rows to a [`TableSink`]. Nodes for shared entities (authors, organizations,
//! fields of study, venues, venue editions) are emitted on first sighting only,
//! tracked by an [`EntityRegistry`] that lives for the whole run. Relationship
//! rows are emitted once per record occurrence; two input records carrying the
//! same relationship produce two rows.

use serde::{Deserialize, Serialize};

use scholargraph_core::SinkError;

use crate::anomaly::{Anomalies, Anomaly};
use crate::record::{CitationRecord, PaperRecord, Record, Venue, VenueType};
use crate::registry::{EntityKey, EntityRegistry, JournalVolumeKey, ProceedingsKey};
use crate::schema::{
    AuthorNode, CitationEdge, HeldIn, JournalVolumeNode, Link, NameNode, PaperNode,
    ProceedingsNode, PublishedIn, Table, VenueNode,
};
use crate::tables::TableSink;

/// What to do when a paper's first author has no id
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MainAuthorPolicy {
    /// Emit no main-author edge for the paper
    #[default]
    Skip,
    /// Promote the first author that has an id
    FirstValid,
}

impl MainAuthorPolicy {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "skip" => Some(Self::Skip),
            "first-valid" => Some(Self::FirstValid),
            _ => None,
        }
    }
}

/// Where proceedings pages may come from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    Journal,
    Proceedings,
}

impl PageSource {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "journal" => Some(Self::Journal),
            "proceedings" => Some(Self::Proceedings),
            _ => None,
        }
    }

    fn pages(self, paper: &PaperRecord) -> Option<&str> {
        match self {
            Self::Journal => paper.journal_pages(),
            Self::Proceedings => paper.proceedings_pages(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub main_author: MainAuthorPolicy,
    /// Sources tried in order for proceedings pages
    pub proceedings_pages: Vec<PageSource>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            main_author: MainAuthorPolicy::Skip,
            proceedings_pages: vec![PageSource::Journal, PageSource::Proceedings],
        }
    }
}

/// Records consumed by a builder, by kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub papers: usize,
    pub citations: usize,
}

/// Everything a builder accumulated, returned by [`GraphBuilder::finish`]
#[derive(Debug)]
pub struct BuildOutput<S> {
    pub tables: S,
    pub registry: EntityRegistry,
    pub anomalies: Anomalies,
    pub records: RecordCounts,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, SinkError> {
    Ok(serde_json::to_string(value)?)
}

pub struct GraphBuilder<S> {
    tables: S,
    registry: EntityRegistry,
    anomalies: Anomalies,
    options: BuildOptions,
    records: RecordCounts,
}

impl<S: TableSink> GraphBuilder<S> {
    pub fn new(tables: S, options: BuildOptions) -> Self {
        Self {
            tables,
            registry: EntityRegistry::new(),
            anomalies: Anomalies::default(),
            options,
            records: RecordCounts::default(),
        }
    }

    pub fn push(&mut self, record: &Record) -> Result<(), SinkError> {
        match record {
            Record::Paper(paper) => self.push_paper(paper),
            Record::Citation(citation) => self.push_citation(citation),
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn anomalies(&self) -> &Anomalies {
        &self.anomalies
    }

    pub fn records(&self) -> RecordCounts {
        self.records
    }

    pub fn tables(&self) -> &S {
        &self.tables
    }

    pub fn finish(self) -> BuildOutput<S> {
        BuildOutput {
            tables: self.tables,
            registry: self.registry,
            anomalies: self.anomalies,
            records: self.records,
        }
    }

    fn note(&mut self, anomaly: Anomaly, detail: std::fmt::Arguments<'_>) {
        self.anomalies.record(anomaly);
        log::log!(anomaly.level(), "{detail}");
    }

    /// Emit a node row only on the first sighting of `key`.
    fn node<R: Serialize>(
        &mut self,
        key: EntityKey,
        table: Table,
        row: &R,
    ) -> Result<bool, SinkError> {
        if !self.registry.mark_seen(key) {
            return Ok(false);
        }
        self.tables.write(table, row)?;
        Ok(true)
    }

    // === Papers ===

    pub fn push_paper(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        self.records.papers += 1;
        self.write_publication(paper)?;
        self.write_fields_of_study(paper)?;
        self.write_authors(paper)?;
        self.write_main_author(paper)?;
        self.write_venue(paper)
    }

    fn write_publication(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        let publication_types = match paper.publication_types() {
            Some(types) => Some(to_json(&types)?),
            None => None,
        };
        let embedding = match paper.embedding.as_ref().and_then(|e| e.vector.as_ref()) {
            Some(vector) => Some(to_json(&vector.0)?),
            None => None,
        };
        let tldr = match &paper.tldr {
            Some(t) => Some(to_json(t)?),
            None => None,
        };

        self.tables.write(
            Table::Papers,
            &PaperNode {
                paper_id: &paper.paper_id,
                url: paper.url.as_deref(),
                title: paper.title.as_deref(),
                abstract_text: paper.abstract_text.as_deref(),
                year: paper.year,
                is_open_access: paper.is_open_access,
                open_access_pdf_url: paper.open_access_pdf_url(),
                publication_types,
                embedding,
                tldr,
            },
        )
    }

    fn write_fields_of_study(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        for field in &paper.fields_of_study {
            self.node(
                EntityKey::FieldOfStudy(field.clone()),
                Table::FieldsOfStudy,
                &NameNode { name: field },
            )?;
            self.tables
                .write(Table::HasFieldOfStudy, &Link::new(&paper.paper_id, field))?;
        }
        Ok(())
    }

    fn write_authors(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        for (position, author) in paper.authors.iter().enumerate() {
            let Some(author_id) = author.id() else {
                self.note(
                    Anomaly::NullAuthorId,
                    format_args!(
                        "paper {}: author #{} ({}) has no authorId, skipped",
                        paper.paper_id,
                        position + 1,
                        author.name.as_deref().unwrap_or("unnamed")
                    ),
                );
                continue;
            };

            self.node(
                EntityKey::Author(author_id.to_owned()),
                Table::Authors,
                &AuthorNode {
                    author_id,
                    url: author.url.as_deref(),
                    name: author.name.as_deref(),
                    homepage: author.homepage.as_deref(),
                    h_index: author.h_index,
                },
            )?;
            self.tables
                .write(Table::Wrote, &Link::new(&paper.paper_id, author_id))?;

            for organization in &author.affiliations {
                self.node(
                    EntityKey::Organization(organization.clone()),
                    Table::Organizations,
                    &NameNode { name: organization },
                )?;
                self.tables
                    .write(Table::IsAffiliatedWith, &Link::new(author_id, organization))?;
            }
        }
        Ok(())
    }

    fn write_main_author(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        let Some(first) = paper.authors.first() else {
            self.note(
                Anomaly::NoAuthors,
                format_args!("paper {}: no authors, no main author", paper.paper_id),
            );
            return Ok(());
        };

        if let Some(author_id) = first.id() {
            return self
                .tables
                .write(Table::MainAuthor, &Link::new(&paper.paper_id, author_id));
        }

        let promoted = match self.options.main_author {
            MainAuthorPolicy::Skip => None,
            MainAuthorPolicy::FirstValid => paper.authors.iter().find_map(|a| a.id()),
        };
        match promoted {
            Some(author_id) => {
                self.note(
                    Anomaly::MainAuthorPromoted,
                    format_args!(
                        "paper {}: first author has no id, promoting {author_id} to main author",
                        paper.paper_id
                    ),
                );
                self.tables
                    .write(Table::MainAuthor, &Link::new(&paper.paper_id, author_id))
            }
            None => {
                self.note(
                    Anomaly::MainAuthorSkipped,
                    format_args!(
                        "paper {}: first author has no id, main author edge skipped",
                        paper.paper_id
                    ),
                );
                Ok(())
            }
        }
    }

    fn write_venue(&mut self, paper: &PaperRecord) -> Result<(), SinkError> {
        let Some(venue) = &paper.publication_venue else {
            self.note(
                Anomaly::MissingVenue,
                format_args!("paper {}: no publication venue", paper.paper_id),
            );
            return Ok(());
        };

        let Some(venue_type) = venue.venue_type() else {
            let declared = venue.declared_type();
            self.anomalies.record_venue_type(declared);
            log::warn!(
                "paper {}: venue type {declared:?} is not modelled, venue skipped",
                paper.paper_id
            );
            return Ok(());
        };

        let Some(venue_id) = venue.id() else {
            self.note(
                Anomaly::VenueWithoutId,
                format_args!("paper {}: {venue_type:?} venue has no id, skipped", paper.paper_id),
            );
            return Ok(());
        };

        match venue_type {
            VenueType::Journal => self.write_journal(paper, venue, venue_id),
            VenueType::Conference | VenueType::Workshop => {
                self.write_proceedings(paper, venue, venue_id, venue_type)
            }
        }
    }

    fn venue_node(
        &mut self,
        key: EntityKey,
        table: Table,
        venue: &Venue,
        venue_id: &str,
    ) -> Result<(), SinkError> {
        let alternate_names = to_json(&venue.alternate_names)?;
        self.node(
            key,
            table,
            &VenueNode {
                venue_id,
                name: venue.name.as_deref(),
                url: venue.url.as_deref(),
                alternate_names,
            },
        )?;
        Ok(())
    }

    fn write_journal(
        &mut self,
        paper: &PaperRecord,
        venue: &Venue,
        venue_id: &str,
    ) -> Result<(), SinkError> {
        if !self.registry.seen(&EntityKey::Journal(venue_id.to_owned())) {
            self.venue_node(
                EntityKey::Journal(venue_id.to_owned()),
                Table::Journals,
                venue,
                venue_id,
            )?;
        }

        let volume = paper.journal_volume();
        if volume.is_none() {
            self.note(
                Anomaly::MissingVolume,
                format_args!("paper {}: journal {venue_id} has no volume", paper.paper_id),
            );
        }
        let key = JournalVolumeKey::new(venue_id, volume);
        let volume_id = key.serialized();
        let first = self.node(
            EntityKey::JournalVolume(key),
            Table::JournalVolumes,
            &JournalVolumeNode {
                journal_volume_id: &volume_id,
                year: paper.year,
                volume,
            },
        )?;
        if first {
            self.tables
                .write(Table::IsEditionOfJournal, &Link::new(&volume_id, venue_id))?;
        }

        let pages = paper.journal_pages();
        if pages.is_none() {
            self.note(
                Anomaly::MissingPages,
                format_args!("paper {}: no journal pages", paper.paper_id),
            );
        }
        self.tables.write(
            Table::IsPublishedInJournal,
            &PublishedIn {
                paper_id: &paper.paper_id,
                edition_id: &volume_id,
                pages,
            },
        )
    }

    fn write_proceedings(
        &mut self,
        paper: &PaperRecord,
        venue: &Venue,
        venue_id: &str,
        venue_type: VenueType,
    ) -> Result<(), SinkError> {
        let (venue_key, venue_table, edition_table) = match venue_type {
            VenueType::Workshop => (
                EntityKey::Workshop(venue_id.to_owned()),
                Table::Workshops,
                Table::IsEditionOfWorkshop,
            ),
            _ => (
                EntityKey::Conference(venue_id.to_owned()),
                Table::Conferences,
                Table::IsEditionOfConference,
            ),
        };
        if !self.registry.seen(&venue_key) {
            self.venue_node(venue_key, venue_table, venue, venue_id)?;
        }

        if paper.year.is_none() {
            self.note(
                Anomaly::MissingYear,
                format_args!(
                    "paper {}: no year, proceedings of {venue_id} keyed with null year",
                    paper.paper_id
                ),
            );
        }
        let key = ProceedingsKey::new(venue_id, paper.year);
        let proceedings_id = key.serialized();
        let first = self.node(
            EntityKey::Proceedings(key),
            Table::Proceedings,
            &ProceedingsNode {
                proceedings_id: &proceedings_id,
                year: paper.year,
            },
        )?;
        if first {
            self.tables
                .write(edition_table, &Link::new(&proceedings_id, venue_id))?;
            self.tables.write(
                Table::IsHeldIn,
                &HeldIn {
                    proceedings_id: &proceedings_id,
                    city: None,
                },
            )?;
        }

        let pages = self
            .options
            .proceedings_pages
            .iter()
            .find_map(|source| source.pages(paper));
        if pages.is_none() {
            self.note(
                Anomaly::MissingPages,
                format_args!("paper {}: no proceedings pages", paper.paper_id),
            );
        }
        self.tables.write(
            Table::IsPublishedInProceedings,
            &PublishedIn {
                paper_id: &paper.paper_id,
                edition_id: &proceedings_id,
                pages,
            },
        )
    }

    // === Citations ===

    pub fn push_citation(&mut self, citation: &CitationRecord) -> Result<(), SinkError> {
        self.records.citations += 1;
        let (Some(citing), Some(cited)) = (citation.citing_id(), citation.cited_id()) else {
            let n = self.records.citations;
            self.note(
                Anomaly::CitationWithoutEndpoint,
                format_args!(
                    "citation #{n}: citing={:?} cited={:?}, skipped",
                    citation.citing_id(),
                    citation.cited_id()
                ),
            );
            return Ok(());
        };

        let contexts_with_intent = match citation.contexts_with_intent() {
            Some(pairs) => Some(to_json(&pairs)?),
            None => None,
        };
        self.tables.write(
            Table::Cites,
            &CitationEdge {
                cited_paper_id: cited,
                citing_paper_id: citing,
                is_influential: citation.is_influential(),
                contexts_with_intent,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntityKind;
    use crate::tables::MemoryTables;

    fn paper(json: &str) -> PaperRecord {
        serde_json::from_str(json).unwrap()
    }

    fn citation(json: &str) -> CitationRecord {
        serde_json::from_str(json).unwrap()
    }

    fn builder() -> GraphBuilder<MemoryTables> {
        GraphBuilder::new(MemoryTables::new(), BuildOptions::default())
    }

    fn build(papers: &[&str]) -> BuildOutput<MemoryTables> {
        let mut b = builder();
        for p in papers {
            b.push_paper(&paper(p)).unwrap();
        }
        b.finish()
    }

    // --- papers & attributes ---

    #[test]
    fn minimal_paper() {
        let out = build(&[r#"{"paperId":"P1"}"#]);
        let rows = out.tables.rows(Table::Papers);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "P1");
        assert!(rows[0][1..].iter().all(String::is_empty));
        assert_eq!(out.anomalies.count(Anomaly::NoAuthors), 1);
        assert_eq!(out.anomalies.count(Anomaly::MissingVenue), 1);
        assert_eq!(out.records.papers, 1);
    }

    #[test]
    fn list_attributes_are_json_encoded() {
        let out = build(&[
            r#"{"paperId":"P1","publicationTypes":["JournalArticle","Review"],"embedding":{"model":"specter_v2","vector":[0.5,-1.0]},"tldr":{"model":"tldr@v2","text":"Short."}}"#,
        ]);
        let tables = &out.tables;
        assert_eq!(
            tables.column(Table::Papers, "publicationTypes"),
            vec![r#"["JournalArticle","Review"]"#]
        );
        assert_eq!(tables.column(Table::Papers, "embedding"), vec!["[0.5,-1.0]"]);
        let tldr: serde_json::Value =
            serde_json::from_str(tables.column(Table::Papers, "tldr")[0]).unwrap();
        assert_eq!(tldr["text"], "Short.");
    }

    #[test]
    fn embedding_without_vector_leaves_column_empty() {
        let out = build(&[r#"{"paperId":"P1","embedding":{"model":"m","vector":null}}"#]);
        assert_eq!(out.tables.column(Table::Papers, "embedding"), vec![""]);
    }

    #[test]
    fn blank_field_and_organization_names_make_no_nodes() {
        let out = build(&[
            r#"{"paperId":"P1","fieldsOfStudy":["","Biology"],"authors":[{"authorId":"A1","affiliations":["  ","MIT"]}]}"#,
        ]);
        assert_eq!(out.tables.column(Table::FieldsOfStudy, "name"), vec!["Biology"]);
        assert_eq!(out.tables.column(Table::Organizations, "name"), vec!["MIT"]);
        assert_eq!(out.tables.count(Table::HasFieldOfStudy), 1);
        assert_eq!(out.tables.count(Table::IsAffiliatedWith), 1);
    }

    #[test]
    fn open_access_and_year() {
        let out = build(&[
            r#"{"paperId":"P1","year":2021,"isOpenAccess":true,"openAccessPdf":{"url":"https://x/pdf"}}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.column(Table::Papers, "year"), vec!["2021"]);
        assert_eq!(t.column(Table::Papers, "isOpenAccess"), vec!["true"]);
        assert_eq!(t.column(Table::Papers, "openAccessPDFUrl"), vec!["https://x/pdf"]);
    }

    // --- fields of study ---

    #[test]
    fn fields_of_study_deduplicated_edges_per_paper() {
        let out = build(&[
            r#"{"paperId":"P1","fieldsOfStudy":["Biology","Chemistry"]}"#,
            r#"{"paperId":"P2","fieldsOfStudy":["Biology"]}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.column(Table::FieldsOfStudy, "name"), vec!["Biology", "Chemistry"]);
        assert_eq!(t.count(Table::HasFieldOfStudy), 3);
        assert_eq!(out.registry.len(EntityKind::FieldOfStudy), 2);
    }

    // --- authors ---

    #[test]
    fn two_papers_sharing_an_author() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":"A1","name":"Ada"}]}"#,
            r#"{"paperId":"P2","authors":[{"authorId":"A1","name":"Ada"}]}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.count(Table::Authors), 1);
        assert_eq!(t.count(Table::Wrote), 2);
        assert_eq!(t.column(Table::MainAuthor, "paperID"), vec!["P1", "P2"]);
        assert_eq!(t.column(Table::MainAuthor, "authorID"), vec!["A1", "A1"]);
    }

    #[test]
    fn author_node_uses_first_sighting_attributes() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":"A1","name":"First","hIndex":3}]}"#,
            r#"{"paperId":"P2","authors":[{"authorId":"A1","name":"Second","hIndex":9}]}"#,
        ]);
        assert_eq!(out.tables.column(Table::Authors, "name"), vec!["First"]);
        assert_eq!(out.tables.column(Table::Authors, "hIndex"), vec!["3"]);
    }

    #[test]
    fn null_author_id_is_skipped() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":"A1"},{"authorId":null,"name":"Ghost"}]}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.count(Table::Authors), 1);
        assert_eq!(t.count(Table::Wrote), 1);
        assert_eq!(out.anomalies.count(Anomaly::NullAuthorId), 1);
    }

    #[test]
    fn affiliations_emit_organizations_once() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":"A1","affiliations":["MIT","CERN"]},{"authorId":"A2","affiliations":["MIT"]}]}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.column(Table::Organizations, "name"), vec!["MIT", "CERN"]);
        assert_eq!(t.count(Table::IsAffiliatedWith), 3);
        assert_eq!(
            t.column(Table::IsAffiliatedWith, "authorID"),
            vec!["A1", "A1", "A2"]
        );
    }

    #[test]
    fn main_author_skip_policy() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":null},{"authorId":"A2"}]}"#,
        ]);
        assert_eq!(out.tables.count(Table::MainAuthor), 0);
        assert_eq!(out.anomalies.count(Anomaly::MainAuthorSkipped), 1);
    }

    #[test]
    fn main_author_first_valid_policy() {
        let options = BuildOptions {
            main_author: MainAuthorPolicy::FirstValid,
            ..BuildOptions::default()
        };
        let mut b = GraphBuilder::new(MemoryTables::new(), options);
        b.push_paper(&paper(
            r#"{"paperId":"P1","authors":[{"authorId":null},{"authorId":"A2"},{"authorId":"A3"}]}"#,
        ))
        .unwrap();
        b.push_paper(&paper(r#"{"paperId":"P2","authors":[{"authorId":null}]}"#))
            .unwrap();
        let out = b.finish();
        assert_eq!(out.tables.column(Table::MainAuthor, "authorID"), vec!["A2"]);
        assert_eq!(out.anomalies.count(Anomaly::MainAuthorPromoted), 1);
        assert_eq!(out.anomalies.count(Anomaly::MainAuthorSkipped), 1);
    }

    #[test]
    fn main_author_is_first_listed() {
        let out = build(&[
            r#"{"paperId":"P1","authors":[{"authorId":"A9"},{"authorId":"A1"}]}"#,
        ]);
        assert_eq!(out.tables.column(Table::MainAuthor, "authorID"), vec!["A9"]);
    }

    // --- journals ---

    #[test]
    fn journal_volume_shared_by_two_papers() {
        let out = build(&[
            r#"{"paperId":"P1","year":2020,"publicationVenue":{"id":"V1","type":"journal","name":"J"},"journal":{"volume":"12","pages":"1-10"}}"#,
            r#"{"paperId":"P2","year":2020,"publicationVenue":{"id":"V1","type":"journal","name":"J"},"journal":{"volume":"12","pages":"11-20"}}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.count(Table::Journals), 1);
        assert_eq!(t.column(Table::JournalVolumes, "journalVolumeID"), vec![r#"["V1","12"]"#]);
        assert_eq!(t.count(Table::IsEditionOfJournal), 1);
        assert_eq!(
            t.column(Table::IsEditionOfJournal, "journalID"),
            vec!["V1"]
        );
        assert_eq!(t.column(Table::IsPublishedInJournal, "pages"), vec!["1-10", "11-20"]);
    }

    #[test]
    fn journal_without_volume_keyed_with_null() {
        let out = build(&[
            r#"{"paperId":"P1","publicationVenue":{"id":"V1","type":"journal"}}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.column(Table::JournalVolumes, "journalVolumeID"), vec![r#"["V1",null]"#]);
        assert_eq!(t.column(Table::IsPublishedInJournal, "pages"), vec![""]);
        assert_eq!(out.anomalies.count(Anomaly::MissingVolume), 1);
        assert_eq!(out.anomalies.count(Anomaly::MissingPages), 1);
    }

    #[test]
    fn journal_alternate_names_json() {
        let out = build(&[
            r#"{"paperId":"P1","publicationVenue":{"id":"V1","type":"journal","alternate_names":["J. Test","JT"]}}"#,
        ]);
        assert_eq!(
            out.tables.column(Table::Journals, "alternateNames"),
            vec![r#"["J. Test","JT"]"#]
        );
    }

    // --- conferences & workshops ---

    #[test]
    fn conference_proceedings_per_year() {
        let out = build(&[
            r#"{"paperId":"P1","year":2024,"publicationVenue":{"id":"C1","type":"conference"},"journal":{"pages":"1-5"}}"#,
            r#"{"paperId":"P2","year":2024,"publicationVenue":{"id":"C1","type":"conference"}}"#,
            r#"{"paperId":"P3","year":2025,"publicationVenue":{"id":"C1","type":"conference"}}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.count(Table::Conferences), 1);
        assert_eq!(
            t.column(Table::Proceedings, "proceedingsID"),
            vec![r#"["C1",2024]"#, r#"["C1",2025]"#]
        );
        assert_eq!(t.count(Table::IsEditionOfConference), 2);
        assert_eq!(t.column(Table::IsHeldIn, "city"), vec!["", ""]);
        assert_eq!(t.count(Table::IsPublishedInProceedings), 3);
        assert_eq!(
            t.column(Table::IsPublishedInProceedings, "pages"),
            vec!["1-5", "", ""]
        );
    }

    #[test]
    fn proceedings_pages_fallback_order() {
        let p = r#"{"paperId":"P1","year":2024,"publicationVenue":{"id":"C1","type":"conference"},"journal":{"pages":"J"},"proceedings":{"pages":"PR"}}"#;

        let out = build(&[p]);
        assert_eq!(out.tables.column(Table::IsPublishedInProceedings, "pages"), vec!["J"]);

        let options = BuildOptions {
            proceedings_pages: vec![PageSource::Proceedings, PageSource::Journal],
            ..BuildOptions::default()
        };
        let mut b = GraphBuilder::new(MemoryTables::new(), options);
        b.push_paper(&paper(p)).unwrap();
        let out = b.finish();
        assert_eq!(out.tables.column(Table::IsPublishedInProceedings, "pages"), vec!["PR"]);
    }

    #[test]
    fn workshop_uses_workshop_tables() {
        let out = build(&[
            r#"{"paperId":"P1","year":2023,"publicationVenue":{"id":"W1","type":"workshop","name":"WS"}}"#,
        ]);
        let t = &out.tables;
        assert_eq!(t.count(Table::Workshops), 1);
        assert_eq!(t.count(Table::Conferences), 0);
        assert_eq!(t.count(Table::IsEditionOfWorkshop), 1);
        assert_eq!(t.count(Table::IsEditionOfConference), 0);
        assert_eq!(t.count(Table::Proceedings), 1);
    }

    #[test]
    fn proceedings_without_year() {
        let out = build(&[
            r#"{"paperId":"P1","publicationVenue":{"id":"C1","type":"conference"}}"#,
        ]);
        assert_eq!(
            out.tables.column(Table::Proceedings, "proceedingsID"),
            vec![r#"["C1",null]"#]
        );
        assert_eq!(out.anomalies.count(Anomaly::MissingYear), 1);
    }

    // --- venue anomalies ---

    #[test]
    fn unknown_venue_type_is_skipped() {
        let out = build(&[
            r#"{"paperId":"P1","publicationVenue":{"id":"R1","type":"repository"}}"#,
            r#"{"paperId":"P2","publicationVenue":{"id":"R2"}}"#,
        ]);
        let t = &out.tables;
        for table in [
            Table::Journals,
            Table::Conferences,
            Table::Workshops,
            Table::IsPublishedInJournal,
            Table::IsPublishedInProceedings,
        ] {
            assert_eq!(t.count(table), 0, "{table}");
        }
        assert_eq!(t.count(Table::Papers), 2);
        assert_eq!(out.anomalies.count(Anomaly::UnknownVenueType), 2);
        assert_eq!(out.anomalies.venue_types()["repository"], 1);
        assert_eq!(out.anomalies.venue_types()["<none>"], 1);
    }

    #[test]
    fn venue_without_id_is_skipped() {
        let out = build(&[r#"{"paperId":"P1","publicationVenue":{"type":"journal"}}"#]);
        assert_eq!(out.tables.count(Table::Journals), 0);
        assert_eq!(out.tables.count(Table::JournalVolumes), 0);
        assert_eq!(out.anomalies.count(Anomaly::VenueWithoutId), 1);
    }

    // --- citations ---

    #[test]
    fn citation_edge_direction() {
        let mut b = builder();
        b.push_citation(&citation(
            r#"{"citingPaper":{"paperId":"A"},"citedPaper":{"paperId":"B"},"isInfluential":true,"contextsWithIntent":[{"context":"see","intents":["background"]}]}"#,
        ))
        .unwrap();
        let out = b.finish();
        let row = &out.tables.rows(Table::Cites)[0];
        assert_eq!(row[0], "B");
        assert_eq!(row[1], "A");
        assert_eq!(row[2], "true");
        let ctx: serde_json::Value = serde_json::from_str(&row[3]).unwrap();
        assert_eq!(ctx[0]["intents"][0], "background");
        assert_eq!(out.records.citations, 1);
    }

    #[test]
    fn duplicate_citations_are_both_written() {
        let mut b = builder();
        let c = citation(r#"{"citingPaperID":"A","citedPaperID":"B"}"#);
        b.push_citation(&c).unwrap();
        b.push_citation(&c).unwrap();
        let out = b.finish();
        assert_eq!(out.tables.count(Table::Cites), 2);
        assert_eq!(out.tables.column(Table::Cites, "isInfluential"), vec!["false", "false"]);
    }

    #[test]
    fn citation_without_endpoint_is_skipped() {
        let mut b = builder();
        b.push_citation(&citation(r#"{"citedPaper":{"paperId":"B"}}"#))
            .unwrap();
        let out = b.finish();
        assert_eq!(out.tables.count(Table::Cites), 0);
        assert_eq!(out.anomalies.count(Anomaly::CitationWithoutEndpoint), 1);
    }

    #[test]
    fn push_dispatches_on_record_kind() {
        let mut b = builder();
        b.push(&Record::from(paper(r#"{"paperId":"P1"}"#))).unwrap();
        b.push(&Record::from(citation(r#"{"citingPaperID":"A","citedPaperID":"B"}"#)))
            .unwrap();
        assert_eq!(b.records(), RecordCounts { papers: 1, citations: 1 });
        assert_eq!(b.tables().count(Table::Papers), 1);
        assert_eq!(b.tables().count(Table::Cites), 1);
    }

    // --- policies ---

    #[test]
    fn policy_names() {
        assert_eq!(MainAuthorPolicy::from_name("skip"), Some(MainAuthorPolicy::Skip));
        assert_eq!(
            MainAuthorPolicy::from_name("first-valid"),
            Some(MainAuthorPolicy::FirstValid)
        );
        assert_eq!(MainAuthorPolicy::from_name("first"), None);
        assert_eq!(PageSource::from_name("journal"), Some(PageSource::Journal));
        assert_eq!(PageSource::from_name("book"), None);
    }
}
