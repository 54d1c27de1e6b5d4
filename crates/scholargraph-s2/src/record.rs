//! Typed input records — Graph API paper and citation payloads

use serde::{Deserialize, Deserializer, Serialize};

// === Null-handling deserializers ===

/// Deserialize null as empty Vec (for optional list fields)
fn null_to_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Deserialize a list of names, dropping null and blank entries and treating null as empty
fn strings_skip_null<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect())
}

/// Treat blank identifiers like missing ones
fn non_blank(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.trim().is_empty())
}

// === Paper records ===

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    pub paper_id: String, // required
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub is_open_access: Option<bool>,
    #[serde(default)]
    pub open_access_pdf: Option<OpenAccessPdf>,
    #[serde(default)]
    pub open_access_pdf_url: Option<String>,
    #[serde(default)]
    pub publication_types: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub embedding: Option<Embedding>,
    #[serde(default)]
    pub tldr: Option<Tldr>,
    #[serde(default, deserialize_with = "strings_skip_null")]
    pub fields_of_study: Vec<String>,
    #[serde(default, deserialize_with = "null_to_empty_vec")]
    pub authors: Vec<AuthorEntry>,
    #[serde(default)]
    pub publication_venue: Option<Venue>,
    #[serde(default)]
    pub journal: Option<JournalInfo>,
    #[serde(default)]
    pub proceedings: Option<ProceedingsInfo>,
}

impl PaperRecord {
    /// Open-access PDF link: nested `openAccessPdf.url`, else flat `openAccessPdfUrl`
    pub fn open_access_pdf_url(&self) -> Option<&str> {
        self.open_access_pdf
            .as_ref()
            .and_then(|pdf| pdf.url.as_deref())
            .or(self.open_access_pdf_url.as_deref())
    }

    /// Publication types with null entries dropped, `None` when absent
    pub fn publication_types(&self) -> Option<Vec<&str>> {
        self.publication_types
            .as_ref()
            .map(|types| types.iter().flatten().map(String::as_str).collect())
    }

    pub fn journal_volume(&self) -> Option<&str> {
        self.journal.as_ref().and_then(|j| j.volume.as_deref())
    }

    pub fn journal_pages(&self) -> Option<&str> {
        self.journal.as_ref().and_then(|j| j.pages.as_deref())
    }

    pub fn proceedings_pages(&self) -> Option<&str> {
        self.proceedings.as_ref().and_then(|p| p.pages.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAccessPdf {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorEntry {
    #[serde(default)]
    pub author_id: Option<String>, // required per API, but null is common
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub h_index: Option<i64>,
    #[serde(default, deserialize_with = "strings_skip_null")]
    pub affiliations: Vec<String>,
}

impl AuthorEntry {
    /// Author id, `None` when null, missing or blank
    pub fn id(&self) -> Option<&str> {
        non_blank(self.author_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(
        default,
        alias = "alternateNames",
        deserialize_with = "strings_skip_null"
    )]
    pub alternate_names: Vec<String>,
}

impl Venue {
    pub fn id(&self) -> Option<&str> {
        non_blank(self.id.as_deref())
    }

    /// Declared venue type as given (`"<none>"` when absent)
    pub fn declared_type(&self) -> &str {
        self.kind.as_deref().unwrap_or("<none>")
    }

    pub fn venue_type(&self) -> Option<VenueType> {
        self.kind.as_deref().and_then(VenueType::parse)
    }
}

/// Venue types the graph schema knows how to model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VenueType {
    Journal,
    Conference,
    Workshop,
}

impl VenueType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "journal" => Some(Self::Journal),
            "conference" => Some(Self::Conference),
            "workshop" => Some(Self::Workshop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProceedingsInfo {
    #[serde(default)]
    pub pages: Option<String>,
}

/// Embedding vector supporting both JSON string and array formats.
///
/// The bulk dataset serializes vectors as JSON strings (`"[0.15, -0.11, ...]"`)
/// while the Graph API returns native arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingVector(pub Vec<f32>);

impl<'de> Deserialize<'de> for EmbeddingVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VecVisitor;

        impl<'de> serde::de::Visitor<'de> for VecVisitor {
            type Value = EmbeddingVector;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a JSON string or array of floats")
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Self::Value, E> {
                serde_json::from_str::<Vec<f32>>(s)
                    .map(EmbeddingVector)
                    .map_err(serde::de::Error::custom)
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut v = Vec::with_capacity(seq.size_hint().unwrap_or(768));
                while let Some(val) = seq.next_element::<f32>()? {
                    v.push(val);
                }
                Ok(EmbeddingVector(v))
            }
        }

        deserializer.deserialize_any(VecVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embedding {
    #[serde(default)]
    pub model: Option<String>,
    /// `None` when the vector is null or absent
    #[serde(default)]
    pub vector: Option<EmbeddingVector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tldr {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

// === Citation records ===

#[derive(Debug, Clone, Deserialize)]
pub struct PaperRef {
    #[serde(rename = "paperId", default)]
    pub paper_id: Option<String>,
}

/// One citation context and the intents attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextWithIntent {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "strings_skip_null")]
    pub intents: Vec<String>,
}

/// Intents are per-context lists in the bulk dataset and a flat list in the Graph API
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Intents {
    PerContext(Vec<Option<Vec<String>>>),
    Flat(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitationRecord {
    #[serde(rename = "citingPaperID", alias = "citingPaperId", default)]
    pub citing_paper_id: Option<String>,
    #[serde(rename = "citedPaperID", alias = "citedPaperId", default)]
    pub cited_paper_id: Option<String>,
    #[serde(rename = "citingPaper", default)]
    pub citing_paper: Option<PaperRef>,
    #[serde(rename = "citedPaper", default)]
    pub cited_paper: Option<PaperRef>,
    #[serde(rename = "isInfluential", default)]
    pub is_influential: Option<bool>,
    #[serde(rename = "contextsWithIntent", default)]
    pub contexts_with_intent: Option<Vec<ContextWithIntent>>,
    #[serde(default)]
    pub contexts: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub intents: Option<Intents>,
}

impl CitationRecord {
    /// Citing paper: flat id first, then the nested `citingPaper.paperId`
    pub fn citing_id(&self) -> Option<&str> {
        non_blank(self.citing_paper_id.as_deref()).or_else(|| {
            non_blank(
                self.citing_paper
                    .as_ref()
                    .and_then(|p| p.paper_id.as_deref()),
            )
        })
    }

    /// Cited paper: flat id first, then the nested `citedPaper.paperId`
    pub fn cited_id(&self) -> Option<&str> {
        non_blank(self.cited_paper_id.as_deref()).or_else(|| {
            non_blank(self.cited_paper.as_ref().and_then(|p| p.paper_id.as_deref()))
        })
    }

    pub fn is_influential(&self) -> bool {
        self.is_influential.unwrap_or(false)
    }

    /// Contexts paired with their intents.
    ///
    /// `contextsWithIntent` wins when present; otherwise `contexts` and
    /// `intents` are zipped into the same shape. `None` when the record
    /// carries neither.
    pub fn contexts_with_intent(&self) -> Option<Vec<ContextWithIntent>> {
        if let Some(pairs) = &self.contexts_with_intent {
            return Some(pairs.clone());
        }
        if self.contexts.is_none() && self.intents.is_none() {
            return None;
        }

        let contexts = self.contexts.as_deref().unwrap_or_default();
        let pairs = match &self.intents {
            Some(Intents::PerContext(per)) => {
                let n = contexts.len().max(per.len());
                (0..n)
                    .map(|i| ContextWithIntent {
                        context: contexts.get(i).cloned().flatten(),
                        intents: per.get(i).cloned().flatten().unwrap_or_default(),
                    })
                    .collect()
            }
            Some(Intents::Flat(flat)) if contexts.is_empty() => vec![ContextWithIntent {
                context: None,
                intents: flat.clone(),
            }],
            Some(Intents::Flat(flat)) => contexts
                .iter()
                .map(|c| ContextWithIntent {
                    context: c.clone(),
                    intents: flat.clone(),
                })
                .collect(),
            None => contexts
                .iter()
                .map(|c| ContextWithIntent {
                    context: c.clone(),
                    intents: Vec::new(),
                })
                .collect(),
        };
        Some(pairs)
    }
}

/// One decoded input record, tagged by kind
#[derive(Debug, Clone)]
pub enum Record {
    Paper(PaperRecord),
    Citation(CitationRecord),
}

impl From<PaperRecord> for Record {
    fn from(paper: PaperRecord) -> Self {
        Self::Paper(paper)
    }
}

impl From<CitationRecord> for Record {
    fn from(citation: CitationRecord) -> Self {
        Self::Citation(citation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(json: &str) -> PaperRecord {
        serde_json::from_str(json).unwrap()
    }

    fn citation(json: &str) -> CitationRecord {
        serde_json::from_str(json).unwrap()
    }

    // --- paper fields ---

    #[test]
    fn paper_id_is_required() {
        let result: Result<PaperRecord, _> = serde_json::from_str(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn minimal_paper_has_empty_collections() {
        let p = paper(r#"{"paperId":"P1"}"#);
        assert!(p.authors.is_empty());
        assert!(p.fields_of_study.is_empty());
        assert!(p.publication_venue.is_none());
        assert_eq!(p.year, None);
    }

    #[test]
    fn null_lists_become_empty() {
        let p = paper(r#"{"paperId":"P1","authors":null,"fieldsOfStudy":null}"#);
        assert!(p.authors.is_empty());
        assert!(p.fields_of_study.is_empty());
    }

    #[test]
    fn null_entries_in_fields_of_study_are_dropped() {
        let p = paper(r#"{"paperId":"P1","fieldsOfStudy":["Biology",null,"Physics"]}"#);
        assert_eq!(p.fields_of_study, vec!["Biology", "Physics"]);
    }

    #[test]
    fn blank_names_are_dropped() {
        let p = paper(
            r#"{"paperId":"P1","fieldsOfStudy":["", "Biology", "  "],"authors":[{"authorId":"1","affiliations":[" ","MIT",""]}]}"#,
        );
        assert_eq!(p.fields_of_study, vec!["Biology"]);
        assert_eq!(p.authors[0].affiliations, vec!["MIT"]);
    }

    #[test]
    fn abstract_keyword_field() {
        let p = paper(r#"{"paperId":"P1","abstract":"We study."}"#);
        assert_eq!(p.abstract_text.as_deref(), Some("We study."));
    }

    #[test]
    fn open_access_pdf_nested_wins() {
        let p = paper(
            r#"{"paperId":"P1","openAccessPdf":{"url":"https://a/pdf","status":"GOLD"},"openAccessPdfUrl":"https://b/pdf"}"#,
        );
        assert_eq!(p.open_access_pdf_url(), Some("https://a/pdf"));
    }

    #[test]
    fn open_access_pdf_flat_fallback() {
        let p = paper(r#"{"paperId":"P1","openAccessPdfUrl":"https://b/pdf"}"#);
        assert_eq!(p.open_access_pdf_url(), Some("https://b/pdf"));
    }

    #[test]
    fn publication_types_drop_nulls() {
        let p = paper(r#"{"paperId":"P1","publicationTypes":["JournalArticle",null]}"#);
        assert_eq!(p.publication_types(), Some(vec!["JournalArticle"]));
        let none = paper(r#"{"paperId":"P1","publicationTypes":null}"#);
        assert_eq!(none.publication_types(), None);
    }

    // --- authors ---

    #[test]
    fn author_id_null_missing_blank() {
        let p = paper(
            r#"{"paperId":"P1","authors":[{"authorId":null,"name":"A"},{"name":"B"},{"authorId":" ","name":"C"},{"authorId":"42","name":"D"}]}"#,
        );
        let ids: Vec<_> = p.authors.iter().map(AuthorEntry::id).collect();
        assert_eq!(ids, vec![None, None, None, Some("42")]);
    }

    #[test]
    fn author_details() {
        let p = paper(
            r#"{"paperId":"P1","authors":[{"authorId":"1","url":"u","name":"N","homepage":null,"hIndex":12,"affiliations":["MIT",null]}]}"#,
        );
        let a = &p.authors[0];
        assert_eq!(a.h_index, Some(12));
        assert_eq!(a.homepage, None);
        assert_eq!(a.affiliations, vec!["MIT"]);
    }

    // --- venues ---

    #[test]
    fn venue_type_parsing() {
        let p = paper(
            r#"{"paperId":"P1","publicationVenue":{"id":"V1","name":"Conf","type":"conference","alternate_names":["C"]}}"#,
        );
        let venue = p.publication_venue.unwrap();
        assert_eq!(venue.venue_type(), Some(VenueType::Conference));
        assert_eq!(venue.alternate_names, vec!["C"]);
    }

    #[test]
    fn venue_unknown_and_missing_type() {
        let v: Venue = serde_json::from_str(r#"{"id":"V1","type":"repository"}"#).unwrap();
        assert_eq!(v.venue_type(), None);
        assert_eq!(v.declared_type(), "repository");
        let v: Venue = serde_json::from_str(r#"{"id":"V1"}"#).unwrap();
        assert_eq!(v.declared_type(), "<none>");
    }

    #[test]
    fn venue_type_is_case_sensitive() {
        assert_eq!(VenueType::parse("Journal"), None);
        assert_eq!(VenueType::parse("journal"), Some(VenueType::Journal));
    }

    #[test]
    fn journal_and_proceedings_pages() {
        let p = paper(
            r#"{"paperId":"P1","journal":{"name":"J","volume":"12","pages":"1-10"},"proceedings":{"pages":"5-9"}}"#,
        );
        assert_eq!(p.journal_volume(), Some("12"));
        assert_eq!(p.journal_pages(), Some("1-10"));
        assert_eq!(p.proceedings_pages(), Some("5-9"));
    }

    // --- embedding ---

    #[test]
    fn embedding_from_array() {
        let p = paper(r#"{"paperId":"P1","embedding":{"model":"specter_v2","vector":[0.1,-0.2]}}"#);
        assert_eq!(p.embedding.unwrap().vector.unwrap().0, vec![0.1, -0.2]);
    }

    #[test]
    fn embedding_from_json_string() {
        let p = paper(r#"{"paperId":"P1","embedding":{"vector":"[0.5, 0.25]"}}"#);
        assert_eq!(p.embedding.unwrap().vector.unwrap().0, vec![0.5, 0.25]);
    }

    #[test]
    fn embedding_without_vector() {
        let p = paper(r#"{"paperId":"P1","embedding":{"model":"m","vector":null}}"#);
        assert!(p.embedding.unwrap().vector.is_none());
        let p = paper(r#"{"paperId":"P1","embedding":{"model":"m"}}"#);
        assert!(p.embedding.unwrap().vector.is_none());
    }

    #[test]
    fn embedding_invalid_string_fails() {
        let result: Result<PaperRecord, _> =
            serde_json::from_str(r#"{"paperId":"P1","embedding":{"vector":"nope"}}"#);
        assert!(result.is_err());
    }

    // --- citations ---

    #[test]
    fn citation_nested_ids() {
        let c = citation(r#"{"citingPaper":{"paperId":"A"},"citedPaper":{"paperId":"B"}}"#);
        assert_eq!(c.citing_id(), Some("A"));
        assert_eq!(c.cited_id(), Some("B"));
        assert!(!c.is_influential());
        assert_eq!(c.contexts_with_intent(), None);
    }

    #[test]
    fn citation_flat_ids_win() {
        let c = citation(
            r#"{"citingPaperID":"A1","citedPaperID":"B1","citingPaper":{"paperId":"A2"},"citedPaper":{"paperId":"B2"},"isInfluential":true}"#,
        );
        assert_eq!(c.citing_id(), Some("A1"));
        assert_eq!(c.cited_id(), Some("B1"));
        assert!(c.is_influential());
    }

    #[test]
    fn citation_missing_endpoint() {
        let c = citation(r#"{"citingPaper":{"paperId":null},"citedPaper":{"paperId":"B"}}"#);
        assert_eq!(c.citing_id(), None);
    }

    #[test]
    fn contexts_with_intent_passthrough() {
        let c = citation(
            r#"{"citingPaper":{"paperId":"A"},"citedPaper":{"paperId":"B"},"contextsWithIntent":[{"context":"as shown in","intents":["background"]}]}"#,
        );
        let pairs = c.contexts_with_intent().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].context.as_deref(), Some("as shown in"));
        assert_eq!(pairs[0].intents, vec!["background"]);
    }

    #[test]
    fn contexts_zipped_with_per_context_intents() {
        let c = citation(
            r#"{"citingPaper":{"paperId":"A"},"citedPaper":{"paperId":"B"},"contexts":["c1","c2"],"intents":[["methodology"],null]}"#,
        );
        let pairs = c.contexts_with_intent().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].intents, vec!["methodology"]);
        assert!(pairs[1].intents.is_empty());
        assert_eq!(pairs[1].context.as_deref(), Some("c2"));
    }

    #[test]
    fn contexts_with_flat_intents() {
        let c = citation(
            r#"{"citingPaper":{"paperId":"A"},"citedPaper":{"paperId":"B"},"contexts":["c1"],"intents":["result"]}"#,
        );
        let pairs = c.contexts_with_intent().unwrap();
        assert_eq!(pairs[0].intents, vec!["result"]);
    }
}
