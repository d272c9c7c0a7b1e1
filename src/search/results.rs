//! Raw documents → display records.

use crate::departments::DepartmentMap;
use crate::search::authors::AuthorList;
use crate::search::highlight::{escape_html, sanitize_fragment, Highlighter};
use crate::search::sort::Ranked;
use crate::solr::{SolrDocument, SolrResponse};
use serde::Serialize;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_YEAR: &str = "N/A";
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Leading four digits of the first present date field, or `N/A`.
pub fn extract_year(doc: &SolrDocument) -> String {
    let raw = doc.first_present(&["dateIssued.year", "dc.date.issued", "dc.date.accessioned"]);
    let mut seen: Vec<&str> = Vec::new();
    for value in raw.values() {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    let joined = seen.concat();
    let digits: String = joined.chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits
    } else {
        UNKNOWN_YEAR.to_string()
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn sentence_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title_text(doc: &SolrDocument) -> String {
    let title = doc.field("dc.title").joined(" ");
    if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// `start-end`, whichever of the two exists, else the page range field.
fn page_span(doc: &SolrDocument) -> String {
    let start = doc.field("oaire.citation.startPage").joined("");
    let end = doc.field("oaire.citation.endPage").joined("");
    let pages = match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start}-{end}"),
        (false, true) => start,
        (true, false) => end,
        (true, true) => String::new(),
    };
    if pages.is_empty() {
        doc.field("dc.identifier.pageRange").joined("")
    } else {
        pages
    }
}

fn engine_highlight<'r>(response: &'r SolrResponse, doc_id: &str, fields: &[&str]) -> Option<&'r str> {
    fields.iter().find_map(|field| response.highlight(doc_id, field))
}

/// Card shown on the HTML page. Fields named `*_plain` or `*_list` are raw
/// text; the others are HTML-safe markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub id: String,
    pub link: String,
    pub title: String,
    pub title_plain: String,
    pub highlighted_title: String,
    pub authors: String,
    pub authors_plain: String,
    pub author_list: Vec<String>,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_list: Vec<String>,
    pub journal: String,
    pub journal_plain: String,
    pub doi: String,
    pub volume: String,
    pub issue: String,
    pub pages: String,
    pub department: String,
    pub dept_list: Vec<String>,
    pub language: String,
    pub lang_list: Vec<String>,
    pub country: String,
    pub country_list: Vec<String>,
    pub openaccess_list: Vec<String>,
}

impl Publication {
    pub fn from_document(
        doc: &SolrDocument,
        response: &SolrResponse,
        departments: &DepartmentMap,
        highlighter: &Highlighter,
        item_url: &str,
    ) -> Self {
        let id = doc.resource_id();
        let link = if id.is_empty() {
            "#".to_string()
        } else {
            format!("{item_url}{id}")
        };

        let title_plain = sentence_case(&title_text(doc));
        let highlighted_title = match engine_highlight(response, &id, &["dc.title", "title"]) {
            Some(fragment) => sanitize_fragment(fragment),
            None if highlighter.is_active() => highlighter.apply(&title_plain),
            None => String::new(),
        };
        let title = if highlighted_title.is_empty() {
            escape_html(&title_plain)
        } else {
            highlighted_title.clone()
        };

        let authors = AuthorList::from_document(doc);
        let journal_plain = doc.field("dc.source").joined(" ");

        let mut type_list = doc.field("dc.type").multi_values();
        if type_list.is_empty() {
            type_list.push(UNKNOWN_TYPE.to_string());
        }

        let dept_list = departments.resolve_all(&doc.field("location.coll"));
        let language = doc.field("dc.language.iso");
        let country = doc.field("dc.coverage.spatial");

        Self {
            link,
            title,
            title_plain,
            highlighted_title,
            authors: highlighter.apply(&authors.display),
            authors_plain: authors.display,
            author_list: authors.names,
            year: extract_year(doc),
            kind: type_list.join(" || "),
            type_list,
            journal: highlighter.apply(&journal_plain),
            journal_plain,
            doi: doc.field("dc.identifier.doi").joined(""),
            volume: doc.field("oaire.citation.volume").joined(""),
            issue: doc.field("oaire.citation.issue").joined(""),
            pages: page_span(doc),
            department: dept_list.join("; "),
            dept_list,
            language: language.joined(", "),
            lang_list: language.multi_values(),
            country: country.joined(", "),
            country_list: country.multi_values(),
            openaccess_list: doc.field("oaire.venue.unpaywall").multi_values(),
            id,
        }
    }
}

impl Ranked for Publication {
    fn year(&self) -> &str {
        &self.year
    }

    fn kind(&self) -> &str {
        &self.kind
    }
}

/// Record returned by the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiPublication {
    pub id: String,
    pub title: String,
    pub title_plain: String,
    pub highlighted_title: String,
    pub highlighted_author: String,
    pub authors: Vec<String>,
    pub author_display: String,
    pub year: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub types: Vec<String>,
    pub departments: Vec<String>,
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    pub sources: Vec<String>,
    pub handle: String,
    pub doi: String,
}

impl ApiPublication {
    pub fn from_document(doc: &SolrDocument, response: &SolrResponse, departments: &DepartmentMap) -> Self {
        let id = doc.resource_id();
        let title_plain = doc.field("dc.title").first().unwrap_or_default().to_string();
        let highlighted_title = engine_highlight(response, &id, &["dc.title"])
            .map(sanitize_fragment)
            .unwrap_or_default();
        let title = if highlighted_title.is_empty() {
            escape_html(&title_plain)
        } else {
            highlighted_title.clone()
        };
        let highlighted_author = engine_highlight(response, &id, &["author_ac", "dc.contributor.author"])
            .map(sanitize_fragment)
            .unwrap_or_default();

        let authors = AuthorList::from_document(doc);
        let types = doc.field("dc.type").multi_values();

        Self {
            title,
            title_plain,
            highlighted_title,
            highlighted_author,
            authors: authors.names,
            author_display: authors.display,
            year: doc.field("dateIssued.year").first().unwrap_or_default().to_string(),
            kind: types.first().cloned().unwrap_or_default(),
            types,
            departments: departments.resolve_all(&doc.field("location.coll")),
            languages: doc.field("dc.language.iso").multi_values(),
            countries: doc.field("dc.coverage.spatial").multi_values(),
            sources: doc.field("dc.source").multi_values(),
            handle: doc.field("dc.identifier.uri").first().unwrap_or_default().to_string(),
            doi: doc.field("dc.identifier.doi").first().unwrap_or_default().to_string(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> SolrDocument {
        serde_json::from_value(value).unwrap()
    }

    fn response(value: serde_json::Value) -> SolrResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn year_falls_back_through_date_fields() {
        assert_eq!(extract_year(&doc(json!({"dateIssued.year": [2021]}))), "2021");
        assert_eq!(extract_year(&doc(json!({"dc.date.issued": "2019-05-01"}))), "2019");
        assert_eq!(extract_year(&doc(json!({"dc.date.accessioned": ["2018-01-01T00:00:00Z"]}))), "2018");
        assert_eq!(extract_year(&doc(json!({"dc.date.issued": "May 2019"}))), "N/A");
        assert_eq!(extract_year(&doc(json!({}))), "N/A");
    }

    #[test]
    fn sentence_case_lowers_the_tail() {
        assert_eq!(sentence_case("DEEP Learning for NLP"), "Deep learning for nlp");
        assert_eq!(sentence_case(""), "");
    }

    #[test]
    fn card_fields_from_full_document() {
        let d = doc(json!({
            "search.resourceid": "abc",
            "dc.title": ["A Study of <Things>"],
            "dc.contributor.author": ["Doe, J::x", "Roe, R"],
            "dateIssued.year": [2020],
            "dc.type": ["Journal Article"],
            "dc.source": ["Nature"],
            "dc.identifier.doi": ["10.1/x"],
            "oaire.citation.volume": ["12"],
            "oaire.citation.startPage": ["5"],
            "oaire.citation.endPage": ["9"],
            "location.coll": ["coll-1"],
            "dc.language.iso": ["en", "fr"],
            "oaire.venue.unpaywall": ["gold"]
        }));
        let map = DepartmentMap::from_entries([("coll-1", "Physics")]);
        let card = Publication::from_document(&d, &SolrResponse::default(), &map, &Highlighter::new(""), "https://repo/items/");

        assert_eq!(card.id, "abc");
        assert_eq!(card.link, "https://repo/items/abc");
        assert_eq!(card.title_plain, "A study of <things>");
        assert_eq!(card.title, "A study of &lt;things&gt;");
        assert_eq!(card.highlighted_title, "");
        assert_eq!(card.authors_plain, "Doe, J and Roe, R");
        assert_eq!(card.year, "2020");
        assert_eq!(card.kind, "Journal Article");
        assert_eq!(card.pages, "5-9");
        assert_eq!(card.department, "Physics");
        assert_eq!(card.language, "en, fr");
        assert_eq!(card.lang_list, vec!["en", "fr"]);
        assert_eq!(card.openaccess_list, vec!["gold"]);
    }

    #[test]
    fn sparse_document_gets_placeholders() {
        let d = doc(json!({"dc.identifier.pageRange": "1-10"}));
        let card = Publication::from_document(&d, &SolrResponse::default(), &DepartmentMap::new(), &Highlighter::new("x"), "u/");
        assert_eq!(card.title_plain, UNTITLED);
        assert_eq!(card.link, "#");
        assert_eq!(card.year, "N/A");
        assert_eq!(card.type_list, vec!["Unknown"]);
        assert_eq!(card.pages, "1-10");
        assert_eq!(card.authors, "");
    }

    #[test]
    fn engine_highlight_wins_over_local() {
        let d = doc(json!({"search.resourceid": "abc", "dc.title": ["Graphene sheets"]}));
        let r = response(json!({
            "highlighting": {"abc": {"dc.title": ["<mark>Graphene</mark> sheets"]}}
        }));
        let card = Publication::from_document(&d, &r, &DepartmentMap::new(), &Highlighter::new("sheets"), "");
        assert_eq!(card.highlighted_title, "<mark>Graphene</mark> sheets");
        assert_eq!(card.title, card.highlighted_title);

        let local = Publication::from_document(&d, &SolrResponse::default(), &DepartmentMap::new(), &Highlighter::new("sheets"), "");
        assert_eq!(local.highlighted_title, "Graphene <mark>sheets</mark>");
    }

    #[test]
    fn api_record_uses_first_values() {
        let d = doc(json!({
            "search.resourceid": "abc",
            "dc.title": ["First", "Second"],
            "dc.type": "Article||Review",
            "dc.identifier.uri": ["http://hdl/1", "http://hdl/2"],
            "dateIssued.year": [2022]
        }));
        let r = response(json!({"highlighting": {"abc": {"author_ac": ["<mark>Doe</mark>"]}}}));
        let api = ApiPublication::from_document(&d, &r, &DepartmentMap::new());
        assert_eq!(api.title_plain, "First");
        assert_eq!(api.kind, "Article");
        assert_eq!(api.types, vec!["Article", "Review"]);
        assert_eq!(api.handle, "http://hdl/1");
        assert_eq!(api.year, "2022");
        assert_eq!(api.highlighted_author, "<mark>Doe</mark>");
    }
}
