use crate::solr::{FieldValue, SolrDocument};

/// Author names parsed from contributor entries, plus their display form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorList {
    pub names: Vec<String>,
    pub display: String,
}

impl AuthorList {
    /// Parses every raw entry. Entries may bundle several names with `||`;
    /// each name may carry an authority suffix after `::` or `###`.
    pub fn parse<'a>(raw: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<String> = raw
            .into_iter()
            .flat_map(|entry| entry.split("||"))
            .filter_map(extract_name)
            .collect();
        let display = display_names(&names);
        Self { names, display }
    }

    /// Authors of a document followed by its advisors.
    pub fn from_document(doc: &SolrDocument) -> Self {
        let authors = doc.first_present(&["dc.contributor.author", "dc.contributor"]);
        let advisors = doc.field("dc.contributor.advisor");
        Self::parse(authors.values().into_iter().chain(advisors.values()))
    }

    pub fn from_field(value: &FieldValue) -> Self {
        Self::parse(value.values())
    }
}

fn extract_name(part: &str) -> Option<String> {
    let name = part.trim();
    let name = name.split("::").next().unwrap_or(name).trim();
    let name = name.split("###").next().unwrap_or(name).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `A`, `A and B`, `A; B and C`.
pub fn display_names(names: &[String]) -> String {
    match names.split_last() {
        None => String::new(),
        Some((only, [])) => only.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join("; "), last),
    }
}

/// Display name from an `author_facet` value: the part after the
/// `"\n|||\n"` separator when present, otherwise the raw value.
pub fn facet_display_name(raw: &str) -> &str {
    raw.split("\n|||\n").nth(1).unwrap_or(raw)
}
