/// How a column's raw field becomes one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Values joined with `"; "`.
    List,
    /// Values joined with a space.
    Text,
    /// Values concatenated.
    Single,
    /// Parsed names in display form.
    Contributors,
    /// Collection codes resolved to department names.
    Departments,
}

impl ColumnRule {
    pub fn separator(self) -> &'static str {
        match self {
            ColumnRule::List | ColumnRule::Contributors | ColumnRule::Departments => "; ",
            ColumnRule::Text => " ",
            ColumnRule::Single => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub label: &'static str,
    pub rule: ColumnRule,
}

const fn col(field: &'static str, label: &'static str, rule: ColumnRule) -> Column {
    Column { field, label, rule }
}

use ColumnRule::{Contributors, Departments, List, Single, Text};

pub const COLUMNS: &[Column] = &[
    col("id", "ID", List),
    col("search.resourceid", "Resource ID", List),
    col("handle", "Handle", List),
    col("dc.bid", "Bid", List),
    col("dc.title", "Title", List),
    col("dc.contributor.author", "Authors", Contributors),
    col("dc.contributor.advisor", "Advisor", Contributors),
    col("dc.contributor.affiliation", "Author Affiliation", Contributors),
    col("dc.contributor.department", "Author Department", Contributors),
    col("dc.contributor.editor", "Editor", Contributors),
    col("dc.contributor.other", "Other Contributors", Contributors),
    col("dc.date.accessioned", "Date Added", List),
    col("dc.date.available", "Date Available", List),
    col("dc.date.issued", "Date Issued", List),
    col("dcterms.dateAccepted", "Date Accepted", List),
    col("dc.description.abstract", "Abstract", Text),
    col("dc.description.provenance", "Provenance", List),
    col("dc.format.extent", "Format/Extent", List),
    col("dc.identifier.doi", "DOI", Single),
    col("dc.identifier.issn", "ISSN", Single),
    col("dc.identifier.isbn", "ISBN", Single),
    col("dc.identifier.uri", "URL", List),
    col("dc.identifier.patentno", "Patent Number", List),
    col("dc.identifier.pmid", "PMID", List),
    col("dc.identifier.scopus", "Scopus ID", List),
    col("dc.identifier.wos", "Web of Science ID", List),
    col("dc.identifier.isi", "ISI ID", List),
    col("dc.identifier.articleNumber", "Article Number", List),
    col("dc.identifier.applicationnumber", "Application Number", List),
    col("dc.identifier.sherpaUrl", "Sherpa URL", List),
    col("dc.identifier.citation", "Citation", List),
    col("dc.language.iso", "Language", List),
    col("dc.publisher", "Publisher", List),
    col("dc.source", "Source", List),
    col("dc.relation.ispartof", "Journal/Series", List),
    col("dc.relation.issn", "ISSN (Relation)", List),
    col("dc.coverage.spatial", "Country", List),
    col("dc.type", "Type", List),
    col("dc.identifier.subtype", "Subtype", List),
    col("dc.identifier.subtypeDescription", "Subtype Description", List),
    col("dc.subject", "Keywords/Subjects", List),
    col("dc.subject.other", "Other Subjects", List),
    col("dc.subject_scopus", "Scopus Subjects", List),
    col("dc.subject_wos", "Web of Science Subjects", List),
    col("dc.right", "Rights", List),
    col("dc.rights", "Rights (Full)", List),
    col("dc.identifier.citedby", "Cited By", List),
    col("dc.identifier.crossref_citation", "Crossref Citation", List),
    col("oaire.freeToRead.value", "Free to Read", List),
    col("oaire.venue.unpaywall", "Open Access", List),
    col("oaire.citation.volume", "Volume", Single),
    col("oaire.citation.issue", "Issue", Single),
    col("oaire.citation.startPage", "Start Page", Single),
    col("oaire.citation.endPage", "End Page", Single),
    col("dc.scopus.quartile", "Scopus Quartile", List),
    col("dc.wos.quartile", "Web of Science Quartile", List),
    col("cris.author.scopus-author-id", "Scopus Author ID", List),
    col("cris.lastimport.scopus", "Scopus Import Date", List),
    col("cris.lastimport.scopus-publication", "Scopus Publication Import Date", List),
    col("cris.sourceId", "Source ID", List),
    col("cris.virtual.department", "CRIS Department", List),
    col("cris.virtual.orcid", "ORCID", List),
    col("cris.virtualsource.department", "CRIS Source Department", List),
    col("cris.virtualsource.orcid", "CRIS Source ORCID", List),
    col("person.identifier.orcid", "ORCID (Person)", List),
    col("person.identifier.rid", "Researcher ID", List),
    col("person.identifier.scopus-author-id", "Person Scopus ID", List),
    col("person.affiliation.city", "Affiliation City", List),
    col("person.affiliation.country", "Affiliation Country", List),
    col("person.affiliation.id", "Affiliation ID", List),
    col("oairecerif.author.affiliation", "CERIF Author Affiliation", List),
    col("oairecerif.editor.affiliation", "CERIF Editor Affiliation", List),
    col("location.coll", "Collection/Department", Departments),
];

/// Solr `fl` list for an export query.
pub fn field_list() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.field).collect()
}

pub fn labels() -> impl Iterator<Item = &'static str> {
    COLUMNS.iter().map(|c| c.label)
}
