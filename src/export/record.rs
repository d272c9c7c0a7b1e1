use crate::departments::DepartmentMap;
use crate::export::columns::{ColumnRule, COLUMNS};
use crate::search::authors::AuthorList;
use crate::solr::SolrDocument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One exported row: column label → cell text, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportRecord(pub IndexMap<String, String>);

impl ExportRecord {
    pub fn from_document(doc: &SolrDocument, departments: &DepartmentMap) -> Self {
        let mut cells = IndexMap::with_capacity(COLUMNS.len());
        for column in COLUMNS {
            let value = doc.field(column.field);
            let cell = match column.rule {
                ColumnRule::Contributors => AuthorList::from_field(&value).display,
                ColumnRule::Departments => departments.resolve_all(&value).join(column.rule.separator()),
                rule => value.joined(rule.separator()),
            };
            cells.insert(column.label.to_string(), cell);
        }
        Self(cells)
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}
