use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolrResponse {
    #[serde(default)]
    pub response: ResultSet,
    #[serde(default)]
    pub facet_counts: FacetCounts,
    #[serde(default)]
    pub highlighting: HashMap<String, HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SolrDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetCounts {
    #[serde(default)]
    pub facet_fields: HashMap<String, Vec<Value>>,
}

impl SolrResponse {
    /// Engine-supplied fragment for `field` of document `doc_id`.
    pub fn highlight(&self, doc_id: &str, field: &str) -> Option<&str> {
        self.highlighting
            .get(doc_id)
            .and_then(|fields| fields.get(field))
            .and_then(|fragments| fragments.first())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn facet_field(&self, field: &str) -> Option<&[Value]> {
        self.facet_counts.facet_fields.get(field).map(Vec::as_slice)
    }
}

/// A stored field as the engine returned it.
///
/// The schema does not fix cardinality: the same field may come back absent,
/// as a single scalar, or as a list depending on the record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldValue::Absent,
            Some(Value::Array(items)) => {
                FieldValue::List(items.iter().filter_map(scalar_to_string).collect())
            }
            Some(other) => match scalar_to_string(other) {
                Some(s) => FieldValue::Scalar(s),
                None => FieldValue::Absent,
            },
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Raw values in engine order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Absent => Vec::new(),
            FieldValue::Scalar(s) => vec![s.as_str()],
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Scalar(s) => Some(s.as_str()),
            FieldValue::List(items) => items.first().map(String::as_str),
        }
    }

    /// Lists joined with `sep`, scalars as-is, absent as "".
    pub fn joined(&self, sep: &str) -> String {
        match self {
            FieldValue::Absent => String::new(),
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::List(items) => items.join(sep),
        }
    }

    /// Cleaned multi-valued content: list entries are trimmed, a scalar is
    /// split on `||`; empty entries and the `n/a` sentinel are dropped.
    pub fn multi_values(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            FieldValue::Absent => Vec::new(),
            FieldValue::Scalar(s) => s.split("||").collect(),
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("n/a"))
            .map(str::to_string)
            .collect()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One record from `response.docs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SolrDocument(pub Map<String, Value>);

impl SolrDocument {
    pub fn field(&self, name: &str) -> FieldValue {
        FieldValue::from_json(self.0.get(name))
    }

    /// First present field among `names`.
    pub fn first_present(&self, names: &[&str]) -> FieldValue {
        names
            .iter()
            .map(|name| self.field(name))
            .find(|value| !value.is_absent())
            .unwrap_or_default()
    }

    pub fn resource_id(&self) -> String {
        self.first_present(&["search.resourceid", "id"])
            .first()
            .unwrap_or_default()
            .to_string()
    }
}
