//! Collection/community identifier → department name lookup.
//!
//! Built once per request from two upstream lookups and threaded explicitly
//! through every consumer; there is no process-wide copy.

use crate::config::Config;
use crate::solr::{FieldValue, SolrClient, SolrParams};
use indexmap::IndexMap;

const LOOKUP_ROWS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentMap {
    entries: IndexMap<String, String>,
}

impl DepartmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (code, name) in entries {
            map.insert(code, name);
        }
        map
    }

    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(code.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the community and collection lookups and applies the configured
    /// overrides. A failed lookup is logged and leaves the map partial.
    pub async fn load(client: &SolrClient, config: &Config) -> Self {
        let mut map = Self::new();
        let mut communities: IndexMap<String, String> = IndexMap::new();

        let mut params = SolrParams::new();
        params
            .set(
                "q",
                format!(
                    "search.resourcetype:Community AND location.comm:{}",
                    config.root_community_id
                ),
            )
            .set("rows", LOOKUP_ROWS)
            .set("fl", "search.resourceid,dc.title")
            .set("wt", "json");

        match client.select(&params).await {
            Ok(response) => {
                for doc in &response.response.docs {
                    let id = doc.field("search.resourceid").first().unwrap_or_default().to_string();
                    let title = doc.field("dc.title").first().unwrap_or_default().to_string();
                    if id.is_empty() || title.is_empty() {
                        continue;
                    }
                    if config.excluded_community_id.as_deref() == Some(id.as_str()) {
                        continue;
                    }
                    communities.insert(id.clone(), title.clone());
                    map.insert(id, title);
                }
            }
            Err(err) => tracing::warn!(%err, "community lookup failed"),
        }

        let mut params = SolrParams::new();
        params
            .set("q", "search.resourcetype:Collection")
            .set("rows", LOOKUP_ROWS)
            .set("fl", "search.resourceid,dc.title,location.comm")
            .set("wt", "json");

        match client.select(&params).await {
            Ok(response) => {
                for doc in &response.response.docs {
                    let id = doc.field("search.resourceid").first().unwrap_or_default().to_string();
                    if id.is_empty() {
                        continue;
                    }
                    let parents = doc.field("location.comm");
                    let department = parents
                        .values()
                        .into_iter()
                        .find_map(|parent| communities.get(parent));
                    if let Some(name) = department {
                        let name = name.trim();
                        if !name.is_empty() {
                            map.insert(id, name);
                        }
                    }
                }
            }
            Err(err) => tracing::warn!(%err, "collection lookup failed"),
        }

        for (code, name) in config.department_overrides() {
            map.insert(code, name);
        }

        tracing::debug!(entries = map.len(), "department mapping loaded");
        map
    }

    /// Department for one collection code.
    ///
    /// Exact match first. Otherwise every entry whose code contains, or is
    /// contained in, `code` is a candidate; the longest candidate code wins
    /// and equal lengths fall back to insertion order.
    pub fn resolve(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        if let Some(name) = self.entries.get(code) {
            return Some(name.as_str());
        }

        let mut best: Option<(&str, &str)> = None;
        for (map_code, name) in &self.entries {
            if map_code.is_empty() {
                continue;
            }
            if !(code.contains(map_code.as_str()) || map_code.contains(code)) {
                continue;
            }
            match best {
                Some((best_code, _)) if best_code.len() >= map_code.len() => {}
                _ => best = Some((map_code.as_str(), name.as_str())),
            }
        }
        best.map(|(_, name)| name).filter(|name| !name.is_empty())
    }

    /// Departments for a document's collection membership, de-duplicated in
    /// first-seen order. Scalars may carry several codes joined with `||`.
    pub fn resolve_all(&self, collections: &FieldValue) -> Vec<String> {
        let codes: Vec<&str> = match collections {
            FieldValue::Absent => Vec::new(),
            FieldValue::Scalar(s) => s.split("||").collect(),
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        };

        let mut departments: Vec<String> = Vec::new();
        for code in codes {
            if let Some(name) = self.resolve(code) {
                if !departments.iter().any(|d| d == name) {
                    departments.push(name.to_string());
                }
            }
        }
        departments
    }

    /// Every code mapped to `name`.
    pub fn codes_for(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(code, _)| code.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DepartmentMap {
        DepartmentMap::from_entries([
            ("comm-phys", "Physics"),
            ("coll-phys-1", "Physics"),
            ("coll-chem", "Chemistry"),
            ("coll-chem-organic", "Organic Chemistry"),
        ])
    }

    #[test]
    fn exact_match_wins() {
        assert_eq!(sample().resolve("coll-chem"), Some("Chemistry"));
    }

    #[test]
    fn substring_fallback_resolves_code_variants() {
        let map = sample();
        assert_eq!(map.resolve("coll-phys-1/v2"), Some("Physics"));
        assert_eq!(map.resolve("phys-1"), Some("Physics"));
    }

    #[test]
    fn longest_substring_match_is_preferred() {
        let map = sample();
        assert_eq!(map.resolve("coll-chem-organic-2"), Some("Organic Chemistry"));
    }

    #[test]
    fn empty_and_unknown_codes_resolve_to_nothing() {
        let map = sample();
        assert_eq!(map.resolve(""), None);
        assert_eq!(map.resolve("   "), None);
        assert_eq!(map.resolve("zzz"), None);
    }

    #[test]
    fn resolve_all_dedupes_and_splits_scalars() {
        let map = sample();
        let list = FieldValue::List(vec![
            "comm-phys".into(),
            "coll-phys-1".into(),
            "unknown".into(),
            "coll-chem".into(),
        ]);
        assert_eq!(map.resolve_all(&list), vec!["Physics", "Chemistry"]);

        let scalar = FieldValue::Scalar("coll-chem || comm-phys".into());
        assert_eq!(map.resolve_all(&scalar), vec!["Chemistry", "Physics"]);
        assert!(map.resolve_all(&FieldValue::Absent).is_empty());
    }

    #[test]
    fn codes_for_reverses_the_mapping() {
        assert_eq!(sample().codes_for("Physics"), vec!["comm-phys", "coll-phys-1"]);
        assert!(sample().codes_for("Biology").is_empty());
    }
}
