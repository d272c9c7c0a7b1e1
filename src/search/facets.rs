//! Flat `[value, count, value, count, …]` facet arrays → ordered maps.

use crate::departments::DepartmentMap;
use crate::search::authors::facet_display_name;
use crate::solr::SolrResponse;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

const YEAR_MIN: i64 = 2000;
const YEAR_MAX: i64 = 2030;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub authors: IndexMap<String, u64>,
    pub years: IndexMap<i64, u64>,
    pub types: IndexMap<String, u64>,
    pub departments: IndexMap<String, u64>,
    pub languages: IndexMap<String, u64>,
    pub countries: IndexMap<String, u64>,
    pub sources: IndexMap<String, u64>,
    pub openaccess: IndexMap<String, u64>,
}

fn pairs(raw: &[Value]) -> impl Iterator<Item = (String, u64)> + '_ {
    raw.chunks(2).filter_map(|chunk| {
        let value = match chunk.first()? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let count = chunk.get(1).and_then(Value::as_u64).unwrap_or(0);
        Some((value, count))
    })
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "N/A"
}

/// Count descending; `sort_by` is stable so ties stay in engine order.
fn by_count(mut map: IndexMap<String, u64>) -> IndexMap<String, u64> {
    map.sort_by(|_, a, _, b| b.cmp(a));
    map
}

fn accumulate(
    raw: Option<&[Value]>,
    mut key: impl FnMut(&str) -> Option<String>,
) -> IndexMap<String, u64> {
    let mut map: IndexMap<String, u64> = IndexMap::new();
    for (value, count) in raw.map(pairs).into_iter().flatten() {
        if let Some(k) = key(&value) {
            *map.entry(k).or_insert(0) += count;
        }
    }
    by_count(map)
}

fn plain(raw: Option<&[Value]>) -> IndexMap<String, u64> {
    accumulate(raw, |v| (!is_placeholder(v)).then(|| v.to_string()))
}

impl Facets {
    pub fn from_response(response: &SolrResponse, departments: &DepartmentMap) -> Self {
        let mut years: IndexMap<i64, u64> = IndexMap::new();
        for (value, count) in response.facet_field("dateIssued.year").map(pairs).into_iter().flatten() {
            if let Ok(year) = value.trim().parse::<i64>() {
                if (YEAR_MIN..=YEAR_MAX).contains(&year) {
                    *years.entry(year).or_insert(0) += count;
                }
            }
        }
        years.sort_by(|a, _, b, _| b.cmp(a));

        let mut authors = accumulate(response.facet_field("author_facet"), |v| {
            let name = facet_display_name(v);
            (!name.is_empty()).then(|| name.to_string())
        });
        authors.retain(|_, count| *count > 0);
        if authors.is_empty() {
            authors = accumulate(response.facet_field("dc.contributor.author"), |v| {
                (!v.is_empty()).then(|| v.to_string())
            });
        }

        let departments = accumulate(response.facet_field("location.coll"), |code| {
            departments
                .resolve(code)
                .filter(|name| !is_placeholder(name))
                .map(str::to_string)
        });

        Self {
            authors,
            years,
            types: plain(response.facet_field("dc.type_facet")),
            departments,
            languages: plain(response.facet_field("language_keyword")),
            countries: plain(response.facet_field("person.affiliation.country_facet")),
            sources: plain(response.facet_field("dc.publisher_facet")),
            openaccess: plain(response.facet_field("oaire.venue.unpaywall_facet")),
        }
    }

    /// Every facet truncated to its first `n` entries.
    pub fn top(&self, n: usize) -> Self {
        fn take<K: Clone + std::hash::Hash + Eq>(map: &IndexMap<K, u64>, n: usize) -> IndexMap<K, u64> {
            map.iter().take(n).map(|(k, v)| (k.clone(), *v)).collect()
        }
        Self {
            authors: take(&self.authors, n),
            years: take(&self.years, n),
            types: take(&self.types, n),
            departments: take(&self.departments, n),
            languages: take(&self.languages, n),
            countries: take(&self.countries, n),
            sources: take(&self.sources, n),
            openaccess: take(&self.openaccess, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(fields: serde_json::Value) -> SolrResponse {
        serde_json::from_value(json!({"facet_counts": {"facet_fields": fields}})).unwrap()
    }

    #[test]
    fn author_facet_values_are_decoded() {
        let r = response(json!({
            "author_facet": ["123\n|||\nJane Doe", 7, "Plain", 3, "Zero", 0]
        }));
        let facets = Facets::from_response(&r, &DepartmentMap::new());
        assert_eq!(facets.authors.get("Jane Doe"), Some(&7));
        assert_eq!(facets.authors.get("Plain"), Some(&3));
        assert!(!facets.authors.contains_key("Zero"));
    }

    #[test]
    fn contributor_facet_is_the_author_fallback() {
        let r = response(json!({"author_facet": [], "dc.contributor.author": ["Doe", 2]}));
        let facets = Facets::from_response(&r, &DepartmentMap::new());
        assert_eq!(facets.authors.get("Doe"), Some(&2));
    }

    #[test]
    fn years_are_bounded_and_descending() {
        let r = response(json!({
            "dateIssued.year": ["2019", 4, "1999", 10, "2031", 2, "2022", 1, "abc", 5, "2019", 1]
        }));
        let facets = Facets::from_response(&r, &DepartmentMap::new());
        let years: Vec<(i64, u64)> = facets.years.into_iter().collect();
        assert_eq!(years, vec![(2022, 1), (2019, 5)]);
    }

    #[test]
    fn departments_resolve_and_sum() {
        let r = response(json!({"location.coll": ["c1", 3, "c2", 4, "zzz", 9, "", 1]}));
        let map = DepartmentMap::from_entries([("c1", "Physics"), ("c2", "Physics"), ("c3", "Chemistry")]);
        let facets = Facets::from_response(&r, &map);
        assert_eq!(facets.departments.len(), 1);
        assert_eq!(facets.departments.get("Physics"), Some(&7));
    }

    #[test]
    fn counts_sort_descending_with_stable_ties() {
        let r = response(json!({
            "dc.publisher_facet": ["B", 2, "N/A", 50, "A", 5, "C", 2, "", 3]
        }));
        let facets = Facets::from_response(&r, &DepartmentMap::new());
        let order: Vec<&str> = facets.sources.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn top_truncates_every_facet() {
        let r = response(json!({
            "dc.type_facet": ["a", 5, "b", 4, "c", 3],
            "language_keyword": ["en", 1]
        }));
        let facets = Facets::from_response(&r, &DepartmentMap::new()).top(2);
        assert_eq!(facets.types.len(), 2);
        assert_eq!(facets.languages.len(), 1);
    }
}
