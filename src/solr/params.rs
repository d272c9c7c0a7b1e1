use url::form_urlencoded;

/// Ordered multimap of select-handler parameters.
///
/// Keys keep their first insertion position; multi-valued keys such as
/// `facet.field` are emitted as repeated `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolrParams {
    entries: Vec<(String, Vec<String>)>,
}

impl SolrParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every value of `key`.
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
        self
    }

    /// Appends a value to `key`, keeping earlier ones.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.entries.retain(|(k, _)| k != key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_are_serialized_repeatedly() {
        let mut params = SolrParams::new();
        params
            .set("q", "*:*")
            .push("facet.field", "dc.type_facet")
            .push("facet.field", "author_facet");
        assert_eq!(
            params.to_query_string(),
            "q=*%3A*&facet.field=dc.type_facet&facet.field=author_facet"
        );
    }

    #[test]
    fn set_replaces_in_place() {
        let mut params = SolrParams::new();
        params.set("rows", 10).set("start", 0).set("rows", 0);
        assert_eq!(params.get("rows"), Some("0"));
        assert_eq!(params.to_query_string(), "rows=0&start=0");
        params.remove("rows");
        assert!(!params.contains("rows"));
    }
}
