use serde::Serialize;
use std::fmt;
use url::form_urlencoded;

/// Decoded query-string parameters.
///
/// `name`, `name[]` and `name[3]` all land under `name`, so a filter may
/// arrive as a single value or as a bracketed array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, Vec<String>)>,
}

impl RequestParams {
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            params.push(base_key(&key), value.into_owned());
        }
        params
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.push(base_key(key), value.to_string());
        }
        params
    }

    fn push(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    /// Last supplied value, matching how a scalar parameter is overridden.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).last().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Leading-integer coercion; anything unparseable is 0.
    pub fn get_int(&self, key: &str) -> i64 {
        self.get(key).map(coerce_int).unwrap_or(0)
    }

    pub fn trimmed(&self, key: &str) -> String {
        self.get(key).map(str::trim).unwrap_or_default().to_string()
    }
}

fn base_key(key: &str) -> &str {
    match key.find('[') {
        Some(idx) if key.ends_with(']') => &key[..idx],
        _ => key,
    }
}

/// Integer coercion that accepts an optional sign and leading digits,
/// ignoring whatever follows.
pub fn coerce_int(raw: &str) -> i64 {
    let raw = raw.trim();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Author,
    Year,
    Type,
    Department,
    Language,
    Country,
    Source,
    OpenAccess,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 8] = [
        FilterDimension::Author,
        FilterDimension::Year,
        FilterDimension::Type,
        FilterDimension::Department,
        FilterDimension::Language,
        FilterDimension::Country,
        FilterDimension::Source,
        FilterDimension::OpenAccess,
    ];

    /// Request parameter name.
    pub fn param(self) -> &'static str {
        match self {
            FilterDimension::Author => "author",
            FilterDimension::Year => "year",
            FilterDimension::Type => "type",
            FilterDimension::Department => "department",
            FilterDimension::Language => "language",
            FilterDimension::Country => "country",
            FilterDimension::Source => "source",
            FilterDimension::OpenAccess => "openaccess",
        }
    }

    /// Short label used on filter chips.
    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::Author => "Author",
            FilterDimension::Year => "Year",
            FilterDimension::Type => "Type",
            FilterDimension::Department => "Dept",
            FilterDimension::Language => "Lang",
            FilterDimension::Country => "Country",
            FilterDimension::Source => "Source",
            FilterDimension::OpenAccess => "OA",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

/// Normalized filter selection for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub author: Vec<String>,
    pub year: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    pub department: Vec<String>,
    pub language: Vec<String>,
    pub country: Vec<String>,
    pub source: Vec<String>,
    pub openaccess: Vec<String>,
    pub year_range: Option<(i64, i64)>,
}

impl Filters {
    pub fn from_params(params: &RequestParams) -> Self {
        let mut filters = Filters::default();
        for dim in FilterDimension::ALL {
            *filters.values_mut(dim) = normalize_values(params.get_all(dim.param()));
        }

        let from = params.get_int("year_from");
        let to = params.get_int("year_to");
        if from > 0 && to > 0 && from <= to {
            filters.year_range = Some((from, to));
            filters.year = (from..=to).map(|y| y.to_string()).collect();
        }
        filters
    }

    pub fn values(&self, dim: FilterDimension) -> &[String] {
        match dim {
            FilterDimension::Author => &self.author,
            FilterDimension::Year => &self.year,
            FilterDimension::Type => &self.kind,
            FilterDimension::Department => &self.department,
            FilterDimension::Language => &self.language,
            FilterDimension::Country => &self.country,
            FilterDimension::Source => &self.source,
            FilterDimension::OpenAccess => &self.openaccess,
        }
    }

    fn values_mut(&mut self, dim: FilterDimension) -> &mut Vec<String> {
        match dim {
            FilterDimension::Author => &mut self.author,
            FilterDimension::Year => &mut self.year,
            FilterDimension::Type => &mut self.kind,
            FilterDimension::Department => &mut self.department,
            FilterDimension::Language => &mut self.language,
            FilterDimension::Country => &mut self.country,
            FilterDimension::Source => &mut self.source,
            FilterDimension::OpenAccess => &mut self.openaccess,
        }
    }

    pub fn is_empty(&self) -> bool {
        FilterDimension::ALL.iter().all(|d| self.values(*d).is_empty())
    }

    pub fn active(&self) -> impl Iterator<Item = (FilterDimension, &str)> + '_ {
        FilterDimension::ALL
            .into_iter()
            .flat_map(move |dim| self.values(dim).iter().map(move |v| (dim, v.as_str())))
    }

    /// Copy with one selected value removed. Removing any year also drops
    /// the range, since the range is what produced the year list.
    pub fn without(&self, dim: FilterDimension, value: &str) -> Self {
        let mut next = self.clone();
        next.values_mut(dim).retain(|v| v != value);
        if dim == FilterDimension::Year && next.year_range.is_some() {
            next.year_range = None;
            next.year.clear();
        }
        next
    }

    pub fn without_dimension(&self, dim: FilterDimension) -> Self {
        let mut next = self.clone();
        next.values_mut(dim).clear();
        if dim == FilterDimension::Year {
            next.year_range = None;
        }
        next
    }

    /// `(key, value)` pairs re-encoding the selection into links. A range
    /// is written as `year_from`/`year_to` instead of the expanded years.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for dim in FilterDimension::ALL {
            if dim == FilterDimension::Year && self.year_range.is_some() {
                continue;
            }
            for value in self.values(dim) {
                pairs.push((format!("{}[]", dim.param()), value.clone()));
            }
        }
        if let Some((from, to)) = self.year_range {
            pairs.push(("year_from".to_string(), from.to_string()));
            pairs.push(("year_to".to_string(), to.to_string()));
        }
        pairs
    }
}

fn normalize_values(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in raw {
        let value = value.trim();
        if value.is_empty() || out.iter().any(|v| v == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}
