use std::cmp::Ordering;

/// 1 for articles, 2 for conference/proceedings papers, 3 for the rest.
pub fn type_priority(kind: &str) -> u8 {
    let kind = kind.to_lowercase();
    if kind.contains("article") {
        1
    } else if kind.contains("conference") || kind.contains("proceedings") {
        2
    } else {
        3
    }
}

fn year_key(year: &str) -> Option<u32> {
    year.parse().ok()
}

/// Newer years first, unknown years last, then type priority.
pub fn compare(a_year: &str, a_type: &str, b_year: &str, b_type: &str) -> Ordering {
    let by_year = match (year_key(a_year), year_key(b_year)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_year.then_with(|| type_priority(a_type).cmp(&type_priority(b_type)))
}

/// Items that carry a display year and type string.
pub trait Ranked {
    fn year(&self) -> &str;
    fn kind(&self) -> &str;
}

/// Stable secondary ordering applied after the engine's primary sort.
pub fn secondary_sort<T: Ranked>(items: &mut [T]) {
    items.sort_by(|a, b| compare(a.year(), a.kind(), b.year(), b.kind()));
}
