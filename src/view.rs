//! Search → category filter → sort, producing an ordered projection of a record set.
//!
//! The projection is a list of indices into the caller's record slice, so the
//! records themselves are never copied or reordered.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::trace;

use crate::column::Column;
use crate::record::{Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub key: String,
    pub direction: SortDirection,
}

/// Exact (case-insensitive) match of one field against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub search_term: String,
    /// Substring terms scoped to one field each, e.g. store name and address.
    pub field_terms: BTreeMap<String, String>,
    pub category_filter: Option<CategoryFilter>,
    pub sort: Option<SortConfig>,
}

impl ViewConfig {
    pub fn reset(&mut self) {
        *self = ViewConfig::default();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// An empty term removes the field from the search.
    pub fn set_field_term(&mut self, field: impl Into<String>, term: impl Into<String>) {
        let (field, term) = (field.into(), term.into());
        if term.is_empty() {
            self.field_terms.remove(&field);
        } else {
            self.field_terms.insert(field, term);
        }
    }

    pub fn field_term(&self, field: &str) -> &str {
        self.field_terms.get(field).map(String::as_str).unwrap_or("")
    }

    /// Drop search, field terms and category filter; the sort stays.
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.field_terms.clear();
        self.category_filter = None;
    }

    pub fn is_filtered(&self) -> bool {
        !self.search_term.is_empty()
            || !self.field_terms.is_empty()
            || self.category_filter.is_some()
    }

    pub fn set_filter(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.category_filter = Some(CategoryFilter {
            field: field.into(),
            value: value.into(),
        });
    }

    pub fn clear_filter(&mut self) {
        self.category_filter = None;
    }

    /// Header click: same key flips the direction, a new key starts ascending.
    /// Returns false (and changes nothing) for unknown or unsortable columns.
    pub fn toggle_sort(&mut self, key: &str, columns: &[Column]) -> bool {
        if !columns.iter().any(|c| c.key == key && c.sortable) {
            trace!("Ignoring sort request for non sortable column {key}");
            return false;
        }
        let direction = match &self.sort {
            Some(current) if current.key == key => current.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        trace!("Sorting by {key} {direction:?}");
        self.sort = Some(SortConfig {
            key: key.to_string(),
            direction,
        });
        true
    }
}

/// True when the term is empty or any schema column's value contains it, ignoring case.
pub fn matches_search(record: &Record, columns: &[Column], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    columns.iter().any(|c| {
        record
            .get(&c.key)
            .map(|v| v.to_string().to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

/// Every term must be contained in its own field, ignoring case. A missing field never matches.
pub fn matches_field_terms(record: &Record, terms: &BTreeMap<String, String>) -> bool {
    terms.iter().all(|(field, term)| {
        let needle = term.to_lowercase();
        record
            .get(field)
            .map(|v| v.to_string().to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

pub fn matches_filter(record: &Record, filter: Option<&CategoryFilter>) -> bool {
    match filter {
        None => true,
        Some(f) => record
            .get(&f.field)
            .map(|v| v.to_string().to_lowercase() == f.value.to_lowercase())
            .unwrap_or(false),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Number(_)) => 0,
        Some(Value::Text(_)) | Some(Value::Category(_)) => 1,
        None => 2,
    }
}

/// Total ascending order over optional values: numbers, then strings, then missing.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.total_cmp(y),
        (Some(x), Some(y)) if type_rank(a) == type_rank(b) => x.to_string().cmp(&y.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

pub fn compare_records(a: &Record, b: &Record, sort: &SortConfig) -> Ordering {
    let ordering = compare_values(a.get(&sort.key), b.get(&sort.key));
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Indices of `records` that pass search and filter, ordered by the active sort.
/// Without a sort the original collection order is kept.
pub fn compute_view(records: &[Record], columns: &[Column], config: &ViewConfig) -> Vec<usize> {
    let start_time = Instant::now();
    let filter = config.category_filter.as_ref();

    // Parallel filtering; rayon's collect keeps the input order.
    let mut rows: Vec<usize> = records
        .par_iter()
        .enumerate()
        .filter(|(_, r)| {
            matches_search(r, columns, &config.search_term)
                && matches_field_terms(r, &config.field_terms)
                && matches_filter(r, filter)
        })
        .map(|(idx, _)| idx)
        .collect();

    if let Some(sort) = &config.sort {
        let sortable = columns.iter().any(|c| c.key == sort.key && c.sortable);
        if sortable {
            // sort_by is stable, ties keep their pre-sort order
            rows.sort_by(|&a, &b| compare_records(&records[a], &records[b], sort));
        }
    }

    trace!(
        "View of {}/{} records computed in {}us",
        rows.len(),
        records.len(),
        start_time.elapsed().as_micros()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Schema;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").sortable(true),
            Column::new("email", "Email").sortable(true),
            Column::new("address", "Address"),
            Column::new("role", "Role").sortable(true),
            Column::new("score", "Score").sortable(true),
        ]
    }

    fn records() -> Vec<Record> {
        let schema = Schema::new(["id", "name", "email", "address", "role", "score", "secret"]).unwrap();
        let rows = [
            ("1", "John", "john@example.com", "123 Main Street", "system_admin", 3.0),
            ("2", "sarah", "sarah@example.com", "456 Oak Avenue", "normal_user", 5.0),
            ("3", "Mike", "mike@storeowner.com", "789 Business Blvd", "store_owner", 3.0),
            ("4", "Anna", "anna@example.com", "12 Main Street", "normal_user", 1.0),
        ];
        rows.iter()
            .map(|(id, name, email, address, role, score)| {
                schema
                    .record([
                        ("id", Value::text(*id)),
                        ("name", Value::text(*name)),
                        ("email", Value::text(*email)),
                        ("address", Value::text(*address)),
                        ("role", Value::category(*role)),
                        ("score", Value::Number(*score)),
                        ("secret", Value::text("hidden-main")),
                    ])
                    .unwrap()
            })
            .collect()
    }

    fn ids(records: &[Record], rows: &[usize]) -> Vec<String> {
        rows.iter().map(|&i| records[i].id().unwrap()).collect()
    }

    #[test]
    fn empty_config_is_identity() {
        let records = records();
        let rows = compute_view(&records, &columns(), &ViewConfig::default());
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_collection_gives_empty_view() {
        let rows = compute_view(&[], &columns(), &ViewConfig::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_across_columns() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_search("MAIN street");
        let rows = compute_view(&records, &columns(), &config);
        assert_eq!(ids(&records, &rows), vec!["1", "4"]);

        for (idx, record) in records.iter().enumerate() {
            assert_eq!(rows.contains(&idx), matches_search(record, &columns(), "main street"));
        }
    }

    #[test]
    fn search_ignores_fields_outside_columns() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_search("hidden");
        assert!(compute_view(&records, &columns(), &config).is_empty());
    }

    #[test]
    fn search_matches_stringified_numbers() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_search("5");
        // score 5 and the "456 Oak Avenue" address
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["2"]);
    }

    #[test]
    fn filter_matches_designated_field_exactly() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_filter("role", "NORMAL_USER");
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["2", "4"]);

        config.set_filter("role", "normal");
        assert!(compute_view(&records, &columns(), &config).is_empty());
    }

    #[test]
    fn filter_with_unknown_value_is_empty_not_error() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_filter("role", "auditor");
        assert!(compute_view(&records, &columns(), &config).is_empty());
    }

    #[test]
    fn search_and_filter_combine() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_search("main");
        config.set_filter("role", "normal_user");
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["4"]);
    }

    #[test]
    fn field_terms_match_only_their_field() {
        let records = records();
        let mut config = ViewConfig::default();
        config.set_field_term("name", "JO");
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["1"]);

        // "main" is in two addresses but in no name
        config.set_field_term("name", "main");
        assert!(compute_view(&records, &columns(), &config).is_empty());

        config.set_field_term("name", "");
        config.set_field_term("address", "main street");
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["1", "4"]);

        config.set_field_term("name", "ann");
        assert_eq!(ids(&records, &compute_view(&records, &columns(), &config)), vec!["4"]);
        assert_eq!(config.field_term("address"), "main street");
    }

    #[test]
    fn clear_filters_keeps_sort() {
        let cols = columns();
        let mut config = ViewConfig::default();
        config.set_search("x");
        config.set_field_term("address", "oak");
        config.set_filter("role", "normal_user");
        config.toggle_sort("name", &cols);
        assert!(config.is_filtered());
        config.clear_filters();
        assert!(!config.is_filtered());
        assert!(config.field_terms.is_empty());
        assert_eq!(config.sort.as_ref().map(|s| s.key.as_str()), Some("name"));
    }

    #[test]
    fn toggle_sort_cycles_direction() {
        let cols = columns();
        let mut config = ViewConfig::default();
        assert!(config.toggle_sort("name", &cols));
        assert_eq!(config.sort.as_ref().unwrap().direction, SortDirection::Ascending);
        config.toggle_sort("name", &cols);
        assert_eq!(config.sort.as_ref().unwrap().direction, SortDirection::Descending);
        config.toggle_sort("name", &cols);
        assert_eq!(config.sort.as_ref().unwrap().direction, SortDirection::Ascending);
        config.toggle_sort("name", &cols);
        config.toggle_sort("email", &cols);
        assert_eq!(
            config.sort,
            Some(SortConfig {
                key: "email".into(),
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn unsortable_column_is_noop() {
        let cols = columns();
        let mut config = ViewConfig::default();
        config.toggle_sort("name", &cols);
        let before = config.clone();
        assert!(!config.toggle_sort("address", &cols));
        assert!(!config.toggle_sort("nope", &cols));
        assert_eq!(config, before);
    }

    #[test]
    fn numeric_sort_is_stable() {
        let records = records();
        let cols = columns();
        let mut config = ViewConfig::default();
        config.toggle_sort("score", &cols);
        assert_eq!(ids(&records, &compute_view(&records, &cols, &config)), vec!["4", "1", "3", "2"]);

        config.toggle_sort("score", &cols);
        // ties (1 and 3) keep original relative order, distinct values reverse
        assert_eq!(ids(&records, &compute_view(&records, &cols, &config)), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn string_sort_is_lexicographic() {
        let records = records();
        let cols = columns();
        let mut config = ViewConfig::default();
        config.toggle_sort("name", &cols);
        // byte order: uppercase before lowercase
        assert_eq!(ids(&records, &compute_view(&records, &cols, &config)), vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn sorting_sorted_input_is_idempotent() {
        let records = records();
        let cols = columns();
        let mut config = ViewConfig::default();
        config.toggle_sort("email", &cols);
        let first = compute_view(&records, &cols, &config);
        let resorted: Vec<Record> = first.iter().map(|&i| records[i].clone()).collect();
        let second = compute_view(&resorted, &cols, &config);
        assert_eq!(second, (0..resorted.len()).collect::<Vec<_>>());
    }

    #[test]
    fn missing_values_sort_after_present_ones() {
        let schema = Schema::new(["id", "score"]).unwrap();
        let records = vec![
            schema.record([("id", "a")]).unwrap(),
            schema.record([("id", Value::text("b")), ("score", Value::Number(2.0))]).unwrap(),
            schema.record([("id", Value::text("c")), ("score", Value::text("n/a"))]).unwrap(),
        ];
        let cols = vec![Column::new("score", "Score").sortable(true)];
        let mut config = ViewConfig::default();
        config.toggle_sort("score", &cols);
        assert_eq!(ids(&records, &compute_view(&records, &cols, &config)), vec!["b", "c", "a"]);
    }
}
