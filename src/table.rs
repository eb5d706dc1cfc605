use std::sync::Arc;
use tracing::{debug, trace};

use crate::column::{Cell, Column};
use crate::domain::StoreError;
use crate::record::{Record, Schema};
use crate::view::{FilterOption, SortDirection, ViewConfig, compute_view};

/// Row level callbacks. Fire and forget: the table never looks at the outcome.
pub trait TableActions {
    fn on_view(&mut self, _record: &Record) {}
    fn on_edit(&mut self, _record: &Record) {}
    fn on_delete(&mut self, _record: &Record) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NoData,
    Rows(usize),
}

/// A field that can be searched on its own, next to the all-column search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSearch {
    pub field: String,
    pub label: String,
}

#[derive(Debug, Clone)]
struct CategoryFilterSpec {
    field: String,
    options: Vec<FilterOption>,
}

/// A titled, searchable, filterable, sortable table over an in-memory record set.
#[derive(Debug, Clone)]
pub struct DataTable {
    title: String,
    schema: Arc<Schema>,
    columns: Vec<Column>,
    records: Vec<Record>,
    searchable: bool,
    filter: Option<CategoryFilterSpec>,
    field_searches: Vec<FieldSearch>,
    actions: Vec<RowAction>,
    config: ViewConfig,
    rows: Arc<Vec<usize>>, // Mapping of view row index to record index
}

impl DataTable {
    pub fn new(
        title: impl Into<String>,
        schema: Arc<Schema>,
        columns: Vec<Column>,
    ) -> Result<Self, StoreError> {
        for (idx, column) in columns.iter().enumerate() {
            if !schema.contains(&column.key) {
                return Err(StoreError::UnknownColumn {
                    key: column.key.clone(),
                });
            }
            if columns[..idx].iter().any(|c| c.key == column.key) {
                return Err(StoreError::DuplicateField {
                    field: column.key.clone(),
                });
            }
        }
        Ok(Self {
            title: title.into(),
            schema,
            columns,
            records: Vec::new(),
            searchable: true,
            filter: None,
            field_searches: Vec::new(),
            actions: Vec::new(),
            config: ViewConfig::default(),
            rows: Arc::new(Vec::new()),
        })
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    /// Designate the field the category filter applies to.
    pub fn filterable(
        mut self,
        field: impl Into<String>,
        options: Vec<FilterOption>,
    ) -> Result<Self, StoreError> {
        let field = field.into();
        if !self.schema.contains(&field) {
            return Err(StoreError::UnknownField { field });
        }
        self.filter = Some(CategoryFilterSpec { field, options });
        Ok(self)
    }

    /// Designate a field for scoped search. Terms on several fields combine with AND.
    pub fn with_field_search(
        mut self,
        field: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let field = field.into();
        if !self.schema.contains(&field) {
            return Err(StoreError::UnknownField { field });
        }
        if self.field_searches.iter().any(|f| f.field == field) {
            return Err(StoreError::DuplicateField { field });
        }
        self.field_searches.push(FieldSearch {
            field,
            label: label.into(),
        });
        Ok(self)
    }

    pub fn with_actions(mut self, actions: &[RowAction]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Result<Self, StoreError> {
        self.set_records(records)?;
        Ok(self)
    }

    fn check_records(&self, records: &[Record]) -> Result<(), StoreError> {
        for record in records.iter() {
            if let Some(field) = record.keys().find(|k| !self.schema.contains(k)) {
                return Err(StoreError::UnknownField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Data source change: replace the records and reset search, filter and sort.
    pub fn set_records(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
        self.check_records(&records)?;
        self.records = records;
        self.config.reset();
        self.refresh();
        Ok(())
    }

    /// Replace the records but keep the operator's current view settings.
    pub fn update_records(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
        self.check_records(&records)?;
        self.records = records;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.rows = Arc::new(compute_view(&self.records, &self.columns, &self.config));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn filter_options(&self) -> &[FilterOption] {
        self.filter.as_ref().map(|f| f.options.as_slice()).unwrap_or(&[])
    }

    pub fn field_searches(&self) -> &[FieldSearch] {
        &self.field_searches
    }

    pub fn actions(&self) -> &[RowAction] {
        &self.actions
    }

    pub fn set_search(&mut self, term: &str) {
        if !self.searchable {
            debug!("Table {} is not searchable", self.title);
            return;
        }
        self.config.set_search(term);
        self.refresh();
    }

    /// Ignored for fields not designated with [`DataTable::with_field_search`].
    pub fn set_field_term(&mut self, field: &str, term: &str) {
        if !self.field_searches.iter().any(|f| f.field == field) {
            debug!("Field {field} is not searchable on its own in {}", self.title);
            return;
        }
        self.config.set_field_term(field, term);
        self.refresh();
    }

    pub fn field_term(&self, field: &str) -> &str {
        self.config.field_term(field)
    }

    /// The "Clear filters" action: search, field terms and category filter go, the sort stays.
    pub fn clear_filters(&mut self) {
        self.config.clear_filters();
        self.refresh();
    }

    /// `None` selects "All".
    pub fn select_filter(&mut self, value: Option<&str>) {
        let Some(designated) = &self.filter else {
            debug!("Table {} has no category filter", self.title);
            return;
        };
        match value {
            Some(v) => self.config.set_filter(designated.field.clone(), v),
            None => self.config.clear_filter(),
        }
        self.refresh();
    }

    /// All → first option → ... → last option → All.
    pub fn cycle_filter(&mut self) {
        let options = self.filter_options();
        if options.is_empty() {
            return;
        }
        let next = match &self.config.category_filter {
            None => Some(options[0].value.clone()),
            Some(current) => options
                .iter()
                .position(|o| o.value == current.value)
                .and_then(|pos| options.get(pos + 1))
                .map(|o| o.value.clone()),
        };
        self.select_filter(next.as_deref());
    }

    pub fn active_filter_label(&self) -> &str {
        self.config
            .category_filter
            .as_ref()
            .and_then(|active| {
                self.filter_options()
                    .iter()
                    .find(|o| o.value == active.value)
                    .map(|o| o.label.as_str())
            })
            .unwrap_or("All")
    }

    /// Header click. No-op for columns that are not sortable.
    pub fn click_header(&mut self, column_idx: usize) {
        let Some(column) = self.columns.get(column_idx) else {
            return;
        };
        let key = column.key.clone();
        if self.config.toggle_sort(&key, &self.columns) {
            self.refresh();
        }
    }

    pub fn header_label(&self, column_idx: usize) -> String {
        let Some(column) = self.columns.get(column_idx) else {
            return String::new();
        };
        if !column.sortable {
            return column.label.clone();
        }
        let marker = match &self.config.sort {
            Some(sort) if sort.key == column.key => match sort.direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            },
            _ => "↕",
        };
        format!("{} {marker}", column.label)
    }

    pub fn rows(&self) -> Arc<Vec<usize>> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn state(&self) -> ViewState {
        match self.rows.len() {
            0 => ViewState::NoData,
            n => ViewState::Rows(n),
        }
    }

    /// Record shown at view row `row`.
    pub fn record(&self, row: usize) -> Option<&Record> {
        self.rows.get(row).and_then(|&idx| self.records.get(idx))
    }

    pub fn view(&self) -> impl Iterator<Item = &Record> + '_ {
        self.rows.iter().filter_map(|&idx| self.records.get(idx))
    }

    pub fn render_row(&self, row: usize) -> Vec<Cell> {
        match self.record(row) {
            Some(record) => self.columns.iter().map(|c| c.render(record)).collect(),
            None => Vec::new(),
        }
    }

    pub fn results_summary(&self) -> String {
        match self.state() {
            ViewState::NoData => "No data found".to_string(),
            ViewState::Rows(n) => format!("Showing {} of {} results", n, self.records.len()),
        }
    }

    /// "Showing N of M <noun>" while anything narrows the view.
    pub fn filtered_summary(&self, noun: &str) -> Option<String> {
        self.config
            .is_filtered()
            .then(|| format!("Showing {} of {} {noun}", self.len(), self.records.len()))
    }

    pub fn actions_label(&self) -> String {
        self.actions
            .iter()
            .map(|a| match a {
                RowAction::View => "[v]iew",
                RowAction::Edit => "[e]dit",
                RowAction::Delete => "[d]elete",
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Dispatch one row action. Returns false when the action is not enabled or the row is gone.
    pub fn trigger(&self, action: RowAction, row: usize, handler: &mut dyn TableActions) -> bool {
        if !self.actions.contains(&action) {
            trace!("Action {action:?} not enabled on {}", self.title);
            return false;
        }
        let Some(record) = self.record(row) else {
            return false;
        };
        trace!("{action:?} clicked for {:?} in {}", record.id(), self.title);
        match action {
            RowAction::View => handler.on_view(record),
            RowAction::Edit => handler.on_edit(record),
            RowAction::Delete => handler.on_delete(record),
        }
        true
    }
}
