//! Searchable, filterable, sortable record tables and store rating aggregation.
//!
//! The core ([`view`], [`rating`], [`rating_input`]) is synchronous and works on
//! in-memory collections supplied by the caller. [`loader`] and [`dataset`] provide
//! the data the `storerate` console shows.

pub mod column;
pub mod dataset;
pub mod domain;
pub mod loader;
pub mod rating;
pub mod rating_input;
pub mod record;
pub mod table;
pub mod view;

pub use column::{Cell, Column, Renderer, Tone};
pub use domain::StoreError;
pub use rating::{Rating, RatingDistribution, RatingSummary, aggregate, aggregate_values};
pub use rating_input::{RatingInput, RatingInputState};
pub use record::{Record, Schema, Value};
pub use table::{DataTable, FieldSearch, RowAction, TableActions, ViewState};
pub use view::{SortConfig, SortDirection, ViewConfig, compute_view};
