use std::path::PathBuf;

use storerate::dataset::{ROLE_OWNER, ROLE_USER, user_columns};
use storerate::loader::load_dataset;
use storerate::rating::{parse_timestamp, recent, recent_summary};
use storerate::{
    Cell, DataTable, Record, RowAction, Schema, SortDirection, TableActions, Value, ViewConfig,
    ViewState, aggregate_values, compute_view,
};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[derive(Default)]
struct Recorder {
    deleted: Vec<String>,
}

impl TableActions for Recorder {
    fn on_delete(&mut self, record: &Record) {
        self.deleted.extend(record.id());
    }
}

#[test]
fn loaded_users_search_filter_and_sort() {
    let dataset = load_dataset(&fixtures()).unwrap();
    let mut table = dataset.users_table().unwrap();
    assert_eq!(table.results_summary(), "Showing 4 of 4 results");

    table.select_filter(Some(ROLE_USER));
    table.click_header(0);
    let names: Vec<String> = table.view().filter_map(|u| u.get_string("name")).collect();
    assert_eq!(
        names,
        vec!["Emily Catherine Rodriguez Martinez", "Sarah Michelle Johnson Brown"]
    );

    table.click_header(0);
    assert_eq!(table.config().sort.as_ref().map(|s| s.direction), Some(SortDirection::Descending));
    assert_eq!(table.record(0).and_then(|r| r.get_string("name")).as_deref(), Some("Sarah Michelle Johnson Brown"));

    table.set_search("nobody");
    assert_eq!(table.state(), ViewState::NoData);
    assert_eq!(table.results_summary(), "No data found");

    let mut recorder = Recorder::default();
    table.set_search("");
    table.select_filter(Some(ROLE_OWNER));
    assert!(table.trigger(RowAction::Delete, 0, &mut recorder));
    assert_eq!(recorder.deleted, vec!["3".to_string()]);
}

#[test]
fn loaded_store_ratings_aggregate() {
    let dataset = load_dataset(&fixtures()).unwrap();
    let summary = dataset.store_summary("1");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.display_average(), "4.0");
    assert_eq!(summary.distribution.get(5), 1);

    let stores = dataset.stores_table().unwrap();
    let cells = stores.render_row(0);
    assert_eq!(cells[3], Cell::Stars { value: 4.0, suffix: Some("(3)".to_string()) });
    assert_eq!(cells[3].text(), "★★★★☆ (3)");

    let ratings: Vec<_> = dataset.ratings_for("1").cloned().collect();
    let shown = recent(&ratings, 2);
    assert_eq!(shown[0].timestamp, parse_timestamp("2024-01-15").unwrap());
    assert_eq!(recent_summary(shown.len(), ratings.len()).as_deref(), Some("Showing 2 of 3 reviews"));
}

#[test]
fn compute_view_on_plain_records() {
    let schema = Schema::new(["id", "name", "email", "address", "role"]).unwrap();
    let records: Vec<Record> = [("1", "Zed", "z@x.io"), ("2", "amy", "a@x.io"), ("3", "Bob", "b@x.io")]
        .into_iter()
        .map(|(id, name, email)| {
            schema
                .record([
                    ("id", Value::text(id)),
                    ("name", Value::text(name)),
                    ("email", Value::text(email)),
                ])
                .unwrap()
        })
        .collect();
    let columns = user_columns();

    let mut config = ViewConfig::default();
    assert_eq!(compute_view(&records, &columns, &config), vec![0, 1, 2]);

    config.toggle_sort("name", &columns);
    // Byte order: uppercase before lowercase
    assert_eq!(compute_view(&records, &columns, &config), vec![2, 0, 1]);

    config.set_search("X.IO");
    config.set_filter("role", "store_owner");
    assert!(compute_view(&records, &columns, &config).is_empty());

    let table = DataTable::new("People", schema, columns).unwrap();
    assert!(table.is_empty());
}

#[test]
fn average_of_five_ratings() {
    let summary = aggregate_values([5u8, 4, 5, 3, 5]);
    assert!((summary.average - 4.4).abs() < 1e-9);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.percentage(5), 60.0);
}
