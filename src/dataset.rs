//! Users, stores and ratings: the three record sets the console presents.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::column::{Column, Renderer, Tone};
use crate::domain::StoreError;
use crate::rating::{
    PlatformStats, Rating, RatingSummary, aggregate, aggregate_by_subject, parse_timestamp,
};
use crate::record::{Record, Schema, Value};
use crate::table::{DataTable, RowAction};
use crate::view::FilterOption;

pub const USER_FIELDS: [&str; 5] = ["id", "name", "email", "address", "role"];
pub const STORE_FIELDS: [&str; 7] = [
    "id",
    "name",
    "email",
    "address",
    "ownerId",
    "rating",
    "totalRatings",
];
pub const RATING_FIELDS: [&str; 8] = [
    "id", "userName", "userEmail", "storeId", "storeName", "rating", "date", "comment",
];

pub const ROLE_ADMIN: &str = "system_admin";
pub const ROLE_USER: &str = "normal_user";
pub const ROLE_OWNER: &str = "store_owner";

#[derive(Debug, Clone)]
pub struct Dataset {
    pub user_schema: Arc<Schema>,
    pub store_schema: Arc<Schema>,
    pub users: Vec<Record>,
    pub stores: Vec<Record>,
    pub ratings: Vec<Rating>,
}

pub fn role_filter_options() -> Vec<FilterOption> {
    vec![
        FilterOption::new("System Admin", ROLE_ADMIN),
        FilterOption::new("Normal User", ROLE_USER),
        FilterOption::new("Store Owner", ROLE_OWNER),
    ]
}

fn role_renderer() -> Renderer {
    Renderer::badge([
        (ROLE_ADMIN, "System Admin", Tone::Destructive),
        (ROLE_USER, "User", Tone::Primary),
        (ROLE_OWNER, "Store Owner", Tone::Accent),
    ])
}

pub fn user_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name").sortable(true),
        Column::new("email", "Email").sortable(true),
        Column::new("address", "Address"),
        Column::new("role", "Role").sortable(true).renderer(role_renderer()),
    ]
}

pub fn store_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Store Name").sortable(true),
        Column::new("email", "Email").sortable(true),
        Column::new("address", "Address"),
        Column::new("rating", "Rating")
            .sortable(true)
            .renderer(Renderer::Stars {
                count_field: Some("totalRatings".to_string()),
            }),
    ]
}

pub fn rating_columns() -> Vec<Column> {
    vec![
        Column::new("userName", "User").sortable(true),
        Column::new("storeName", "Store").sortable(true),
        Column::new("rating", "Rating")
            .sortable(true)
            .renderer(Renderer::Stars { count_field: None }),
        Column::new("date", "Date").sortable(true),
    ]
}

impl Dataset {
    pub fn new(
        users: Vec<Vec<(String, Value)>>,
        stores: Vec<Vec<(String, Value)>>,
        ratings: Vec<Rating>,
    ) -> Result<Self, StoreError> {
        let user_schema = Schema::new(USER_FIELDS)?;
        let store_schema = Schema::new(STORE_FIELDS)?;
        let users = users
            .into_iter()
            .map(|fields| user_schema.record(fields))
            .collect::<Result<Vec<_>, _>>()?;
        let stores = stores
            .into_iter()
            .map(|fields| store_schema.record(fields))
            .collect::<Result<Vec<_>, _>>()?;
        let mut dataset = Self {
            user_schema,
            store_schema,
            users,
            stores,
            ratings,
        };
        dataset.enrich_stores()?;
        info!(
            "Dataset with {} users, {} stores, {} ratings",
            dataset.users.len(),
            dataset.stores.len(),
            dataset.ratings.len()
        );
        Ok(dataset)
    }

    /// Recompute each store's `rating` and `totalRatings` from the ratings collection.
    pub fn enrich_stores(&mut self) -> Result<(), StoreError> {
        let summaries = aggregate_by_subject(&self.ratings);
        for store in self.stores.iter_mut() {
            let summary = store
                .id()
                .and_then(|id| summaries.get(&id).copied())
                .unwrap_or_default();
            store.set("rating", summary.average)?;
            store.set("totalRatings", summary.total)?;
        }
        Ok(())
    }

    pub fn user(&self, id: &str) -> Option<&Record> {
        self.users.iter().find(|u| u.id().as_deref() == Some(id))
    }

    pub fn store(&self, id: &str) -> Option<&Record> {
        self.stores.iter().find(|s| s.id().as_deref() == Some(id))
    }

    pub fn users_with_role(&self, role: &str) -> impl Iterator<Item = &Record> {
        self.users
            .iter()
            .filter(move |u| u.get_string("role").as_deref() == Some(role))
    }

    /// First store whose `ownerId` is the given user.
    pub fn store_owned_by(&self, owner_id: &str) -> Option<&Record> {
        self.stores
            .iter()
            .find(|s| s.get_string("ownerId").as_deref() == Some(owner_id))
    }

    pub fn ratings_for<'a>(&'a self, store_id: &'a str) -> impl Iterator<Item = &'a Rating> {
        self.ratings.iter().filter(move |r| r.subject == store_id)
    }

    pub fn store_summary(&self, store_id: &str) -> RatingSummary {
        aggregate(self.ratings_for(store_id))
    }

    /// The latest rating the author gave this store.
    pub fn user_rating(&self, author: &str, store_id: &str) -> Option<u8> {
        self.ratings_for(store_id)
            .filter(|r| r.author == author)
            .max_by_key(|r| r.timestamp)
            .map(|r| r.value)
    }

    pub fn add_rating(
        &mut self,
        author: &str,
        store_id: &str,
        value: u8,
        timestamp: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let id = self
            .ratings
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let rating = Rating::new(id.to_string(), value as i64, store_id, author, timestamp, None)?;
        debug!("Recording rating {} for store {store_id} by {author}", rating.value);
        self.ratings.push(rating);
        self.enrich_stores()
    }

    pub fn stats(&self) -> PlatformStats {
        PlatformStats::compute(self.users.len(), self.stores.len(), &self.ratings)
    }

    /// Ratings joined with user and store names, for tabular display.
    pub fn rating_records(&self) -> Result<(Arc<Schema>, Vec<Record>), StoreError> {
        let schema = Schema::new(RATING_FIELDS)?;
        let names: HashMap<String, (Option<String>, Option<String>)> = self
            .users
            .iter()
            .filter_map(|u| Some((u.id()?, (u.get_string("name"), u.get_string("email")))))
            .collect();
        let mut records = Vec::with_capacity(self.ratings.len());
        for rating in self.ratings.iter() {
            let (user_name, user_email) = names
                .get(&rating.author)
                .cloned()
                .unwrap_or((Some(rating.author.clone()), None));
            let store_name = self
                .store(&rating.subject)
                .and_then(|s| s.get_string("name"))
                .unwrap_or_else(|| rating.subject.clone());

            let mut fields: Vec<(String, Value)> = vec![
                ("id".into(), Value::text(rating.id.as_str())),
                ("storeId".into(), Value::text(rating.subject.as_str())),
                ("storeName".into(), Value::text(store_name)),
                ("rating".into(), Value::Number(rating.value as f64)),
                ("date".into(), Value::text(rating.timestamp.format("%Y-%m-%d").to_string())),
            ];
            if let Some(name) = user_name {
                fields.push(("userName".into(), Value::text(name)));
            }
            if let Some(email) = user_email {
                fields.push(("userEmail".into(), Value::text(email)));
            }
            if let Some(comment) = &rating.comment {
                fields.push(("comment".into(), Value::text(comment.as_str())));
            }
            records.push(schema.record(fields)?);
        }
        Ok((schema, records))
    }

    pub fn users_table(&self) -> Result<DataTable, StoreError> {
        DataTable::new("User Management", Arc::clone(&self.user_schema), user_columns())?
            .filterable("role", role_filter_options())?
            .with_actions(&[RowAction::View, RowAction::Edit, RowAction::Delete])
            .with_records(self.users.clone())
    }

    pub fn stores_table(&self) -> Result<DataTable, StoreError> {
        DataTable::new("Store Management", Arc::clone(&self.store_schema), store_columns())?
            .with_field_search("name", "Store name")?
            .with_field_search("address", "Address")?
            .with_actions(&[RowAction::View, RowAction::Edit, RowAction::Delete])
            .with_records(self.stores.clone())
    }

    pub fn ratings_table(&self) -> Result<DataTable, StoreError> {
        let (schema, records) = self.rating_records()?;
        DataTable::new("All Ratings", schema, rating_columns())?
            .with_actions(&[RowAction::View])
            .with_records(records)
    }

    /// Built-in data so the console runs without any files.
    pub fn demo() -> Result<Self, StoreError> {
        let users = [
            ("1", "John Smith Anderson Williams", "admin@storerating.com", "123 Main Street, Downtown District, Metropolitan City", ROLE_ADMIN),
            ("2", "Sarah Michelle Johnson Brown", "sarah.johnson@example.com", "456 Oak Avenue, Residential Area, Suburban Town", ROLE_USER),
            ("3", "Michael David Thompson Davis", "michael@downtowncoffee.com", "789 Business Boulevard, Commercial District", ROLE_OWNER),
            ("4", "Emily Catherine Rodriguez Martinez", "emily.rodriguez@example.com", "12 Maple Court, Riverside", ROLE_USER),
            ("5", "David Alexander Wilson Taylor", "david.wilson@example.com", "34 Pine Road, Hillside", ROLE_USER),
        ]
        .into_iter()
        .map(|(id, name, email, address, role)| {
            vec![
                ("id".to_string(), Value::text(id)),
                ("name".to_string(), Value::text(name)),
                ("email".to_string(), Value::text(email)),
                ("address".to_string(), Value::text(address)),
                ("role".to_string(), Value::category(role)),
            ]
        })
        .collect();

        let stores = [
            ("1", "Downtown Coffee Shop", "info@downtowncoffee.com", "123 Main Street, Downtown District", Some("3")),
            ("2", "The Book Corner Store", "hello@bookcorner.com", "456 Library Avenue, Academic Quarter", None),
            ("3", "Fresh Market Groceries", "contact@freshmarket.com", "789 Commerce Street, Shopping District", None),
            ("4", "Tech Gadgets Electronics", "support@techgadgets.com", "321 Innovation Drive, Tech Park", None),
            ("5", "Artisan Bakery & Cafe", "hello@artisanbakery.com", "654 Artisan Lane, Creative District", None),
            ("6", "Sports Equipment Pro", "info@sportsequipmentpro.com", "987 Athletic Boulevard, Sports Complex", None),
        ]
        .into_iter()
        .map(|(id, name, email, address, owner)| {
            let mut fields = vec![
                ("id".to_string(), Value::text(id)),
                ("name".to_string(), Value::text(name)),
                ("email".to_string(), Value::text(email)),
                ("address".to_string(), Value::text(address)),
            ];
            if let Some(owner) = owner {
                fields.push(("ownerId".to_string(), Value::text(owner)));
            }
            fields
        })
        .collect();

        let ratings = [
            ("1", 5, "1", "2", "2024-01-15", Some("Amazing coffee and friendly service!")),
            ("2", 4, "1", "3", "2024-01-14", Some("Great atmosphere for working.")),
            ("3", 5, "1", "1", "2024-01-13", Some("Best coffee in the downtown area!")),
            ("4", 3, "1", "4", "2024-01-12", Some("Good coffee but could improve wait times.")),
            ("5", 5, "1", "5", "2024-01-11", Some("Excellent service and quality products!")),
            ("6", 5, "2", "2", "2024-01-10", None),
            ("7", 4, "2", "4", "2024-01-09", None),
            ("8", 3, "3", "1", "2024-01-08", None),
            ("9", 4, "3", "5", "2024-01-07", None),
            ("10", 3, "4", "2", "2024-01-06", None),
            ("11", 5, "5", "4", "2024-01-05", None),
            ("12", 4, "6", "2", "2024-01-04", None),
        ]
        .into_iter()
        .map(|(id, value, store, author, date, comment)| {
            Rating::new(id, value, store, author, parse_timestamp(date)?, comment.map(String::from))
        })
        .collect::<Result<Vec<_>, _>>()?;

        Dataset::new(users, stores, ratings)
    }
}
