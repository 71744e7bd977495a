//! Shared test models and helpers.
#![allow(dead_code)]

use docstorm_mongodb::{Model, Record, Result, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub pseudonyms: Vec<String>,
    pub data: HashMap<String, String>,
}

impl Model for User {
    fn collection_name() -> &'static str {
        "users"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(User {
            id: row.id(),
            firstname: row.get_str("firstname"),
            lastname: row.get_str("lastname"),
            email: row.get_str("email"),
            pseudonyms: row.get_string_vec("pseudonyms"),
            data: row.get_string_map("data"),
        })
    }
}

pub fn user(firstname: &str, lastname: &str) -> Record<User> {
    Record::new(User {
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        ..Default::default()
    })
}

pub fn random_string(len: usize) -> String {
    docstorm_mongodb::new_uuid().replace('-', "")[..len].to_string()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
