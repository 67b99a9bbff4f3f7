//! Common test utilities: a users entity on in-memory SQLite

#![allow(dead_code)]

use entity_repository::infra::storage::{connect, create_table_for};
use entity_repository::{Config, FieldRules, Repository, RepositoryEntity, Rule, RuleSet};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

pub mod user {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub email: String,
        pub status: String,
        pub age: i32,
        /// Not writable through the repository
        pub role: Option<String>,
        pub nickname: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub const STATUSES: &[&str] = &["active", "inactive", "banned"];

const CREATE_RULES: &[FieldRules] = &[
    FieldRules::new("name", &[Rule::Required, Rule::String, Rule::MaxLength(64)]),
    FieldRules::new("email", &[Rule::Required, Rule::Email]),
    FieldRules::new("status", &[Rule::Required, Rule::In(STATUSES)]),
    FieldRules::new("age", &[Rule::Required, Rule::Integer, Rule::Min(0), Rule::Max(150)]),
    FieldRules::new("nickname", &[Rule::Nullable, Rule::String]),
];

const UPDATE_RULES: &[FieldRules] = &[
    FieldRules::new("name", &[Rule::String, Rule::MaxLength(64)]),
    FieldRules::new("email", &[Rule::Email]),
    FieldRules::new("status", &[Rule::In(STATUSES)]),
    FieldRules::new("age", &[Rule::Integer, Rule::Min(0), Rule::Max(150)]),
];

impl RepositoryEntity for user::Entity {
    fn writable_columns() -> &'static [user::Column] {
        &[
            user::Column::Name,
            user::Column::Email,
            user::Column::Status,
            user::Column::Age,
            user::Column::Nickname,
        ]
    }

    fn rules(kind: RuleSet) -> &'static [FieldRules] {
        match kind {
            RuleSet::Create => CREATE_RULES,
            RuleSet::Update => UPDATE_RULES,
        }
    }

    fn enum_values(column: user::Column) -> Option<&'static [&'static str]> {
        match column {
            user::Column::Status => Some(STATUSES),
            _ => None,
        }
    }
}

/// Fresh in-memory database with the users table
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = connect("sqlite::memory:").await.unwrap();
    create_table_for(&db, user::Entity).await.unwrap();
    db
}

pub fn repository(db: &Arc<DatabaseConnection>) -> Repository<user::Entity> {
    Repository::new(db.clone()).unwrap()
}

pub fn repository_with(db: &Arc<DatabaseConnection>, config: &Config) -> Repository<user::Entity> {
    Repository::with_config(db.clone(), config).unwrap()
}

/// Insert the standard fixture set and return the created rows
///
/// | name  | status   | age |
/// |-------|----------|-----|
/// | Alice | active   | 34  |
/// | Bob   | active   | 17  |
/// | Carol | inactive | 52  |
/// | Dave  | active   | 25  |
/// | Erin  | banned   | 41  |
pub async fn seed_users(db: &Arc<DatabaseConnection>) -> Vec<user::Model> {
    let repo = repository(db);
    let mut created = Vec::new();
    for (name, status, age) in [
        ("Alice", "active", 34),
        ("Bob", "active", 17),
        ("Carol", "inactive", 52),
        ("Dave", "active", 25),
        ("Erin", "banned", 41),
    ] {
        let model = repo
            .create(json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "status": status,
                "age": age,
            }))
            .await
            .unwrap();
        created.push(model);
    }
    created
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn names(users: &[user::Model]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}
