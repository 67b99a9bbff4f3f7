//! Entities and helpers shared by unit tests

use crate::domain::{FieldRules, Repository, RepositoryEntity, Rule, RuleSet};
use sea_orm::{DatabaseConnection, DbBackend, QueryTrait, Select};
use std::sync::Arc;

pub mod post {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub status: String,
        pub views: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod broken {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "broken")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub label: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const POST_RULES: &[FieldRules] = &[
    FieldRules::new("title", &[Rule::Required, Rule::String, Rule::MaxLength(120)]),
    FieldRules::new("status", &[Rule::In(&["draft", "published"])]),
    FieldRules::new("views", &[Rule::Integer, Rule::Min(0)]),
];

impl RepositoryEntity for post::Entity {
    fn writable_columns() -> &'static [post::Column] {
        &[post::Column::Title, post::Column::Status, post::Column::Views]
    }

    fn rules(_kind: RuleSet) -> &'static [FieldRules] {
        POST_RULES
    }

    fn enum_values(column: post::Column) -> Option<&'static [&'static str]> {
        match column {
            post::Column::Status => Some(&["draft", "published"]),
            _ => None,
        }
    }
}

pub mod note {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "notes")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub label: String,
        pub pinned: bool,
        pub archived_by: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl RepositoryEntity for note::Entity {
    fn writable_columns() -> &'static [note::Column] {
        &[note::Column::Label]
    }
}

impl RepositoryEntity for broken::Entity {
    fn writable_columns() -> &'static [broken::Column] {
        &[broken::Column::Id, broken::Column::Label]
    }
}

/// Repository over a disconnected database, for query-building tests
pub fn repository() -> Repository<post::Entity> {
    Repository::new(Arc::new(DatabaseConnection::Disconnected)).unwrap()
}

pub fn sql<E: sea_orm::EntityTrait>(query: Select<E>) -> String {
    query.build(DbBackend::Sqlite).to_string()
}
