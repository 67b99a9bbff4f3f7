//! Integration tests for the criteria-driven repository

mod common;

use common::{names, print_test_header, repository, repository_with, seed_users, setup_db, user};
use entity_repository::{
    criteria_fn, ColumnEquals, Columns, Config, Criteria, OrderBy, PageParams, Repository,
    RepositoryError, Result, RuleSet, ScopePolicy,
};
use sea_orm::{
    ColumnTrait, DbBackend, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryTrait,
    Select,
};
use serde_json::{json, Value as JsonValue};

// ===== Criteria used across tests =====

struct WhereStatus(&'static str);

impl Criteria<user::Entity> for WhereStatus {
    fn apply(
        &self,
        query: Select<user::Entity>,
        _repository: &Repository<user::Entity>,
    ) -> Result<Select<user::Entity>> {
        Ok(query.filter(user::Column::Status.eq(self.0)))
    }

    fn name(&self) -> &str {
        "where_status"
    }
}

struct WhereOlderThan(i32);

impl Criteria<user::Entity> for WhereOlderThan {
    fn apply(
        &self,
        query: Select<user::Entity>,
        _repository: &Repository<user::Entity>,
    ) -> Result<Select<user::Entity>> {
        Ok(query.filter(user::Column::Age.gt(self.0)))
    }

    fn name(&self) -> &str {
        "where_older_than"
    }
}

struct RequiresTenant;

impl Criteria<user::Entity> for RequiresTenant {
    fn apply(
        &self,
        query: Select<user::Entity>,
        repository: &Repository<user::Entity>,
    ) -> Result<Select<user::Entity>> {
        match repository.context().get("tenant") {
            Some(_) => Ok(query),
            None => Err(RepositoryError::criteria("requires_tenant", "no tenant in context")),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct NameOnly {
    name: String,
}

fn sql(query: Select<user::Entity>) -> String {
    query.build(DbBackend::Sqlite).to_string()
}

// ===== Criteria chain =====

#[tokio::test]
async fn test_criteria_fold_in_push_order() {
    print_test_header(
        "test_criteria_fold_in_push_order",
        &[
            "Push WhereStatus(active) then WhereOlderThan(18)",
            "Both predicates are applied, in push order",
        ],
    );

    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("active"))
        .push_criteria(WhereOlderThan(18))
        .push_criteria(OrderBy::asc(user::Column::Name));

    let query = sql(repo.apply_criteria().unwrap());
    let status = query.find(r#""users"."status" = 'active'"#).unwrap();
    let age = query.find(r#""users"."age" > 18"#).unwrap();
    assert!(status < age, "{}", query);
    assert_eq!(
        repo.criteria().names(),
        vec!["where_status", "where_older_than", "order_by"]
    );

    let users = repo.all().await.unwrap();
    assert_eq!(names(&users), vec!["Alice", "Dave"]);

    // The base handle is never touched by the chain
    assert_eq!(sql(repo.model().clone()), sql(user::Entity::find()));
}

#[tokio::test]
async fn test_repeated_reads_do_not_accumulate_filters() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("active"));

    let before = sql(repo.apply_criteria().unwrap());
    let first = repo.all().await.unwrap();
    let second = repo.all().await.unwrap();
    let after = sql(repo.apply_criteria().unwrap());

    assert_eq!(first, second);
    assert_eq!(before, after);
    assert_eq!(after.matches("'active'").count(), 1);
}

#[tokio::test]
async fn test_skip_criteria_reads_unfiltered() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("banned"));
    assert_eq!(repo.all().await.unwrap().len(), 1);

    repo.skip_criteria(true);
    assert_eq!(repo.all().await.unwrap().len(), 5);
    assert_eq!(sql(repo.apply_criteria().unwrap()), sql(user::Entity::find()));
}

#[tokio::test]
async fn test_skip_flag_persists_until_reset() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("active")).skip_criteria(true);

    assert_eq!(repo.all().await.unwrap().len(), 5);
    assert_eq!(repo.all().await.unwrap().len(), 5);
    assert!(repo.is_skipping_criteria());

    repo.reset_scope();
    assert!(!repo.is_skipping_criteria());
    assert_eq!(repo.all().await.unwrap().len(), 3);

    // Resetting an already reset scope is a no-op
    repo.reset_scope();
    assert!(!repo.is_skipping_criteria());
}

#[tokio::test]
async fn test_reset_after_read_policy_clears_skip() {
    print_test_header(
        "test_reset_after_read_policy_clears_skip",
        &["ScopePolicy::ResetAfterRead limits a skip to the next read"],
    );

    let db = setup_db().await;
    seed_users(&db).await;

    let config = Config {
        scope_policy: ScopePolicy::ResetAfterRead,
        ..Config::default()
    };
    let mut repo = repository_with(&db, &config);
    repo.push_criteria(WhereStatus("active")).skip_criteria(true);

    assert_eq!(repo.all().await.unwrap().len(), 5);
    assert!(!repo.is_skipping_criteria());
    assert_eq!(repo.all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_failing_criteria_aborts_read() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(RequiresTenant);

    let err = repo.all().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Criteria { .. }));

    repo.with_context_value("tenant", json!("acme"));
    assert_eq!(repo.all().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_by_criteria_narrows_until_make_model() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.get_by_criteria(&ColumnEquals::<user::Entity>::new(user::Column::Status, "active"))
        .unwrap();
    repo.skip_criteria(true);
    assert_eq!(repo.all().await.unwrap().len(), 3);

    repo.make_model().unwrap();
    assert_eq!(repo.all().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_instances_are_isolated() {
    print_test_header(
        "test_instances_are_isolated",
        &["Two repositories for the same entity never see each other's criteria"],
    );

    let db = setup_db().await;
    seed_users(&db).await;

    let mut filtered = repository(&db);
    let mut plain = repository(&db);
    filtered.push_criteria(WhereStatus("inactive"));

    let (filtered_rows, plain_rows) = tokio::join!(filtered.all(), plain.all());
    assert_eq!(names(&filtered_rows.unwrap()), vec!["Carol"]);
    assert_eq!(plain_rows.unwrap().len(), 5);
    assert!(plain.criteria().is_empty());
}

// ===== Reads =====

#[tokio::test]
async fn test_find_applies_criteria() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;
    let bob = seeded[1].clone();

    let mut repo = repository(&db);
    assert_eq!(repo.find(bob.id).await.unwrap(), Some(bob.clone()));

    repo.push_criteria(WhereOlderThan(18));
    assert_eq!(repo.find(bob.id).await.unwrap(), None);
    assert_eq!(repo.find(9999).await.unwrap(), None);
}

#[tokio::test]
async fn test_find_by_attribute() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    let carol = repo
        .find_by(user::Column::Email, "carol@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(carol.name, "Carol");

    repo.push_criteria(WhereStatus("active"));
    assert!(repo
        .find_by(user::Column::Email, "carol@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_column_projection() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(criteria_fn("by_age", |q: Select<user::Entity>| {
        q.filter(user::Column::Age.gte(40))
    }))
    .push_criteria(OrderBy::desc(user::Column::Age));

    let only_names: Vec<NameOnly> = repo
        .all_as(&Columns::only([user::Column::Name]))
        .await
        .unwrap();
    assert_eq!(
        only_names.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
        vec!["Carol", "Erin"]
    );

    let columns = Columns::parse(&["id", "age"]).unwrap();
    let row: JsonValue = repo
        .find_as(seeded[2].id, &columns)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row, json!({ "id": seeded[2].id, "age": 52 }));

    let by_email: Option<NameOnly> = repo
        .find_by_as(
            user::Column::Email,
            "erin@example.com",
            &Columns::only([user::Column::Name]),
        )
        .await
        .unwrap();
    assert_eq!(by_email.unwrap().name, "Erin");

    assert!(matches!(
        Columns::<user::Entity>::parse(&["password"]),
        Err(RepositoryError::UnknownColumn { .. })
    ));
}

#[tokio::test]
async fn test_paginate_metadata_follows_criteria() {
    let db = setup_db().await;
    seed_users(&db).await;

    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("active"))
        .push_criteria(OrderBy::asc(user::Column::Name));

    let first = repo.paginate(Some(2), &PageParams::new()).await.unwrap();
    assert_eq!(names(&first.data), vec!["Alice", "Bob"]);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.per_page, 2);
    assert_eq!(first.total, 3);
    assert_eq!(first.last_page, 2);
    assert!(first.has_more_pages());

    let second = repo
        .paginate(Some(2), &PageParams::new().page(2))
        .await
        .unwrap();
    assert_eq!(names(&second.data), vec!["Dave"]);
    assert!(!second.has_more_pages());

    let beyond = repo
        .paginate(Some(2), &PageParams::new().page(9))
        .await
        .unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, 3);
}

#[tokio::test]
async fn test_paginate_defaults_and_projection() {
    let db = setup_db().await;
    seed_users(&db).await;

    let config = Config {
        default_page_size: 4,
        max_page_size: 10,
        ..Config::default()
    };
    let mut repo = repository_with(&db, &config);
    repo.push_criteria(OrderBy::asc(user::Column::Id));

    let page = repo.paginate(None, &PageParams::new()).await.unwrap();
    assert_eq!(page.per_page, 4);
    assert_eq!(page.data.len(), 4);
    assert_eq!(page.last_page, 2);

    let clamped = repo
        .paginate(None, &PageParams::new().per_page(500))
        .await
        .unwrap();
    assert_eq!(clamped.per_page, 10);
    assert_eq!(clamped.data.len(), 5);

    let projected = repo
        .paginate_as::<JsonValue>(None, &PageParams::new().columns(["name"]))
        .await
        .unwrap();
    assert_eq!(projected.data[0], json!({ "name": "Alice" }));

    let err = repo
        .paginate_as::<JsonValue>(None, &PageParams::new().columns(["nope"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownColumn { .. }));
}

#[tokio::test]
async fn test_typed_paginate_rejects_projection() {
    let db = setup_db().await;
    seed_users(&db).await;
    let mut repo = repository(&db);

    let err = repo
        .paginate(None, &PageParams::new().columns(["name"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Payload(_)));

    let page = repo.paginate(None, &PageParams::new()).await.unwrap();
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn test_empty_table_has_one_page() {
    let db = setup_db().await;
    let mut repo = repository(&db);

    let page = repo.paginate(None, &PageParams::new()).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.last_page, 1);
}

// ===== Writes =====

#[tokio::test]
async fn test_create_round_trip_drops_unwritable_keys() {
    print_test_header(
        "test_create_round_trip_drops_unwritable_keys",
        &[
            "create() keeps writable attributes only",
            "find() on the new key returns the same values",
        ],
    );

    let db = setup_db().await;
    let mut repo = repository(&db);
    repo.push_criteria(WhereStatus("inactive"));

    let created = repo
        .create(json!({
            "id": 42,
            "name": "Mallory",
            "email": "mallory@example.com",
            "status": "active",
            "age": 29,
            "nickname": "mal",
            "role": "admin"
        }))
        .await
        .unwrap();

    assert_ne!(created.id, 42);
    assert_eq!(created.role, None);
    assert_eq!(created.nickname.as_deref(), Some("mal"));

    // Writes ignore criteria; reads do not
    assert_eq!(repo.find(created.id).await.unwrap(), None);
    repo.skip_criteria(true);
    assert_eq!(repo.find(created.id).await.unwrap(), Some(created));
}

#[tokio::test]
async fn test_create_rejects_non_object_payload() {
    let db = setup_db().await;
    let repo = repository(&db);

    let err = repo.create(json!("Mallory")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Payload(_)));
}

#[tokio::test]
async fn test_update_drops_unwritable_keys() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;
    let alice = seeded[0].clone();

    let repo = repository(&db);
    let updated = repo
        .update(json!({ "name": "Alicia", "role": "admin", "id": 777 }), alice.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, alice.id);
    assert_eq!(updated.name, "Alicia");
    assert_eq!(updated.role, None);
    assert_eq!(updated.email, alice.email);
    assert_eq!(updated.age, alice.age);

    let stored = user::Entity::find_by_id(alice.id)
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
    assert!(user::Entity::find_by_id(777).one(db.as_ref()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_miss_returns_none_without_mutation() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;

    let repo = repository(&db);
    let result = repo.update(json!({ "name": "Ghost" }), 9999).await.unwrap();
    assert!(result.is_none());

    let rows = user::Entity::find().all(db.as_ref()).await.unwrap();
    assert_eq!(rows, seeded);
}

#[tokio::test]
async fn test_update_with_only_unwritable_keys_is_noop() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;

    let repo = repository(&db);
    let result = repo
        .update(json!({ "role": "admin" }), seeded[3].id)
        .await
        .unwrap();

    assert_eq!(result, Some(seeded[3].clone()));
}

#[tokio::test]
async fn test_update_by_attribute() {
    let db = setup_db().await;
    seed_users(&db).await;

    let repo = repository(&db);
    let updated = repo
        .update_by(json!({ "status": "inactive" }), user::Column::Email, "dave@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Dave");
    assert_eq!(updated.status, "inactive");

    let missing = repo
        .update_by(json!({ "status": "inactive" }), user::Column::Email, "nobody@example.com")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_delete_hit_and_miss() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;

    let mut repo = repository(&db);
    assert_eq!(repo.delete(9999).await.unwrap(), None);
    assert_eq!(user::Entity::find().count(db.as_ref()).await.unwrap(), 5);

    assert_eq!(repo.delete(seeded[4].id).await.unwrap(), Some(1));
    assert_eq!(repo.find(seeded[4].id).await.unwrap(), None);
    assert_eq!(user::Entity::find().count(db.as_ref()).await.unwrap(), 4);
}

// ===== Validation and forms =====

#[tokio::test]
async fn test_validate_reports_every_field() {
    let db = setup_db().await;
    let repo = repository(&db);

    let err = repo
        .validate(
            &json!({ "name": "", "email": "nope", "status": "zombie", "age": 200 }),
            RuleSet::Create,
        )
        .unwrap_err();
    let RepositoryError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["age", "email", "status"]);

    assert!(repo
        .validate(&json!({ "age": 30 }), RuleSet::Update)
        .is_ok());
    assert_eq!(repo.rules(RuleSet::Create).len(), 5);
}

#[tokio::test]
async fn test_forms() {
    let db = setup_db().await;
    let seeded = seed_users(&db).await;
    let mut repo = repository(&db);

    let blank = repo.form(RuleSet::Create, None).await.unwrap();
    assert!(blank.model.is_none());
    assert_eq!(
        blank.fields.keys().collect::<Vec<_>>(),
        vec!["age", "email", "name", "nickname", "status"]
    );
    assert_eq!(
        blank.fields["status"].values,
        Some(vec!["active".to_string(), "inactive".to_string(), "banned".to_string()])
    );

    let edit = repo.form(RuleSet::Update, Some(seeded[0].id)).await.unwrap();
    assert_eq!(edit.model.as_ref().unwrap()["name"], json!("Alice"));
    assert_eq!(edit.fields["age"].value, Some(json!(34)));
    assert!(edit.fields.contains_key("role"));

    let missing = repo.form(RuleSet::Update, Some(9999)).await.unwrap();
    assert!(missing.model.is_none());
    assert!(missing.fields.is_empty());
}
