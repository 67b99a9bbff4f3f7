//! Base repository: CRUD for one entity behind a criteria chain
//!
//! Reads fold the pushed criteria over a copy of the pristine base handle, so
//! a repository can serve several reads without accumulating filters. Writes
//! never go through the chain.

use crate::config::{Config, ScopePolicy};
use crate::contract::{Columns, FormSchema, Page, PageParams, RepositoryError, Result};
use crate::domain::criteria::{Criteria, CriteriaCollection};
use crate::domain::entity::{
    column_by_name, entity_name, primary_key_condition, primary_key_names, writable_names,
    PrimaryKeyOf, RepositoryEntity,
};
use crate::domain::form;
use crate::domain::model::ModelHandle;
use crate::domain::validation::{self, FieldRules, RuleSet};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ColumnType, Condition, DatabaseConnection,
    EntityName, EntityTrait, FromQueryResult, IdenStatic, IntoActiveModel, Iterable,
    PaginatorTrait, QueryFilter, QuerySelect, Select, SelectModel, Selector, TryIntoModel, Value,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Criteria-driven repository for entity `E`
pub struct Repository<E: RepositoryEntity> {
    db: Arc<DatabaseConnection>,
    model: ModelHandle<E>,
    criteria: CriteriaCollection<E>,
    skip_criteria: bool,
    scope_policy: ScopePolicy,
    default_page_size: u64,
    max_page_size: u64,
    context: Map<String, JsonValue>,
}

impl<E: RepositoryEntity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &self.table())
            .field("criteria", &self.criteria)
            .field("skip_criteria", &self.skip_criteria)
            .field("scope_policy", &self.scope_policy)
            .finish()
    }
}

impl<E: RepositoryEntity> Repository<E> {
    /// Repository with default configuration
    pub fn new(db: Arc<DatabaseConnection>) -> Result<Self> {
        Self::with_config(db, &Config::default())
    }

    pub fn with_config(db: Arc<DatabaseConnection>, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            model: ModelHandle::make()?,
            criteria: CriteriaCollection::new(),
            skip_criteria: false,
            scope_policy: config.scope_policy,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
            context: Map::new(),
        })
    }

    /// Entity table name
    pub fn table(&self) -> &str {
        self.model.entity().table_name()
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    // ===== Base handle =====

    pub fn model(&self) -> &Select<E> {
        self.model.model()
    }

    pub fn set_model(&mut self, model: Select<E>) -> &mut Self {
        self.model.set_model(model);
        self
    }

    /// Re-derive the base handle, dropping any `get_by_criteria` narrowing
    pub fn make_model(&mut self) -> Result<Select<E>> {
        self.model.make_model()
    }

    // ===== Criteria =====

    pub fn push_criteria(&mut self, unit: impl Criteria<E> + 'static) -> &mut Self {
        self.criteria.push(Box::new(unit));
        self
    }

    pub fn criteria(&self) -> &CriteriaCollection<E> {
        &self.criteria
    }

    pub fn skip_criteria(&mut self, status: bool) -> &mut Self {
        self.skip_criteria = status;
        self
    }

    pub fn is_skipping_criteria(&self) -> bool {
        self.skip_criteria
    }

    /// Clear the skip-flag
    pub fn reset_scope(&mut self) -> &mut Self {
        self.skip_criteria = false;
        self
    }

    /// Apply one unit to the base handle and keep the result as the new base
    pub fn get_by_criteria(&mut self, unit: &dyn Criteria<E>) -> Result<&mut Self> {
        let narrowed = unit.apply(self.model.snapshot(), self)?;
        debug!(table = self.table(), criteria = unit.name(), "Narrowed base query");
        self.model.set_model(narrowed);
        Ok(self)
    }

    /// Query a read will execute: the base handle with every criteria folded
    /// in push order, or the base handle alone while skipping
    pub fn apply_criteria(&self) -> Result<Select<E>> {
        let base = self.model.snapshot();
        if self.skip_criteria {
            return Ok(base);
        }
        self.criteria.apply(base, self)
    }

    // ===== Request context =====

    /// Request-scoped values criteria may read
    pub fn context(&self) -> &Map<String, JsonValue> {
        &self.context
    }

    pub fn with_context_value(&mut self, key: impl Into<String>, value: JsonValue) -> &mut Self {
        self.context.insert(key.into(), value);
        self
    }

    // ===== Validation =====

    pub fn rules(&self, kind: RuleSet) -> &'static [FieldRules] {
        E::rules(kind)
    }

    /// Check a payload against the entity rule table
    pub fn validate(&self, data: &JsonValue, kind: RuleSet) -> Result<()> {
        validation::validate(data, E::rules(kind))
    }

    fn finish_read(&mut self) {
        if self.scope_policy == ScopePolicy::ResetAfterRead && self.skip_criteria {
            debug!(table = self.table(), "Resetting skip-criteria after read");
            self.skip_criteria = false;
        }
    }
}

// ===== Reads =====

impl<E> Repository<E>
where
    E: RepositoryEntity,
    E::Model: Sync,
{
    pub async fn all(&mut self) -> Result<Vec<E::Model>> {
        let result = self.fetch_all::<E::Model>(&Columns::All).await;
        self.finish_read();
        result
    }

    pub async fn all_as<M>(&mut self, columns: &Columns<E>) -> Result<Vec<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let result = self.fetch_all::<M>(columns).await;
        self.finish_read();
        result
    }

    /// One page of records. `per_page` falls back to the configured default
    /// and `params.per_page` overrides both. Column projections are rejected;
    /// use [`Self::paginate_as`] for those.
    pub async fn paginate(
        &mut self,
        per_page: Option<u64>,
        params: &PageParams,
    ) -> Result<Page<E::Model>> {
        if !params.columns.is_empty() {
            return Err(RepositoryError::payload(
                "column projections need paginate_as; full models carry every column",
            ));
        }
        let result = self.fetch_page::<E::Model>(per_page, params).await;
        self.finish_read();
        result
    }

    pub async fn paginate_as<M>(
        &mut self,
        per_page: Option<u64>,
        params: &PageParams,
    ) -> Result<Page<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let result = self.fetch_page::<M>(per_page, params).await;
        self.finish_read();
        result
    }

    pub async fn find(&mut self, id: PrimaryKeyOf<E>) -> Result<Option<E::Model>> {
        let result = self
            .fetch_one::<E::Model>(primary_key_condition::<E>(id), &Columns::All)
            .await;
        self.finish_read();
        result
    }

    pub async fn find_as<M>(&mut self, id: PrimaryKeyOf<E>, columns: &Columns<E>) -> Result<Option<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let result = self
            .fetch_one::<M>(primary_key_condition::<E>(id), columns)
            .await;
        self.finish_read();
        result
    }

    /// First record whose `column` equals `value`
    pub async fn find_by(
        &mut self,
        column: E::Column,
        value: impl Into<Value>,
    ) -> Result<Option<E::Model>> {
        let condition = Condition::all().add(column.eq(value));
        let result = self.fetch_one::<E::Model>(condition, &Columns::All).await;
        self.finish_read();
        result
    }

    pub async fn find_by_as<M>(
        &mut self,
        column: E::Column,
        value: impl Into<Value>,
        columns: &Columns<E>,
    ) -> Result<Option<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let condition = Condition::all().add(column.eq(value));
        let result = self.fetch_one::<M>(condition, columns).await;
        self.finish_read();
        result
    }

    async fn fetch_all<M>(&self, columns: &Columns<E>) -> Result<Vec<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let query = self.apply_criteria()?;
        debug!(
            table = self.table(),
            criteria = self.active_criteria(),
            "Fetching all records"
        );
        Ok(project(query, columns).all(self.connection()).await?)
    }

    async fn fetch_one<M>(&self, condition: Condition, columns: &Columns<E>) -> Result<Option<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let query = self.apply_criteria()?.filter(condition);
        debug!(
            table = self.table(),
            criteria = self.active_criteria(),
            "Fetching one record"
        );
        let found = project(query, columns).one(self.connection()).await?;
        if found.is_none() {
            warn!(table = self.table(), "Record not found");
        }
        Ok(found)
    }

    async fn fetch_page<M>(&self, per_page: Option<u64>, params: &PageParams) -> Result<Page<M>>
    where
        M: FromQueryResult + Send + Sync,
    {
        let (page, per_page) = params.resolve(
            per_page.unwrap_or(self.default_page_size),
            self.max_page_size,
        );
        let columns = Columns::<E>::parse(&params.columns)?;
        let query = self.apply_criteria()?;
        debug!(
            table = self.table(),
            criteria = self.active_criteria(),
            page,
            per_page,
            "Fetching page"
        );

        let paginator = project(query, &columns).paginate(self.connection(), per_page);
        let counts = paginator.num_items_and_pages().await?;
        let data = paginator.fetch_page(page - 1).await?;

        Ok(Page {
            data,
            current_page: page,
            per_page,
            total: counts.number_of_items,
            last_page: counts.number_of_pages.max(1),
        })
    }

    fn active_criteria(&self) -> usize {
        if self.skip_criteria {
            0
        } else {
            self.criteria.len()
        }
    }
}

// ===== Writes and forms =====

impl<E> Repository<E>
where
    E: RepositoryEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E>
        + ActiveModelBehavior
        + TryIntoModel<E::Model>
        + Send
        + Sync,
{
    /// Insert a record from an attribute map. Non-writable keys are dropped;
    /// criteria are not applied.
    pub async fn create(&self, data: JsonValue) -> Result<E::Model> {
        let mut attributes = restrict_to_writable::<E>(data)?;
        let filled = fill_placeholders::<E>(&mut attributes)?;
        let mut active = E::ActiveModel::from_json(JsonValue::Object(attributes))
            .map_err(RepositoryError::payload)?;
        for column in filled {
            active.not_set(column);
        }
        let model = active.insert(self.connection()).await?;
        info!(table = self.table(), "Created record");
        Ok(model)
    }

    /// Update the record with primary key `id`. Returns `None` when it does
    /// not exist.
    pub async fn update(&self, data: JsonValue, id: PrimaryKeyOf<E>) -> Result<Option<E::Model>> {
        self.update_where(data, primary_key_condition::<E>(id)).await
    }

    /// Update the first record whose `column` equals `value`
    pub async fn update_by(
        &self,
        data: JsonValue,
        column: E::Column,
        value: impl Into<Value>,
    ) -> Result<Option<E::Model>> {
        self.update_where(data, Condition::all().add(column.eq(value)))
            .await
    }

    /// Delete the record with primary key `id`. Returns the number of
    /// deleted rows, or `None` when it does not exist.
    pub async fn delete(&self, id: PrimaryKeyOf<E>) -> Result<Option<u64>> {
        let condition = primary_key_condition::<E>(id);
        let found = self
            .model
            .snapshot()
            .filter(condition.clone())
            .one(self.connection())
            .await?;
        if found.is_none() {
            warn!(table = self.table(), "Delete target not found");
            return Ok(None);
        }

        let result = E::delete_many()
            .filter(condition)
            .exec(self.connection())
            .await?;
        info!(
            table = self.table(),
            rows = result.rows_affected,
            "Deleted record"
        );
        Ok(Some(result.rows_affected))
    }

    /// Form description for `kind`. With an `id`, the current record's
    /// attributes are included; an unknown `id` yields an empty form.
    pub async fn form(&mut self, kind: RuleSet, id: Option<PrimaryKeyOf<E>>) -> Result<FormSchema> {
        let record = match id {
            Some(id) => {
                let found = self
                    .fetch_one::<E::Model>(primary_key_condition::<E>(id), &Columns::All)
                    .await;
                self.finish_read();
                match found? {
                    Some(model) => Some(model),
                    None => return Ok(form::missing_record::<E>(kind)),
                }
            }
            None => None,
        };

        match record {
            Some(model) => form::edit_form::<E>(kind, &model),
            None => Ok(form::create_form::<E>(kind)),
        }
    }

    async fn update_where(&self, data: JsonValue, condition: Condition) -> Result<Option<E::Model>> {
        let attributes = restrict_to_writable::<E>(data)?;
        let Some(existing) = self
            .model
            .snapshot()
            .filter(condition)
            .one(self.connection())
            .await?
        else {
            warn!(table = self.table(), "Update target not found");
            return Ok(None);
        };

        if attributes.is_empty() {
            debug!(table = self.table(), "Nothing to update");
            return Ok(Some(existing));
        }

        let mut merged = match serde_json::to_value(&existing) {
            Ok(JsonValue::Object(map)) => map,
            Ok(_) => {
                return Err(RepositoryError::payload(
                    "model does not serialize to an attribute map",
                ))
            }
            Err(e) => return Err(RepositoryError::payload(e)),
        };
        let changed: Vec<String> = attributes.keys().cloned().collect();
        merged.extend(attributes);

        let mut active = E::ActiveModel::from_json(JsonValue::Object(merged))
            .map_err(RepositoryError::payload)?;
        let keys = primary_key_names::<E>();
        for column in E::Column::iter() {
            let name = column.as_str();
            if !changed.iter().any(|c| c == name) && !keys.iter().any(|k| k == name) {
                active.not_set(column);
            }
        }

        let model = active.update(self.connection()).await?;
        info!(
            table = self.table(),
            columns = ?changed,
            "Updated record"
        );
        Ok(Some(model))
    }
}

/// Keep only the attributes the entity declares writable
pub(crate) fn restrict_to_writable<E: RepositoryEntity>(
    data: JsonValue,
) -> Result<Map<String, JsonValue>> {
    let JsonValue::Object(attributes) = data else {
        return Err(RepositoryError::payload("expected a JSON object of attributes"));
    };

    let writable = writable_names::<E>();
    let (kept, dropped): (Map<String, JsonValue>, Map<String, JsonValue>) = attributes
        .into_iter()
        .partition(|(key, _)| writable.iter().any(|w| w == key));

    if !dropped.is_empty() {
        debug!(
            table = %entity_name::<E>(),
            dropped = ?dropped.keys().collect::<Vec<_>>(),
            "Dropped non-writable attributes"
        );
    }
    Ok(kept)
}

/// Give every non-writable column missing from `attributes` a stand-in
/// value so the payload deserializes into a full model. The returned columns
/// must be left unset on the active model.
fn fill_placeholders<E: RepositoryEntity>(
    attributes: &mut Map<String, JsonValue>,
) -> Result<Vec<E::Column>> {
    let writable = writable_names::<E>();
    let mut filled = Vec::new();
    for column in E::Column::iter() {
        let name = column.as_str();
        if attributes.contains_key(name) || writable.iter().any(|w| w == name) {
            continue;
        }
        let def = column.def();
        let value = if def.is_null() {
            Some(JsonValue::Null)
        } else {
            placeholder(def.get_column_type())
        };
        let Some(value) = value else {
            return Err(RepositoryError::payload(format!(
                "column '{}' cannot be left to the database",
                name
            )));
        };
        attributes.insert(name.to_string(), value);
        filled.push(column);
    }
    Ok(filled)
}

fn placeholder(column_type: &ColumnType) -> Option<JsonValue> {
    let value = match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger
        | ColumnType::TinyUnsigned
        | ColumnType::SmallUnsigned
        | ColumnType::Unsigned
        | ColumnType::BigUnsigned
        | ColumnType::Float
        | ColumnType::Double => JsonValue::from(0),
        ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => JsonValue::from(""),
        ColumnType::Boolean => JsonValue::Bool(false),
        ColumnType::Uuid => JsonValue::from("00000000-0000-0000-0000-000000000000"),
        ColumnType::Date => JsonValue::from("1970-01-01"),
        ColumnType::Time => JsonValue::from("00:00:00"),
        ColumnType::DateTime | ColumnType::Timestamp => JsonValue::from("1970-01-01T00:00:00"),
        ColumnType::TimestampWithTimeZone => JsonValue::from("1970-01-01T00:00:00Z"),
        ColumnType::Json | ColumnType::JsonBinary => JsonValue::Null,
        _ => return None,
    };
    Some(value)
}

fn project<E, M>(query: Select<E>, columns: &Columns<E>) -> Selector<SelectModel<M>>
where
    E: EntityTrait,
    M: FromQueryResult,
{
    match columns {
        Columns::All => query.into_model::<M>(),
        Columns::Only(only) => query
            .select_only()
            .columns(only.iter().copied())
            .into_model::<M>(),
    }
}

/// Resolve a column by name, for callers holding user-supplied names
pub fn resolve_column<E: RepositoryEntity>(name: &str) -> Result<E::Column> {
    column_by_name::<E>(name).ok_or_else(|| RepositoryError::UnknownColumn {
        entity: entity_name::<E>(),
        column: name.to_string(),
    })
}
