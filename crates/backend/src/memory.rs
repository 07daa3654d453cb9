//! In-memory [`DataApi`] for tests, demos and offline development.
//!
//! Behaves like the hosted REST layer for everything the client relies on:
//! generated ids and `created_at`, AND-ed filters, ordering with Postgres null
//! placement, limits, unique keys (`23505` on collision), upsert on a conflict
//! target, and relation embedding in select lists. Failures can be injected per
//! operation and table.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::DataApi;
use crate::error::{BackendError, BackendResult, UNIQUE_VIOLATION};
use crate::query::{Filter, Op, Order, Query, SelectItem};
use crate::schema;

type Row = Map<String, Value>;

/// Kind of call made against the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Upsert,
    Delete,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    operation: Operation,
    table: String,
    message: String,
    once: bool,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    unique_keys: HashMap<String, Vec<Vec<String>>>,
    failures: Vec<InjectedFailure>,
    calls: Vec<(Operation, String)>,
}

/// In-memory tables of JSON rows.
#[derive(Debug, Default)]
pub struct InMemoryDataApi {
    state: RwLock<State>,
}

impl InMemoryDataApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the unique keys declared by the hosted schema.
    pub fn with_schema() -> Self {
        let api = Self::new();
        for (table, columns) in schema::UNIQUE_KEYS {
            api.add_unique_key(table, columns);
        }
        api
    }

    pub fn add_unique_key(&self, table: &str, columns: &[&str]) {
        self.write()
            .unique_keys
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
    }

    /// Insert rows directly (same rules as [`DataApi::insert`], no call recorded).
    pub fn seed(&self, table: &str, rows: Value) -> BackendResult<Vec<Value>> {
        self.write().insert(table, rows)
    }

    /// Snapshot of a table's rows in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.read()
            .tables
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Fail the next `operation` on `table` with `message`.
    pub fn fail_next(&self, operation: Operation, table: &str, message: &str) {
        self.inject(operation, table, message, true);
    }

    /// Fail every `operation` on `table` with `message` until cleared.
    pub fn fail_always(&self, operation: Operation, table: &str, message: &str) {
        self.inject(operation, table, message, false);
    }

    pub fn clear_failures(&self) {
        self.write().failures.clear();
    }

    /// Every call made through the [`DataApi`] surface, in order.
    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.read().calls.clone()
    }

    pub fn call_count(&self, operation: Operation, table: &str) -> usize {
        self.read()
            .calls
            .iter()
            .filter(|(op, t)| *op == operation && t == table)
            .count()
    }

    fn inject(&self, operation: Operation, table: &str, message: &str, once: bool) {
        self.write().failures.push(InjectedFailure {
            operation,
            table: table.to_string(),
            message: message.to_string(),
            once,
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DataApi for InMemoryDataApi {
    async fn select(&self, table: &str, query: &Query) -> BackendResult<Vec<Value>> {
        self.write().begin(Operation::Select, table)?;
        Ok(self.read().select(table, query))
    }

    async fn insert(&self, table: &str, rows: Value) -> BackendResult<Vec<Value>> {
        let mut state = self.write();
        state.begin(Operation::Insert, table)?;
        state.insert(table, rows)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> BackendResult<Vec<Value>> {
        let mut state = self.write();
        state.begin(Operation::Update, table)?;
        state.update(table, filters, patch)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Value,
        on_conflict: &[&str],
    ) -> BackendResult<Vec<Value>> {
        let mut state = self.write();
        state.begin(Operation::Upsert, table)?;
        state.upsert(table, rows, on_conflict)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> BackendResult<Vec<Value>> {
        let mut state = self.write();
        state.begin(Operation::Delete, table)?;
        let rows = state.tables.entry(table.to_string()).or_default();
        let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(rows)
            .into_iter()
            .partition(|row| filters.iter().all(|f| matches(row, f)));
        *rows = kept;
        Ok(removed.into_iter().map(Value::Object).collect())
    }
}

impl State {
    /// Record the call and surface an injected failure, if any.
    fn begin(&mut self, operation: Operation, table: &str) -> BackendResult<()> {
        self.calls.push((operation, table.to_string()));
        let hit = self
            .failures
            .iter()
            .position(|f| f.operation == operation && f.table == table);
        let Some(index) = hit else {
            return Ok(());
        };
        let failure = if self.failures[index].once {
            self.failures.remove(index)
        } else {
            self.failures[index].clone()
        };
        Err(BackendError::api(500, None, failure.message))
    }

    fn select(&self, table: &str, query: &Query) -> Vec<Value> {
        let Some(rows) = self.tables.get(table) else {
            return Vec::new();
        };
        let mut selected: Vec<&Row> = rows
            .iter()
            .filter(|row| query.filters().iter().all(|f| matches(row, f)))
            .collect();
        selected.sort_by(|a, b| compare_rows(a, b, query.ordering()));
        if let Some(limit) = query.row_limit() {
            selected.truncate(limit);
        }
        let items = SelectItem::parse_list(query.select_clause());
        selected
            .into_iter()
            .map(|row| Value::Object(self.project(table, row, &items)))
            .collect()
    }

    fn insert(&mut self, table: &str, rows: Value) -> BackendResult<Vec<Value>> {
        let incoming = into_rows(rows)?;
        let mut working = self.tables.get(table).cloned().unwrap_or_default();
        let mut stored = Vec::with_capacity(incoming.len());
        for row in incoming {
            let row = with_defaults(row);
            self.check_unique(table, &working, &row, None)?;
            working.push(row.clone());
            stored.push(Value::Object(row));
        }
        self.tables.insert(table.to_string(), working);
        Ok(stored)
    }

    fn update(&mut self, table: &str, filters: &[Filter], patch: Value) -> BackendResult<Vec<Value>> {
        let Value::Object(patch) = patch else {
            return Err(BackendError::InvalidRequest(
                "update patch must be an object".into(),
            ));
        };
        let mut working = self.tables.get(table).cloned().unwrap_or_default();
        let mut stored = Vec::new();
        for index in 0..working.len() {
            if !filters.iter().all(|f| matches(&working[index], f)) {
                continue;
            }
            let mut row = working[index].clone();
            merge(&mut row, &patch);
            self.check_unique(table, &working, &row, Some(index))?;
            working[index] = row.clone();
            stored.push(Value::Object(row));
        }
        self.tables.insert(table.to_string(), working);
        Ok(stored)
    }

    fn upsert(&mut self, table: &str, rows: Value, on_conflict: &[&str]) -> BackendResult<Vec<Value>> {
        let target: Vec<&str> = if on_conflict.is_empty() {
            vec!["id"]
        } else {
            on_conflict.to_vec()
        };
        let incoming = into_rows(rows)?;
        let mut working = self.tables.get(table).cloned().unwrap_or_default();
        let mut stored = Vec::with_capacity(incoming.len());
        for row in incoming {
            let existing = working
                .iter()
                .position(|candidate| same_key(candidate, &row, &target));
            let row = match existing {
                Some(index) => {
                    let mut merged = working[index].clone();
                    merge(&mut merged, &row);
                    self.check_unique(table, &working, &merged, Some(index))?;
                    working[index] = merged.clone();
                    merged
                }
                None => {
                    let row = with_defaults(row);
                    self.check_unique(table, &working, &row, None)?;
                    working.push(row.clone());
                    row
                }
            };
            stored.push(Value::Object(row));
        }
        self.tables.insert(table.to_string(), working);
        Ok(stored)
    }

    fn check_unique(
        &self,
        table: &str,
        rows: &[Row],
        candidate: &Row,
        skip: Option<usize>,
    ) -> BackendResult<()> {
        let primary = vec!["id".to_string()];
        let declared = self.unique_keys.get(table).map(Vec::as_slice).unwrap_or(&[]);
        for key in std::iter::once(&primary).chain(declared.iter()) {
            let columns: Vec<&str> = key.iter().map(String::as_str).collect();
            let collides = rows
                .iter()
                .enumerate()
                .any(|(i, row)| Some(i) != skip && same_key(row, candidate, &columns));
            if collides {
                return Err(BackendError::Api {
                    status: 409,
                    code: Some(UNIQUE_VIOLATION.to_string()),
                    message: format!(
                        "duplicate key value violates unique constraint \"{}_{}_key\"",
                        table,
                        columns.join("_")
                    ),
                    details: None,
                });
            }
        }
        Ok(())
    }

    fn project(&self, table: &str, row: &Row, items: &[SelectItem]) -> Row {
        if items.is_empty() {
            return row.clone();
        }
        let mut out = Row::new();
        for item in items {
            match item {
                SelectItem::All => {
                    out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                SelectItem::Column(column) => {
                    if let Some(value) = row.get(column) {
                        out.insert(column.clone(), value.clone());
                    }
                }
                SelectItem::Embed {
                    alias,
                    table: related,
                    fk_hint,
                    columns,
                } => {
                    let value = self.embed(table, row, alias, related, fk_hint.as_deref(), columns);
                    out.insert(alias.clone(), value);
                }
            }
        }
        out
    }

    /// Resolve a nested relation.
    ///
    /// Many-to-one when the parent row holds `<alias>_id`, `<singular>_id` or
    /// the hinted column; otherwise one-to-many through `<parent singular>_id`
    /// on the related rows.
    fn embed(
        &self,
        parent_table: &str,
        row: &Row,
        alias: &str,
        related_table: &str,
        fk_hint: Option<&str>,
        columns: &[SelectItem],
    ) -> Value {
        let related = self
            .tables
            .get(related_table)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let candidates = match fk_hint {
            Some(hint) => vec![hint.to_string()],
            None => vec![format!("{alias}_id"), format!("{}_id", singular(related_table))],
        };
        for fk in &candidates {
            let Some(target) = row.get(fk) else {
                continue;
            };
            if target.is_null() {
                return Value::Null;
            }
            return related
                .iter()
                .find(|r| r.get("id").is_some_and(|id| values_equal(id, target)))
                .map(|r| Value::Object(self.project(related_table, r, columns)))
                .unwrap_or(Value::Null);
        }

        let back_ref = format!("{}_id", singular(parent_table));
        let Some(parent_id) = row.get("id") else {
            return Value::Array(Vec::new());
        };
        Value::Array(
            related
                .iter()
                .filter(|r| r.get(&back_ref).is_some_and(|v| values_equal(v, parent_id)))
                .map(|r| Value::Object(self.project(related_table, r, columns)))
                .collect(),
        )
    }
}

fn into_rows(value: Value) -> BackendResult<Vec<Row>> {
    match value {
        Value::Object(row) => Ok(vec![row]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(BackendError::InvalidRequest("rows must be objects".into())),
            })
            .collect(),
        _ => Err(BackendError::InvalidRequest(
            "body must be an object or an array of objects".into(),
        )),
    }
}

fn with_defaults(mut row: Row) -> Row {
    if row.get("id").is_none_or(Value::is_null) {
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    }
    if row.get("created_at").is_none_or(Value::is_null) {
        row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
    }
    row
}

fn merge(row: &mut Row, patch: &Row) {
    for (key, value) in patch {
        row.insert(key.clone(), value.clone());
    }
}

fn same_key(a: &Row, b: &Row, columns: &[&str]) -> bool {
    columns.iter().all(|c| match (a.get(*c), b.get(*c)) {
        (Some(x), Some(y)) if !x.is_null() && !y.is_null() => values_equal(x, y),
        _ => false,
    })
}

fn singular(table: &str) -> String {
    if let Some(stem) = table.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = table.strip_suffix('s') {
        stem.to_string()
    } else {
        table.to_string()
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let field = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        Op::Is => match &filter.value {
            Value::Null => field.is_null(),
            Value::Bool(expected) => field.as_bool() == Some(*expected),
            _ => false,
        },
        _ if field.is_null() => false,
        Op::Eq => values_equal(field, &filter.value),
        Op::Neq => !values_equal(field, &filter.value),
        Op::Gt => compare_values(field, &filter.value) == Some(Ordering::Greater),
        Op::Gte => matches!(
            compare_values(field, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Op::Lt => compare_values(field, &filter.value) == Some(Ordering::Less),
        Op::Lte => matches!(
            compare_values(field, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Op::Like => glob_match(&text_of(field), &text_of(&filter.value)),
        Op::ILike => glob_match(
            &text_of(field).to_lowercase(),
            &text_of(&filter.value).to_lowercase(),
        ),
        Op::In => filter
            .value
            .as_array()
            .is_some_and(|values| values.iter().any(|v| values_equal(field, v))),
    }
}

fn compare_rows(a: &Row, b: &Row, order: &[Order]) -> Ordering {
    for key in order {
        let left = a.get(&key.column).unwrap_or(&Value::Null);
        let right = b.get(&key.column).unwrap_or(&Value::Null);
        // Postgres: NULLS LAST for ascending, NULLS FIRST for descending.
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if key.ascending => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, true) if key.ascending => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                let ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
                if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Some(Ordering::Equal)
}

/// Numeric values compare as decimals (numeric strings included, since
/// decimals are serialized as strings); other strings compare lexically,
/// which orders ISO dates and timestamps correctly.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => match (as_decimal(a), as_decimal(b)) {
            (Some(dx), Some(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            Some(as_decimal(a)?.cmp(&as_decimal(b)?))
        }
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// SQL `LIKE` matching with `%`/`*` for any run and `_` for one character.
fn glob_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern
        .chars()
        .map(|c| if c == '%' { '*' } else { c })
        .collect();

    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while t < text.len() {
        if p < pattern.len() && pattern[p] != '*' && (pattern[p] == text[t] || pattern[p] == '_') {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stock_api() -> InMemoryDataApi {
        let api = InMemoryDataApi::new();
        api.add_unique_key(schema::INVENTORY_STOCK, schema::INVENTORY_STOCK_CONFLICT);
        api
    }

    #[tokio::test]
    async fn insert_assigns_id_and_created_at() {
        let api = InMemoryDataApi::new();
        let rows = api
            .insert("customers", json!({"code": "C001", "name": "Azulejos Lda"}))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["id"].is_string());
        assert!(rows[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn upsert_on_conflict_target_updates_existing_row() {
        let api = stock_api();
        let first = api
            .upsert(
                "inventory_stock",
                json!({"item_id": "i1", "warehouse_id": "w1", "quantity": "10"}),
                schema::INVENTORY_STOCK_CONFLICT,
            )
            .await
            .unwrap();
        let second = api
            .upsert(
                "inventory_stock",
                json!({"item_id": "i1", "warehouse_id": "w1", "quantity": "25"}),
                schema::INVENTORY_STOCK_CONFLICT,
            )
            .await
            .unwrap();

        let rows = api.rows("inventory_stock");
        assert_eq!(rows.len(), 1);
        assert_eq!(first[0]["id"], second[0]["id"]);
        assert_eq!(rows[0]["quantity"], json!("25"));
    }

    #[tokio::test]
    async fn plain_insert_of_duplicate_pair_is_a_unique_violation() {
        let api = stock_api();
        let row = json!({"item_id": "i1", "warehouse_id": "w1", "quantity": "1"});
        api.insert("inventory_stock", row.clone()).await.unwrap();
        let err = api.insert("inventory_stock", row).await.unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(api.rows("inventory_stock").len(), 1);
    }

    #[tokio::test]
    async fn batch_insert_is_all_or_nothing() {
        let api = InMemoryDataApi::new();
        api.add_unique_key("items", &["code"]);
        let err = api
            .insert("items", json!([{"code": "A"}, {"code": "A"}]))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert!(api.rows("items").is_empty());
    }

    #[tokio::test]
    async fn filters_order_and_limit() {
        let api = InMemoryDataApi::new();
        api.seed(
            "financial_transactions",
            json!([
                {"transaction_date": "2024-03-10", "amount": "5", "transaction_type": "income"},
                {"transaction_date": "2024-01-02", "amount": "7", "transaction_type": "income"},
                {"transaction_date": "2024-02-20", "amount": "9", "transaction_type": "expense"},
                {"transaction_date": "2023-12-31", "amount": "1", "transaction_type": "income"},
            ]),
        )
        .unwrap();

        let q = Query::new()
            .eq("transaction_type", "income")
            .gte("transaction_date", "2024-01-01")
            .order_desc("transaction_date")
            .limit(5);
        let rows = api.select("financial_transactions", &q).await.unwrap();
        let dates: Vec<&str> = rows
            .iter()
            .map(|r| r["transaction_date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-03-10", "2024-01-02"]);
    }

    #[tokio::test]
    async fn numeric_strings_compare_as_decimals() {
        let api = InMemoryDataApi::new();
        api.seed(
            "inventory_stock",
            json!([{"quantity": "9.5"}, {"quantity": "10"}, {"quantity": 2}]),
        )
        .unwrap();
        let q = Query::new().gt("quantity", 5).order_asc("quantity");
        let rows = api.select("inventory_stock", &q).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["quantity"], json!("9.5"));
    }

    #[tokio::test]
    async fn embeds_many_to_one_and_one_to_many() {
        let api = InMemoryDataApi::new();
        api.seed("suppliers", json!({"id": "s1", "name": "Argilas SA"}))
            .unwrap();
        api.seed(
            "purchase_orders",
            json!({"id": "po1", "order_number": "PO-1", "supplier_id": "s1"}),
        )
        .unwrap();
        api.seed(
            "purchase_order_items",
            json!([
                {"purchase_order_id": "po1", "quantity": "3"},
                {"purchase_order_id": "po1", "quantity": "4"},
                {"purchase_order_id": "other", "quantity": "5"},
            ]),
        )
        .unwrap();

        let q = Query::new().select("*, supplier:suppliers(name), purchase_order_items(quantity)");
        let rows = api.select("purchase_orders", &q).await.unwrap();
        assert_eq!(rows[0]["supplier"], json!({"name": "Argilas SA"}));
        assert_eq!(
            rows[0]["purchase_order_items"],
            json!([{"quantity": "3"}, {"quantity": "4"}])
        );
    }

    #[tokio::test]
    async fn null_foreign_key_embeds_null() {
        let api = InMemoryDataApi::new();
        api.seed("items", json!({"code": "A", "category_id": null}))
            .unwrap();
        let q = Query::new().select("*, category:item_categories(name)");
        let rows = api.select("items", &q).await.unwrap();
        assert!(rows[0]["category"].is_null());
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let api = InMemoryDataApi::new();
        api.fail_next(Operation::Insert, "inventory_movements", "permission denied");
        let err = api
            .insert("inventory_movements", json!({"delta": "1"}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "permission denied");
        api.insert("inventory_movements", json!({"delta": "1"}))
            .await
            .unwrap();
        assert_eq!(api.call_count(Operation::Insert, "inventory_movements"), 2);
    }

    #[tokio::test]
    async fn update_and_delete_return_affected_rows() {
        let api = InMemoryDataApi::new();
        api.seed(
            "suppliers",
            json!([{"id": "a", "active": true}, {"id": "b", "active": true}]),
        )
        .unwrap();

        let updated = api
            .update("suppliers", &[Filter::eq("id", "a")], json!({"active": false}))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["active"], json!(false));

        let removed = api
            .delete("suppliers", &[Filter::eq("active", true)])
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(api.rows("suppliers").len(), 1);
    }

    #[test]
    fn like_patterns() {
        assert!(glob_match("Porcelain tile", "Porc*"));
        assert!(glob_match("Porcelain tile", "%tile"));
        assert!(glob_match("AB1", "AB_"));
        assert!(!glob_match("AB12", "AB_"));
    }

    #[test]
    fn singular_forms() {
        assert_eq!(singular("item_categories"), "item_category");
        assert_eq!(singular("purchase_orders"), "purchase_order");
        assert_eq!(singular("inventory_stock"), "inventory_stock");
    }
}
