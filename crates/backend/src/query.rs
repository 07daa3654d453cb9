//! Query builder for table reads and filtered writes.
//!
//! Renders to the REST dialect of the backend (`column=op.value`,
//! `order=column.asc`, `limit=n`, `select=...`) and is interpreted directly by
//! the in-memory implementation.

use serde::Serialize;
use serde_json::Value;

/// Comparison operator of a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Is,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Like => "like",
            Op::ILike => "ilike",
            Op::In => "in",
            Op::Is => "is",
        }
    }
}

/// A single `column op value` predicate. Predicates in a query are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Filter {
    pub fn new(column: impl Into<String>, op: Op, value: impl Serialize) -> Self {
        Self {
            column: column.into(),
            op,
            value: to_json(value),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Eq, value)
    }

    pub fn neq(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Neq, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Gte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(column, Op::Lte, value)
    }

    /// Pattern match; `*` and `%` are wildcards.
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Op::Like, pattern.into())
    }

    /// Case-insensitive [`Filter::like`].
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Op::ILike, pattern.into())
    }

    pub fn in_list<T: Serialize>(column: impl Into<String>, values: &[T]) -> Self {
        Self::new(column, Op::In, values)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Op::Is, Value::Null)
    }

    /// REST query parameter `(column, "op.value")`.
    pub fn to_param(&self) -> (String, String) {
        let rendered = match (&self.op, &self.value) {
            (Op::In, Value::Array(items)) => {
                let parts: Vec<String> = items.iter().map(render_list_item).collect();
                format!("({})", parts.join(","))
            }
            (_, value) => render_scalar(value),
        };
        (self.column.clone(), format!("{}.{}", self.op.as_str(), rendered))
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn render_list_item(value: &Value) -> String {
    let raw = render_scalar(value);
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    fn render(&self) -> String {
        let dir = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, dir)
    }
}

/// A table read: projection, predicates, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection, including nested relations, e.g.
    /// `"*, category:item_categories(id, name)"`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn neq(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::neq(column, value))
    }

    pub fn gt(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::gt(column, value))
    }

    pub fn gte(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::gte(column, value))
    }

    pub fn lt(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::lt(column, value))
    }

    pub fn lte(self, column: impl Into<String>, value: impl Serialize) -> Self {
        self.filter(Filter::lte(column, value))
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order::asc(column));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order::desc(column));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn select_clause(&self) -> &str {
        self.select.as_deref().unwrap_or("*")
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// REST query parameters in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), compact_select(self.select_clause()))];
        params.extend(self.filters.iter().map(Filter::to_param));
        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(Order::render).collect();
            params.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

fn compact_select(select: &str) -> String {
    select.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `*`
    All,
    /// A plain column.
    Column(String),
    /// A related table embedded under `alias`:
    /// `alias:table!fk_column(columns)` (alias and hint optional).
    Embed {
        alias: String,
        table: String,
        fk_hint: Option<String>,
        columns: Vec<SelectItem>,
    },
}

impl SelectItem {
    /// Parse a select list; malformed fragments are ignored.
    pub fn parse_list(select: &str) -> Vec<SelectItem> {
        split_top_level(select)
            .into_iter()
            .filter_map(|part| SelectItem::parse_one(&part))
            .collect()
    }

    fn parse_one(part: &str) -> Option<SelectItem> {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        if part == "*" {
            return Some(SelectItem::All);
        }
        let Some(open) = part.find('(') else {
            return Some(SelectItem::Column(part.to_string()));
        };
        let close = part.rfind(')')?;
        if close < open {
            return None;
        }
        let head = &part[..open];
        let inner = &part[open + 1..close];

        let (alias, target) = match head.split_once(':') {
            Some((alias, target)) => (Some(alias.trim()), target.trim()),
            None => (None, head.trim()),
        };
        let (table, fk_hint) = match target.split_once('!') {
            Some((table, hint)) => (table.trim(), Some(hint.trim().to_string())),
            None => (target, None),
        };

        Some(SelectItem::Embed {
            alias: alias.unwrap_or(table).to_string(),
            table: table.to_string(),
            fk_hint,
            columns: SelectItem::parse_list(inner),
        })
    }
}

fn split_top_level(select: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in select.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn renders_rest_params_in_order() {
        let q = Query::new()
            .select("*, category:item_categories(id, name)")
            .eq("active", true)
            .gte("transaction_date", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .order_asc("code")
            .order_desc("created_at")
            .limit(10);

        assert_eq!(
            q.to_params(),
            vec![
                ("select".into(), "*,category:item_categories(id,name)".into()),
                ("active".into(), "eq.true".into()),
                ("transaction_date".into(), "gte.2024-01-01".into()),
                ("order".into(), "code.asc,created_at.desc".into()),
                ("limit".into(), "10".into()),
            ]
        );
    }

    #[test]
    fn in_list_quotes_reserved_characters() {
        let f = Filter::in_list("status", &["draft", "sent, maybe"]);
        assert_eq!(f.to_param().1, "in.(draft,\"sent, maybe\")");
    }

    #[test]
    fn is_null_renders_keyword() {
        assert_eq!(Filter::is_null("category_id").to_param().1, "is.null");
    }

    #[test]
    fn parses_nested_select() {
        let items = SelectItem::parse_list(
            "*, item:items(code, description), from_warehouse:warehouses!from_warehouse_id(name), purchase_order_items(*)",
        );
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], SelectItem::All);
        assert_eq!(
            items[1],
            SelectItem::Embed {
                alias: "item".into(),
                table: "items".into(),
                fk_hint: None,
                columns: vec![
                    SelectItem::Column("code".into()),
                    SelectItem::Column("description".into())
                ],
            }
        );
        match &items[2] {
            SelectItem::Embed { alias, fk_hint, .. } => {
                assert_eq!(alias, "from_warehouse");
                assert_eq!(fk_hint.as_deref(), Some("from_warehouse_id"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &items[3] {
            SelectItem::Embed { alias, table, columns, .. } => {
                assert_eq!(alias, "purchase_order_items");
                assert_eq!(table, "purchase_order_items");
                assert_eq!(columns, &vec![SelectItem::All]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
