//! SQL assembly for raw filter fragments.
//!
//! Predicates, the sort field and table/column names are written into the
//! statement exactly as given. Only filter arguments become bind parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabula_data::{Filter, SortDirection};

/// Placeholder and upsert flavour of the target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders.
    #[serde(rename = "mysql")]
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    /// Guess the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Dialect::Sqlite,
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            _ => Dialect::Generic,
        }
    }

    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    /// `LIMIT` value meaning "no limit", for databases that reject a bare `OFFSET`.
    fn unbounded_limit(self) -> Option<&'static str> {
        match self {
            Dialect::Postgres => None,
            Dialect::MySql => Some("18446744073709551615"),
            Dialect::Generic | Dialect::Sqlite => Some("-1"),
        }
    }
}

/// Builder for the `SELECT` and `COUNT` statements of one query handle.
///
/// # Example
///
/// ```ignore
/// let (sql, params) = SelectBuilder::new("users")
///     .filter(&Filter::new("name LIKE ?", "%alice%"))
///     .filter(&Filter::new("id IN ?", vec![1, 2]))
///     .order_by("updated_at", SortDirection::Desc)
///     .limit(10)
///     .build_select("id, name");
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    filters: Vec<Filter>,
    order: Option<(String, SortDirection)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
}

impl SelectBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
        }
    }

    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn filter(mut self, filter: &Filter) -> Self {
        self.filters.push(filter.clone());
        self
    }

    /// Replaces any earlier ordering.
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn has_order(&self) -> bool {
        self.order.is_some()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Build a SELECT query returning `(sql, bind_values)`.
    pub fn build_select(&self, columns: &str) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {columns} FROM {}", self.table);
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx);
        self.append_order(&mut sql);
        self.append_limit_offset(&mut sql);
        (sql, params)
    }

    /// Build a COUNT query returning `(sql, bind_values)`. Ordering and paging are left out.
    pub fn build_count(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;
        self.append_where(&mut sql, &mut params, &mut placeholder_idx);
        (sql, params)
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<Value>, placeholder_idx: &mut usize) {
        if self.filters.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        let mut first = true;
        for filter in &self.filters {
            if !first {
                sql.push_str(" AND ");
            }
            first = false;
            sql.push('(');
            sql.push_str(&expand_predicate(
                &filter.query,
                &filter.args,
                self.dialect,
                params,
                placeholder_idx,
            ));
            sql.push(')');
        }
    }

    fn append_order(&self, sql: &mut String) {
        if let Some((column, direction)) = &self.order {
            sql.push_str(&format!(" ORDER BY {column} {direction}"));
        }
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match (self.limit_val, self.offset_val) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    sql.push_str(&format!(" LIMIT {unbounded}"));
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = self.offset_val {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }
}

/// Replace each `?` outside single-quoted literals with a placeholder bound to `args`.
///
/// A JSON array argument expands to a parenthesised placeholder list, one per element.
/// An empty array renders as `(NULL)` so `IN ?` stays valid and matches nothing.
fn expand_predicate(
    predicate: &str,
    args: &Value,
    dialect: Dialect,
    params: &mut Vec<Value>,
    placeholder_idx: &mut usize,
) -> String {
    let mut out = String::with_capacity(predicate.len());
    let mut in_literal = false;
    for c in predicate.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => match args {
                Value::Array(items) if items.is_empty() => out.push_str("(NULL)"),
                Value::Array(items) => {
                    let placeholders: Vec<_> = items
                        .iter()
                        .map(|item| {
                            let placeholder = dialect.placeholder(*placeholder_idx);
                            *placeholder_idx += 1;
                            params.push(item.clone());
                            placeholder
                        })
                        .collect();
                    out.push_str(&format!("({})", placeholders.join(", ")));
                }
                other => {
                    out.push_str(&dialect.placeholder(*placeholder_idx));
                    *placeholder_idx += 1;
                    params.push(other.clone());
                }
            },
            _ => out.push(c),
        }
    }
    out
}

fn placeholders(dialect: Dialect, count: usize) -> String {
    (1..=count)
        .map(|i| dialect.placeholder(i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO table (cols) VALUES (...)`.
pub fn build_insert(table: &str, columns: &[&str], dialect: Dialect) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders(dialect, columns.len())
    )
}

/// Insert-or-replace keyed on `id_column`; every other column is overwritten.
pub fn build_upsert(table: &str, columns: &[&str], id_column: &str, dialect: Dialect) -> String {
    let insert = build_insert(table, columns, dialect);
    let rest: Vec<&str> = columns.iter().copied().filter(|c| *c != id_column).collect();
    match dialect {
        Dialect::MySql => {
            let assignments = if rest.is_empty() {
                format!("{id_column} = {id_column}")
            } else {
                rest.iter()
                    .map(|c| format!("{c} = VALUES({c})"))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{insert} ON DUPLICATE KEY UPDATE {assignments}")
        }
        Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => {
            if rest.is_empty() {
                format!("{insert} ON CONFLICT ({id_column}) DO NOTHING")
            } else {
                let assignments = rest
                    .iter()
                    .map(|c| format!("{c} = excluded.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{insert} ON CONFLICT ({id_column}) DO UPDATE SET {assignments}")
            }
        }
    }
}

/// `DELETE FROM table WHERE id_column = ?`.
pub fn build_delete(table: &str, id_column: &str, dialect: Dialect) -> String {
    format!("DELETE FROM {table} WHERE {id_column} = {}", dialect.placeholder(1))
}
