//! An in-memory `Store` that understands `<field> <op> ?` predicates and
//! records every statement it is asked to run.

#![allow(dead_code)]

use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tabula_data::{Filter, ModelQuery, SortDirection, Store};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub updated_at: i64,
    pub posts: Vec<String>,
}

impl User {
    pub fn new(id: i64, name: &str, updated_at: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            updated_at,
            posts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Count {
        filters: Vec<String>,
    },
    First {
        filters: Vec<String>,
        preloads: Vec<String>,
    },
    All {
        filters: Vec<String>,
        preloads: Vec<String>,
        order: Option<(String, SortDirection)>,
        offset: Option<u64>,
        limit: Option<u64>,
    },
    Insert(i64),
    Save(i64),
    Delete(i64),
}

#[derive(Default)]
pub struct MockStore {
    rows: Mutex<Vec<User>>,
    calls: Mutex<Vec<Call>>,
    fail_count: bool,
}

impl MockStore {
    pub fn new(rows: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// 25 users, `updated_at = id * 10`, so higher ids are newer.
    pub fn with_users(count: i64) -> Self {
        Self::new((1..=count).map(|id| User::new(id, &format!("user-{id}"), id * 10)).collect())
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn rows(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct MockQuery<'a> {
    store: &'a MockStore,
    filters: Vec<Filter>,
    preloads: Vec<String>,
    order: Option<(String, SortDirection)>,
    offset: Option<u64>,
    limit: Option<u64>,
}

fn field(user: &User, name: &str) -> Result<Value, MockError> {
    match name {
        "id" => Ok(Value::from(user.id)),
        "name" => Ok(Value::from(user.name.clone())),
        "updated_at" => Ok(Value::from(user.updated_at)),
        other => Err(MockError(format!("no such column: {other}"))),
    }
}

fn matches(user: &User, filter: &Filter) -> Result<bool, MockError> {
    let parts: Vec<&str> = filter.query.split_whitespace().collect();
    let [column, op, "?"] = parts.as_slice() else {
        return Err(MockError(format!("syntax error near \"{}\"", filter.query)));
    };
    let value = field(user, column)?;
    let ordering = match (&value, &filter.args) {
        (Value::Number(a), Value::Number(b)) => a.as_i64().cmp(&b.as_i64()),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => return Ok(false),
    };
    match *op {
        "=" => Ok(ordering.is_eq()),
        ">" => Ok(ordering.is_gt()),
        "<" => Ok(ordering.is_lt()),
        other => Err(MockError(format!("unsupported operator {other}"))),
    }
}

fn preload(rows: &mut [User], preloads: &[String]) -> Result<(), MockError> {
    for relation in preloads {
        if relation != "posts" {
            return Err(MockError(format!("unsupported relation {relation}")));
        }
        for row in rows.iter_mut() {
            row.posts = vec![format!("post-of-{}", row.id)];
        }
    }
    Ok(())
}

impl MockQuery<'_> {
    fn filter_names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.query.clone()).collect()
    }

    fn matching(&self) -> Result<Vec<User>, MockError> {
        let mut out = Vec::new();
        for row in self.store.rows.lock().unwrap().iter() {
            let mut keep = true;
            for filter in &self.filters {
                keep &= matches(row, filter)?;
            }
            if keep {
                out.push(row.clone());
            }
        }
        Ok(out)
    }

    fn sorted(&self, mut rows: Vec<User>) -> Result<Vec<User>, MockError> {
        let (column, direction) = self
            .order
            .clone()
            .unwrap_or_else(|| ("id".to_string(), SortDirection::Asc));
        for row in &rows {
            field(row, &column)?;
        }
        rows.sort_by(|a, b| {
            let ord = match column.as_str() {
                "name" => a.name.cmp(&b.name),
                "updated_at" => a.updated_at.cmp(&b.updated_at),
                _ => a.id.cmp(&b.id),
            };
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(rows)
    }
}

impl ModelQuery<User> for MockQuery<'_> {
    type Error = MockError;

    fn filter(mut self, filter: &Filter) -> Self {
        self.filters.push(filter.clone());
        self
    }

    fn preload(mut self, relation: &str) -> Self {
        self.preloads.push(relation.to_string());
        self
    }

    fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn count(self) -> impl Future<Output = Result<i64, MockError>> + Send {
        self.store.record(Call::Count {
            filters: self.filter_names(),
        });
        let result = if self.store.fail_count {
            Err(MockError("database is locked".into()))
        } else {
            self.matching().map(|rows| rows.len() as i64)
        };
        std::future::ready(result)
    }

    fn first(self) -> impl Future<Output = Result<Option<User>, MockError>> + Send {
        self.store.record(Call::First {
            filters: self.filter_names(),
            preloads: self.preloads.clone(),
        });
        let result = self
            .matching()
            .and_then(|rows| self.sorted(rows))
            .and_then(|rows| {
                let mut first: Vec<User> = rows.into_iter().take(1).collect();
                preload(&mut first, &self.preloads)?;
                Ok(first.pop())
            });
        std::future::ready(result)
    }

    fn all(self) -> impl Future<Output = Result<Vec<User>, MockError>> + Send {
        self.store.record(Call::All {
            filters: self.filter_names(),
            preloads: self.preloads.clone(),
            order: self.order.clone(),
            offset: self.offset,
            limit: self.limit,
        });
        let result = self
            .matching()
            .and_then(|rows| self.sorted(rows))
            .and_then(|rows| {
                let skip = self.offset.unwrap_or(0) as usize;
                let take = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
                let mut page: Vec<User> = rows.into_iter().skip(skip).take(take).collect();
                preload(&mut page, &self.preloads)?;
                Ok(page)
            });
        std::future::ready(result)
    }
}

impl Store<User> for MockStore {
    type Error = MockError;
    type Query<'a> = MockQuery<'a>;

    fn model(&self) -> MockQuery<'_> {
        MockQuery {
            store: self,
            filters: Vec::new(),
            preloads: Vec::new(),
            order: None,
            offset: None,
            limit: None,
        }
    }

    fn insert(&self, value: &User) -> impl Future<Output = Result<(), MockError>> + Send {
        self.record(Call::Insert(value.id));
        let mut rows = self.rows.lock().unwrap();
        let result = if rows.iter().any(|r| r.id == value.id) {
            Err(MockError("UNIQUE constraint failed: users.id".into()))
        } else {
            rows.push(value.clone());
            Ok(())
        };
        std::future::ready(result)
    }

    fn save(&self, value: &User) -> impl Future<Output = Result<(), MockError>> + Send {
        self.record(Call::Save(value.id));
        let mut rows = self.rows.lock().unwrap();
        match rows.iter().position(|r| r.id == value.id) {
            Some(index) => rows[index] = value.clone(),
            None => rows.push(value.clone()),
        }
        std::future::ready(Ok(()))
    }

    fn delete(&self, value: &User) -> impl Future<Output = Result<(), MockError>> + Send {
        self.record(Call::Delete(value.id));
        self.rows.lock().unwrap().retain(|r| r.id != value.id);
        std::future::ready(Ok(()))
    }
}

/// Collects `tracing` output so tests can assert on logged warnings.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
