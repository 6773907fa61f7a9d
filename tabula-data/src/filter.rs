use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single where-condition: raw predicate text plus the argument bound to it.
///
/// The predicate is handed to the store untouched. It is never parsed,
/// validated or escaped here; only the argument goes through the driver's
/// parameter binding. Treat `query` as trusted input.
///
/// # Example
///
/// ```
/// use tabula_data::Filter;
///
/// let by_name = Filter::new("name = ?", "alice");
/// let by_ids = Filter::new("id IN ?", vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub query: String,
    #[serde(default)]
    pub args: Value,
}

impl Filter {
    pub fn new(query: impl Into<String>, args: impl Into<Value>) -> Self {
        Self {
            query: query.into(),
            args: args.into(),
        }
    }

    /// A predicate that carries no argument, e.g. `deleted_at IS NULL`.
    pub fn raw(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            args: Value::Null,
        }
    }
}
