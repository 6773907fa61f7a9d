use serde::Serialize;

/// A row type whose serialized field names are its table's column names.
///
/// Store backends use it to name the table and to locate the primary key for
/// save and delete. Column values are read from the entity's `Serialize`
/// representation, so `columns()` must match the serialized field names.
///
/// # Example
///
/// ```ignore
/// impl Entity for User {
///     type Id = i64;
///     fn table_name() -> &'static str { "users" }
///     fn id_column() -> &'static str { "id" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "updated_at"] }
///     fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    type Id: Serialize + Send + Sync + 'static;

    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    fn columns() -> &'static [&'static str];
    fn id(&self) -> &Self::Id;
}
