use serde::Serialize;
use serde_json::Value;
use sqlx::any::AnyArguments;
use sqlx::Arguments;
use tabula_data::Entity;

/// Turn JSON parameters into driver arguments.
///
/// Integers bind as `i64`, other numbers as `f64`. Unsigned values above
/// `i64::MAX` are rejected rather than rounded. Arrays and objects that
/// reach this point bind as their JSON text.
pub(crate) fn arguments<'q>(params: &[Value]) -> Result<AnyArguments<'q>, sqlx::Error> {
    let mut args = AnyArguments::default();
    for value in params {
        let added = match value {
            Value::Null => args.add(Option::<String>::None),
            Value::Bool(b) => args.add(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => args.add(i),
                (None, Some(u), _) => {
                    return Err(sqlx::Error::Encode(
                        format!("unsigned value {u} does not fit a signed 64-bit parameter").into(),
                    ))
                }
                (None, None, Some(f)) => args.add(f),
                (None, None, None) => {
                    return Err(sqlx::Error::Encode(format!("number {n} cannot be bound").into()))
                }
            },
            Value::String(s) => args.add(s.clone()),
            other => args.add(other.to_string()),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Column values of `entity`, read from its serde representation, in `T::columns()` order.
pub(crate) fn column_values<T>(entity: &T) -> Result<Vec<(&'static str, Value)>, sqlx::Error>
where
    T: Entity + Serialize,
{
    let json = serde_json::to_value(entity).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let Value::Object(mut fields) = json else {
        return Err(sqlx::Error::Encode(
            format!("entity for table {} does not serialize to a map", T::table_name()).into(),
        ));
    };
    Ok(T::columns()
        .iter()
        .map(|column| (*column, fields.remove(*column).unwrap_or(Value::Null)))
        .collect())
}

/// Whether a primary key value means "not assigned yet".
pub(crate) fn is_unset_key(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
