/// Errors returned by the query engine.
///
/// `E` is the store's own error type. Store failures are carried as-is:
/// `Display` and `source()` defer to the inner error without adding context.
#[derive(Debug)]
pub enum DataError<E> {
    /// No store handle was supplied.
    NoClient,
    Store(E),
}

impl<E> DataError<E> {
    pub fn is_no_client(&self) -> bool {
        matches!(self, DataError::NoClient)
    }

    /// The underlying store error, if any.
    pub fn store_error(&self) -> Option<&E> {
        match self {
            DataError::Store(err) => Some(err),
            DataError::NoClient => None,
        }
    }

    pub fn into_store_error(self) -> Option<E> {
        match self {
            DataError::Store(err) => Some(err),
            DataError::NoClient => None,
        }
    }
}

impl<E> From<E> for DataError<E> {
    fn from(err: E) -> Self {
        DataError::Store(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for DataError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NoClient => write!(f, "No database client available"),
            DataError::Store(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl<E: std::error::Error> std::error::Error for DataError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Store(err) => err.source(),
            DataError::NoClient => None,
        }
    }
}
