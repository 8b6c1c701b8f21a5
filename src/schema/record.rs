use super::RecordType;
use crate::{err, stmt::Value, Result};

/// The capability interface every persistable record type implements.
///
/// Implementations register their field descriptors once through
/// [`RecordType::builder`] and keep the result in a `OnceLock`:
///
/// ```rust,ignore
/// struct User {
///     pk: Option<i64>,
///     name: String,
///     tel: i64,
/// }
///
/// impl Record for User {
///     fn record_type() -> &'static RecordType {
///         static TYPE: OnceLock<RecordType> = OnceLock::new();
///         TYPE.get_or_init(|| {
///             RecordType::builder("users")
///                 .field(Field::new("name", ColumnType::Text).lookup())
///                 .field(Field::new("tel", ColumnType::Integer).definition("UNIQUE"))
///                 .build()
///                 .expect("valid record type")
///         })
///     }
///     // ...
/// }
/// ```
pub trait Record: Sized {
    /// The schema-level descriptor for this type, built once and reused.
    fn record_type() -> &'static RecordType;

    /// Current values of the persisted fields, in declaration order.
    fn values(&self) -> Vec<Value>;

    /// Decodes one row into a record.
    ///
    /// Columns are consumed positionally in declaration order, so name or
    /// order drift surfaces as a decode error rather than silently matching.
    fn from_row(row: Row) -> Result<Self>;

    /// The resolved primary-key value, populated after a create or read
    /// operation regardless of which column implements it.
    fn pk(&self) -> Value;

    fn set_pk(&mut self, pk: Value);

    /// Receives the engine-assigned row identifier after an insert when the
    /// primary-key column is a pseudo-sequential field rather than the
    /// implicit identifier. The default does nothing.
    fn set_assigned_key(&mut self, _key: Value) {}
}

/// One fetched row: the resolved `pk` value plus the persisted column
/// values in declaration order.
#[derive(Debug)]
pub struct Row {
    pk: Value,
    columns: std::vec::IntoIter<Value>,
}

impl Row {
    pub(crate) fn new(pk: Value, columns: Vec<Value>) -> Row {
        Row {
            pk,
            columns: columns.into_iter(),
        }
    }

    pub fn pk(&self) -> Value {
        self.pk.clone()
    }

    /// Takes the next column value. Fails when the row is exhausted, which
    /// indicates the decoder and the record type disagree on column count.
    pub fn next_column(&mut self) -> Result<Value> {
        self.columns
            .next()
            .ok_or_else(|| err!("row has no more columns to decode"))
    }
}
