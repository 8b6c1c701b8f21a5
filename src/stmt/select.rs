use crate::schema::RecordType;
use crate::stmt::{Filter, Value};

/// Builds a parameterized SELECT over a record type's columns.
///
/// The column list always starts with the primary-key column aliased to
/// `pk`, followed by the persisted fields in declaration order.
#[derive(Debug)]
pub struct Select<'a> {
    ty: &'a RecordType,
    table: &'a str,
    filter: Filter,
}

impl<'a> Select<'a> {
    pub fn new(ty: &'a RecordType, table: &'a str, filter: Filter) -> Select<'a> {
        Select { ty, table, filter }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "SELECT {} FROM {}{};",
            self.ty.select_columns().join(", "),
            self.table,
            self.filter.where_clause()
        )
    }

    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.filter.values()
    }
}
