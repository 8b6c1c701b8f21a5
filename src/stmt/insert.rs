use crate::schema::RecordType;
use crate::stmt::Value;

/// Builds a parameterized INSERT for one record's values.
#[derive(Debug)]
pub struct Insert<'a> {
    table: &'a str,
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl<'a> Insert<'a> {
    /// `values` must be the record's persisted field values in declaration
    /// order, as produced by [`Record::values`](crate::Record::values).
    pub fn new(ty: &RecordType, table: &'a str, values: Vec<Value>) -> Insert<'a> {
        Insert {
            table,
            columns: ty.insert_columns(),
            values,
        }
    }

    pub fn to_sql(&self) -> String {
        let placeholders = vec!["?"; self.values.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table,
            self.columns.join(", "),
            placeholders
        )
    }

    pub fn params(&self) -> &[Value] {
        &self.values
    }
}
