use crate::schema::RecordType;
use crate::stmt::Value;

/// Builds a parameterized DELETE keyed by the primary-key column.
#[derive(Debug)]
pub struct Delete<'a> {
    table: &'a str,
    pk_column: &'static str,
    pk: Value,
}

impl<'a> Delete<'a> {
    pub fn new(ty: &RecordType, table: &'a str, pk: Value) -> Delete<'a> {
        Delete {
            table,
            pk_column: ty.primary_key_column(),
            pk,
        }
    }

    pub fn to_sql(&self) -> String {
        format!("DELETE FROM {} WHERE {} = ?;", self.table, self.pk_column)
    }

    pub fn params(&self) -> &[Value] {
        std::slice::from_ref(&self.pk)
    }
}
