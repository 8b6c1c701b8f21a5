use crate::schema::RecordType;
use crate::stmt::Value;

/// Builds a parameterized UPDATE keyed by the primary-key column.
///
/// The primary-key column itself never appears in the SET clause.
#[derive(Debug)]
pub struct Update<'a> {
    table: &'a str,
    columns: Vec<&'static str>,
    pk_column: &'static str,
    params: Vec<Value>,
}

impl<'a> Update<'a> {
    /// `values` must match [`RecordType::update_columns`] in length and
    /// order; `pk` is the row key.
    pub fn new(ty: &RecordType, table: &'a str, values: Vec<Value>, pk: Value) -> Update<'a> {
        let mut params = values;
        params.push(pk);
        Update {
            table,
            columns: ty.update_columns(),
            pk_column: ty.primary_key_column(),
            params,
        }
    }

    pub fn to_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {} WHERE {} = ?;",
            self.table, assignments, self.pk_column
        )
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
