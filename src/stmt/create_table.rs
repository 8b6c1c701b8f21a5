use crate::schema::RecordType;

/// Builds the table-definition statement for a record type.
///
/// The generated text is a persisted artifact: column order and definition
/// text must match the record type's schema for validation to succeed when
/// the table is reopened.
#[derive(Debug)]
pub struct CreateTable<'a> {
    ty: &'a RecordType,
    table: &'a str,
}

impl<'a> CreateTable<'a> {
    pub fn new(ty: &'a RecordType, table: &'a str) -> CreateTable<'a> {
        CreateTable { ty, table }
    }

    pub fn to_sql(&self) -> String {
        let mut columns = self
            .ty
            .columns()
            .iter()
            .map(|column| {
                if column.definition().is_empty() {
                    format!("{} {}", column.name(), column.datatype())
                } else {
                    format!(
                        "{} {} {}",
                        column.name(),
                        column.datatype(),
                        column.definition()
                    )
                }
            })
            .collect::<Vec<_>>();

        if let Some(constraints) = self.ty.table_constraints() {
            columns.push(constraints.to_string());
        }

        let without_rowid = if self.ty.without_rowid() {
            " WITHOUT ROWID"
        } else {
            ""
        };

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({}){};",
            self.table,
            columns.join(", "),
            without_rowid
        )
    }
}
