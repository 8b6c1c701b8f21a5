use super::Field;
use crate::{Error, Result};

/// The engine's implicit default row identifier name.
pub const ROWID: &str = "rowid";

/// A materialized column of the generated table definition.
#[derive(Debug, Clone)]
pub struct Column {
    name: &'static str,
    datatype: &'static str,
    definition: &'static str,
}

impl Column {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn datatype(&self) -> &'static str {
        self.datatype
    }

    pub fn definition(&self) -> &'static str {
        self.definition
    }
}

/// The schema-level description of a record type.
///
/// Built once per type via [`RecordType::builder`], then treated as an
/// immutable constant; every derived fact below is a pure function of the
/// declaration. All validation happens in [`RecordTypeBuilder::build`], so
/// the accessors are infallible.
#[derive(Debug)]
pub struct RecordType {
    name: &'static str,
    fields: Vec<Field>,
    columns: Vec<Column>,
    without_rowid: bool,
    table_constraints: Option<&'static str>,
    primary_key_column: &'static str,
    lookup_column: &'static str,
}

impl RecordType {
    pub fn builder(name: &'static str) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name,
            fields: Vec::new(),
            without_rowid: false,
            table_constraints: None,
        }
    }

    /// The declared type name, used as the default table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The persisted fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// True if the generated table drops the engine's implicit row
    /// identifier.
    pub fn without_rowid(&self) -> bool {
        self.without_rowid
    }

    /// The table-level constraint clause, if any.
    pub fn table_constraints(&self) -> Option<&'static str> {
        self.table_constraints
    }

    /// The column uniquely identifying a row: the field carrying a
    /// `PRIMARY KEY` marker, a single-column table-level constraint, or the
    /// engine's implicit identifier.
    pub fn primary_key_column(&self) -> &'static str {
        self.primary_key_column
    }

    /// The column used for single-value lookup; falls back to the
    /// primary-key column when no field is flagged.
    pub fn lookup_column(&self) -> &'static str {
        self.lookup_column
    }

    /// The ordered `(name, datatype, definition)` column schema.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column list for SELECT statements: the primary-key column aliased to
    /// `pk`, followed by every persisted field name in declaration order.
    pub fn select_columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.fields.len() + 1);
        columns.push(format!("{} AS pk", self.primary_key_column));
        columns.extend(self.fields.iter().map(|field| field.name().to_string()));
        columns
    }

    /// Column list for INSERT statements.
    pub fn insert_columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name()).collect()
    }

    /// Column list for UPDATE assignments: every persisted field except the
    /// primary-key column itself.
    pub fn update_columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|field| field.name())
            .filter(|name| *name != self.primary_key_column)
            .collect()
    }

    /// Index of the primary-key column among the persisted fields, `None`
    /// when the implicit row identifier is in use.
    pub(crate) fn pk_field_index(&self) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name() == self.primary_key_column)
    }

    /// The declared datatype of the primary-key column, used to route the
    /// decoded `pk` value through a registered converter.
    pub(crate) fn primary_key_datatype(&self) -> &'static str {
        self.pk_field_index()
            .map(|index| self.columns[index].datatype)
            .unwrap_or("INTEGER")
    }
}

/// Builds and validates a [`RecordType`].
///
/// Declaration errors surface here, at definition time, never from the
/// derived accessors.
pub struct RecordTypeBuilder {
    name: &'static str,
    fields: Vec<Field>,
    without_rowid: bool,
    table_constraints: Option<&'static str>,
}

impl RecordTypeBuilder {
    /// Declares a persisted field. Declaration order is preserved
    /// everywhere; columns are never re-sorted.
    pub fn field(mut self, field: Field) -> RecordTypeBuilder {
        self.fields.push(field);
        self
    }

    /// Generates the table `WITHOUT ROWID`. Requires a field (or
    /// single-column table constraint) carrying a `PRIMARY KEY` marker.
    pub fn without_rowid(mut self) -> RecordTypeBuilder {
        self.without_rowid = true;
        self
    }

    /// Appends a table-level constraint clause to the table definition,
    /// e.g. `"UNIQUE(name, last_name)"`.
    pub fn table_constraints(mut self, constraints: &'static str) -> RecordTypeBuilder {
        self.table_constraints = Some(constraints);
        self
    }

    pub fn build(self) -> Result<RecordType> {
        if self.fields.is_empty() {
            return Err(Error::invalid_record_type(format!(
                "{}: no persisted fields defined",
                self.name
            )));
        }

        let mut columns = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let Some(datatype) = field.resolve_datatype() else {
                return Err(Error::invalid_record_type(format!(
                    "{}: field {} has an ambiguous column type and no datatype override",
                    self.name,
                    field.name()
                )));
            };
            columns.push(Column {
                name: field.name(),
                datatype,
                definition: field.definition_clause(),
            });
        }

        let mut primary_key = match self.table_constraints {
            Some(constraints) => table_constraint_pk(self.name, constraints)?,
            None => None,
        };

        for field in &self.fields {
            if !field.is_primary_key() {
                continue;
            }
            if primary_key.is_some() {
                return Err(Error::invalid_record_type(format!(
                    "{}: multiple primary keys defined",
                    self.name
                )));
            }
            primary_key = Some(field.name());
        }

        if primary_key.is_none() && self.without_rowid {
            return Err(Error::invalid_record_type(format!(
                "{}: no primary key defined for a WITHOUT ROWID type",
                self.name
            )));
        }

        let primary_key_column = primary_key.unwrap_or(ROWID);

        let lookup_column = self
            .fields
            .iter()
            .find(|field| field.is_lookup())
            .map(|field| field.name())
            .unwrap_or(primary_key_column);

        Ok(RecordType {
            name: self.name,
            fields: self.fields,
            columns,
            without_rowid: self.without_rowid,
            table_constraints: self.table_constraints,
            primary_key_column,
            lookup_column,
        })
    }
}

/// Resolves a primary key named by a table-level constraint clause.
///
/// Composite keys are rejected outright.
fn table_constraint_pk(
    type_name: &str,
    constraints: &'static str,
) -> Result<Option<&'static str>> {
    // ASCII lowercasing preserves byte offsets, so indexes found on the
    // lowered copy stay valid on the original
    let lower = constraints.to_ascii_lowercase();
    let Some(start) = lower.find("primary key") else {
        return Ok(None);
    };

    let rest = &constraints[start + "primary key".len()..];
    let column = rest
        .find('(')
        .and_then(|open| {
            let inner = &rest[open + 1..];
            inner.find(')').map(|close| inner[..close].trim())
        })
        .ok_or_else(|| {
            Error::invalid_record_type(format!(
                "{type_name}: table-level PRIMARY KEY constraint must name a column"
            ))
        })?;

    if column.contains(',') {
        return Err(Error::invalid_record_type(format!(
            "{type_name}: multiple column primary keys are not supported"
        )));
    }

    Ok(Some(column))
}
