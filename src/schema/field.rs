/// The storage class a persisted field maps to.
///
/// `Any` marks a field whose values do not map to a single storage class;
/// such a field must declare an explicit datatype override or the record
/// type is rejected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Any,
}

impl ColumnType {
    pub(crate) fn default_datatype(self) -> Option<&'static str> {
        match self {
            ColumnType::Integer => Some("INTEGER"),
            ColumnType::Real => Some("REAL"),
            ColumnType::Text => Some("TEXT"),
            ColumnType::Blob => Some("BLOB"),
            ColumnType::Any => None,
        }
    }
}

/// Declarative description of one persisted field of a record type.
///
/// Fields handed to the [`RecordTypeBuilder`](crate::RecordTypeBuilder) are
/// persisted by definition; a record struct may carry any number of Rust
/// fields that never reach the database simply by not declaring them.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    ty: ColumnType,
    datatype: Option<&'static str>,
    definition: Option<&'static str>,
    lookup: bool,
    pseudo_key: bool,
}

impl Field {
    pub fn new(name: &'static str, ty: ColumnType) -> Field {
        Field {
            name,
            ty,
            datatype: None,
            definition: None,
            lookup: false,
            pseudo_key: false,
        }
    }

    /// Overrides the column datatype name used in the table definition.
    ///
    /// Without an override the datatype derives from the field's
    /// [`ColumnType`].
    pub fn datatype(mut self, datatype: &'static str) -> Field {
        self.datatype = Some(datatype);
        self
    }

    /// Sets the column definition clause, e.g. `"UNIQUE"` or `"PRIMARY KEY"`.
    pub fn definition(mut self, definition: &'static str) -> Field {
        self.definition = Some(definition);
        self
    }

    /// Marks this field as the one used for human-meaningful key lookup.
    ///
    /// At most one field per record type may carry this flag.
    pub fn lookup(mut self) -> Field {
        self.lookup = true;
        self
    }

    /// Marks this field as a pseudo-sequential key: it substitutes for the
    /// engine-assigned row identifier under a caller-chosen name and receives
    /// the assigned value after insert.
    pub fn pseudo_key(mut self) -> Field {
        self.pseudo_key = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.ty
    }

    pub fn definition_clause(&self) -> &'static str {
        self.definition.unwrap_or("")
    }

    pub fn is_lookup(&self) -> bool {
        self.lookup
    }

    pub fn is_pseudo_key(&self) -> bool {
        self.pseudo_key
    }

    /// True if the definition clause carries a case-insensitive
    /// `PRIMARY KEY` marker.
    pub fn is_primary_key(&self) -> bool {
        self.definition
            .map(|definition| definition.to_lowercase().contains("primary key"))
            .unwrap_or(false)
    }

    /// The datatype name for the table definition: the explicit override if
    /// present, else the default for the field's column type.
    pub(crate) fn resolve_datatype(&self) -> Option<&'static str> {
        self.datatype.or_else(|| self.ty.default_datatype())
    }
}
