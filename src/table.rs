use crate::codec::{self, ConverterFn};
use crate::schema::{Record, RecordType, Row, ROWID};
use crate::stmt::{self, Filter, Value};
use crate::{Error, Result};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::any::Any;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Binds one record type to one physical table in one database file.
///
/// The binding is immutable for its lifetime. Connections are never cached:
/// every operation opens its own handle, runs inside a transaction and
/// commits on the success path; on failure the transaction drops without
/// committing. Construction creates the table if absent and validates its
/// shape against the record type, failing fast on a mismatch.
#[derive(Debug)]
pub struct Table<R: Record> {
    path: PathBuf,
    table_name: String,
    _record: PhantomData<R>,
}

impl<R: Record> Table<R> {
    /// Opens a binding with default options: the table is named after the
    /// record type and no codec hooks are registered.
    pub fn open(path: impl AsRef<Path>) -> Result<Table<R>> {
        Table::builder(path).open()
    }

    pub fn builder(path: impl AsRef<Path>) -> TableBuilder<R> {
        TableBuilder {
            path: path.as_ref().to_path_buf(),
            table_name: None,
            hooks: Vec::new(),
            _record: PhantomData,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Inserts the record and resolves its `pk`.
    ///
    /// For a `WITHOUT ROWID` type the record's own primary-key-column value
    /// becomes `pk`; otherwise the engine-assigned row identifier does, and
    /// a pseudo-sequential-key field additionally receives the assigned
    /// value through [`Record::set_assigned_key`].
    pub fn add(&self, record: &mut R) -> Result<()> {
        let ty = R::record_type();
        let values = record.values();
        let own_pk = ty.pk_field_index().map(|index| values[index].clone());
        let insert = stmt::Insert::new(ty, &self.table_name, values);

        let pk = self.with_connection(|conn| {
            let sql = insert.to_sql();
            debug!(table = %self.table_name, %sql, "add");
            conn.execute(&sql, params_from_iter(insert.params()))?;
            if ty.without_rowid() {
                own_pk.ok_or_else(|| crate::err!("no primary-key field on a WITHOUT ROWID type"))
            } else {
                Ok(Value::Integer(conn.last_insert_rowid()))
            }
        })?;

        if !ty.without_rowid() && ty.primary_key_column() != ROWID {
            record.set_assigned_key(pk.clone());
        }
        record.set_pk(pk);
        Ok(())
    }

    /// Fetches the single record whose lookup column equals `lookup`.
    ///
    /// Returns `Ok(None)` when nothing matches and a too-many-records error
    /// when more than one row does.
    pub fn get(&self, lookup: impl Into<Value>) -> Result<Option<R>> {
        let ty = R::record_type();
        self.get_one(ty.lookup_column(), lookup.into())
    }

    /// Like [`get`](Table::get), but returns `default` (moved, not cloned)
    /// when nothing matches.
    pub fn get_or(&self, lookup: impl Into<Value>, default: R) -> Result<R> {
        Ok(self.get(lookup)?.unwrap_or(default))
    }

    /// Fetches the single record whose primary-key column equals `pk`.
    pub fn get_by_pk(&self, pk: impl Into<Value>) -> Result<Option<R>> {
        let ty = R::record_type();
        self.get_one(ty.primary_key_column(), pk.into())
    }

    /// Fetches every record matching the filter, in insertion order.
    /// An empty filter returns all rows.
    pub fn get_by(&self, filter: Filter) -> Result<Vec<R>> {
        self.query(filter)
    }

    /// Fetches all records, in insertion order.
    pub fn get_all(&self) -> Result<Vec<R>> {
        self.query(Filter::new())
    }

    /// Writes the record's current field values to the row keyed by
    /// `record.pk()`. The primary-key column is never part of the SET
    /// clause. No existence check is made: updating an absent `pk` silently
    /// touches zero rows.
    pub fn update(&self, record: &R) -> Result<()> {
        let ty = R::record_type();
        let pk_column = ty.primary_key_column();
        let values = ty
            .fields()
            .iter()
            .zip(record.values())
            .filter(|(field, _)| field.name() != pk_column)
            .map(|(_, value)| value)
            .collect();
        let update = stmt::Update::new(ty, &self.table_name, values, record.pk());

        self.with_connection(|conn| {
            let sql = update.to_sql();
            debug!(table = %self.table_name, %sql, "update");
            conn.execute(&sql, params_from_iter(update.params()))?;
            Ok(())
        })
    }

    /// Deletes the row whose primary-key column equals `pk`. Deleting an
    /// absent `pk` is not an error.
    pub fn delete(&self, pk: impl Into<Value>) -> Result<()> {
        let ty = R::record_type();
        let delete = stmt::Delete::new(ty, &self.table_name, pk.into());

        self.with_connection(|conn| {
            let sql = delete.to_sql();
            debug!(table = %self.table_name, %sql, "delete");
            conn.execute(&sql, params_from_iter(delete.params()))?;
            Ok(())
        })
    }

    fn get_one(&self, column: &str, value: Value) -> Result<Option<R>> {
        let mut records = self.query(Filter::new().eq(column, value))?;
        if records.len() > 1 {
            return Err(Error::too_many_records(format!(
                "column {} of table {} matched {} rows",
                column,
                self.table_name,
                records.len()
            )));
        }
        Ok(records.pop())
    }

    fn query(&self, filter: Filter) -> Result<Vec<R>> {
        let ty = R::record_type();
        let select = stmt::Select::new(ty, &self.table_name, filter);

        self.with_connection(|conn| {
            let sql = select.to_sql();
            debug!(table = %self.table_name, %sql, "query");
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(select.params()))?;

            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(R::from_row(decode_row(ty, row)?)?);
            }
            Ok(records)
        })
    }

    /// Ensures the table exists and matches the record type's shape.
    fn prepare(&self) -> Result<()> {
        let ty = R::record_type();
        let create = stmt::CreateTable::new(ty, &self.table_name);

        self.with_connection(|conn| {
            conn.execute(&create.to_sql(), [])?;
            if !self.validate_schema(ty, conn)? {
                return Err(Error::invalid_schema(format!(
                    "table {} does not match record type {}",
                    self.table_name,
                    ty.name()
                )));
            }
            Ok(())
        })
    }

    /// Compares the live table against the record type: the stored table
    /// definition must agree on `WITHOUT ROWID`, and the live column names
    /// must equal the declared column names as an unordered set. Type and
    /// constraint drift is deliberately not detected.
    fn validate_schema(&self, ty: &RecordType, conn: &Connection) -> Result<bool> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = ?",
                [&self.table_name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            return Ok(false);
        };
        let without_rowid = stored.to_lowercase().contains("without rowid");

        let stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 1", self.table_name))?;
        let live: HashSet<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let declared: HashSet<String> = ty
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        Ok(without_rowid == ty.without_rowid() && live == declared)
    }

    /// Opens a handle scoped to one logical operation: the closure's
    /// statements commit together on success; on failure the transaction is
    /// dropped uncommitted and the handle closed.
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

/// Decodes one fetched row: the `pk` column followed by the persisted
/// fields in declaration order, each routed through a registered converter
/// when its declared datatype has one.
fn decode_row(ty: &RecordType, row: &rusqlite::Row<'_>) -> Result<Row> {
    let pk = codec::decode(ty.primary_key_datatype(), Value::from_sql(row, 0)?)?;

    let mut columns = Vec::with_capacity(ty.columns().len());
    for (index, column) in ty.columns().iter().enumerate() {
        let raw = Value::from_sql(row, index + 1)?;
        columns.push(codec::decode(column.datatype(), raw)?);
    }

    Ok(Row::new(pk, columns))
}

/// Configures and opens a [`Table`] binding.
pub struct TableBuilder<R: Record> {
    path: PathBuf,
    table_name: Option<String>,
    hooks: Vec<Box<dyn FnOnce()>>,
    _record: PhantomData<R>,
}

impl<R: Record> TableBuilder<R> {
    /// Overrides the table name; defaults to the record type's name.
    pub fn table_name(mut self, name: impl Into<String>) -> TableBuilder<R> {
        self.table_name = Some(name.into());
        self
    }

    /// Queues an encode hook to register at open time.
    ///
    /// Registration is process-wide and permanent; see [`codec`].
    pub fn adapter<T: Any + Send + Sync>(mut self, adapt: fn(&T) -> Value) -> TableBuilder<R> {
        self.hooks
            .push(Box::new(move || codec::register_adapter::<T>(adapt)));
        self
    }

    /// Queues a decode hook for the given declared datatype name.
    ///
    /// Registration is process-wide and permanent; see [`codec`].
    pub fn converter(mut self, datatype: impl Into<String>, convert: ConverterFn) -> TableBuilder<R> {
        let datatype = datatype.into();
        self.hooks
            .push(Box::new(move || codec::register_converter(&datatype, convert)));
        self
    }

    /// Registers the queued codec hooks, creates the table if absent and
    /// validates its shape. Fails fatally on a schema mismatch; a failed
    /// construction leaves no usable binding.
    pub fn open(self) -> Result<Table<R>> {
        for hook in self.hooks {
            hook();
        }

        let ty = R::record_type();
        let table = Table {
            path: self.path,
            table_name: self
                .table_name
                .unwrap_or_else(|| ty.name().to_string()),
            _record: PhantomData,
        };
        table.prepare()?;

        info!(
            table = %table.table_name,
            path = %table.path.display(),
            record_type = ty.name(),
            "table ready"
        );
        Ok(table)
    }
}
