mod error;
pub use error::Error;

pub mod codec;

pub mod schema;
pub use schema::{ColumnType, Field, Record, RecordType, RecordTypeBuilder, Row};

pub mod stmt;
pub use stmt::{Filter, Value};

mod table;
pub use table::{Table, TableBuilder};

/// A Result type alias that uses rowbind's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
