mod field;
pub use field::{ColumnType, Field};

mod record;
pub use record::{Record, Row};

mod record_type;
pub use record_type::{Column, RecordType, RecordTypeBuilder, ROWID};
