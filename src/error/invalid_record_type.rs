use super::Error;

/// Error when a record type declaration is malformed.
///
/// This occurs when:
/// - A record type declares no persisted fields
/// - More than one field carries a `PRIMARY KEY` marker
/// - A type declares `without_rowid` with no primary-key marker anywhere
/// - A field with an ambiguous column type has no explicit datatype override
/// - A table-level constraint declares a composite primary key
///
/// These errors are caught when the record type is built, never at call time.
#[derive(Debug)]
pub(super) struct InvalidRecordTypeError {
    message: Box<str>,
}

impl std::error::Error for InvalidRecordTypeError {}

impl core::fmt::Display for InvalidRecordTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid record type: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid record type error.
    pub fn invalid_record_type(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidRecordType(InvalidRecordTypeError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid record type error.
    pub fn is_invalid_record_type(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidRecordType(_))
    }
}
