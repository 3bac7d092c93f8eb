use crate::track::{render_path, PathKey};
use num_bigint::BigInt;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while packing or unpacking, without the location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed bytes-like input: bad hex, a missing `0x` prefix or array elements outside of 0-255
    #[error("Invalid bytes-like input: {0}")]
    Format(String),
    #[error("Value must be between {min} and {max}, but got {got}")]
    Range { min: BigInt, max: BigInt, got: BigInt },
    #[error("Invalid buffer length: {actual}, should be {expected}")]
    Length { expected: usize, actual: usize },
    #[error("Invalid buffer length: {actual}, should be at least {expected}")]
    MinLength { expected: usize, actual: usize },
    #[error("Invalid item count: {actual}, should be {expected}")]
    Count { expected: usize, actual: usize },
    #[error("Length {0} exceeds maximum {max}", max = u32::MAX)]
    TooLarge(usize),
    #[error("Invalid offset table: {0}")]
    Offset(String),
    #[error("Unknown union type: {0}")]
    UnknownVariant(String),
    #[error("Expected {expected}, found {found}")]
    Type { expected: &'static str, found: &'static str },
    #[error("Missing field `{0}`")]
    Missing(String),
    #[error("{0}")]
    Message(String),
}

impl ErrorKind {
    /// Attach the name of the codec which raised this error.
    pub fn expecting(self, expected: impl Into<Cow<'static, str>>) -> Error {
        Error { kind: self, expected: Some(expected.into()), path: Vec::new() }
    }
}

/// An `ErrorKind` together with the codec type that raised it and the access path from the outermost input down to
/// the offending field. The path is collected innermost first while the error bubbles up through nested codecs.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    expected: Option<Cow<'static, str>>,
    path: Vec<PathKey>,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn expected_type(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// The rendered access path, e.g. `input.outputs[2].lock.args`.
    pub fn path(&self) -> String {
        render_path(&self.path)
    }

    pub(crate) fn or_expecting(mut self, expected: impl Into<Cow<'static, str>>) -> Self {
        if self.expected.is_none() {
            self.expected = Some(expected.into());
        }
        self
    }

    pub(crate) fn push(mut self, key: PathKey) -> Self {
        self.path.push(key);
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, expected: None, path: Vec::new() }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.expected {
            Some(expected) => write!(f, "Expect type {} in {} but got error: {}", expected, self.path(), self.kind),
            None => write!(f, "Error in {}: {}", self.path(), self.kind),
        }
    }
}

/// Raised while a schema is being put together, never while packing or unpacking.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Field `{0}` must be a fixed-size codec")]
    NotFixed(String),
    #[error("Invalid shape: missing fields [{}] or shape [{}]", .missing_fields.join(", "), .missing_shape.join(", "))]
    ShapeMismatch { missing_fields: Vec<String>, missing_shape: Vec<String> },
    #[error("Field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("Union id {0} is assigned more than once")]
    DuplicateUnionId(u32),
    #[error("Union id assigned to unknown field `{0}`")]
    UnknownUnionField(String),
    #[error("Item `{0}` has a byte length of zero")]
    ZeroSized(String),
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use crate::track::PathKey;

    #[test]
    fn display_with_path() {
        let error = ErrorKind::Length { expected: 4, actual: 3 }
            .expecting("Uint32LE")
            .push(PathKey::Index(2))
            .push(PathKey::Field("outputs".into()));
        assert_eq!("Expect type Uint32LE in input.outputs[2] but got error: Invalid buffer length: 3, should be 4", error.to_string());
    }

    #[test]
    fn expecting_only_once() {
        let error = Error::from(ErrorKind::Missing("lock".into())).or_expecting("inner").or_expecting("outer");
        assert_eq!(Some("inner"), error.expected_type());
        assert_eq!("input", error.path());
    }

    #[test]
    fn untyped_display() {
        let error = Error::from(ErrorKind::Message("boom".into()));
        assert_eq!("Error in input: boom", error.to_string());
    }
}
