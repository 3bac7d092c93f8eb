use std::fmt::{self, Display};
use serde::{de, ser};
use molecule::ErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    // Serialize
    Float,
    KeyType,
    // Deserialize
    Int(String),
    Unexpected(&'static str, &'static str),
    Hex(ErrorKind),
    // Both
    Codec(molecule::Error),
    Message(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => fmt.write_str(msg),
            Error::Float => fmt.write_str("Molecule has no floating point numbers"),
            Error::KeyType => fmt.write_str("Map key must be a string"),
            Error::Int(i) => write!(fmt, "Integer {} didn't fit into target type", i),
            Error::Unexpected(expected, actual) => write!(fmt, "Unexpected value: expected {}, found {}", expected, actual),
            Error::Hex(e) => write!(fmt, "Invalid hex string: {}", e),
            Error::Codec(e) => write!(fmt, "{}", e),
        }
    }
}

impl From<molecule::Error> for Error {
    fn from(e: molecule::Error) -> Error {
        Error::Codec(e)
    }
}

impl From<Error> for molecule::Error {
    fn from(e: Error) -> molecule::Error {
        match e {
            Error::Codec(inner) => inner,
            other => ErrorKind::Message(other.to_string()).into(),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(e) => Some(e),
            Error::Hex(e) => Some(e),
            _ => None,
        }
    }
}
