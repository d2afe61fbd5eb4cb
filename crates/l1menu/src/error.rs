// crates/l1menu/src/error.rs

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use quick_xml::Error as XmlError;

/// The semantic kind a field's text was being converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// An unsigned count or identifier (`u32`).
    Unsigned,
    /// A signed bunch-crossing offset (`i32`).
    Offset,
    /// A floating-point quantity (`f64`).
    Decimal,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Unsigned => write!(f, "unsigned integer"),
            ValueKind::Offset => write!(f, "signed integer"),
            ValueKind::Decimal => write!(f, "decimal"),
        }
    }
}

/// Coarse classification of a `MenuError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The document could not be parsed, or an expected element is absent.
    Structural,
    /// An element's text does not convert to the field's type.
    TypeCoercion,
    /// The input could not be read or the output could not be written.
    Io,
}

/// Errors that can occur while reading or writing a menu document.
#[derive(Debug)]
pub enum MenuError {
    /// An error from the underlying `quick-xml` reader.
    Xml(XmlError),

    /// The byte stream tokenized, but does not form a usable document
    /// (unclosed elements, no root, invalid UTF-8 or entity reference).
    Malformed(String),

    /// A required XML element was missing (e.g. the `menu` root).
    MissingElement { element: String },

    /// An element's text could not be converted to the field's type.
    TypeCoercion {
        field: String,
        value: String,
        kind: ValueKind,
    },

    /// The input file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The output sink rejected the serialized document.
    Write(io::Error),
}

impl MenuError {
    /// Maps the error onto its category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MenuError::Xml(_) | MenuError::Malformed(_) | MenuError::MissingElement { .. } => {
                ErrorCategory::Structural
            }
            MenuError::TypeCoercion { .. } => ErrorCategory::TypeCoercion,
            MenuError::Io { .. } | MenuError::Write(_) => ErrorCategory::Io,
        }
    }
}

impl From<XmlError> for MenuError {
    fn from(e: XmlError) -> Self {
        MenuError::Xml(e)
    }
}

impl From<io::Error> for MenuError {
    fn from(e: io::Error) -> Self {
        MenuError::Write(e)
    }
}

impl From<Utf8Error> for MenuError {
    fn from(e: Utf8Error) -> Self {
        MenuError::Malformed(format!("invalid UTF-8: {}", e))
    }
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::Xml(e) => write!(f, "XML parsing error: {}", e),
            MenuError::Malformed(msg) => write!(f, "Malformed XML document: {}", msg),
            MenuError::MissingElement { element } => {
                write!(f, "Missing required XML element: {}", element)
            }
            MenuError::TypeCoercion { field, value, kind } => {
                write!(f, "Invalid {} for key {}: '{}'", kind, field, value)
            }
            MenuError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            MenuError::Write(e) => write!(f, "XML writing error: {}", e),
        }
    }
}

impl std::error::Error for MenuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MenuError::Xml(e) => Some(e),
            MenuError::Io { source, .. } => Some(source),
            MenuError::Write(e) => Some(e),
            _ => None,
        }
    }
}
