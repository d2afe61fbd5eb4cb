// crates/l1menu/src/value.rs

//! Typed conversion of element text into model fields.
//!
//! There is one function per semantic kind. Numeric text is trimmed first,
//! and blank numeric text reads as zero, which is how an absent element is
//! seen in lenient mode.

use core::fmt;
use core::str::FromStr;

use crate::error::{MenuError, ValueKind};

/// Names a field as `<parent>/<element>` in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub parent: &'a str,
    pub element: &'a str,
}

impl<'a> Field<'a> {
    pub const fn new(parent: &'a str, element: &'a str) -> Self {
        Self { parent, element }
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.parent, self.element)
    }
}

/// Parses an unsigned count or identifier.
pub fn parse_unsigned(raw: &str, field: Field<'_>) -> Result<u32, MenuError> {
    parse_numeric(raw, field, ValueKind::Unsigned)
}

/// Parses a signed bunch-crossing offset.
pub fn parse_offset(raw: &str, field: Field<'_>) -> Result<i32, MenuError> {
    parse_numeric(raw, field, ValueKind::Offset)
}

/// Parses a decimal quantity, e.g. `+6.3000000000000000E+01` or `63`.
pub fn parse_decimal(raw: &str, field: Field<'_>) -> Result<f64, MenuError> {
    parse_numeric(raw, field, ValueKind::Decimal)
}

/// Text fields are taken as-is.
pub fn parse_text(raw: &str) -> String {
    raw.to_string()
}

fn parse_numeric<T>(raw: &str, field: Field<'_>, kind: ValueKind) -> Result<T, MenuError>
where
    T: FromStr + Default,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|_| MenuError::TypeCoercion {
        field: field.to_string(),
        value: raw.to_string(),
        kind,
    })
}
