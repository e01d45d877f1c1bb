//! Property type discriminator
//!
//! Mirrors the JCR `PropertyType` constants. Only the seven types the store
//! models carry their own variant; the remaining JCR type names are folded
//! onto the closest supported type by [`PropertyType::from_name`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a [`Value`](crate::Value) or property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// UTF-8 text
    String,
    /// Raw bytes
    Binary,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point
    Double,
    /// Calendar timestamp with offset
    Date,
    /// Boolean flag
    Boolean,
    /// Identifier of a referenceable node
    Reference,
}

impl PropertyType {
    /// All supported types, in JCR code order
    pub const ALL: [PropertyType; 7] = [
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Long,
        PropertyType::Double,
        PropertyType::Date,
        PropertyType::Boolean,
        PropertyType::Reference,
    ];

    /// JCR numeric type code
    pub const fn code(&self) -> u8 {
        match self {
            PropertyType::String => 1,
            PropertyType::Binary => 2,
            PropertyType::Long => 3,
            PropertyType::Double => 4,
            PropertyType::Date => 5,
            PropertyType::Boolean => 6,
            PropertyType::Reference => 9,
        }
    }

    /// Look up a type by its JCR numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// JCR type name as used in system-view exports (`"String"`, `"Long"`, ...)
    pub const fn name(&self) -> &'static str {
        match self {
            PropertyType::String => "String",
            PropertyType::Binary => "Binary",
            PropertyType::Long => "Long",
            PropertyType::Double => "Double",
            PropertyType::Date => "Date",
            PropertyType::Boolean => "Boolean",
            PropertyType::Reference => "Reference",
        }
    }

    /// Parse a JCR type name, ignoring case
    ///
    /// `Name`, `Path` and `URI` are stored as strings, `Decimal` as a double and
    /// `WeakReference` as a reference. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let ty = match lower.as_str() {
            "string" | "name" | "path" | "uri" => PropertyType::String,
            "binary" => PropertyType::Binary,
            "long" => PropertyType::Long,
            "double" | "decimal" => PropertyType::Double,
            "date" => PropertyType::Date,
            "boolean" => PropertyType::Boolean,
            "reference" | "weakreference" => PropertyType::Reference,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_jcr_constants() {
        assert_eq!(PropertyType::String.code(), 1);
        assert_eq!(PropertyType::Binary.code(), 2);
        assert_eq!(PropertyType::Long.code(), 3);
        assert_eq!(PropertyType::Double.code(), 4);
        assert_eq!(PropertyType::Date.code(), 5);
        assert_eq!(PropertyType::Boolean.code(), 6);
        assert_eq!(PropertyType::Reference.code(), 9);
    }

    #[test]
    fn test_from_code() {
        for ty in PropertyType::ALL {
            assert_eq!(PropertyType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(PropertyType::from_code(7), None);
        assert_eq!(PropertyType::from_code(0), None);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(PropertyType::from_name("LONG"), Some(PropertyType::Long));
        assert_eq!(PropertyType::from_name("boolean"), Some(PropertyType::Boolean));
        assert_eq!(PropertyType::from_name(" Date "), Some(PropertyType::Date));
    }

    #[test]
    fn test_from_name_folds_unsupported_types() {
        assert_eq!(PropertyType::from_name("Name"), Some(PropertyType::String));
        assert_eq!(PropertyType::from_name("Path"), Some(PropertyType::String));
        assert_eq!(PropertyType::from_name("Decimal"), Some(PropertyType::Double));
        assert_eq!(
            PropertyType::from_name("WeakReference"),
            Some(PropertyType::Reference)
        );
        assert_eq!(PropertyType::from_name("Undefined"), None);
    }

    #[test]
    fn test_display_uses_jcr_name() {
        assert_eq!(PropertyType::Double.to_string(), "Double");
        for ty in PropertyType::ALL {
            assert_eq!(PropertyType::from_name(&ty.to_string()), Some(ty));
        }
    }
}
