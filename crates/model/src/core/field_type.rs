use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Type attached to every expression node and schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Integer,
    Integer64,
    Float,
    String,
    Boolean,
    Date,
    Time,
    Timestamp,
    Geometry,
    Other,
}

lazy_static! {
    /// Type names accepted by `CAST(x AS name)`.
    static ref CAST_TYPE_MAP: HashMap<&'static str, FieldType> = build_cast_type_map();
}

fn build_cast_type_map() -> HashMap<&'static str, FieldType> {
    HashMap::from([
        ("boolean", FieldType::Boolean),
        ("character", FieldType::String),
        ("smallint", FieldType::Integer),
        ("integer", FieldType::Integer),
        ("bigint", FieldType::Integer64),
        ("float", FieldType::Float),
        ("numeric", FieldType::Float),
        ("timestamp", FieldType::Timestamp),
        ("date", FieldType::Date),
        ("time", FieldType::Time),
        ("geometry", FieldType::Geometry),
    ])
}

impl FieldType {
    /// Resolves a CAST target name, case-insensitively.
    pub fn from_cast_name(name: &str) -> Option<Self> {
        CAST_TYPE_MAP.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Integer64 => "bigint",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Timestamp => "timestamp",
            FieldType::Geometry => "geometry",
            FieldType::Other => "other",
        }
    }

    /// Integer-valued types. Booleans are stored as integers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Integer64 | FieldType::Boolean
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || *self == FieldType::Float
    }

    /// Types whose constants carry a string payload.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::Date | FieldType::Time | FieldType::Timestamp
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::Time | FieldType::Timestamp
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
