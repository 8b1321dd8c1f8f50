/// The closed set of basic runtime value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    String,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Bytes,
    Date,
    Timestamp,
    Uuid,
}

impl ScalarType {
    /// Canonical `java.sql.Types` code for the scalar type.
    pub fn jdbc_type_code(self) -> i32 {
        match self {
            ScalarType::Bool => 16,       // BOOLEAN
            ScalarType::String => 12,     // VARCHAR
            ScalarType::I16 => 5,         // SMALLINT
            ScalarType::I32 => 4,         // INTEGER
            ScalarType::I64 => -5,        // BIGINT
            ScalarType::F32 => 7,         // REAL
            ScalarType::F64 => 8,         // DOUBLE
            ScalarType::Decimal => 2,     // NUMERIC
            ScalarType::Bytes => -3,      // VARBINARY
            ScalarType::Date => 91,       // DATE
            ScalarType::Timestamp => 93,  // TIMESTAMP
            ScalarType::Uuid => 1111,     // OTHER
        }
    }

    /// Heuristic lookup from a type name. Returns `None` on an unknown name;
    /// resolution may still succeed later via another precedence path.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Some(match name.as_str() {
            "bool" | "boolean" => ScalarType::Bool,
            "string" | "text" => ScalarType::String,
            "short" | "i16" => ScalarType::I16,
            "int" | "integer" | "i32" => ScalarType::I32,
            "long" | "i64" => ScalarType::I64,
            "float" | "f32" => ScalarType::F32,
            "double" | "f64" => ScalarType::F64,
            "decimal" | "big_decimal" => ScalarType::Decimal,
            "binary" | "bytes" => ScalarType::Bytes,
            "date" => ScalarType::Date,
            "timestamp" | "datetime" => ScalarType::Timestamp,
            "uuid" => ScalarType::Uuid,
            _ => return None,
        })
    }

    /// Structural inference from a declared class name. Accepts both bare
    /// and path-qualified spellings; `None` when the class does not map to a
    /// basic type (entities, composites).
    pub fn from_class(class_name: &str) -> Option<Self> {
        let tail = class_name.rsplit("::").next().unwrap_or(class_name);
        Some(match tail {
            "bool" => ScalarType::Bool,
            "String" | "str" => ScalarType::String,
            "i16" => ScalarType::I16,
            "i32" => ScalarType::I32,
            "i64" => ScalarType::I64,
            "f32" => ScalarType::F32,
            "f64" => ScalarType::F64,
            "Decimal" => ScalarType::Decimal,
            "Vec<u8>" => ScalarType::Bytes,
            "NaiveDate" => ScalarType::Date,
            "NaiveDateTime" | "SystemTime" => ScalarType::Timestamp,
            "Uuid" => ScalarType::Uuid,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_name_lookup() {
        assert_eq!(ScalarType::from_name("long"), Some(ScalarType::I64));
        assert_eq!(ScalarType::from_name("STRING"), Some(ScalarType::String));
        // Unknown names are soft failures
        assert_eq!(ScalarType::from_name("no_such_type"), None);
    }

    #[test]
    fn class_inference_accepts_paths() {
        assert_eq!(
            ScalarType::from_class("uuid::Uuid"),
            Some(ScalarType::Uuid)
        );
        assert_eq!(ScalarType::from_class("String"), Some(ScalarType::String));
        assert_eq!(ScalarType::from_class("crate::model::Address"), None);
    }
}
