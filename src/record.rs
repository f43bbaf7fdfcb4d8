//! The typed binding seam between column values and record fields.
//!
//! Runtime reflection is replaced by a per-type binding table: each record
//! type advertises its bindable properties through [`Record::properties`]
//! and routes values through [`Record::set_property`]. The [`bind_record!`]
//! macro generates both for plain structs.

use std::fmt::{self, Display};

use crate::error::BindError;
use crate::value::CellValue;

/// Declared type of a bindable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Int,
    Float,
    Bool,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Text => "text",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        })
    }
}

/// Metadata handed to value interceptors: property name and declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyMeta {
    pub name: &'static str,
    pub ty: ValueType,
}

/// A target record type.
///
/// `set_property` stores the value on the named field and reports whether
/// the stored value differs from the field type's default; the Row Binder
/// ORs those reports to decide whether the row carried any data at all.
/// Callers are expected to validate the name against `properties()` first;
/// an unknown name is answered with a backstop `PropertyNotFound`.
pub trait Record: Default {
    fn properties() -> &'static [PropertyMeta];

    fn set_property(&mut self, name: &str, value: CellValue) -> Result<bool, BindError>;
}

/// Conversion from a pipeline value into a concrete field type.
pub trait FieldType: Default + PartialEq + Sized {
    const VALUE_TYPE: ValueType;

    fn from_cell(property: &str, value: CellValue) -> Result<Self, BindError>;
}

fn incompatible(property: &str, value: &CellValue, expected: ValueType) -> BindError {
    BindError::IncompatibleValue {
        property: property.to_string(),
        value: value.to_string(),
        expected,
    }
}

impl FieldType for String {
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn from_cell(_property: &str, value: CellValue) -> Result<Self, BindError> {
        Ok(match value {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s,
            other => other.to_string(),
        })
    }
}

impl FieldType for i64 {
    const VALUE_TYPE: ValueType = ValueType::Int;

    fn from_cell(property: &str, value: CellValue) -> Result<Self, BindError> {
        match value {
            CellValue::Empty => Ok(0),
            CellValue::Int(i) => Ok(i),
            CellValue::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            CellValue::Text(ref s) => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    return Ok(i);
                }
                // Numeric cells may carry a float rendering of a whole number.
                match trimmed.parse::<f64>() {
                    Ok(n) if n.fract() == 0.0 => Ok(n as i64),
                    _ => Err(incompatible(property, &value, Self::VALUE_TYPE)),
                }
            }
            ref other => Err(incompatible(property, other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_cell(property: &str, value: CellValue) -> Result<Self, BindError> {
        match value {
            CellValue::Empty => Ok(0.0),
            CellValue::Number(n) => Ok(n),
            CellValue::Int(i) => Ok(i as f64),
            CellValue::Text(ref s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| incompatible(property, &value, Self::VALUE_TYPE)),
            ref other => Err(incompatible(property, other, Self::VALUE_TYPE)),
        }
    }
}

impl FieldType for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_cell(property: &str, value: CellValue) -> Result<Self, BindError> {
        match value {
            CellValue::Empty => Ok(false),
            CellValue::Boolean(b) => Ok(b),
            CellValue::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                _ => Err(incompatible(property, &value, Self::VALUE_TYPE)),
            },
            ref other => Err(incompatible(property, other, Self::VALUE_TYPE)),
        }
    }
}

/// Define a struct and its [`Record`] impl in one go.
///
/// Each entry maps a property name (the string the column map produces) to
/// a field. Field types must implement [`FieldType`].
///
/// ```
/// sheetbind::bind_record! {
///     pub struct Person {
///         "FirstName" => first_name: String,
///         "Age" => age: i64,
///     }
/// }
/// ```
#[macro_export]
macro_rules! bind_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $prop:literal => $field:ident : $fty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq)]
        $vis struct $name {
            $( pub $field: $fty, )+
        }

        impl $crate::Record for $name {
            fn properties() -> &'static [$crate::PropertyMeta] {
                const PROPERTIES: &[$crate::PropertyMeta] = &[
                    $( $crate::PropertyMeta {
                        name: $prop,
                        ty: <$fty as $crate::FieldType>::VALUE_TYPE,
                    }, )+
                ];
                PROPERTIES
            }

            fn set_property(
                &mut self,
                name: &str,
                value: $crate::CellValue,
            ) -> ::core::result::Result<bool, $crate::BindError> {
                match name {
                    $( $prop => {
                        let parsed = <$fty as $crate::FieldType>::from_cell(name, value)?;
                        let meaningful = parsed != <$fty as ::core::default::Default>::default();
                        self.$field = parsed;
                        ::core::result::Result::Ok(meaningful)
                    } )+
                    _ => ::core::result::Result::Err($crate::BindError::PropertyNotFound {
                        column: ::std::string::String::new(),
                        property: ::std::borrow::ToOwned::to_owned(name),
                    }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::bind_record! {
        struct Sample {
            "Name" => name: String,
            "Age" => age: i64,
            "Score" => score: f64,
            "Active" => active: bool,
        }
    }

    #[test]
    fn properties_table_reflects_declaration() {
        let props = Sample::properties();
        assert_eq!(props.len(), 4);
        assert_eq!(props[0].name, "Name");
        assert_eq!(props[0].ty, ValueType::Text);
        assert_eq!(props[1].ty, ValueType::Int);
        assert_eq!(props[2].ty, ValueType::Float);
        assert_eq!(props[3].ty, ValueType::Bool);
    }

    #[test]
    fn set_property_reports_meaningful_values() {
        let mut sample = Sample::default();
        assert!(sample.set_property("Name", "John".into()).unwrap());
        assert!(sample.set_property("Age", CellValue::Text("30".into())).unwrap());
        assert_eq!(sample.name, "John");
        assert_eq!(sample.age, 30);
    }

    #[test]
    fn defaults_are_not_meaningful() {
        let mut sample = Sample::default();
        assert!(!sample.set_property("Name", CellValue::Empty).unwrap());
        assert!(!sample.set_property("Age", CellValue::Text("0".into())).unwrap());
        assert!(!sample.set_property("Active", CellValue::Text("False".into())).unwrap());
    }

    #[test]
    fn int_accepts_whole_float_renderings() {
        let mut sample = Sample::default();
        assert!(sample.set_property("Age", CellValue::Text("30.0".into())).unwrap());
        assert_eq!(sample.age, 30);
        assert!(matches!(
            sample
                .set_property("Age", CellValue::Text("30.5".into()))
                .unwrap_err(),
            BindError::IncompatibleValue { .. }
        ));
    }

    #[test]
    fn bool_parses_resolver_words() {
        let mut sample = Sample::default();
        assert!(sample.set_property("Active", CellValue::Text("True".into())).unwrap());
        assert!(sample.active);
        assert!(!sample.set_property("Active", CellValue::Text("0".into())).unwrap());
        assert!(!sample.active);
    }

    #[test]
    fn unknown_property_is_a_backstop_error() {
        let mut sample = Sample::default();
        assert!(matches!(
            sample.set_property("Nope", CellValue::Empty).unwrap_err(),
            BindError::PropertyNotFound { property, .. } if property == "Nope"
        ));
    }
}
