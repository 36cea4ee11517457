//! Schema-level types shared by every operation.

use gqlshape_core::CustomTypeId;
use gqlshape_runtime::{GraphQLEnum, ScalarTypeAdapters, UNKNOWN_ENUM_VALUE};
use std::fmt;

/// Custom scalars declared by the schema.
pub mod custom_type {
    use super::CustomTypeId;

    pub const ID: CustomTypeId = CustomTypeId::from_static("ID");
}

/// Registry with an adapter for every custom scalar the models use.
pub fn scalar_adapters() -> ScalarTypeAdapters {
    ScalarTypeAdapters::new().register_string(custom_type::ID)
}

/// The episodes in the Star Wars trilogy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Episode {
    /// Star Wars Episode IV: A New Hope, released in 1977.
    NewHope,
    /// Star Wars Episode V: The Empire Strikes Back, released in 1980.
    Empire,
    /// Star Wars Episode VI: Return of the Jedi, released in 1983.
    Jedi,
    /// A value this client does not know about.
    Unknown,
}

impl GraphQLEnum for Episode {
    fn raw_value(&self) -> &str {
        match self {
            Self::NewHope => "NEWHOPE",
            Self::Empire => "EMPIRE",
            Self::Jedi => "JEDI",
            Self::Unknown => UNKNOWN_ENUM_VALUE,
        }
    }

    fn safe_value_of(raw: &str) -> Self {
        match raw {
            "NEWHOPE" => Self::NewHope,
            "EMPIRE" => Self::Empire,
            "JEDI" => Self::Jedi,
            _ => {
                tracing::debug!(value = raw, "unknown Episode value");
                Self::Unknown
            }
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_value())
    }
}

/// `Some(v)` as `v`, `None` as `null`.
pub(crate) fn display_option<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "null".to_string(), ToString::to_string)
}

/// `[a, b]`, or `null` for an absent list.
pub(crate) fn display_list<T: fmt::Display>(items: Option<&[T]>) -> String {
    match items {
        Some(items) => {
            let items: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("[{}]", items.join(", "))
        }
        None => "null".to_string(),
    }
}
