//! The PIR configuration type vocabulary (spec §4.6):
//! `string|number|boolean|List<String>|List<Number>|CommaDelimitedList|Object|Object<V>`.

use std::fmt;

/// The type of a `ConfigDecl`/`ConfigBlock`'s value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigType {
    String,
    Number,
    Boolean,
    Object,
    /// `Object<V>`: an object whose values all have type `V`.
    ObjectOf(Box<ConfigType>),
    StringList,
    NumberList,
    /// A string list whose wire representation is a single comma-delimited
    /// string rather than a YAML sequence.
    CommaDelimitedList,
}

impl ConfigType {
    /// Parses a config type string such as `"string"`, `"List<Number>"`, or
    /// `"Object<String>"`. Returns `None` for anything outside spec's exact
    /// closed vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        if let Some(inner) = s.strip_prefix("List<").and_then(|r| r.strip_suffix('>')) {
            return match inner.trim() {
                "String" => Some(ConfigType::StringList),
                "Number" => Some(ConfigType::NumberList),
                _ => None,
            };
        }
        if let Some(inner) = s.strip_prefix("Object<").and_then(|r| r.strip_suffix('>')) {
            return ConfigType::parse(inner.trim()).map(|t| ConfigType::ObjectOf(Box::new(t)));
        }

        match s {
            "string" => Some(ConfigType::String),
            "number" => Some(ConfigType::Number),
            "boolean" => Some(ConfigType::Boolean),
            "Object" => Some(ConfigType::Object),
            "CommaDelimitedList" => Some(ConfigType::CommaDelimitedList),
            _ => None,
        }
    }

    /// Returns true if this is a list-shaped type (sequence or comma list).
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ConfigType::StringList | ConfigType::NumberList | ConfigType::CommaDelimitedList
        )
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigType::String => write!(f, "string"),
            ConfigType::Number => write!(f, "number"),
            ConfigType::Boolean => write!(f, "boolean"),
            ConfigType::Object => write!(f, "Object"),
            ConfigType::ObjectOf(inner) => write!(f, "Object<{}>", inner),
            ConfigType::StringList => write!(f, "List<String>"),
            ConfigType::NumberList => write!(f, "List<Number>"),
            ConfigType::CommaDelimitedList => write!(f, "CommaDelimitedList"),
        }
    }
}
