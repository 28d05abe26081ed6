//! Data Source Schemas
//!
//! Declares the arguments and computed attributes of each data source.
//! Schemas are served to the host and used to validate configurations before
//! they are decoded into typed config structs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::{ProviderError, ProviderResult};

/// Attribute value type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    StringList,
}

impl AttributeType {
    /// Whether a (non-null) JSON value fits this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// A single attribute in a data source schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Attribute {
    /// An optional configuration argument
    pub fn argument(name: &str, attribute_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            attribute_type,
            optional: true,
            computed: false,
            sensitive: false,
            description: None,
            default: None,
        }
    }

    /// A string attribute set by the read
    pub fn computed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute_type: AttributeType::String,
            optional: false,
            computed: true,
            sensitive: false,
            description: None,
            default: None,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Schema of one data source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSourceSchema {
    pub type_name: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl DataSourceSchema {
    pub fn new(type_name: &str, description: &str, attributes: Vec<Attribute>) -> Self {
        Self {
            type_name: type_name.to_string(),
            description: description.to_string(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate a configuration object against the declared arguments.
    ///
    /// Null values stand for unset arguments and are accepted everywhere.
    pub fn validate_config(&self, config: &Map<String, Value>) -> ProviderResult<()> {
        for (name, value) in config {
            let attribute = self.attribute(name).ok_or_else(|| {
                ProviderError::InvalidConfig(format!(
                    "unsupported argument '{}' for {}",
                    name, self.type_name
                ))
            })?;

            if value.is_null() {
                continue;
            }

            if attribute.computed {
                return Err(ProviderError::InvalidConfig(format!(
                    "'{}' is computed and cannot be configured",
                    name
                )));
            }

            if !attribute.attribute_type.accepts(value) {
                return Err(ProviderError::InvalidConfig(format!(
                    "'{}' must be of type {:?}",
                    name, attribute.attribute_type
                )));
            }
        }
        Ok(())
    }
}
