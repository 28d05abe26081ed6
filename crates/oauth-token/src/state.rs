//! Data source records.
//!
//! [`ResourceData`] collects the computed attributes and id of one read.
//! Writes are checked against the schema; batch writes are all or nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{ProviderError, ProviderResult};
use crate::schema::DataSourceSchema;

/// Record under construction during a read
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: DataSourceSchema,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    pub fn new(schema: DataSourceSchema) -> Self {
        Self {
            schema,
            id: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Set one computed attribute.
    pub fn set(&mut self, name: &str, value: Value) -> ProviderResult<()> {
        self.check_assignable(name, &value)?;
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Set several computed attributes. Nothing is written unless every
    /// assignment is valid.
    pub fn set_all<'a, I>(&mut self, writes: I) -> ProviderResult<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let writes: Vec<(&str, Value)> = writes.into_iter().collect();
        for (name, value) in &writes {
            self.check_assignable(name, value)?;
        }
        for (name, value) in writes {
            self.attributes.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn check_assignable(&self, name: &str, value: &Value) -> ProviderResult<()> {
        let attribute = self.schema.attribute(name).ok_or_else(|| {
            ProviderError::field_assignment(
                name,
                format!("not declared by {}", self.schema.type_name),
            )
        })?;

        if !attribute.computed {
            return Err(ProviderError::field_assignment(name, "not a computed attribute"));
        }

        if !attribute.attribute_type.accepts(value) {
            return Err(ProviderError::field_assignment(
                name,
                format!("expected {:?}", attribute.attribute_type),
            ));
        }

        Ok(())
    }

    /// Finish the read. Fails if no id was assigned.
    pub fn into_state(self) -> ProviderResult<DataSourceState> {
        let id = self
            .id
            .ok_or_else(|| ProviderError::field_assignment("id", "record id was never set"))?;
        Ok(DataSourceState {
            id,
            attributes: self.attributes,
        })
    }
}

/// Completed record returned to the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSourceState {
    pub id: String,
    pub attributes: BTreeMap<String, Value>,
}
