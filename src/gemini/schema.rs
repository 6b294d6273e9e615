use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI-style schema subset accepted by `generationConfig.responseSchema`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl Schema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            properties: None,
            items: None,
            required: None,
            nullable: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::leaf(SchemaType::Boolean)
    }

    pub fn array_of(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self {
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.into(), schema))
                    .collect(),
            ),
            ..Self::leaf(SchemaType::Object)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}
