//! Schema descriptors for structured generation
//!
//! A [`SchemaDescriptor`] declares the shape of one record in an ordered
//! list. It is rendered into the provider's response-schema format to bias
//! generation, and it validates the returned payload, since the provider
//! only adheres to the schema on a best-effort basis.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, SmartStudyError};
use crate::types::{Category, Locale};

/// Primitive type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// JSON string
    String,
    /// JSON integer
    Integer,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
}

impl FieldType {
    fn wire_name(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Number => "NUMBER",
            FieldType::Boolean => "BOOLEAN",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

/// One field of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, exactly as emitted by the provider
    pub name: String,
    /// Primitive type
    pub field_type: FieldType,
    /// Hint for the model
    pub description: String,
    /// Allowed values, when the field is an enumeration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Declarative shape of a structured response: an ordered list of records
/// whose fields are all required
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// Creates an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain field
    pub fn field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
            description: description.into(),
            enum_values: None,
        });
        self
    }

    /// Adds a string field restricted to `values`
    pub fn enum_field(
        mut self,
        name: impl Into<String>,
        values: &[&str],
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type: FieldType::String,
            description: description.into(),
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
        });
        self
    }

    /// Declared fields, in order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field names, in order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Render as a Gemini `responseSchema` (OpenAPI subset)
    ///
    /// # Examples
    ///
    /// ```
    /// use smartstudy::schema::{FieldType, SchemaDescriptor};
    ///
    /// let schema = SchemaDescriptor::new()
    ///     .field("time", FieldType::String, "time range")
    ///     .to_response_schema();
    /// assert_eq!(schema["type"], "ARRAY");
    /// assert_eq!(schema["items"]["required"][0], "time");
    /// ```
    pub fn to_response_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = json!({
                "type": field.field_type.wire_name(),
                "description": field.description,
            });
            if let Some(values) = &field.enum_values {
                prop["enum"] = json!(values);
            }
            properties.insert(field.name.clone(), prop);
        }

        let names = self.field_names();
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": properties,
                "required": names,
                "propertyOrdering": names,
            }
        })
    }

    /// Check one record against the declared fields
    pub fn validate_record(&self, record: &Value) -> std::result::Result<(), SmartStudyError> {
        let obj = record.as_object().ok_or_else(|| {
            SmartStudyError::SchemaViolation(format!("expected an object, got {}", record))
        })?;

        for field in &self.fields {
            let value = obj.get(&field.name).ok_or_else(|| {
                SmartStudyError::SchemaViolation(format!("missing field `{}`", field.name))
            })?;

            if !field.field_type.accepts(value) {
                return Err(SmartStudyError::SchemaViolation(format!(
                    "field `{}` has wrong type: {}",
                    field.name, value
                )));
            }

            if let Some(allowed) = &field.enum_values {
                let text = value.as_str().unwrap_or_default();
                if !allowed.iter().any(|a| a == text) {
                    return Err(SmartStudyError::SchemaViolation(format!(
                        "field `{}` value `{}` not in [{}]",
                        field.name,
                        text,
                        allowed.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse a raw structured payload into typed records
    ///
    /// The whole payload is rejected if any record fails validation, so the
    /// result is never partially populated. A blank payload yields
    /// [`SmartStudyError::EmptyResponse`]; anything unparsable yields
    /// [`SmartStudyError::SchemaViolation`].
    pub fn parse_records<T: DeserializeOwned>(&self, payload: &str) -> Result<Vec<T>> {
        let body = strip_code_fence(payload);
        if body.is_empty() {
            return Err(SmartStudyError::EmptyResponse.into());
        }

        let value: Value = serde_json::from_str(body)
            .map_err(|e| SmartStudyError::SchemaViolation(format!("invalid JSON: {}", e)))?;

        let records = match value {
            Value::Array(records) => records,
            other => {
                return Err(SmartStudyError::SchemaViolation(format!(
                    "expected an array, got {}",
                    type_name(&other)
                ))
                .into())
            }
        };

        for record in &records {
            self.validate_record(record)?;
        }

        records
            .into_iter()
            .map(|r| {
                serde_json::from_value(r).map_err(|e| {
                    anyhow::Error::from(SmartStudyError::SchemaViolation(e.to_string()))
                })
            })
            .collect()
    }
}

/// Models occasionally wrap JSON in a Markdown fence despite the MIME type
fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema for the daily schedule builder
///
/// Fields are `time`, `activity`, `notes` and `category`, with category
/// restricted to `study`, `break`, `personal` and `class`.
pub fn schedule_schema(locale: Locale) -> SchemaDescriptor {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let (time, activity, notes, category) = match locale {
        Locale::Vi => (
            "Khoảng thời gian (VD: 07:00 - 08:00)",
            "Tên hoạt động chính",
            "Ghi chú chi tiết hoặc lời khuyên",
            "Loại hoạt động",
        ),
        Locale::En => (
            "Time range (e.g. 07:00 - 08:00)",
            "Name of the main activity",
            "Details or advice",
            "Kind of activity",
        ),
    };

    SchemaDescriptor::new()
        .field("time", FieldType::String, time)
        .field("activity", FieldType::String, activity)
        .field("notes", FieldType::String, notes)
        .enum_field("category", &categories, category)
}
