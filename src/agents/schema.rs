//! Output contracts for agent answers
//!
//! A [`SchemaContract`] is an ordered list of named, typed fields. The only
//! way to obtain a [`StructuredResult`] is [`SchemaContract::validate`], so a
//! result in hand always matches its contract.

use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The value shape a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string
    Text,
    /// A list of strings
    TextList,
    /// An object mapping strings to numbers
    NumberMap,
    /// An object mapping strings to strings
    TextMap,
    /// A list of `{label, description}` records
    LabeledList,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::TextList => "a list of strings",
            Self::NumberMap => "an object of string to number",
            Self::TextMap => "an object of string to string",
            Self::LabeledList => "a list of {label, description} objects",
        }
    }

    fn json_schema(self) -> Value {
        match self {
            Self::Text => json!({ "type": "string" }),
            Self::TextList => json!({ "type": "array", "items": { "type": "string" } }),
            Self::NumberMap => json!({
                "type": "object",
                "additionalProperties": { "type": "number" }
            }),
            Self::TextMap => json!({
                "type": "object",
                "additionalProperties": { "type": "string" }
            }),
            Self::LabeledList => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["label", "description"],
                    "additionalProperties": false
                }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Section header used when rendering
    pub title: String,
    pub kind: FieldKind,
    pub description: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            title: title_case(&name),
            name,
            kind,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// `cross_domain_insights` -> `Cross Domain Insights`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Declared shape of a final answer. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaContract {
    name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaContract {
    pub fn builder(name: impl Into<String>) -> SchemaContractBuilder {
        SchemaContractBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// JSON Schema handed to the model backend
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut schema = field.kind.json_schema();
            if let Value::Object(obj) = &mut schema {
                obj.insert("title".into(), Value::String(field.title.clone()));
                if !field.description.is_empty() {
                    obj.insert(
                        "description".into(),
                        Value::String(field.description.clone()),
                    );
                }
            }
            properties.insert(field.name.clone(), schema);
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": self.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            "additionalProperties": false
        })
    }

    /// Check a candidate answer.
    ///
    /// Every declared field must be present with exactly the declared shape
    /// and undeclared fields are rejected. Nothing is coerced. All problems
    /// are reported at once so a corrective prompt can name each of them.
    pub fn validate(self: &Arc<Self>, candidate: &Value) -> Result<StructuredResult, SchemaViolations> {
        let mut violations = Vec::new();

        let Value::Object(object) = candidate else {
            violations.push(format!(
                "expected a JSON object at the top level, got {}",
                type_name(candidate)
            ));
            return Err(self.violations(violations));
        };

        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match object.get(&field.name) {
                None => violations.push(format!("missing required field `{}`", field.name)),
                Some(raw) => match convert(field, raw) {
                    Ok(value) => values.push(value),
                    Err(mut problems) => violations.append(&mut problems),
                },
            }
        }

        for key in object.keys() {
            if self.field(key).is_none() {
                violations.push(format!("unexpected field `{key}`"));
            }
        }

        if violations.is_empty() {
            Ok(StructuredResult {
                contract: Arc::clone(self),
                values,
            })
        } else {
            Err(self.violations(violations))
        }
    }

    fn violations(&self, violations: Vec<String>) -> SchemaViolations {
        SchemaViolations {
            contract: self.name.clone(),
            violations,
        }
    }
}

pub struct SchemaContractBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl SchemaContractBuilder {
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn text(self, name: &str, description: &str) -> Self {
        self.field(FieldSpec::new(name, FieldKind::Text).with_description(description))
    }

    #[must_use]
    pub fn list(self, name: &str, description: &str) -> Self {
        self.field(FieldSpec::new(name, FieldKind::TextList).with_description(description))
    }

    #[must_use]
    pub fn number_map(self, name: &str, description: &str) -> Self {
        self.field(FieldSpec::new(name, FieldKind::NumberMap).with_description(description))
    }

    #[must_use]
    pub fn text_map(self, name: &str, description: &str) -> Self {
        self.field(FieldSpec::new(name, FieldKind::TextMap).with_description(description))
    }

    #[must_use]
    pub fn labeled_list(self, name: &str, description: &str) -> Self {
        self.field(FieldSpec::new(name, FieldKind::LabeledList).with_description(description))
    }

    pub fn build(self) -> SchemaContract {
        SchemaContract {
            name: self.name,
            fields: self.fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("answer does not match `{contract}`: {}", violations.join("; "))]
pub struct SchemaViolations {
    pub contract: String,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledItem {
    pub label: String,
    pub description: String,
}

/// A validated field value. Map variants keep the order the data used.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    TextList(Vec<String>),
    NumberMap(Vec<(String, f64)>),
    TextMap(Vec<(String, String)>),
    LabeledList(Vec<LabeledItem>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number_map(&self) -> Option<&[(String, f64)]> {
        match self {
            Self::NumberMap(entries) => Some(entries),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::TextList(items) => json!(items),
            Self::NumberMap(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), json!(v)))
                    .collect(),
            ),
            Self::TextMap(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            Self::LabeledList(items) => Value::Array(
                items
                    .iter()
                    .map(|item| json!({ "label": item.label, "description": item.description }))
                    .collect(),
            ),
        }
    }
}

/// An answer that satisfied its contract. Fields are in declaration order.
#[derive(Debug, Clone)]
pub struct StructuredResult {
    contract: Arc<SchemaContract>,
    values: Vec<FieldValue>,
}

impl StructuredResult {
    pub fn contract(&self) -> &SchemaContract {
        &self.contract
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.iter()
            .find(|(field, _)| field.name == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSpec, &FieldValue)> {
        self.contract.fields.iter().zip(self.values.iter())
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(field, value)| (field.name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl fmt::Display for StructuredResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn convert(field: &FieldSpec, raw: &Value) -> Result<FieldValue, Vec<String>> {
    let name = &field.name;
    let mismatch = || {
        vec![format!(
            "field `{name}` must be {}, got {}",
            field.kind.describe(),
            type_name(raw)
        )]
    };

    match field.kind {
        FieldKind::Text => raw
            .as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .ok_or_else(mismatch),
        FieldKind::TextList => {
            let items = raw.as_array().ok_or_else(mismatch)?;
            collect_all(items.iter().enumerate().map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    format!("field `{name}`[{i}] must be a string, got {}", type_name(item))
                })
            }))
            .map(FieldValue::TextList)
        }
        FieldKind::NumberMap => {
            let entries = raw.as_object().ok_or_else(mismatch)?;
            collect_all(entries.iter().map(|(key, value)| {
                value.as_f64().map(|n| (key.clone(), n)).ok_or_else(|| {
                    format!(
                        "field `{name}`.{key} must be a number, got {}",
                        type_name(value)
                    )
                })
            }))
            .map(FieldValue::NumberMap)
        }
        FieldKind::TextMap => {
            let entries = raw.as_object().ok_or_else(mismatch)?;
            collect_all(entries.iter().map(|(key, value)| {
                value
                    .as_str()
                    .map(|s| (key.clone(), s.to_string()))
                    .ok_or_else(|| {
                        format!(
                            "field `{name}`.{key} must be a string, got {}",
                            type_name(value)
                        )
                    })
            }))
            .map(FieldValue::TextMap)
        }
        FieldKind::LabeledList => {
            let items = raw.as_array().ok_or_else(mismatch)?;
            collect_all(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| labeled_item(name, i, item)),
            )
            .map(FieldValue::LabeledList)
        }
    }
}

fn labeled_item(name: &str, index: usize, item: &Value) -> Result<LabeledItem, String> {
    let Value::Object(obj) = item else {
        return Err(format!(
            "field `{name}`[{index}] must be a {{label, description}} object, got {}",
            type_name(item)
        ));
    };
    if let Some(extra) = obj.keys().find(|k| *k != "label" && *k != "description") {
        return Err(format!("field `{name}`[{index}] has unexpected key `{extra}`"));
    }
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| format!("field `{name}`[{index}].{key} must be a string"))
    };
    Ok(LabeledItem {
        label: text("label")?,
        description: text("description")?,
    })
}

/// Collect successes, or every error if there was at least one
fn collect_all<T>(results: impl Iterator<Item = Result<T, String>>) -> Result<Vec<T>, Vec<String>> {
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
