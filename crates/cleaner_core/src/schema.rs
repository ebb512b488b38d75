use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::SchemaError;

/// Bulleted (`-`, `*`, `+`, `•`) or numbered (`1.`, `2)`, `3、`, `(4)`) item
/// at line start, then a label, then an ASCII or full-width colon.
static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*+•]|\d+[.)、．]|[(（]\d+[)）])[ \t]*([^\n:：]+?)[ \t]*[:：]")
        .expect("valid field line regex")
});

/// Ordered set of unique target field names derived from a rule template.
///
/// Immutable once built; a schema obtained through [`FieldSchema::from_template`]
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSchema {
    fields: Vec<String>,
}

impl FieldSchema {
    /// Derive the schema from a rule template, refusing an empty result.
    pub fn from_template(template: &str) -> Result<Self, SchemaError> {
        let schema = extract_field_schema(template);
        if schema.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        Ok(schema)
    }

    /// Build a schema from already known names; names are normalized and
    /// deduplicated exactly like template labels.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::default();
        for name in names {
            schema.push_label(name.as_ref());
        }
        schema
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `name` must already be normalized.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    fn push_label(&mut self, label: &str) {
        let cleaned = normalize_label(label);
        if !cleaned.is_empty() && !self.contains(&cleaned) {
            self.fields.push(cleaned);
        }
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join(", "))
    }
}

/// Scan a rule template for `- label:` style lines and collect the labels in
/// first-seen order. The result may be empty; see [`FieldSchema::from_template`].
pub fn extract_field_schema(template: &str) -> FieldSchema {
    let mut schema = FieldSchema::default();
    for captures in FIELD_LINE.captures_iter(template) {
        if let Some(label) = captures.get(1) {
            schema.push_label(label.as_str());
        }
    }
    schema
}

/// Strip everything that is not a word character or a CJK ideograph, then trim.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|&c| c.is_alphanumeric() || c == '_' || is_cjk_ideograph(c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Human readable preview of the fields a template yields.
pub fn preview_fields(template: &str) -> String {
    let schema = extract_field_schema(template);
    if schema.is_empty() {
        "No fields found; check that the rule template lists fields as `- name:` lines".to_string()
    } else {
        format!("Fields to generate ({}): {}", schema.len(), schema)
    }
}
