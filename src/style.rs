//! Style parameters for figure layout
//!
//! Styling is a flat lookup of dotted keys (`axes.titlepad`,
//! `figure.titlesize`, ...) that the layout core reads but never writes.
//! Values come from TOML documents whose nested tables are flattened into
//! dotted keys, layered over a built-in default document.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur when loading or parsing a style file
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Failed to read style file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse style TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Unsupported value for style key '{key}': only numbers, strings, booleans and string lists are allowed")]
    UnsupportedValue { key: String },
}

/// A single style value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

/// Read-only source of style parameters.
///
/// The layout core receives one of these at figure construction and only
/// ever reads from it.
pub trait StyleSource {
    /// Look up a dotted key
    fn get(&self, key: &str) -> Option<&StyleValue>;

    /// Numeric value of a key, if present and numeric
    fn number(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(StyleValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value with a fallback
    fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// String value of a key, if present and textual
    fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(StyleValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean value of a key
    fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(StyleValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// String list value of a key
    fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            Some(StyleValue::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// A set of style parameters keyed by dotted names
#[derive(Debug, Clone)]
pub struct Style {
    /// Optional name for the style
    pub name: Option<String>,
    /// Flattened values: dotted key -> value
    pub values: HashMap<String, StyleValue>,
}

/// Built-in defaults. Sizes are points, paddings are points.
const DEFAULT_STYLE: &str = r##"
[figure]
titlesize = 12.0
titleweight = "bold"

[axes]
titlesize = 10.0
titlepad = 5.0
labelsize = 9.0
labelpad = 4.0
edgecolor = "#333333"
facecolor = "#ffffff"
linewidth = 0.8
prop_cycle = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"]

[tick]
labelsize = 8.0
length = 4.0
pad = 2.0

[text]
color = "#1a1a1a"
linespacing = 1.2
family = "sans-serif"

[legend]
fontsize = 8.0

[geogrid]
lonstep = 60.0
latstep = 30.0
latmax = 80.0
color = "#bbbbbb"

[abc]
enabled = false
size = 10.0
style = "a"
"##;

impl Style {
    /// Load style from TOML file, layered over the defaults
    pub fn from_file(path: &Path) -> Result<Self, StyleError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::default().with_overrides(Self::from_str(&content)?))
    }

    /// Parse a style TOML string on its own (no defaults)
    pub fn from_str(content: &str) -> Result<Self, StyleError> {
        let mut table: toml::Table = toml::from_str(content)?;

        let name = match table.remove("metadata") {
            Some(toml::Value::Table(meta)) => meta
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        };

        let mut values = HashMap::new();
        flatten_table("", &table, &mut values)?;
        Ok(Style { name, values })
    }

    /// Empty style with no keys
    pub fn empty() -> Self {
        Self {
            name: None,
            values: HashMap::new(),
        }
    }

    /// Overlay another style on top of this one
    pub fn with_overrides(mut self, other: Style) -> Self {
        if other.name.is_some() {
            self.name = other.name;
        }
        self.values.extend(other.values);
        self
    }

    /// Set a single value
    pub fn with_value(mut self, key: impl Into<String>, value: StyleValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl StyleSource for Style {
    fn get(&self, key: &str) -> Option<&StyleValue> {
        self.values.get(key)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::from_str(DEFAULT_STYLE).expect("Default style should be valid TOML")
    }
}

fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut HashMap<String, StyleValue>,
) -> Result<(), StyleError> {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        let converted = match value {
            toml::Value::Table(inner) => {
                flatten_table(&dotted, inner, out)?;
                continue;
            }
            toml::Value::Float(f) => StyleValue::Number(*f),
            toml::Value::Integer(i) => StyleValue::Number(*i as f64),
            toml::Value::String(s) => StyleValue::Text(s.clone()),
            toml::Value::Boolean(b) => StyleValue::Bool(*b),
            toml::Value::Array(items) => {
                let strings: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                match strings {
                    Some(list) => StyleValue::List(list),
                    None => return Err(StyleError::UnsupportedValue { key: dotted }),
                }
            }
            toml::Value::Datetime(_) => {
                return Err(StyleError::UnsupportedValue { key: dotted });
            }
        };
        out.insert(dotted, converted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_keys() {
        let style = Style::default();
        assert_eq!(style.number("axes.titlepad"), Some(5.0));
        assert_eq!(style.number("figure.titlesize"), Some(12.0));
        assert_eq!(style.text("figure.titleweight"), Some("bold"));
        assert_eq!(style.list("axes.prop_cycle").map(|c| c.len()), Some(6));
    }

    #[test]
    fn test_missing_key() {
        let style = Style::default();
        assert_eq!(style.get("nonexistent.key"), None);
        assert_eq!(style.number_or("nonexistent.key", 3.0), 3.0);
    }

    #[test]
    fn test_integer_values_become_numbers() {
        let style = Style::from_str("[tick]\nlabelsize = 7\n").unwrap();
        assert_eq!(style.number("tick.labelsize"), Some(7.0));
    }

    #[test]
    fn test_overrides_layer_over_defaults() {
        let user = Style::from_str(
            r##"
[metadata]
name = "Compact"

[axes]
titlepad = 2.5
"##,
        )
        .unwrap();
        let style = Style::default().with_overrides(user);
        assert_eq!(style.name.as_deref(), Some("Compact"));
        assert_eq!(style.number("axes.titlepad"), Some(2.5));
        assert_eq!(style.number("axes.titlesize"), Some(10.0));
    }

    #[test]
    fn test_nested_tables_flatten() {
        let style = Style::from_str("[a.b]\nc = \"deep\"\n").unwrap();
        assert_eq!(style.text("a.b.c"), Some("deep"));
    }

    #[test]
    fn test_mixed_array_is_rejected() {
        let result = Style::from_str("[axes]\nprop_cycle = [1, 2]\n");
        assert!(matches!(result, Err(StyleError::UnsupportedValue { .. })));
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Style::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(StyleError::ParseError(_))));
    }
}
