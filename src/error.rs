//! Error types for figure description files

use std::collections::BTreeSet;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum DescriptionError {
    /// The document is not valid TOML or does not match the description schema
    #[error("invalid description: {message}")]
    Syntax { span: Option<Span>, message: String },

    /// A name that no `[[axes]]` entry defines
    #[error("unknown axes '{name}'{}", format_suggestions(.suggestions))]
    UnknownReference {
        name: String,
        suggestions: Vec<String>,
    },

    /// A field with a value the layout cannot use
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl DescriptionError {
    pub fn unknown_reference<'a>(
        name: impl Into<String>,
        defined: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let name = name.into();
        let suggestions = find_similar(defined, &name, 2);
        Self::UnknownReference { name, suggestions }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Location of the error in the source, when known
    fn locate(&self, source: &str) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => span.clone(),
            Self::UnknownReference { name, .. } => {
                let quoted = format!("\"{}\"", name);
                source
                    .find(&quoted)
                    .map(|start| start..start + quoted.len())
            }
            Self::InvalidValue { field, .. } => {
                let key = field.rsplit('.').next().unwrap_or(field);
                source.find(key).map(|start| start..start + key.len())
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = self.to_string();
        let Some(span) = self.locate(source) else {
            return format!("Error: {}", message);
        };
        let mut buf = Vec::new();
        let report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match report {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("Error: {}", message),
        }
    }
}

impl From<toml::de::Error> for DescriptionError {
    fn from(err: toml::de::Error) -> Self {
        Self::Syntax {
            span: err.span(),
            message: err.message().trim().to_string(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if a_chars.is_empty() {
        return n;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut row = vec![0usize; n + 1];
    for (i, ca) in a_chars.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[n]
}

/// Find similar names within a maximum edit distance, closest first
fn find_similar<'a>(
    defined: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let unique: BTreeSet<&str> = defined.into_iter().collect();
    let mut candidates: Vec<(&str, usize)> = unique
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
        assert_eq!(levenshtein_distance("left", "lfet"), 2);
        assert_eq!(levenshtein_distance("top", "tops"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_suggestions_in_message() {
        let err = DescriptionError::unknown_reference("mian", ["main", "inset", "other"]);
        insta::assert_snapshot!(err.to_string(), @"unknown axes 'mian' (did you mean main?)");
    }

    #[test]
    fn test_no_suggestions() {
        let err = DescriptionError::unknown_reference("zzz", ["main"]);
        assert_eq!(err.to_string(), "unknown axes 'zzz'");
    }

    #[test]
    fn test_format_points_at_reference() {
        let source = "[[axes]]\nname = \"a\"\nshare_x = \"b\"\n";
        let err = DescriptionError::unknown_reference("b", ["a"]);
        let report = err.format(source, "fig.toml");
        assert!(report.contains("fig.toml"));
        assert!(report.contains("unknown axes 'b'"));
    }

    #[test]
    fn test_toml_error_keeps_span() {
        let err: DescriptionError = toml::from_str::<toml::Table>("a = = 1")
            .unwrap_err()
            .into();
        assert!(matches!(err, DescriptionError::Syntax { span: Some(_), .. }));
    }
}
