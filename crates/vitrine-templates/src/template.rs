//! Template compilation and `{{key}}` interpolation.

use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Data interpolated into a template: a flat key to value mapping.
pub type TemplateData = serde_json::Map<String, Value>;

/// Build [`TemplateData`] from key/value pairs.
pub fn data_from_pairs<I, K, V>(pairs: I) -> TemplateData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("token pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(String),
}

/// A named, compiled template. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Compile template text into literal and token segments.
    pub fn compile(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut last = 0;

        for cap in token_pattern().captures_iter(&source) {
            let Some(whole) = cap.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Token(cap[1].to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Self {
            name: name.into(),
            source,
            segments,
        }
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct token keys in order of first appearance.
    pub fn tokens(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Token(key) = segment {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Substitute every token present in `data`. Tokens without a value are
    /// kept verbatim so missing keys stay visible in the output.
    pub fn render(&self, data: &TemplateData) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(key) => match data.get(key) {
                    Some(value) => out.push_str(&value_text(value)),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                },
            }
        }
        out
    }
}

/// Interpolate `data` into `source` without caching a compiled form.
pub fn interpolate(source: &str, data: &TemplateData) -> String {
    Template::compile("", source).render(data)
}

fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}
