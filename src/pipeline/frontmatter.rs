//! Front-matter extraction: split a `---` YAML block off the top of a slide.
//!
//! Recognised keys are typed; anything else is kept in
//! [`FrontMatter::extra`] so downstream renderers can use it, but the layout
//! engine ignores it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Metadata block of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Raw layout override. Validated by the loader, not here.
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Result of splitting a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<'a> {
    /// YAML between the delimiters, if a block was present.
    pub yaml: Option<&'a str>,
    pub body: &'a str,
}

/// Separate the optional `---`-delimited block from the Markdown body.
///
/// The opening delimiter must be the very first line (a leading BOM is
/// ignored). Without a closing delimiter the whole text is body.
pub fn split(text: &str) -> Split<'_> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let no_block = Split { yaml: None, body: text };

    let Some(first_end) = text.find('\n') else {
        return no_block;
    };
    if text[..first_end].trim_end() != "---" {
        return no_block;
    }

    let rest = &text[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim_end() == "---" {
            let body = &rest[offset + line.len()..];
            return Split {
                yaml: Some(&rest[..offset]),
                body,
            };
        }
        offset += line.len();
    }
    no_block
}

/// Parse the YAML block into [`FrontMatter`]. An empty block yields the default.
pub fn parse(yaml: &str) -> Result<FrontMatter, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    serde_yaml::from_str(yaml)
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept any YAML scalar (`date: 2024` is a number to YAML) as a string.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

/// Accept either `tags: [a, b]` or `tags: a`.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::Sequence(items)) => {
            items.into_iter().filter_map(scalar_to_string).collect()
        }
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    })
}
