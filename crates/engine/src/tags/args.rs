//! Shared `name: value key: value` argument grammar for built-in tags.

use std::collections::BTreeMap;

use tagtext_core::TagError;

use crate::handler::Attributes;

/// Main value plus named attributes of one tag invocation.
///
/// ```
/// use tagtext_engine::tags::TagArgs;
///
/// let args = TagArgs::parse(" https://example.com text: Example popup: yes", &["text", "popup"]);
/// assert_eq!(args.value, "https://example.com");
/// assert_eq!(args.get("text"), Some("Example"));
/// assert!(args.flag("popup"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArgs {
    /// Text between the tag name and the first attribute.
    pub value: String,
    /// Attribute values keyed by lowercase name.
    pub attributes: BTreeMap<String, String>,
}

impl TagArgs {
    /// Split a payload on the given attribute keys.
    ///
    /// A key only counts when it follows whitespace and is directly followed
    /// by a colon, so `alttext:` does not match `text`. Key matching ignores
    /// ASCII case. Values are trimmed; a repeated key keeps its last value.
    pub fn parse(payload: &str, keys: &[&str]) -> Self {
        let lower = payload.to_ascii_lowercase();
        let mut marks: Vec<(usize, usize, &str)> = Vec::new();

        for key in keys {
            let needle = format!("{}:", key.to_ascii_lowercase());
            let mut from = 0;
            while let Some(found) = lower[from..].find(&needle) {
                let start = from + found;
                let after_whitespace = lower[..start]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_whitespace);
                if after_whitespace {
                    marks.push((start, start + needle.len(), key));
                }
                from = start + needle.len();
            }
        }
        marks.sort_by_key(|(start, _, _)| *start);

        let value_end = marks.first().map_or(payload.len(), |(start, _, _)| *start);
        let mut args = TagArgs {
            value: payload[..value_end].trim().to_string(),
            attributes: BTreeMap::new(),
        };

        for (idx, (_, value_start, key)) in marks.iter().enumerate() {
            let value_end = marks
                .get(idx + 1)
                .map_or(payload.len(), |(next, _, _)| *next);
            let value = payload[*value_start..value_end].trim();
            args.attributes
                .insert(key.to_ascii_lowercase(), value.to_string());
        }

        args
    }

    /// Arguments of a programmatic invocation.
    pub fn from_parts(value: &str, attributes: &Attributes) -> Self {
        Self {
            value: value.trim().to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
                .collect(),
        }
    }

    /// Non-empty attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// First non-empty attribute among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Boolean attribute: `yes`, `true`, `on` and `1` count as set.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            matches!(
                v.to_ascii_lowercase().as_str(),
                "yes" | "true" | "on" | "1"
            )
        })
    }

    /// The main value, or [`TagError::MissingValue`] when it is empty.
    pub fn require_value(&self) -> Result<&str, TagError> {
        if self.value.is_empty() {
            Err(TagError::MissingValue)
        } else {
            Ok(&self.value)
        }
    }

    /// Numeric attribute (`width: 640`); rejects anything that is not a
    /// positive integer.
    pub fn dimension(&self, key: &str) -> Result<Option<u32>, TagError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim_end_matches("px")
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(Some)
                .ok_or_else(|| TagError::InvalidAttribute {
                    attribute: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_only() {
        let args = TagArgs::parse(" image.png ", &["alt"]);
        assert_eq!(args.value, "image.png");
        assert!(args.attributes.is_empty());
    }

    #[test]
    fn attributes_in_any_order() {
        let args = TagArgs::parse("photo.jpg title: A title alt: Some alt", &["alt", "title"]);
        assert_eq!(args.value, "photo.jpg");
        assert_eq!(args.get("alt"), Some("Some alt"));
        assert_eq!(args.get("title"), Some("A title"));
    }

    #[test]
    fn unknown_keys_stay_in_the_previous_value() {
        let args = TagArgs::parse("x.png alt: Cat foo: bar", &["alt"]);
        assert_eq!(args.get("alt"), Some("Cat foo: bar"));
    }

    #[test]
    fn key_must_follow_whitespace() {
        let args = TagArgs::parse("x alttext: no", &["text"]);
        assert_eq!(args.value, "x alttext: no");
    }

    #[test]
    fn keys_ignore_case() {
        let args = TagArgs::parse("x Text: Hello", &["text"]);
        assert_eq!(args.get("text"), Some("Hello"));
    }

    #[test]
    fn urls_in_values_survive() {
        let args = TagArgs::parse(
            " https://example.com/a?b=c text: Go link: https://x.y",
            &["text", "link"],
        );
        assert_eq!(args.value, "https://example.com/a?b=c");
        assert_eq!(args.get("link"), Some("https://x.y"));
    }

    #[test]
    fn empty_attribute_reads_as_absent() {
        let args = TagArgs::parse("x text:", &["text"]);
        assert_eq!(args.get("text"), None);
        assert!(args.attributes.contains_key("text"));
    }

    #[test]
    fn flags_and_dimensions() {
        let args = TagArgs::parse("v popup: Yes width: 640px height: tall", &["popup", "width", "height"]);
        assert!(args.flag("popup"));
        assert!(!args.flag("missing"));
        assert_eq!(args.dimension("width").unwrap(), Some(640));
        assert_eq!(args.dimension("depth").unwrap(), None);
        assert!(matches!(
            args.dimension("height"),
            Err(TagError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn require_value_rejects_empty() {
        assert!(matches!(
            TagArgs::parse("  ", &[]).require_value(),
            Err(TagError::MissingValue)
        ));
    }

    #[test]
    fn from_parts_trims_and_lowercases() {
        let mut attributes = Attributes::new();
        attributes.insert("Text".into(), " Hi ".into());
        let args = TagArgs::from_parts(" v ", &attributes);
        assert_eq!(args.value, "v");
        assert_eq!(args.get("text"), Some("Hi"));
    }
}
