//! Annotation string parser
//!
//! Annotations look like `column:user_name;size:120;unique;not null`.
//! Segments are separated by `;` and are either bare flags or `key:value`
//! pairs. Parsing is lenient: malformed segments are dropped rather than
//! reported, so a typo in one setting never prevents a model from loading.

use indexmap::IndexMap;

/// Parsed settings of one annotation string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSettings {
    raw: String,
    settings: IndexMap<String, String>,
}

impl TagSettings {
    /// Parse an annotation string
    ///
    /// Whitespace around segments, keys and values is trimmed, empty
    /// segments and empty keys are ignored, and the last occurrence of a
    /// repeated key wins. Bare flags are stored with an empty value.
    pub fn parse(tag: &str) -> Self {
        let mut settings = IndexMap::new();

        for segment in tag.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let (key, value) = match segment.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (segment, ""),
            };
            if key.is_empty() {
                continue;
            }

            // Re-inserting moves nothing in IndexMap; drop first so order tracks the last write
            settings.shift_remove(key);
            settings.insert(key.to_string(), value.to_string());
        }

        Self {
            raw: tag.to_string(),
            settings,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Value of a key, treating an empty value as absent
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// Whether a bare flag appears as a whole segment
    ///
    /// Only exact segments count: `unique` matches `size:10; unique` but not
    /// `uniqueIndex:udx_email`.
    pub fn has_flag(&self, flag: &str) -> bool {
        has_tag_option(&self.raw, flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn into_map(self) -> IndexMap<String, String> {
        self.settings
    }
}

/// Parse an annotation into its key/value mapping
pub fn parse_tag_settings(tag: &str) -> IndexMap<String, String> {
    TagSettings::parse(tag).into_map()
}

/// Whether `option` appears as a bare segment of the annotation
pub fn has_tag_option(tag: &str, option: &str) -> bool {
    tag.split(';').any(|segment| segment.trim() == option)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_and_flags() {
        let tag = TagSettings::parse("column:user_name; size:120 ;unique;not null");
        assert_eq!(tag.get("column"), Some("user_name"));
        assert_eq!(tag.get("size"), Some("120"));
        assert_eq!(tag.get("unique"), Some(""));
        assert!(tag.contains_key("not null"));
        assert!(tag.has_flag("unique"));
        assert!(!tag.has_flag("primaryKey"));
        assert_eq!(tag.len(), 4);
    }

    #[test]
    fn test_malformed_segments_dropped() {
        let tag = TagSettings::parse(";; :orphan ; : ;size:");
        assert_eq!(tag.len(), 1);
        assert_eq!(tag.get("size"), Some(""));
        assert_eq!(tag.value("size"), None);
    }

    #[test]
    fn test_last_key_wins() {
        let tag = TagSettings::parse("column:a;size:1;column:b");
        assert_eq!(tag.get("column"), Some("b"));
        let keys: Vec<_> = tag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["size", "column"]);
    }

    #[test]
    fn test_flag_requires_whole_segment() {
        assert!(has_tag_option("size:10; unique", "unique"));
        assert!(!has_tag_option("uniqueIndex:udx_email", "unique"));
        assert!(!has_tag_option("", "unique"));
    }

    #[test]
    fn test_value_may_contain_colon() {
        let settings = parse_tag_settings("default:'12:00:00'");
        assert_eq!(settings.get("default").map(String::as_str), Some("'12:00:00'"));
    }
}
