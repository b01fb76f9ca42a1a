use std::fmt;

/// Raw, comma-delimited tech filter exactly as the user typed it.
///
/// The raw string is what goes on the wire. [`FilterTerm::tags`] is only a
/// display helper and never feeds back into queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FilterTerm(String);

impl FilterTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Individual tags, trimmed, with empty entries skipped.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterTerm {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for FilterTerm {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_input_is_kept_verbatim() {
        let term = FilterTerm::from(" go, rust ,,");
        assert_eq!(term.as_str(), " go, rust ,,");
        assert_eq!(term.to_string(), " go, rust ,,");
    }

    #[test]
    fn tags_are_trimmed_for_display() {
        let term = FilterTerm::from(" go, rust ,,ReactJS");
        assert_eq!(term.tags().collect::<Vec<_>>(), ["go", "rust", "ReactJS"]);
        assert_eq!(FilterTerm::default().tags().count(), 0);
    }
}
