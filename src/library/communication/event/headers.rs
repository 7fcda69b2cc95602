use std::collections::BTreeMap;
use std::str;

/// Out-of-band metadata attached to a message next to its payload
///
/// Header values are opaque byte sequences and are transported unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeaders {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MessageHeaders {
    /// Sets a header, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`insert`](MessageHeaders::insert)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw value of a header
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Value of a header if it is valid UTF-8
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| str::from_utf8(value).ok())
    }

    /// Iterates all headers in lexicographic order of their names
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_slice()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for MessageHeaders
where
    N: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::default();

        for (name, value) in iter {
            headers.insert(name, value);
        }

        headers
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overwrite_existing_values() {
        let mut headers = MessageHeaders::default().with("reply-to", "first");
        headers.insert("reply-to", "second");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get_str("reply-to"), Some("second"));
    }

    #[test]
    fn keep_binary_values_intact() {
        let value = vec![0u8, 159, 146, 150, 255];
        let headers = MessageHeaders::default().with("correlation-id", value.clone());

        assert_eq!(headers.get("correlation-id"), Some(value.as_slice()));
        assert_eq!(headers.get_str("correlation-id"), None);
    }

    #[test]
    fn report_missing_headers() {
        let headers = MessageHeaders::default();

        assert!(headers.is_empty());
        assert_eq!(headers.get("reply-to"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let headers: MessageHeaders = vec![("b", "2"), ("a", "1")].into_iter().collect();
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["a", "b"]);
    }
}
