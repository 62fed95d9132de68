//! Search targets for label lookup and content checks

use std::borrow::Cow;

/// Bytes or text to compare against record data
///
/// Text is compared by its UTF-8 encoding. Only byte and string types
/// convert into a target, so a numeric search key is rejected at compile
/// time:
///
/// ```compile_fail
/// use fortbin_engine::SearchTarget;
/// let target: SearchTarget = 1.0f64.into();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget<'a> {
    Bytes(Cow<'a, [u8]>),
    Text(Cow<'a, str>),
}

impl SearchTarget<'_> {
    /// Encoded bytes of the target
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            SearchTarget::Bytes(bytes) => bytes,
            SearchTarget::Text(text) => text.as_bytes(),
        }
    }

    /// Whether `haystack` contains the target anywhere
    pub fn is_within(&self, haystack: &[u8]) -> bool {
        let needle = self.as_bytes();
        if needle.is_empty() {
            return true;
        }
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}

impl<'a> From<&'a [u8]> for SearchTarget<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        SearchTarget::Bytes(Cow::Borrowed(bytes))
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for SearchTarget<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        SearchTarget::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl<'a> From<&'a Vec<u8>> for SearchTarget<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        SearchTarget::Bytes(Cow::Borrowed(bytes.as_slice()))
    }
}

impl From<Vec<u8>> for SearchTarget<'static> {
    fn from(bytes: Vec<u8>) -> Self {
        SearchTarget::Bytes(Cow::Owned(bytes))
    }
}

impl<'a> From<&'a str> for SearchTarget<'a> {
    fn from(text: &'a str) -> Self {
        SearchTarget::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for SearchTarget<'a> {
    fn from(text: &'a String) -> Self {
        SearchTarget::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for SearchTarget<'static> {
    fn from(text: String) -> Self {
        SearchTarget::Text(Cow::Owned(text))
    }
}
