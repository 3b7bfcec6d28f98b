use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Public reference to a file held by the content store.
///
/// A reference is the URL path under which the file is served, e.g.
/// `/storage/img/<digest>.jpg`. Only the final path segment identifies the
/// file; it is restricted to a conservative character set so that a
/// reference can never escape the store's directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentRef(String);

impl ContentRef {
    /// URL prefix shared by every content reference.
    pub const PUBLIC_PREFIX: &'static str = "/storage/img/";

    /// Build a reference from a bare stored file name.
    pub fn from_file_name(file_name: &str) -> Result<Self, TypeError> {
        if !is_valid_file_name(file_name) {
            return Err(TypeError::InvalidContentRef(file_name.to_string()));
        }
        Ok(Self(format!("{}{}", Self::PUBLIC_PREFIX, file_name)))
    }

    /// Parse a full reference URL.
    pub fn parse(url: &str) -> Result<Self, TypeError> {
        let file_name = url
            .strip_prefix(Self::PUBLIC_PREFIX)
            .ok_or_else(|| TypeError::InvalidContentRef(url.to_string()))?;
        Self::from_file_name(file_name)
    }

    /// The stored file name (final path segment).
    pub fn file_name(&self) -> &str {
        &self.0[Self::PUBLIC_PREFIX.len()..]
    }

    /// The full reference URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({})", self.0)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentRef> for String {
    fn from(value: ContentRef) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_file_name_prefixes_url() {
        let r = ContentRef::from_file_name("abc123.jpg").unwrap();
        assert_eq!(r.as_str(), "/storage/img/abc123.jpg");
        assert_eq!(r.file_name(), "abc123.jpg");
    }

    #[test]
    fn parse_accepts_own_output() {
        let r = ContentRef::from_file_name("d00d.png").unwrap();
        assert_eq!(ContentRef::parse(r.as_str()).unwrap(), r);
    }

    #[test]
    fn parse_rejects_foreign_prefix() {
        assert!(ContentRef::parse("/uploads/a.jpg").is_err());
        assert!(ContentRef::parse("a.jpg").is_err());
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(ContentRef::from_file_name("../etc/passwd").is_err());
        assert!(ContentRef::from_file_name("a/b.jpg").is_err());
        assert!(ContentRef::from_file_name(".hidden").is_err());
        assert!(ContentRef::from_file_name("").is_err());
        assert!(ContentRef::parse("/storage/img/x\\y.png").is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let json = "\"/storage/img/ok.webp\"";
        let r: ContentRef = serde_json::from_str(json).unwrap();
        assert_eq!(r.file_name(), "ok.webp");
        assert_eq!(serde_json::to_string(&r).unwrap(), json);

        let bad: Result<ContentRef, _> = serde_json::from_str("\"/etc/passwd\"");
        assert!(bad.is_err());
    }

    proptest! {
        #[test]
        fn valid_names_never_escape(name in "[a-z0-9]{1,16}\\.[a-z]{2,4}") {
            let r = ContentRef::from_file_name(&name).unwrap();
            prop_assert!(r.as_str().starts_with(ContentRef::PUBLIC_PREFIX));
            prop_assert_eq!(r.file_name(), name.as_str());
        }
    }
}
