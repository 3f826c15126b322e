use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const SCHEME: &str = "at://";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed record uri `{uri}`: {reason}")]
pub struct MalformedUri {
    pub uri: String,
    pub reason: String,
}

impl MalformedUri {
    fn new(uri: &str, reason: impl Into<String>) -> Self {
        MalformedUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

/// A record address of the form `at://<authority>/<collection>/<rkey>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtUri {
    authority: String,
    collection: String,
    rkey: String,
}

impl AtUri {
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn rkey(&self) -> &str {
        &self.rkey
    }
}

impl FromStr for AtUri {
    type Err = MalformedUri;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let path = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| MalformedUri::new(uri, "missing at:// scheme"))?;

        let segments: Vec<&str> = path.split('/').collect();
        let [authority, collection, rkey] = segments.as_slice() else {
            return Err(MalformedUri::new(
                uri,
                format!("expected 3 path segments, found {}", segments.len()),
            ));
        };
        if [authority, collection, rkey].iter().any(|s| s.is_empty()) {
            return Err(MalformedUri::new(uri, "empty path segment"));
        }

        Ok(AtUri {
            authority: authority.to_string(),
            collection: collection.to_string(),
            rkey: rkey.to_string(),
        })
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}/{}", SCHEME, self.authority, self.collection, self.rkey)
    }
}

/// Extracts the record key from a well-formed `uri`. A uri in another
/// collection than `collection` still yields its key; the mismatch is only logged.
pub fn record_key(uri: &str, collection: &str) -> Result<String, MalformedUri> {
    let parsed: AtUri = uri.parse()?;
    if parsed.collection != collection {
        warn!(
            uri,
            expected = collection,
            found = %parsed.collection,
            "record uri addresses an unexpected collection"
        );
    }
    Ok(parsed.rkey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{POST_COLLECTION, REPOST_COLLECTION};

    #[test]
    fn test_record_key_is_last_segment() {
        let key = record_key("at://did:plc:abc/app.bsky.feed.post/3k2x7y", POST_COLLECTION);
        assert_eq!(key.unwrap(), "3k2x7y");
    }

    #[test]
    fn test_parse_exposes_all_segments() {
        let uri: AtUri = "at://did:plc:abc/app.bsky.feed.repost/3jzfcijpj2z2a"
            .parse()
            .unwrap();
        assert_eq!(uri.authority(), "did:plc:abc");
        assert_eq!(uri.collection(), REPOST_COLLECTION);
        assert_eq!(uri.rkey(), "3jzfcijpj2z2a");
        assert_eq!(uri.to_string(), "at://did:plc:abc/app.bsky.feed.repost/3jzfcijpj2z2a");
    }

    #[test]
    fn test_rejects_uri_without_slash() {
        let err = record_key("3k2x7y", POST_COLLECTION).unwrap_err();
        assert_eq!(err.reason, "missing at:// scheme");
    }

    #[test]
    fn test_rejects_trailing_slash() {
        let err = record_key("at://did:plc:abc/app.bsky.feed.post/", POST_COLLECTION).unwrap_err();
        assert_eq!(err.reason, "empty path segment");
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert!("at://did:plc:abc/app.bsky.feed.post".parse::<AtUri>().is_err());
        assert!("at://did:plc:abc/app.bsky.feed.post/a/b".parse::<AtUri>().is_err());
    }

    #[test]
    fn test_other_collection_still_yields_key() {
        let key = record_key("at://did:plc:abc/app.bsky.feed.post/3k2x7y", REPOST_COLLECTION);
        assert_eq!(key.unwrap(), "3k2x7y");
    }
}
