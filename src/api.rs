use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
pub const REPOST_COLLECTION: &str = "app.bsky.feed.repost";

/// An authenticated account: the repo DID plus the bearer token for it.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: String,
    pub access_jwt: String,
}

impl Session {
    pub fn new(did: impl Into<String>, access_jwt: impl Into<String>) -> Self {
        Session {
            did: did.into(),
            access_jwt: access_jwt.into(),
        }
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.access_jwt)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("access_jwt", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

impl StrongRef {
    pub fn new(uri: impl Into<String>, cid: impl Into<String>) -> Self {
        StrongRef {
            uri: uri.into(),
            cid: cid.into(),
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    /// Clears any existing vote on the subject.
    None,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SetVoteInput {
    pub subject: StrongRef,
    pub direction: VoteDirection,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SetVoteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvote: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downvote: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReplyRef {
    pub root: StrongRef,
    pub parent: StrongRef,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub cid: String,
    pub mime_type: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Image {
    pub image: ImageRef,
    pub alt: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct External {
    pub uri: String,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum Embed {
    #[serde(rename = "app.bsky.embed.images")]
    Images { images: Vec<Image> },

    #[serde(rename = "app.bsky.embed.external")]
    External { external: External },
}

impl Embed {
    /// A single uploaded image with empty alt text.
    pub fn single_image(cid: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Embed::Images {
            images: vec![Image {
                image: ImageRef {
                    cid: cid.into(),
                    mime_type: mime_type.into(),
                },
                alt: String::new(),
            }],
        }
    }

    /// Builds an image embed only when both halves of the blob reference are known.
    pub fn from_image_parts(cid: Option<&str>, mime_type: Option<&str>) -> Option<Self> {
        match (cid, mime_type) {
            (Some(cid), Some(mime_type)) => Some(Embed::single_image(cid, mime_type)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostRecord {
    pub text: String,

    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
}

impl FeedPostRecord {
    pub fn new(text: impl Into<String>, created_at: impl Into<String>) -> Self {
        FeedPostRecord {
            text: text.into(),
            created_at: created_at.into(),
            reply: None,
            embed: None,
        }
    }

    pub fn with_reply(mut self, reply: ReplyRef) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_embed(mut self, embed: Option<Embed>) -> Self {
        self.embed = embed;
        self
    }

    pub fn created_at_instant(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.created_at).map(|t| t.with_timezone(&Utc))
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepostRecord {
    pub subject: StrongRef,
    pub created_at: String,
}

impl RepostRecord {
    pub fn new(subject: StrongRef, created_at: impl Into<String>) -> Self {
        RepostRecord {
            subject,
            created_at: created_at.into(),
        }
    }
}

/// Every record kind this client can write, tagged with its `$type`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "$type")]
pub enum Record {
    #[serde(rename = "app.bsky.feed.post")]
    Post(FeedPostRecord),

    #[serde(rename = "app.bsky.feed.repost")]
    Repost(RepostRecord),
}

impl Record {
    /// The repo collection a record of this kind lives in.
    pub fn collection(&self) -> &'static str {
        match self {
            Record::Post(_) => POST_COLLECTION,
            Record::Repost(_) => REPOST_COLLECTION,
        }
    }
}

/// Body of `com.atproto.repo.createRecord`. The collection is always taken
/// from the record, so the two cannot disagree.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CreateRecordInput {
    did: String,
    collection: &'static str,
    record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    validate: Option<bool>,
}

impl CreateRecordInput {
    pub fn new(did: impl Into<String>, record: Record) -> Self {
        CreateRecordInput {
            did: did.into(),
            collection: record.collection(),
            record,
            validate: None,
        }
    }

    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DeleteRecordInput {
    pub did: String,
    pub collection: &'static str,
    pub rkey: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreateRecordOutput {
    pub uri: String,
    pub cid: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UploadBlobOutput {
    pub cid: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PostView {
    pub uri: String,

    pub cid: String,

    #[serde(default)]
    pub record: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FeedViewPost {
    pub post: PostView,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Timeline {
    pub feed: Vec<FeedViewPost>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimelineQuery {
    /// Opaque pagination cursor from a previous page.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// Wall-clock instant in the form records expect, e.g. `2024-01-01T00:00:00.000Z`.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
