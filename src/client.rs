use crate::api::{
    CreateRecordInput, CreateRecordOutput, DeleteRecordInput, Embed, FeedPostRecord,
    FeedViewPost, POST_COLLECTION, REPOST_COLLECTION, Record, ReplyRef, RepostRecord, Session,
    SetVoteInput, SetVoteResponse, StrongRef, Timeline, TimelineQuery, UploadBlobOutput,
    VoteDirection, now_timestamp,
};
use crate::error::{ActionError, classify};
use crate::traffic_log;
use crate::transport::{HttpTransport, RequestBody, Transport, TransportFailure, XrpcRequest};
use crate::uri::record_key;
use bytes::Bytes;
use config::Settings;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, warn};

pub const GET_TIMELINE: &str = "app.bsky.feed.getTimeline";
pub const SET_VOTE: &str = "app.bsky.feed.setVote";
pub const CREATE_RECORD: &str = "com.atproto.repo.createRecord";
pub const DELETE_RECORD: &str = "com.atproto.repo.deleteRecord";
pub const UPLOAD_BLOB: &str = "com.atproto.blob.upload";

/// Query parameter carrying the timeline pagination cursor.
pub const TIMELINE_CURSOR_PARAM: &str = "before";

pub type ActionResult<T> = Result<T, ActionError>;

/// Performs actions on behalf of a [`Session`]. Cheap to clone; clones share
/// the underlying transport.
#[derive(Clone)]
pub struct ActionClient {
    transport: Arc<dyn Transport>,
    timeline_page_size: Option<u32>,
}

impl ActionClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_transport(Arc::new(transport))
    }

    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        ActionClient {
            transport,
            timeline_page_size: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = Self::new(HttpTransport::from_settings(settings)?);
        Ok(client.with_timeline_page_size(settings.timeline_page_size))
    }

    pub fn with_timeline_page_size(mut self, page_size: Option<u32>) -> Self {
        self.timeline_page_size = page_size;
        self
    }

    pub async fn fetch_timeline(
        &self,
        session: &Session,
        cursor: Option<&str>,
    ) -> ActionResult<Timeline> {
        let query = TimelineQuery {
            cursor: cursor.map(str::to_string),
            limit: self.timeline_page_size,
        };
        self.fetch_timeline_page(session, query).await
    }

    pub async fn fetch_timeline_page(
        &self,
        session: &Session,
        query: TimelineQuery,
    ) -> ActionResult<Timeline> {
        debug!(before = ?query.cursor, limit = ?query.limit, "Get timeline");

        let request = XrpcRequest::query(GET_TIMELINE, session)
            .param(TIMELINE_CURSOR_PARAM, query.cursor)
            .param("limit", query.limit.map(|l| l.to_string()));
        self.run_json("fetch_timeline", request).await
    }

    pub async fn cast_upvote(
        &self,
        session: &Session,
        subject: &StrongRef,
    ) -> ActionResult<SetVoteResponse> {
        debug!(uri = %subject.uri, cid = %subject.cid, "Upvote post");

        let request = self.set_vote_request("cast_upvote", session, subject, VoteDirection::Up)?;
        self.run_json("cast_upvote", request).await
    }

    pub async fn cancel_vote(&self, session: &Session, subject: &StrongRef) -> ActionResult<()> {
        debug!(uri = %subject.uri, cid = %subject.cid, "Cancel vote");

        let request =
            self.set_vote_request("cancel_vote", session, subject, VoteDirection::None)?;
        self.run_authenticated("cancel_vote", request).await?;
        Ok(())
    }

    pub async fn create_repost(
        &self,
        session: &Session,
        subject: &StrongRef,
    ) -> ActionResult<CreateRecordOutput> {
        debug!(uri = %subject.uri, cid = %subject.cid, "Repost");

        let record = Record::Repost(RepostRecord::new(subject.clone(), now_timestamp()));
        let request = self.create_record_request("create_repost", session, record)?;
        self.run_json("create_repost", request).await
    }

    pub async fn cancel_repost(&self, session: &Session, uri: &str) -> ActionResult<()> {
        debug!(uri, "Cancel repost");

        self.delete_record("cancel_repost", session, REPOST_COLLECTION, uri)
            .await
    }

    pub async fn create_post(
        &self,
        session: &Session,
        text: &str,
        image_cid: Option<&str>,
        image_mime_type: Option<&str>,
    ) -> ActionResult<()> {
        debug!(content = %traffic_log::truncate_for_log(text, 50), "Create a post");

        let record = FeedPostRecord::new(text, now_timestamp())
            .with_embed(Embed::from_image_parts(image_cid, image_mime_type));
        let request = self.create_record_request("create_post", session, Record::Post(record))?;
        self.run_authenticated("create_post", request).await?;
        Ok(())
    }

    pub async fn create_reply(
        &self,
        session: &Session,
        text: &str,
        to: &ReplyRef,
        image_cid: Option<&str>,
        image_mime_type: Option<&str>,
    ) -> ActionResult<()> {
        debug!(
            content = %traffic_log::truncate_for_log(text, 50),
            parent = %to.parent.uri,
            "Create a reply"
        );

        let record = FeedPostRecord::new(text, now_timestamp())
            .with_reply(to.clone())
            .with_embed(Embed::from_image_parts(image_cid, image_mime_type));
        let request = self.create_record_request("create_reply", session, Record::Post(record))?;
        self.run_authenticated("create_reply", request).await?;
        Ok(())
    }

    pub async fn delete_post(&self, session: &Session, post: &FeedViewPost) -> ActionResult<()> {
        debug!(uri = %post.post.uri, "Delete post");

        self.delete_record("delete_post", session, POST_COLLECTION, &post.post.uri)
            .await
    }

    pub async fn upload_blob(
        &self,
        session: &Session,
        data: impl Into<Bytes>,
        mime_type: &str,
    ) -> ActionResult<UploadBlobOutput> {
        let bytes = data.into();
        traffic_log::log_upload("upload_blob", bytes.len(), mime_type);

        let body = RequestBody::Binary {
            bytes,
            content_type: mime_type.to_string(),
        };
        let request = XrpcRequest::procedure(UPLOAD_BLOB, session, body);
        self.run_json("upload_blob", request).await
    }

    fn set_vote_request(
        &self,
        operation: &'static str,
        session: &Session,
        subject: &StrongRef,
        direction: VoteDirection,
    ) -> ActionResult<XrpcRequest> {
        let input = SetVoteInput {
            subject: subject.clone(),
            direction,
        };
        let body = self.json_body(operation, &input)?;
        Ok(XrpcRequest::procedure(SET_VOTE, session, body))
    }

    fn create_record_request(
        &self,
        operation: &'static str,
        session: &Session,
        record: Record,
    ) -> ActionResult<XrpcRequest> {
        let input = CreateRecordInput::new(session.did.clone(), record);
        let body = self.json_body(operation, &input)?;
        Ok(XrpcRequest::procedure(CREATE_RECORD, session, body))
    }

    async fn delete_record(
        &self,
        operation: &'static str,
        session: &Session,
        collection: &'static str,
        uri: &str,
    ) -> ActionResult<()> {
        let rkey = record_key(uri, collection).map_err(|e| {
            let error = ActionError::from(e);
            self.report(operation, &error);
            error
        })?;

        let input = DeleteRecordInput {
            did: session.did.clone(),
            collection,
            rkey,
        };
        let body = self.json_body(operation, &input)?;
        let request = XrpcRequest::procedure(DELETE_RECORD, session, body);
        self.run_authenticated(operation, request).await?;
        Ok(())
    }

    fn json_body(
        &self,
        operation: &'static str,
        input: &impl Serialize,
    ) -> ActionResult<RequestBody> {
        traffic_log::log_request(operation, input);
        serde_json::to_value(input)
            .map(RequestBody::Json)
            .map_err(|e| {
                self.fail(
                    operation,
                    TransportFailure::Unknown {
                        diagnostic: format!("unserializable request body: {}", e),
                    },
                )
            })
    }

    /// Invokes the transport once and classifies any failure.
    async fn run_authenticated(
        &self,
        operation: &'static str,
        request: XrpcRequest,
    ) -> ActionResult<Bytes> {
        self.transport
            .execute(request)
            .await
            .map_err(|failure| self.fail(operation, failure))
    }

    async fn run_json<T>(&self, operation: &'static str, request: XrpcRequest) -> ActionResult<T>
    where
        T: DeserializeOwned + Serialize,
    {
        let body = self.run_authenticated(operation, request).await?;
        let value = serde_json::from_slice::<T>(&body).map_err(|e| {
            self.fail(
                operation,
                TransportFailure::Unknown {
                    diagnostic: format!("unparseable response body: {}", e),
                },
            )
        })?;
        traffic_log::log_response(operation, &value);
        Ok(value)
    }

    fn fail(&self, operation: &'static str, failure: TransportFailure) -> ActionError {
        let error = classify(failure);
        self.report(operation, &error);
        error
    }

    fn report(&self, operation: &'static str, error: &ActionError) {
        warn!(
            operation,
            status = ?error.status(),
            auth_expired = error.is_auth_expired(),
            "XRPC call failed: {}",
            error
        );
        traffic_log::log_error(operation, error.detail());
    }
}
