//! reqwest implementation of the remote service.

use crate::ServiceConfig;
use crate::config::{COMMIT_PATH, HASH_CHECK_PATH, MEDIA_LIST_PATH};
use async_trait::async_trait;
use photoferry_core::{ContentId, DeviceProfile, RemoteRef};
use photoferry_error::{
    ConfigError, FailureClass, PhotoferryResult, TransportError, TransportErrorKind,
};
use photoferry_interface::{Credential, MediaPage, PhotoService, ServiceCall, UploadSession};
use photoferry_protocol::{
    CommitRequest, CommitResponse, CommitToken, HashCheckRequest, HashCheckResponse,
    MediaListRequest, MediaListResponse, ProtocolResponse, UploadTokenRequest, decode, dump,
    encode,
};
use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROTOBUF: &str = "application/x-protobuf";
const UPLOAD_ID_HEADER: &str = "X-GUploader-UploadID";

/// The photo library over HTTPS.
///
/// Every call fetches a bearer token from the [`Credential`] and makes one
/// request. Non-2xx statuses become [`TransportErrorKind::Http`] and
/// connection failures [`TransportErrorKind::Network`]; bodies are decoded
/// strictly.
#[derive(Clone)]
pub struct HttpPhotoService {
    http: Client,
    credential: Arc<dyn Credential>,
    config: ServiceConfig,
    device: DeviceProfile,
}

impl std::fmt::Debug for HttpPhotoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPhotoService")
            .field("config", &self.config)
            .field("device", &self.device)
            .finish()
    }
}

impl HttpPhotoService {
    /// Create a client for `config`, authenticating with `credential`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new(config: ServiceConfig, credential: Arc<dyn Credential>) -> PhotoferryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .gzip(true)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            credential,
            config,
            device: DeviceProfile::default(),
        })
    }

    /// Present requests as coming from `device`.
    pub fn with_device(mut self, device: DeviceProfile) -> Self {
        self.device = device;
        self
    }

    /// Endpoint configuration in use.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn headers(&self) -> PhotoferryResult<HeaderMap> {
        let token = self.credential.bearer_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value("Authorization", &format!("Bearer {}", token))?);
        headers.insert(ACCEPT_LANGUAGE, header_value("Accept-Language", self.config.language())?);
        headers.insert(
            USER_AGENT,
            header_value("User-Agent", &self.config.user_agent_for(&self.device))?,
        );
        Ok(headers)
    }

    async fn post_protobuf(&self, url: &str, body: Vec<u8>) -> PhotoferryResult<RequestBuilder> {
        Ok(self
            .http
            .post(url)
            .headers(self.headers().await?)
            .header(CONTENT_TYPE, PROTOBUF)
            .body(body))
    }
}

fn header_value(name: &str, value: &str) -> PhotoferryResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::new(format!("Invalid {} header value: {}", name, e)).into())
}

async fn send(call: ServiceCall, request: RequestBuilder) -> PhotoferryResult<Response> {
    let response = request.send().await.map_err(|e| {
        warn!(call = %call, error = %e, "Request failed");
        TransportError::new(TransportErrorKind::Network(e.to_string()))
    })?;

    let status = response.status();
    debug!(call = %call, status = status.as_u16(), "Response received");
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(call = %call, status = status.as_u16(), "Service returned an error status");
        return Err(TransportError::new(TransportErrorKind::Http {
            status_code: status.as_u16(),
            message,
        })
        .into());
    }
    Ok(response)
}

async fn read_body(response: Response) -> PhotoferryResult<Vec<u8>> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::new(TransportErrorKind::Network(e.to_string())))?;
    Ok(bytes.to_vec())
}

fn decode_logged<R: ProtocolResponse>(call: ServiceCall, body: &[u8]) -> PhotoferryResult<R> {
    decode::<R>(body).inspect_err(|e| {
        if e.class() == FailureClass::Decode {
            debug!(call = %call, payload = %dump(body), "Undecodable response");
        }
    })
}

#[async_trait]
impl PhotoService for HttpPhotoService {
    #[instrument(skip(self), fields(content_id = %id))]
    async fn find_by_content_id(&self, id: &ContentId) -> PhotoferryResult<Option<RemoteRef>> {
        let body = encode(&HashCheckRequest { content_id: *id })?;
        let request = self.post_protobuf(&self.config.api_url(HASH_CHECK_PATH), body).await?;
        let bytes = read_body(send(ServiceCall::HashCheck, request).await?).await?;
        let response: HashCheckResponse = decode_logged(ServiceCall::HashCheck, &bytes)?;
        debug!(found = response.media_key.is_some(), "Remote existence check");
        Ok(response.media_key)
    }

    #[instrument(skip(self), fields(content_id = %id))]
    async fn begin_upload(&self, id: &ContentId, size: u64) -> PhotoferryResult<UploadSession> {
        let body = encode(&UploadTokenRequest { file_size: size })?;
        let request = self
            .post_protobuf(self.config.upload_endpoint(), body)
            .await?
            .header("X-Goog-Hash", format!("sha1={}", id.to_base64()))
            .header("X-Upload-Content-Length", size.to_string());
        let response = send(ServiceCall::BeginUpload, request).await?;

        let token = response
            .headers()
            .get(UPLOAD_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                TransportError::new(TransportErrorKind::MissingHeader(UPLOAD_ID_HEADER.to_string()))
            })?
            .to_string();
        debug!("Upload session negotiated");
        Ok(UploadSession::new(token, *id, size))
    }

    #[instrument(skip(self, session, chunk), fields(content_id = %session.content_id(), len = chunk.len()))]
    async fn upload_chunk(
        &self,
        session: &UploadSession,
        offset: u64,
        chunk: Vec<u8>,
        last: bool,
    ) -> PhotoferryResult<Option<CommitToken>> {
        let command = if last { "upload, finalize" } else { "upload" };
        let request = self
            .http
            .put(self.config.upload_endpoint())
            .query(&[("upload_id", session.token().as_str())])
            .headers(self.headers().await?)
            .header("X-Goog-Upload-Command", command)
            .header("X-Goog-Upload-Offset", offset.to_string())
            .body(chunk);
        let response = send(ServiceCall::UploadChunk, request).await?;

        if !last {
            return Ok(None);
        }
        let bytes = read_body(response).await?;
        let token: CommitToken = decode_logged(ServiceCall::UploadChunk, &bytes)?;
        Ok(Some(token))
    }

    #[instrument(skip(self, request), fields(file_name = %request.file_name, content_id = %request.content_id))]
    async fn commit(&self, request: &CommitRequest) -> PhotoferryResult<RemoteRef> {
        let body = encode(request)?;
        let http_request = self.post_protobuf(&self.config.api_url(COMMIT_PATH), body).await?;
        let bytes = read_body(send(ServiceCall::Commit, http_request).await?).await?;
        let response: CommitResponse = decode_logged(ServiceCall::Commit, &bytes)?;
        Ok(response.media_key)
    }

    #[instrument(skip(self))]
    async fn list_media(&self, page_token: Option<&str>) -> PhotoferryResult<MediaPage> {
        let body = encode(&MediaListRequest {
            page_token: page_token.map(str::to_string),
            limit: 0,
        })?;
        let request = self
            .post_protobuf(&self.config.api_url(MEDIA_LIST_PATH), body)
            .await?
            .header("x-goog-ext-173412678-bin", "CgcIAhClARgC")
            .header("x-goog-ext-174067345-bin", "CgIIAg==");
        let bytes = read_body(send(ServiceCall::ListMedia, request).await?).await?;
        let page: MediaListResponse = decode_logged(ServiceCall::ListMedia, &bytes)?;
        debug!(items = page.items.len(), has_next = page.next_page_token.is_some(), "Fetched media page");
        Ok(page)
    }

    fn service_name(&self) -> &str {
        "photos-http"
    }
}
