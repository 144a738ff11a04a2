//! Endpoint descriptions and request building
//!
//! A [`Requestable`] says what an endpoint looks like: method, path, query,
//! body or form, extra headers and how to decode the response. Turning one
//! into a concrete [`PreparedRequest`] is pure, so the rules below are
//! tested here without a transport.
//!
//! ## Building rules
//! - Paths without a leading `/` that are not absolute URLs get `/api/v1/`
//! - `as_user_id` (when masquerading) and `no_verifiers=1` are appended
//! - A form wins over a JSON body; the transport encodes it and sets the
//!   multipart content type
//! - `Authorization` is only attached when the target host is the base host

use std::collections::BTreeMap;
use std::fmt;

use canvas_domain::constants::{API_V1_PREFIX, CANVAS_ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::codec::{self, CodecError};
use crate::form::FormData;
use crate::links::Links;
use crate::query::{QueryItem, QueryPair};

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiMethod {
    Delete,
    #[default]
    Get,
    Post,
    Put,
    Head,
    Patch,
}

impl ApiMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while turning a [`Requestable`] into a request. These are
/// mistakes in endpoint definitions rather than runtime failures.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Cannot resolve {path:?} against {base}: {reason}")]
    CannotResolve { path: String, base: Url, reason: String },

    #[error(transparent)]
    Body(#[from] CodecError),
}

/// Response type for endpoints whose body is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoContent;

impl<'de> Deserialize<'de> for NoContent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer).map(|_| NoContent)
    }
}

/// Values the transport supplies when building a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub base_url: &'a Url,
    pub access_token: Option<&'a str>,
    pub act_as_user_id: Option<&'a str>,
    pub user_agent: &'a str,
    /// Boundary announced for bodies streamed from a file; a fresh UUID is
    /// used when `None`
    pub boundary: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn new(base_url: &'a Url, user_agent: &'a str) -> Self {
        Self { base_url, access_token: None, act_as_user_id: None, user_agent, boundary: None }
    }

    #[must_use]
    pub fn access_token(mut self, token: Option<&'a str>) -> Self {
        self.access_token = token;
        self
    }

    #[must_use]
    pub fn act_as_user_id(mut self, user_id: Option<&'a str>) -> Self {
        self.act_as_user_id = user_id;
        self
    }

    #[must_use]
    pub fn boundary(mut self, boundary: &'a str) -> Self {
        self.boundary = Some(boundary);
        self
    }
}

/// A fully built HTTP request, independent of any HTTP library.
///
/// Header names are stored lower-cased. At most one of `body` and `form` is
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: ApiMethod,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub form: Option<FormData>,
    pub handle_cookies: bool,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn set_header(&mut self, name: &str, value: Option<&str>) {
        let key = name.to_ascii_lowercase();
        match value {
            Some(value) => {
                self.headers.insert(key, value.to_string());
            }
            None => {
                self.headers.remove(&key);
            }
        }
    }
}

/// Description of one API endpoint.
pub trait Requestable: Send + Sync {
    type Response: DeserializeOwned + Send + 'static;

    /// Relative path (`courses`), rooted path (`/api/graphql`) or absolute URL.
    fn path(&self) -> String;

    fn method(&self) -> ApiMethod {
        ApiMethod::Get
    }

    /// Extra headers applied last; `None` removes a header.
    fn headers(&self) -> Vec<(String, Option<String>)> {
        Vec::new()
    }

    fn query(&self) -> Vec<QueryItem> {
        Vec::new()
    }

    /// When set, [`Requestable::body`] is ignored.
    fn form(&self) -> Option<FormData> {
        None
    }

    /// Encoded body, only used when there is no form.
    fn body(&self) -> Result<Option<Vec<u8>>, CodecError> {
        Ok(None)
    }

    fn should_handle_cookies(&self) -> bool {
        true
    }

    /// The caller streams the multipart body from a file, so building the
    /// request only announces the content type and carries no form.
    fn is_body_from_file(&self) -> bool {
        false
    }

    /// Strictly percent-encode query names and values (`+` becomes `%2B`).
    fn use_extended_percent_encoding(&self) -> bool {
        false
    }

    /// Ask Canvas to omit file verifiers in rich content links.
    fn should_add_no_verifier_query(&self) -> bool {
        true
    }

    fn decode(&self, data: &[u8]) -> Result<Self::Response, CodecError> {
        codec::decode_json(data)
    }

    /// Build the concrete request for this endpoint.
    ///
    /// # Errors
    /// Returns [`RequestError`] when the path cannot be resolved or the body
    /// cannot be encoded.
    fn prepare(&self, ctx: &RequestContext<'_>) -> Result<PreparedRequest, RequestError> {
        build_request(self, ctx)
    }

    /// Follow-up request for the `next` page, if the response had one.
    fn get_next<'a>(&'a self, links: &Links) -> Option<GetNextRequest<'a, Self>>
    where
        Self: Sized,
    {
        links.next().map(|next| GetNextRequest::new(next, self))
    }
}

fn build_request<R: Requestable + ?Sized>(
    request: &R,
    ctx: &RequestContext<'_>,
) -> Result<PreparedRequest, RequestError> {
    let path = request.path();
    let mut url = resolve_url(&path, ctx.base_url)?;

    let extra = extra_query_pairs(request, ctx.act_as_user_id);
    let query = request.query();

    if request.use_extended_percent_encoding() && !query.is_empty() {
        let mut parts: Vec<String> = url.query().map(|q| vec![q.to_string()]).unwrap_or_default();
        parts.extend(
            query
                .iter()
                .flat_map(QueryItem::to_percent_encoded_pairs)
                .chain(extra)
                .map(|(name, value)| render_pair(&name, value.as_deref())),
        );
        url.set_query(Some(&parts.join("&")));
    } else {
        let pairs: Vec<QueryPair> =
            query.iter().flat_map(QueryItem::to_pairs).chain(extra).collect();
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (name, value) in &pairs {
                match value {
                    Some(value) => serializer.append_pair(name, value),
                    None => serializer.append_key_only(name),
                };
            }
        }
    }

    let mut prepared = PreparedRequest {
        method: request.method(),
        url,
        headers: BTreeMap::new(),
        body: None,
        form: None,
        handle_cookies: request.should_handle_cookies(),
    };

    if let Some(form) = request.form() {
        if request.is_body_from_file() {
            let boundary = match ctx.boundary {
                Some(boundary) => boundary.to_string(),
                None => uuid::Uuid::new_v4().to_string(),
            };
            prepared.set_header("Content-Type", Some(&FormData::content_type(&boundary)));
        } else {
            prepared.form = Some(form);
        }
    } else if let Some(body) = request.body()? {
        prepared.body = Some(body);
        prepared.set_header("Content-Type", Some("application/json"));
    }

    prepared.set_header("Accept", Some(CANVAS_ACCEPT));
    if let Some(token) = ctx.access_token {
        if prepared.url.host_str() == ctx.base_url.host_str() {
            prepared.set_header("Authorization", Some(&format!("Bearer {token}")));
        }
    }
    prepared.set_header("User-Agent", Some(ctx.user_agent));
    for (name, value) in request.headers() {
        prepared.set_header(&name, value.as_deref());
    }

    Ok(prepared)
}

fn resolve_url(path: &str, base: &Url) -> Result<Url, RequestError> {
    if let Ok(absolute) = Url::parse(path) {
        return Ok(absolute);
    }

    let rooted =
        if path.starts_with('/') { path.to_string() } else { format!("{API_V1_PREFIX}{path}") };

    base.join(&rooted).map_err(|e| RequestError::CannotResolve {
        path: path.to_string(),
        base: base.clone(),
        reason: e.to_string(),
    })
}

fn extra_query_pairs<R: Requestable + ?Sized>(
    request: &R,
    act_as_user_id: Option<&str>,
) -> Vec<QueryPair> {
    let mut extra = Vec::new();
    if let Some(user_id) = act_as_user_id {
        extra.push(("as_user_id".to_string(), Some(user_id.to_string())));
    }
    if request.should_add_no_verifier_query() {
        extra.push(("no_verifiers".to_string(), Some("1".to_string())));
    }
    extra
}

fn render_pair(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{name}={value}"),
        None => name.to_string(),
    }
}

/// Request for the next page of a paginated collection.
///
/// The path is the absolute `next` link, so it already carries the original
/// query. Decoding is delegated to the originating request, which matters for
/// endpoints that unwrap an envelope.
pub struct GetNextRequest<'a, R: ?Sized> {
    path: String,
    origin: &'a R,
}

impl<'a, R: Requestable + ?Sized> GetNextRequest<'a, R> {
    pub fn new(path: impl Into<String>, origin: &'a R) -> Self {
        Self { path: path.into(), origin }
    }
}

impl<R: Requestable + ?Sized> Requestable for GetNextRequest<'_, R> {
    type Response = R::Response;

    fn path(&self) -> String {
        self.path.clone()
    }

    fn headers(&self) -> Vec<(String, Option<String>)> {
        self.origin.headers()
    }

    fn should_add_no_verifier_query(&self) -> bool {
        false
    }

    fn decode(&self, data: &[u8]) -> Result<Self::Response, CodecError> {
        self.origin.decode(data)
    }
}
