use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Explicit, load_config};
use crate::endpoints;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::util::{check_status, parse_json, urljoin};

pub(crate) const TOKEN_HEADER: &str = "rest-dspace-token";

#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the DSpace installation, e.g. `https://repository.example.org`.
    /// The `/RESTapi` prefix is appended per endpoint.
    pub url: String,
    /// Account email used for login.
    pub email: String,
    pub password: String,
    /// Community used by [`Client::get_default_community`].
    pub community_id: Option<String>,
    /// Whether to verify TLS certificates.
    pub verify: bool,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("community_id", &self.community_id)
            .field("verify", &self.verify)
            .finish()
    }
}

/// Blocking client for the DSpace REST API.
///
/// Every write operation on `Client` logs in, performs its request and logs out
/// again, so each one costs three round trips. Use [`Client::login`] or
/// [`Client::with_session`] to run several writes with one token.
///
/// A `Client` can be cloned and shared, but the per-call login/logout pairs are
/// not coordinated: against a service that allows a single session per account,
/// concurrent writes from several threads will invalidate each other's tokens.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    /// Creates a client using environment variables and/or `.dspacerc`.
    ///
    /// This is equivalent to `Client::new(None, None, None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None, None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit arguments
    /// - environment variables `DSPACE_URL` / `DSPACE_EMAIL` / `DSPACE_PASSWORD` /
    ///   `DSPACE_COMMUNITY_ID`
    /// - config file from `DSPACE_RC` or `.dspacerc`
    pub fn new(
        url: Option<String>,
        email: Option<String>,
        password: Option<String>,
        community_id: Option<String>,
    ) -> Result<Self> {
        let cfg = load_config(Explicit {
            url,
            email,
            password,
            community_id,
        })
        .map_err(Error::Config)?;
        Self::from_config(cfg)
    }

    /// Creates a client from a fully specified configuration, without looking at
    /// the environment or any rc file.
    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("dspace-rest-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("dspace-rest-rs")),
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = HttpClient::builder().default_headers(default_headers);
        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(anyhow::Error::new(e).context("failed to build HTTP client")))?;

        Ok(Self {
            config: cfg,
            timeout: Duration::from_secs(60),
            http,
        })
    }

    /// Per-request timeout, 60 seconds by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.url
    }

    pub fn default_community_id(&self) -> Option<&str> {
        self.config.community_id.as_deref()
    }

    /// Logs in with the configured credentials and returns the session token.
    ///
    /// Login fails when the service answers with anything but 200, or with an
    /// empty body.
    pub fn login(&self) -> Result<Session<'_>> {
        let endpoint = endpoints::login();
        let credentials = serde_json::json!({
            "email": self.config.email,
            "password": self.config.password,
        });

        debug!(endpoint = %endpoint, "logging in");
        let resp = self
            .request("POST", &endpoint, None)
            .json(&credentials)
            .send()
            .map_err(|source| Error::Transport {
                method: "POST",
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|source| Error::Transport {
            method: "POST",
            endpoint: endpoint.clone(),
            source,
        })?;

        if status != StatusCode::OK {
            let reason = text.trim();
            return Err(Error::Authentication {
                status: status.as_u16(),
                reason: if reason.is_empty() {
                    "login rejected".to_string()
                } else {
                    reason.to_string()
                },
            });
        }

        let token = text.trim();
        if token.is_empty() {
            return Err(Error::Authentication {
                status: status.as_u16(),
                reason: "empty session token".to_string(),
            });
        }

        Ok(Session::new(self, token.to_string()))
    }

    /// Invalidates the session token. Failures are logged and otherwise ignored.
    pub fn logout(&self, session: Session<'_>) {
        let endpoint = endpoints::logout();
        debug!(endpoint = %endpoint, "logging out");
        match self
            .request("POST", &endpoint, Some(session.token()))
            .send()
        {
            Ok(resp) if resp.status() == StatusCode::OK => {}
            Ok(resp) => warn!(status = resp.status().as_u16(), "logout was not accepted"),
            Err(e) => warn!(error = %e, "logout request failed"),
        }
    }

    /// Runs `f` inside a fresh session. The session is logged out afterwards even
    /// when `f` fails.
    pub fn with_session<T>(&self, f: impl FnOnce(&Session<'_>) -> Result<T>) -> Result<T> {
        let session = self.login()?;
        let result = f(&session);
        self.logout(session);
        result
    }

    /// Returns array of all communities.
    pub fn get_communities(&self) -> Result<Value> {
        self.get_json(&endpoints::communities())
    }

    /// Returns array of all top-level communities.
    pub fn get_top_communities(&self) -> Result<Value> {
        self.get_json(&endpoints::top_communities())
    }

    pub fn get_community(&self, community_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::community(community_id))
    }

    /// Reads the community configured as `community_id`.
    ///
    /// Fails with [`Error::Config`] when no default community is configured.
    pub fn get_default_community(&self) -> Result<Value> {
        let id = self.default_community_id().ok_or_else(|| {
            Error::Config(anyhow::anyhow!(
                "no default community configured (set DSPACE_COMMUNITY_ID or `community:`)"
            ))
        })?;
        self.get_community(id)
    }

    /// Returns array of collections of community.
    pub fn get_community_collections(&self, community_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::community_collections(community_id))
    }

    /// Returns array of subcommunities of community.
    pub fn get_community_subcommunities(&self, community_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::community_subcommunities(community_id))
    }

    /// Creates a top-level community.
    pub fn create_community<T: Serialize + ?Sized>(&self, community: &T) -> Result<Value> {
        self.with_session(|s| s.create_community(community))
    }

    pub fn create_community_collection<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        collection: &T,
    ) -> Result<Value> {
        self.with_session(|s| s.create_community_collection(community_id, collection))
    }

    pub fn create_community_subcommunity<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        community: &T,
    ) -> Result<Value> {
        self.with_session(|s| s.create_community_subcommunity(community_id, community))
    }

    pub fn update_community<T: Serialize + ?Sized>(
        &self,
        community_id: impl Display,
        community: &T,
    ) -> Result<String> {
        self.with_session(|s| s.update_community(community_id, community))
    }

    pub fn delete_community(&self, community_id: impl Display) -> Result<String> {
        self.with_session(|s| s.delete_community(community_id))
    }

    pub fn delete_community_collection(
        &self,
        community_id: impl Display,
        collection_id: impl Display,
    ) -> Result<String> {
        self.with_session(|s| s.delete_community_collection(community_id, collection_id))
    }

    pub fn delete_community_subcommunity(
        &self,
        community_id: impl Display,
        subcommunity_id: impl Display,
    ) -> Result<String> {
        self.with_session(|s| s.delete_community_subcommunity(community_id, subcommunity_id))
    }

    pub fn get_collections(&self) -> Result<Value> {
        self.get_json(&endpoints::collections())
    }

    pub fn get_collection(&self, collection_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::collection(collection_id))
    }

    pub fn get_collection_items(&self, collection_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::collection_items(collection_id))
    }

    /// Looks a collection up by its exact name.
    pub fn find_collection(&self, name: &str) -> Result<Value> {
        let endpoint = endpoints::find_collection();
        let body = self.post_json(&endpoint, None, name)?;
        parse_json(&endpoint, body)
    }

    /// Creates an item in the collection.
    pub fn create_collection_item<T: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        item: &T,
    ) -> Result<Value> {
        self.with_session(|s| s.create_collection_item(collection_id, item))
    }

    pub fn update_collection<T: Serialize + ?Sized>(
        &self,
        collection_id: impl Display,
        collection: &T,
    ) -> Result<String> {
        self.with_session(|s| s.update_collection(collection_id, collection))
    }

    pub fn delete_collection(&self, collection_id: impl Display) -> Result<String> {
        self.with_session(|s| s.delete_collection(collection_id))
    }

    pub fn delete_collection_item(
        &self,
        collection_id: impl Display,
        item_id: impl Display,
    ) -> Result<String> {
        self.with_session(|s| s.delete_collection_item(collection_id, item_id))
    }

    pub fn get_items(&self) -> Result<Value> {
        self.get_json(&endpoints::items())
    }

    pub fn get_item(&self, item_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::item(item_id))
    }

    pub fn get_item_metadata(&self, item_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::item_metadata(item_id))
    }

    pub fn get_item_bitstreams(&self, item_id: impl Display) -> Result<Value> {
        self.get_json(&endpoints::item_bitstreams(item_id))
    }

    /// Returns the items carrying the given metadata entry, e.g.
    /// `{"key": "dc.title", "value": "Annual report", "language": null}`.
    pub fn find_items_by_metadata<T: Serialize + ?Sized>(&self, entry: &T) -> Result<Value> {
        let endpoint = endpoints::find_items_by_metadata();
        let body = self.post_json(&endpoint, None, entry)?;
        parse_json(&endpoint, body)
    }

    /// Adds an array of metadata entries to the item.
    pub fn add_item_metadata<T: Serialize + ?Sized>(
        &self,
        item_id: impl Display,
        metadata: &T,
    ) -> Result<Value> {
        self.with_session(|s| s.add_item_metadata(item_id, metadata))
    }

    /// Uploads the file at `path` as a new bitstream of the item.
    pub fn add_item_bitstream(&self, item_id: impl Display, path: &Path) -> Result<Value> {
        self.with_session(|s| s.add_item_bitstream(item_id, path))
    }

    pub fn update_item_metadata<T: Serialize + ?Sized>(
        &self,
        item_id: impl Display,
        metadata: &T,
    ) -> Result<String> {
        self.with_session(|s| s.update_item_metadata(item_id, metadata))
    }

    pub fn delete_item(&self, item_id: impl Display) -> Result<String> {
        self.with_session(|s| s.delete_item(item_id))
    }

    /// Removes all metadata of the item.
    pub fn clear_item_metadata(&self, item_id: impl Display) -> Result<String> {
        self.with_session(|s| s.clear_item_metadata(item_id))
    }

    pub fn delete_item_bitstream(
        &self,
        item_id: impl Display,
        bitstream_id: impl Display,
    ) -> Result<String> {
        self.with_session(|s| s.delete_item_bitstream(item_id, bitstream_id))
    }

    /// Returns the community, collection or item registered under `handle`,
    /// with its bitstreams expanded.
    pub fn resolve_handle(&self, handle: &str) -> Result<Value> {
        self.with_session(|s| s.resolve_handle(handle))
    }

    fn get_json(&self, endpoint: &str) -> Result<Value> {
        let body = self.get(endpoint, None, &[])?;
        parse_json(endpoint, body)
    }

    pub(crate) fn get(
        &self,
        endpoint: &str,
        token: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<String> {
        let mut req = self.request("GET", endpoint, token);
        if !query.is_empty() {
            req = req.query(query);
        }
        self.dispatch("GET", endpoint, req, None)
    }

    pub(crate) fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<String> {
        let req = self.request("POST", endpoint, token).json(body);
        self.dispatch("POST", endpoint, req, describe(body))
    }

    /// Sends the file's bytes unchanged as the request body.
    pub(crate) fn post_data(&self, endpoint: &str, token: Option<&str>, path: &Path) -> Result<String> {
        let data = std::fs::read(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(endpoint, path = %path.display(), bytes = data.len(), "uploading file");

        let req = self
            .request("POST", endpoint, token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data);
        self.dispatch("POST", endpoint, req, Some(path.display().to_string()))
    }

    pub(crate) fn put<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<String> {
        let req = self.request("PUT", endpoint, token).json(body);
        self.dispatch("PUT", endpoint, req, describe(body))
    }

    pub(crate) fn delete(&self, endpoint: &str, token: Option<&str>) -> Result<String> {
        let req = self.request("DELETE", endpoint, token);
        self.dispatch("DELETE", endpoint, req, None)
    }

    fn request(&self, method: &str, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let url = urljoin(&self.config.url, endpoint);
        let req = match method {
            "GET" => self.http.get(url),
            "PUT" => self.http.put(url),
            "DELETE" => self.http.delete(url),
            _ => self.http.post(url),
        };
        let req = req.timeout(self.timeout);
        match token {
            Some(token) => req.header(TOKEN_HEADER, token),
            None => req,
        }
    }

    fn dispatch(
        &self,
        method: &'static str,
        endpoint: &str,
        req: RequestBuilder,
        payload: Option<String>,
    ) -> Result<String> {
        let transport = |source: reqwest::Error| Error::Transport {
            method,
            endpoint: endpoint.to_string(),
            source,
        };

        debug!(method, endpoint, "sending request");
        let resp = req.send().map_err(transport)?;
        let status = resp.status();
        debug!(method, endpoint, status = status.as_u16(), "received response");

        let body = resp.text().map_err(transport)?;
        check_status(status, method, endpoint, body, payload)
    }
}

fn describe<T: Serialize + ?Sized>(body: &T) -> Option<String> {
    serde_json::to_string(body).ok()
}
