//! The transport orchestrator: composes authorization, client-side rate
//! limiting, request building, retries and response processing into a single
//! call path shared by every resource service.

use std::io::Write;
use std::sync::{Arc, RwLock};

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::error::{Error, ErrorKind, LimitError, Result};
use crate::limit::{Limit, LimitKind, LimitStore};
use crate::request::{Request, RequestMethod, HEADER_ORG_ID};
use crate::response::{self, Response, MEDIA_TYPE_JSON};
use crate::retry;

/// Client for the Axiom API.
///
/// The client is cheap to clone and safe to share: clones reference the same
/// transport pool, configuration and rate limit state. Every resource service
/// reduces its operations to a single [`call`](Client::call) (or
/// [`execute`](Client::execute) / [`call_writer`](Client::call_writer)) on a
/// cloned handle.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: RwLock<ClientConfig>,
    limits: LimitStore,
}

impl Client {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config: RwLock::new(config),
                limits: LimitStore::default(),
            }),
        }
    }

    /// Create a client from defaults and the `AXIOM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::builder().build()?))
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.inner
            .config
            .read()
            .expect("config lock poisoned")
            .clone()
    }

    /// The shared rate limit state observed from server responses.
    pub fn limits(&self) -> &LimitStore {
        &self.inner.limits
    }

    /// Apply further options on top of the current configuration.
    ///
    /// The resulting configuration is re-validated and swapped in atomically;
    /// in-flight calls keep the snapshot they started with. The environment
    /// is not consulted again.
    pub fn options<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(ClientConfigBuilder) -> ClientConfigBuilder,
    {
        let builder = ClientConfigBuilder::from_config(&self.config());
        let config = apply(builder).build()?;
        *self.inner.config.write().expect("config lock poisoned") = config;
        Ok(())
    }

    /// Make a request and decode the JSON response body into `T`.
    #[instrument(skip(self, body), fields(method = %method, path = path))]
    pub async fn call<T, B>(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let config = self.config();
        let body = encode_body(body)?;
        let (limit, resp) = self.dispatch(&config, method, path, body).await?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map_err(Error::from)?;
        let data = response::decode_json(&bytes, config.strict_decoding)?;

        Ok(Response {
            data,
            status,
            limit,
        })
    }

    /// Make a request and discard the response body.
    #[instrument(skip(self, body), fields(method = %method, path = path))]
    pub async fn execute<B>(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response<()>>
    where
        B: Serialize + ?Sized,
    {
        let config = self.config();
        let body = encode_body(body)?;
        let (limit, resp) = self.dispatch(&config, method, path, body).await?;

        Ok(Response {
            data: (),
            status: resp.status().as_u16(),
            limit,
        })
    }

    /// Make a request and stream the response body verbatim into the sink.
    #[instrument(skip(self, body, out), fields(method = %method, path = path))]
    pub async fn call_writer<B, W>(
        &self,
        method: RequestMethod,
        path: &str,
        body: Option<&B>,
        out: &mut W,
    ) -> Result<Response<()>>
    where
        B: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let config = self.config();
        let body = encode_body(body)?;
        let (limit, resp) = self.dispatch(&config, method, path, body).await?;
        let status = resp.status().as_u16();

        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::from)?;
            out.write_all(&chunk)
                .map_err(|e| Error::with_source(ErrorKind::Io(e.to_string()), e))?;
        }

        Ok(Response {
            data: (),
            status,
            limit,
        })
    }

    /// The shared call path: authorize, short-circuit on exhausted limits,
    /// send with retries, record the reported limit and classify errors.
    /// Returns the raw response with its body still unread.
    async fn dispatch(
        &self,
        config: &ClientConfig,
        method: RequestMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(Limit, reqwest::Response)> {
        let request = Request::new(config, method, path, body)?;

        if !config.no_limiting {
            if let Some(limit) = self.inner.limits.exhausted(LimitKind::Rate) {
                warn!(scope = %limit.scope, "request short-circuited, rate limit exhausted");
                return Err(Error::new(ErrorKind::Limit(LimitError {
                    limit,
                    message: format!(
                        "{} rate limit exceeded, not making remote request",
                        limit.scope
                    ),
                })));
            }
        }

        let resp = self.send_with_retry(config, &request).await?;

        let status = resp.status().as_u16();
        let limit = Limit::from_headers(resp.headers());
        if !limit.is_zero() {
            self.inner.limits.set(limit);
        }

        if status >= 400 {
            let content_type = resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = resp.text().await.unwrap_or_default();
            return Err(response::parse_error(
                status,
                limit,
                content_type.as_deref(),
                &body,
            ));
        }

        Ok((limit, resp))
    }

    /// Run attempts until one is not a transient failure or retries are
    /// exhausted. The last outcome is returned unchanged either way.
    async fn send_with_retry(
        &self,
        config: &ClientConfig,
        request: &Request,
    ) -> Result<reqwest::Response> {
        let mut backoff = config.retry.as_ref().map(|retry| retry.backoff());

        loop {
            debug!(method = %request.method, url = %request.url, "sending request");
            let result = self.send_once(config, request).await;

            let transient = match &result {
                Ok(resp) => retry::is_retryable_status(resp.status().as_u16()),
                Err(err) => retry::is_retryable_transport(err),
            };

            if transient {
                if let Some(backoff) = backoff.as_mut() {
                    if let Some(delay) = backoff.next_delay() {
                        warn!(
                            retries = backoff.retries(),
                            delay_ms = delay.as_millis() as u64,
                            "transient failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                }
            }

            return result.map_err(Error::from);
        }
    }

    /// Execute a single attempt.
    async fn send_once(
        &self,
        config: &ClientConfig,
        request: &Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let mut req = config
            .http_client
            .request(request.method.to_reqwest(), request.url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", config.access_token))
            .header(ACCEPT, MEDIA_TYPE_JSON)
            .header(USER_AGENT, config.user_agent.as_str());

        if let Some(org_id) = &config.org_id {
            req = req.header(HEADER_ORG_ID, org_id.as_str());
        }

        if let Some(body) = &request.body {
            req = req.json(body);
        }

        req.send().await
    }
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<Option<serde_json::Value>> {
    body.map(serde_json::to_value).transpose().map_err(Error::from)
}
