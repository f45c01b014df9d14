use std::future::Future;
use std::sync::Arc;

use reqwest::multipart::Form;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;
use crate::token::Token;

pub const CHECK_PATH: &str = "/signup_check/username";

/// Outcome of a single probe.
///
/// Only `Available` is acted on. `Unavailable` and `Indeterminate` are both
/// reported as "not available"; the split exists for tracing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Available,
    Unavailable,
    Indeterminate,
}

impl ProbeResult {
    pub fn is_available(self) -> bool {
        matches!(self, ProbeResult::Available)
    }
}

/// One availability check for one candidate name.
///
/// Implementations must absorb their own failures: a probe never errors, it
/// classifies.
pub trait Prober: Send + Sync {
    fn probe(&self, name: &str) -> impl Future<Output = ProbeResult> + Send;
}

/// Body the endpoint returns for a free name.
pub fn available_message(name: &str) -> String {
    format!("{} is available.", name)
}

/// Classify a response body. The match is exact: no trimming, no case folding.
pub fn classify_body(name: &str, body: &str) -> ProbeResult {
    if body == available_message(name) {
        ProbeResult::Available
    } else {
        ProbeResult::Unavailable
    }
}

/// Probes the signup check endpoint through a shared session and token.
#[derive(Debug, Clone)]
pub struct HttpProber {
    session: Arc<Session>,
    token: Token,
}

impl HttpProber {
    pub fn new(session: Arc<Session>, token: Token) -> Self {
        HttpProber { session, token }
    }

    async fn request(&self, name: &str) -> Result<String> {
        let form = Form::new()
            .text("authenticity_token", self.token.as_str().to_owned())
            .text("value", name.to_owned());

        let body = self
            .session
            .client()
            .post(self.session.url(CHECK_PATH)?)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;

        Ok(body)
    }
}

impl Prober for HttpProber {
    async fn probe(&self, name: &str) -> ProbeResult {
        match self.request(name).await {
            Ok(body) => {
                let result = classify_body(name, &body);
                if !result.is_available() {
                    debug!("'{}' not available: {:.80}", name, body);
                }
                result
            }
            Err(e) => {
                debug!("Probe for '{}' failed: {}", name, e);
                ProbeResult::Indeterminate
            }
        }
    }
}
