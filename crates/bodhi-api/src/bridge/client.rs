// Command bridge HTTP client
//
// Wraps `reqwest::Client` with invoke-URL construction and envelope
// unwrapping. Every backend capability is an inherent method defined in
// a sibling module (connections, tasks) so this file stays focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::bridge::models::InvokeResponse;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the desktop backend's command bridge.
///
/// Each backend command is invoked as `POST {base}/invoke/{command}` with a
/// JSON object of named arguments. The bridge answers with the
/// `{ ok, data, error }` envelope; all methods return the unwrapped `data`
/// payload, so callers never see the envelope.
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BridgeClient {
    /// Create a new bridge client from a `TransportConfig`.
    ///
    /// `base_url` is the bridge root (e.g. `http://127.0.0.1:1421`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a bridge client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the invoke URL for a command: `{base}/invoke/{command}`.
    pub(crate) fn invoke_url(&self, command: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/invoke/{command}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Invoke a backend command and unwrap the response envelope.
    pub(crate) async fn invoke<T: DeserializeOwned>(
        &self,
        command: &'static str,
        args: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.invoke_url(command)?;
        debug!(command, "invoking backend command");

        let resp = self
            .http
            .post(url)
            .json(args)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(command, resp).await
    }

    /// Parse the `{ ok, data, error }` envelope, returning `data` on success
    /// or an `Error::Backend` carrying the backend's message otherwise.
    async fn parse_envelope<T: DeserializeOwned>(
        command: &'static str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(command, bytes = body.len(), "bridge response received");

        let envelope: InvokeResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if !envelope.ok {
            return Err(Error::Backend {
                command: command.to_owned(),
                message: envelope
                    .error
                    .unwrap_or_else(|| "backend reported failure without a message".into()),
            });
        }

        serde_json::from_value(envelope.data).map_err(|e| Error::Deserialization {
            message: format!("{command}: {e}"),
            body,
        })
    }
}

/// Truncate a body to at most `BODY_PREVIEW_LEN` bytes on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_url_joins_base_without_double_slash() {
        let client = BridgeClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:1421/").expect("valid url"),
        );
        let url = client.invoke_url("start_pipeline_task").expect("valid url");
        assert_eq!(url.as_str(), "http://127.0.0.1:1421/invoke/start_pipeline_task");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(body.starts_with(cut));
    }
}
