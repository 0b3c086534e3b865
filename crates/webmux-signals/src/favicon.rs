//! Favicon proxy
//!
//! Sessions report icon references; the shell UI must never fetch them
//! itself across origins. `data:` references pass through unchanged. Remote
//! references are fetched here and re-encoded into a self-contained data
//! URL. At most one fetch per source is in flight: a newer reference aborts
//! the older task, so a slow fetch can never overwrite a fresher icon.

use base64::Engine;
use parking_lot::Mutex;
use reqwest::redirect::Policy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

use webmux_bus::{MessageBus, OutboundMessage};
use webmux_registry::{EnabledServices, ServiceRegistry};

use crate::error::SignalError;
use crate::Result;

const FETCH_TIMEOUT: Duration = Duration::from_secs(6);
const MAX_REDIRECTS: usize = 5;
/// Icons beyond this are junk or abuse, not favicons.
const MAX_ICON_BYTES: usize = 512 * 1024;

pub struct FaviconProxy {
    registry: Arc<ServiceRegistry>,
    enabled: EnabledServices,
    outbound: MessageBus,
    client: reqwest::Client,
    runtime: tokio::runtime::Handle,
    in_flight: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl FaviconProxy {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        enabled: EnabledServices,
        outbound: MessageBus,
        runtime: tokio::runtime::Handle,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| SignalError::Client(e.to_string()))?;

        Ok(Self {
            registry,
            enabled,
            outbound,
            client,
            runtime,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    /// Forward or fetch an icon reference for `source`. Non-enabled sources
    /// and malformed references change nothing; fetch failures keep the
    /// UI's prior icon.
    pub fn update_icon(&self, source: &str, icon_ref: &str) {
        if !self.registry.is_content_session(source) || !self.enabled.is_enabled(source) {
            tracing::debug!(source = %source, "Ignoring favicon update from non-enabled source");
            return;
        }

        // Already self-contained: passthrough, no fetch
        if is_self_contained(icon_ref) {
            self.emit(source, icon_ref.to_string());
            return;
        }

        let url = match Url::parse(icon_ref) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                tracing::warn!(source = %source, icon_ref = %icon_ref, "Dropping unusable favicon reference");
                return;
            }
        };

        let client = self.client.clone();
        let outbound = self.outbound.clone();
        let source_owned = source.to_string();

        let task = self.runtime.spawn(async move {
            match fetch_icon(&client, &source_owned, &url).await {
                Ok(data_url) => {
                    outbound.send_message(&OutboundMessage::UpdateMenuIcon {
                        source: source_owned,
                        embedded_icon_data: data_url,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Favicon fetch dropped");
                }
            }
        });

        // Latest-wins: a newer reference supersedes the in-flight fetch
        let mut in_flight = self.in_flight.lock();
        if let Some(previous) = in_flight.insert(source.to_string(), task) {
            previous.abort();
        }
    }

    fn emit(&self, source: &str, embedded_icon_data: String) {
        self.outbound.send_message(&OutboundMessage::UpdateMenuIcon {
            source: source.to_string(),
            embedded_icon_data,
        });
    }

    /// Number of sources with a fetch currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

/// A reference the UI can embed without any further fetch.
pub(crate) fn is_self_contained(icon_ref: &str) -> bool {
    icon_ref.starts_with("data:")
}

async fn fetch_icon(client: &reqwest::Client, source: &str, url: &Url) -> Result<String> {
    let fetch_err = |reason: String| SignalError::FaviconFetch {
        origin: source.to_string(),
        reason,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_err(format!("status {}", status)));
    }

    let mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(sanitize_mime)
        .unwrap_or_else(|| "image/png".to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    if bytes.is_empty() || bytes.len() > MAX_ICON_BYTES {
        return Err(fetch_err(format!("body of {} bytes", bytes.len())));
    }

    Ok(encode_data_url(&mime, &bytes))
}

/// Strip content-type parameters; only the media type belongs in a data URL.
fn sanitize_mime(raw: &str) -> String {
    raw.split(';').next().unwrap_or(raw).trim().to_string()
}

fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
