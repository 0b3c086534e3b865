//! Typed message unions
//!
//! Wire payloads are JSON objects with camelCase field names, produced by
//! the per-page observer scripts and the shell UI. Parsing into these closed
//! unions happens once, at the boundary; handlers only ever see well-formed
//! values. `update-badge` is the one lenient field: a missing or non-integer
//! `count` becomes `None` here and normalizes to zero downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::channel::{InboundChannel, OutboundChannel};

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Malformed payload on channel {channel}: {source}")]
    MalformedPayload {
        channel: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A message admitted on an inbound channel, parsed into its typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    SwitchTab {
        tab_id: String,
    },
    UpdateBadge {
        source: String,
        count: Option<i64>,
    },
    UpdateFavicon {
        source: String,
        favicon_url: String,
    },
    ShowNotification {
        title: String,
        body: String,
        source: String,
    },
    ShowContextMenu,
    GetEnabledServices,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchTabPayload {
    tab_id: String,
}

#[derive(Deserialize)]
struct UpdateBadgePayload {
    source: String,
    #[serde(default)]
    count: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFaviconPayload {
    source: String,
    favicon_url: String,
}

#[derive(Deserialize)]
struct ShowNotificationPayload {
    title: String,
    body: String,
    source: String,
}

impl InboundMessage {
    /// Parse an admitted channel's payload. The channel name has already
    /// been validated; this only checks payload shape.
    pub fn parse(channel: InboundChannel, payload: &Value) -> Result<Self, MessageError> {
        let malformed = |source| MessageError::MalformedPayload {
            channel: channel.as_str(),
            source,
        };

        match channel {
            InboundChannel::SwitchTab => {
                let p: SwitchTabPayload =
                    serde_json::from_value(payload.clone()).map_err(malformed)?;
                Ok(InboundMessage::SwitchTab { tab_id: p.tab_id })
            }
            InboundChannel::UpdateBadge => {
                let p: UpdateBadgePayload =
                    serde_json::from_value(payload.clone()).map_err(malformed)?;
                // Anything that isn't an integer collapses to None; the
                // aggregator normalizes None and negatives to zero.
                let count = p.count.as_ref().and_then(Value::as_i64);
                Ok(InboundMessage::UpdateBadge {
                    source: p.source,
                    count,
                })
            }
            InboundChannel::UpdateFavicon => {
                let p: UpdateFaviconPayload =
                    serde_json::from_value(payload.clone()).map_err(malformed)?;
                Ok(InboundMessage::UpdateFavicon {
                    source: p.source,
                    favicon_url: p.favicon_url,
                })
            }
            InboundChannel::ShowNotification => {
                let p: ShowNotificationPayload =
                    serde_json::from_value(payload.clone()).map_err(malformed)?;
                Ok(InboundMessage::ShowNotification {
                    title: p.title,
                    body: p.body,
                    source: p.source,
                })
            }
            InboundChannel::ShowContextMenu => Ok(InboundMessage::ShowContextMenu),
            InboundChannel::GetEnabledServices => Ok(InboundMessage::GetEnabledServices),
        }
    }

    pub fn channel(&self) -> InboundChannel {
        match self {
            InboundMessage::SwitchTab { .. } => InboundChannel::SwitchTab,
            InboundMessage::UpdateBadge { .. } => InboundChannel::UpdateBadge,
            InboundMessage::UpdateFavicon { .. } => InboundChannel::UpdateFavicon,
            InboundMessage::ShowNotification { .. } => InboundChannel::ShowNotification,
            InboundMessage::ShowContextMenu => InboundChannel::ShowContextMenu,
            InboundMessage::GetEnabledServices => InboundChannel::GetEnabledServices,
        }
    }
}

/// A signal the orchestrator emits toward the shell UI.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    SetActiveTab {
        tab_id: String,
    },
    /// Per-session unread counts, keyed by source id.
    UpdateMenuBadges {
        badges: BTreeMap<String, u64>,
    },
    /// A self-contained data-URL icon for one session.
    UpdateMenuIcon {
        source: String,
        embedded_icon_data: String,
    },
    SetLoadingState {
        service_id: String,
        loading: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetActiveTabWire<'a> {
    tab_id: &'a str,
}

#[derive(Serialize)]
struct UpdateMenuBadgesWire<'a> {
    badges: &'a BTreeMap<String, u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMenuIconWire<'a> {
    source: &'a str,
    embedded_icon_data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetLoadingStateWire<'a> {
    service_id: &'a str,
    loading: bool,
}

impl OutboundMessage {
    pub fn channel(&self) -> OutboundChannel {
        match self {
            OutboundMessage::SetActiveTab { .. } => OutboundChannel::SetActiveTab,
            OutboundMessage::UpdateMenuBadges { .. } => OutboundChannel::UpdateMenuBadges,
            OutboundMessage::UpdateMenuIcon { .. } => OutboundChannel::UpdateMenuIcon,
            OutboundMessage::SetLoadingState { .. } => OutboundChannel::SetLoadingState,
        }
    }

    pub fn payload(&self) -> Value {
        let value = match self {
            OutboundMessage::SetActiveTab { tab_id } => {
                serde_json::to_value(SetActiveTabWire { tab_id })
            }
            OutboundMessage::UpdateMenuBadges { badges } => {
                serde_json::to_value(UpdateMenuBadgesWire { badges })
            }
            OutboundMessage::UpdateMenuIcon {
                source,
                embedded_icon_data,
            } => serde_json::to_value(UpdateMenuIconWire {
                source,
                embedded_icon_data,
            }),
            OutboundMessage::SetLoadingState {
                service_id,
                loading,
            } => serde_json::to_value(SetLoadingStateWire {
                service_id,
                loading: *loading,
            }),
        };

        value.unwrap_or(Value::Null)
    }
}
