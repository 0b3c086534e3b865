//! Channel names
//!
//! Two disjoint sets fixed at compile time. Inbound channels carry traffic
//! from session observers and the shell UI toward the orchestrator; outbound
//! channels carry orchestrator signals back to the shell UI. A channel name
//! outside its bus's set is a violation, not an error to the sender.

/// Channels the orchestrator accepts from session/UI code.
pub const INBOUND_CHANNELS: &[&str] = &[
    "switch-tab",
    "update-badge",
    "update-favicon",
    "show-notification",
    "show-context-menu",
    "get-enabled-services",
];

/// Channels the orchestrator emits toward the shell UI.
pub const OUTBOUND_CHANNELS: &[&str] = &[
    "set-active-tab",
    "update-menu-badges",
    "update-menu-icon",
    "set-loading-state",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundChannel {
    SwitchTab,
    UpdateBadge,
    UpdateFavicon,
    ShowNotification,
    ShowContextMenu,
    GetEnabledServices,
}

impl InboundChannel {
    pub const ALL: &'static [InboundChannel] = &[
        InboundChannel::SwitchTab,
        InboundChannel::UpdateBadge,
        InboundChannel::UpdateFavicon,
        InboundChannel::ShowNotification,
        InboundChannel::ShowContextMenu,
        InboundChannel::GetEnabledServices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InboundChannel::SwitchTab => "switch-tab",
            InboundChannel::UpdateBadge => "update-badge",
            InboundChannel::UpdateFavicon => "update-favicon",
            InboundChannel::ShowNotification => "show-notification",
            InboundChannel::ShowContextMenu => "show-context-menu",
            InboundChannel::GetEnabledServices => "get-enabled-services",
        }
    }
}

impl std::fmt::Display for InboundChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InboundChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "switch-tab" => Ok(InboundChannel::SwitchTab),
            "update-badge" => Ok(InboundChannel::UpdateBadge),
            "update-favicon" => Ok(InboundChannel::UpdateFavicon),
            "show-notification" => Ok(InboundChannel::ShowNotification),
            "show-context-menu" => Ok(InboundChannel::ShowContextMenu),
            "get-enabled-services" => Ok(InboundChannel::GetEnabledServices),
            _ => Err(format!("Unknown inbound channel: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundChannel {
    SetActiveTab,
    UpdateMenuBadges,
    UpdateMenuIcon,
    SetLoadingState,
}

impl OutboundChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundChannel::SetActiveTab => "set-active-tab",
            OutboundChannel::UpdateMenuBadges => "update-menu-badges",
            OutboundChannel::UpdateMenuIcon => "update-menu-icon",
            OutboundChannel::SetLoadingState => "set-loading-state",
        }
    }
}

impl std::fmt::Display for OutboundChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutboundChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set-active-tab" => Ok(OutboundChannel::SetActiveTab),
            "update-menu-badges" => Ok(OutboundChannel::UpdateMenuBadges),
            "update-menu-icon" => Ok(OutboundChannel::UpdateMenuIcon),
            "set-loading-state" => Ok(OutboundChannel::SetLoadingState),
            _ => Err(format!("Unknown outbound channel: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_inbound_set_matches_enum() {
        for name in INBOUND_CHANNELS {
            let channel = InboundChannel::from_str(name).unwrap();
            assert_eq!(channel.as_str(), *name);
        }
        assert_eq!(INBOUND_CHANNELS.len(), InboundChannel::ALL.len());
    }

    #[test]
    fn test_outbound_set_matches_enum() {
        for name in OUTBOUND_CHANNELS {
            let channel = OutboundChannel::from_str(name).unwrap();
            assert_eq!(channel.as_str(), *name);
        }
    }

    #[test]
    fn test_sets_are_disjoint() {
        for name in INBOUND_CHANNELS {
            assert!(!OUTBOUND_CHANNELS.contains(name));
        }
    }
}
