//! Connected social accounts, keyed by platform.

use serde::Serialize;
use uuid::Uuid;

use crate::api::types::{SocialConnection, SocialPlatform};

#[derive(Debug, Clone, Default)]
pub struct ConnectionsView {
    connections: Vec<SocialConnection>,
}

/// One line of the connections screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformRow {
    pub platform: SocialPlatform,
    pub name: &'static str,
    pub description: &'static str,
    pub connected: bool,
    pub username: Option<String>,
    pub connection_id: Option<Uuid>,
}

impl ConnectionsView {
    #[must_use]
    pub fn new(connections: Vec<SocialConnection>) -> Self {
        Self { connections }
    }

    #[must_use]
    pub fn is_connected(&self, platform: SocialPlatform) -> bool {
        self.connection_for(platform).is_some()
    }

    #[must_use]
    pub fn connection_for(&self, platform: SocialPlatform) -> Option<&SocialConnection> {
        self.connections.iter().find(|c| c.platform == platform)
    }

    /// Drop a connection after the backend confirmed the disconnect.
    /// Returns whether it was present.
    pub fn remove(&mut self, connection_id: Uuid) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != connection_id);
        self.connections.len() != before
    }

    #[must_use]
    pub fn rows(&self) -> Vec<PlatformRow> {
        SocialPlatform::ALL
            .into_iter()
            .map(|platform| {
                let connection = self.connection_for(platform);
                PlatformRow {
                    platform,
                    name: platform.display_name(),
                    description: platform.description(),
                    connected: connection.is_some(),
                    username: connection.and_then(|c| c.platform_username.clone()),
                    connection_id: connection.map(|c| c.id),
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "connections_test.rs"]
mod tests;
