//! Per-session admin-mode registry.
//!
//! Admin mode lets a player holding the admin permission manage shops they do not own.
//! It lives only as long as the process and the player's connection.

use log::info;
use std::collections::HashSet;

use crate::barter::types::PlayerId;

#[derive(Debug, Default, Clone)]
pub struct AdminModeRegistry {
    enabled: HashSet<PlayerId>,
}

impl AdminModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip admin mode and return the new state.
    pub fn toggle(&mut self, player: PlayerId) -> bool {
        let now_enabled = if self.enabled.remove(&player) {
            false
        } else {
            self.enabled.insert(player);
            true
        };
        info!(
            "Admin mode {} for {}",
            if now_enabled { "enabled" } else { "disabled" },
            player
        );
        now_enabled
    }

    pub fn enable(&mut self, player: PlayerId) {
        self.enabled.insert(player);
    }

    pub fn disable(&mut self, player: PlayerId) {
        self.enabled.remove(&player);
    }

    pub fn is_enabled(&self, player: PlayerId) -> bool {
        self.enabled.contains(&player)
    }

    pub fn on_disconnect(&mut self, player: PlayerId) {
        self.enabled.remove(&player);
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}
