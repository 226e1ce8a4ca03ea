//! Per-connection subscription manager.
//!
//! Tracks which assets a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::Address;

/// Manages the set of asset subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed assets. If `subscribe_all` is true, this set is ignored.
    assets: HashSet<Address>,
    /// Whether the client subscribes to all assets (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds assets to the subscription set; `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, assets: &[Address], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.assets.extend(assets.iter().copied());
    }

    /// Removes assets from the subscription set.
    pub fn unsubscribe(&mut self, assets: &[Address]) {
        for asset in assets {
            self.assets.remove(asset);
        }
    }

    /// Returns `true` if events for `asset` should be forwarded.
    #[must_use]
    pub fn matches(&self, asset: Address) -> bool {
        self.subscribe_all || self.assets.contains(&asset)
    }

    /// Returns the number of explicitly subscribed assets.
    #[must_use]
    pub fn count(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
