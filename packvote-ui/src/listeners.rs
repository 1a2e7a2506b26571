//! Window-level listener subscriptions.
//!
//! Widgets that track layout while a floating surface is open subscribe to
//! resize and scroll here and must unsubscribe when it closes. The registry
//! makes leaked subscriptions observable.

use tracing::trace;

use crate::page::WidgetId;

/// Window-level notifications a widget can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowListener {
    /// Viewport resize.
    Resize,
    /// Any scroll on the page (capture phase).
    Scroll,
}

/// Active window-level subscriptions, in subscription order.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    subscriptions: Vec<(WidgetId, WindowListener)>,
}

impl ListenerRegistry {
    /// Subscribes `owner` to `kind`. Returns `false` if it already was.
    pub fn subscribe(&mut self, owner: WidgetId, kind: WindowListener) -> bool {
        if self.is_subscribed(owner, kind) {
            return false;
        }
        trace!(?owner, ?kind, "window listener added");
        self.subscriptions.push((owner, kind));
        true
    }

    /// Removes one subscription. Returns `false` if there was none.
    pub fn unsubscribe(&mut self, owner: WidgetId, kind: WindowListener) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|&entry| entry != (owner, kind));
        let removed = self.subscriptions.len() != before;
        if removed {
            trace!(?owner, ?kind, "window listener removed");
        }
        removed
    }

    /// Removes every subscription held by `owner`, returning how many.
    pub fn unsubscribe_all(&mut self, owner: WidgetId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|&(id, _)| id != owner);
        before - self.subscriptions.len()
    }

    /// Whether `owner` is subscribed to `kind`.
    pub fn is_subscribed(&self, owner: WidgetId, kind: WindowListener) -> bool {
        self.subscriptions.contains(&(owner, kind))
    }

    /// Widgets subscribed to `kind`, in subscription order.
    pub fn subscribers(&self, kind: WindowListener) -> Vec<WidgetId> {
        self.subscriptions
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Total number of live subscriptions.
    pub fn count(&self) -> usize {
        self.subscriptions.len()
    }
}
