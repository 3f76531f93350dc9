//! Active-theme context.
//!
//! The active theme is owned by whoever selects themes (a [`ThemeSwitch`])
//! and observed by wrappers through a [`ThemeContext`]. Both are explicit
//! values passed to the code that needs them.

use thematic_types::ThemeIdentifier;
use tokio::sync::watch;
use tracing::info;

/// Create a theme switch and a context observing it.
pub fn theme_channel(initial: ThemeIdentifier) -> (ThemeSwitch, ThemeContext) {
    let (sender, receiver) = watch::channel(initial);
    (ThemeSwitch { sender }, ThemeContext { receiver })
}

/// Write side of the active theme.
#[derive(Debug)]
pub struct ThemeSwitch {
    sender: watch::Sender<ThemeIdentifier>,
}

impl ThemeSwitch {
    /// Change the active theme. Returns `false` if it was already active.
    pub fn set(&self, theme: impl Into<ThemeIdentifier>) -> bool {
        let theme = theme.into();
        let changed = self.sender.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme.clone();
                true
            }
        });
        if changed {
            info!(theme = %theme, "active theme changed");
        }
        changed
    }

    pub fn current(&self) -> ThemeIdentifier {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> ThemeContext {
        ThemeContext {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Read side of the active theme.
#[derive(Debug, Clone)]
pub struct ThemeContext {
    receiver: watch::Receiver<ThemeIdentifier>,
}

impl ThemeContext {
    /// A context whose theme never changes.
    pub fn fixed(theme: impl Into<ThemeIdentifier>) -> Self {
        let (_, context) = theme_channel(theme.into());
        context
    }

    /// The active theme right now.
    pub fn current(&self) -> ThemeIdentifier {
        self.receiver.borrow().clone()
    }

    /// The active theme, marking it as seen for [`ThemeContext::changed`].
    pub fn observe(&mut self) -> ThemeIdentifier {
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the theme changes after the last observation.
    ///
    /// Returns `false` once the switch has been dropped and no further change
    /// can happen.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}
