//! Online/offline state holder

use serde::Serialize;
use tokio::sync::watch;

/// Visible connectivity of the dashboard backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn is_offline(&self) -> bool {
        matches!(self, ConnectivityState::Offline)
    }

    /// Indicator styling for this state
    pub fn indicator(&self) -> Indicator {
        match self {
            ConnectivityState::Online => Indicator {
                text: "Online",
                background: None,
                glow: None,
            },
            ConnectivityState::Offline => Indicator {
                text: "Offline",
                background: Some("#ef4444"),
                glow: Some("rgba(239, 68, 68, 0.7)"),
            },
        }
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.indicator().text)
    }
}

/// Status indicator visuals. `None` means the renderer's default styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub text: &'static str,
    pub background: Option<&'static str>,
    pub glow: Option<&'static str>,
}

/// A state change applied by the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<ConnectivityState>,
    pub to: ConnectivityState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != Some(self.to)
    }
}

/// Connectivity owned by one poller.
///
/// The state is unknown (`None`) until the first poll completes. Only the
/// status module can apply transitions; everyone else reads or watches.
#[derive(Debug)]
pub struct Connectivity {
    tx: watch::Sender<Option<ConnectivityState>>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new()
    }
}

impl Connectivity {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn current(&self) -> Option<ConnectivityState> {
        *self.tx.borrow()
    }

    pub fn is_offline(&self) -> bool {
        self.current().is_some_and(|s| s.is_offline())
    }

    /// Read-only handle that follows this state
    pub fn watch(&self) -> ConnectivityWatch {
        ConnectivityWatch {
            rx: self.tx.subscribe(),
        }
    }

    pub(super) fn go_online(&self) -> Transition {
        self.transition(ConnectivityState::Online)
    }

    pub(super) fn go_offline(&self) -> Transition {
        self.transition(ConnectivityState::Offline)
    }

    fn transition(&self, to: ConnectivityState) -> Transition {
        let from = self.tx.send_replace(Some(to));
        Transition { from, to }
    }
}

/// Read-only view of a [`Connectivity`]
#[derive(Debug, Clone)]
pub struct ConnectivityWatch {
    rx: watch::Receiver<Option<ConnectivityState>>,
}

impl ConnectivityWatch {
    pub fn current(&self) -> Option<ConnectivityState> {
        *self.rx.borrow()
    }

    pub fn is_offline(&self) -> bool {
        self.current().is_some_and(|s| s.is_offline())
    }

    /// Wait for the next transition. Returns `None` once the owner is gone.
    pub async fn changed(&mut self) -> Option<ConnectivityState> {
        self.rx.changed().await.ok()?;
        *self.rx.borrow_and_update()
    }
}
