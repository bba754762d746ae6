use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// What to do with a response that settles after a newer activation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sequencing {
    /// Render every response when it settles; the last to settle is shown.
    #[default]
    CompletionOrder,
    /// Render only the response of the most recent activation.
    LatestWins,
}

impl Sequencing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sequencing::CompletionOrder => "completion-order",
            Sequencing::LatestWins => "latest-wins",
        }
    }

    pub const fn all() -> &'static [Sequencing] {
        &[Sequencing::CompletionOrder, Sequencing::LatestWins]
    }
}

impl std::fmt::Display for Sequencing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out increasing tokens, one per activation.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: Mutex<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        let mut latest = self.lock();
        *latest += 1;
        RequestToken(*latest)
    }

    /// True while no newer token has been issued.
    pub fn is_current(&self, token: RequestToken) -> bool {
        *self.lock() == token.0
    }

    /// Run `write` only if `token` is still the newest.
    ///
    /// No token can be issued while `write` runs.
    pub fn if_current<R>(&self, token: RequestToken, write: impl FnOnce() -> R) -> Option<R> {
        let latest = self.lock();
        (*latest == token.0).then(write)
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
