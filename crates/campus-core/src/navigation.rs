//! Navigation hook used when the session can no longer be recovered.
//!
//! A browser front end would change `window.location`; other front ends
//! decide for themselves what "go to the login screen" means.

use std::sync::Mutex;

use tracing::warn;

/// Location the client is sent to after a failed token refresh
pub const LOGIN_PATH: &str = "/login";

pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &str);
}

/// Logs the redirect and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, location: &str) {
        warn!(location = location, "Session ended, navigation requested");
    }
}

/// Remembers every requested location.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(location.to_string());
        }
    }
}
