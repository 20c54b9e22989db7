use campus_core::{Language, Navigator, LOGIN_PATH};
use tracing::warn;

/// There is no login screen in a terminal, so "go to login" becomes a hint.
pub struct CliNavigator {
    lang: Language,
}

impl CliNavigator {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    fn hint(&self) -> &'static str {
        match self.lang {
            Language::En => "Your session has ended. Run `campus login` to sign in again.",
            Language::Tr => "Oturumunuz sona erdi. Tekrar giriş yapmak için `campus login` çalıştırın.",
        }
    }
}

impl Navigator for CliNavigator {
    fn navigate(&self, location: &str) {
        warn!(location = location, "Redirect requested");
        if location == LOGIN_PATH {
            eprintln!("{}", self.hint());
        }
    }
}
