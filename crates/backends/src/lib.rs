pub mod custom_search;
pub mod scrape;

pub use self::custom_search::CustomSearchBackend;
pub use self::scrape::ScrapeBackend;

use dorkhunter_core::config::AppConfig;
use dorkhunter_core::{BackendKind, ConfigError, SearchBackend};

/// Build the backend a run asked for. The API backend needs credentials.
pub fn build_backend(kind: BackendKind, config: &AppConfig) -> Result<Box<dyn SearchBackend>, ConfigError> {
    let timeout = config.hunt.request_timeout();
    match kind {
        BackendKind::Api => {
            let credentials = config.google_api.credentials()?;
            Ok(Box::new(CustomSearchBackend::new(credentials, timeout)?))
        }
        BackendKind::Scrape => Ok(Box::new(ScrapeBackend::new(timeout)?)),
    }
}
