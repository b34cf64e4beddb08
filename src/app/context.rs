use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::domain::{PersistResult, ScrapeResult};
use crate::fetcher::HttpFetcher;
use crate::persist::MediaPersister;
use crate::scraper::{
    CarouselExtractor, ChromeSessionProvider, DirectStrategy, EmbedStrategy, MetricsRecorder,
    SessionProvider, StaticHtmlStrategy, Strategy, TracingMetrics,
};
use crate::storage::{HttpObjectStorage, ObjectStorage};

/// Wires the extraction and persistence pipelines from one [`Config`].
///
/// Storage is only contacted when something is persisted, so extraction
/// works without storage credentials.
pub struct AppContext {
    pub config: Config,
    pub extractor: CarouselExtractor,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_metrics(config, Arc::new(TracingMetrics))
    }

    pub fn with_metrics(config: Config, metrics: Arc<dyn MetricsRecorder>) -> Result<Self> {
        let scraper = Arc::new(config.scraper.clone());
        let sessions: Arc<dyn SessionProvider> =
            Arc::new(ChromeSessionProvider::new(config.scraper.clone()));
        let static_fetcher = Arc::new(HttpFetcher::new(
            &scraper.static_user_agent,
            scraper.static_timeout(),
        )?);

        let strategies: Vec<Arc<dyn Strategy>> = vec![
            Arc::new(EmbedStrategy::new(sessions.clone(), scraper.clone())),
            Arc::new(DirectStrategy::new(sessions, scraper.clone())),
            Arc::new(StaticHtmlStrategy::new(static_fetcher, scraper.clone())),
        ];

        let extractor = CarouselExtractor::new(
            strategies,
            metrics,
            scraper.strategy_timeout(),
            scraper.max_carousel_size,
        );

        Ok(Self { config, extractor })
    }

    /// Build the persistence pipeline against the configured storage.
    pub fn persister(&self) -> Result<MediaPersister> {
        let downloader = Arc::new(HttpFetcher::new(
            &self.config.persist.user_agent,
            self.config.persist.download_timeout(),
        )?);
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(HttpObjectStorage::from_config(&self.config.storage)?);

        Ok(MediaPersister::new(
            downloader,
            storage,
            self.config.persist.clone(),
        ))
    }

    pub async fn extract(&self, url: &str) -> Result<Option<ScrapeResult>> {
        self.extractor.extract(url).await
    }

    pub async fn persist(
        &self,
        result: &ScrapeResult,
        owner_id: &str,
        post_id: &str,
    ) -> Result<PersistResult> {
        Ok(self.persister()?.persist(&result.media, owner_id, post_id).await)
    }
}
