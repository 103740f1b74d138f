use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod settings;
pub mod setup;

use application::services::{
    EmbeddingEngine, LanguageModel, ServiceConfig, SupervisorConfig, TabularSource, VectorStore,
};
use application::{ReviewService, StatsResponse, SupervisorService};
use domain::DomainError;
#[cfg(feature = "fastembed-engine")]
use infrastructure::FastEmbedEngine;
use infrastructure::{CsvDataset, SimpleEmbedEngine, SledVectorStore};
use settings::{ConfigManager, EmbeddingBackend};

pub const DEFAULT_CSV_PATH: &str = "data.csv";
pub const DEFAULT_VECTOR_DB_PATH: &str = "data/vector_db";

/// Locations of the tabular source and the vector store.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub csv_path: PathBuf,
    pub vector_db_path: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            vector_db_path: PathBuf::from(DEFAULT_VECTOR_DB_PATH),
        }
    }
}

/// Long-lived services shared by the web and console front ends.
pub struct AppHandles {
    pub supervisor: Arc<SupervisorService>,
    pub reviews: Arc<ReviewService>,
    pub dataset: Arc<CsvDataset>,
    pub config: Arc<ConfigManager>,
    pub paths: AppPaths,
    pub started_at: Instant,
}

impl AppHandles {
    pub fn stats(&self) -> Result<StatsResponse, DomainError> {
        Ok(StatsResponse {
            total_entries: self.reviews.count()?,
            csv_rows: self.dataset.len(),
            csv_path: self.paths.csv_path.display().to_string(),
            vector_db_path: self.paths.vector_db_path.display().to_string(),
            embedding_model: self.reviews.embedding_model().to_string(),
            embedding_dimensions: self.reviews.embedding_dimensions(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        })
    }
}

/// Opens the vector store, loads the CSV and wires the question pipeline.
///
/// The embedding backend comes from the store manifest written by setup; a
/// manifest that exists but cannot be parsed is an error. A CSV that cannot be
/// loaded is logged and replaced by an empty dataset.
pub fn build_environment(paths: AppPaths, llm: Arc<dyn LanguageModel>) -> Result<AppHandles> {
    let config = Arc::new(
        ConfigManager::load(&paths.vector_db_path).context("failed to load store manifest")?,
    );
    if !config.exists() {
        warn!(
            path = %paths.vector_db_path.display(),
            "no store manifest found; run adtarget-setup first for meaningful answers"
        );
    }
    let backend = config.current().embedding;

    let store_impl = SledVectorStore::open(&paths.vector_db_path)
        .context("failed to open vector store")?;
    let store: Arc<dyn VectorStore> = Arc::new(store_impl);

    let (embedder, service_config) =
        init_embedder(&backend).context("failed to initialise embedding backend")?;
    let reviews = Arc::new(ReviewService::new(embedder, store, service_config));

    let dataset = match CsvDataset::load(&paths.csv_path) {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(path = %paths.csv_path.display(), error = %err, "error loading CSV file");
            CsvDataset::empty(paths.csv_path.clone())
        }
    };
    let dataset = Arc::new(dataset);
    let tabular: Arc<dyn TabularSource> = dataset.clone();

    let supervisor_config = SupervisorConfig {
        vector_limit: reviews.default_limit(),
        ..SupervisorConfig::default()
    };
    let supervisor = Arc::new(SupervisorService::new(
        Arc::clone(&reviews),
        tabular,
        llm,
        supervisor_config,
    ));

    info!(
        entries = reviews.count().unwrap_or_default(),
        csv_rows = dataset.len(),
        model = reviews.embedding_model(),
        "application environment ready"
    );

    Ok(AppHandles {
        supervisor,
        reviews,
        dataset,
        config,
        paths,
        started_at: Instant::now(),
    })
}

pub fn init_embedder(
    backend: &EmbeddingBackend,
) -> Result<(Arc<dyn EmbeddingEngine>, ServiceConfig), DomainError> {
    let default_limit = ServiceConfig::default().default_limit;
    match backend {
        EmbeddingBackend::Simple { model, dimensions } => {
            let engine = SimpleEmbedEngine::try_new(model.clone(), *dimensions)?;
            Ok((
                Arc::new(engine),
                ServiceConfig::new(model.clone(), default_limit),
            ))
        }
        #[cfg(feature = "fastembed-engine")]
        EmbeddingBackend::FastEmbed { model } => {
            let engine = FastEmbedEngine::try_new(model)?;
            Ok((
                Arc::new(engine),
                ServiceConfig::new(model.clone(), default_limit),
            ))
        }
    }
}

/// Installs the global subscriber once; the filter comes from `LOG_LEVEL`.
pub fn init_tracing() {
    init_tracing_with_writer(std::io::stderr);
}

fn init_tracing_with_writer<W>(make_writer: fn() -> W)
where
    W: std::io::Write + Send + Sync + 'static,
{
    static INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

    let _ = INIT.get_or_init(|| {
        let filter = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(make_writer)
            .compact()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{run_setup, SetupOptions};

    struct SilentModel;

    impl LanguageModel for SilentModel {
        fn complete(&self, _: &str, _: &[String], _: Option<&str>) -> Result<String, DomainError> {
            Err(DomainError::llm("offline"))
        }
    }

    #[test]
    fn environment_survives_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths {
            csv_path: dir.path().join("missing.csv"),
            vector_db_path: dir.path().join("db"),
        };

        let handles = build_environment(paths, Arc::new(SilentModel)).unwrap();
        let stats = handles.stats().unwrap();
        assert_eq!(stats.csv_rows, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.embedding_model, settings::EmbeddingBackend::default().model_name());
    }

    #[test]
    fn environment_rejects_unreadable_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db");
        std::fs::create_dir_all(&db).unwrap();
        std::fs::write(db.join("config.json"), "{not json").unwrap();

        let result = build_environment(
            AppPaths {
                csv_path: dir.path().join("missing.csv"),
                vector_db_path: db,
            },
            Arc::new(SilentModel),
        );
        assert!(result.is_err());
    }

    #[test]
    fn environment_reuses_setup_backend() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("data.csv");
        std::fs::write(&csv, "review,product\nSmooth ride,E-Bike\n").unwrap();
        let db = dir.path().join("db");

        let mut options = SetupOptions::new(&csv, &db);
        options.embedding_model = Some("custom/hash".into());
        run_setup(&options).unwrap();

        let handles = build_environment(
            AppPaths {
                csv_path: csv,
                vector_db_path: db,
            },
            Arc::new(SilentModel),
        )
        .unwrap();
        let stats = handles.stats().unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.csv_rows, 1);
        assert_eq!(stats.embedding_model, "custom/hash");
    }
}
