//! Builds the vector store from the CSV source: load, render, embed, append.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    application::services::{ReviewService, VectorStore},
    domain::DomainError,
    infrastructure::{CsvDataset, SledVectorStore},
    init_embedder,
    settings::{ConfigManager, EmbeddingBackend, StoreConfig},
};

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub csv_path: PathBuf,
    pub vector_db_path: PathBuf,
    pub batch_size: usize,
    pub force_rebuild: bool,
    /// Backend id (`simple`, `fastembed`); `None` keeps the store's backend.
    pub embedding_backend: Option<String>,
    pub embedding_model: Option<String>,
    pub show_progress: bool,
}

impl SetupOptions {
    pub fn new(csv_path: impl Into<PathBuf>, vector_db_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            vector_db_path: vector_db_path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            force_rebuild: false,
            embedding_backend: None,
            embedding_model: None,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub rows: usize,
    pub texts: usize,
    pub batches: usize,
    pub total_entries: usize,
}

fn select_backend(
    options: &SetupOptions,
    manifest: &ConfigManager,
) -> Result<EmbeddingBackend, DomainError> {
    let current = manifest
        .exists()
        .then(|| manifest.current().embedding);

    match (&options.embedding_backend, &options.embedding_model) {
        (None, None) => Ok(current.unwrap_or_default()),
        (Some(id), model) => EmbeddingBackend::resolve(id, model.as_deref()),
        (None, Some(model)) => {
            let base = current.unwrap_or_default();
            EmbeddingBackend::resolve(base.id(), Some(model))
        }
    }
}

pub fn run_setup(options: &SetupOptions) -> Result<IngestReport, DomainError> {
    if options.batch_size == 0 {
        return Err(DomainError::validation("batch size must be at least 1"));
    }

    info!(path = %options.csv_path.display(), "loading CSV data");
    let dataset = CsvDataset::load(&options.csv_path)?;
    if dataset.is_empty() {
        return Err(DomainError::dataset("CSV data is empty or could not be loaded"));
    }
    info!(
        rows = dataset.len(),
        text_columns = ?dataset.text_columns(),
        "CSV data loaded"
    );

    let manifest = match ConfigManager::load(&options.vector_db_path) {
        Ok(manifest) => manifest,
        Err(err) if options.force_rebuild => {
            warn!(error = %err, "force rebuild: replacing unreadable store manifest");
            ConfigManager::fresh(&options.vector_db_path)
        }
        Err(err) => return Err(err),
    };
    let backend = select_backend(options, &manifest)?;

    let (embedder, service_config) = init_embedder(&backend)?;
    let store: Arc<dyn VectorStore> =
        Arc::new(SledVectorStore::open(&options.vector_db_path)?);
    let service = ReviewService::new(embedder, store, service_config);
    let existing = service.count()?;

    if options.force_rebuild {
        if existing > 0 {
            warn!(entries = existing, "force rebuild: clearing existing entries");
        }
        service.clear()?;
    } else if existing > 0 {
        if manifest.exists() && manifest.current().embedding != backend {
            let built_with = manifest.current().embedding;
            return Err(DomainError::validation(format!(
                "vector store at {} was built with `{}` ({}); rerun with --force-rebuild to switch to `{}` ({})",
                options.vector_db_path.display(),
                built_with.id(),
                built_with.model_name(),
                backend.id(),
                backend.model_name(),
            )));
        }
        if let Some(stored) = service.stored_model()? {
            if stored != backend.model_name() {
                return Err(DomainError::validation(format!(
                    "vector store at {} holds entries embedded with `{stored}`; rerun with --force-rebuild to switch to `{}`",
                    options.vector_db_path.display(),
                    backend.model_name(),
                )));
            }
        }
    }

    let texts = dataset.review_texts();
    let batches: Vec<&[String]> = texts.chunks(options.batch_size).collect();
    info!(
        texts = texts.len(),
        batches = batches.len(),
        backend = backend.id(),
        model = backend.model_name(),
        "embedding review texts"
    );

    let progress = if options.show_progress {
        let bar = ProgressBar::new(texts.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} reviews ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━━╸"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    for (index, batch) in batches.iter().enumerate() {
        service.ingest_texts(batch)?;
        progress.inc(batch.len() as u64);
        info!("batch {}/{} stored", index + 1, batches.len());
    }
    progress.finish_and_clear();

    manifest
        .save(StoreConfig {
            embedding: backend,
            source_csv: Some(options.csv_path.clone()),
        })
        .map_err(|err| DomainError::storage(format!("failed to write store manifest: {err}")))?;

    let report = IngestReport {
        rows: dataset.len(),
        texts: texts.len(),
        batches: batches.len(),
        total_entries: service.count()?,
    };
    info!(
        rows = report.rows,
        entries = report.total_entries,
        path = %options.vector_db_path.display(),
        "vector store ready"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(dir: &std::path::Path, contents: &str) -> PathBuf {
        let path = dir.join("reviews.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const SAMPLE: &str = "reviewer,review,product\n\
        Ana,Great commuter e-bike,E-Bike\n\
        Ben,Battery lasts all week,E-Bike\n\
        Cleo,Too heavy for stairs,Cargo Bike\n";

    #[test]
    fn ingests_every_row_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let db = dir.path().join("db");

        let mut options = SetupOptions::new(&csv, &db);
        options.batch_size = 2;
        let report = run_setup(&options).unwrap();

        assert_eq!(
            report,
            IngestReport {
                rows: 3,
                texts: 3,
                batches: 2,
                total_entries: 3
            }
        );
        assert!(db.join("config.json").is_file());
    }

    #[test]
    fn rerun_appends_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let db = dir.path().join("db");

        let mut options = SetupOptions::new(&csv, &db);
        run_setup(&options).unwrap();
        assert_eq!(run_setup(&options).unwrap().total_entries, 6);

        options.force_rebuild = true;
        assert_eq!(run_setup(&options).unwrap().total_entries, 3);
    }

    #[test]
    fn empty_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), "review,product\n");
        let err = run_setup(&SetupOptions::new(&csv, dir.path().join("db"))).unwrap_err();
        assert!(err.to_string().contains("CSV data is empty or could not be loaded"));
    }

    #[test]
    fn switching_model_requires_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let db = dir.path().join("db");

        run_setup(&SetupOptions::new(&csv, &db)).unwrap();

        let mut options = SetupOptions::new(&csv, &db);
        options.embedding_model = Some("other/hash".into());
        assert!(matches!(
            run_setup(&options),
            Err(DomainError::Validation(_))
        ));

        options.force_rebuild = true;
        assert_eq!(run_setup(&options).unwrap().total_entries, 3);
        assert_eq!(
            ConfigManager::load(&db)
                .unwrap()
                .current()
                .embedding
                .model_name(),
            "other/hash"
        );
    }

    #[test]
    fn unreadable_manifest_blocks_append() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let db = dir.path().join("db");

        let mut options = SetupOptions::new(&csv, &db);
        options.embedding_model = Some("custom/hash".into());
        run_setup(&options).unwrap();

        std::fs::write(
            db.join("config.json"),
            r#"{"embedding": {"backend": "word2vec", "model": "w2v"}}"#,
        )
        .unwrap();

        let mut options = SetupOptions::new(&csv, &db);
        assert!(matches!(
            run_setup(&options),
            Err(DomainError::Storage(_))
        ));

        options.force_rebuild = true;
        assert_eq!(run_setup(&options).unwrap().total_entries, 3);
        assert!(ConfigManager::load(&db).unwrap().exists());
    }

    #[test]
    fn missing_manifest_still_checks_stored_model() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let db = dir.path().join("db");

        let mut options = SetupOptions::new(&csv, &db);
        options.embedding_model = Some("custom/hash".into());
        run_setup(&options).unwrap();
        std::fs::remove_file(db.join("config.json")).unwrap();

        assert!(matches!(
            run_setup(&SetupOptions::new(&csv, &db)),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(run_setup(&options).unwrap().total_entries, 6);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let csv = csv_file(dir.path(), SAMPLE);
        let mut options = SetupOptions::new(&csv, dir.path().join("db"));
        options.batch_size = 0;
        assert!(matches!(
            run_setup(&options),
            Err(DomainError::Validation(_))
        ));
    }
}
