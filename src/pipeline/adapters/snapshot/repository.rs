//! Case repository persisted as a single JSON snapshot file.

use super::document::{SnapshotCase, SnapshotDocument, labels_to_document};
use crate::pipeline::{
    domain::{Case, CaseId, ColumnLabels, Stage},
    ports::{CaseRepository, CaseRepositoryError, CaseRepositoryResult},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::{Arc, Mutex};

/// Initial content written when the snapshot file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotSeed {
    /// Default column labels and no cases.
    #[default]
    Empty,
    /// Default column labels and two demonstration cases.
    Demo,
}

/// Snapshot-file-backed case repository.
///
/// Every operation reads the document, applies its change and writes the
/// whole document back, so the file is the single source of truth. Writes go
/// to a sibling temporary file that is renamed over the snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCaseRepository {
    file: Arc<Mutex<SnapshotFile>>,
}

#[derive(Debug)]
struct SnapshotFile {
    dir: Dir,
    file_name: String,
    seed: SnapshotSeed,
}

impl SnapshotCaseRepository {
    /// Opens the snapshot at `path`, creating parent directories and an
    /// initial document as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::Persistence`] when the directory cannot
    /// be opened or the initial document cannot be written.
    pub fn open(path: &Utf8Path, seed: SnapshotSeed) -> CaseRepositoryResult<Self> {
        let file_name = path
            .file_name()
            .ok_or_else(|| {
                CaseRepositoryError::persistence(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("snapshot path '{path}' has no file name"),
                ))
            })?
            .to_owned();
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));

        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(CaseRepositoryError::persistence)?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(CaseRepositoryError::persistence)?;

        let file = SnapshotFile {
            dir,
            file_name,
            seed,
        };
        file.load()?;
        tracing::debug!(%path, "opened case snapshot");

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Returns the column headings stored with the board.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::Persistence`] when the snapshot cannot
    /// be read.
    pub async fn column_labels(&self) -> CaseRepositoryResult<ColumnLabels> {
        self.read(|document| Ok(document.labels())).await
    }

    /// Renames a column heading.
    ///
    /// # Errors
    ///
    /// Returns [`CaseRepositoryError::Persistence`] when the snapshot cannot
    /// be read or written.
    pub async fn set_column_label(
        &self,
        stage: Stage,
        label: impl Into<String>,
    ) -> CaseRepositoryResult<()> {
        let new_label = label.into();
        self.modify(move |document| {
            let mut labels = document.labels();
            labels.set_label(stage, new_label);
            document.column_labels = labels_to_document(&labels);
            Ok(())
        })
        .await
    }

    async fn read<F, T>(&self, f: F) -> CaseRepositoryResult<T>
    where
        F: FnOnce(&SnapshotDocument) -> CaseRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |file| {
            let document = file.load()?;
            f(&document)
        })
        .await
    }

    async fn modify<F, T>(&self, f: F) -> CaseRepositoryResult<T>
    where
        F: FnOnce(&mut SnapshotDocument) -> CaseRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |file| {
            let mut document = file.load()?;
            let output = f(&mut document)?;
            file.save(&document)?;
            Ok(output)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> CaseRepositoryResult<T>
    where
        F: FnOnce(&SnapshotFile) -> CaseRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || {
            let guard = file.lock().map_err(|err| {
                CaseRepositoryError::persistence(io::Error::other(err.to_string()))
            })?;
            f(&guard)
        })
        .await
        .map_err(CaseRepositoryError::persistence)?
    }
}

impl SnapshotFile {
    fn temporary_name(&self) -> String {
        format!("{}.tmp", self.file_name)
    }

    fn corrupt_name(&self) -> String {
        format!("{}.corrupt", self.file_name)
    }

    fn initial_document(&self) -> SnapshotDocument {
        let labels = ColumnLabels::default();
        match self.seed {
            SnapshotSeed::Empty => SnapshotDocument::empty(&labels),
            SnapshotSeed::Demo => SnapshotDocument::demo(&labels, Utc::now()),
        }
    }

    /// Reads the document, initializing a missing file and replacing one
    /// that is not JSON.
    ///
    /// JSON that does not match the document layout is reported as a
    /// persistence failure and the file is left in place.
    fn load(&self) -> CaseRepositoryResult<SnapshotDocument> {
        let raw = match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let document = self.initial_document();
                self.save(&document)?;
                return Ok(document);
            }
            Err(err) => return Err(CaseRepositoryError::persistence(err)),
        };

        let parse_error = match serde_json::from_str::<SnapshotDocument>(&raw) {
            Ok(document) => return Ok(document),
            Err(err) => err,
        };
        if parse_error.is_data() {
            return Err(CaseRepositoryError::persistence(parse_error));
        }
        tracing::warn!(
            file = %self.file_name,
            moved_to = %self.corrupt_name(),
            err = %parse_error,
            "case snapshot is unreadable; reinitializing"
        );
        self.dir
            .rename(&self.file_name, &self.dir, self.corrupt_name())
            .map_err(CaseRepositoryError::persistence)?;
        let document = self.initial_document();
        self.save(&document)?;
        Ok(document)
    }

    fn save(&self, document: &SnapshotDocument) -> CaseRepositoryResult<()> {
        let encoded =
            serde_json::to_string_pretty(document).map_err(CaseRepositoryError::persistence)?;
        let temporary = self.temporary_name();
        self.dir
            .write(&temporary, encoded)
            .map_err(CaseRepositoryError::persistence)?;
        self.dir
            .rename(&temporary, &self.dir, &self.file_name)
            .map_err(CaseRepositoryError::persistence)
    }
}

fn find_case_mut<'a>(
    document: &'a mut SnapshotDocument,
    id: &CaseId,
) -> CaseRepositoryResult<&'a mut SnapshotCase> {
    document
        .cases
        .iter_mut()
        .find(|stored| stored.id == id.as_str())
        .ok_or_else(|| CaseRepositoryError::NotFound(id.clone()))
}

#[async_trait]
impl CaseRepository for SnapshotCaseRepository {
    async fn list_cases(&self) -> CaseRepositoryResult<Vec<Case>> {
        let mut cases = self.read(SnapshotDocument::to_cases).await?;
        // The document keeps insertion order; the board wants newest first.
        cases.reverse();
        cases.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(cases)
    }

    async fn find_by_id(&self, id: &CaseId) -> CaseRepositoryResult<Option<Case>> {
        let lookup = id.clone();
        self.read(move |document| {
            document
                .cases
                .iter()
                .find(|stored| stored.id == lookup.as_str())
                .map(SnapshotCase::to_case)
                .transpose()
        })
        .await
    }

    async fn create_case(&self, case: &Case) -> CaseRepositoryResult<()> {
        let stored = SnapshotCase::from_case(case);
        let id = case.id().clone();
        self.modify(move |document| {
            if document.cases.iter().any(|existing| existing.id == stored.id) {
                return Err(CaseRepositoryError::DuplicateCase(id));
            }
            document.cases.push(stored);
            Ok(())
        })
        .await
    }

    async fn set_stage(
        &self,
        id: &CaseId,
        stage: Stage,
        entered_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let target = id.clone();
        self.modify(move |document| {
            let stored = find_case_mut(document, &target)?;
            stored.stage = stage.as_str().to_owned();
            stored.stage_entered_at = Some(entered_at);
            stored.updated_at = Some(entered_at);
            Ok(())
        })
        .await
    }

    async fn update_fields(&self, case: &Case) -> CaseRepositoryResult<()> {
        let updated = SnapshotCase::from_case(case);
        let target = case.id().clone();
        self.modify(move |document| {
            let stored = find_case_mut(document, &target)?;
            stored.name = updated.name;
            stored.tax_id = updated.tax_id;
            stored.contracted_amount = updated.contracted_amount;
            stored.assigned_operator = updated.assigned_operator;
            stored.color_tag = updated.color_tag;
            stored.follow_up_at = updated.follow_up_at;
            stored.updated_at = updated.updated_at;
            Ok(())
        })
        .await
    }

    async fn append_document(
        &self,
        id: &CaseId,
        document_name: &str,
        attached_at: DateTime<Utc>,
    ) -> CaseRepositoryResult<()> {
        let target = id.clone();
        let name = document_name.to_owned();
        self.modify(move |document| {
            let stored = find_case_mut(document, &target)?;
            stored
                .attached_documents
                .get_or_insert_with(Vec::new)
                .push(name);
            stored.updated_at = Some(attached_at);
            Ok(())
        })
        .await
    }

    async fn delete_case(&self, id: &CaseId) -> CaseRepositoryResult<()> {
        let target = id.clone();
        self.modify(move |document| {
            let before = document.cases.len();
            document.cases.retain(|stored| stored.id != target.as_str());
            if document.cases.len() == before {
                return Err(CaseRepositoryError::NotFound(target));
            }
            Ok(())
        })
        .await
    }
}
