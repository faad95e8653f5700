use std::collections::HashSet;

use super::models::{PurgeStats, StoredFile, StoredSubject};
use super::repository::{Repository, StorageError};
use super::tables::*;
use crate::encoder::{self, Blob};
use crate::substrate::SubstrateError;

/// Fresh file id. Random, so concurrent saves cannot collide.
pub(crate) fn new_file_id() -> String {
    format!("file-{}", uuid::Uuid::new_v4())
}

impl Repository {
    // ========================================================================
    // File operations
    // ========================================================================

    /// Encode each blob and append the records to the Files table.
    ///
    /// Returns only the new records, in input order. The whole table is
    /// written once at the end; if any blob fails to read or the write is
    /// rejected, nothing from this call is stored.
    pub async fn save_files<B: Blob>(&self, blobs: &[B]) -> Result<Vec<StoredFile>, StorageError> {
        let snapshot = self.snapshot::<StoredFile>(FILES)?;

        let mut created = Vec::with_capacity(blobs.len());
        for blob in blobs {
            let data_url = encoder::encode(blob).await?;
            created.push(StoredFile {
                id: new_file_id(),
                name: blob.name().to_string(),
                mime_type: blob.mime_type().to_string(),
                size: blob.size(),
                last_modified: blob.last_modified(),
                data_url,
            });
        }

        let mut files = snapshot.records;
        files.extend(created.iter().cloned());
        self.commit(FILES, snapshot.raw.as_deref(), &files)?;

        tracing::info!(count = created.len(), total = files.len(), "Saved files");
        Ok(created)
    }

    /// Get every stored file, in insertion order
    pub fn get_all_files(&self) -> Vec<StoredFile> {
        self.read_table(FILES)
    }

    /// Get a file by id. `None` is a normal outcome for dangling references.
    pub fn get_file_by_id(&self, id: &str) -> Option<StoredFile> {
        self.get_all_files().into_iter().find(|f| f.id == id)
    }

    /// Remove file records that no subject references.
    ///
    /// Refuses to run when the Subjects table is corrupt, since every file
    /// would look unreferenced. The Subjects slot is re-read just before the
    /// Files commit and a change aborts with a conflict. The two slots cannot
    /// be written atomically, so a subject created between that re-read and
    /// the commit can still end up with dangling ids.
    pub fn purge_orphaned_files(&self) -> Result<PurgeStats, StorageError> {
        let subjects = self.snapshot::<StoredSubject>(SUBJECTS)?;
        if subjects.corrupt {
            return Err(StorageError::CorruptTable {
                slot: SUBJECTS.to_string(),
            });
        }
        let referenced: HashSet<&str> = subjects
            .records
            .iter()
            .flat_map(|s| s.file_ids.iter().map(String::as_str))
            .collect();

        let snapshot = self.snapshot::<StoredFile>(FILES)?;
        let before = snapshot.records.len();
        let kept: Vec<StoredFile> = snapshot
            .records
            .into_iter()
            .filter(|f| referenced.contains(f.id.as_str()))
            .collect();

        let stats = PurgeStats {
            files: (before - kept.len()) as u64,
        };
        if stats.files > 0 {
            if self.substrate().get(SUBJECTS)? != subjects.raw {
                return Err(SubstrateError::Conflict {
                    key: SUBJECTS.to_string(),
                }
                .into());
            }
            self.commit(FILES, snapshot.raw.as_deref(), &kept)?;
            tracing::info!(removed = stats.files, "Purged orphaned files");
        }
        Ok(stats)
    }
}
