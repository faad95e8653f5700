use chrono::Utc;
use std::collections::HashMap;

use super::models::{DashboardStats, StoredFile, StoredSubject, SubjectWithFiles};
use super::repository::{Repository, StorageError};
use super::tables::*;
use crate::encoder::Blob;

/// Creation timestamp in milliseconds, bumped past every existing id.
fn next_subject_id(existing: &[StoredSubject]) -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let floor = existing
        .iter()
        .map(|s| s.id.saturating_add(1))
        .max()
        .unwrap_or(0);
    now.max(floor)
}

fn resolve(subject: &StoredSubject, files: &HashMap<&str, &StoredFile>) -> SubjectWithFiles {
    SubjectWithFiles {
        id: subject.id,
        name: subject.name.clone(),
        files: subject
            .file_ids
            .iter()
            .filter_map(|id| files.get(id.as_str()).map(|f| (*f).clone()))
            .collect(),
    }
}

fn index(files: &[StoredFile]) -> HashMap<&str, &StoredFile> {
    files.iter().map(|f| (f.id.as_str(), f)).collect()
}

impl Repository {
    // ========================================================================
    // Subject operations
    // ========================================================================

    /// Overwrite the Subjects table with exactly `subjects`.
    pub fn save_subjects(&self, subjects: &[StoredSubject]) -> Result<(), StorageError> {
        self.overwrite(SUBJECTS, subjects)
    }

    pub fn get_subjects(&self) -> Vec<StoredSubject> {
        self.read_table(SUBJECTS)
    }

    /// Resolve file references. Ids without a stored file are dropped.
    pub fn resolve_subject_files(&self, subject: &StoredSubject) -> SubjectWithFiles {
        let files = self.get_all_files();
        resolve(subject, &index(&files))
    }

    /// Every subject with its files resolved, in table order
    pub fn load_subjects(&self) -> Vec<SubjectWithFiles> {
        let files = self.get_all_files();
        let by_id = index(&files);
        let subjects = self.get_subjects();
        subjects.iter().map(|s| resolve(s, &by_id)).collect()
    }

    /// Save the uploads, then append a subject referencing them.
    ///
    /// The two tables are written separately. If the subject write fails the
    /// saved files stay behind unreferenced; `purge_orphaned_files` reclaims them.
    pub async fn create_subject<B: Blob>(
        &self,
        name: &str,
        blobs: &[B],
    ) -> Result<SubjectWithFiles, StorageError> {
        if name.trim().is_empty() {
            return Err(StorageError::EmptySubjectName);
        }

        let files = self.save_files(blobs).await?;

        let snapshot = self.snapshot::<StoredSubject>(SUBJECTS)?;
        let subject = StoredSubject {
            id: next_subject_id(&snapshot.records),
            name: name.to_string(),
            file_ids: files.iter().map(|f| f.id.clone()).collect(),
        };

        let mut subjects = snapshot.records;
        subjects.push(subject.clone());
        self.commit(SUBJECTS, snapshot.raw.as_deref(), &subjects)?;

        tracing::info!(subject_id = subject.id, files = files.len(), "Created subject");
        Ok(SubjectWithFiles {
            id: subject.id,
            name: subject.name,
            files,
        })
    }

    /// Delete a subject. Its files are left in place (see `purge_orphaned_files`).
    pub fn delete_subject(&self, id: u64) -> Result<bool, StorageError> {
        let snapshot = self.snapshot::<StoredSubject>(SUBJECTS)?;
        let before = snapshot.records.len();
        let subjects: Vec<StoredSubject> = snapshot
            .records
            .into_iter()
            .filter(|s| s.id != id)
            .collect();

        if subjects.len() == before {
            return Ok(false);
        }
        self.commit(SUBJECTS, snapshot.raw.as_deref(), &subjects)?;
        tracing::info!(subject_id = id, "Deleted subject");
        Ok(true)
    }

    pub fn stats(&self) -> DashboardStats {
        let subjects = self.load_subjects();
        DashboardStats {
            subjects: subjects.len(),
            files: subjects.iter().map(|s| s.files.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::MemoryBlob;
    use crate::substrate::Substrate;
    use crate::testutil::{pdf, png, test_repository};

    fn subject(id: u64, name: &str, file_ids: &[&str]) -> StoredSubject {
        StoredSubject {
            id,
            name: name.to_string(),
            file_ids: file_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_next_subject_id_is_monotonic() {
        let far_future = subject(u64::MAX / 2, "x", &[]);
        assert_eq!(next_subject_id(&[far_future]), u64::MAX / 2 + 1);

        let past = subject(1, "x", &[]);
        assert!(next_subject_id(&[past]) > 1_600_000_000_000);
    }

    #[tokio::test]
    async fn test_resolve_drops_dangling_reference() {
        let (_store, repo) = test_repository();
        let saved = repo.save_files(&[pdf("a.pdf", 8)]).await.unwrap();

        let s = subject(7, "Chemistry", &["file-gone", &saved[0].id]);
        let resolved = repo.resolve_subject_files(&s);

        assert_eq!(resolved.id, 7);
        assert_eq!(resolved.files.len(), 1);
        assert_eq!(resolved.files[0].id, saved[0].id);
    }

    #[test]
    fn test_get_subjects_fail_open_on_garbage() {
        let (store, repo) = test_repository();
        store.set(SUBJECTS, "{{{ definitely not json").unwrap();
        assert!(repo.get_subjects().is_empty());
        assert!(repo.load_subjects().is_empty());
    }

    #[test]
    fn test_save_subjects_is_idempotent_overwrite() {
        let (_store, repo) = test_repository();
        let subjects = vec![subject(1, "Physics", &["a"]), subject(2, "Maths", &[])];

        repo.save_subjects(&subjects).unwrap();
        repo.save_subjects(&subjects).unwrap();
        assert_eq!(repo.get_subjects(), subjects);

        repo.save_subjects(&subjects[1..]).unwrap();
        assert_eq!(repo.get_subjects(), subjects[1..].to_vec());
    }

    #[tokio::test]
    async fn test_create_subject_rejects_blank_name() {
        let (store, repo) = test_repository();
        let err = repo
            .create_subject("   ", &[pdf("a.pdf", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptySubjectName));
        assert_eq!(store.get(FILES).unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_subject_without_files() {
        let (_store, repo) = test_repository();
        let blobs: Vec<MemoryBlob> = Vec::new();
        let created = repo.create_subject("History", &blobs).await.unwrap();

        assert!(created.files.is_empty());
        assert_eq!(repo.get_subjects()[0].file_ids, Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_rapid_creation_yields_distinct_ids() {
        let (_store, repo) = test_repository();
        let blobs: Vec<MemoryBlob> = Vec::new();
        for name in ["A", "B", "C", "D"] {
            repo.create_subject(name, &blobs).await.unwrap();
        }
        let mut ids: Vec<u64> = repo.get_subjects().iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_delete_subject_orphans_files() {
        let (_store, repo) = test_repository();
        let created = repo
            .create_subject("Biology", &[png("cell.png", 32)])
            .await
            .unwrap();

        assert!(repo.delete_subject(created.id).unwrap());
        assert!(!repo.delete_subject(created.id).unwrap());
        assert!(repo.get_subjects().is_empty());
        assert_eq!(repo.get_all_files().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_count_resolved_files() {
        let (_store, repo) = test_repository();
        repo.create_subject("Physics", &[pdf("a.pdf", 1), png("b.png", 1)])
            .await
            .unwrap();
        let mut subjects = repo.get_subjects();
        subjects.push(subject(1, "Ghost", &["file-gone"]));
        repo.save_subjects(&subjects).unwrap();

        let stats = repo.stats();
        assert_eq!(stats, DashboardStats { subjects: 2, files: 2 });
    }
}
