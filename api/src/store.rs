//! Content-addressed artifact store on the local filesystem.
//!
//! Every artifact lives in one file named after its [`ArtifactId`]. A
//! write goes to a hidden temporary file in the same directory, is synced,
//! and is renamed over the target, so readers only ever see complete
//! artifacts. Writers are serialised by a fixed table of lock stripes
//! indexed by a hash of the id; artifacts that belong together are written
//! and read under all of their stripes at once.
use crate::artifact::{ArtifactId, ArtifactKind};
use crate::errors::{Result, ZkError};
use crate::scheme::SchemeKind;
use parking_lot::{Mutex, MutexGuard};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use zkinfer_groth16::CancellationToken;
use zkinfer_r1cs::Fingerprint;

const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

/// Number of writer lock stripes.
const LOCK_STRIPES: usize = 64;

/// Temporary files younger than this may belong to a live writer and are
/// left alone when a store is opened.
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(60 * 60);

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// What `put` does when the artifact already exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Overwrite the existing artifact.
    #[default]
    Replace,
    /// Fail with [`ZkError::DuplicateArtifact`].
    Fail,
}

/// One artifact of an [`ArtifactStore::put_all`] batch.
#[derive(Copy, Clone, Debug)]
pub struct NewArtifact<'a> {
    /// What the artifact is.
    pub kind: ArtifactKind,
    /// The circuit it belongs to.
    pub fingerprint: Fingerprint,
    /// The proof scheme, for scheme-specific artifacts.
    pub scheme: Option<SchemeKind>,
    /// The encoded artifact.
    pub bytes: &'a [u8],
}

impl NewArtifact<'_> {
    fn id(&self) -> ArtifactId {
        ArtifactId::new(self.scheme, self.fingerprint, self.kind)
    }
}

/// A write in progress. Dropping it without committing removes the
/// temporary file.
struct PendingArtifact {
    path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl PendingArtifact {
    fn create(dir: &Path, id: &ArtifactId) -> Result<Self> {
        let name = format!(
            "{}{}.{}.{}{}",
            TEMP_PREFIX,
            id,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TEMP_SUFFIX
        );
        let path = dir.join(name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Some(file),
            committed: false,
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(bytes)?;
        }
        Ok(())
    }

    fn commit(mut self, target: &Path) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        fs::rename(&self.path, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingArtifact {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not roll back write");
            }
        }
    }
}

fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)
}

fn stripe_of(id: &ArtifactId) -> usize {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % LOCK_STRIPES as u64) as usize
}

fn not_found(e: io::Error, id: &ArtifactId) -> ZkError {
    if e.kind() == io::ErrorKind::NotFound {
        ZkError::ArtifactNotFound(id.to_string())
    } else {
        e.into()
    }
}

/// Filesystem artifact store rooted at a workspace directory.
pub struct ArtifactStore {
    root: PathBuf,
    policy: ConflictPolicy,
    locks: Vec<Mutex<()>>,
}

impl ArtifactStore {
    /// Open the store at `root`, creating the directory if needed and
    /// removing temporary files left behind by interrupted writes. Only
    /// files older than [`STALE_TEMP_AGE`] count as left behind.
    pub fn open<P: AsRef<Path>>(root: P, policy: ConflictPolicy) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let store = Self {
            root,
            policy,
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        };
        let swept = store.sweep_temp_files(STALE_TEMP_AGE)?;
        if swept > 0 {
            tracing::warn!(root = %store.root.display(), count = swept, "removed stale temporary files");
        }
        Ok(store)
    }

    /// Return the store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the conflict policy.
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    fn path_of(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Lock the stripes of every id, in stripe order.
    fn lock_all(&self, ids: &[ArtifactId]) -> Vec<MutexGuard<'_, ()>> {
        let mut stripes: Vec<usize> = ids.iter().map(stripe_of).collect();
        stripes.sort_unstable();
        stripes.dedup();
        stripes.into_iter().map(|s| self.locks[s].lock()).collect()
    }

    /// Store `bytes` under `(kind, fingerprint, scheme)` and return its id.
    pub fn put(
        &self,
        kind: ArtifactKind,
        fingerprint: Fingerprint,
        scheme: Option<SchemeKind>,
        bytes: &[u8],
    ) -> Result<ArtifactId> {
        self.put_cancellable(kind, fingerprint, scheme, bytes, &CancellationToken::new())
    }

    /// Like [`ArtifactStore::put`], but abandon the write if `cancel` is set
    /// before it is committed.
    pub fn put_cancellable(
        &self,
        kind: ArtifactKind,
        fingerprint: Fingerprint,
        scheme: Option<SchemeKind>,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ArtifactId> {
        let artifact = NewArtifact {
            kind,
            fingerprint,
            scheme,
            bytes,
        };
        let mut ids = self.put_all(&[artifact], cancel)?;
        ids.pop()
            .ok_or_else(|| ZkError::Io("empty write batch".to_string()))
    }

    /// Store several artifacts as one unit: no other writer, and no
    /// [`ArtifactStore::get_all`] reader, observes some of them replaced
    /// and others not. If any write fails, none of them is left behind.
    pub fn put_all(
        &self,
        artifacts: &[NewArtifact<'_>],
        cancel: &CancellationToken,
    ) -> Result<Vec<ArtifactId>> {
        let ids: Vec<ArtifactId> = artifacts.iter().map(NewArtifact::id).collect();
        let _guards = self.lock_all(&ids);

        let mut pending = Vec::with_capacity(ids.len());
        for (id, artifact) in ids.iter().zip(artifacts) {
            let target = self.path_of(id);
            if self.policy == ConflictPolicy::Fail && target.exists() {
                return Err(ZkError::DuplicateArtifact(id.to_string()));
            }
            let mut file = PendingArtifact::create(&self.root, id)?;
            file.write_all(artifact.bytes)?;
            pending.push((file, target));
        }
        if cancel.is_cancelled() {
            return Err(ZkError::Cancelled);
        }

        let mut committed: Vec<&ArtifactId> = vec![];
        for ((file, target), id) in pending.into_iter().zip(ids.iter()) {
            if let Err(e) = file.commit(&target) {
                for done in committed {
                    if let Err(cleanup) = fs::remove_file(self.path_of(done)) {
                        tracing::warn!(artifact = %done, error = %cleanup, "could not roll back write");
                    }
                }
                return Err(e);
            }
            committed.push(id);
        }
        for (id, artifact) in ids.iter().zip(artifacts) {
            tracing::debug!(artifact = %id, bytes = artifact.bytes.len(), "stored artifact");
        }
        Ok(ids)
    }

    /// Read an artifact.
    pub fn get(&self, id: &ArtifactId) -> Result<Vec<u8>> {
        fs::read(self.path_of(id)).map_err(|e| not_found(e, id))
    }

    /// Read several artifacts while holding their writer locks, so a
    /// concurrent [`ArtifactStore::put_all`] is seen entirely or not at all.
    pub fn get_all(&self, ids: &[ArtifactId]) -> Result<Vec<Vec<u8>>> {
        let _guards = self.lock_all(ids);
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Return true if the artifact exists.
    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.path_of(id).is_file()
    }

    /// Delete an artifact.
    pub fn delete(&self, id: &ArtifactId) -> Result<()> {
        let _guards = self.lock_all(&[*id]);
        fs::remove_file(self.path_of(id)).map_err(|e| not_found(e, id))?;
        tracing::debug!(artifact = %id, "deleted artifact");
        Ok(())
    }

    /// List every artifact, sorted. Files that are not artifacts are ignored.
    pub fn list(&self) -> Result<Vec<ArtifactId>> {
        let mut ids = vec![];
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<ArtifactId>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete every artifact whose circuit is not in `keep` and return the
    /// deleted ids.
    pub fn gc(&self, keep: &[Fingerprint]) -> Result<Vec<ArtifactId>> {
        let mut deleted = vec![];
        for id in self.list()? {
            if keep.contains(&id.fingerprint()) {
                continue;
            }
            match self.delete(&id) {
                Ok(()) | Err(ZkError::ArtifactNotFound(_)) => deleted.push(id),
                Err(e) => return Err(e),
            }
        }
        tracing::info!(deleted = deleted.len(), kept = keep.len(), "collected artifacts");
        Ok(deleted)
    }

    /// Delete every artifact and temporary file. The directory itself stays.
    pub fn teardown(&self) -> Result<usize> {
        let deleted = self.gc(&[])?.len();
        self.sweep_temp_files(Duration::ZERO)?;
        Ok(deleted)
    }

    /// Remove temporary files last modified at least `min_age` ago.
    fn sweep_temp_files(&self, min_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            if !name.to_str().map_or(false, is_temp_file) || !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if now.duration_since(modified).unwrap_or_default() < min_age {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => count += 1,
                // the writer committed or rolled back in the meantime
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(count)
    }
}
