//! Persisted phrase list.
//!
//! The list lives in memory behind a mutex and is mirrored to a single JSON
//! file containing an array of strings. Every mutation runs as a transaction:
//! lock, mutate, persist, unlock.

use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use tokio::sync::Mutex;

use crate::{errors::Error, Result};

/// Reply used when there is nothing to pick from.
pub const NO_PHRASES: &str = "Я не знаю ни одной фразы :(";

/// What `PhraseStore::load` found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A well-formed array of strings.
    Loaded,
    /// Missing, unreadable or not JSON at all: started empty and (re)created the file.
    Created,
    /// Valid JSON but not an array of strings. Kept what could be kept, file untouched.
    Corrupted,
}

#[derive(Debug)]
pub struct PhraseStore {
    path: PathBuf,
    phrases: Mutex<Vec<String>>,
}

impl PhraseStore {
    /// Store with an in-memory list only; nothing is read from disk.
    pub fn new(path: impl Into<PathBuf>, phrases: Vec<String>) -> Self {
        Self {
            path: path.into(),
            phrases: Mutex::new(phrases),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the phrase file, falling back to an empty list.
    ///
    /// Never fails: read and parse errors are recovered by starting empty and
    /// writing `[]` back, and a failing write there is only logged.
    pub async fn load(path: impl Into<PathBuf>) -> (Self, LoadOutcome) {
        let path = path.into();

        let parsed = match tokio::fs::read_to_string(&path).await {
            Ok(txt) => serde_json::from_str::<serde_json::Value>(&txt).map_err(Error::from),
            Err(e) => Err(Error::from(e)),
        };

        let value = match parsed {
            Ok(v) => v,
            Err(e) => {
                tracing::info!(
                    "phrase file {} not usable ({e}); starting with an empty list",
                    path.display()
                );
                let store = Self::new(path, Vec::new());
                if let Err(e) = store.save().await {
                    tracing::error!("{e}");
                }
                return (store, LoadOutcome::Created);
            }
        };

        let (phrases, outcome) = phrases_from_json(value);
        if outcome == LoadOutcome::Corrupted {
            tracing::error!("{} file is corrupted", path.display());
        }
        tracing::info!("loaded {} phrases from {}", phrases.len(), path.display());

        (Self::new(path, phrases), outcome)
    }

    /// Overwrite the phrase file with the current in-memory list.
    pub async fn save(&self) -> Result<()> {
        let phrases = self.phrases.lock().await;
        self.persist(&phrases).await
    }

    /// Run `f` against the list while holding the lock, then persist.
    ///
    /// A failed write leaves the in-memory change in place and returns the
    /// error, so the bot keeps serving what it has.
    pub async fn transaction<T>(&self, f: impl FnOnce(&mut Vec<String>) -> T) -> Result<T> {
        let mut phrases = self.phrases.lock().await;
        let out = f(&mut phrases);
        self.persist(&phrases).await?;
        Ok(out)
    }

    /// Append a phrase and persist.
    pub async fn add(&self, phrase: impl Into<String>) -> Result<()> {
        let phrase = phrase.into();
        self.transaction(move |phrases| phrases.push(phrase)).await
    }

    /// A uniformly random phrase, or [`NO_PHRASES`] when the list is empty.
    pub async fn pick_random(&self) -> String {
        let phrases = self.phrases.lock().await;
        phrases
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| NO_PHRASES.to_string())
    }

    pub async fn len(&self) -> usize {
        self.phrases.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.phrases.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.phrases.lock().await.clone()
    }

    async fn persist(&self, phrases: &[String]) -> Result<()> {
        let txt = serde_json::to_string(phrases)?;
        let tmp = tmp_path(&self.path);

        let write = async {
            tokio::fs::write(&tmp, txt).await?;
            tokio::fs::rename(&tmp, &self.path).await
        };
        write.await.map_err(|source| Error::Persist {
            path: self.path.clone(),
            source,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "phrases.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Shallow type check: an array whose elements are all strings.
///
/// Anything else is reported as corrupted; string elements of an array are
/// still kept, other documents yield an empty list.
fn phrases_from_json(value: serde_json::Value) -> (Vec<String>, LoadOutcome) {
    let serde_json::Value::Array(items) = value else {
        return (Vec::new(), LoadOutcome::Corrupted);
    };

    let total = items.len();
    let phrases: Vec<String> = items
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect();

    let outcome = if phrases.len() == total {
        LoadOutcome::Loaded
    } else {
        LoadOutcome::Corrupted
    };
    (phrases, outcome)
}
