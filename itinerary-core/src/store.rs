//! Single-file JSON persistence for the itinerary.
//!
//! Reads never fail: a missing file is bootstrapped from the built-in default
//! and a corrupt one is masked by it. Writes replace the whole document and
//! surface every error. There is no locking, so concurrent saves are
//! last-write-wins.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    error::{ItineraryError, Result},
    model::Itinerary,
};

#[derive(Debug, Clone)]
pub struct ItineraryStore {
    path: PathBuf,
}

impl ItineraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Return the stored itinerary, or the built-in default when there is
    /// nothing usable on disk.
    ///
    /// When the file is absent the default is also written out, best-effort.
    /// A corrupt file is left untouched; the next [`save`](Self::save) is
    /// what repairs it.
    pub fn load(&self) -> Itinerary {
        match self.read() {
            Ok(doc) => doc,
            Err(ItineraryError::NotFound(_)) => {
                let doc = Itinerary::builtin_default();
                match self.write(&doc) {
                    Ok(()) => info!(path = %self.path.display(), "created default itinerary"),
                    Err(err) => warn!(
                        path = %self.path.display(),
                        error = %err,
                        "could not persist default itinerary, serving it from memory"
                    ),
                }
                doc
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    code = err.code(),
                    error = %err,
                    "stored itinerary is unusable, serving the built-in default"
                );
                Itinerary::builtin_default()
            }
        }
    }

    /// Strict read: every failure is reported.
    pub fn read(&self) -> Result<Itinerary> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ItineraryError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(ItineraryError::persistence(&self.path, err)),
        };

        let doc = Itinerary::from_json(&raw)?;
        debug!(path = %self.path.display(), days = doc.days.len(), "loaded itinerary");
        Ok(doc)
    }

    /// Validate and replace the stored document. It is written exactly as
    /// given.
    pub fn save(&self, doc: &Itinerary) -> Result<()> {
        doc.validate()?;
        self.write(doc)?;

        info!(path = %self.path.display(), days = doc.days.len(), "saved itinerary");
        Ok(())
    }

    /// Parse a raw JSON document and save it. Returns the stored document.
    pub fn save_json(&self, raw: &str) -> Result<Itinerary> {
        let doc = Itinerary::from_json(raw)?;
        self.save(&doc)?;
        Ok(doc)
    }

    // The document goes to a sibling temp file which is then renamed over the
    // target, so a failed write never leaves a truncated file behind.
    fn write(&self, doc: &Itinerary) -> Result<()> {
        let json = doc.to_pretty_json()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|err| ItineraryError::persistence(dir, err))?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|err| ItineraryError::persistence(dir, err))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| ItineraryError::persistence(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| ItineraryError::persistence(&self.path, err.error))?;

        Ok(())
    }
}
