//! The location ledger.
//!
//! An in-memory ordered list of named location records, mirrored to a single
//! serialized blob in the preference store. Every successful mutation
//! rewrites the full blob synchronously, so the persisted state always
//! matches memory after the last completed operation.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::LocationRecord;
use crate::storage::PrefStore;

/// The fixed preference key the ledger blob is stored under.
pub const LEDGER_KEY: &str = "locations";

/// An ordered collection of named locations with persistence.
///
/// Invariants:
/// - No two records share a name (case-sensitive).
/// - Insertion order is preserved; rename keeps a record's position.
/// - Record identity for rename/remove is the name, not the position.
#[derive(Debug)]
pub struct Ledger {
    records: Vec<LocationRecord>,
    store: PrefStore,
}

impl Ledger {
    /// Open a ledger backed by the given store, loading any persisted blob.
    ///
    /// An absent blob yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a blob is present but unreadable, or a
    /// storage error if the read fails.
    pub fn open(store: PrefStore) -> Result<Self> {
        let mut ledger = Self {
            records: Vec::new(),
            store,
        };
        ledger.load()?;
        Ok(ledger)
    }

    /// Reload the ledger from the persisted blob, discarding in-memory state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the blob is present but unreadable.
    pub fn load(&mut self) -> Result<()> {
        match self.store.get(LEDGER_KEY)? {
            Some(blob) => {
                self.records = serde_json::from_str(&blob)
                    .map_err(|source| Error::Decode { source })?;
                debug!("Loaded {} saved locations", self.records.len());
            }
            None => {
                self.records.clear();
                debug!("No saved locations found, starting empty");
            }
        }
        Ok(())
    }

    /// Add a named location.
    ///
    /// An empty name means the user cancelled a prompt and is a silent
    /// no-op. On success the record is appended and the ledger persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if a record with this name already
    /// exists, or a storage error if persisting fails.
    pub fn add(
        &mut self,
        name: &str,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Result<()> {
        if name.is_empty() {
            debug!("Ignoring add with empty name (cancelled)");
            return Ok(());
        }
        if self.contains(name) {
            return Err(Error::duplicate_name(name));
        }

        self.records
            .push(LocationRecord::new(name, latitude, longitude));
        self.persist()?;
        info!("Saved location '{}'", name);
        Ok(())
    }

    /// Rename a location, keeping its position.
    ///
    /// A `new_name` equal to `old_name` or empty is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if `new_name` belongs to a different
    /// record, [`Error::NotFound`] if `old_name` does not exist, or a
    /// storage error if persisting fails.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() || new_name == old_name {
            debug!("Ignoring rename of '{}' (cancelled or unchanged)", old_name);
            return Ok(());
        }
        if self.contains(new_name) {
            return Err(Error::duplicate_name(new_name));
        }

        let record = self
            .records
            .iter_mut()
            .find(|r| r.name == old_name)
            .ok_or_else(|| Error::not_found(old_name))?;
        record.name = new_name.to_string();
        self.persist()?;
        info!("Renamed location '{}' to '{}'", old_name, new_name);
        Ok(())
    }

    /// Remove the location with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this name, or a storage
    /// error if persisting fails.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let index = self
            .records
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| Error::not_found(name))?;

        self.records.remove(index);
        self.persist()?;
        info!("Removed location '{}'", name);
        Ok(())
    }

    /// Remove every location and erase the persisted blob.
    ///
    /// Clearing deletes the preference key outright. This is distinct from
    /// removing the last record, which leaves an empty-list blob behind.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.store.remove(LEDGER_KEY)?;
        info!("Cleared all saved locations");
        Ok(())
    }

    /// Read-only view of the records, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Find a record by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Check whether a record with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// Number of saved locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The backing preference store.
    #[must_use]
    pub fn store(&self) -> &PrefStore {
        &self.store
    }

    /// Serialize the full record list and overwrite the persisted blob.
    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.records)?;
        self.store.set(LEDGER_KEY, &blob)
    }
}
