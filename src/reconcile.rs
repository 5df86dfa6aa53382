use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;
use spacefs_api::fs::FileStatus;

use crate::entry::Entry;

/// identifies the directory a listing belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub space: Space,
    pub parent_id: Option<EntryId>,
}

impl ListingKey {
    pub fn root(space: Space) -> Self {
        ListingKey {
            space,
            parent_id: None,
        }
    }

    fn contains(&self, entry: &Entry) -> bool {
        self.space == entry.space && self.parent_id == entry.parent_id
    }
}

/// result of a successful mutation as reported by the store
#[derive(Debug, Clone)]
pub enum Change {
    Created(Entry),
    Uploaded(Entry),
    Renamed(Entry),
    Deleted(EntryId),
    Moved(Entry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// the listing changed
    Applied,
    /// the change does not concern the listing
    Dropped,
    /// the change concerns the listing but could not be placed, the listing
    /// is flagged until the next load
    Stale,
}

/// the entries shown for one directory
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    key: ListingKey,
    entries: Vec<Entry>,
    stale: bool,
}

impl Listing {
    pub fn new(key: ListingKey) -> Self {
        Listing {
            key,
            entries: Vec::new(),
            stale: false,
        }
    }

    pub fn key(&self) -> &ListingKey {
        &self.key
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// result of a successful load
    pub(crate) fn replace(&mut self, key: ListingKey, entries: Vec<Entry>) {
        self.key = key;
        self.entries = entries;
        self.stale = false;
    }

    /// result of a failed load, nothing is known about the directory
    pub(crate) fn invalidate(&mut self, key: ListingKey) {
        self.key = key;
        self.entries.clear();
        self.stale = true;
    }

    /// empties the listing while a load for `key` is outstanding
    pub(crate) fn clear(&mut self, key: ListingKey) {
        self.key = key;
        self.entries.clear();
        self.stale = false;
    }

    fn upsert(&mut self, entry: Entry) {
        match self.position(&entry.id) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    fn remove(&mut self, id: &str) -> Reconciled {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                Reconciled::Applied
            },
            None => Reconciled::Dropped
        }
    }

    /// applies a mutation result without reloading.
    ///
    /// `origin` is the directory that was shown when the mutation started.
    /// new entries are only added when that directory is still shown, every
    /// other change is matched on the entry id.
    pub(crate) fn reconcile(&mut self, origin: &ListingKey, change: Change) -> Reconciled {
        match change {
            Change::Created(entry) => self.add(origin, entry),
            Change::Uploaded(entry) => {
                // pending uploads are not listed by the store
                if entry.status != FileStatus::Approved {
                    return Reconciled::Dropped;
                }

                self.add(origin, entry)
            },
            Change::Renamed(entry) => match self.position(&entry.id) {
                Some(index) => {
                    self.entries[index] = entry;
                    Reconciled::Applied
                },
                None => Reconciled::Dropped
            },
            Change::Deleted(id) => self.remove(&id),
            Change::Moved(entry) => match self.position(&entry.id) {
                Some(index) if self.key.contains(&entry) => {
                    self.entries[index] = entry;
                    Reconciled::Applied
                },
                _ => self.remove(&entry.id)
            }
        }
    }

    fn add(&mut self, origin: &ListingKey, entry: Entry) -> Reconciled {
        if *origin != self.key {
            return Reconciled::Dropped;
        }

        if !self.key.contains(&entry) {
            self.stale = true;
            return Reconciled::Stale;
        }

        self.upsert(entry);

        Reconciled::Applied
    }
}
