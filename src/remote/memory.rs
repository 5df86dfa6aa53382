use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use spacefs_lib::ids::{self, EntryId};
use spacefs_lib::Space;
use spacefs_api::Validator;
use spacefs_api::fs::{Item, CreateFolder, FileStatus};

use crate::error::{Error, Result};
use crate::remote::RemotePort;

/// size of the pieces a download is reported in
const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct Record {
    item: Item,
    content: Bytes,
}

#[derive(Debug, Default)]
struct Store {
    records: Vec<Record>,
}

impl Store {
    fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.item.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.item.id == id)
    }

    fn require(&self, id: &str) -> Result<&Record> {
        self.get(id).ok_or_else(|| Error::NotFound(format!("item {} not found", id)))
    }

    /// the parent must be a folder of the same space, `None` is the root
    fn check_parent(&self, space: Space, parent_id: Option<&EntryId>) -> Result {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        let parent = self.require(parent_id)?;

        if !parent.item.is_folder {
            return Err(Error::Validation(format!("{} is not a folder", parent.item.name)));
        }

        if parent.item.owner_type != space {
            return Err(Error::Validation(format!("{} belongs to another space", parent.item.name)));
        }

        Ok(())
    }

    fn check_unique(&self, space: Space, parent_id: Option<&EntryId>, name: &str, skip: Option<&str>) -> Result {
        let taken = self.records.iter().any(|record| {
            record.item.owner_type == space &&
                record.item.parent_id.as_ref() == parent_id &&
                record.item.name == name &&
                Some(record.item.id.as_str()) != skip
        });

        if taken {
            Err(Error::Validation(format!("an item named \"{}\" already exists", name)))
        } else {
            Ok(())
        }
    }

    /// true if `id` is `ancestor` or lives somewhere below it
    fn is_within(&self, id: &str, ancestor: &str) -> bool {
        let mut current = Some(id.to_owned());

        while let Some(check) = current {
            if check == ancestor {
                return true;
            }

            current = self.get(&check).and_then(|record| record.item.parent_id.clone());
        }

        false
    }

    fn push(&mut self, item: Item, content: Bytes) -> Item {
        let rtn = item.clone();

        self.records.push(Record { item, content });

        rtn
    }
}

fn check_name(name: &str) -> Result {
    if spacefs_lib::fs::name_valid(name) {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid name {:?}", name)))
    }
}

/// a store kept in process memory.
///
/// follows the rules of the http store: names are unique within a folder,
/// folders cannot be moved into themselves and uploads to the public space
/// wait for approval before they are listed.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    store: Mutex<Store>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote::default()
    }

    /// a store with a few folders and files in every space
    pub fn seeded() -> Self {
        let remote = MemoryRemote::new();

        for space in Space::ALL {
            let docs = remote.insert(Item::folder(ids::create_uid(), "Documents", None, space), Bytes::new());
            let photos = remote.insert(Item::folder(ids::create_uid(), "Photos", None, space), Bytes::new());
            let reports = remote.insert(
                Item::folder(ids::create_uid(), "Reports", Some(docs.id.clone()), space),
                Bytes::new()
            );

            remote.insert_file(space, Some(&docs.id), "readme.txt", Bytes::from_static(b"start here\n"));
            remote.insert_file(space, Some(&reports.id), "q1.csv", Bytes::from_static(b"month,total\njan,10\n"));
            remote.insert_file(space, Some(&photos.id), "empty.png", Bytes::new());
        }

        remote
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// adds an item as is, existing items with the same id are replaced
    pub fn insert(&self, item: Item, content: Bytes) -> Item {
        let mut store = self.lock();

        store.records.retain(|record| record.item.id != item.id);
        store.push(item, content)
    }

    pub fn insert_file(&self, space: Space, parent_id: Option<&EntryId>, name: &str, content: Bytes) -> Item {
        let mut item = Item::file(ids::create_uid(), name, parent_id.cloned(), space, content.len() as u64);
        item.created_at = Some(Utc::now().naive_utc());

        self.insert(item, content)
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.lock().get(id).map(|record| record.item.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn set_status(&self, id: &str, status: FileStatus) -> bool {
        match self.lock().get_mut(id) {
            Some(record) => {
                record.item.status = status;
                true
            },
            None => false
        }
    }
}

#[async_trait]
impl RemotePort for MemoryRemote {
    async fn list(&self, space: Space, parent_id: Option<&EntryId>) -> Result<Vec<Item>> {
        let store = self.lock();

        if let Some(id) = parent_id {
            let parent = store.require(id)?;

            if !parent.item.is_folder || parent.item.owner_type != space {
                return Err(Error::NotFound(format!("folder {} not found", id)));
            }
        }

        Ok(store.records.iter()
            .filter(|record| {
                record.item.owner_type == space &&
                    record.item.parent_id.as_ref() == parent_id &&
                    record.item.status == FileStatus::Approved
            })
            .map(|record| record.item.clone())
            .collect())
    }

    async fn upload(
        &self,
        space: Space,
        parent_id: Option<&EntryId>,
        name: &str,
        mime: Option<&mime::Mime>,
        content: Bytes,
    ) -> Result<Item> {
        check_name(name)?;

        let mut store = self.lock();
        store.check_parent(space, parent_id)?;
        store.check_unique(space, parent_id, name, None)?;

        let mut item = Item::file(ids::create_uid(), name, parent_id.cloned(), space, content.len() as u64);
        item.mime_type = mime.cloned();
        item.created_at = Some(Utc::now().naive_utc());

        if space == Space::Public {
            item.status = FileStatus::Pending;
        }

        Ok(store.push(item, content))
    }

    async fn download(
        &self,
        id: &EntryId,
        progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<Bytes> {
        let content = {
            let store = self.lock();
            let record = store.require(id)?;

            if record.item.is_folder {
                return Err(Error::Validation(format!("{} is a folder", record.item.name)));
            }

            record.content.clone()
        };

        if let Some(report) = progress {
            let total = content.len();
            let mut sent = 0;

            while sent < total {
                sent = (sent + CHUNK_SIZE).min(total);
                report((sent * 100 / total) as u8);
            }

            if total == 0 {
                report(100);
            }
        }

        Ok(content)
    }

    async fn rename(&self, id: &EntryId, name: &str) -> Result<Item> {
        check_name(name)?;

        let mut store = self.lock();
        let (space, parent_id) = {
            let record = store.require(id)?;

            (record.item.owner_type, record.item.parent_id.clone())
        };

        store.check_unique(space, parent_id.as_ref(), name, Some(id.as_str()))?;

        let record = store.get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("item {} not found", id)))?;
        record.item.name = name.to_owned();
        record.item.updated_at = Some(Utc::now().naive_utc());

        Ok(record.item.clone())
    }

    async fn delete(&self, id: &EntryId) -> Result {
        let mut store = self.lock();
        store.require(id)?;

        let removed: Vec<EntryId> = store.records.iter()
            .filter(|record| store.is_within(&record.item.id, id))
            .map(|record| record.item.id.clone())
            .collect();

        store.records.retain(|record| !removed.contains(&record.item.id));

        Ok(())
    }

    async fn move_item(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Item> {
        let mut store = self.lock();

        let (space, name) = {
            let record = store.require(id)?;

            (record.item.owner_type, record.item.name.clone())
        };

        store.check_parent(space, Some(target_parent_id))?;

        if store.is_within(target_parent_id, id) {
            return Err(Error::Validation(String::from("cannot move a folder into itself")));
        }

        store.check_unique(space, Some(target_parent_id), &name, Some(id.as_str()))?;

        let record = store.get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("item {} not found", id)))?;
        record.item.parent_id = Some(target_parent_id.clone());
        record.item.updated_at = Some(Utc::now().naive_utc());

        Ok(record.item.clone())
    }

    async fn create_folder(&self, folder: CreateFolder) -> Result<Item> {
        folder.validate()
            .map_err(|err| Error::Validation(err.to_string()))?;

        let mut store = self.lock();
        store.check_parent(folder.owner_type, folder.parent_id.as_ref())?;
        store.check_unique(folder.owner_type, folder.parent_id.as_ref(), &folder.name, None)?;

        let mut item = Item::folder(ids::create_uid(), folder.name, folder.parent_id, folder.owner_type);
        item.created_at = Some(Utc::now().naive_utc());

        Ok(store.push(item, Bytes::new()))
    }
}
