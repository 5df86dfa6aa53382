use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;
use spacefs_api::fs::{Item, FileStatus};
use chrono::NaiveDateTime;

/// a file or folder as known to the client.
///
/// `display_name` is derived from `name` when the entry is created from a
/// store record and cannot be set afterwards. it takes no part in equality.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub is_folder: bool,
    pub parent_id: Option<EntryId>,
    pub space: Space,
    pub size: u64,
    pub mime_type: Option<mime::Mime>,
    pub status: FileStatus,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    display_name: String,
}

impl Entry {
    pub(crate) fn from_item(item: Item, display_name: String) -> Self {
        Entry {
            id: item.id,
            name: item.name,
            is_folder: item.is_folder,
            parent_id: item.parent_id,
            space: item.owner_type,
            size: item.size,
            mime_type: item.mime_type,
            status: item.status,
            created_at: item.created_at,
            updated_at: item.updated_at,
            display_name,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// entries directly under the space root
    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id &&
            self.name == other.name &&
            self.is_folder == other.is_folder &&
            self.parent_id == other.parent_id &&
            self.space == other.space &&
            self.size == other.size &&
            self.mime_type == other.mime_type &&
            self.status == other.status &&
            self.created_at == other.created_at &&
            self.updated_at == other.updated_at
    }
}

/// one breadcrumb frame of the navigation stack. `id` is `None` for the
/// root of the space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    id: Option<EntryId>,
    parent_id: Option<EntryId>,
    name: String,
    display_name: String,
}

impl PathSegment {
    pub(crate) fn root(name: String, display_name: String) -> Self {
        PathSegment {
            id: None,
            parent_id: None,
            name,
            display_name,
        }
    }

    pub(crate) fn folder(entry: &Entry, display_name: String) -> Self {
        PathSegment {
            id: Some(entry.id.clone()),
            parent_id: entry.parent_id.clone(),
            name: entry.name.clone(),
            display_name,
        }
    }

    pub fn id(&self) -> Option<&EntryId> {
        self.id.as_ref()
    }

    /// folder this frame was opened from, `None` for the root frame and for
    /// folders directly under the root
    pub fn parent_id(&self) -> Option<&EntryId> {
        self.parent_id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_root(&self) -> bool {
        self.id.is_none()
    }
}
