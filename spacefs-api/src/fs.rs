use spacefs_lib::ids;
use spacefs_lib::serde::mime_opt_str;
use spacefs_lib::Space;

use chrono::NaiveDateTime;
use serde::{Serialize, Deserialize};

use crate::{ApiError, Validator};
use crate::error::GeneralKind;

/// moderation state of a stored item. uploads to the public space start as
/// pending and are only listed once approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for FileStatus {
    fn default() -> Self {
        FileStatus::Approved
    }
}

/// a file or folder record as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ids::EntryId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ids::EntryId>,
    pub is_folder: bool,
    pub owner_type: Space,
    #[serde(default)]
    pub owner_id: Option<ids::OwnerId>,
    #[serde(default)]
    pub size: u64,
    #[serde(default, with = "mime_opt_str")]
    pub mime_type: Option<mime::Mime>,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Item {
    pub fn folder<I, N>(id: I, name: N, parent_id: Option<ids::EntryId>, space: Space) -> Self
    where
        I: Into<ids::EntryId>,
        N: Into<String>,
    {
        Item {
            id: id.into(),
            name: name.into(),
            parent_id,
            is_folder: true,
            owner_type: space,
            owner_id: None,
            size: 0,
            mime_type: None,
            status: FileStatus::Approved,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn file<I, N>(id: I, name: N, parent_id: Option<ids::EntryId>, space: Space, size: u64) -> Self
    where
        I: Into<ids::EntryId>,
        N: Into<String>,
    {
        Item {
            id: id.into(),
            name: name.into(),
            parent_id,
            is_folder: false,
            owner_type: space,
            owner_id: None,
            size,
            mime_type: None,
            status: FileStatus::Approved,
            created_at: None,
            updated_at: None,
        }
    }
}

fn check_name(name: &str) -> Result<(), ApiError> {
    if spacefs_lib::fs::name_valid(name) {
        Ok(())
    } else {
        Err(ApiError::from((
            GeneralKind::ValidationFailed,
            format!("invalid name {:?}", name)
        )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    pub name: String,
    pub parent_id: Option<ids::EntryId>,
    pub is_folder: bool,
    pub owner_type: Space,
}

impl CreateFolder {
    pub fn new<N>(name: N, parent_id: Option<ids::EntryId>, space: Space) -> Self
    where
        N: Into<String>
    {
        CreateFolder {
            name: name.into(),
            parent_id,
            is_folder: true,
            owner_type: space,
        }
    }
}

impl Validator for CreateFolder {
    fn validate(&self) -> Result<(), ApiError> {
        if !self.is_folder {
            return Err(ApiError::from((
                GeneralKind::InvalidData,
                "create folder requires is_folder to be set"
            )));
        }

        check_name(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameItem {
    pub name: String,
}

impl Validator for RenameItem {
    fn validate(&self) -> Result<(), ApiError> {
        check_name(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveItem {
    pub target_parent_id: ids::EntryId,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn item_from_store() {
        let json = r#"{
            "id": "a1b2c3d4-e5f6-7890",
            "name": "document.pdf",
            "parent_id": null,
            "is_folder": false,
            "owner_type": "user",
            "owner_id": 7,
            "size": 1024,
            "mime_type": "application/pdf",
            "status": "pending",
            "created_at": "2024-03-01T10:15:00",
            "updated_at": "2024-03-01T10:15:00",
            "created_by": 7
        }"#;

        let item: Item = serde_json::from_str(json).expect("failed to parse store item");

        assert_eq!(item.id, "a1b2c3d4-e5f6-7890");
        assert_eq!(item.owner_type, Space::Users);
        assert_eq!(item.status, FileStatus::Pending);
        assert_eq!(item.mime_type, Some(mime::APPLICATION_PDF));
        assert!(item.parent_id.is_none());
        assert!(item.created_at.is_some());
    }

    #[test]
    fn item_minimal() {
        let json = r#"{"id":"42","name":"Reports","is_folder":true,"owner_type":"group"}"#;
        let item: Item = serde_json::from_str(json).expect("failed to parse minimal item");

        assert_eq!(item, Item::folder("42", "Reports", None, Space::Group));
    }

    #[test]
    fn body_validation() {
        assert!(CreateFolder::new("Reports", None, Space::Public).validate().is_ok());
        assert!(CreateFolder::new("a/b", None, Space::Public).validate().is_err());
        assert!(RenameItem { name: String::new() }.validate().is_err());
        assert!(RenameItem { name: "notes.txt".into() }.validate().is_ok());
    }
}
