use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;
use spacefs_api::fs::{Item, CreateFolder};

use crate::error::Result;

pub mod http;
pub mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

/// receives download progress in percent, `0..=100`
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// access to the store holding the file tree.
///
/// implementations report failures as [`Error::Transport`],
/// [`Error::NotFound`] or [`Error::Validation`].
///
/// [`Error::Transport`]: crate::Error::Transport
/// [`Error::NotFound`]: crate::Error::NotFound
/// [`Error::Validation`]: crate::Error::Validation
#[async_trait]
pub trait RemotePort: Send + Sync {
    async fn list(&self, space: Space, parent_id: Option<&EntryId>) -> Result<Vec<Item>>;

    async fn upload(
        &self,
        space: Space,
        parent_id: Option<&EntryId>,
        name: &str,
        mime: Option<&mime::Mime>,
        content: Bytes,
    ) -> Result<Item>;

    async fn download(
        &self,
        id: &EntryId,
        progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<Bytes>;

    async fn rename(&self, id: &EntryId, name: &str) -> Result<Item>;

    async fn delete(&self, id: &EntryId) -> Result;

    async fn move_item(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Item>;

    async fn create_folder(&self, folder: CreateFolder) -> Result<Item>;
}

#[async_trait]
impl<R> RemotePort for Box<R>
where
    R: RemotePort + ?Sized
{
    async fn list(&self, space: Space, parent_id: Option<&EntryId>) -> Result<Vec<Item>> {
        (**self).list(space, parent_id).await
    }

    async fn upload(
        &self,
        space: Space,
        parent_id: Option<&EntryId>,
        name: &str,
        mime: Option<&mime::Mime>,
        content: Bytes,
    ) -> Result<Item> {
        (**self).upload(space, parent_id, name, mime, content).await
    }

    async fn download(
        &self,
        id: &EntryId,
        progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<Bytes> {
        (**self).download(id, progress).await
    }

    async fn rename(&self, id: &EntryId, name: &str) -> Result<Item> {
        (**self).rename(id, name).await
    }

    async fn delete(&self, id: &EntryId) -> Result {
        (**self).delete(id).await
    }

    async fn move_item(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Item> {
        (**self).move_item(id, target_parent_id).await
    }

    async fn create_folder(&self, folder: CreateFolder) -> Result<Item> {
        (**self).create_folder(folder).await
    }
}
