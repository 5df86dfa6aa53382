use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;
use spacefs_api::client::ApiClient;
use spacefs_api::client::error::RequestError;
use spacefs_api::client::fs as requests;
use spacefs_api::fs::{Item, CreateFolder};

use crate::error::{Error, Result};
use crate::remote::RemotePort;

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(api) => {
                let msg = api.message()
                    .map(|v| v.to_owned())
                    .unwrap_or_else(|| api.kind().to_string());

                if api.kind().is_not_found() {
                    Error::NotFound(msg)
                } else if api.kind().is_validation() {
                    Error::Validation(msg)
                } else {
                    Error::Transport(msg)
                }
            },
            RequestError::Reqwest(err) => Error::Transport(err.to_string()),
            RequestError::Url(err) => Error::Transport(err.to_string()),
        }
    }
}

/// the store reached over its http api
pub struct HttpRemote {
    client: ApiClient,
}

impl HttpRemote {
    pub fn new(client: ApiClient) -> Self {
        HttpRemote { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

/// upper bound for the buffer reserved up front from `content-length`
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

fn initial_capacity(total: Option<u64>) -> usize {
    total.unwrap_or(0).min(MAX_PREALLOC) as usize
}

fn percent(received: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }

    (received.min(total) * 100 / total) as u8
}

#[async_trait]
impl RemotePort for HttpRemote {
    async fn list(&self, space: Space, parent_id: Option<&EntryId>) -> Result<Vec<Item>> {
        let items = requests::RetrieveContents::space(space)
            .parent(parent_id.cloned())
            .send(&self.client)
            .await?;

        Ok(items)
    }

    async fn upload(
        &self,
        space: Space,
        parent_id: Option<&EntryId>,
        name: &str,
        mime: Option<&mime::Mime>,
        content: Bytes,
    ) -> Result<Item> {
        let mut builder = requests::UploadFile::create(space, name, content);
        builder.parent(parent_id.cloned());

        if let Some(mime) = mime {
            builder.content_type(mime.clone());
        }

        Ok(builder.send(&self.client).await?)
    }

    async fn download(
        &self,
        id: &EntryId,
        progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<Bytes> {
        let res = requests::DownloadItem::id(id.clone())
            .send(&self.client)
            .await?;

        let total = res.content_length();
        let mut buffer = BytesMut::with_capacity(initial_capacity(total));
        let mut stream = res.bytes_stream();
        let mut last = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(RequestError::from)?;
            buffer.extend_from_slice(&chunk);

            if let (Some(report), Some(total)) = (progress, total) {
                let current = percent(buffer.len() as u64, total);

                if last != Some(current) {
                    report(current);
                    last = Some(current);
                }
            }
        }

        if let Some(report) = progress {
            if last != Some(100) {
                report(100);
            }
        }

        Ok(buffer.freeze())
    }

    async fn rename(&self, id: &EntryId, name: &str) -> Result<Item> {
        Ok(requests::RenameItem::id(id.clone(), name)
            .send(&self.client)
            .await?)
    }

    async fn delete(&self, id: &EntryId) -> Result {
        Ok(requests::DeleteItem::id(id.clone())
            .send(&self.client)
            .await?)
    }

    async fn move_item(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Item> {
        Ok(requests::MoveItem::id(id.clone(), target_parent_id.clone())
            .send(&self.client)
            .await?)
    }

    async fn create_folder(&self, folder: CreateFolder) -> Result<Item> {
        Ok(requests::CreateFolder::name(folder.owner_type, folder.parent_id, folder.name)
            .send(&self.client)
            .await?)
    }
}
