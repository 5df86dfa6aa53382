use spacefs_lib::ids;
use spacefs_lib::Space;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use crate::client::error::RequestError;
use crate::client::ApiClient;
use crate::Validator;
use crate::fs::{
    CreateFolder as CreateFolderBody,
    RenameItem as RenameItemBody,
    MoveItem as MoveItemBody,
    Item,
};

async fn item_response(res: reqwest::Response) -> Result<Item, RequestError> {
    match res.status() {
        StatusCode::OK | StatusCode::CREATED => Ok(res.json().await?),
        _ => Err(RequestError::from_response(res).await)
    }
}

pub struct RetrieveContents {
    space: Space,
    parent_id: Option<ids::EntryId>,
}

impl RetrieveContents {
    pub fn space(space: Space) -> Self {
        RetrieveContents {
            space,
            parent_id: None,
        }
    }

    pub fn parent<P>(&mut self, parent_id: P) -> &mut Self
    where
        P: Into<Option<ids::EntryId>>
    {
        self.parent_id = parent_id.into();
        self
    }

    pub async fn send(&self, client: &ApiClient) -> Result<Vec<Item>, RequestError> {
        let mut builder = client.get(format!("/files/list/{}", self.space.wire_name()))?;

        if let Some(parent_id) = &self.parent_id {
            builder = builder.query(&[("parent_id", parent_id)]);
        }

        let res = builder.send().await?;

        match res.status() {
            StatusCode::OK => Ok(res.json().await?),
            _ => Err(RequestError::from_response(res).await)
        }
    }
}

pub struct UploadFile {
    space: Space,
    parent_id: Option<ids::EntryId>,
    name: String,
    content: Bytes,
    content_type: Option<mime::Mime>,
}

impl UploadFile {
    pub fn create<N>(space: Space, name: N, content: Bytes) -> Self
    where
        N: Into<String>
    {
        UploadFile {
            space,
            parent_id: None,
            name: name.into(),
            content,
            content_type: None,
        }
    }

    pub fn parent<P>(&mut self, parent_id: P) -> &mut Self
    where
        P: Into<Option<ids::EntryId>>
    {
        self.parent_id = parent_id.into();
        self
    }

    pub fn content_type(&mut self, mime: mime::Mime) -> &mut Self {
        self.content_type = Some(mime);
        self
    }

    pub async fn send(self, client: &ApiClient) -> Result<Item, RequestError> {
        let content_type = self.content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let length = self.content.len() as u64;

        let part = Part::stream_with_length(self.content, length)
            .file_name(self.name)
            .mime_str(content_type.essence_str())?;

        let mut builder = client.post(format!("/files/upload/{}", self.space.wire_name()))?
            .multipart(Form::new().part("file", part));

        if let Some(parent_id) = &self.parent_id {
            builder = builder.query(&[("parent_id", parent_id)]);
        }

        item_response(builder.send().await?).await
    }
}

pub struct DownloadItem {
    id: ids::EntryId,
}

impl DownloadItem {
    pub fn id(id: ids::EntryId) -> Self {
        DownloadItem { id }
    }

    /// returns the response once the store accepted the request so the
    /// caller can stream the body
    pub async fn send(self, client: &ApiClient) -> Result<reqwest::Response, RequestError> {
        let res = client.get(format!("/files/download/{}", self.id))?
            .send()
            .await?;

        match res.status() {
            StatusCode::OK => Ok(res),
            _ => Err(RequestError::from_response(res).await)
        }
    }
}

pub struct RenameItem {
    id: ids::EntryId,
    body: RenameItemBody,
}

impl RenameItem {
    pub fn id<N>(id: ids::EntryId, name: N) -> Self
    where
        N: Into<String>
    {
        RenameItem {
            id,
            body: RenameItemBody {
                name: name.into()
            }
        }
    }

    pub async fn send(self, client: &ApiClient) -> Result<Item, RequestError> {
        self.body.validate()?;

        let res = client.patch(format!("/files/{}", self.id))?
            .json(&self.body)
            .send()
            .await?;

        item_response(res).await
    }
}

pub struct DeleteItem {
    id: ids::EntryId
}

impl DeleteItem {
    pub fn id(id: ids::EntryId) -> Self {
        DeleteItem { id }
    }

    pub async fn send(self, client: &ApiClient) -> Result<(), RequestError> {
        let res = client.delete(format!("/files/{}", self.id))?
            .send()
            .await?;

        match res.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(RequestError::from_response(res).await)
        }
    }
}

pub struct MoveItem {
    id: ids::EntryId,
    body: MoveItemBody,
}

impl MoveItem {
    pub fn id(id: ids::EntryId, target_parent_id: ids::EntryId) -> Self {
        MoveItem {
            id,
            body: MoveItemBody {
                target_parent_id
            }
        }
    }

    pub async fn send(self, client: &ApiClient) -> Result<Item, RequestError> {
        let res = client.post(format!("/files/move/{}", self.id))?
            .json(&self.body)
            .send()
            .await?;

        item_response(res).await
    }
}

pub struct CreateFolder {
    body: CreateFolderBody,
}

impl CreateFolder {
    pub fn name<N>(space: Space, parent_id: Option<ids::EntryId>, name: N) -> Self
    where
        N: Into<String>
    {
        CreateFolder {
            body: CreateFolderBody::new(name, parent_id, space)
        }
    }

    pub async fn send(self, client: &ApiClient) -> Result<Item, RequestError> {
        self.body.validate()?;

        let res = client.post("/files/create-folder")?
            .json(&self.body)
            .send()
            .await?;

        item_response(res).await
    }
}
