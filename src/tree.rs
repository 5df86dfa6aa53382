use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;
use spacefs_api::fs::{Item, CreateFolder};

use crate::display::DisplayNames;
use crate::entry::{Entry, PathSegment};
use crate::error::{Error, Result};
use crate::guard::{OperationGuard, OperationKind, OperationState};
use crate::nav::NavigationStack;
use crate::reconcile::{Change, Listing, ListingKey};
use crate::remote::{RemotePort, ProgressFn};

#[cfg(test)]
mod test;

/// what the controller is busy with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Mutating(OperationKind),
}

/// snapshot of everything a view needs to draw the current directory
#[derive(Debug, Clone)]
pub struct ViewState {
    pub space: Space,
    pub current_files: Vec<Entry>,
    pub path_segments: Vec<PathSegment>,
    pub is_loading: bool,
    pub operation: OperationState,
    pub error: Option<String>,
    pub stale: bool,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        if let Some(kind) = self.operation.kind() {
            Phase::Mutating(kind)
        } else if self.is_loading {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }
}

/// a mutating request against the current directory
#[derive(Clone)]
pub enum Mutation {
    CreateFolder {
        name: String,
    },
    Upload {
        name: String,
        mime: Option<mime::Mime>,
        content: Bytes,
    },
    Rename {
        id: EntryId,
        name: String,
    },
    Delete {
        id: EntryId,
    },
    Move {
        id: EntryId,
        target_parent_id: EntryId,
    },
    Download {
        id: EntryId,
        progress: Option<ProgressFn>,
    },
}

impl Mutation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Mutation::CreateFolder { .. } => OperationKind::Creating,
            Mutation::Upload { .. } => OperationKind::Uploading,
            Mutation::Rename { .. } => OperationKind::Renaming,
            Mutation::Delete { .. } => OperationKind::Deleting,
            Mutation::Move { .. } => OperationKind::Moving,
            Mutation::Download { .. } => OperationKind::Downloading,
        }
    }

    pub fn target(&self) -> Option<&EntryId> {
        match self {
            Mutation::CreateFolder { .. } |
            Mutation::Upload { .. } => None,
            Mutation::Rename { id, .. } |
            Mutation::Delete { id } |
            Mutation::Move { id, .. } |
            Mutation::Download { id, .. } => Some(id),
        }
    }

    /// checks that can be made without asking the store
    pub fn validate(&self) -> Result {
        match self {
            Mutation::CreateFolder { name } |
            Mutation::Upload { name, .. } |
            Mutation::Rename { name, .. } => check_name(name),
            Mutation::Move { id, target_parent_id } => if id == target_parent_id {
                Err(Error::Validation(String::from("cannot move an item into itself")))
            } else {
                Ok(())
            },
            Mutation::Delete { .. } |
            Mutation::Download { .. } => Ok(()),
        }
    }
}

impl std::fmt::Debug for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::CreateFolder { name } => f.debug_struct("CreateFolder")
                .field("name", name)
                .finish(),
            Mutation::Upload { name, mime, content } => f.debug_struct("Upload")
                .field("name", name)
                .field("mime", mime)
                .field("len", &content.len())
                .finish(),
            Mutation::Rename { id, name } => f.debug_struct("Rename")
                .field("id", id)
                .field("name", name)
                .finish(),
            Mutation::Delete { id } => f.debug_struct("Delete")
                .field("id", id)
                .finish(),
            Mutation::Move { id, target_parent_id } => f.debug_struct("Move")
                .field("id", id)
                .field("target_parent_id", target_parent_id)
                .finish(),
            Mutation::Download { id, progress } => f.debug_struct("Download")
                .field("id", id)
                .field("progress", &progress.is_some())
                .finish(),
        }
    }
}

/// result of a completed [`Mutation`]
#[derive(Debug, Clone)]
pub enum Outcome {
    Created(Entry),
    Uploaded(Entry),
    Renamed(Entry),
    Deleted(EntryId),
    Moved(Entry),
    Downloaded(Bytes),
}

fn check_name(name: &str) -> Result {
    if spacefs_lib::fs::name_valid(name) {
        Ok(())
    } else {
        Err(Error::Validation(format!("invalid name {:?}", name)))
    }
}

struct TreeState {
    nav: NavigationStack,
    listing: Listing,
    error: Option<String>,
    /// last load ticket handed out
    issued: u64,
    /// ticket of the load currently shown
    applied: u64,
    loading: bool,
}

/// navigation and mutation of one space instance.
///
/// every method takes `&self`, the tree can be shared behind an `Arc` and
/// driven from several tasks. loads follow last request wins: a listing is
/// only shown when it belongs to the directory on top of the navigation
/// stack and no newer listing has been shown already. mutations are
/// serialized by an [`OperationGuard`](crate::guard::OperationGuard), a
/// second one fails right away.
pub struct SpaceTree<R> {
    remote: R,
    names: DisplayNames,
    guard: OperationGuard,
    state: Mutex<TreeState>,
}

impl<R> SpaceTree<R>
where
    R: RemotePort
{
    /// creates the tree at the root of `space`. nothing is loaded until
    /// [`refresh`](SpaceTree::refresh) or a navigation method is called.
    pub fn new(remote: R, space: Space, names: DisplayNames) -> Self {
        let nav = NavigationStack::new(space, &names);
        let listing = Listing::new(nav.listing_key());

        SpaceTree {
            remote,
            names,
            guard: OperationGuard::new(),
            state: Mutex::new(TreeState {
                nav,
                listing,
                error: None,
                issued: 0,
                applied: 0,
                loading: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TreeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn names(&self) -> &DisplayNames {
        &self.names
    }

    pub fn space(&self) -> Space {
        self.lock().nav.space()
    }

    pub fn navigation(&self) -> NavigationStack {
        self.lock().nav.clone()
    }

    pub fn operation(&self) -> OperationState {
        self.guard.state()
    }

    pub fn view(&self) -> ViewState {
        let state = self.lock();

        ViewState {
            space: state.nav.space(),
            current_files: state.listing.entries().to_vec(),
            path_segments: state.nav.frames().to_vec(),
            is_loading: state.loading,
            operation: self.guard.state(),
            error: state.error.clone(),
            stale: state.listing.is_stale(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.view().phase()
    }

    /// looks up an entry of the current listing by id, then by name and
    /// last by display name
    pub fn find_entry(&self, needle: &str) -> Option<Entry> {
        let state = self.lock();
        let entries = state.listing.entries();

        entries.iter().find(|entry| entry.id == needle)
            .or_else(|| entries.iter().find(|entry| entry.name == needle))
            .or_else(|| entries.iter().find(|entry| entry.display_name() == needle))
            .cloned()
    }

    fn entry(&self, item: Item) -> Entry {
        let display_name = if item.parent_id.is_none() {
            self.names.resolve(&item.name).to_owned()
        } else {
            item.name.clone()
        };

        Entry::from_item(item, display_name)
    }

    /// reloads the directory on top of the navigation stack.
    ///
    /// returns `Ok` without touching anything when the response is no longer
    /// wanted. a wanted failure empties the listing, flags it stale and is
    /// published before being returned.
    pub async fn refresh(&self) -> Result {
        let (ticket, key) = {
            let mut state = self.lock();
            state.issued += 1;
            state.loading = true;

            (state.issued, state.nav.listing_key())
        };

        tracing::debug!("load {ticket} issued for {} {:?}", key.space, key.parent_id);

        let result = self.remote.list(key.space, key.parent_id.as_ref()).await;

        let mut state = self.lock();

        if ticket == state.issued {
            state.loading = false;
        }

        if state.nav.listing_key() != key || ticket <= state.applied {
            tracing::debug!(
                "load {ticket} discarded. applied: {} live: {:?}",
                state.applied,
                state.nav.current_parent_id()
            );

            return Ok(());
        }

        state.applied = ticket;

        match result {
            Ok(items) => {
                let entries: Vec<Entry> = items.into_iter()
                    .map(|item| self.entry(item))
                    .collect();

                tracing::debug!("load {ticket} applied with {} entries", entries.len());

                state.listing.replace(key, entries);
                state.error = None;

                Ok(())
            },
            Err(err) => {
                tracing::warn!("load {ticket} failed: {err}");

                state.listing.invalidate(key);
                state.error = Some(err.to_string());

                Err(err)
            }
        }
    }

    /// opens a folder of the current listing
    pub async fn open_folder(&self, entry: &Entry) -> Result {
        {
            let mut state = self.lock();
            state.nav.push_folder(entry)?;
        }

        self.refresh().await
    }

    /// goes to the parent folder. does nothing at the root of the space.
    pub async fn pop_one(&self) -> Result {
        let changed = self.lock().nav.pop_one();

        if changed {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    /// jumps to a breadcrumb. indices of the current folder or past it are
    /// ignored.
    pub async fn navigate_to_index(&self, index: usize) -> Result {
        let changed = self.lock().nav.navigate_to_index(index);

        if changed {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    pub async fn reset_to_root(&self) -> Result {
        self.lock().nav.reset_to_root();

        self.refresh().await
    }

    /// moves to the root of another space and loads it. the switch stays in
    /// place when the load fails.
    pub async fn switch_space(&self, space: Space) -> Result {
        if let Some(kind) = self.guard.state().kind() {
            return Err(Error::OperationInProgress(kind));
        }

        {
            let mut state = self.lock();
            let nav = NavigationStack::new(space, &self.names);
            let key = nav.listing_key();

            state.nav = nav;
            state.listing.clear(key);
        }

        tracing::info!("switched to space {space}");

        self.refresh().await
    }

    fn current_key(&self) -> ListingKey {
        self.lock().nav.listing_key()
    }

    /// runs `task` while holding the operation guard and applies its change
    /// to the listing that was shown when the operation started.
    async fn run<T, F>(
        &self,
        kind: OperationKind,
        target: Option<&EntryId>,
        origin: ListingKey,
        task: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<(Option<Change>, T)>>
    {
        let _slot = self.guard.try_acquire(kind, target.cloned())?;

        let result = task.await;

        let mut state = self.lock();

        match result {
            Ok((change, value)) => {
                state.error = None;

                if let Some(change) = change {
                    let reconciled = state.listing.reconcile(&origin, change);

                    tracing::debug!("{kind} reconciled: {reconciled:?}");
                }

                tracing::info!("{kind} finished");

                Ok(value)
            },
            Err(err) => {
                tracing::warn!("{kind} failed: {err}");

                state.error = Some(err.to_string());

                Err(err)
            }
        }
    }

    /// creates a folder in the current directory
    pub async fn create_folder(&self, name: &str) -> Result<Entry> {
        check_name(name)?;

        let origin = self.current_key();
        let body = CreateFolder::new(name, origin.parent_id.clone(), origin.space);

        self.run(OperationKind::Creating, None, origin, async move {
            let entry = self.entry(self.remote.create_folder(body).await?);

            Ok((Some(Change::Created(entry.clone())), entry))
        }).await
    }

    /// uploads a file into the current directory
    pub async fn upload(&self, name: &str, mime: Option<mime::Mime>, content: Bytes) -> Result<Entry> {
        check_name(name)?;

        let origin = self.current_key();
        let space = origin.space;
        let parent_id = origin.parent_id.clone();

        self.run(OperationKind::Uploading, None, origin, async move {
            let item = self.remote.upload(space, parent_id.as_ref(), name, mime.as_ref(), content).await?;
            let entry = self.entry(item);

            Ok((Some(Change::Uploaded(entry.clone())), entry))
        }).await
    }

    pub async fn download(&self, id: &EntryId, progress: Option<ProgressFn>) -> Result<Bytes> {
        let origin = self.current_key();

        self.run(OperationKind::Downloading, Some(id), origin, async move {
            let bytes = self.remote.download(id, progress.as_deref()).await?;

            Ok((None, bytes))
        }).await
    }

    pub async fn rename(&self, id: &EntryId, name: &str) -> Result<Entry> {
        check_name(name)?;

        let origin = self.current_key();

        self.run(OperationKind::Renaming, Some(id), origin, async move {
            let entry = self.entry(self.remote.rename(id, name).await?);

            Ok((Some(Change::Renamed(entry.clone())), entry))
        }).await
    }

    pub async fn delete(&self, id: &EntryId) -> Result {
        let origin = self.current_key();

        self.run(OperationKind::Deleting, Some(id), origin, async move {
            self.remote.delete(id).await?;

            Ok((Some(Change::Deleted(id.clone())), ()))
        }).await
    }

    pub async fn move_entry(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Entry> {
        if id == target_parent_id {
            return Err(Error::Validation(String::from("cannot move an item into itself")));
        }

        let origin = self.current_key();

        self.run(OperationKind::Moving, Some(id), origin, async move {
            let entry = self.entry(self.remote.move_item(id, target_parent_id).await?);

            Ok((Some(Change::Moved(entry.clone())), entry))
        }).await
    }

    /// runs any mutation, see the individual methods for details
    pub async fn perform(&self, mutation: Mutation) -> Result<Outcome> {
        mutation.validate()?;

        match mutation {
            Mutation::CreateFolder { name } => self.create_folder(&name).await
                .map(Outcome::Created),
            Mutation::Upload { name, mime, content } => self.upload(&name, mime, content).await
                .map(Outcome::Uploaded),
            Mutation::Rename { id, name } => self.rename(&id, &name).await
                .map(Outcome::Renamed),
            Mutation::Delete { id } => {
                self.delete(&id).await?;

                Ok(Outcome::Deleted(id))
            },
            Mutation::Move { id, target_parent_id } => self.move_entry(&id, &target_parent_id).await
                .map(Outcome::Moved),
            Mutation::Download { id, progress } => self.download(&id, progress).await
                .map(Outcome::Downloaded),
        }
    }
}
