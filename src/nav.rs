use spacefs_lib::ids::EntryId;
use spacefs_lib::Space;

use crate::display::DisplayNames;
use crate::entry::{Entry, PathSegment};
use crate::error::{Error, Result};
use crate::reconcile::ListingKey;

pub const PATH_SEPARATOR: &str = " / ";

/// ordered path from the root of the active space to the current folder.
///
/// the first frame is always the space root and every following frame is a
/// folder inside the frame before it. the stack is never empty. only
/// [`SpaceTree`](crate::SpaceTree) changes it, callers get read access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    space: Space,
    frames: Vec<PathSegment>,
}

impl NavigationStack {
    pub fn new(space: Space, names: &DisplayNames) -> Self {
        NavigationStack {
            space,
            frames: vec![Self::root_frame(space, names)],
        }
    }

    fn root_frame(space: Space, names: &DisplayNames) -> PathSegment {
        PathSegment::root(
            space.key().to_owned(),
            names.space_label(space).to_owned()
        )
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn frames(&self) -> &[PathSegment] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// number of folders below the root
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn is_root(&self) -> bool {
        self.frames.len() == 1
    }

    fn top(&self) -> &PathSegment {
        // never empty, see new() and the truncating methods
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_parent_id(&self) -> Option<&EntryId> {
        self.top().id()
    }

    pub fn current_folder_name(&self) -> &str {
        self.top().display_name()
    }

    pub fn current_display_path(&self) -> String {
        self.frames.iter()
            .map(|frame| frame.display_name())
            .collect::<Vec<&str>>()
            .join(PATH_SEPARATOR)
    }

    /// the listing that belongs to the current top of the stack
    pub fn listing_key(&self) -> ListingKey {
        ListingKey {
            space: self.space,
            parent_id: self.current_parent_id().cloned(),
        }
    }

    /// opens a folder of the current directory.
    ///
    /// files, folders of another space and folders that do not live in the
    /// current directory are rejected, the last case happens when a stale
    /// listing is clicked while a new one loads.
    pub(crate) fn push_folder(&mut self, entry: &Entry) -> Result {
        if !entry.is_folder ||
            entry.space != self.space ||
            entry.parent_id.as_ref() != self.current_parent_id() {
            return Err(Error::InvalidTarget(entry.id.clone()));
        }

        self.frames.push(PathSegment::folder(entry, entry.display_name().to_owned()));

        Ok(())
    }

    /// drops the top frame. returns false when already at the root.
    pub(crate) fn pop_one(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// keeps frames `0..=index`. indices outside `0..len-1` are ignored,
    /// they come from breadcrumbs drawn before the stack changed.
    pub(crate) fn navigate_to_index(&mut self, index: usize) -> bool {
        if index + 1 < self.frames.len() {
            self.frames.truncate(index + 1);
            true
        } else {
            false
        }
    }

    pub(crate) fn reset_to_root(&mut self) {
        self.frames.truncate(1);
    }
}
