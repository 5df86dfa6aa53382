//! client side navigation and mutation engine for a file tree that lives in a
//! remote store and is split across named spaces.
//!
//! [`SpaceTree`] is the entry point. it owns the navigation stack, the
//! current listing and the operation guard for one space instance and talks
//! to the store through a [`RemotePort`].

pub mod error;
pub mod entry;
pub mod display;
pub mod nav;
pub mod guard;
pub mod reconcile;
pub mod remote;
pub mod tree;

pub use error::{Error, Result};
pub use entry::{Entry, PathSegment};
pub use display::DisplayNames;
pub use nav::NavigationStack;
pub use guard::{OperationKind, OperationState};
pub use reconcile::{Listing, ListingKey};
pub use remote::{RemotePort, ProgressFn};
pub use tree::{SpaceTree, ViewState, Phase, Mutation, Outcome};

pub use spacefs_lib::ids::EntryId;
pub use spacefs_lib::Space;
