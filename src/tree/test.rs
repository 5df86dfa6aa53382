use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Semaphore;

use super::*;
use crate::remote::MemoryRemote;

/// wraps a memory store and lets the test decide when a response arrives
#[derive(Default)]
struct GatedRemote {
    inner: MemoryRemote,
    list_gates: Mutex<HashMap<Option<EntryId>, VecDeque<Arc<Semaphore>>>>,
    list_failures: Mutex<VecDeque<Error>>,
    download_gate: Mutex<Option<Arc<Semaphore>>>,
    list_calls: AtomicUsize,
}

impl GatedRemote {
    /// holds the next list call for `parent` until the returned semaphore
    /// gets a permit. the listing is taken before waiting.
    fn gate_list(&self, parent: Option<&EntryId>) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));

        self.list_gates.lock().unwrap()
            .entry(parent.cloned())
            .or_default()
            .push_back(gate.clone());

        gate
    }

    fn fail_next_list(&self, err: Error) {
        self.list_failures.lock().unwrap().push_back(err);
    }

    fn gate_download(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));

        *self.download_gate.lock().unwrap() = Some(gate.clone());

        gate
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemotePort for GatedRemote {
    async fn list(&self, space: Space, parent_id: Option<&EntryId>) -> Result<Vec<Item>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let failure = self.list_failures.lock().unwrap().pop_front();

        let result = match failure {
            Some(err) => Err(err),
            None => self.inner.list(space, parent_id).await,
        };

        let gate = self.list_gates.lock().unwrap()
            .get_mut(&parent_id.cloned())
            .and_then(|queue| queue.pop_front());

        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        result
    }

    async fn upload(
        &self,
        space: Space,
        parent_id: Option<&EntryId>,
        name: &str,
        mime: Option<&mime::Mime>,
        content: Bytes,
    ) -> Result<Item> {
        self.inner.upload(space, parent_id, name, mime, content).await
    }

    async fn download(
        &self,
        id: &EntryId,
        progress: Option<&(dyn Fn(u8) + Send + Sync)>,
    ) -> Result<Bytes> {
        let gate = self.download_gate.lock().unwrap().take();

        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        self.inner.download(id, progress).await
    }

    async fn rename(&self, id: &EntryId, name: &str) -> Result<Item> {
        self.inner.rename(id, name).await
    }

    async fn delete(&self, id: &EntryId) -> Result {
        self.inner.delete(id).await
    }

    async fn move_item(&self, id: &EntryId, target_parent_id: &EntryId) -> Result<Item> {
        self.inner.move_item(id, target_parent_id).await
    }

    async fn create_folder(&self, folder: CreateFolder) -> Result<Item> {
        self.inner.create_folder(folder).await
    }
}

fn folder(remote: &GatedRemote, space: Space, parent: Option<&EntryId>, name: &str) -> Item {
    remote.inner.insert(
        Item::folder(spacefs_lib::ids::create_uid(), name, parent.cloned(), space),
        Bytes::new()
    )
}

fn file(remote: &GatedRemote, space: Space, parent: Option<&EntryId>, name: &str) -> Item {
    remote.inner.insert_file(space, parent, name, Bytes::from(name.as_bytes().to_vec()))
}

fn names(view: &ViewState) -> Vec<&str> {
    view.current_files.iter()
        .map(|entry| entry.name.as_str())
        .collect()
}

/// lets other branches of a `join!` run until `check` passes
async fn settle<F>(check: F)
where
    F: Fn() -> bool
{
    for _ in 0..100 {
        if check() {
            return;
        }

        tokio::task::yield_now().await;
    }

    panic!("condition was not reached");
}

async fn loaded_tree(remote: GatedRemote) -> SpaceTree<GatedRemote> {
    let tree = SpaceTree::new(remote, Space::Users, DisplayNames::default());
    tree.refresh().await.unwrap();
    tree
}

#[tokio::test]
async fn initial_view() {
    let remote = GatedRemote::default();
    folder(&remote, Space::Users, None, "docs");
    file(&remote, Space::Users, None, "a.txt");

    let tree = SpaceTree::new(remote, Space::Users, DisplayNames::default());
    let view = tree.view();

    assert!(view.current_files.is_empty());
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(view.path_segments.len(), 1);
    assert_eq!(view.path_segments[0].display_name(), "My Space");

    tree.refresh().await.unwrap();

    let view = tree.view();
    assert_eq!(names(&view), vec!["docs", "a.txt"]);
    assert!(!view.is_loading);
    assert!(!view.stale);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn navigation_loads_each_directory() {
    let remote = GatedRemote::default();
    let docs = folder(&remote, Space::Users, None, "docs");
    let year = folder(&remote, Space::Users, Some(&docs.id), "2024");
    file(&remote, Space::Users, Some(&docs.id), "index.md");
    file(&remote, Space::Users, Some(&year.id), "jan.csv");

    let tree = loaded_tree(remote).await;

    let entry = tree.find_entry("docs").unwrap();
    tree.open_folder(&entry).await.unwrap();
    assert_eq!(names(&tree.view()), vec!["2024", "index.md"]);

    let entry = tree.find_entry(&year.id).unwrap();
    tree.open_folder(&entry).await.unwrap();
    assert_eq!(names(&tree.view()), vec!["jan.csv"]);
    assert_eq!(tree.navigation().current_display_path(), "My Space / docs / 2024");

    tree.navigate_to_index(1).await.unwrap();
    assert_eq!(tree.navigation().current_parent_id(), Some(&docs.id));
    assert_eq!(names(&tree.view()), vec!["2024", "index.md"]);

    tree.pop_one().await.unwrap();
    assert!(tree.navigation().is_root());
    assert_eq!(names(&tree.view()), vec!["docs"]);

    let calls = tree.remote().list_calls();
    tree.pop_one().await.unwrap();
    tree.navigate_to_index(0).await.unwrap();
    tree.navigate_to_index(7).await.unwrap();
    assert_eq!(tree.remote().list_calls(), calls, "no-op navigation issued a load");
}

#[tokio::test]
async fn open_rejects_files_without_loading() {
    let remote = GatedRemote::default();
    file(&remote, Space::Users, None, "a.txt");

    let tree = loaded_tree(remote).await;
    let calls = tree.remote().list_calls();
    let entry = tree.find_entry("a.txt").unwrap();

    let result = tree.open_folder(&entry).await;

    assert_eq!(result, Err(Error::InvalidTarget(entry.id.clone())));
    assert_eq!(tree.remote().list_calls(), calls);
    assert!(tree.navigation().is_root());
    assert!(tree.view().error.is_none(), "rejection was published");
}

#[tokio::test]
async fn reset_to_root_from_depth() {
    let remote = GatedRemote::default();
    let a = folder(&remote, Space::Users, None, "a");
    let b = folder(&remote, Space::Users, Some(&a.id), "b");
    folder(&remote, Space::Users, Some(&b.id), "c");

    let tree = loaded_tree(remote).await;

    for name in ["a", "b", "c"] {
        let entry = tree.find_entry(name).unwrap();
        tree.open_folder(&entry).await.unwrap();
    }

    assert_eq!(tree.navigation().depth(), 3);

    tree.reset_to_root().await.unwrap();

    assert!(tree.navigation().current_parent_id().is_none());
    assert_eq!(names(&tree.view()), vec!["a"]);
}

#[tokio::test]
async fn last_request_wins() {
    let remote = GatedRemote::default();
    let a = folder(&remote, Space::Users, None, "a");
    let b = folder(&remote, Space::Users, None, "b");
    file(&remote, Space::Users, Some(&a.id), "from-a.txt");
    file(&remote, Space::Users, Some(&b.id), "from-b.txt");

    let tree = loaded_tree(remote).await;
    let entry_a = tree.find_entry("a").unwrap();
    let entry_b = tree.find_entry("b").unwrap();

    let gate_a = tree.remote().gate_list(Some(&a.id));
    let gate_b = tree.remote().gate_list(Some(&b.id));

    let load_a = tree.open_folder(&entry_a);
    let load_b = async {
        // back at the root before opening the sibling
        tree.pop_one().await.unwrap();
        tree.open_folder(&entry_b).await
    };
    let answer = async {
        settle(|| tree.remote().list_calls() == 4).await;

        gate_b.add_permits(1);

        settle(|| !tree.view().current_files.is_empty() && !tree.view().is_loading).await;

        gate_a.add_permits(1);
    };

    let (result_a, result_b, _) = tokio::join!(load_a, load_b, answer);

    assert!(result_a.is_ok());
    assert!(result_b.is_ok());

    let view = tree.view();
    assert_eq!(names(&view), vec!["from-b.txt"]);
    assert_eq!(view.path_segments.last().and_then(|seg| seg.id()), Some(&b.id));
    assert!(!view.is_loading);
}

#[tokio::test]
async fn older_refresh_of_same_directory_is_discarded() {
    let remote = GatedRemote::default();
    file(&remote, Space::Users, None, "old.txt");

    let tree = loaded_tree(remote).await;

    let first_gate = tree.remote().gate_list(None);
    let second_gate = tree.remote().gate_list(None);

    let first = tree.refresh();
    let second = async {
        settle(|| tree.remote().list_calls() == 2).await;

        file(tree.remote(), Space::Users, None, "new.txt");

        tree.refresh().await
    };
    let answer = async {
        settle(|| tree.remote().list_calls() == 3).await;

        second_gate.add_permits(1);

        settle(|| tree.view().current_files.len() == 2).await;

        first_gate.add_permits(1);
    };

    let (first, second, _) = tokio::join!(first, second, answer);

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(names(&tree.view()), vec!["old.txt", "new.txt"]);
}

#[tokio::test]
async fn loading_until_newest_load_returns() {
    let remote = GatedRemote::default();
    file(&remote, Space::Users, None, "a.txt");

    let tree = loaded_tree(remote).await;
    assert_eq!(tree.phase(), Phase::Idle);

    let older_gate = tree.remote().gate_list(None);
    let newer_gate = tree.remote().gate_list(None);
    let older_done = AtomicBool::new(false);

    let older = async {
        let result = tree.refresh().await;
        older_done.store(true, Ordering::SeqCst);
        result
    };
    let newer = async {
        settle(|| tree.remote().list_calls() == 2).await;

        tree.refresh().await
    };
    let answer = async {
        settle(|| tree.remote().list_calls() == 3).await;

        assert_eq!(tree.phase(), Phase::Loading);
        assert!(tree.view().is_loading);

        older_gate.add_permits(1);

        settle(|| older_done.load(Ordering::SeqCst)).await;

        assert_eq!(tree.phase(), Phase::Loading, "older load cleared the flag");

        newer_gate.add_permits(1);
    };

    let (older, newer, _) = tokio::join!(older, newer, answer);

    assert!(older.is_ok());
    assert!(newer.is_ok());

    let view = tree.view();
    assert!(!view.is_loading);
    assert_eq!(view.phase(), Phase::Idle);
    assert_eq!(names(&view), vec!["a.txt"]);
}

#[tokio::test]
async fn failed_load_is_published_and_kept() {
    let remote = GatedRemote::default();
    let a = folder(&remote, Space::Users, None, "a");
    file(&remote, Space::Users, None, "root.txt");

    let tree = loaded_tree(remote).await;
    let entry = tree.find_entry("a").unwrap();

    tree.remote().fail_next_list(Error::Transport(String::from("connection reset")));

    let result = tree.open_folder(&entry).await;

    assert_eq!(result, Err(Error::Transport(String::from("connection reset"))));

    let view = tree.view();
    assert!(view.current_files.is_empty());
    assert!(view.stale);
    assert!(view.error.as_deref().unwrap_or("").contains("connection reset"));
    assert_eq!(tree.navigation().current_parent_id(), Some(&a.id), "navigation was rolled back");

    tree.refresh().await.unwrap();

    let view = tree.view();
    assert!(!view.stale);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn mutation_rejected_while_busy() {
    let remote = GatedRemote::default();
    let big = file(&remote, Space::Users, None, "big.bin");
    let other = file(&remote, Space::Users, None, "other.txt");

    let tree = loaded_tree(remote).await;
    let gate = tree.remote().gate_download();

    let download = tree.download(&big.id, None);
    let contender = async {
        settle(|| !tree.operation().is_idle()).await;

        let before = tree.view();
        let result = tree.perform(Mutation::Rename {
            id: other.id.clone(),
            name: String::from("renamed.txt"),
        }).await;
        let after = tree.view();

        assert!(
            matches!(result, Err(Error::OperationInProgress(OperationKind::Downloading))),
            "unexpected result {:?}", result
        );
        assert_eq!(before.operation, after.operation);
        assert_eq!(before.current_files, after.current_files);
        assert!(after.error.is_none(), "rejection was published");
        assert_eq!(after.phase(), Phase::Mutating(OperationKind::Downloading));

        let switched = tree.switch_space(Space::Public).await;
        assert_eq!(switched, Err(Error::OperationInProgress(OperationKind::Downloading)));
        assert_eq!(tree.space(), Space::Users);

        gate.add_permits(1);
    };

    let (bytes, _) = tokio::join!(download, contender);

    assert_eq!(bytes.unwrap(), Bytes::from_static(b"big.bin"));
    assert!(tree.operation().is_idle());
    assert_eq!(tree.remote().inner.get(&other.id).unwrap().name, "other.txt");
}

#[tokio::test]
async fn guard_released_on_every_exit() {
    let remote = GatedRemote::default();
    let keep = file(&remote, Space::Users, None, "keep.txt");

    let tree = loaded_tree(remote).await;

    let ok = tree.rename(&keep.id, "kept.txt").await;
    assert!(ok.is_ok());
    assert!(tree.operation().is_idle());

    let missing = tree.delete(&String::from("missing")).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
    assert!(tree.operation().is_idle());
    assert!(tree.view().error.is_some());

    let invalid = tree.perform(Mutation::CreateFolder { name: String::from("..") }).await;
    assert!(matches!(invalid, Err(Error::Validation(_))));
    assert!(tree.operation().is_idle());

    // a dropped operation releases the guard as well
    let _gate = tree.remote().gate_download();
    assert!(tree.download(&keep.id, None).now_or_never().is_none());
    assert!(tree.operation().is_idle());
}

#[tokio::test]
async fn remote_failure_leaves_listing() {
    let remote = GatedRemote::default();
    file(&remote, Space::Users, None, "a.txt");
    file(&remote, Space::Users, None, "b.txt");

    let tree = loaded_tree(remote).await;
    let a = tree.find_entry("a.txt").unwrap();
    let before = tree.view().current_files;

    let result = tree.rename(&a.id, "b.txt").await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(tree.view().current_files, before);
    assert!(tree.view().error.is_some());

    tree.rename(&a.id, "c.txt").await.unwrap();

    assert!(tree.view().error.is_none(), "error was not cleared by a later success");
}

#[tokio::test]
async fn create_folder_appends_without_reload() {
    let remote = GatedRemote::default();
    file(&remote, Space::Users, None, "a.txt");

    let tree = loaded_tree(remote).await;
    let calls = tree.remote().list_calls();

    let created = tree.create_folder("Reports").await.unwrap();

    let view = tree.view();
    assert_eq!(view.current_files.len(), 2);
    assert_eq!(view.current_files[1], created);
    assert!(created.is_folder);
    assert_eq!(created.name, "Reports");
    assert_eq!(tree.remote().list_calls(), calls, "create reloaded the listing");
}

#[tokio::test]
async fn mutations_reconcile_listing() {
    let remote = GatedRemote::default();
    let dest = folder(&remote, Space::Users, None, "dest");
    let a = file(&remote, Space::Users, None, "a.txt");
    let b = file(&remote, Space::Users, None, "b.txt");

    let tree = loaded_tree(remote).await;

    tree.rename(&a.id, "z.txt").await.unwrap();
    assert_eq!(names(&tree.view()), vec!["dest", "z.txt", "b.txt"]);

    tree.move_entry(&b.id, &dest.id).await.unwrap();
    assert_eq!(names(&tree.view()), vec!["dest", "z.txt"]);

    tree.delete(&a.id).await.unwrap();
    assert_eq!(names(&tree.view()), vec!["dest"]);

    let uploaded = tree.upload("notes.txt", Some(mime::TEXT_PLAIN), Bytes::from_static(b"hi")).await.unwrap();
    assert_eq!(uploaded.size, 2);
    assert_eq!(names(&tree.view()), vec!["dest", "notes.txt"]);

    let outcome = tree.perform(Mutation::Download {
        id: uploaded.id.clone(),
        progress: None,
    }).await.unwrap();
    assert!(matches!(outcome, Outcome::Downloaded(ref bytes) if bytes.as_ref() == b"hi"));

    let entry = tree.find_entry("dest").unwrap();
    tree.open_folder(&entry).await.unwrap();
    assert_eq!(names(&tree.view()), vec!["b.txt"]);
}

#[tokio::test]
async fn public_upload_waits_for_approval() {
    let remote = GatedRemote::default();
    let tree = SpaceTree::new(remote, Space::Public, DisplayNames::default());
    tree.refresh().await.unwrap();

    let entry = tree.upload("flyer.pdf", None, Bytes::from_static(b"%PDF")).await.unwrap();

    assert_eq!(entry.status, spacefs_api::fs::FileStatus::Pending);
    assert!(tree.view().current_files.is_empty(), "pending upload was listed");
}

#[tokio::test]
async fn create_while_navigating_keeps_old_listing() {
    let remote = GatedRemote::default();
    let a = folder(&remote, Space::Users, None, "a");

    let tree = loaded_tree(remote).await;
    let gate = tree.remote().gate_list(Some(&a.id));
    let entry = tree.find_entry("a").unwrap();

    let open = tree.open_folder(&entry);
    let create = async {
        settle(|| tree.navigation().depth() == 1).await;

        // the root listing is still shown while "a" loads
        let result = tree.create_folder("Inside").await;

        assert_eq!(names(&tree.view()), vec!["a"], "folder was added to the root listing");

        gate.add_permits(1);

        result
    };

    let (opened, inside) = tokio::join!(open, create);

    opened.unwrap();
    let inside = inside.unwrap();

    assert_eq!(inside.parent_id.as_ref(), Some(&a.id));
    assert!(tree.remote().inner.get(&inside.id).is_some());
    assert_eq!(tree.navigation().current_parent_id(), Some(&a.id));
}

#[tokio::test]
async fn switch_space_replaces_stack_and_listing() {
    let remote = GatedRemote::default();
    let docs = folder(&remote, Space::Users, None, "docs");
    folder(&remote, Space::Group, None, "team");
    file(&remote, Space::Group, None, "plan.md");

    let tree = loaded_tree(remote).await;
    let entry = tree.find_entry(&docs.id).unwrap();
    tree.open_folder(&entry).await.unwrap();

    tree.switch_space(Space::Group).await.unwrap();

    let view = tree.view();
    assert_eq!(view.space, Space::Group);
    assert_eq!(view.path_segments.len(), 1);
    assert_eq!(view.path_segments[0].name(), "group");
    assert_eq!(view.path_segments[0].display_name(), "Group Space");
    assert_eq!(names(&view), vec!["team", "plan.md"]);

    tree.remote().fail_next_list(Error::Transport(String::from("offline")));

    let result = tree.switch_space(Space::Public).await;

    assert!(result.is_err());
    assert_eq!(tree.space(), Space::Public, "switch was rolled back");
    assert!(tree.view().stale);
    assert!(tree.view().current_files.is_empty());
}

#[tokio::test]
async fn root_entries_use_display_names() {
    let remote = GatedRemote::default();
    let public = folder(&remote, Space::Users, None, "public");
    folder(&remote, Space::Users, Some(&public.id), "public");

    let tree = loaded_tree(remote).await;
    let entry = tree.find_entry("Public Space").unwrap();

    assert_eq!(entry.name, "public");
    assert_eq!(entry.display_name(), "Public Space");

    tree.open_folder(&entry).await.unwrap();

    let view = tree.view();
    assert_eq!(view.current_files[0].display_name(), "public");
    assert_eq!(view.path_segments[1].display_name(), "Public Space");

    let nested = view.current_files[0].clone();
    tree.open_folder(&nested).await.unwrap();

    let view = tree.view();
    assert_eq!(view.path_segments[2].display_name(), "public");
    assert_eq!(tree.navigation().current_display_path(), "My Space / Public Space / public");
}
