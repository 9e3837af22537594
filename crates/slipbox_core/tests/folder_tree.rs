use slipbox_core::db::open_db_in_memory;
use slipbox_core::{
    FolderCommandError, FolderLocation, FolderRepository, FolderRow, FolderTree, RefreshChannel,
    SqliteFolderRepository,
};

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn loaded_tree<'conn>(
    repo: &SqliteFolderRepository<'conn>,
    channel: &RefreshChannel,
) -> FolderTree {
    let mut tree = FolderTree::new(channel.clone());
    tree.process_signals(repo).unwrap();
    tree
}

fn top_names(tree: &FolderTree) -> Vec<String> {
    tree.top_level()
        .iter()
        .map(|node| node.folder().name.clone())
        .collect()
}

#[test]
fn initial_pass_loads_top_level_folders() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();

    repo.add_folder("Inbox", None).unwrap();
    repo.add_folder("Archive", None).unwrap();

    let tree = loaded_tree(&repo, &channel);
    assert_eq!(top_names(&tree), vec!["Inbox", "Archive"]);
}

#[test]
fn create_folder_becomes_visible_only_through_the_refresh_signal() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);
    assert!(tree.top_level().is_empty());

    // Mutating storage without a publish changes nothing in the tree.
    repo.add_folder("Quiet", None).unwrap();
    tree.process_signals(&repo).unwrap();
    assert!(tree.top_level().is_empty());

    channel.publish(FolderLocation::Root);
    tree.process_signals(&repo).unwrap();
    assert_eq!(top_names(&tree), vec!["Quiet"]);
}

#[test]
fn create_subfolder_publishes_exactly_one_signal_at_the_parent() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    tree.process_signals(&repo).unwrap();

    let probe = channel.subscribe(FolderLocation::Folder(parent.id));
    let row = FolderRow::new(parent.clone(), channel.clone());
    row.create_subfolder(&repo, "Child").unwrap();

    assert_eq!(probe.take(), Some(FolderLocation::Folder(parent.id)));
    assert_eq!(probe.take(), None);
}

#[test]
fn subfolder_appears_under_expanded_parent_and_root_is_unchanged() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let folder_a = tree.create_folder(&repo, "A", None).unwrap();
    tree.create_folder(&repo, "B", None).unwrap();
    tree.process_signals(&repo).unwrap();
    assert_eq!(top_names(&tree), vec!["A", "B"]);

    tree.find_node_mut(folder_a.id)
        .unwrap()
        .toggle(&repo)
        .unwrap();

    let row = FolderRow::new(folder_a.clone(), channel.clone());
    row.create_subfolder(&repo, "X").unwrap();
    tree.process_signals(&repo).unwrap();

    let node_a = tree.find_node_mut(folder_a.id).unwrap();
    assert!(node_a.is_expanded());
    let child_names: Vec<_> = node_a
        .children()
        .iter()
        .map(|child| child.folder().name.clone())
        .collect();
    assert_eq!(child_names, vec!["X"]);
    assert_eq!(top_names(&tree), vec!["A", "B"]);
}

#[test]
fn collapsed_parent_ignores_the_signal_and_toggles_into_fresh_data() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    tree.process_signals(&repo).unwrap();

    let row = FolderRow::new(parent.clone(), channel.clone());
    row.create_subfolder(&repo, "X").unwrap();
    tree.process_signals(&repo).unwrap();

    let node = tree.find_node_mut(parent.id).unwrap();
    assert!(!node.is_expanded());
    assert!(node.children().is_empty());

    node.toggle(&repo).unwrap();
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].folder().name, "X");
}

#[test]
fn delete_of_top_level_folder_refreshes_the_root_list() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    tree.create_folder(&repo, "A", None).unwrap();
    let folder_b = tree.create_folder(&repo, "B", None).unwrap();
    tree.process_signals(&repo).unwrap();
    assert_eq!(top_names(&tree), vec!["A", "B"]);

    let root_probe = channel.subscribe(FolderLocation::Root);
    root_probe.take();
    let deleted_probe = channel.subscribe(FolderLocation::Folder(folder_b.id));

    let mut row = FolderRow::new(folder_b.clone(), channel.clone());
    row.request_delete();
    row.confirm_delete(&repo).unwrap();

    // The signal targets the deleted folder's container, never the folder.
    assert_eq!(root_probe.take(), Some(FolderLocation::Root));
    assert_eq!(deleted_probe.take(), None);

    tree.process_signals(&repo).unwrap();
    assert_eq!(top_names(&tree), vec!["A"]);
}

#[test]
fn delete_of_nested_folder_refreshes_only_its_parent() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    tree.process_signals(&repo).unwrap();
    tree.find_node_mut(parent.id)
        .unwrap()
        .toggle(&repo)
        .unwrap();

    let parent_row = FolderRow::new(parent.clone(), channel.clone());
    let child = parent_row.create_subfolder(&repo, "Child").unwrap();
    tree.process_signals(&repo).unwrap();
    assert_eq!(tree.find_node_mut(parent.id).unwrap().children().len(), 1);

    let mut child_row = FolderRow::new(child.clone(), channel.clone());
    child_row.request_delete();
    child_row.confirm_delete(&repo).unwrap();
    tree.process_signals(&repo).unwrap();

    let parent_node = tree.find_node_mut(parent.id).unwrap();
    assert!(parent_node.is_expanded());
    assert!(parent_node.children().is_empty());
    assert_eq!(top_names(&tree), vec!["Parent"]);
}

#[test]
fn duplicate_signal_delivery_is_idempotent() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    tree.process_signals(&repo).unwrap();
    tree.find_node_mut(parent.id)
        .unwrap()
        .toggle(&repo)
        .unwrap();

    let row = FolderRow::new(parent.clone(), channel.clone());
    row.create_subfolder(&repo, "X").unwrap();
    tree.process_signals(&repo).unwrap();

    channel.publish(FolderLocation::Folder(parent.id));
    tree.process_signals(&repo).unwrap();
    channel.publish(FolderLocation::Folder(parent.id));
    tree.process_signals(&repo).unwrap();

    let node = tree.find_node_mut(parent.id).unwrap();
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].folder().name, "X");
}

#[test]
fn toggle_round_trip_restores_the_same_children() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    tree.create_folder(&repo, "Alpha", Some(parent.id)).unwrap();
    tree.create_folder(&repo, "Beta", Some(parent.id)).unwrap();
    tree.process_signals(&repo).unwrap();

    let node = tree.find_node_mut(parent.id).unwrap();
    node.toggle(&repo).unwrap();
    let first_ids: Vec<_> = node.children().iter().map(|child| child.id()).collect();
    assert_eq!(first_ids.len(), 2);

    node.toggle(&repo).unwrap();
    assert!(!node.is_expanded());
    assert!(node.children().is_empty());

    node.toggle(&repo).unwrap();
    let second_ids: Vec<_> = node.children().iter().map(|child| child.id()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn refresh_preserves_an_expanded_child_and_its_loaded_subtree() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    let child = tree.create_folder(&repo, "Child", Some(parent.id)).unwrap();
    tree.create_folder(&repo, "Grandchild", Some(child.id))
        .unwrap();
    tree.process_signals(&repo).unwrap();

    tree.find_node_mut(parent.id)
        .unwrap()
        .toggle(&repo)
        .unwrap();
    tree.find_node_mut(child.id).unwrap().toggle(&repo).unwrap();
    assert_eq!(tree.find_node_mut(child.id).unwrap().children().len(), 1);

    // A refresh of the parent that still includes the child must not reset
    // the child's expand state or discard its loaded subtree.
    let parent_row = FolderRow::new(parent.clone(), channel.clone());
    parent_row.create_subfolder(&repo, "Sibling").unwrap();
    tree.process_signals(&repo).unwrap();

    let parent_node = tree.find_node_mut(parent.id).unwrap();
    assert_eq!(parent_node.children().len(), 2);

    let child_node = tree.find_node_mut(child.id).unwrap();
    assert!(child_node.is_expanded());
    assert_eq!(child_node.children().len(), 1);
    assert_eq!(child_node.children()[0].folder().name, "Grandchild");
}

#[test]
fn rename_with_blank_name_fails_without_touching_storage() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let tree = loaded_tree(&repo, &channel);

    let folder = tree.create_folder(&repo, "A", None).unwrap();
    let mut row = FolderRow::new(folder.clone(), channel.clone());

    let err = row.rename(&repo, "   ").unwrap_err();
    assert!(matches!(err, FolderCommandError::EmptyName));

    let stored = repo.get_folder(folder.id).unwrap().unwrap();
    assert_eq!(stored.name, "A");
}

#[test]
fn rename_updates_storage_and_the_row_snapshot() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let tree = loaded_tree(&repo, &channel);

    let folder = tree.create_folder(&repo, "Old", None).unwrap();
    let mut row = FolderRow::new(folder.clone(), channel.clone());
    row.rename(&repo, "  New  ").unwrap();

    assert_eq!(row.folder().name, "New");
    let stored = repo.get_folder(folder.id).unwrap().unwrap();
    assert_eq!(stored.name, "New");
}

#[test]
fn cancelled_delete_leaves_storage_and_tree_untouched() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let folder = tree.create_folder(&repo, "Keep", None).unwrap();
    tree.process_signals(&repo).unwrap();

    let mut row = FolderRow::new(folder.clone(), channel.clone());
    row.request_delete();
    assert!(row.is_delete_pending());
    row.cancel_delete();
    assert!(!row.is_delete_pending());

    // Confirm without a pending request is a no-op.
    let probe = channel.subscribe(FolderLocation::Root);
    // A new root subscriber replays the retained signal from the earlier
    // create; drain it so only a fresh publish would show up below.
    probe.take();
    row.confirm_delete(&repo).unwrap();
    assert_eq!(probe.take(), None);
    assert!(repo.get_folder(folder.id).unwrap().is_some());

    tree.process_signals(&repo).unwrap();
    assert_eq!(top_names(&tree), vec!["Keep"]);
}

#[test]
fn empty_root_fetch_clears_the_top_level_list() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let mut tree = loaded_tree(&repo, &channel);

    let folder_a = tree.create_folder(&repo, "A", None).unwrap();
    let folder_b = tree.create_folder(&repo, "B", None).unwrap();
    tree.process_signals(&repo).unwrap();
    assert_eq!(tree.top_level().len(), 2);

    for folder in [folder_a, folder_b] {
        let mut row = FolderRow::new(folder, channel.clone());
        row.request_delete();
        row.confirm_delete(&repo).unwrap();
    }
    tree.process_signals(&repo).unwrap();
    assert!(tree.top_level().is_empty());
}

#[test]
fn create_subfolder_with_blank_name_is_rejected() {
    let conn = setup();
    let repo = SqliteFolderRepository::try_new(&conn).unwrap();
    let channel = RefreshChannel::new();
    let tree = loaded_tree(&repo, &channel);

    let parent = tree.create_folder(&repo, "Parent", None).unwrap();
    let row = FolderRow::new(parent.clone(), channel.clone());

    let probe = channel.subscribe(FolderLocation::Folder(parent.id));
    let err = row.create_subfolder(&repo, "").unwrap_err();
    assert!(matches!(err, FolderCommandError::EmptyName));
    assert_eq!(probe.take(), None);
    assert!(repo.fetch_children(parent.id).unwrap().is_empty());
}
