use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use neoview::Error;
use neoview::media::MediaFormats;
use neoview::scan::Scanner;
use neoview::tree;
use tempfile::tempdir;

fn media_extensions() -> Vec<String> {
    vec![".jpg".into(), ".mp4".into()]
}

/// The fixture from the gallery's reference scenario: `/media/a.jpg`,
/// `/media/sub/b.mp4`, `/media/sub/empty/` and a non-media `doc.txt`.
fn media_fixture(root: &Path) {
    fs::create_dir_all(root.join("sub").join("empty")).unwrap();
    fs::write(root.join("a.jpg"), b"x").unwrap();
    fs::write(root.join("sub").join("b.mp4"), b"x").unwrap();
    fs::write(root.join("doc.txt"), b"x").unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_returns_exactly_the_matching_files() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    media_fixture(&root);

    let scanner = Scanner::new(10);
    let result = scanner.scan(&root, &media_extensions()).await.unwrap();

    // Order is completion order, so assert set-equality only.
    let got: HashSet<PathBuf> = result.files.iter().cloned().collect();
    let want: HashSet<PathBuf> = [root.join("a.jpg"), root.join("sub").join("b.mp4")]
        .into_iter()
        .collect();
    assert_eq!(got, want);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scan_matches_suffixes_case_insensitively() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("UPPER.JPG"), b"x").unwrap();
    fs::write(root.join("mixed.Mp4"), b"x").unwrap();
    fs::write(root.join("plain"), b"x").unwrap();

    let scanner = Scanner::new(10);
    let result = scanner.scan(&root, &media_extensions()).await.unwrap();
    assert_eq!(result.files.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_root_is_a_bad_dir_error() {
    let tmp = tempdir().unwrap();
    let gone = tmp.path().join("nope");

    let scanner = Scanner::new(10);
    assert!(matches!(
        scanner.scan(&gone, &media_extensions()).await,
        Err(Error::BadDir(_))
    ));
    assert!(matches!(
        tree::build(&gone, &MediaFormats::stock()).await,
        Err(Error::BadDir(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tree_counts_and_prunes_like_the_reference_scenario() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    media_fixture(&root);

    let node = tree::build(&root, &MediaFormats::stock()).await.unwrap();
    assert_eq!(node.name, "media");
    assert_eq!(node.image_count, 1);
    assert_eq!(node.video_count, 0);
    assert_eq!(node.total_image_count, 1);
    assert_eq!(node.total_video_count, 1);

    assert_eq!(node.children.len(), 1, "only `sub` survives pruning");
    let sub = &node.children[0];
    assert_eq!(sub.name, "sub");
    assert_eq!(sub.total_image_count, 0);
    assert_eq!(sub.total_video_count, 1);
    assert!(sub.children.is_empty(), "`empty` has zero total and is dropped");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_root_is_still_returned() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("blank");
    fs::create_dir_all(&root).unwrap();

    let node = tree::build(&root, &MediaFormats::stock()).await.unwrap();
    assert_eq!(node.total_media(), 0);
    assert!(node.children.is_empty());
}

fn assert_totals_hold(node: &neoview::tree::FolderNode) {
    let child_images: u64 = node.children.iter().map(|c| c.total_image_count).sum();
    let child_videos: u64 = node.children.iter().map(|c| c.total_video_count).sum();
    assert_eq!(node.total_image_count, node.image_count + child_images);
    assert_eq!(node.total_video_count, node.video_count + child_videos);
    assert!(node.total_image_count >= node.image_count);
    for child in &node.children {
        assert!(child.total_media() > 0, "non-root children are never empty");
        assert_totals_hold(child);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn totals_are_direct_plus_children_at_every_depth() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    fs::create_dir_all(root.join("a").join("deep")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::create_dir_all(root.join("hollow").join("nested")).unwrap();
    fs::write(root.join("top.jpg"), b"x").unwrap();
    fs::write(root.join("a").join("one.png"), b"x").unwrap();
    fs::write(root.join("a").join("deep").join("clip.mkv"), b"x").unwrap();
    fs::write(root.join("b").join("two.gif"), b"x").unwrap();
    fs::write(root.join("b").join("three.webm"), b"x").unwrap();
    fs::write(root.join("hollow").join("notes.txt"), b"x").unwrap();

    let node = tree::build(&root, &MediaFormats::stock()).await.unwrap();
    assert_eq!(node.total_image_count, 3);
    assert_eq!(node.total_video_count, 2);
    assert_eq!(node.children.len(), 2, "`hollow` is pruned");
    assert_totals_hold(&node);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn walk_ignores_files_outside_the_extension_set() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.jpg"), b"x").unwrap();
    fs::write(root.join("b.mp4"), b"x").unwrap();

    let scanner = Scanner::new(10);
    let only_images = scanner.walk(&root, &[".jpg".to_string()]).await;
    assert_eq!(only_images, vec![root.join("a.jpg")]);
}
