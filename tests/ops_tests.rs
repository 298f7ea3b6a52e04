use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use neoview::MediaLibrary;
use neoview::ops::FlipAxis;
use tempfile::tempdir;

fn library_in(dir: &Path) -> MediaLibrary {
    MediaLibrary::open(&dir.join("settings.json")).unwrap()
}

/// Write a 4x2 PNG whose top-left pixel is uniquely red, so rotations and
/// flips are observable.
fn write_marker_png(path: &Path) {
    let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 255]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    DynamicImage::ImageRgb8(img).save(path).unwrap();
}

fn pixel_at(path: &Path, x: u32, y: u32) -> Rgb<u8> {
    let img = image::open(path).unwrap().to_rgb8();
    *img.get_pixel(x, y)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rotate_quarter_turn_swaps_dimensions() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("pic.png");
    write_marker_png(&file);
    let library = library_in(tmp.path());

    library.rotate_image(&file, 90).await.unwrap();

    let rotated = image::open(&file).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (2, 4));
    // 90° clockwise moves the top-left marker to the top-right corner.
    assert_eq!(pixel_at(&file, 1, 0), Rgb([255, 0, 0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn negative_angles_are_normalized() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("pic.png");
    write_marker_png(&file);
    let library = library_in(tmp.path());

    // -90 == 270 clockwise: the marker lands bottom-left.
    library.rotate_image(&file, -90).await.unwrap();
    let rotated = image::open(&file).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (2, 4));
    assert_eq!(pixel_at(&file, 0, 3), Rgb([255, 0, 0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_quarter_angles_are_rejected_and_leave_the_file_alone() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("pic.png");
    write_marker_png(&file);
    let before = fs::read(&file).unwrap();
    let library = library_in(tmp.path());

    assert!(library.rotate_image(&file, 45).await.is_err());
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn flip_mirrors_across_the_requested_axis() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("pic.png");
    write_marker_png(&file);
    let library = library_in(tmp.path());

    library.flip_image(&file, FlipAxis::Horizontal).await.unwrap();
    assert_eq!(pixel_at(&file, 3, 0), Rgb([255, 0, 0]));

    library.flip_image(&file, FlipAxis::Vertical).await.unwrap();
    assert_eq!(pixel_at(&file, 3, 1), Rgb([255, 0, 0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rename_and_move_relocate_the_file() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    let elsewhere = tmp.path().join("elsewhere");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&elsewhere).unwrap();
    fs::write(root.join("old.jpg"), b"x").unwrap();
    let library = library_in(tmp.path());

    library
        .rename_file(&root.join("old.jpg"), &root.join("new.jpg"))
        .await
        .unwrap();
    assert!(root.join("new.jpg").exists());
    assert!(!root.join("old.jpg").exists());

    let landed = library
        .move_file(&root.join("new.jpg"), &elsewhere)
        .await
        .unwrap();
    assert_eq!(landed, elsewhere.join("new.jpg"));
    assert!(landed.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_failures_do_not_abort_the_rest() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.jpg"), b"x").unwrap();
    fs::write(root.join("b.jpg"), b"x").unwrap();
    let library = library_in(tmp.path());

    let files: Vec<PathBuf> = vec![
        root.join("a.jpg"),
        root.join("ghost.jpg"), // never existed
        root.join("b.jpg"),
    ];
    let outcomes = library.batch_delete(&files).await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_err());
    assert!(outcomes[2].result.is_ok());
    assert!(!root.join("a.jpg").exists());
    assert!(!root.join("b.jpg").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_move_relocates_every_movable_file() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("media");
    let target = tmp.path().join("sorted");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&target).unwrap();
    fs::write(root.join("a.jpg"), b"x").unwrap();
    fs::write(root.join("b.jpg"), b"x").unwrap();
    let library = library_in(tmp.path());

    let files = vec![root.join("a.jpg"), root.join("b.jpg")];
    let outcomes = library.batch_move(&files, &target).await;
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
    assert!(target.join("a.jpg").exists());
    assert!(target.join("b.jpg").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn thumbnails_are_cached_until_the_source_mutates() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("pic.png");
    write_marker_png(&file);
    let library = library_in(tmp.path());

    let first = library.thumbnail(&file, 8).await.unwrap();
    let second = library.thumbnail(&file, 8).await.unwrap();
    // same Arc back, not a re-render
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    library.rotate_image(&file, 180).await.unwrap();
    let third = library.thumbnail(&file, 8).await.unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn thumbnail_of_a_non_image_fails_cleanly() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("fake.jpg");
    fs::write(&file, b"not an image at all").unwrap();
    let library = library_in(tmp.path());

    assert!(library.thumbnail(&file, 32).await.is_err());
}
