//! End-to-end checks of the organization engine against real temporary
//! directory trees.

use file_toolbox::organizer::{
    batch_rename, directory_statistics, find_duplicates, organize_by_type, Category,
    EngineOptions, OrganizeError, RenameRequest, CATEGORY_TABLE,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn names_in(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

// ── find_duplicates ──────────────────────────────────────────────────────────

#[test]
fn identical_content_is_grouped_across_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("a.txt"), b"X");
    write(&root.join("b.txt"), b"X");
    write(&root.join("c.txt"), b"Y");
    write(&root.join("deep/nested/copy.bin"), b"X");
    write(&root.join("other/twin1"), b"same bytes");
    write(&root.join("twin2"), b"same bytes");

    let report = find_duplicates(root, 0, &EngineOptions::default()).unwrap();

    assert_eq!(report.files_scanned, 6);
    assert_eq!(report.groups.len(), 2);
    assert!(report.groups.iter().all(|g| g.files.len() >= 2));

    let x_group = report.groups.iter().find(|g| g.size == 1).unwrap();
    let names: BTreeSet<String> = x_group.files.iter().map(|f| f.file_name()).collect();
    assert_eq!(
        names,
        ["a.txt", "b.txt", "copy.bin"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    );
    assert!(report
        .groups
        .iter()
        .all(|g| g.files.iter().all(|f| f.file_name() != "c.txt")));
}

#[test]
fn min_size_excludes_small_files_everywhere() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("small1"), b"ab");
    write(&root.join("small2"), b"ab");
    write(&root.join("big1"), &[7u8; 64]);
    write(&root.join("big2"), &[7u8; 64]);

    let report = find_duplicates(root, 10, &EngineOptions::default()).unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.groups.len(), 1);
    assert!(report.groups[0].files.iter().all(|f| f.size >= 10));
    assert_eq!(report.wasted_bytes(), 64);
}

#[test]
fn missing_root_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");
    let err = find_duplicates(&missing, 0, &EngineOptions::default()).unwrap_err();
    assert!(matches!(err, OrganizeError::NotFound(_)));
}

// ── organize_by_type ─────────────────────────────────────────────────────────

#[test]
fn photo_and_notes_land_in_their_categories() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    write(&source.path().join("photo.png"), b"png");
    write(&source.path().join("notes.txt"), b"txt");

    let report = organize_by_type(
        source.path(),
        target.path(),
        &CATEGORY_TABLE,
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.placed.len(), 2);
    assert_eq!(report.placed.get(&Category::Images), Some(&1));
    assert_eq!(report.placed.get(&Category::Documents), Some(&1));
    assert!(target.path().join("Images/photo.png").is_file());
    assert!(target.path().join("Documents/notes.txt").is_file());
    // Originals stay put.
    assert!(source.path().join("photo.png").is_file());
}

#[test]
fn same_name_files_all_survive() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    for i in 0..4 {
        write(
            &source.path().join(format!("dir{}/scan.jpg", i)),
            format!("image {}", i).as_bytes(),
        );
    }
    write(&target.path().join("Images/scan.jpg"), b"already here");

    let report = organize_by_type(
        source.path(),
        target.path(),
        &CATEGORY_TABLE,
        &EngineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.placed.get(&Category::Images), Some(&4));
    let names = names_in(&target.path().join("Images"));
    assert_eq!(names.len(), 5);
    assert_eq!(
        fs::read(target.path().join("Images/scan.jpg")).unwrap(),
        b"already here"
    );

    let mut copied: Vec<Vec<u8>> = report
        .placements
        .iter()
        .map(|p| fs::read(&p.destination).unwrap())
        .collect();
    copied.sort();
    copied.dedup();
    assert_eq!(copied.len(), 4);
}

#[test]
fn organize_into_existing_file_is_rejected() {
    let source = TempDir::new().unwrap();
    write(&source.path().join("a.txt"), b"a");
    let blocker = source.path().join("blocker");
    write(&blocker, b"file");

    let err = organize_by_type(
        source.path(),
        &blocker,
        &CATEGORY_TABLE,
        &EngineOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, OrganizeError::NotADirectory(_)));
}

// ── batch_rename ─────────────────────────────────────────────────────────────

#[test]
fn report_draft_becomes_report_final() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir.path().join("report_draft.txt"), b"draft");

    let request = RenameRequest::new("draft", "final");
    let report = batch_rename(temp_dir.path(), &request, &EngineOptions::default()).unwrap();

    let pairs: Vec<(&str, &str)> = report
        .operations
        .iter()
        .map(|op| (op.old_name.as_str(), op.new_name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("report_draft.txt", "report_final.txt")]);
    assert_eq!(
        names_in(temp_dir.path()),
        ["report_final.txt".to_string()].into_iter().collect()
    );
}

#[test]
fn no_match_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir.path().join("a.txt"), b"a");
    write(&temp_dir.path().join("b.md"), b"b");
    let before = names_in(temp_dir.path());

    let request = RenameRequest::new("zzz", "yyy");
    let report = batch_rename(temp_dir.path(), &request, &EngineOptions::default()).unwrap();

    assert!(report.operations.is_empty());
    assert_eq!(names_in(temp_dir.path()), before);
}

#[test]
fn rename_collision_leaves_both_files() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir.path().join("v1.txt"), b"old");
    write(&temp_dir.path().join("v2.txt"), b"new");

    let request = RenameRequest::new("v1", "v2");
    let report = batch_rename(temp_dir.path(), &request, &EngineOptions::default()).unwrap();

    assert!(report.operations.is_empty());
    assert_eq!(report.collisions, 1);
    assert_eq!(fs::read(temp_dir.path().join("v1.txt")).unwrap(), b"old");
    assert_eq!(fs::read(temp_dir.path().join("v2.txt")).unwrap(), b"new");
}

// ── directory_statistics ─────────────────────────────────────────────────────

#[test]
fn empty_directory_has_no_extremes() {
    let temp_dir = TempDir::new().unwrap();
    let stats = directory_statistics(temp_dir.path(), &EngineOptions::default()).unwrap();

    assert_eq!(stats.total_files, 0);
    assert_eq!(stats.total_dirs, 0);
    assert_eq!(stats.total_size, 0);
    assert!(stats.extensions.is_empty());
    assert!(stats.largest.is_none());
    assert!(stats.oldest.is_none());
    assert!(stats.newest.is_none());
}

#[test]
fn histogram_sums_to_total_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("a.txt"), b"1");
    write(&root.join("b.TXT"), b"22");
    write(&root.join("Makefile"), b"333");
    write(&root.join("src/lib.rs"), b"4444");
    write(&root.join("src/deep/mod.rs"), b"55555");
    fs::create_dir_all(root.join("empty")).unwrap();

    let stats = directory_statistics(root, &EngineOptions::default()).unwrap();

    assert_eq!(stats.total_files, 5);
    assert_eq!(stats.total_dirs, 3);
    assert_eq!(stats.total_size, 15);
    assert_eq!(stats.extensions.values().sum::<u64>(), stats.total_files);
    assert_eq!(stats.extensions.get(".txt"), Some(&2));
    assert_eq!(stats.extensions.get(".rs"), Some(&2));
    assert_eq!(stats.extensions.get("No extension"), Some(&1));
    assert_eq!(stats.largest.as_ref().map(|r| r.size), Some(5));
}
