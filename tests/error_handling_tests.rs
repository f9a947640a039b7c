use safelist_scanner::{scan, ScanArgs, ScannerError};
use std::fs;
use tempfile::tempdir;

fn scan_args(roots: Vec<String>, output: std::path::PathBuf) -> ScanArgs {
    ScanArgs {
        roots,
        output: Some(output),
        report: None,
        config: None,
        exclude: vec![],
        verbose: false,
        jobs: None,
        dry_run: false,
        allow_symlinks: false,
        max_file_size: None,
    }
}

#[tokio::test]
async fn test_missing_root_is_tolerated() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("real");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.html"), r#"<div class="kept">"#).unwrap();

    let missing = temp_dir.path().join("does-not-exist");
    let output = temp_dir.path().join("out.txt");

    let summary = scan(scan_args(
        vec![
            src.to_str().unwrap().to_string(),
            missing.to_str().unwrap().to_string(),
        ],
        output,
    ))
    .await
    .unwrap();

    let expected: std::collections::BTreeSet<String> =
        ["kept".to_string()].into_iter().collect();
    assert_eq!(summary.classes, expected);
}

#[tokio::test]
async fn test_no_roots_is_invalid_input() {
    let temp_dir = tempdir().unwrap();
    let result = scan(scan_args(vec![], temp_dir.path().join("out.txt"))).await;

    assert!(matches!(result, Err(ScannerError::InvalidInput(_))));
}

#[tokio::test]
async fn test_zero_jobs_is_invalid_input() {
    let temp_dir = tempdir().unwrap();
    let mut args = scan_args(vec![".".to_string()], temp_dir.path().join("out.txt"));
    args.jobs = Some(0);

    let result = scan(args).await;
    assert!(matches!(result, Err(ScannerError::InvalidInput(_))));
}

#[tokio::test]
async fn test_non_matching_content_contributes_nothing() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("style.css"), "body { color: red; }").unwrap();

    let output = temp_dir.path().join("out.txt");
    let summary = scan(scan_args(
        vec![src.to_str().unwrap().to_string()],
        output.clone(),
    ))
    .await
    .unwrap();

    assert!(summary.classes.is_empty());
    assert_eq!(summary.total_files_scanned, 1);
    // The artifact is still overwritten, now empty
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_unwritable_output_is_a_fatal_output_error() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.html"), r#"<div class="x">"#).unwrap();

    // A path component that is a regular file makes the write fail
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let output = blocker.join("out.txt");

    let result = scan(scan_args(vec![src.to_str().unwrap().to_string()], output)).await;
    assert!(matches!(result, Err(ScannerError::OutputError { .. })));
}

#[tokio::test]
async fn test_oversized_file_is_skipped_not_fatal() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    fs::write(src.join("small.html"), r#"<div class="kept">"#).unwrap();
    let mut big = vec![b' '; 1024 * 1024 + 1];
    big.extend_from_slice(br#"<div class="dropped">"#);
    fs::write(src.join("big.html"), big).unwrap();

    let output = temp_dir.path().join("out.txt");
    let mut args = scan_args(vec![src.to_str().unwrap().to_string()], output);
    args.max_file_size = Some(1);

    let summary = scan(args).await.unwrap();
    assert!(summary.classes.contains("kept"));
    assert!(!summary.classes.contains("dropped"));
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].reason.contains("maximum size"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinks_are_skipped_by_default() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    let target = temp_dir.path().join("outside.html");
    fs::write(&target, r#"<div class="linked">"#).unwrap();
    std::os::unix::fs::symlink(&target, src.join("link.html")).unwrap();

    let output = temp_dir.path().join("out.txt");
    let summary = scan(scan_args(vec![src.to_str().unwrap().to_string()], output))
        .await
        .unwrap();

    assert!(!summary.classes.contains("linked"));
    assert_eq!(summary.skipped.len(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinks_are_followed_when_allowed() {
    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    let target = temp_dir.path().join("outside.html");
    fs::write(&target, r#"<div class="linked">"#).unwrap();
    std::os::unix::fs::symlink(&target, src.join("link.html")).unwrap();

    let output = temp_dir.path().join("out.txt");
    let mut args = scan_args(vec![src.to_str().unwrap().to_string()], output);
    args.allow_symlinks = true;

    let summary = scan(args).await.unwrap();
    assert!(summary.classes.contains("linked"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempdir().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();

    fs::write(src.join("a.html"), r#"<div class="kept">"#).unwrap();
    let locked = src.join("locked.html");
    fs::write(&locked, r#"<div class="hidden">"#).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read 0o000 files; nothing to assert there
    if fs::read(&locked).is_ok() {
        return;
    }

    let output = temp_dir.path().join("out.txt");
    let summary = scan(scan_args(vec![src.to_str().unwrap().to_string()], output))
        .await
        .unwrap();

    // Restore permissions so the tempdir can be cleaned up
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(summary.classes.contains("kept"));
    assert!(!summary.classes.contains("hidden"));
    assert_eq!(summary.skipped.len(), 1);
}
