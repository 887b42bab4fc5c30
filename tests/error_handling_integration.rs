use std::sync::Arc;

use playtei::reader::{AsyncFileReader, ReaderConfig};
use playtei::sources::SourceTable;
use playtei::{discovery, process_files_parallel, RunOptions};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::fixtures::DEPIT_AMOUREUX;
use test_utils::{assert_well_formed, TestFixture};

fn options(fixture: &TestFixture) -> RunOptions {
    RunOptions {
        out_dir: fixture.out_dir(),
        jobs: 1,
        change_date: "2024-03-01".to_string(),
        ..Default::default()
    }
}

/// A page that is not UTF-8 is reported as failed and the run continues
#[tokio::test]
async fn test_invalid_utf8_page_fails_alone() {
    let fixture = TestFixture::new();
    let invalid_path = fixture.root_path.join("invalide.html");
    std::fs::write(&invalid_path, [0x3C, 0x70, 0x3E, 0xFF, 0xFE, 0xFD]).expect("Failed to write invalid UTF-8 file");
    let valid_path = fixture.create_play_file("depit-amoureux.html", DEPIT_AMOUREUX);

    let files = discovery::find_play_files(&fixture.root_path, false)
        .await
        .expect("Discovery should succeed");
    assert_eq!(files.len(), 2);

    let stats = process_files_parallel(&files, Arc::new(SourceTable::default()), options(&fixture))
        .await
        .expect("Run should succeed without fail-fast");

    assert_eq!(stats.summary.files_failed, 1);
    assert_eq!(stats.summary.files_converted, 1);
    assert!(fixture.read_output(&valid_path, "xml").is_ok());
    assert!(fixture.read_output(&invalid_path, "xml").is_err());
}

/// Reader errors come back in the stats unless fail-fast is set
#[tokio::test]
async fn test_reader_error_modes() {
    let fixture = TestFixture::new();
    let missing = fixture.root_path.join("absente.html");

    let lenient = AsyncFileReader::new(ReaderConfig::default());
    let (lines, stats) = lenient
        .read_file_lines(&missing)
        .await
        .expect("Lenient reader should not error");
    assert!(lines.is_empty());
    assert!(stats.read_error.is_some());

    let strict = AsyncFileReader::new(ReaderConfig {
        fail_fast: true,
        ..Default::default()
    });
    assert!(strict.read_file_lines(&missing).await.is_err());
}

/// An empty page still yields a complete, well-formed TEI file
#[tokio::test]
async fn test_empty_page_converts() {
    let fixture = TestFixture::new();
    let empty = fixture.create_play_file("vide.html", "");

    let stats = process_files_parallel(
        &[empty.clone()],
        Arc::new(SourceTable::default()),
        RunOptions {
            use_mmap: true,
            ..options(&fixture)
        },
    )
    .await
    .expect("Run should succeed");

    assert_eq!(stats.summary.files_converted, 1);
    assert_eq!(stats.summary.plays_without_acts, 1);
    assert_eq!(stats.summary.plays_without_cast, 1);
    let xml = fixture.read_output(&empty, "xml").expect("TEI output should exist");
    assert_well_formed(&xml, "empty page");
    assert!(xml.contains("<trailer>FIN</trailer>"));
}

/// Directories named like pages are not treated as plays
#[tokio::test]
async fn test_directory_with_page_extension_is_excluded() {
    let fixture = TestFixture::new();
    std::fs::create_dir_all(fixture.root_path.join("dossier.html")).expect("Failed to create directory");
    fixture.create_play_file("depit-amoureux.html", DEPIT_AMOUREUX);

    let files = discovery::find_play_files(&fixture.root_path, false)
        .await
        .expect("Discovery should succeed");
    assert_eq!(files.len(), 1);
}

/// Recursive discovery reaches pages in subdirectories
#[tokio::test]
async fn test_recursive_discovery() {
    let fixture = TestFixture::new();
    fixture.create_play_file("moliere/depit-amoureux.html", DEPIT_AMOUREUX);

    let flat = discovery::find_play_files(&fixture.root_path, false)
        .await
        .expect("Discovery should succeed");
    assert!(flat.is_empty());

    let nested = discovery::find_play_files(&fixture.root_path, true)
        .await
        .expect("Discovery should succeed");
    assert_eq!(nested.len(), 1);
}
