//! Tests for the upload normalizer against real files.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kcore::ContentBlock;
use kelp_upload::UploadManager;

#[test]
fn text_files_become_text_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# notes\nhello").unwrap();

    let block = UploadManager::new().upload(&path).unwrap();
    assert_eq!(
        block,
        ContentBlock::Text {
            text: "# notes\nhello".into()
        }
    );
}

#[test]
fn images_become_base64_image_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    let payload = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    std::fs::write(&path, payload).unwrap();

    let block = UploadManager::new().upload(&path).unwrap();
    match block {
        ContentBlock::Image { source } => {
            assert_eq!(source.kind, "base64");
            assert_eq!(source.media_type, "image/png");
            assert_eq!(source.data, BASE64.encode(payload));
        }
        other => panic!("expected an image block, got {other:?}"),
    }
}

#[test]
fn non_utf8_text_files_fall_back_to_binary_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weights.pkl");
    let payload = [0xffu8, 0xfe, 0x00, 0x01];
    std::fs::write(&path, payload).unwrap();

    let block = UploadManager::new().upload(&path).unwrap();
    match block {
        ContentBlock::Binary { source } => {
            assert_eq!(source.media_type, "application/octet-stream");
            assert_eq!(source.data, BASE64.encode(payload));
        }
        other => panic!("expected a binary block, got {other:?}"),
    }
}

#[test]
fn broken_pdfs_are_passed_through_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    let payload = b"%PDF-1.4 truncated garbage";
    std::fs::write(&path, payload).unwrap();

    let block = UploadManager::new().upload(&path).unwrap();
    match block {
        ContentBlock::Document { source } => {
            assert_eq!(source.media_type, "application/pdf");
            assert_eq!(source.data, BASE64.encode(payload));
        }
        other => panic!("expected a document block, got {other:?}"),
    }
}

#[test]
fn disallowed_extensions_yield_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.mp4");
    std::fs::write(&path, [0u8; 16]).unwrap();

    assert!(UploadManager::new().upload(&path).is_none());
}

#[test]
fn missing_files_yield_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(
        UploadManager::new()
            .upload(&dir.path().join("gone.txt"))
            .is_none()
    );
}
