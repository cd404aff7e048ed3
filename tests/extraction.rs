//! Extraction pipeline tests against the stub decoder.

mod common;

use std::io::Write;
use std::sync::atomic::Ordering;

use common::StubDecoder;
use thumbframe::{ThumbframeError, ThumbnailRequest, ThumbnailService};

/// A real (non-video) file on disk, enough to pass the advisory existence
/// check; the stub decoder never reads it.
fn scratch_video() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(b"not really a video").unwrap();
    file
}

fn path_of(file: &tempfile::NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

// ── Success path ───────────────────────────────────────────────────

#[test]
fn buffer_length_is_width_height_times_four() {
    let file = scratch_video();
    let service = ThumbnailService::new(StubDecoder::succeeding());

    let buffer = service
        .extract(
            &ThumbnailRequest::new(path_of(&file))
                .with_width(320)
                .with_height(180),
        )
        .expect("Extraction should succeed");

    assert_eq!(buffer.len(), 320 * 180 * 4);
}

#[test]
fn default_dimensions_yield_default_buffer() {
    let file = scratch_video();
    let service = ThumbnailService::new(StubDecoder::succeeding());

    let buffer = service
        .extract(&ThumbnailRequest::new(path_of(&file)))
        .expect("Extraction should succeed");

    assert_eq!(buffer.len(), 720 * 405 * 4);
}

#[test]
fn source_sized_request_skips_resize_and_keeps_pixels() {
    let file = scratch_video();
    let service = ThumbnailService::new(StubDecoder::succeeding());

    // Stub frames are 64x48 solid (40, 80, 120, 255).
    let buffer = service
        .extract(
            &ThumbnailRequest::new(path_of(&file))
                .with_width(64)
                .with_height(48),
        )
        .expect("Extraction should succeed");

    assert_eq!(buffer.len(), 64 * 48 * 4);
    assert_eq!(&buffer[0..4], &[40, 80, 120, 255]);
    assert_eq!(&buffer[buffer.len() - 4..], &[40, 80, 120, 255]);
}

// ── Failure taxonomy ───────────────────────────────────────────────

#[test]
fn empty_path_fails_before_any_decoder_call() {
    let decoder = StubDecoder::succeeding();
    let probe_calls = decoder.probe_calls.clone();
    let decode_calls = decoder.decode_calls.clone();
    let service = ThumbnailService::new(decoder);

    let error = service
        .extract(&ThumbnailRequest::new(""))
        .expect_err("Empty path must fail");

    assert!(matches!(error, ThumbframeError::BadArguments(_)));
    assert_eq!(error.code(), "BAD_ARGS");
    assert_eq!(probe_calls.load(Ordering::SeqCst), 0);
    assert_eq!(decode_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_file_is_file_not_found() {
    let service = ThumbnailService::new(StubDecoder::succeeding());

    let error = service
        .extract(&ThumbnailRequest::new("/definitely/not/here.mp4"))
        .expect_err("Missing file must fail");

    assert!(matches!(error, ThumbframeError::FileNotFound { .. }));
    assert_eq!(error.code(), "FILE_NOT_FOUND");
}

#[test]
fn decoder_failure_is_extraction_failed() {
    let file = scratch_video();
    let service = ThumbnailService::new(StubDecoder::failing());

    let error = service
        .extract(&ThumbnailRequest::new(path_of(&file)))
        .expect_err("Failing decoder must fail");

    assert!(matches!(error, ThumbframeError::ExtractionFailed(_)));
    assert_eq!(error.code(), "EXTRACTION_FAILED");
}

#[test]
fn decoder_panic_is_caught_as_extraction_error() {
    let file = scratch_video();
    let service = ThumbnailService::new(StubDecoder::panicking());

    let error = service
        .extract(&ThumbnailRequest::new(path_of(&file)))
        .expect_err("Panicking decoder must surface an error, not a panic");

    assert!(matches!(error, ThumbframeError::ExtractionError(_)));
    assert_eq!(error.code(), "EXTRACTION_ERROR");
}

// ── Duration / metadata passthrough ────────────────────────────────

#[test]
fn duration_passes_through_probe() {
    let service = ThumbnailService::new(StubDecoder::succeeding());
    let duration_ms = service.duration("whatever.mp4").unwrap();
    assert_eq!(duration_ms, 2000);
}

#[test]
fn duration_empty_path_is_bad_arguments() {
    let service = ThumbnailService::new(StubDecoder::succeeding());
    let error = service.duration("").unwrap_err();
    assert!(matches!(error, ThumbframeError::BadArguments(_)));
}

#[test]
fn duration_probe_failure_is_duration_failed() {
    let service = ThumbnailService::new(StubDecoder::failing());
    let error = service.duration("whatever.mp4").unwrap_err();
    assert!(matches!(error, ThumbframeError::DurationFailed(_)));
    assert_eq!(error.code(), "DURATION_FAILED");
}

#[test]
fn metadata_passes_through_probe() {
    let service = ThumbnailService::new(StubDecoder::succeeding());
    let metadata = service.metadata("whatever.mp4").unwrap();
    assert_eq!(metadata.width, 64);
    assert_eq!(metadata.height, 48);
    assert_eq!(metadata.codec, "h264");
    assert_eq!(metadata.duration_ms(), 2000);
}

#[test]
fn metadata_probe_failure_is_metadata_failed() {
    let service = ThumbnailService::new(StubDecoder::failing());
    let error = service.metadata("whatever.mp4").unwrap_err();
    assert!(matches!(error, ThumbframeError::MetadataFailed(_)));
    assert_eq!(error.code(), "METADATA_FAILED");
}

// ── Async wrapper ──────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn extract_async_matches_blocking_result() {
        let file = scratch_video();
        let service = Arc::new(ThumbnailService::new(StubDecoder::succeeding()));

        let buffer = service
            .clone()
            .extract_async(
                ThumbnailRequest::new(path_of(&file))
                    .with_width(160)
                    .with_height(90),
            )
            .await
            .expect("Async extraction should succeed");

        assert_eq!(buffer.len(), 160 * 90 * 4);
    }
}
