//! Shape probing integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and skip silently when they are absent.

use std::path::Path;

use framegrab::{FramegrabError, MediaSource, probe_metadata, probe_shape};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";
const SAMPLE_AUDIO_ONLY: &str = "tests/fixtures/sample_audio_only.mp4";

#[test]
fn probe_reports_exact_shape() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    // 10 s at 30 fps, 64x48: floor(duration * fps) = 300 frames.
    let shape = probe_shape(&MediaSource::path(SAMPLE_VIDEO), 0).expect("Failed to probe shape");
    assert_eq!(shape.frame_count, 300);
    assert_eq!(shape.height, 48);
    assert_eq!(shape.width, 64);
    assert_eq!(shape.num_bytes(), 300 * 48 * 64 * 3);
}

#[test]
fn probe_is_idempotent() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let first = probe_shape(&source, 0).expect("Failed to probe shape");
    let second = probe_shape(&source, 0).expect("Failed to probe shape again");
    assert_eq!(first, second);
}

#[test]
fn probe_metadata_matches_fixture() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let metadata =
        probe_metadata(&MediaSource::path(SAMPLE_VIDEO), 0).expect("Failed to probe metadata");
    assert_eq!(metadata.shape.width, 64);
    assert_eq!(metadata.shape.height, 48);
    assert!(
        (metadata.frames_per_second - 30.0).abs() < 0.01,
        "Expected ~30 fps, got {}",
        metadata.frames_per_second,
    );
    assert!(
        (metadata.duration.as_secs_f64() - 10.0).abs() < 0.1,
        "Expected ~10 s duration, got {:?}",
        metadata.duration,
    );
    assert_eq!(metadata.codec, "h264");
}

#[test]
fn probe_audio_only_is_an_explicit_error() {
    if !Path::new(SAMPLE_AUDIO_ONLY).exists() {
        return;
    }

    let result = probe_shape(&MediaSource::path(SAMPLE_AUDIO_ONLY), 0);
    assert!(
        matches!(result, Err(FramegrabError::NoVideoStream)),
        "Expected NoVideoStream, got {result:?}",
    );
}

#[test]
fn probe_nonexistent_path_fails() {
    let result = probe_shape(&MediaSource::path("this_file_does_not_exist.mp4"), 0);
    assert!(result.is_err());

    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("Failed to open media source"),
        "Error message should mention the open failure: {message}",
    );
}

#[test]
fn probe_garbage_bytes_fails() {
    let garbage = b"this is not a media file at all, not even close";
    let result = probe_shape(&MediaSource::bytes(garbage), 0);
    assert!(result.is_err(), "Expected error for garbage bytes");
}
