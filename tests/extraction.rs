//! Strided extraction integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and skip silently when they are absent. The sample fixture is 10 s at
//! 30 fps, 64x48 — 300 frames, one keyframe every 30.

use std::path::Path;

use framegrab::{ExtractOptions, MediaSource, extract, extract_into, probe_shape};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";
const FRAME_BYTES: usize = 48 * 64 * 3;

#[test]
fn fills_exactly_five_frames() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let mut buffer = vec![0u8; 5 * FRAME_BYTES];
    let written = extract_into(&source, &ExtractOptions::new(), &mut buffer)
        .expect("Failed to extract frames");

    assert_eq!(written, 5 * FRAME_BYTES);

    // The test pattern animates, so temporally distinct frames differ.
    assert_ne!(
        &buffer[..FRAME_BYTES],
        &buffer[4 * FRAME_BYTES..],
        "First and fifth frames should not be identical",
    );
}

#[test]
fn stops_at_the_last_whole_frame() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    // Capacity of 5.5 frames: the sixth frame must be refused, not split.
    let source = MediaSource::path(SAMPLE_VIDEO);
    let mut buffer = vec![0u8; 5 * FRAME_BYTES + FRAME_BYTES / 2];
    let written = extract_into(&source, &ExtractOptions::new(), &mut buffer)
        .expect("Failed to extract frames");

    assert_eq!(written, 5 * FRAME_BYTES);
    assert!(
        buffer[5 * FRAME_BYTES..].iter().all(|&byte| byte == 0),
        "Bytes past the last frame boundary must be untouched",
    );
}

#[test]
fn strided_extraction_spaces_samples() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let options = ExtractOptions::new().with_step(10);
    let mut buffer = vec![0u8; 3 * FRAME_BYTES];
    let written = extract_into(&source, &options, &mut buffer).expect("Failed to extract strided");

    assert_eq!(written, 3 * FRAME_BYTES);

    // Samples ~10 source-frames apart are visibly different in the test
    // pattern; consecutive-frame output would make these near-identical.
    let first = &buffer[..FRAME_BYTES];
    let second = &buffer[FRAME_BYTES..2 * FRAME_BYTES];
    let third = &buffer[2 * FRAME_BYTES..];
    assert_ne!(first, second);
    assert_ne!(second, third);
}

#[test]
fn strided_output_matches_dense_output_at_sample_points() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    // Extract 21 consecutive frames, then every 10th frame; the strided
    // samples must be drawn from the same decoded content (subject to
    // keyframe rounding, exact here because targets land on frame times).
    let source = MediaSource::path(SAMPLE_VIDEO);

    let mut dense = vec![0u8; 21 * FRAME_BYTES];
    let dense_written = extract_into(&source, &ExtractOptions::new(), &mut dense)
        .expect("Failed dense extraction");
    assert_eq!(dense_written, 21 * FRAME_BYTES);

    let mut strided = vec![0u8; 3 * FRAME_BYTES];
    let strided_written =
        extract_into(&source, &ExtractOptions::new().with_step(10), &mut strided)
            .expect("Failed strided extraction");
    assert_eq!(strided_written, 3 * FRAME_BYTES);

    for (sample, dense_index) in [(0usize, 0usize), (1, 10), (2, 20)] {
        assert_eq!(
            &strided[sample * FRAME_BYTES..(sample + 1) * FRAME_BYTES],
            &dense[dense_index * FRAME_BYTES..(dense_index + 1) * FRAME_BYTES],
            "Strided sample {sample} should equal dense frame {dense_index}",
        );
    }
}

#[test]
fn start_frame_offsets_extraction() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);

    let mut dense = vec![0u8; 40 * FRAME_BYTES];
    extract_into(&source, &ExtractOptions::new(), &mut dense).expect("Failed dense extraction");

    let mut offset = vec![0u8; FRAME_BYTES];
    let written = extract_into(
        &source,
        &ExtractOptions::new().with_start_frame(30),
        &mut offset,
    )
    .expect("Failed offset extraction");
    assert_eq!(written, FRAME_BYTES);

    assert_eq!(
        &offset[..],
        &dense[30 * FRAME_BYTES..31 * FRAME_BYTES],
        "start_frame=30 should yield the 31st dense frame",
    );
}

#[test]
fn start_beyond_stream_writes_nothing() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let options = ExtractOptions::new().with_start_frame(10_000);
    let mut buffer = vec![0u8; 2 * FRAME_BYTES];
    let written =
        extract_into(&source, &options, &mut buffer).expect("Out-of-range start should succeed");
    assert_eq!(written, 0);
}

#[test]
fn truncation_is_not_an_error() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    // Ask for more frames than the source has; the call succeeds and
    // reports how much was actually written.
    let source = MediaSource::path(SAMPLE_VIDEO);
    let shape = probe_shape(&source, 0).expect("Failed to probe shape");
    let mut buffer = vec![0u8; (shape.frame_count as usize + 10) * shape.frame_bytes()];
    let written =
        extract_into(&source, &ExtractOptions::new(), &mut buffer).expect("Failed to extract");

    assert!(written % shape.frame_bytes() == 0);
    assert!(written <= shape.num_bytes());
    // The decoder's reorder delay may hold back a few tail frames at EOF.
    assert!(
        written >= (shape.frame_count as usize - 8) * shape.frame_bytes(),
        "Expected roughly all {} frames, got {}",
        shape.frame_count,
        written / shape.frame_bytes(),
    );
}

#[test]
fn extract_convenience_sizes_and_truncates() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let frames = extract(&source, &ExtractOptions::new(), Some(4)).expect("Failed to extract");
    assert_eq!(frames.len(), 4 * FRAME_BYTES);

    // Buffer-filling and allocating forms agree.
    let mut manual = vec![0u8; 4 * FRAME_BYTES];
    let written = extract_into(&source, &ExtractOptions::new(), &mut manual)
        .expect("Failed manual extraction");
    assert_eq!(written, frames.len());
    assert_eq!(manual, frames);
}

#[test]
fn repeated_extraction_is_identical() {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    let source = MediaSource::path(SAMPLE_VIDEO);
    let options = ExtractOptions::new().with_start_frame(60).with_step(5);
    let first = extract(&source, &options, Some(6)).expect("Failed first extraction");
    let second = extract(&source, &options, Some(6)).expect("Failed second extraction");
    assert_eq!(first, second);
}
