//! Demux and extract from an in-memory byte buffer.
//!
//! Useful when the media bytes come from object storage or a network fetch
//! and never touch the local filesystem.
//!
//! Usage: cargo run --example memory_buffer -- <input>

use framegrab::{ExtractOptions, MediaSource, extract_into, probe_shape};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/sample_video.mp4".to_string());

    // Stand-in for bytes fetched from anywhere.
    let blob = std::fs::read(&input)?;
    let source = MediaSource::bytes(&blob);

    let shape = probe_shape(&source, 0)?;
    let mut buffer = vec![0u8; 5 * shape.frame_bytes()];
    let written = extract_into(&source, &ExtractOptions::new(), &mut buffer)?;

    println!(
        "decoded {} frames ({written} bytes) of {}x{} from a {}-byte buffer",
        written / shape.frame_bytes(),
        shape.width,
        shape.height,
        blob.len(),
    );
    Ok(())
}
