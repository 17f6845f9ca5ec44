//! Probe a video's expected extraction shape without decoding.
//!
//! Usage: cargo run --example probe_shape -- <input>

use framegrab::{MediaSource, probe_metadata};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/sample_video.mp4".to_string());

    let metadata = probe_metadata(&MediaSource::path(&input), 0)?;
    let shape = metadata.shape;

    println!("{input}");
    println!(
        "  {} frames x {} x {} ({} bytes of RGB24)",
        shape.frame_count,
        shape.height,
        shape.width,
        shape.num_bytes(),
    );
    println!(
        "  {} @ {:.3} fps, {:.3} s",
        metadata.codec,
        metadata.frames_per_second,
        metadata.duration.as_secs_f64(),
    );
    Ok(())
}
