//! Extract every 30th frame and save the samples as PNGs.
//!
//! Usage: cargo run --example extract_frames -- <input> [output_dir]

use framegrab::{ExtractOptions, MediaSource, extract, frame_to_image, probe_shape};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .unwrap_or_else(|| "tests/fixtures/sample_video.mp4".to_string());
    let output_dir = args.next().unwrap_or_else(|| "frames".to_string());

    let source = MediaSource::path(&input);
    let shape = probe_shape(&source, 0)?;
    println!(
        "{input}: {} frames of {}x{}",
        shape.frame_count, shape.width, shape.height,
    );

    let options = ExtractOptions::new().with_step(30);
    let frames = extract(&source, &options, Some(10))?;

    std::fs::create_dir_all(&output_dir)?;
    for (index, frame) in frames.chunks_exact(shape.frame_bytes()).enumerate() {
        let image = frame_to_image(frame, shape.width, shape.height)?;
        let path = format!("{output_dir}/sample_{index:03}.png");
        image.save(&path)?;
        println!("  wrote {path}");
    }
    Ok(())
}
