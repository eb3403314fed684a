//! Line-aligned chunking of a gzip file.
//!
//! Reads a (possibly gzip-compressed) file in record-aligned chunks and
//! prints per-chunk record counts. Without an argument a small sample file
//! is generated first.
//!
//! Run with:
//!     RUST_LOG=debug cargo run --example gz_lines -- [path]

use std::io::Write;
use std::path::PathBuf;

use flate2::Compression as Level;
use flate2::write::GzEncoder;
use gzchunk::Chunker;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Keep the sample file alive until reading is done
    let mut sample = None;
    let path: PathBuf = match std::env::args().nth(1) {
        Some(path) => path.into(),
        None => {
            let mut encoder = GzEncoder::new(Vec::new(), Level::default());
            for i in 0..200_000 {
                writeln!(encoder, "{},user_{},{}", i, i % 977, i * 3)?;
            }
            let mut file = tempfile::NamedTempFile::new()?;
            file.write_all(&encoder.finish()?)?;
            let path = file.path().to_path_buf();
            sample = Some(file);
            path
        }
    };

    let mut chunker = Chunker::new()
        .with_buffer_size(1_000_000)
        .with_delimiter("\n")?
        .with_local_file(&path)?;

    println!("{}\n", chunker);

    let mut records = 0;
    for chunk in chunker.chunks()? {
        let chunk = chunk?;
        let count = chunk.record_count(b'\n');
        records += count;
        println!("{}: {} records", chunk, count);
    }

    println!("\n{}", chunker.status());
    println!("Total records: {}", records);
    println!("Total bytes: {}", chunker.bytes_decompressed());

    drop(sample);
    Ok(())
}
