#![no_main]

use std::io::{Cursor, Write};

use flate2::Compression as Level;
use flate2::write::GzEncoder;
use gzchunk::{ChunkError, ChunkReader, Compression, ReadSource};
use libfuzzer_sys::fuzz_target;

fn read_all(input: Vec<u8>, compression: Compression, capacity: usize) -> Result<Vec<u8>, ChunkError> {
    let source = ReadSource::new(Cursor::new(input));
    let mut reader = ChunkReader::new(source, compression, capacity, b'\n')?;
    let mut out = Vec::new();

    while !reader.is_finished() {
        let chunk = reader.read_chunk()?;
        assert!(chunk.len() <= capacity);
        // Only the final chunk may lack the delimiter
        if !reader.is_finished() {
            assert_eq!(chunk.last(), Some(&b'\n'));
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

/// True if some record, delimiter included, cannot fit in `capacity`.
fn has_oversized_record(data: &[u8], capacity: usize) -> bool {
    data.split_inclusive(|&b| b == b'\n').any(|record| record.len() > capacity)
}

fuzz_target!(|data: Vec<u8>| {
    let capacity = 1 + data.first().copied().unwrap_or(0) as usize;
    let oversized = has_oversized_record(&data, capacity);

    // Arbitrary bytes as gzip: must never panic
    let _ = read_all(data.clone(), Compression::Gzip, capacity);

    // Plain input: fails exactly when a record is longer than the buffer
    match read_all(data.clone(), Compression::Unknown, capacity) {
        Ok(out) => {
            assert!(!oversized);
            assert_eq!(out, data);
        }
        Err(e) => assert!(oversized && matches!(e, ChunkError::RecordTooLarge { .. })),
    }

    // Valid gzip: same result as plain input
    let mut encoder = GzEncoder::new(Vec::new(), Level::fast());
    encoder.write_all(&data).unwrap();
    let gz = encoder.finish().unwrap();
    match read_all(gz, Compression::Gzip, capacity) {
        Ok(out) => {
            assert!(!oversized);
            assert_eq!(out, data);
        }
        Err(e) => assert!(oversized && matches!(e, ChunkError::RecordTooLarge { .. })),
    }
});
