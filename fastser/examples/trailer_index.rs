//! Writes a file of records followed by a label index and a suffix label,
//! then reads it back through a buffered reader and pinned reader clones.
//!
//! Run with: `RUST_LOG=fastser_core=debug cargo run --example trailer_index`

use fastser::prelude::*;
use std::thread;

const RECORDS: i32 = 10_000;

fn write_stream(path: &std::path::Path) -> Result<u64> {
    let mut writer = BufferedStreamWriter::create(path)?;
    let mut index = Vec::with_capacity(RECORDS as usize);

    for id in 0..RECORDS {
        index.push(writer.get_label()?);
        writer.write_i32(id)?;
        writer.write_i64(i64::from(id) * 1_000_003)?;
        let name = (id % 7 != 0).then(|| format!("record-{id}"));
        writer.write_string(name.as_deref())?;
    }

    let index_label = writer.get_label()?;
    writer.write_i32(RECORDS)?;
    for label in &index {
        writer.write_label(*label)?;
    }
    writer.write_suffix_label(index_label)?;

    let length = writer.length();
    writer.into_inner()?.sync_all()?;
    Ok(length)
}

fn record_label(reader: &mut PinnedBufferReader<std::fs::File>, id: i32) -> Result<Label> {
    reader.goto_suffix_label()?;
    let index = reader.current();
    let entry = Label::ENCODED_LENGTH as u32 * (id as u32 + 1);
    reader.goto(Label::new(index.offset() + entry))?;
    reader.read_label()
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("records.bin");

    let length = write_stream(&path)?;
    println!("[Writer] {} records, {} bytes", RECORDS, length);

    // Sequential scan through the index.
    let mut reader = BufferedStreamReader::open(&path)?;
    reader.goto_suffix_label()?;
    let count = reader.read_i32()?;
    let mut labels = Vec::with_capacity(count as usize);
    for _ in 0..count {
        labels.push(reader.read_label()?);
    }
    let mut nulls = 0;
    for label in &labels {
        reader.goto(*label)?;
        reader.skip(4 + 8)?;
        if reader.read_string()?.is_none() {
            nulls += 1;
        }
    }
    println!("[Reader] {} records, {} without a name", labels.len(), nulls);

    // Random lookups from several threads over one open file.
    let pinned = PinnedBufferReader::open(&path)?;
    let handles: Vec<_> = (0..4)
        .map(|t| -> Result<_> {
            let mut reader = pinned.clone_reader()?;
            Ok(thread::spawn(move || -> Result<i64> {
                let mut checksum = 0i64;
                for step in 0..1000 {
                    let id = (step * 37 + t * 1013) % RECORDS;
                    let label = record_label(&mut reader, id)?;
                    let raw = reader.get_pointer_at(label, 12)?;
                    let value = i64::from_le_bytes([
                        raw[4], raw[5], raw[6], raw[7], raw[8], raw[9], raw[10], raw[11],
                    ]);
                    checksum = checksum.wrapping_add(value);
                }
                Ok(checksum)
            }))
        })
        .collect::<Result<_>>()?;

    for (t, handle) in handles.into_iter().enumerate() {
        let checksum = handle.join().map_err(|_| "reader thread panicked")??;
        println!("[Thread {}] checksum {}", t, checksum);
    }

    Ok(())
}
