//! Sample streams for the benches.
//!
//! The sample stream is a run of records (`i32` id, `i64` value, optional
//! name) followed by an index of their labels and a suffix label pointing
//! at that index.

use fastser_core::{FillStrategy, Label, MemoryStreamWriter, Result, StreamReader};

/// Writes `records` sample records with their index into a memory stream.
///
/// # Errors
/// Returns an error if the stream outgrows the writer.
pub fn sample_stream(records: u32) -> Result<Vec<u8>> {
    let mut writer = MemoryStreamWriter::new();
    let mut index = Vec::with_capacity(records as usize);
    for id in 0..records {
        index.push(writer.get_label()?);
        write_record(&mut writer, id)?;
    }
    let index_label = writer.get_label()?;
    writer.write_i32(index.len() as i32)?;
    for label in index {
        writer.write_label(label)?;
    }
    writer.write_suffix_label(index_label)?;
    Ok(writer.into_reader().as_bytes().to_vec())
}

fn write_record(writer: &mut MemoryStreamWriter, id: u32) -> Result<()> {
    writer.write_i32(id as i32)?;
    writer.write_i64(i64::from(id) * 31)?;
    if id % 5 == 0 {
        writer.write_string(None)
    } else {
        writer.write_string(Some("sample-record"))
    }
}

/// Follows the suffix label and index, summing every record's value.
///
/// # Errors
/// Returns an error if the stream is malformed or the source fails.
pub fn scan_records<F: FillStrategy>(reader: &mut StreamReader<F>) -> Result<i64> {
    reader.goto_suffix_label()?;
    let count = reader.read_i32()?;
    let first = reader.current();
    let mut sum = 0i64;
    for i in 0..count as u32 {
        reader.goto(Label::new(first.offset() + i * Label::ENCODED_LENGTH as u32))?;
        let record = reader.read_label()?;
        reader.goto(record)?;
        reader.skip(4)?;
        sum = sum.wrapping_add(reader.read_i64()?);
        reader.read_string()?;
    }
    Ok(sum)
}
