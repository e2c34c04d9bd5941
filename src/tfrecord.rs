//! TFRecord container reading and writing.
//!
//! Every record is framed as
//!
//! ```text
//! u64 length          (little endian)
//! u32 masked_crc32c(length bytes)
//! [u8; length] data
//! u32 masked_crc32c(data)
//! ```

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use crc::{Crc, CRC_32_ISCSI};
use prost::Message;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::example::Example;

const CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);
const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC-32C of `data`, rotated and offset the way TFRecord stores checksums
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = CASTAGNOLI.checksum(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Appends framed records to an output stream.
///
/// The underlying handle is released when the writer is dropped, so an
/// aborted run still leaves every record written so far on disk.
pub struct RecordWriter<W: Write> {
    writer: W,
    records: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path` for writing
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    /// Frame and append one serialized record
    pub fn write_record(&mut self, data: &[u8]) -> Result<()> {
        let mut length = [0u8; 8];
        LittleEndian::write_u64(&mut length, data.len() as u64);

        self.writer.write_all(&length)?;
        self.writer
            .write_u32::<LittleEndian>(masked_crc32c(&length))?;
        self.writer.write_all(data)?;
        self.writer.write_u32::<LittleEndian>(masked_crc32c(data))?;

        self.records += 1;
        Ok(())
    }

    /// Serialize an example and append it as one record
    pub fn write_example(&mut self, example: &Example) -> Result<()> {
        self.write_record(&example.encode_to_vec())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Flush buffered bytes and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads framed records back, verifying both checksums of every frame
pub struct RecordReader<R: Read> {
    reader: R,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next record, or `None` at a clean end of stream
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let mut length = [0u8; 8];
        if !fill_or_eof(&mut self.reader, &mut length)? {
            return Ok(None);
        }

        let length_crc = self
            .reader
            .read_u32::<LittleEndian>()
            .map_err(truncated)?;
        if length_crc != masked_crc32c(&length) {
            return Err(ConvertError::CorruptRecord(
                "length checksum mismatch".to_string(),
            ));
        }

        let len = usize::try_from(LittleEndian::read_u64(&length)).map_err(|_| {
            ConvertError::CorruptRecord("record length does not fit in memory".to_string())
        })?;
        let mut data = vec![0u8; len];
        self.reader.read_exact(&mut data).map_err(truncated)?;

        let data_crc = self
            .reader
            .read_u32::<LittleEndian>()
            .map_err(truncated)?;
        if data_crc != masked_crc32c(&data) {
            return Err(ConvertError::CorruptRecord(
                "data checksum mismatch".to_string(),
            ));
        }

        Ok(Some(data))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Decode every record of a TFRecord file as a `tf.train.Example`
pub fn read_examples(path: impl AsRef<Path>) -> Result<Vec<Example>> {
    RecordReader::open(path)?
        .map(|record| -> Result<Example> { Ok(Example::decode(record?.as_slice())?) })
        .collect()
}

// Fill `buf` completely; `false` when the stream ends before the first byte
fn fill_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ConvertError::CorruptRecord(
                    "truncated record header".to_string(),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

fn truncated(e: io::Error) -> ConvertError {
    if e.kind() == ErrorKind::UnexpectedEof {
        ConvertError::CorruptRecord("truncated record".to_string())
    } else {
        ConvertError::Io(e)
    }
}
