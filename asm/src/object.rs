//! Object file layout, all fields little-endian 32-bit:
//!
//! ```text
//! header   export_size  import_size  program_words
//! exports  (name[16], address)         one per exported symbol, by name
//! imports  (name[16], reference site)  one per use of an imported symbol
//! program  program_words words
//! ```
//!
//! Table sizes are in bytes.

use std::io::Write;

use crate::error::Error;

pub const NAME_LEN: usize = 16;
pub const ENTRY_SIZE: u32 = NAME_LEN as u32 + 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub export_size: u32,
    pub import_size: u32,
    pub program_words: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub value: i32,
}

impl Entry {
    pub fn new(name: &str, value: i32) -> Self {
        Entry {
            name: name.to_string(),
            value,
        }
    }
}

/// Null-padded, truncated to `NAME_LEN` bytes.
fn name_field(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

pub fn write_header<W: Write>(out: &mut W, header: &Header) -> Result<(), Error> {
    out.write_all(&header.export_size.to_le_bytes())?;
    out.write_all(&header.import_size.to_le_bytes())?;
    out.write_all(&header.program_words.to_le_bytes())?;
    Ok(())
}

pub fn write_entries<W: Write>(out: &mut W, entries: &[Entry]) -> Result<(), Error> {
    for entry in entries {
        out.write_all(&name_field(&entry.name))?;
        out.write_all(&entry.value.to_le_bytes())?;
    }
    Ok(())
}

pub fn write_words<W: Write>(out: &mut W, words: &[u32]) -> Result<(), Error> {
    for word in words {
        out.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// A whole object file, read back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectFile {
    pub header: Header,
    pub exports: Vec<Entry>,
    pub imports: Vec<Entry>,
    pub program: Vec<u32>,
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.bytes.len() < len {
            return Err(Error::Malformed("unexpected end of file"));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn word(&mut self) -> Result<u32, Error> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn entries(&mut self, size: u32) -> Result<Vec<Entry>, Error> {
        if size % ENTRY_SIZE != 0 {
            return Err(Error::Malformed("table size is not a whole number of entries"));
        }
        (0..size / ENTRY_SIZE)
            .map(|_| {
                let raw = self.take(NAME_LEN)?;
                let len = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
                let name = String::from_utf8_lossy(&raw[..len]).into_owned();
                let value = self.word()? as i32;
                Ok(Entry { name, value })
            })
            .collect()
    }
}

impl ObjectFile {
    pub fn read(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader { bytes };
        let header = Header {
            export_size: reader.word()?,
            import_size: reader.word()?,
            program_words: reader.word()?,
        };
        let exports = reader.entries(header.export_size)?;
        let imports = reader.entries(header.import_size)?;
        let program = (0..header.program_words)
            .map(|_| reader.word())
            .collect::<Result<Vec<_>, _>>()?;
        if !reader.bytes.is_empty() {
            return Err(Error::Malformed("trailing bytes after program"));
        }
        Ok(ObjectFile {
            header,
            exports,
            imports,
            program,
        })
    }
}
