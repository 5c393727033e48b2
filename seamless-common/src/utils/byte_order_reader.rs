/*
This code is part of the Seamless Coverage geospatial library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::prelude::*;
use std::io::{Result, SeekFrom};

/// A seekable reader that tracks its position and can switch byte order
/// between reads, as needed for the mixed-endian shapefile headers.
pub struct ByteOrderReader<R: Read + Seek> {
    is_le: bool,
    reader: R,
    pos: usize,
    len: usize,
}

impl<R: Read + Seek> ByteOrderReader<R> {
    pub fn new(reader: R, byte_order: Endianness) -> Result<ByteOrderReader<R>> {
        let mut bor = ByteOrderReader {
            reader,
            is_le: byte_order == Endianness::LittleEndian,
            pos: 0usize,
            len: 0,
        };
        bor.len = bor.reader.seek(SeekFrom::End(0))? as usize;
        bor.seek(0)?;
        Ok(bor)
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn get_byte_order(&self) -> Endianness {
        if self.is_le {
            return Endianness::LittleEndian;
        }
        Endianness::BigEndian
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        self.pos = position;
        self.reader.seek(SeekFrom::Start(self.pos as u64))?;
        Ok(())
    }

    pub fn inc_pos(&mut self, skip: usize) -> Result<()> {
        self.seek(self.pos + skip)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads `length` bytes as text, replacing invalid sequences.
    pub fn read_utf8(&mut self, length: usize) -> Result<String> {
        let mut bytes = vec![0u8; length];
        self.reader.read_exact(&mut bytes)?;
        self.pos += length;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.pos += 1;
        self.reader.read_u8()
    }

    pub fn peek_u8(&mut self) -> Result<u8> {
        let val = self.reader.read_u8();
        self.seek(self.pos)?;
        val
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.pos += 2;
        if self.is_le {
            return self.reader.read_u16::<LittleEndian>();
        }
        self.reader.read_u16::<BigEndian>()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.pos += 4;
        if self.is_le {
            return self.reader.read_u32::<LittleEndian>();
        }
        self.reader.read_u32::<BigEndian>()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.pos += 4;
        if self.is_le {
            return self.reader.read_i32::<LittleEndian>();
        }
        self.reader.read_i32::<BigEndian>()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.pos += 8;
        if self.is_le {
            return self.reader.read_f64::<LittleEndian>();
        }
        self.reader.read_f64::<BigEndian>()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Endianness {
    #[default]
    LittleEndian,
    BigEndian,
}

#[cfg(test)]
mod test {
    use super::{ByteOrderReader, Endianness};
    use std::io::Cursor;

    #[test]
    fn test_mixed_byte_order() {
        let bytes: Vec<u8> = vec![0, 0, 39, 10, 232, 3, 0, 0, 65, 66];
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::BigEndian).unwrap();
        assert_eq!(bor.len(), 10);
        assert_eq!(bor.read_i32().unwrap(), 9994);
        bor.set_byte_order(Endianness::LittleEndian);
        assert_eq!(bor.read_u32().unwrap(), 1000);
        assert_eq!(bor.peek_u8().unwrap(), 65);
        assert_eq!(bor.pos(), 8);
        assert_eq!(bor.read_utf8(2).unwrap(), "AB");
        assert!(bor.read_u8().is_err());
    }
}
