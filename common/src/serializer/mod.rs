mod reader;
mod writer;

pub use reader::{Reader, ReaderError};
pub use writer::Writer;

// Canonical binary encoding shared by every hashed type
// Big endian integers, fixed size byte arrays, u32 length prefix for vectors
pub trait Serializer {
    fn write(&self, writer: &mut Writer);

    fn read(reader: &mut Reader) -> Result<Self, ReaderError>
    where
        Self: Sized;

    fn size(&self) -> usize;

    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::with_capacity(self.size());
        self.write(&mut writer);
        writer.bytes()
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let mut reader = Reader::new(bytes);
        let value = Self::read(&mut reader)?;
        // Trailing garbage means the input was not produced by `to_bytes`
        if reader.total_read() != bytes.len() {
            return Err(ReaderError::InvalidSize);
        }
        Ok(value)
    }

    fn from_hex(hex: &str) -> Result<Self, ReaderError>
    where
        Self: Sized,
    {
        let bytes = hex::decode(hex).map_err(|_| ReaderError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }
}

impl Serializer for u8 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u8(*self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u8()
    }

    fn size(&self) -> usize {
        1
    }
}

impl Serializer for u64 {
    fn write(&self, writer: &mut Writer) {
        writer.write_u64(self);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        reader.read_u64()
    }

    fn size(&self) -> usize {
        8
    }
}

// Max elements accepted when reading a vector
pub const MAX_VEC_LEN: usize = 1 << 20;

impl<T: Serializer> Serializer for Vec<T> {
    fn write(&self, writer: &mut Writer) {
        writer.write_u32(&(self.len() as u32));
        for item in self {
            item.write(writer);
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let len = reader.read_u32()? as usize;
        if len > MAX_VEC_LEN || len > reader.size() {
            return Err(ReaderError::InvalidSize);
        }

        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(T::read(reader)?);
        }
        Ok(values)
    }

    fn size(&self) -> usize {
        4 + self.iter().map(Serializer::size).sum::<usize>()
    }
}
