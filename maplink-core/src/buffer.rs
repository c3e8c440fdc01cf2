use crate::{LinkError, Result};

/// A rebuilt message that has not been checked against any buffer yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    bytes: Vec<u8>,
}

/// A rebuilt message known to fit, terminator included, in a buffer of the
/// capacity it was checked against. Only obtainable from
/// [`PendingWrite::check_capacity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedWrite {
    bytes: Vec<u8>,
    capacity: usize,
}

impl PendingWrite {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn check_capacity(self, capacity: usize) -> Result<CheckedWrite> {
        let needed = self.bytes.len() + 1;
        if needed > capacity {
            return Err(LinkError::CapacityExceeded { needed, capacity });
        }
        Ok(CheckedWrite {
            bytes: self.bytes,
            capacity,
        })
    }
}

/// A host-owned, fixed-capacity message buffer.
pub trait MessageBuffer {
    /// Message bytes up to the declared length, terminator excluded.
    fn message(&self) -> &[u8];

    /// Bytes the buffer can hold, terminator included.
    fn capacity(&self) -> usize;

    /// Replace the whole message. Implementations must write the content,
    /// a zero terminator and the new declared length, and nothing else.
    fn replace(&mut self, write: CheckedWrite) -> Result<()>;
}

/// A [`MessageBuffer`] over borrowed storage, such as the memory behind a
/// host string handed to an intercepted function.
#[derive(Debug)]
pub struct FixedBuffer<'a> {
    storage: &'a mut [u8],
    len: usize,
    capacity: usize,
}

impl<'a> FixedBuffer<'a> {
    /// `len` is the declared message length without terminator and
    /// `capacity` the declared size of the allocation. Both are validated
    /// against the storage actually handed over.
    pub fn new(storage: &'a mut [u8], len: usize, capacity: usize) -> Result<Self> {
        if capacity > storage.len() {
            return Err(LinkError::InvalidBuffer(format!(
                "declared capacity {} exceeds the {} bytes provided",
                capacity,
                storage.len()
            )));
        }
        if len >= capacity {
            return Err(LinkError::InvalidBuffer(format!(
                "declared length {} leaves no room for a terminator in capacity {}",
                len, capacity
            )));
        }
        Ok(Self {
            storage,
            len,
            capacity,
        })
    }

    /// Derive the declared length from the first zero byte, the way the
    /// host measures its own strings.
    pub fn from_nul_terminated(storage: &'a mut [u8], capacity: usize) -> Result<Self> {
        let limit = capacity.min(storage.len());
        let len = storage[..limit]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| {
                LinkError::InvalidBuffer("no terminator within declared capacity".to_string())
            })?;
        Self::new(storage, len, capacity)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The host's "bytes used" figure, which counts the terminator.
    pub fn used(&self) -> usize {
        self.len + 1
    }
}

impl MessageBuffer for FixedBuffer<'_> {
    fn message(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn replace(&mut self, write: CheckedWrite) -> Result<()> {
        if write.capacity != self.capacity {
            return Err(LinkError::InvalidBuffer(format!(
                "write checked against capacity {} applied to buffer of capacity {}",
                write.capacity, self.capacity
            )));
        }
        let n = write.bytes.len();
        self.storage[..n].copy_from_slice(&write.bytes);
        self.storage[n] = 0;
        self.len = n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_that_fits_replaces_content_and_terminates() {
        let mut storage = [0xAAu8; 16];
        storage[..5].copy_from_slice(b"hello");
        storage[5] = 0;
        let mut buf = FixedBuffer::new(&mut storage, 5, 16).unwrap();

        let write = PendingWrite::new(b"hey there".to_vec())
            .check_capacity(buf.capacity())
            .unwrap();
        buf.replace(write).unwrap();
        assert_eq!(buf.message(), b"hey there");
        assert_eq!(buf.used(), 10);

        assert_eq!(&storage[..10], b"hey there\0");
        assert_eq!(storage[10..], [0xAAu8; 6]);
    }

    #[test]
    fn terminator_counts_against_capacity() {
        assert!(PendingWrite::new(vec![1; 15]).check_capacity(16).is_ok());
        let err = PendingWrite::new(vec![1; 16]).check_capacity(16).unwrap_err();
        assert!(matches!(
            err,
            LinkError::CapacityExceeded {
                needed: 17,
                capacity: 16
            }
        ));
    }

    #[test]
    fn rejects_inconsistent_declarations() {
        let mut storage = [0u8; 8];
        assert!(FixedBuffer::new(&mut storage, 2, 9).is_err());
        assert!(FixedBuffer::new(&mut storage, 8, 8).is_err());
        assert!(FixedBuffer::new(&mut storage, 7, 8).is_ok());
    }

    #[test]
    fn measures_nul_terminated_content() {
        let mut storage = *b"abc\0zzzz";
        let buf = FixedBuffer::from_nul_terminated(&mut storage, 8).unwrap();
        assert_eq!(buf.message(), b"abc");
        assert_eq!(buf.len(), 3);

        let mut unterminated = *b"abcdefgh";
        assert!(FixedBuffer::from_nul_terminated(&mut unterminated, 8).is_err());
    }

    #[test]
    fn refuses_write_checked_for_another_capacity() {
        let mut storage = [0u8; 8];
        let mut buf = FixedBuffer::new(&mut storage, 0, 4).unwrap();
        let write = PendingWrite::new(b"abcdef".to_vec()).check_capacity(8).unwrap();
        assert!(buf.replace(write).is_err());
        assert_eq!(buf.message(), b"");
    }
}
