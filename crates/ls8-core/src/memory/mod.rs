//! Flat 256-byte memory image.

/// Fixed address map for the stack and interrupt vectors.
pub mod map;

pub use map::{interrupt_vector_address, DEFAULT_INTERRUPT_VECTOR_BASE, INTERRUPT_VECTOR_COUNT};

use thiserror::Error;

/// Size in bytes of the flat architectural address space.
pub const MEMORY_BYTES: usize = u8::MAX as usize + 1;

/// Errors raised when a host places a program image into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MemoryError {
    /// Image does not fit in the address space.
    #[error("program image is {len} bytes, memory holds {MEMORY_BYTES}")]
    ImageTooLarge {
        /// Length of the rejected image.
        len: usize,
    },
    /// Backing store with a size other than the address space.
    #[error("memory image must be exactly {MEMORY_BYTES} bytes, got {len}")]
    WrongSize {
        /// Length of the rejected backing store.
        len: usize,
    },
}

/// Zero-initialised byte store addressed `0x00..=0xFF`.
///
/// Data accesses take a `u8` address and so can never leave the address
/// space. Instruction operand fetches use [`Memory::fetch`], which reports
/// reads past the last byte instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "Vec<u8>", into = "Vec<u8>")
)]
pub struct Memory {
    cells: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: vec![0; MEMORY_BYTES].into_boxed_slice(),
        }
    }
}

impl Memory {
    /// Reads one byte.
    #[must_use]
    pub fn read(&self, address: u8) -> u8 {
        self.cells[usize::from(address)]
    }

    /// Writes one byte.
    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[usize::from(address)] = value;
    }

    /// Reads a byte at a possibly out-of-range fetch address.
    #[must_use]
    pub fn fetch(&self, address: u16) -> Option<u8> {
        self.cells.get(usize::from(address)).copied()
    }

    /// Copies a program image to address 0.
    ///
    /// Bytes past the end of the image are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::ImageTooLarge`] when `image` is longer than
    /// [`MEMORY_BYTES`].
    pub fn load(&mut self, image: &[u8]) -> Result<(), MemoryError> {
        if image.len() > MEMORY_BYTES {
            return Err(MemoryError::ImageTooLarge { len: image.len() });
        }
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Returns the whole image.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl TryFrom<Vec<u8>> for Memory {
    type Error = MemoryError;

    fn try_from(cells: Vec<u8>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_BYTES {
            return Err(MemoryError::WrongSize { len: cells.len() });
        }
        Ok(Self {
            cells: cells.into_boxed_slice(),
        })
    }
}

impl From<Memory> for Vec<u8> {
    fn from(memory: Memory) -> Self {
        memory.cells.into_vec()
    }
}
