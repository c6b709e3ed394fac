//! Program image loading.
//!
//! The text format holds one byte per line as eight binary digits. A `#`
//! starts a comment that runs to the end of the line; blank lines and
//! comment-only lines are ignored:
//!
//! ```text
//! # print8
//! 10011001 # LDI R0,8
//! 00000000
//! 00001000
//! 01000011 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ls8_core::MEMORY_BYTES;
use thiserror::Error;

/// On-disk encoding of a program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// One binary-digit byte per line with `#` comments.
    #[default]
    Text,
    /// Raw bytes.
    Binary,
}

/// Errors raised while reading or parsing a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A text line is neither blank, a comment, nor eight binary digits.
    #[error("line {line}: expected 8 binary digits, found `{text}`")]
    InvalidLine {
        /// 1-based line number.
        line: usize,
        /// Offending text with comments stripped.
        text: String,
    },
    /// The image does not fit in memory.
    #[error("program image is {len} bytes, memory holds {MEMORY_BYTES}")]
    ImageTooLarge {
        /// Length of the rejected image.
        len: usize,
    },
}

fn parse_byte(code: &str) -> Option<u8> {
    if code.len() != 8 || !code.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(code, 2).ok()
}

/// Parses a text image into bytes.
///
/// # Errors
///
/// Returns [`LoadError::InvalidLine`] for a malformed line and
/// [`LoadError::ImageTooLarge`] when the image exceeds memory.
pub fn parse_text_image(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut image = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let code = line.split_once('#').map_or(line, |(code, _)| code).trim();
        if code.is_empty() {
            continue;
        }

        let byte = parse_byte(code).ok_or_else(|| LoadError::InvalidLine {
            line: index + 1,
            text: code.to_string(),
        })?;
        image.push(byte);
    }

    check_size(image)
}

fn check_size(image: Vec<u8>) -> Result<Vec<u8>, LoadError> {
    if image.len() > MEMORY_BYTES {
        return Err(LoadError::ImageTooLarge { len: image.len() });
    }
    Ok(image)
}

/// Reads and parses a program image from disk.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, plus any error
/// from parsing the selected format.
pub fn load_image(path: &Path, format: ImageFormat) -> Result<Vec<u8>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let image = match format {
        ImageFormat::Text => parse_text_image(&fs::read_to_string(path).map_err(io_error)?)?,
        ImageFormat::Binary => check_size(fs::read(path).map_err(io_error)?)?,
    };

    log::debug!("loaded {} bytes from {}", image.len(), path.display());
    Ok(image)
}
