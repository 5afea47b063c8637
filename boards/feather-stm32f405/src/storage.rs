#![deny(unsafe_code)]
#![deny(warnings)]
//! Configuration blobs in internal flash
//!
//! The last two 128 KB sectors of the STM32F405RG hold one blob each:
//!
//! ```text
//! Sector 10 (0x080C_0000): /common/config.json
//! Sector 11 (0x080E_0000): the sensor module's config.json
//! ```
//!
//! Each sector starts with an 8-byte header (magic, little-endian length)
//! followed by the data padded to a whole word. An erased sector reads as
//! all ones, which never matches the magic, so it reports `NotFound`.

use alloc::vec::Vec;

use defmt::{debug, Format};
use embassy_stm32::flash::{self, Blocking, Flash};
use embedded_io::ErrorKind;
use hal_abstractions::BlobStore;
use node_core::config::COMMON_CONFIG_PATH;

const SECTOR_SIZE: u32 = 128 * 1024;
const COMMON_SECTOR_OFFSET: u32 = 0x000C_0000;
const MODULE_SECTOR_OFFSET: u32 = 0x000E_0000;

const MAGIC: u32 = 0x4E43_4647;
const HEADER_LEN: usize = 8;
const WORD: usize = 4;

/// Flash storage errors
#[derive(Debug, Clone, Copy, Format)]
pub enum StorageError {
    /// The sector holds no blob
    NotFound,
    /// The blob does not fit the caller's buffer or the sector
    TooLarge,
    /// The flash controller reported an error
    Flash(flash::Error),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Blob not found"),
            Self::TooLarge => write!(f, "Blob too large"),
            Self::Flash(e) => write!(f, "Flash error: {:?}", e),
        }
    }
}

impl core::error::Error for StorageError {}

impl embedded_io::Error for StorageError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::TooLarge => ErrorKind::OutOfMemory,
            Self::Flash(_) => ErrorKind::Other,
        }
    }
}

impl From<flash::Error> for StorageError {
    fn from(e: flash::Error) -> Self {
        Self::Flash(e)
    }
}

/// Two-sector blob store over the internal flash
pub struct FlashStore {
    flash: Flash<'static, Blocking>,
}

impl FlashStore {
    pub fn new(flash: Flash<'static, Blocking>) -> Self {
        Self { flash }
    }

    fn sector_for(name: &str) -> u32 {
        if name == COMMON_CONFIG_PATH {
            COMMON_SECTOR_OFFSET
        } else {
            MODULE_SECTOR_OFFSET
        }
    }
}

impl BlobStore for FlashStore {
    type Error = StorageError;

    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let offset = Self::sector_for(name);
        let mut header = [0u8; HEADER_LEN];
        self.flash.blocking_read(offset, &mut header)?;

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != MAGIC {
            return Err(StorageError::NotFound);
        }
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if len > buf.len() || len + HEADER_LEN > SECTOR_SIZE as usize {
            return Err(StorageError::TooLarge);
        }

        self.flash
            .blocking_read(offset + HEADER_LEN as u32, &mut buf[..len])?;
        debug!("Read {} bytes of {}", len, name);
        Ok(len)
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        let offset = Self::sector_for(name);
        let padded = (bytes.len() + WORD - 1) / WORD * WORD;
        if HEADER_LEN + padded > SECTOR_SIZE as usize {
            return Err(StorageError::TooLarge);
        }

        let mut image = Vec::with_capacity(HEADER_LEN + padded);
        image.extend_from_slice(&MAGIC.to_le_bytes());
        image.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        image.extend_from_slice(bytes);
        image.resize(HEADER_LEN + padded, 0xFF);

        self.flash.blocking_erase(offset, offset + SECTOR_SIZE)?;
        self.flash.blocking_write(offset, &image)?;
        debug!("Wrote {} bytes of {}", bytes.len(), name);
        Ok(())
    }
}
