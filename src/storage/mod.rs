//! Bulk-request assembly for the search engine.
//!
//! Serializers translate the per-block documents into newline-delimited bulk
//! entries. The transport that ships the buffers is out of scope; everything
//! here is pure string assembly.

pub mod elastic;

use crate::models::errors::{ConfigError, SerializeError};

/// Upper bound of one bulk request body, in bytes.
pub const DEFAULT_MAX_BULK_SIZE: usize = 1_000_000;

/// Accumulates bulk entries across one or more request-sized buffers. A new
/// buffer is started whenever the next entry would push the current one over
/// the size cap.
#[derive(Debug)]
pub struct BufferSlice {
    buffers: Vec<String>,
    max_bulk_size: usize,
}

impl BufferSlice {
    pub fn new(max_bulk_size: usize) -> Result<Self, ConfigError> {
        if max_bulk_size == 0 {
            return Err(ConfigError::ZeroBulkSizeLimit);
        }

        Ok(Self {
            buffers: Vec::new(),
            max_bulk_size,
        })
    }

    /// Appends one entry: an action line and, for everything but deletes, a
    /// document line. `meta` must already carry its trailing newline.
    pub fn put_data(&mut self, meta: &str, body: &str) -> Result<(), SerializeError> {
        let entry_size = meta.len() + body.len() + 1;
        if entry_size > self.max_bulk_size {
            return Err(SerializeError::EntryTooLarge {
                entry_size,
                limit: self.max_bulk_size,
            });
        }

        let needs_new_buffer = self
            .buffers
            .last()
            .is_none_or(|buffer| buffer.len() + entry_size > self.max_bulk_size);
        if needs_new_buffer {
            self.buffers.push(String::new());
        }
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push_str(meta);
            if !body.is_empty() {
                buffer.push_str(body);
                buffer.push('\n');
            }
        }

        Ok(())
    }

    pub fn buffers(&self) -> &[String] {
        &self.buffers
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
