use std::marker::PhantomData;
use std::ops::Range;

use bytemuck::Pod;

use crate::error::{RenderError, RenderResult};

/// Minimum alignment for uniform records bound at dynamic offsets.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// Rounds `byte_size` up to the next multiple of 256.
pub const fn constant_buffer_byte_size(byte_size: usize) -> usize {
    (byte_size + (CONSTANT_BUFFER_ALIGNMENT - 1)) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// CPU-side staging array of `T` records at a fixed stride.
///
/// Records are copied in by index; the byte range touched since the last `take_dirty`
/// is what the renderer uploads to the matching GPU buffer.
#[derive(Debug, Clone)]
pub struct UploadBuffer<T: Pod> {
    bytes: Vec<u8>,
    stride: usize,
    len: usize,
    writes: u64,
    dirty: Option<Range<usize>>,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Records padded to 256 bytes (uniform data).
    pub fn constant(len: usize) -> Self {
        Self::with_stride(len, constant_buffer_byte_size(size_of::<T>()))
    }

    /// Tightly packed records (vertex data).
    pub fn vertex(len: usize) -> Self {
        Self::with_stride(len, size_of::<T>())
    }

    fn with_stride(len: usize, stride: usize) -> Self {
        Self {
            bytes: vec![0; len * stride],
            stride,
            len,
            writes: 0,
            dirty: None,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte distance between consecutive records.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Copies `value` into record `index`.
    pub fn copy_data(&mut self, index: usize, value: &T) -> RenderResult<()> {
        if index >= self.len {
            return Err(RenderError::exhausted(format!(
                "upload record {index} out of range (capacity {})",
                self.len
            )));
        }

        let start = index * self.stride;
        let end = start + size_of::<T>();
        self.bytes[start..end].copy_from_slice(bytemuck::bytes_of(value));

        self.writes += 1;
        self.dirty = Some(match self.dirty.take() {
            Some(r) => r.start.min(start)..r.end.max(end),
            None => start..end,
        });
        Ok(())
    }

    /// Reads record `index` back.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let start = index * self.stride;
        Some(bytemuck::pod_read_unaligned(
            &self.bytes[start..start + size_of::<T>()],
        ))
    }

    /// Total number of `copy_data` calls since creation.
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns and clears the byte range written since the previous call.
    pub fn take_dirty(&mut self) -> Option<Range<usize>> {
        self.dirty.take()
    }
}
