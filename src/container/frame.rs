//! Zstd frame layer (C6): flush thresholds and the raw magic a frame starts
//! with. Frame compression/decompression itself is a thin wrapper around the
//! `zstd` crate, kept in `writer.rs`/`reader.rs` next to the code that calls
//! it.

/// The four bytes every standard Zstd frame begins with.
pub(crate) const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Tunables for when a batch of rows is flushed into its own Zstd frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayerOptions {
    /// Flush once this many rows have accumulated in the current frame.
    pub max_rows_per_frame: u32,
    /// Flush once this many uncompressed bytes have accumulated, even if
    /// `max_rows_per_frame` has not been reached.
    pub max_uncompressed_bytes_per_frame: usize,
    /// Zstd compression level passed to the encoder for each frame.
    pub zstd_level: i32,
}

impl Default for FrameLayerOptions {
    fn default() -> Self {
        FrameLayerOptions {
            max_rows_per_frame: 8192,
            max_uncompressed_bytes_per_frame: 1024 * 1024,
            zstd_level: 3,
        }
    }
}

impl FrameLayerOptions {
    pub(crate) fn should_flush(&self, rows_in_frame: u32, uncompressed_bytes: usize) -> bool {
        rows_in_frame >= self.max_rows_per_frame || uncompressed_bytes >= self.max_uncompressed_bytes_per_frame
    }
}
