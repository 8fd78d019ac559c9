//! Seekable container (C6-C8): Zstd-framed row storage with a trailer/footer
//! row index, for files that need random access rather than a single
//! forward pass.

mod frame;
mod reader;
mod trailer;
mod writer;

pub use frame::FrameLayerOptions;
pub use reader::SeekableReader;
pub use writer::SeekableWriter;
