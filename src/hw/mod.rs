//! Hardware-resident tile memory
//!
//! Tiles are 8x8 pixels at 4 bits per pixel: one `u32` word per pixel row,
//! leftmost pixel in the low nibble. `tiles` owns the buffer and the two
//! writers (`commit`, `plot_tiles`); `decompress` is the seam to the
//! streaming decompressors.

pub mod decompress;
pub mod tiles;

pub use decompress::{Decompressor, NullDecompressor};
pub use tiles::{CompressionType, TILE_HEIGHT, Tile, TileBuffer, TileError, commit, plot_tiles};
