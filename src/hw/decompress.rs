//! Streaming tile decompressors
//!
//! The encodings themselves belong to the platform (BIOS routines on real
//! hardware). The compositor only needs somewhere to send each stream.

use super::tiles::Tile;

/// Expands a compressed tile stream directly into tile memory
///
/// `destination` is exactly the tile range the caller committed to; an
/// implementation must not assume anything about tiles outside it.
pub trait Decompressor {
    fn lz77(&mut self, source: &[u8], destination: &mut [Tile]);
    fn run_length(&mut self, source: &[u8], destination: &mut [Tile]);
    fn huffman(&mut self, source: &[u8], destination: &mut [Tile]);
}

/// Decompressor for targets without decompression routines.
///
/// Leaves the destination untouched and says so in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDecompressor;

impl NullDecompressor {
    fn skip(encoding: &str, source: &[u8], destination: &[Tile]) {
        log::warn!(
            "No {} decompressor: {} bytes for {} tiles left unexpanded",
            encoding,
            source.len(),
            destination.len()
        );
    }
}

impl Decompressor for NullDecompressor {
    fn lz77(&mut self, source: &[u8], destination: &mut [Tile]) {
        Self::skip("LZ77", source, destination);
    }

    fn run_length(&mut self, source: &[u8], destination: &mut [Tile]) {
        Self::skip("run-length", source, destination);
    }

    fn huffman(&mut self, source: &[u8], destination: &mut [Tile]) {
        Self::skip("Huffman", source, destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::tiles::{CompressionType, TileBuffer, commit};

    #[test]
    fn test_null_decompressor_leaves_tiles_untouched() {
        let mut buffer = TileBuffer::new(4);
        let source = [Tile::from_rows([0xABCD; 8])];

        commit(
            &mut buffer,
            &source,
            CompressionType::RunLength.into(),
            1,
            1,
            &mut NullDecompressor,
        )
        .unwrap();

        assert!(buffer.words().iter().all(|w| *w == 0));
    }
}
