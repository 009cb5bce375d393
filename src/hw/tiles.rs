//! Tile buffer writes: bulk commits and sub-tile row plotting

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use super::decompress::Decompressor;

/// Pixel rows per tile (and words per tile)
pub const TILE_HEIGHT: usize = 8;

/// One 8x8 4bpp tile, a word per pixel row
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Tile {
    pub rows: [u32; TILE_HEIGHT],
}

impl Tile {
    pub const BLANK: Tile = Tile {
        rows: [0; TILE_HEIGHT],
    };

    pub const fn from_rows(rows: [u32; TILE_HEIGHT]) -> Self {
        Self { rows }
    }
}

/// Declared encoding of a tile source
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None = 0,
    Lz77 = 1,
    RunLength = 2,
    Huffman = 3,
}

impl TryFrom<u8> for CompressionType {
    type Error = TileError;

    fn try_from(code: u8) -> Result<Self, TileError> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Lz77),
            2 => Ok(Self::RunLength),
            3 => Ok(Self::Huffman),
            _ => Err(TileError::UnknownCompression(code)),
        }
    }
}

impl From<CompressionType> for u8 {
    fn from(compression: CompressionType) -> u8 {
        compression as u8
    }
}

/// Tile writes that must not happen
///
/// Both are configuration faults: the caller is expected to halt rather than
/// keep running with half-written tile memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("unknown compression type: {0}")]
    UnknownCompression(u8),
    #[error("tile range {index}..{index}+{count} exceeds buffer of {capacity} tiles")]
    OutOfRange {
        index: usize,
        count: usize,
        capacity: usize,
    },
    #[error("uncompressed source holds {available} tiles, {needed} requested")]
    SourceTooShort { needed: usize, available: usize },
}

/// Fixed-size grid of tiles addressed by tile index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBuffer {
    tiles: Box<[Tile]>,
}

impl TileBuffer {
    /// Zeroed buffer of `len` tiles
    pub fn new(len: usize) -> Self {
        Self {
            tiles: vec![Tile::BLANK; len].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Raw word view, row by row
    pub fn words(&self) -> &[u32] {
        bytemuck::cast_slice(&self.tiles)
    }
}

/// Copy `count` tiles into `buffer` starting at tile `index`.
///
/// `compression` is the raw code declared by the tile source. Uncompressed
/// sources are bulk-copied; the three compressed encodings are streamed
/// through `decompressor` straight into the destination range. Every check
/// runs before the first write, so a rejected commit leaves `buffer` as it was.
pub fn commit<D: Decompressor + ?Sized>(
    buffer: &mut TileBuffer,
    source: &[Tile],
    compression: u8,
    index: usize,
    count: usize,
    decompressor: &mut D,
) -> Result<(), TileError> {
    let compression = CompressionType::try_from(compression)?;

    let capacity = buffer.len();
    if index.checked_add(count).is_none_or(|end| end > capacity) {
        return Err(TileError::OutOfRange {
            index,
            count,
            capacity,
        });
    }

    let destination = &mut buffer.tiles_mut()[index..index + count];
    match compression {
        CompressionType::None => {
            let source = source.get(..count).ok_or(TileError::SourceTooShort {
                needed: count,
                available: source.len(),
            })?;
            let words: &mut [u32] = bytemuck::cast_slice_mut(destination);
            words.copy_from_slice(bytemuck::cast_slice(source));
        }
        CompressionType::Lz77 => decompressor.lz77(bytemuck::cast_slice(source), destination),
        CompressionType::RunLength => {
            decompressor.run_length(bytemuck::cast_slice(source), destination)
        }
        CompressionType::Huffman => {
            decompressor.huffman(bytemuck::cast_slice(source), destination)
        }
    }
    Ok(())
}

/// Composite a horizontal strip of `width` tiles from `source` into `destination`.
///
/// Both images are row-major, `width` tiles per tile-row. `source_y` and
/// `destination_y` are pixel rows; the strip starts at tile-row
/// `source_y / 8` in the source and `destination_y / 8` in the destination.
///
/// With `destination_y % 8 == 0` the strip is a straight word copy. Otherwise,
/// with `k = destination_y % 8`, destination row `r` takes row `r + k` of the
/// tile above the source cursor for `r < 8 - k`, and row `r + k - 8` of the
/// tile at the cursor for the rest. A cursor on tile-row 0 has nothing above
/// it; those rows come out blank.
///
/// Panics if either strip lies outside its slice.
pub fn plot_tiles(
    width: usize,
    source: &[Tile],
    source_y: usize,
    destination_y: usize,
    destination: &mut [Tile],
) {
    let cursor = (source_y / TILE_HEIGHT) * width;
    let start = (destination_y / TILE_HEIGHT) * width;
    let destination = &mut destination[start..start + width];

    match destination_y % TILE_HEIGHT {
        0 => {
            let words: &mut [u32] = bytemuck::cast_slice_mut(destination);
            words.copy_from_slice(bytemuck::cast_slice(&source[cursor..cursor + width]));
        }
        offset => plot_shifted_tiles(width, source, cursor, offset, destination),
    }
}

/// Unaligned case: every destination row comes from one of two vertically
/// adjacent source tiles.
fn plot_shifted_tiles(
    width: usize,
    source: &[Tile],
    cursor: usize,
    offset: usize,
    destination: &mut [Tile],
) {
    let split = TILE_HEIGHT - offset;
    let above_row = cursor.checked_sub(width);

    for (column, out) in destination.iter_mut().enumerate() {
        let current = &source[cursor + column];
        let above = above_row.map(|row| &source[row + column]);

        for row in 0..split {
            out.rows[row] = above.map_or(0, |tile| tile.rows[row + offset]);
        }
        for row in split..TILE_HEIGHT {
            out.rows[row] = current.rows[row - split];
        }
    }
}
