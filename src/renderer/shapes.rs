//! Procedural 4bpp tile sheets for the game's sprites and background
//!
//! Pixels are palette indices 0-15, packed eight to a row word with the
//! leftmost pixel in the low nibble.

use crate::consts::MAX_TIER;
use crate::hw::{CompressionType, TILE_HEIGHT, Tile};
use crate::platform::SpriteAsset;

/// Palette index used for outlines, glyphs and stars
const INK: u8 = 15;

/// Number glyph cells sit this many pixel rows below the tile grid
pub const GLYPH_ROW_SKEW: usize = 3;

/// A sheet of equally sized frames, stored as one row-major tile image
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub tiles: Vec<Tile>,
    /// Tiles per tile-row (frame width in tiles)
    pub width: usize,
    /// Tile-rows per frame
    pub height: usize,
    pub frames: u16,
    /// Raw compression code as stored with the asset
    pub compression: u8,
    /// Pixel rows between the tile grid and the top of each frame
    pub row_skew: usize,
}

impl SpriteSheet {
    #[inline]
    pub fn tiles_per_frame(&self) -> usize {
        self.width * self.height
    }

    /// Tile-row where `frame` begins (ignoring skew)
    #[inline]
    pub fn frame_row(&self, frame: u16) -> usize {
        usize::from(frame) * self.height
    }
}

/// Every sheet the sprite service can draw from
#[derive(Debug, Clone)]
pub struct AssetBank {
    ball: SpriteSheet,
    arrow: SpriteSheet,
    numbers: SpriteSheet,
    pub background: Vec<Tile>,
}

impl AssetBank {
    pub fn new() -> Self {
        Self {
            ball: ball_sheet(),
            arrow: arrow_sheet(),
            numbers: numbers_sheet(),
            background: starfield_tiles(),
        }
    }

    pub fn sheet(&self, asset: SpriteAsset) -> &SpriteSheet {
        match asset {
            SpriteAsset::Ball => &self.ball,
            SpriteAsset::Arrow => &self.arrow,
            SpriteAsset::Numbers => &self.numbers,
        }
    }
}

impl Default for AssetBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack eight palette indices into a row word
pub fn pack_row(pixels: [u8; 8]) -> u32 {
    pixels
        .iter()
        .enumerate()
        .fold(0, |word, (i, &p)| word | (u32::from(p & 0xF) << (4 * i)))
}

/// Palette index of pixel `x` in a row word
pub fn pixel(word: u32, x: usize) -> u8 {
    ((word >> (4 * x)) & 0xF) as u8
}

/// Cut a `width`-tile-wide pixel image (one `[u8; 8]`-per-tile-column row
/// list) into row-major tiles
fn tiles_from_rows(width: usize, rows: &[Vec<u8>]) -> Vec<Tile> {
    let tile_rows = rows.len().div_ceil(TILE_HEIGHT);
    let mut tiles = vec![Tile::BLANK; tile_rows * width];
    for (y, row) in rows.iter().enumerate() {
        for column in 0..width {
            let mut pixels = [0u8; 8];
            pixels.copy_from_slice(&row[column * 8..column * 8 + 8]);
            tiles[(y / TILE_HEIGHT) * width + column].rows[y % TILE_HEIGHT] = pack_row(pixels);
        }
    }
    tiles
}

/// 16x16 disc per tier, filled with palette index `tier + 1`, inked rim
fn ball_sheet() -> SpriteSheet {
    let frames = u16::from(MAX_TIER) + 1;
    let mut rows = Vec::with_capacity(usize::from(frames) * 16);
    for tier in 0..frames {
        let fill = (tier + 1) as u8;
        for y in 0..16i32 {
            let row = (0..16i32)
                .map(|x| {
                    // Doubled coordinates so the center sits between pixels
                    let (dx, dy) = (2 * x + 1 - 16, 2 * y + 1 - 16);
                    match dx * dx + dy * dy {
                        d if d <= 144 => fill,
                        d if d <= 196 => INK,
                        _ => 0,
                    }
                })
                .collect();
            rows.push(row);
        }
    }
    SpriteSheet {
        tiles: tiles_from_rows(2, &rows),
        width: 2,
        height: 2,
        frames,
        compression: CompressionType::None.into(),
        row_skew: 0,
    }
}

fn arrow_sheet() -> SpriteSheet {
    const ARROW: [&str; 8] = [
        "........", "....#...", "....##..", "#######.", "#######.", "....##..", "....#...",
        "........",
    ];
    let rows: Vec<Vec<u8>> = ARROW
        .iter()
        .map(|line| line.bytes().map(|c| if c == b'#' { INK } else { 0 }).collect())
        .collect();
    SpriteSheet {
        tiles: tiles_from_rows(1, &rows),
        width: 1,
        height: 1,
        frames: 1,
        compression: CompressionType::None.into(),
        row_skew: 0,
    }
}

/// 3x5 glyphs, three bits per row with the leftmost pixel in the high bit.
/// Digits 0-9, then the ball icon.
const GLYPHS: [[u8; 5]; 11] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
    [0b010, 0b111, 0b111, 0b111, 0b010],
];

/// Row `row` (0-7) of an 8x8 glyph cell; the glyph sits at (2, 1)
pub fn glyph_row(glyph: usize, row: usize) -> u32 {
    let Some(bits) = row.checked_sub(1).and_then(|r| GLYPHS[glyph].get(r)) else {
        return 0;
    };
    let mut pixels = [0u8; 8];
    for column in 0..3 {
        if bits & (0b100 >> column) != 0 {
            pixels[2 + column] = INK;
        }
    }
    pack_row(pixels)
}

/// Glyph cells packed one per tile-row, each `GLYPH_ROW_SKEW` rows low.
/// One spare tile-row at the end holds the last cell's overhang.
fn numbers_sheet() -> SpriteSheet {
    let frames = GLYPHS.len();
    let mut rows = vec![vec![0u8; 8]; (frames + 1) * TILE_HEIGHT];
    for glyph in 0..frames {
        for row in 0..TILE_HEIGHT {
            let word = glyph_row(glyph, row);
            let target = &mut rows[glyph * TILE_HEIGHT + GLYPH_ROW_SKEW + row];
            for (x, p) in target.iter_mut().enumerate() {
                *p = pixel(word, x);
            }
        }
    }
    SpriteSheet {
        tiles: tiles_from_rows(1, &rows),
        width: 1,
        height: 1,
        frames: frames as u16,
        compression: CompressionType::None.into(),
        row_skew: GLYPH_ROW_SKEW,
    }
}

/// A few scattered stars for the scrolling background
fn starfield_tiles() -> Vec<Tile> {
    const STARS: [(usize, usize, usize); 6] = [(0, 1, 2), (0, 6, 5), (1, 3, 0), (2, 0, 7), (2, 5, 3), (3, 7, 6)];
    let mut tiles = vec![Tile::BLANK; 4];
    for (tile, x, y) in STARS {
        tiles[tile].rows[y] |= u32::from(INK) << (4 * x);
    }
    tiles
}
