//! Tile renderer
//!
//! Sprite frames are cut from procedural 4bpp sheets and committed into a
//! fixed tile memory; the HUD draws numbers as one sprite per digit.

pub mod digits;
pub mod shapes;
pub mod sprites;

use thiserror::Error;

use crate::hw::TileError;
use crate::platform::{SpriteAsset, SpriteHandle};

pub use digits::render_number;
pub use shapes::{AssetBank, SpriteSheet};
pub use sprites::{SpriteEntry, TileSpriteService};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Tiles(#[from] TileError),
    #[error("out of tile memory: {requested} tiles requested, {free} free")]
    OutOfTileMemory { requested: usize, free: usize },
    #[error("unknown sprite {0:?}")]
    UnknownSprite(SpriteHandle),
    #[error("{asset:?} has no frame {frame}")]
    MissingFrame { asset: SpriteAsset, frame: u16 },
}
