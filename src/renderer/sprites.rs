//! Sprite service backed by tile memory
//!
//! Each sprite owns a contiguous run of sprite tiles holding its frame.
//! Runs are handed out first-fit and returned on destroy.

use std::collections::BTreeMap;

use glam::Vec2;

use super::RenderError;
use super::shapes::AssetBank;
use crate::hw::{
    CompressionType, Decompressor, NullDecompressor, TILE_HEIGHT, Tile, TileBuffer, commit,
    plot_tiles,
};
use crate::platform::{SpriteAsset, SpriteHandle, SpriteService};

/// Sprite tile memory, in tiles
pub const SPRITE_TILE_CAPACITY: usize = 1024;

/// Background tile memory, in tiles
pub const BACKGROUND_TILE_CAPACITY: usize = 512;

/// A live sprite
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteEntry {
    pub asset: SpriteAsset,
    pub frame: u16,
    pub position: Vec2,
    pub scale: f32,
    /// Degrees
    pub rotation: f32,
    pub blending: bool,
    /// First tile of the sprite's run in sprite tile memory
    pub tile_index: usize,
    pub tile_count: usize,
}

pub struct TileSpriteService<D = NullDecompressor> {
    assets: AssetBank,
    decompressor: D,
    vram: TileBuffer,
    used: Vec<bool>,
    background_tiles: TileBuffer,
    /// Scroll x while a background exists
    background: Option<i32>,
    sprites: BTreeMap<SpriteHandle, SpriteEntry>,
    next_handle: u32,
    alpha: f32,
}

impl TileSpriteService<NullDecompressor> {
    pub fn new() -> Self {
        Self::with_decompressor(NullDecompressor)
    }
}

impl Default for TileSpriteService<NullDecompressor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Decompressor> TileSpriteService<D> {
    pub fn with_decompressor(decompressor: D) -> Self {
        Self {
            assets: AssetBank::new(),
            decompressor,
            vram: TileBuffer::new(SPRITE_TILE_CAPACITY),
            used: vec![false; SPRITE_TILE_CAPACITY],
            background_tiles: TileBuffer::new(BACKGROUND_TILE_CAPACITY),
            background: None,
            sprites: BTreeMap::new(),
            next_handle: 0,
            alpha: 1.0,
        }
    }

    pub fn sprite(&self, handle: SpriteHandle) -> Option<&SpriteEntry> {
        self.sprites.get(&handle)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (&SpriteHandle, &SpriteEntry)> {
        self.sprites.iter()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Sprite tile memory
    pub fn vram(&self) -> &TileBuffer {
        &self.vram
    }

    pub fn background_tiles(&self) -> &TileBuffer {
        &self.background_tiles
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    pub fn transparency_alpha(&self) -> f32 {
        self.alpha
    }

    pub fn free_tiles(&self) -> usize {
        self.used.iter().filter(|used| !**used).count()
    }

    /// First-fit search for `count` contiguous free tiles
    fn allocate(&mut self, count: usize) -> Result<usize, RenderError> {
        let mut run = 0;
        for (i, used) in self.used.iter().enumerate() {
            run = if *used { 0 } else { run + 1 };
            if run == count {
                let start = i + 1 - count;
                self.used[start..=i].fill(true);
                return Ok(start);
            }
        }
        Err(RenderError::OutOfTileMemory {
            requested: count,
            free: self.free_tiles(),
        })
    }

    fn release(&mut self, index: usize, count: usize) {
        self.used[index..index + count].fill(false);
    }

    /// Write `frame` of `asset` into sprite tiles starting at `index`
    fn upload(&mut self, asset: SpriteAsset, frame: u16, index: usize) -> Result<(), RenderError> {
        let sheet = self.assets.sheet(asset);
        let count = sheet.tiles_per_frame();

        if sheet.row_skew == 0 {
            let start = sheet.frame_row(frame) * sheet.width;
            commit(
                &mut self.vram,
                &sheet.tiles[start..],
                sheet.compression,
                index,
                count,
                &mut self.decompressor,
            )?;
            return Ok(());
        }

        // Frame straddles the tile grid: shift each tile-row up by the skew
        let mut staging = vec![Tile::BLANK; count];
        for row in 0..sheet.height {
            plot_tiles(
                sheet.width,
                &sheet.tiles,
                (sheet.frame_row(frame) + row + 1) * TILE_HEIGHT,
                row * TILE_HEIGHT + sheet.row_skew,
                &mut staging,
            );
        }
        commit(
            &mut self.vram,
            &staging,
            CompressionType::None.into(),
            index,
            count,
            &mut self.decompressor,
        )?;
        Ok(())
    }

    fn entry_mut(&mut self, handle: SpriteHandle) -> Result<&mut SpriteEntry, RenderError> {
        self.sprites
            .get_mut(&handle)
            .ok_or(RenderError::UnknownSprite(handle))
    }
}

impl<D: Decompressor> SpriteService for TileSpriteService<D> {
    fn create_sprite(
        &mut self,
        asset: SpriteAsset,
        position: Vec2,
        frame: u16,
    ) -> Result<SpriteHandle, RenderError> {
        let sheet = self.assets.sheet(asset);
        if frame >= sheet.frames {
            return Err(RenderError::MissingFrame { asset, frame });
        }
        let tile_count = sheet.tiles_per_frame();

        let tile_index = self.allocate(tile_count)?;
        if let Err(err) = self.upload(asset, frame, tile_index) {
            self.release(tile_index, tile_count);
            return Err(err);
        }

        let handle = SpriteHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.sprites.insert(
            handle,
            SpriteEntry {
                asset,
                frame,
                position,
                scale: 1.0,
                rotation: 0.0,
                blending: false,
                tile_index,
                tile_count,
            },
        );
        log::trace!("Sprite {:?}: {:?} frame {} at tile {}", handle, asset, frame, tile_index);
        Ok(handle)
    }

    fn destroy_sprite(&mut self, handle: SpriteHandle) {
        if let Some(entry) = self.sprites.remove(&handle) {
            self.release(entry.tile_index, entry.tile_count);
        }
    }

    fn set_position(&mut self, handle: SpriteHandle, position: Vec2) -> Result<(), RenderError> {
        self.entry_mut(handle)?.position = position;
        Ok(())
    }

    fn set_scale(&mut self, handle: SpriteHandle, scale: f32) -> Result<(), RenderError> {
        self.entry_mut(handle)?.scale = scale;
        Ok(())
    }

    fn set_rotation(&mut self, handle: SpriteHandle, degrees: f32) -> Result<(), RenderError> {
        self.entry_mut(handle)?.rotation = degrees;
        Ok(())
    }

    fn set_blending(&mut self, handle: SpriteHandle, enabled: bool) -> Result<(), RenderError> {
        self.entry_mut(handle)?.blending = enabled;
        Ok(())
    }

    fn create_background(&mut self) -> Result<(), RenderError> {
        let tiles = &self.assets.background;
        commit(
            &mut self.background_tiles,
            tiles,
            CompressionType::None.into(),
            0,
            tiles.len(),
            &mut self.decompressor,
        )?;
        self.background = Some(0);
        Ok(())
    }

    fn destroy_background(&mut self) {
        self.background = None;
    }

    fn background_x(&self) -> i32 {
        self.background.unwrap_or(0)
    }

    fn set_background_x(&mut self, x: i32) {
        if let Some(scroll) = self.background.as_mut() {
            *scroll = x;
        }
    }

    fn set_transparency_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::glyph_row;

    #[test]
    fn test_create_and_destroy_reuses_tiles() {
        let mut sprites = TileSpriteService::new();
        let a = sprites
            .create_sprite(SpriteAsset::Ball, Vec2::ZERO, 0)
            .unwrap();
        let b = sprites
            .create_sprite(SpriteAsset::Arrow, Vec2::ZERO, 0)
            .unwrap();

        assert_eq!(sprites.sprite(a).unwrap().tile_index, 0);
        assert_eq!(sprites.sprite(a).unwrap().tile_count, 4);
        assert_eq!(sprites.sprite(b).unwrap().tile_index, 4);
        assert_eq!(sprites.free_tiles(), SPRITE_TILE_CAPACITY - 5);

        sprites.destroy_sprite(a);
        let c = sprites
            .create_sprite(SpriteAsset::Numbers, Vec2::ZERO, 7)
            .unwrap();
        assert_eq!(sprites.sprite(c).unwrap().tile_index, 0);
        assert_eq!(sprites.sprite_count(), 2);
    }

    #[test]
    fn test_ball_frame_committed_to_tile_memory() {
        let mut sprites = TileSpriteService::new();
        let handle = sprites
            .create_sprite(SpriteAsset::Ball, Vec2::ZERO, 2)
            .unwrap();
        let entry = sprites.sprite(handle).unwrap().clone();

        let sheet = AssetBank::new().sheet(SpriteAsset::Ball).clone();
        let start = sheet.frame_row(2) * sheet.width;
        assert_eq!(
            &sprites.vram().tiles()[entry.tile_index..entry.tile_index + 4],
            &sheet.tiles[start..start + 4]
        );
    }

    #[test]
    fn test_glyph_extracted_onto_tile_grid() {
        let mut sprites = TileSpriteService::new();
        for digit in 0..10u16 {
            let handle = sprites
                .create_sprite(SpriteAsset::Numbers, Vec2::ZERO, digit)
                .unwrap();
            let index = sprites.sprite(handle).unwrap().tile_index;
            let tile = sprites.vram().tile(index).unwrap();
            for row in 0..TILE_HEIGHT {
                assert_eq!(tile.rows[row], glyph_row(usize::from(digit), row));
            }
        }
    }

    #[test]
    fn test_missing_frame_and_unknown_handle() {
        let mut sprites = TileSpriteService::new();
        assert_eq!(
            sprites.create_sprite(SpriteAsset::Arrow, Vec2::ZERO, 1),
            Err(RenderError::MissingFrame {
                asset: SpriteAsset::Arrow,
                frame: 1
            })
        );
        assert_eq!(
            sprites.set_scale(SpriteHandle(42), 2.0),
            Err(RenderError::UnknownSprite(SpriteHandle(42)))
        );
        assert_eq!(sprites.free_tiles(), SPRITE_TILE_CAPACITY);
    }

    #[test]
    fn test_out_of_tile_memory() {
        let mut sprites = TileSpriteService::new();
        for _ in 0..SPRITE_TILE_CAPACITY / 4 {
            sprites
                .create_sprite(SpriteAsset::Ball, Vec2::ZERO, 0)
                .unwrap();
        }
        assert_eq!(
            sprites.create_sprite(SpriteAsset::Arrow, Vec2::ZERO, 0),
            Err(RenderError::OutOfTileMemory {
                requested: 1,
                free: 0
            })
        );
    }

    #[test]
    fn test_background_scroll() {
        let mut sprites = TileSpriteService::new();
        sprites.set_background_x(5);
        assert_eq!(sprites.background_x(), 0);

        sprites.create_background().unwrap();
        sprites.set_background_x(5);
        assert_eq!(sprites.background_x(), 5);
        assert_eq!(
            &sprites.background_tiles().tiles()[..4],
            AssetBank::new().background.as_slice()
        );

        sprites.destroy_background();
        assert!(!sprites.has_background());
    }
}
