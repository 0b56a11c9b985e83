use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::backend::{DrawCall, HeadlessBackend};
use crate::config::GameConfig;
use crate::foundation::math::Rect;
use crate::Game;

/// PNG-encoded transparent image, leaked so it can be loaded from memory
pub(crate) fn png_bytes(width: u32, height: u32) -> &'static [u8] {
    let mut bytes = Vec::new();
    RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes.leak()
}

/// 800x600 game rendering every frame
pub(crate) fn headless_game() -> Game<HeadlessBackend> {
    Game::new(HeadlessBackend::new(), GameConfig::default().with_frame_rate(None)).unwrap()
}

/// Destination rects of the textured draws issued so far
pub(crate) fn texture_draws(game: &Game<HeadlessBackend>) -> Vec<Rect> {
    game.backend()
        .draw_calls()
        .iter()
        .filter_map(|call| match call {
            DrawCall::Texture { draw, .. } => Some(draw.dst),
            _ => None,
        })
        .collect()
}
