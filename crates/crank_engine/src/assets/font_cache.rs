//! Font cache

use std::path::PathBuf;
use std::rc::Rc;

use super::{AssetError, AssetSource, ResourceCache, SourceKey};
use crate::backend::{Backend, FontHandle};

/// Point size used when callers do not pick one
pub const DEFAULT_FONT_POINT_SIZE: u32 = 24;

/// A font decoded at one point size
#[derive(Debug)]
pub struct Font {
    handle: FontHandle,
    point_size: u32,
}

impl Font {
    /// Backend handle
    pub fn handle(&self) -> FontHandle {
        self.handle
    }

    /// Point size the font was decoded at
    pub fn point_size(&self) -> u32 {
        self.point_size
    }
}

/// Fonts keyed by source and point size
pub struct FontCache {
    cache: ResourceCache<(SourceKey, u32), Font>,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            cache: ResourceCache::new("font"),
        }
    }

    /// Load a font; the same source at a different size is a separate entry
    pub fn load(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
        point_size: u32,
        search_paths: &[PathBuf],
    ) -> Result<Rc<Font>, AssetError> {
        self.cache.get_or_try_insert_with((source.key(), point_size), || -> Result<_, AssetError> {
            let bytes = source.read(search_paths)?;
            let handle = backend.decode_font(&bytes, point_size)?;
            Ok(Font { handle, point_size })
        })
    }

    /// Number of distinct fonts loaded
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no font is loaded
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Destroy every cached font
    pub fn clear(&mut self, backend: &mut dyn Backend) {
        for font in self.cache.drain() {
            backend.destroy_font(font.handle());
        }
    }
}
