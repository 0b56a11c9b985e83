//! Texture cache

use std::path::PathBuf;
use std::rc::Rc;

use super::{AssetError, AssetSource, ResourceCache, SourceKey};
use crate::backend::{Backend, RendererHandle, TextureHandle, TextureInfo};

/// A decoded image uploaded to the renderer
#[derive(Debug)]
pub struct Texture {
    info: TextureInfo,
}

impl Texture {
    /// Backend handle
    pub fn handle(&self) -> TextureHandle {
        self.info.handle
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Handle and size together
    pub fn info(&self) -> TextureInfo {
        self.info
    }
}

/// Textures keyed by source
pub struct TextureCache {
    cache: ResourceCache<SourceKey, Texture>,
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            cache: ResourceCache::new("texture"),
        }
    }

    /// Load a texture, decoding only on the first request for `source`
    pub fn load(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        source: AssetSource<'_>,
        search_paths: &[PathBuf],
    ) -> Result<Rc<Texture>, AssetError> {
        self.cache.get_or_try_insert_with(source.key(), || -> Result<_, AssetError> {
            let bytes = source.read(search_paths)?;
            let info = backend.decode_image(renderer, &bytes)?;
            Ok(Texture { info })
        })
    }

    /// Number of distinct textures loaded
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no texture is loaded
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Destroy every cached texture
    pub fn clear(&mut self, backend: &mut dyn Backend) {
        for texture in self.cache.drain() {
            backend.destroy_texture(texture.handle());
        }
    }
}
