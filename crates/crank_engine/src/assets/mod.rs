//! Asset management system
//!
//! Load-deduplicating caches for textures, fonts and audio. A request is
//! keyed by where the bytes come from (a file path, or the address and
//! length of a `'static` in-memory buffer) plus anything that changes the decoded
//! result, such as a font's point size. Two requests with the same key get
//! the same [`Rc`](std::rc::Rc) back and the backend decodes only once.
//!
//! Entries live until [`AssetCaches::clear`] runs at game teardown; there is
//! no eviction.

mod audio_cache;
mod cache;
mod font_cache;
mod texture_cache;

pub use audio_cache::{AudioCache, Sound};
pub use cache::ResourceCache;
pub use font_cache::{Font, FontCache, DEFAULT_FONT_POINT_SIZE};
pub use texture_cache::{Texture, TextureCache};

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::backend::{Backend, BackendError, RendererHandle};
use crate::config::{AssetConfig, AudioConfig};

/// Where asset bytes come from
#[derive(Debug, Clone, Copy)]
pub enum AssetSource<'a> {
    /// A file, resolved against the configured search paths
    Path(&'a Path),
    /// A buffer baked into the program, typically `include_bytes!` data.
    ///
    /// Only `'static` buffers are accepted: the cache keys them by address,
    /// which must never be reused by a different buffer.
    Memory(&'static [u8]),
}

impl<'a> AssetSource<'a> {
    /// Source for a file path
    pub fn path(path: &'a (impl AsRef<Path> + ?Sized)) -> Self {
        Self::Path(path.as_ref())
    }

    /// Source for a `'static` in-memory buffer
    pub fn memory(bytes: &'static [u8]) -> Self {
        Self::Memory(bytes)
    }

    /// Cache key identifying this source
    pub fn key(&self) -> SourceKey {
        match self {
            Self::Path(path) => SourceKey::Path(path.to_path_buf()),
            Self::Memory(bytes) => SourceKey::Memory {
                address: bytes.as_ptr() as usize,
                len: bytes.len(),
            },
        }
    }

    /// Read the bytes, trying each search path before the literal path
    pub fn read(&self, search_paths: &[PathBuf]) -> Result<Cow<'a, [u8]>, AssetError> {
        match *self {
            Self::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Path(path) => {
                let resolved = resolve_path(path, search_paths)
                    .ok_or_else(|| AssetError::NotFound(path.display().to_string()))?;
                std::fs::read(&resolved)
                    .map(Cow::Owned)
                    .map_err(|source| AssetError::Io { path: resolved, source })
            }
        }
    }
}

impl<'a> From<&'a str> for AssetSource<'a> {
    fn from(path: &'a str) -> Self {
        Self::Path(Path::new(path))
    }
}

impl<'a> From<&'a Path> for AssetSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl From<&'static [u8]> for AssetSource<'_> {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Memory(bytes)
    }
}

impl<const N: usize> From<&'static [u8; N]> for AssetSource<'_> {
    fn from(bytes: &'static [u8; N]) -> Self {
        Self::Memory(bytes)
    }
}

/// Identity of an asset source
///
/// In-memory buffers are identified by address and length, so the same
/// static buffer always hits the cache while an equal copy elsewhere does
/// not. Static buffers are never freed, so an address always names the same
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// File path as requested
    Path(PathBuf),
    /// Buffer identity
    Memory {
        /// Address of the first byte
        address: usize,
        /// Length in bytes
        len: usize,
    },
}

fn resolve_path(path: &Path, search_paths: &[PathBuf]) -> Option<PathBuf> {
    if path.is_relative() {
        let found = search_paths
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists());
        if found.is_some() {
            return found;
        }
    }

    path.exists().then(|| path.to_path_buf())
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// IO error during asset loading
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Backend failed to decode the bytes
    #[error("Decode failed: {0}")]
    Decode(#[from] BackendError),
}

/// All resource caches owned by a game
pub struct AssetCaches {
    /// Texture cache
    pub textures: TextureCache,
    /// Font cache
    pub fonts: FontCache,
    /// Music and sound effect caches
    pub audio: AudioCache,
    search_paths: Vec<PathBuf>,
}

impl AssetCaches {
    /// Create empty caches
    pub fn new(assets: &AssetConfig, audio: &AudioConfig) -> Self {
        Self {
            textures: TextureCache::new(),
            fonts: FontCache::new(),
            audio: AudioCache::new(audio.clone()),
            search_paths: assets.search_paths.clone(),
        }
    }

    /// Directories relative paths are resolved against
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Load a texture
    pub fn load_texture(
        &mut self,
        backend: &mut dyn Backend,
        renderer: RendererHandle,
        source: AssetSource<'_>,
    ) -> Result<Rc<Texture>, AssetError> {
        self.textures.load(backend, renderer, source, &self.search_paths)
    }

    /// Load a font at `point_size`
    pub fn load_font(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
        point_size: u32,
    ) -> Result<Rc<Font>, AssetError> {
        self.fonts.load(backend, source, point_size, &self.search_paths)
    }

    /// Load a music track
    pub fn load_music(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
    ) -> Result<Rc<Sound>, AssetError> {
        self.audio.load_music(backend, source, &self.search_paths)
    }

    /// Load a sound effect
    pub fn load_sfx(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
    ) -> Result<Rc<Sound>, AssetError> {
        self.audio.load_sfx(backend, source, &self.search_paths)
    }

    /// Release every cached asset, audio first, then fonts, then textures
    pub fn clear(&mut self, backend: &mut dyn Backend) {
        self.audio.clear(backend);
        self.fonts.clear(backend);
        self.textures.clear(backend);
    }
}
