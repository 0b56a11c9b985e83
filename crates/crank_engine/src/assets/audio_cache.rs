//! Music and sound effect caches

use std::path::PathBuf;
use std::rc::Rc;

use super::{AssetError, AssetSource, ResourceCache, SourceKey};
use crate::backend::{Backend, BackendError, SoundHandle, SoundKind};
use crate::config::AudioConfig;

/// A decoded music track or sound effect
#[derive(Debug)]
pub struct Sound {
    handle: SoundHandle,
    kind: SoundKind,
}

impl Sound {
    /// Backend handle
    pub fn handle(&self) -> SoundHandle {
        self.handle
    }

    /// Music or effect
    pub fn kind(&self) -> SoundKind {
        self.kind
    }
}

/// Separate music and effect caches sharing one lazily opened device
pub struct AudioCache {
    music: ResourceCache<SourceKey, Sound>,
    effects: ResourceCache<SourceKey, Sound>,
    config: AudioConfig,
    device_open: bool,
}

impl AudioCache {
    /// Create empty caches; the device opens on the first load
    pub fn new(config: AudioConfig) -> Self {
        Self {
            music: ResourceCache::new("music"),
            effects: ResourceCache::new("sound effect"),
            config,
            device_open: false,
        }
    }

    /// Whether the audio device has been opened
    pub fn is_device_open(&self) -> bool {
        self.device_open
    }

    /// Load a music track
    pub fn load_music(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
        search_paths: &[PathBuf],
    ) -> Result<Rc<Sound>, AssetError> {
        self.load(backend, source, SoundKind::Music, search_paths)
    }

    /// Load a sound effect
    pub fn load_sfx(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
        search_paths: &[PathBuf],
    ) -> Result<Rc<Sound>, AssetError> {
        self.load(backend, source, SoundKind::Effect, search_paths)
    }

    fn load(
        &mut self,
        backend: &mut dyn Backend,
        source: AssetSource<'_>,
        kind: SoundKind,
        search_paths: &[PathBuf],
    ) -> Result<Rc<Sound>, AssetError> {
        self.ensure_device(backend)?;

        let cache = match kind {
            SoundKind::Music => &mut self.music,
            SoundKind::Effect => &mut self.effects,
        };
        cache.get_or_try_insert_with(source.key(), || -> Result<_, AssetError> {
            let bytes = source.read(search_paths)?;
            let handle = backend.decode_sound(&bytes, kind)?;
            Ok(Sound { handle, kind })
        })
    }

    fn ensure_device(&mut self, backend: &mut dyn Backend) -> Result<(), BackendError> {
        if !self.device_open {
            backend.open_audio(&self.config)?;
            self.device_open = true;
            log::info!(
                "Audio device opened ({} Hz, {} channels)",
                self.config.frequency,
                self.config.channels
            );
        }
        Ok(())
    }

    /// Start playback: music loops, effects play once
    pub fn play(&self, backend: &mut dyn Backend, sound: &Sound) -> Result<(), BackendError> {
        backend.play_sound(sound.handle(), sound.kind())
    }

    /// Number of cached tracks and effects
    pub fn len(&self) -> usize {
        self.music.len() + self.effects.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.music.is_empty() && self.effects.is_empty()
    }

    /// Destroy every cached sound and close the device
    pub fn clear(&mut self, backend: &mut dyn Backend) {
        for sound in self.music.drain().chain(self.effects.drain()) {
            backend.destroy_sound(sound.handle());
        }
        if self.device_open {
            backend.close_audio();
            self.device_open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    static CLIP: [u8; 4] = *b"RIFF";

    #[test]
    fn test_device_opens_lazily() {
        let mut backend = HeadlessBackend::new();
        let mut audio = AudioCache::new(AudioConfig::default());

        assert!(!backend.audio_open());
        audio.load_sfx(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();
        assert!(backend.audio_open());
        assert!(audio.is_device_open());
    }

    #[test]
    fn test_music_and_effects_are_separate() {
        let mut backend = HeadlessBackend::new();
        let mut audio = AudioCache::new(AudioConfig::default());

        let music = audio.load_music(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();
        let effect = audio.load_sfx(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();
        let effect_again = audio.load_sfx(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();

        assert_eq!(music.kind(), SoundKind::Music);
        assert!(Rc::ptr_eq(&effect, &effect_again));
        assert_eq!(backend.sound_decodes(), 2);
        assert_eq!(audio.len(), 2);
    }

    #[test]
    fn test_play_uses_sound_kind() {
        let mut backend = HeadlessBackend::new();
        let mut audio = AudioCache::new(AudioConfig::default());

        let music = audio.load_music(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();
        audio.play(&mut backend, &music).unwrap();

        assert_eq!(backend.played_sounds(), &[(music.handle(), SoundKind::Music)]);
    }

    #[test]
    fn test_clear_closes_device() {
        let mut backend = HeadlessBackend::new();
        let mut audio = AudioCache::new(AudioConfig::default());

        audio.load_sfx(&mut backend, AssetSource::memory(&CLIP), &[]).unwrap();
        audio.clear(&mut backend);

        assert_eq!(backend.live_sounds(), 0);
        assert!(!backend.audio_open());
        assert!(audio.is_empty());
    }
}
