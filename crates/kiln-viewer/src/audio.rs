//! Sound effect playback (Kira backend)
//!
//! Wraps Kira's AudioManager with a sound cache. Degrades gracefully when no
//! audio device is available: loads still populate the cache, plays are
//! silently dropped.

use kiln_core::{KilnError, Result};
use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use std::collections::HashMap;
use std::path::Path;

/// Plays cached one-shot sound effects
pub struct AudioPlayer {
    manager: Option<AudioManager<DefaultBackend>>,
    sound_cache: HashMap<String, StaticSoundData>,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer {
    pub fn new() -> Self {
        // Try to create the audio manager; gracefully fail if no device
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| eprintln!("Audio: no device available ({e}), running silent"))
            .ok();

        Self {
            manager,
            sound_cache: HashMap::new(),
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Load a sound file into the cache
    pub fn load_sound(&mut self, name: &str, path: &Path) -> Result<()> {
        if self.sound_cache.contains_key(name) {
            return Ok(());
        }

        let sound_data = StaticSoundData::from_file(path).map_err(|e| {
            KilnError::AudioError(format!("Failed to load '{}': {}", path.display(), e))
        })?;

        self.sound_cache.insert(name.to_string(), sound_data);
        Ok(())
    }

    /// Play a cached sound. Unknown names and missing devices are no-ops.
    pub fn play(&mut self, name: &str) {
        let Some(manager) = &mut self.manager else {
            return;
        };
        let Some(sound) = self.sound_cache.get(name) else {
            return;
        };

        if let Err(e) = manager.play(sound.clone()) {
            eprintln!("Audio: failed to play '{name}': {e}");
        }
    }
}
