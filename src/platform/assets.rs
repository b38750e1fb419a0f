//! Sprite loading bookkeeping
//!
//! The host loads images however it likes and reports each one here. A failed
//! load is logged and counted as settled; the sprite then simply has no pixels.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::sim::raster::{Image, Rgba, disc};
use crate::sim::state::SpriteId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("sprite '{name}' failed to load: {reason}")]
    LoadFailed { name: String, reason: String },
    #[error("sprite '{0}' was not requested or already settled")]
    Unexpected(String),
}

/// Decoded sprite pixels by name
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<SpriteId, Image>,
}

impl SpriteAtlas {
    pub fn insert(&mut self, id: SpriteId, image: Image) {
        self.sprites.insert(id, image);
    }

    pub fn get(&self, id: &SpriteId) -> Option<&Image> {
        self.sprites.get(id)
    }

    pub fn contains(&self, id: &SpriteId) -> bool {
        self.sprites.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Tracks outstanding sprite loads until every one has settled
#[derive(Debug)]
pub struct AssetLoader {
    pending: BTreeSet<String>,
    atlas: SpriteAtlas,
    failures: Vec<AssetError>,
    announced: bool,
}

impl AssetLoader {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pending: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        log::info!("Loading {} sprites", pending.len());
        Self {
            pending,
            atlas: SpriteAtlas::default(),
            failures: Vec::new(),
            announced: false,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Record a decoded sprite
    pub fn loaded(&mut self, name: &str, image: Image) -> Result<(), AssetError> {
        if !self.pending.remove(name) {
            return Err(AssetError::Unexpected(name.to_string()));
        }
        self.atlas.insert(SpriteId::new(name), image);
        Ok(())
    }

    /// Record a failed load; it still counts toward completion
    pub fn failed(&mut self, name: &str, reason: impl Into<String>) -> Result<(), AssetError> {
        if !self.pending.remove(name) {
            return Err(AssetError::Unexpected(name.to_string()));
        }
        let error = AssetError::LoadFailed {
            name: name.to_string(),
            reason: reason.into(),
        };
        log::warn!("{}", error);
        self.failures.push(error);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// True exactly once: the first call after every load has settled
    pub fn take_completion(&mut self) -> bool {
        if self.is_complete() && !self.announced {
            self.announced = true;
            log::info!(
                "All sprites settled ({} loaded, {} failed)",
                self.atlas.len(),
                self.failures.len()
            );
            return true;
        }
        false
    }

    pub fn failures(&self) -> &[AssetError] {
        &self.failures
    }

    /// Hand over whatever loaded
    pub fn finish(self) -> SpriteAtlas {
        self.atlas
    }
}

/// Procedural disc sprites for headless runs, one colour per name
pub fn placeholder_atlas<'a>(names: impl IntoIterator<Item = &'a str>) -> SpriteAtlas {
    let mut atlas = SpriteAtlas::default();
    for name in names {
        atlas.insert(SpriteId::new(name), disc(32, placeholder_color(name)));
    }
    atlas
}

/// Stable colour derived from a sprite name (FNV-1a)
pub fn placeholder_color(name: &str) -> Rgba {
    let hash = name
        .bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    Rgba::new(
        64 + (hash & 0x7f) as u8,
        64 + ((hash >> 8) & 0x7f) as u8,
        64 + ((hash >> 16) & 0x7f) as u8,
        255,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_fires_once() {
        let mut loader = AssetLoader::new(["a", "b"]);
        assert!(!loader.take_completion());
        loader.loaded("a", Image::new(1, 1)).unwrap();
        assert!(!loader.is_complete());
        loader.failed("b", "404").unwrap();
        assert!(loader.is_complete());
        assert!(loader.take_completion());
        assert!(!loader.take_completion());
    }

    #[test]
    fn test_failure_is_not_fatal() {
        let mut loader = AssetLoader::new(["a", "b"]);
        loader.failed("a", "decode error").unwrap();
        loader.loaded("b", Image::new(2, 2)).unwrap();
        assert_eq!(loader.failures().len(), 1);
        let atlas = loader.finish();
        assert!(!atlas.contains(&SpriteId::new("a")));
        assert!(atlas.contains(&SpriteId::new("b")));
    }

    #[test]
    fn test_unexpected_and_duplicate_reports() {
        let mut loader = AssetLoader::new(["a"]);
        assert_eq!(
            loader.loaded("zzz", Image::new(1, 1)),
            Err(AssetError::Unexpected("zzz".to_string()))
        );
        loader.loaded("a", Image::new(1, 1)).unwrap();
        assert!(loader.failed("a", "late").is_err());
    }

    #[test]
    fn test_empty_set_completes_immediately() {
        let mut loader = AssetLoader::new(Vec::<String>::new());
        assert!(loader.take_completion());
    }

    #[test]
    fn test_placeholder_atlas() {
        let atlas = placeholder_atlas(["pebble", "roller"]);
        assert_eq!(atlas.len(), 2);
        let pebble = atlas.get(&SpriteId::new("pebble")).unwrap();
        assert_eq!(pebble.width(), 32);
        assert!(pebble.coverage() > 0);
        assert_ne!(placeholder_color("pebble"), placeholder_color("roller"));
    }
}
