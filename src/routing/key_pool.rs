//! Uniform random key selection.

use rand::Rng;

/// Immutable set of interchangeable upstream API keys.
///
/// Selection draws from the thread-local RNG, so concurrent requests share
/// no counter or seed.
#[derive(Clone, Default)]
pub struct KeyPool {
    keys: Vec<String>,
}

/// A key drawn from the pool, with its position for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickedKey<'a> {
    pub index: usize,
    pub key: &'a str,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pick one key uniformly at random. `None` if the pool is empty.
    pub fn pick(&self) -> Option<PickedKey<'_>> {
        self.pick_with(&mut rand::thread_rng())
    }

    /// Pick with a caller-supplied RNG.
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PickedKey<'_>> {
        if self.keys.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.keys.len());
        Some(PickedKey {
            index,
            key: &self.keys[index],
        })
    }
}

// Keys never show up in debug output.
impl std::fmt::Debug for KeyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPool").field("len", &self.keys.len()).finish()
    }
}
