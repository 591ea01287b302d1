//! Deterministic random streams.
//!
//! Every draw that affects generated content must come from [`RogueRng`] so
//! that a save replays identically. The generator is a 32-bit LCG with the
//! high half returned, which keeps the whole state in one integer and makes
//! snapshots trivially cheap.
//!
//! Draws that must not disturb what the next caller observes are wrapped in
//! an [`RngGuard`] (or [`RogueRng::preview`]), which puts the state back when
//! it goes out of scope, whatever the exit path.

use serde::{Deserialize, Serialize};

const LCG_MULTIPLIER: u32 = 1_103_515_245;
const LCG_INCREMENT: u32 = 24_691;

const RUN_SEED_MULTIPLIER: u32 = 23_151;
const RUN_SEED_INCREMENT: u32 = 29_867;

/// Tag carried by every draw call.
///
/// All tags currently read the same stream; the tag only documents intent at
/// the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamTag {
    #[default]
    Default,
    Trainers,
    Overworld,
    Items,
    Encounters,
}

/// A captured RNG state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot(u32);

/// Seeded pseudo-random source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RogueRng {
    state: u32,
}

impl RogueRng {
    /// Create a generator seeded with `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the generator and return the next 16-bit value.
    pub fn next_u16(&mut self) -> u16 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        (self.state >> 16) as u16
    }

    /// Draw an integer in `[0, range)`.
    ///
    /// A value is always consumed, so `range <= 1` still advances the stream
    /// before returning 0.
    pub fn range(&mut self, range: u16, _tag: StreamTag) -> u16 {
        let value = self.next_u16();
        if range <= 1 {
            return 0;
        }
        value % range
    }

    /// Return true with `chance` percent probability.
    ///
    /// `0` is always false and `>= 100` always true; neither consumes a value.
    pub fn chance(&mut self, chance: u8, tag: StreamTag) -> bool {
        if chance == 0 {
            return false;
        }
        if chance >= 100 {
            return true;
        }
        self.range(100, tag) + 1 <= chance as u16
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> RngSnapshot {
        RngSnapshot(self.state)
    }

    /// Put the generator back to a captured state.
    pub fn restore(&mut self, snapshot: RngSnapshot) {
        self.state = snapshot.0;
    }

    /// Borrow the generator with automatic restore on drop.
    pub fn guard(&mut self) -> RngGuard<'_> {
        let snapshot = self.snapshot();
        RngGuard { rng: self, snapshot }
    }

    /// Run `f` against the generator, then rewind it.
    pub fn preview<T>(&mut self, f: impl FnOnce(&mut RogueRng) -> T) -> T {
        let mut guard = self.guard();
        f(&mut guard)
    }
}

/// Restores the wrapped generator to its captured state when dropped.
pub struct RngGuard<'a> {
    rng: &'a mut RogueRng,
    snapshot: RngSnapshot,
}

impl RngGuard<'_> {
    /// State captured when the guard was created.
    pub fn snapshot(&self) -> RngSnapshot {
        self.snapshot
    }
}

impl std::ops::Deref for RngGuard<'_> {
    type Target = RogueRng;

    fn deref(&self) -> &RogueRng {
        self.rng
    }
}

impl std::ops::DerefMut for RngGuard<'_> {
    fn deref_mut(&mut self) -> &mut RogueRng {
        self.rng
    }
}

impl Drop for RngGuard<'_> {
    fn drop(&mut self) {
        self.rng.restore(self.snapshot);
    }
}

/// The primary stream plus the run-scoped stream it seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    primary: RogueRng,
    run: RogueRng,
    base_seed: u16,
}

impl GameRng {
    /// Create both streams. The run stream starts from base seed 0.
    pub fn new(seed: u32) -> Self {
        let mut rng = Self {
            primary: RogueRng::new(seed),
            run: RogueRng::new(0),
            base_seed: 0,
        };
        rng.reseed_run(0);
        rng
    }

    /// Draw a fresh base seed from the primary stream and reseed the run
    /// stream from it. Returns the base seed.
    pub fn start_run(&mut self) -> u16 {
        let base_seed = self.primary.next_u16();
        self.reseed_run(base_seed);
        log::debug!("run stream seeded from base seed {base_seed}");
        base_seed
    }

    /// Reseed the run stream from a stored base seed, e.g. on load.
    pub fn reseed_run(&mut self, base_seed: u16) {
        self.base_seed = base_seed;
        self.run = RogueRng::new(
            (base_seed as u32)
                .wrapping_mul(RUN_SEED_MULTIPLIER)
                .wrapping_add(RUN_SEED_INCREMENT),
        );
    }

    /// Base seed the run stream was last derived from.
    pub fn base_seed(&self) -> u16 {
        self.base_seed
    }

    pub fn primary(&mut self) -> &mut RogueRng {
        &mut self.primary
    }

    pub fn run(&mut self) -> &mut RogueRng {
        &mut self.run
    }
}
