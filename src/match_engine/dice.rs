//! Injected randomness.
//!
//! Every die roll and shuffle in the engine goes through [`Dice`], so a
//! seeded `StdRng` reproduces a whole match and [`LoadedDice`] can script
//! exact roll sequences.

use rand::Rng;

pub trait Dice {
    /// Roll one die with `sides` faces, returning `1..=sides`.
    fn roll(&mut self, sides: u8) -> u8;

    /// Pick an index in `0..=max`, used by the deck shuffle.
    fn pick(&mut self, max: usize) -> usize;

    fn d6(&mut self) -> u8 {
        self.roll(6)
    }

    /// Tens die then units die, giving 11..=66.
    fn d66(&mut self) -> u8 {
        let tens = self.d6();
        let units = self.d6();
        tens * 10 + units
    }
}

impl<R: Rng + ?Sized> Dice for R {
    fn roll(&mut self, sides: u8) -> u8 {
        self.gen_range(1..=sides.max(1))
    }

    fn pick(&mut self, max: usize) -> usize {
        self.gen_range(0..=max)
    }
}

/// Scripted dice. Rolls cycle through the script (an empty script always
/// rolls 1) and shuffles never reorder anything.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
    script: Vec<u8>,
    cursor: usize,
}

impl LoadedDice {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self { script: script.into(), cursor: 0 }
    }

    /// Script d66 results, each split into its tens and units die.
    pub fn d66s(rolls: &[u8]) -> Self {
        Self::new(rolls.iter().flat_map(|r| [r / 10, r % 10]).collect::<Vec<_>>())
    }

    pub fn rolls_used(&self) -> usize {
        self.cursor
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self, sides: u8) -> u8 {
        if self.script.is_empty() {
            return 1;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value.clamp(1, sides.max(1))
    }

    fn pick(&mut self, max: usize) -> usize {
        max
    }
}
