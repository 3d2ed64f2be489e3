use tracing::{debug, info};

use crate::match_engine::dice::Dice;
use crate::match_engine::error::{MatchError, Result};
use crate::match_engine::models::{Fac, FacKind};

/// The Fast Action Card deck.
///
/// `cards[..cursor]` is the discard pool and `cards[cursor..]` the draw pile.
/// When the draw pile runs dry the whole deck is reshuffled, so drawing only
/// fails when the deck holds no cards at all.
pub struct FacDeck {
    cards: Vec<Fac>,
    cursor: usize,
}

impl FacDeck {
    /// Build a deck in the given order. Call [`FacDeck::shuffle`] before play.
    pub fn new(cards: Vec<Fac>) -> Self {
        FacDeck { cards, cursor: 0 }
    }

    /// Build a deck and shuffle it with `dice`.
    pub fn new_shuffled<D: Dice + ?Sized>(cards: Vec<Fac>, dice: &mut D) -> Self {
        let mut deck = FacDeck::new(cards);
        deck.shuffle(dice);
        deck
    }

    /// Gather the discard pool back in and Fisher-Yates shuffle everything.
    pub fn shuffle<D: Dice + ?Sized>(&mut self, dice: &mut D) {
        for i in (1..self.cards.len()).rev() {
            let j = dice.pick(i);
            self.cards.swap(i, j);
        }
        self.cursor = 0;
        debug!(cards = self.cards.len(), "deck shuffled");
    }

    /// Put every card back for a new match.
    pub fn reset<D: Dice + ?Sized>(&mut self, dice: &mut D) {
        info!(cards = self.cards.len(), "deck reset");
        self.shuffle(dice);
    }

    /// Draw the next card, reshuffling the discard pool if the pile is empty.
    pub fn draw<D: Dice + ?Sized>(&mut self, dice: &mut D) -> Result<Fac> {
        if self.cards.is_empty() {
            return Err(MatchError::ExhaustedDeck { draws: 0, empty: true });
        }
        if self.cursor == self.cards.len() {
            info!(discarded = self.cursor, "draw pile empty, reshuffling discard pool");
            self.shuffle(dice);
        }
        let card = self.cards[self.cursor].clone();
        self.cursor += 1;
        debug!(card_id = card.id, kind = %card.kind, control = card.control, "card drawn");
        Ok(card)
    }

    /// Cards left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn discarded(&self) -> &[Fac] {
        &self.cards[..self.cursor]
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards_of_kind(&self, kind: FacKind) -> impl Iterator<Item = &Fac> + '_ {
        self.cards.iter().filter(move |c| c.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::dice::LoadedDice;
    use crate::match_engine::models::{PointSpec, Skill};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cards(n: u32) -> Vec<Fac> {
        (1..=n)
            .map(|id| Fac::new(id, FacKind::Skill(Skill::Agile), PointSpec::Flat(1)))
            .collect()
    }

    #[test]
    fn shuffle_keeps_every_card_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut deck = FacDeck::new_shuffled(cards(40), &mut rng);
        let mut ids: Vec<u32> = (0..40).map(|_| deck.draw(&mut rng).unwrap().id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_with_seed() {
        let order = |seed: u64| -> Vec<u32> {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut deck = FacDeck::new_shuffled(cards(20), &mut rng);
            (0..5).map(|_| deck.draw(&mut rng).unwrap().id).collect()
        };
        assert_eq!(order(99), order(99));
        assert_ne!(order(99), order(100));
    }

    #[test]
    fn empty_pile_reshuffles_discards() {
        let mut dice = LoadedDice::default();
        let mut deck = FacDeck::new(cards(3));
        for _ in 0..3 {
            deck.draw(&mut dice).unwrap();
        }
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.discarded().len(), 3);

        deck.draw(&mut dice).unwrap();
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.discarded().len(), 1);
    }

    #[test]
    fn deck_without_cards_is_exhausted() {
        let mut deck = FacDeck::new(Vec::new());
        let err = deck.draw(&mut LoadedDice::default()).unwrap_err();
        assert!(matches!(err, MatchError::ExhaustedDeck { draws: 0, empty: true }));
    }

    #[test]
    fn loaded_dice_keep_deck_order() {
        let mut dice = LoadedDice::default();
        let mut deck = FacDeck::new_shuffled(cards(4), &mut dice);
        let ids: Vec<u32> = (0..4).map(|_| deck.draw(&mut dice).unwrap().id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
