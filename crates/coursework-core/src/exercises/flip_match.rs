//! Memory matching game: find every pair of symbols by flipping two cards
//! at a time.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

/// How long a mismatched pair stays face up.
pub const MISMATCH_HIDE_DELAY: Duration = Duration::from_millis(800);

pub struct Category {
    pub label: &'static str,
    pub symbols: [&'static str; 8],
}

pub static CATEGORIES: [Category; 4] = [
    Category {
        label: "Nature",
        symbols: ["☘️", "🏕️", "🌿", "🌲", "🌳", "🌾", "🌴", "🍃"],
    },
    Category {
        label: "Foods",
        symbols: ["🍔", "🥤", "🥗", "🍗", "🍟", "🥓", "🥞", "🍲"],
    },
    Category {
        label: "Animals",
        symbols: ["🐹", "🦊", "🦁", "🦓", "🐱", "🐶", "🐯", "🐼"],
    },
    Category {
        label: "Dessert",
        symbols: ["🍧", "🍨", "🧁", "🍰", "🍫", "🍩", "🍦", "🍹"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Flipped,
    Matched,
}

/// What a flip did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Flip ignored (two cards already up, card already showing, or out of range)
    Ignored,
    /// First card of a pair turned over
    FirstCard,
    /// Second card matched the first
    Matched,
    /// Second card did not match; call `hide_mismatch` after the delay
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct FlipMatch {
    category: usize,
    cards: Vec<&'static str>,
    states: Vec<CardState>,
    flipped: Vec<usize>,
    moves: usize,
}

impl FlipMatch {
    /// New shuffled game for the category at `category` (clamped to a valid index)
    pub fn new(category: usize) -> Self {
        Self::with_rng(category, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(category: usize, rng: &mut R) -> Self {
        let category = category.min(CATEGORIES.len() - 1);
        let symbols = &CATEGORIES[category].symbols;
        let mut cards: Vec<&'static str> = symbols.iter().chain(symbols.iter()).copied().collect();
        cards.shuffle(rng);
        Self::from_deck(category, cards)
    }

    /// Game over an explicit deck
    pub fn from_deck(category: usize, cards: Vec<&'static str>) -> Self {
        let states = vec![CardState::Hidden; cards.len()];
        Self {
            category,
            cards,
            states,
            flipped: Vec::with_capacity(2),
            moves: 0,
        }
    }

    /// Replace this game with a freshly shuffled one
    pub fn new_game(&mut self, category: usize) {
        *self = Self::new(category);
    }

    pub fn category(&self) -> &'static Category {
        &CATEGORIES[self.category.min(CATEGORIES.len() - 1)]
    }

    pub fn category_index(&self) -> usize {
        self.category
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<CardState> {
        self.states.get(index).copied()
    }

    /// The symbol if the card is face up
    pub fn visible_symbol(&self, index: usize) -> Option<&'static str> {
        match self.states.get(index)? {
            CardState::Hidden => None,
            CardState::Flipped | CardState::Matched => self.cards.get(index).copied(),
        }
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.states.iter().filter(|s| **s == CardState::Matched).count() / 2
    }

    /// A mismatched pair is waiting to be turned back over
    pub fn has_pending_mismatch(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn is_complete(&self) -> bool {
        !self.states.is_empty() && self.states.iter().all(|s| *s == CardState::Matched)
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.flipped.len() == 2 {
            return FlipOutcome::Ignored;
        }
        match self.states.get(index) {
            Some(CardState::Hidden) => {}
            _ => return FlipOutcome::Ignored,
        }

        self.states[index] = CardState::Flipped;
        self.flipped.push(index);

        if self.flipped.len() < 2 {
            return FlipOutcome::FirstCard;
        }

        self.moves += 1;
        let (first, second) = (self.flipped[0], self.flipped[1]);
        if self.cards[first] == self.cards[second] {
            self.states[first] = CardState::Matched;
            self.states[second] = CardState::Matched;
            self.flipped.clear();
            FlipOutcome::Matched
        } else {
            FlipOutcome::Mismatch
        }
    }

    /// Turn a mismatched pair face down again
    pub fn hide_mismatch(&mut self) {
        if self.flipped.len() != 2 {
            return;
        }
        for index in self.flipped.drain(..) {
            if self.states[index] == CardState::Flipped {
                self.states[index] = CardState::Hidden;
            }
        }
    }
}
