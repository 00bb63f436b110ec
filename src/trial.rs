//! Offers and behavioral outcomes.
//!
//! [`TrialType`] encodes what was on the table (drop counts of juice A and
//! B, and which side A appeared on); [`TrialResult`] adds what the animal
//! did. "No choice" is a first-class [`Choice`] variant, not a null — trials
//! can be abandoned, and downstream analysis must see that explicitly.
use std::fmt;

// ── Choice ───────────────────────────────────────────────────────────────

/// The behavioral outcome of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// The animal chose option A.
    A,
    /// The animal chose option B.
    B,
    /// The trial ended without a choice.
    NoChoice,
}

impl Choice {
    /// `Some(true)` for A, `Some(false)` for B, `None` for no choice.
    pub fn chose_a(self) -> Option<bool> {
        match self {
            Choice::A => Some(true),
            Choice::B => Some(false),
            Choice::NoChoice => None,
        }
    }
}

// ── TrialType ────────────────────────────────────────────────────────────

/// The offer configuration of a trial: `n_a` drops of A versus `n_b` drops
/// of B, with A presented on the left iff `left_a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialType {
    pub n_a: u32,
    pub n_b: u32,
    pub left_a: bool,
}

impl TrialType {
    pub fn new(n_a: u32, n_b: u32, left_a: bool) -> TrialType {
        TrialType { n_a, n_b, left_a }
    }

    /// A forced trial offers exactly one real option (one count is zero).
    ///
    /// ```
    /// use ecotrial::TrialType;
    ///
    /// assert!(TrialType::new(0, 3, true).is_forced());
    /// assert!(!TrialType::new(2, 3, true).is_forced());
    /// assert!(!TrialType::new(0, 0, true).is_forced());
    /// ```
    pub fn is_forced(&self) -> bool {
        (self.n_a == 0) != (self.n_b == 0)
    }
}

// ── TrialResult ──────────────────────────────────────────────────────────

/// Offer configuration plus the recorded choice.
///
/// The offer fields are stored by value: a `TrialResult` built from a
/// [`TrialType`] does not reference it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialResult {
    pub offer: TrialType,
    pub choice: Choice,
}

impl TrialResult {
    pub fn new(n_a: u32, n_b: u32, left_a: bool, choice: Choice) -> TrialResult {
        TrialResult { offer: TrialType::new(n_a, n_b, left_a), choice }
    }

    /// Copy the offer fields out of an existing [`TrialType`].
    pub fn from_offer(offer: TrialType, choice: Choice) -> TrialResult {
        TrialResult { offer, choice }
    }

    pub fn n_a(&self) -> u32 {
        self.offer.n_a
    }

    pub fn n_b(&self) -> u32 {
        self.offer.n_b
    }

    pub fn left_a(&self) -> bool {
        self.offer.left_a
    }

    /// True iff the animal made any choice at all.
    pub fn made_choice(&self) -> bool {
        self.choice != Choice::NoChoice
    }

    /// True for a forced-choice trial (see [`TrialType::is_forced`]).
    pub fn is_forced(&self) -> bool {
        self.offer.is_forced()
    }

    /// True iff this is a forced trial and the recorded choice selected the
    /// absent (zero-quantity) option.
    pub fn is_wrong(&self) -> bool {
        self.is_forced()
            && match self.choice {
                Choice::A => self.offer.n_a == 0,
                Choice::B => self.offer.n_b == 0,
                Choice::NoChoice => false,
            }
    }
}

impl fmt::Display for TrialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chose_a = match self.choice {
            Choice::A => "true",
            Choice::B => "false",
            Choice::NoChoice => "missing",
        };
        write!(
            f,
            "TrialResult(nA={}, nB={}, leftA={}, choseA={})",
            self.offer.n_a, self.offer.n_b, self.offer.left_a, chose_a
        )
    }
}
