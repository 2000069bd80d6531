//! Direction selection shared by every rule in the tactics layer.
//!
//! The [`MoveSelector`] scores the position each candidate direction leads to
//! and keeps the best one. Ties are broken by the fixed enumeration order of
//! [`Direction::ALL`], whatever order the candidates arrive in, so the same
//! situation always produces the same move.

use game_core::{Direction, Position};

/// Whether a lower or a higher score is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    fn improves<S: Ord>(self, candidate: &S, best: &S) -> bool {
        match self {
            Objective::Minimize => candidate < best,
            Objective::Maximize => candidate > best,
        }
    }
}

/// Picks one direction out of a candidate set.
///
/// The selector never checks legality: callers pass the directions the world
/// reported as legal, and treat a rejected commit as "no move available".
pub struct MoveSelector;

impl MoveSelector {
    /// Returns the candidate whose resulting position scores best.
    ///
    /// Candidates are visited in [`Direction::ALL`] order and only a strictly
    /// better score replaces the current best, so the earliest direction wins
    /// a tie. Returns `None` for an empty candidate set.
    pub fn select<S, F>(
        origin: Position,
        candidates: &[Direction],
        objective: Objective,
        mut score: F,
    ) -> Option<Direction>
    where
        S: Ord + core::fmt::Debug,
        F: FnMut(Position) -> S,
    {
        let mut best: Option<(Direction, S)> = None;

        for direction in Direction::ALL {
            if !candidates.contains(&direction) {
                continue;
            }
            let value = score(origin.step(direction));
            tracing::trace!("  {:?} -> {:?}", direction, value);

            let replace = match &best {
                None => true,
                Some((_, best_value)) => objective.improves(&value, best_value),
            };
            if replace {
                best = Some((direction, value));
            }
        }

        best.map(|(direction, _)| direction)
    }

    /// Like [`MoveSelector::select`], but only among candidates whose resulting
    /// position satisfies `filter`.
    pub fn select_where<S, F, P>(
        origin: Position,
        candidates: &[Direction],
        objective: Objective,
        mut filter: P,
        score: F,
    ) -> Option<Direction>
    where
        S: Ord + core::fmt::Debug,
        F: FnMut(Position) -> S,
        P: FnMut(Position) -> bool,
    {
        let narrowed: arrayvec::ArrayVec<Direction, 9> = candidates
            .iter()
            .copied()
            .filter(|direction| filter(origin.step(*direction)))
            .take(9)
            .collect();
        Self::select(origin, &narrowed, objective, score)
    }

    /// Direction that brings `origin` closest to `target` (Chebyshev).
    pub fn toward(
        origin: Position,
        candidates: &[Direction],
        target: Position,
    ) -> Option<Direction> {
        Self::select(origin, candidates, Objective::Minimize, |position| {
            position.chebyshev(target)
        })
    }
}
