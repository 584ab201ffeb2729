//! Standard competition ranking ("1224") over elapsed times.

use crate::time::RaceTime;

/// Anything that can take a place in a standings pool.
pub trait Rankable {
    fn ranking_time(&self) -> RaceTime;

    /// Whether the entry's verdict allows it to be placed at all.
    fn is_eligible(&self) -> bool;

    fn is_rankable(&self) -> bool {
        self.is_eligible() && self.ranking_time().is_finite()
    }
}

/// An entry paired with its position; `None` means unranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed<T> {
    pub entry: T,
    pub position: Option<u32>,
}

/// Ranks a pool: placed entries first by ascending time, then every
/// unrankable entry in arrival order with no position.
pub fn rank<T: Rankable>(pool: Vec<T>) -> Vec<Placed<T>> {
    let (mut rankable, unrankable): (Vec<T>, Vec<T>) =
        pool.into_iter().partition(|entry| entry.is_rankable());

    // Stable, so exact ties keep arrival order.
    rankable.sort_by_key(|entry| entry.ranking_time());

    let mut placed = assign_positions(rankable);
    placed.extend(
        unrankable
            .into_iter()
            .map(|entry| Placed { entry, position: None }),
    );
    placed
}

/// Assigns positions over an already sorted sequence. Equal times share the
/// predecessor's position; otherwise the position is index + 1, so ties
/// consume rank numbers.
pub fn assign_positions<T: Rankable>(sorted: Vec<T>) -> Vec<Placed<T>> {
    let mut placed: Vec<Placed<T>> = Vec::with_capacity(sorted.len());

    for (index, entry) in sorted.into_iter().enumerate() {
        let position = match placed.last() {
            Some(previous) if previous.entry.ranking_time() == entry.ranking_time() => {
                previous.position
            }
            _ => u32::try_from(index + 1).ok(),
        };
        placed.push(Placed { entry, position });
    }

    placed
}
