//! Proximity evaluation for hunts.
//!
//! Decides what a position fix means for a hunter's progress: which clue
//! is currently targeted, whether the fix lands inside its radius, and
//! when the hunt switches to seeking the final destination.

use std::collections::HashSet;

use uuid::Uuid;

use super::types::{Clue, Coordinates, Mission, ProgressSummary};
use crate::geo::within_radius;

/// Proximity engine.
///
/// Stateless; all progress state comes from the caller so evaluation
/// stays deterministic and testable.
pub struct ProximityEngine {
    destination_radius_m: f64,
}

/// What one position fix means for the hunt.
#[derive(Debug, Clone)]
pub enum ProximityOutcome {
    /// Outside the radius of the targeted clue.
    Seeking { clue: Clue, distance_m: f64 },
    /// Inside the radius of the targeted clue.
    ClueReached { clue: Clue, distance_m: f64 },
    /// Every required clue is done; still outside the destination radius.
    SeekingDestination { distance_m: f64 },
    /// Every required clue is done and the fix is at the destination.
    Arrived { distance_m: f64 },
}

impl ProximityEngine {
    pub fn new(destination_radius_m: f64) -> Self {
        Self {
            destination_radius_m,
        }
    }

    /// The clue a hunter should head for: the uncompleted required clue
    /// with the lowest order. Optional clues are never targeted.
    pub fn next_target<'a>(
        &self,
        clues: &'a [Clue],
        completed: &HashSet<Uuid>,
    ) -> Option<&'a Clue> {
        clues
            .iter()
            .filter(|c| c.required && !completed.contains(&c.id))
            .min_by_key(|c| c.clue_order)
    }

    /// Evaluate one position fix against the hunt state.
    ///
    /// A mission without required clues goes straight to destination
    /// seeking.
    pub fn evaluate(
        &self,
        mission: &Mission,
        clues: &[Clue],
        completed: &HashSet<Uuid>,
        position: Coordinates,
    ) -> ProximityOutcome {
        match self.next_target(clues, completed) {
            Some(clue) => {
                let distance_m = position.distance_to(clue.position());

                if within_radius(distance_m, clue.radius_m) {
                    ProximityOutcome::ClueReached {
                        clue: clue.clone(),
                        distance_m,
                    }
                } else {
                    ProximityOutcome::Seeking {
                        clue: clue.clone(),
                        distance_m,
                    }
                }
            }
            None => {
                let distance_m = position.distance_to(mission.destination());

                if within_radius(distance_m, self.destination_radius_m) {
                    ProximityOutcome::Arrived { distance_m }
                } else {
                    ProximityOutcome::SeekingDestination { distance_m }
                }
            }
        }
    }

    /// Progress counters over required clues.
    pub fn progress(&self, clues: &[Clue], completed: &HashSet<Uuid>) -> ProgressSummary {
        let total = clues.iter().filter(|c| c.required).count();
        let done = clues
            .iter()
            .filter(|c| c.required && completed.contains(&c.id))
            .count();

        ProgressSummary {
            completed: done,
            total,
            next_order: self.next_target(clues, completed).map(|c| c.clue_order),
        }
    }
}
