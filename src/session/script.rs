//! Scripted interactions, used to replay a sequence of drags from a file.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{SchedulingSession, SessionError};
use crate::grid::CellRef;
use crate::mediator::{Container, DragEnd};
use crate::models::PlayerId;

/// One user gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Gesture {
    /// Pick a chip up from `from` and release it over `to`
    Drag {
        player: PlayerId,
        from: Container,
        to: Container,
    },
    Captain {
        cell: CellRef,
        player: PlayerId,
    },
}

/// What one gesture did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepResult {
    Drag { end: DragEnd },
    Captain { changed: bool },
    Failed { error: String },
}

impl SchedulingSession {
    /// Apply gestures in order, awaiting each server write before the next
    /// step. A failing step is recorded and the replay continues.
    pub async fn replay(&mut self, gestures: &[Gesture]) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(gestures.len());

        for (i, gesture) in gestures.iter().enumerate() {
            let result = match self.apply(gesture).await {
                Ok(step) => step,
                Err(e) => {
                    warn!("Step {} ({:?}) failed: {}", i + 1, gesture, e);
                    StepResult::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(result);
        }

        info!("Replayed {} gestures", gestures.len());
        results
    }

    async fn apply(&mut self, gesture: &Gesture) -> Result<StepResult, SessionError> {
        match *gesture {
            Gesture::Drag { player, from, to } => {
                self.pick_up(player, from)?;
                let end = self.release(to)?.delivered().await;
                Ok(StepResult::Drag { end })
            }
            Gesture::Captain { cell, player } => {
                let changed = self.set_captain(cell, player).await?;
                Ok(StepResult::Captain { changed })
            }
        }
    }
}
