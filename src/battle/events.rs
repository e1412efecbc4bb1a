//! Turn and selection notifications
//!
//! Collaborators (UI, replay logs) register a listener once per battlefield.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::types::{SoldierId, TeamId};

/// Capability notified on battlefield transitions
pub trait BattlefieldListener {
    /// The acting soldier changed (or was cleared)
    fn current_soldier_changed(&mut self, _soldier: Option<SoldierId>) {}

    /// A turn ended; `next_team` acts now
    fn turn_ended(&mut self, _next_team: TeamId) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlefieldEvent {
    CurrentSoldierChanged(Option<SoldierId>),
    TurnEnded(TeamId),
}

/// Listener that records every notification in a shared log
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<BattlefieldEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<BattlefieldEvent> {
        self.events.borrow().clone()
    }

    pub fn turns_ended(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, BattlefieldEvent::TurnEnded(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl BattlefieldListener for EventRecorder {
    fn current_soldier_changed(&mut self, soldier: Option<SoldierId>) {
        self.events
            .borrow_mut()
            .push(BattlefieldEvent::CurrentSoldierChanged(soldier));
    }

    fn turn_ended(&mut self, next_team: TeamId) {
        self.events.borrow_mut().push(BattlefieldEvent::TurnEnded(next_team));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_clones_share_log() {
        let recorder = EventRecorder::new();
        let mut handle = recorder.clone();
        handle.turn_ended(TeamId::ENEMY);
        handle.current_soldier_changed(Some(SoldierId(3)));

        assert_eq!(
            recorder.events(),
            vec![
                BattlefieldEvent::TurnEnded(TeamId::ENEMY),
                BattlefieldEvent::CurrentSoldierChanged(Some(SoldierId(3))),
            ]
        );
        assert_eq!(recorder.turns_ended(), 1);

        recorder.clear();
        assert!(handle.events().is_empty());
    }
}
