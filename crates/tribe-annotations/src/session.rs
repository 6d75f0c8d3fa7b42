//! One editing workflow: a tracker with an explicit lifecycle.
//!
//! Asynchronous request callbacks capture a [`Generation`] when the request
//! is dispatched and mutate through [`AnnotationSession::apply`]. A `clear`
//! in between (the user navigated away) bumps the generation, so late
//! responses are rejected instead of leaking into the next session.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tribe_common::{PriorAnnotation, Result, TribeError};
use uuid::Uuid;

use crate::command::EditCommand;
use crate::events::AnnotationEvent;
use crate::tracker::{AnnotationMap, Annotations, TrackerPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token identifying the tracker contents a request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct AnnotationSession {
    id: SessionId,
    generation: u64,
    tracker: Annotations,
    event_tx: broadcast::Sender<AnnotationEvent>,
}

impl AnnotationSession {
    pub fn new(policy: TrackerPolicy, event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        let mut tracker = Annotations::with_policy(policy);
        tracker.attach_events(event_tx.clone());

        let id = SessionId(Uuid::new_v4());
        info!("Annotation session {id} created");
        Self { id, generation: 0, tracker, event_tx }
    }

    /// Session seeded with a prior version's annotations.
    pub fn from_prior<I>(policy: TrackerPolicy, event_capacity: usize, prior: I) -> Self
    where
        I: IntoIterator<Item = PriorAnnotation>,
    {
        let mut session = Self::new(policy, event_capacity);
        session.tracker.init(prior);
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    pub fn tracker(&self) -> &Annotations {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Annotations {
        &mut self.tracker
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnnotationEvent> {
        self.event_tx.subscribe()
    }

    /// Empty the tracker and invalidate every outstanding generation token.
    pub fn clear(&mut self) {
        self.tracker.clear();
        self.generation += 1;
        info!("Annotation session {} cleared (generation {})", self.id, self.generation);
    }

    /// Run `f` against the tracker if `token` is still current.
    pub fn apply<T, F>(&mut self, token: Generation, f: F) -> Result<T>
    where
        F: FnOnce(&mut Annotations) -> Result<T>,
    {
        if token.0 != self.generation {
            warn!(
                "Dropping stale response for session {} (issued at generation {}, now {})",
                self.id, token.0, self.generation
            );
            return Err(TribeError::StaleGeneration {
                expected: token.0,
                current: self.generation,
            });
        }
        f(&mut self.tracker)
    }

    /// Perform one scripted user action. `Clear` goes through the session so
    /// the generation advances.
    pub fn run(&mut self, command: &EditCommand) -> Result<()> {
        match command {
            EditCommand::Clear => {
                self.clear();
                Ok(())
            }
            other => other.apply(&mut self.tracker),
        }
    }

    /// End the session, handing back the working set.
    pub fn dispose(self) -> AnnotationMap {
        info!("Annotation session {} disposed", self.id);
        self.tracker.into_working_set()
    }
}
