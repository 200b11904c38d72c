//! The single active drag gesture and its lifecycle events

use std::sync::mpsc::Receiver;

use tracing::debug;

use crate::events::Subscribers;
use crate::layout::DropIntent;
use crate::model::{ElementId, ElementType, GridPosition};

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A new element from the palette
    Palette { element_type: ElementType },
    /// An element already on the canvas
    Existing { id: ElementId, origin: GridPosition },
}

impl DragSource {
    pub fn existing_id(&self) -> Option<&ElementId> {
        match self {
            DragSource::Existing { id, .. } => Some(id),
            DragSource::Palette { .. } => None,
        }
    }
}

/// An active drag gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub source: DragSource,
    /// Selection at the moment the drag started
    pub prior_selection: Option<ElementId>,
}

/// Lifecycle notification
///
/// `Ended` is always the last event of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Started(DragSession),
    DropIntent(Option<DropIntent>),
    Ended { session: DragSession, committed: bool },
}

/// Outcome of ending a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEnd {
    pub session: DragSession,
    /// Last published intent
    pub intent: Option<DropIntent>,
    /// Selection to restore, if the drag should not keep the dragged element selected
    pub restore_selection: Option<ElementId>,
}

/// Owner of the at-most-one drag session
#[derive(Debug, Default)]
pub struct DragCoordinator {
    session: Option<DragSession>,
    intent: Option<DropIntent>,
    subscribers: Subscribers<DragEvent>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<DragEvent> {
        self.subscribers.subscribe()
    }

    /// Start a session; ignored while another one is active
    pub fn begin_session(
        &mut self,
        source: DragSource,
        current_selection: Option<ElementId>,
    ) -> bool {
        if self.session.is_some() {
            debug!("drag already active, ignoring new session");
            return false;
        }

        let session = DragSession {
            source,
            prior_selection: current_selection,
        };
        debug!(source = ?session.source, "drag started");
        self.session = Some(session.clone());
        self.intent = None;
        self.subscribers.publish(DragEvent::Started(session));
        true
    }

    /// The active session, if any
    pub fn current_drag_data(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Last published intent
    pub fn drop_intent(&self) -> Option<&DropIntent> {
        self.intent.as_ref()
    }

    /// Publish a new intent if it differs by value from the last one
    pub fn update_drop_intent(&mut self, intent: Option<DropIntent>) -> bool {
        if self.session.is_none() || self.intent == intent {
            return false;
        }
        debug!(intent = ?intent, "drop intent changed");
        self.intent = intent.clone();
        self.subscribers.publish(DragEvent::DropIntent(intent));
        true
    }

    /// End the active session and report what happened
    pub fn end_session(&mut self, committed: bool) -> Option<SessionEnd> {
        let session = self.session.take()?;
        let intent = self.intent.take();

        let restore_selection = match &session.source {
            DragSource::Existing { id, .. } if !committed => session
                .prior_selection
                .clone()
                .filter(|prior| prior != id),
            _ => None,
        };

        debug!(committed, "drag ended");
        self.subscribers.publish(DragEvent::Ended {
            session: session.clone(),
            committed,
        });

        Some(SessionEnd {
            session,
            intent,
            restore_selection,
        })
    }
}
