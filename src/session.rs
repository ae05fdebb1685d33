//! Drives a [`Viewer`] from a message channel, resolving frame requests
//! concurrently so input is never blocked by a decode.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::DecodeRenderBackend;
use crate::controls::ViewerView;
use crate::message::Message;
use crate::viewer::{PaintOutcome, Viewer};

/// Sent after every handled message and every finished decode.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// `None` when the event follows a message rather than a decode
    pub outcome: Option<PaintOutcome>,
    pub prevent_default: bool,
    pub view: ViewerView,
}

pub struct ViewerSession<B> {
    viewer: Viewer<B>,
    commands: UnboundedReceiver<Message>,
    events: UnboundedSender<SessionEvent>,
}

impl<B: DecodeRenderBackend> ViewerSession<B> {
    pub fn new(
        viewer: Viewer<B>,
    ) -> (
        Self,
        UnboundedSender<Message>,
        UnboundedReceiver<SessionEvent>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Self {
            viewer,
            commands: command_rx,
            events: event_tx,
        };
        (session, command_tx, event_rx)
    }

    /// Run until [`Message::Unmount`] arrives or every sender is dropped.
    ///
    /// After the channel closes, decodes still in flight are completed before
    /// the viewer is handed back. After an unmount they are dropped.
    pub async fn run(self) -> Viewer<B> {
        let Self {
            mut viewer,
            mut commands,
            events,
        } = self;
        let mut in_flight = FuturesUnordered::new();

        if viewer.painted_index() != Some(viewer.current_index()) {
            if let Some(request) = viewer.request_current() {
                in_flight.push(request.resolve());
            }
        }

        loop {
            tokio::select! {
                message = commands.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    let unmount = matches!(message, Message::Unmount);
                    let update = viewer.update(message).await;
                    if let Some(request) = update.request {
                        in_flight.push(request.resolve());
                    }
                    emit(&events, &viewer, None, update.prevent_default);
                    if unmount {
                        log::debug!("Session ended by unmount, dropping {} decodes", in_flight.len());
                        return viewer;
                    }
                }
                Some(resolution) = in_flight.next(), if !in_flight.is_empty() => {
                    let outcome = viewer.complete(resolution);
                    emit(&events, &viewer, Some(outcome), false);
                }
            }
        }

        while let Some(resolution) = in_flight.next().await {
            let outcome = viewer.complete(resolution);
            emit(&events, &viewer, Some(outcome), false);
        }
        viewer
    }
}

fn emit<B: DecodeRenderBackend>(
    events: &UnboundedSender<SessionEvent>,
    viewer: &Viewer<B>,
    outcome: Option<PaintOutcome>,
    prevent_default: bool,
) {
    let event = SessionEvent {
        outcome,
        prevent_default,
        view: viewer.view(),
    };
    if events.send(event).is_err() {
        log::trace!("Session event dropped, no listener");
    }
}
