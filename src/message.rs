use crate::backend::DisplayElement;
use crate::enums::Direction;
use crate::navigation::InputEvent;
use crate::slice_set::SliceSet;
use crate::viewer::FrameRequest;

/// Everything the host can tell a viewer.
#[derive(Debug, Clone)]
pub enum Message {
    SetSlices(SliceSet),
    AttachElement(DisplayElement),
    Input(InputEvent),
    GoTo(usize),
    Step(Direction),
    First,
    Last,
    SetWidth(f64),
    SetCenter(f64),
    ResetWindow,
    Unmount,
}

/// Result of handling a [`Message`].
#[derive(Default)]
#[must_use]
pub struct Update {
    /// Decode to await and pass back to [`Viewer::complete`](crate::viewer::Viewer::complete)
    pub request: Option<FrameRequest>,
    /// The host must suppress its default handling of the input (scrolling)
    pub prevent_default: bool,
}

impl Update {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn request(request: Option<FrameRequest>) -> Self {
        Self {
            request,
            prevent_default: false,
        }
    }
}
