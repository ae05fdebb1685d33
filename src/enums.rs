/// Lifecycle of the rendering surface bound to one display element.
///
/// `Uninitialized -> Initializing -> Ready { enabled: false } <-> Ready { enabled: true } -> Disposed`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceState {
    #[default]
    Uninitialized,
    Initializing,
    Ready {
        enabled: bool,
    },
    Disposed,
}

impl SurfaceState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SurfaceState::Ready { .. })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SurfaceState::Ready { enabled: true })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub(crate) fn offset(self) -> isize {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Keys the viewer listens to. Anything else arrives as `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    /// First run of digits in the file name, missing digits sort as 0
    #[default]
    NumericName,
    Name,
    None,
}
