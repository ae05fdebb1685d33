//! Index arithmetic and input translation. Every input source ends up in
//! [`clamp_index`] or [`step_index`], so none can leave the slice bounds.

use crate::enums::{Direction, Key};

/// Raw input arriving at the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer wheel over the viewer. Positive is downward.
    Wheel { delta_y: f64 },
    Key(Key),
    /// Direct index control. Signed so hand-edited values can be clamped.
    Slider(i64),
}

/// What an input asks the viewer to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationIntent {
    Step(Direction),
    First,
    Last,
    GoTo(i64),
}

/// A translated input plus whether the host must suppress its default
/// handling (page scroll).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translated {
    pub intent: Option<NavigationIntent>,
    pub prevent_default: bool,
}

impl Translated {
    const IGNORED: Translated = Translated {
        intent: None,
        prevent_default: false,
    };
}

pub fn translate(event: InputEvent, slice_count: usize, wheel_dead_zone: f64) -> Translated {
    if slice_count == 0 {
        return Translated::IGNORED;
    }
    match event {
        InputEvent::Wheel { delta_y } => Translated {
            intent: if delta_y.abs() <= wheel_dead_zone || delta_y.is_nan() {
                None
            } else if delta_y > 0.0 {
                Some(NavigationIntent::Step(Direction::Next))
            } else {
                Some(NavigationIntent::Step(Direction::Previous))
            },
            prevent_default: true,
        },
        InputEvent::Key(key) => {
            let intent = match key {
                Key::ArrowRight | Key::ArrowUp => NavigationIntent::Step(Direction::Next),
                Key::ArrowLeft | Key::ArrowDown => NavigationIntent::Step(Direction::Previous),
                Key::Home => NavigationIntent::First,
                Key::End => NavigationIntent::Last,
                Key::Other => return Translated::IGNORED,
            };
            Translated {
                intent: Some(intent),
                prevent_default: true,
            }
        }
        InputEvent::Slider(value) => Translated {
            intent: Some(NavigationIntent::GoTo(value)),
            prevent_default: false,
        },
    }
}

/// Resolve an intent against the current index. `None` for an empty set.
pub fn resolve(intent: NavigationIntent, current: usize, slice_count: usize) -> Option<usize> {
    match intent {
        NavigationIntent::Step(direction) => step_index(current, direction, slice_count),
        NavigationIntent::First => clamp_index(0, slice_count),
        NavigationIntent::Last => clamp_index(i64::MAX, slice_count),
        NavigationIntent::GoTo(index) => clamp_index(index, slice_count),
    }
}

pub fn clamp_index(index: i64, slice_count: usize) -> Option<usize> {
    let last = slice_count.checked_sub(1)?;
    Some(usize::try_from(index.max(0)).map_or(last, |index| index.min(last)))
}

pub fn step_index(current: usize, direction: Direction, slice_count: usize) -> Option<usize> {
    let last = slice_count.checked_sub(1)?;
    let target = current.min(last).saturating_add_signed(direction.offset());
    Some(target.min(last))
}
