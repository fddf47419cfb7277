use super::MotionAction;

/// Touch screens report every position change as a mouse move.
pub const TOUCH_MOVE_THRESHOLD: i32 = 0;
/// Trackballs need to travel further before a mouse move is reported.
pub const TRACKBALL_MOVE_THRESHOLD: i32 = 5;

/// A legacy single-pointer event for engines that don't understand touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
}

/// Turns primary pointer positions into a mouse event stream.
///
/// The last reported position is shared by every event source that feeds
/// the emulator (touch screen and trackball) and starts at the origin.
#[derive(Debug, Default)]
pub struct MouseEmulator {
    last_x: i32,
    last_y: i32,
}

impl MouseEmulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one primary pointer position and returns the mouse event to
    /// report, if any.
    ///
    /// Moves are only reported once the pointer travelled more than
    /// `threshold` units on either axis since the last reported position.
    pub fn track(
        &mut self,
        action: MotionAction,
        x: f32,
        y: f32,
        threshold: i32,
    ) -> Option<MouseEvent> {
        match action {
            MotionAction::Up => Some(MouseEvent::Up {
                x: x as i32,
                y: y as i32,
            }),
            MotionAction::Down => {
                self.remember(x, y);
                Some(MouseEvent::Down {
                    x: x as i32,
                    y: y as i32,
                })
            }
            MotionAction::Move => {
                let dx = (x - self.last_x as f32) as i32;
                let dy = (y - self.last_y as f32) as i32;
                if dx.abs() > threshold || dy.abs() > threshold {
                    self.remember(x, y);
                    Some(MouseEvent::Move {
                        x: x as i32,
                        y: y as i32,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn last_position(&self) -> (i32, i32) {
        (self.last_x, self.last_y)
    }

    fn remember(&mut self, x: f32, y: f32) {
        self.last_x = x as i32;
        self.last_y = y as i32;
    }
}
