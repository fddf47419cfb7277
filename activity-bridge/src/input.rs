use bitflags::bitflags;

use crate::Rect;

mod keys;
mod motion;
mod mouse;

pub use keys::*;
pub use motion::*;
pub use mouse::*;

bitflags! {
    /// Hints the engine attaches to a soft keyboard request, describing the
    /// kind of text being edited and the preferred letter case
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputHints: u32 {
        const HIDDEN_TEXT = 0x1;
        const NO_AUTO_UPPERCASE = 0x2;
        const PREFER_NUMBERS = 0x4;
        const PREFER_UPPERCASE = 0x8;
        const PREFER_LOWERCASE = 0x10;
        const NO_PREDICTIVE_TEXT = 0x20;

        const DIGITS_ONLY = 0x10000;
        const FORMATTED_NUMBERS_ONLY = 0x20000;
        const UPPERCASE_ONLY = 0x40000;
        const LOWERCASE_ONLY = 0x80000;
        const DIALABLE_CHARACTERS_ONLY = 0x100000;
        const EMAIL_CHARACTERS_ONLY = 0x200000;
        const URL_CHARACTERS_ONLY = 0x400000;

        const _ = !0;
    }
}

/// A request to show the soft keyboard for an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftKeyboardRequest {
    /// The bounds of the input field, in window coordinates
    pub rect: Rect,
    pub hints: InputHints,
}

impl SoftKeyboardRequest {
    pub fn new(x: i32, y: i32, width: i32, height: i32, hints: InputHints) -> Self {
        Self {
            rect: Rect {
                left: x,
                top: y,
                right: x + width,
                bottom: y + height,
            },
            hints,
        }
    }
}
