use bitflags::bitflags;

pub const KEYCODE_UNKNOWN: i32 = 0;
pub const KEYCODE_BACK: i32 = 4;

/// Set on a unicode value produced by a dead key, see
/// [`KeyCharacterMap.COMBINING_ACCENT`](https://developer.android.com/reference/android/view/KeyCharacterMap#COMBINING_ACCENT)
pub const COMBINING_ACCENT: u32 = 0x8000_0000;
pub const COMBINING_ACCENT_MASK: u32 = !COMBINING_ACCENT;

bitflags! {
    /// Modifier key state of a key event
    ///
    /// See [the KeyEvent docs](https://developer.android.com/reference/android/view/KeyEvent#getMetaState())
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MetaState: u32 {
        const SHIFT_ON = 0x1;
        const ALT_ON = 0x2;
        const SYM_ON = 0x4;
        const FUNCTION_ON = 0x8;
        const ALT_LEFT_ON = 0x10;
        const ALT_RIGHT_ON = 0x20;
        const SHIFT_LEFT_ON = 0x40;
        const SHIFT_RIGHT_ON = 0x80;
        const CTRL_ON = 0x1000;
        const CTRL_LEFT_ON = 0x2000;
        const CTRL_RIGHT_ON = 0x4000;
        const META_ON = 0x10000;
        const META_LEFT_ON = 0x20000;
        const META_RIGHT_ON = 0x40000;
        const CAPS_LOCK_ON = 0x100000;
        const NUM_LOCK_ON = 0x200000;
        const SCROLL_LOCK_ON = 0x400000;

        // Android may grow new bits
        const _ = !0;
    }
}

/// A key press or release as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key_code: i32,

    /// The unicode value the key produces with the current meta state,
    /// possibly tagged with [`COMBINING_ACCENT`].
    pub unicode: u32,
    pub meta_state: MetaState,
}

impl KeyInput {
    pub fn new(key_code: i32, unicode: u32, meta_state: MetaState) -> Self {
        Self {
            key_code,
            unicode,
            meta_state,
        }
    }

    #[inline]
    pub fn is_combining_accent(&self) -> bool {
        self.unicode & COMBINING_ACCENT != 0
    }
}

/// Dead key composition state
///
/// A key that produces a combining accent is composed with the character
/// typed just before it.
#[derive(Debug, Default)]
pub struct KeyComposer {
    last_char: u32,
}

impl KeyComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unicode value to report for `key`.
    ///
    /// `dead_char(accent, base)` resolves a composition the way
    /// `KeyCharacterMap.getDeadChar()` does, returning 0 when the pair
    /// doesn't compose.
    pub fn compose(&mut self, key: &KeyInput, dead_char: impl FnOnce(u32, u32) -> u32) -> u32 {
        let unicode = if key.is_combining_accent() {
            dead_char(
                self.last_char & COMBINING_ACCENT_MASK,
                key.unicode & COMBINING_ACCENT_MASK,
            )
        } else {
            key.unicode
        };
        self.last_char = key.unicode;
        unicode
    }
}
