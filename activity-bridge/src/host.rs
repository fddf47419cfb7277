use crate::input::SoftKeyboardRequest;
use crate::Rect;

/// A request from the engine that has to run on the host's main thread
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostCommand {
    /// Repaint the given region of the engine's surface.
    RedrawWindow(Rect),

    ShowSoftwareKeyboard(SoftKeyboardRequest),

    /// Restart the input connection of the visible soft keyboard, e.g.
    /// after the engine changed the text of the focused field.
    ResetSoftwareKeyboard,

    HideSoftwareKeyboard,

    /// Enter or leave full screen mode. The engine's window geometry is
    /// refreshed once the host applied the change.
    SetFullScreen(bool),

    ShowOptionsMenu,
    HideOptionsMenu,
    ShowContextMenu,
    HideContextMenu,

    /// Open a URL with whatever application handles it.
    OpenUrl(String),

    /// The engine quit; finish the activity.
    Finish,
}

/// The activity side of the bridge
///
/// Implementations schedule commands on the activity's main (UI) thread
/// and must return without waiting for them to run.
pub trait Host: Send + Sync {
    fn run_on_main_thread(&self, command: HostCommand);
}
