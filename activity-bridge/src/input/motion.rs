use num_enum::{FromPrimitive, IntoPrimitive};

/// Bits of a raw motion action code that hold the [`MotionAction`]
pub const ACTION_MASK: u32 = 0xff;
/// Bits of a raw motion action code that hold the pointer index of a
/// `PointerDown`/`PointerUp` action
pub const ACTION_POINTER_INDEX_MASK: u32 = 0xff00;
pub const ACTION_POINTER_INDEX_SHIFT: u32 = 8;

/// A pointer whose position moved by at most this much (on both axes) since
/// the last historical sample is reported as [`PointAction::Stationary`].
pub const STATIONARY_TOLERANCE: f32 = 1.0;

/// Only the primary, secondary and tertiary pointer slots have press/release
/// rules; any later slot is always classified as [`PointAction::Stationary`]
/// unless the event is a move.
pub const CLASSIFIED_SLOTS: usize = 3;

/// The masked action of a motion event
///
/// See [the MotionEvent docs](https://developer.android.com/reference/android/view/MotionEvent#getActionMasked())
///
/// # Android Extensible Enum
///
/// Unknown values reported by newer versions of Android are captured by a
/// hidden catch-all variant so this should be matched like a
/// `#[non_exhaustive]` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[non_exhaustive]
#[repr(u32)]
pub enum MotionAction {
    Down = 0,
    Up = 1,
    Move = 2,
    Cancel = 3,
    Outside = 4,
    PointerDown = 5,
    PointerUp = 6,
    HoverMove = 7,
    Scroll = 8,
    HoverEnter = 9,
    HoverExit = 10,
    ButtonPress = 11,
    ButtonRelease = 12,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(u32),
}

/// The per-pointer state handed to the engine with each touch point
///
/// The discriminants are the integers the engine's `touch_add` entry point
/// expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(i32)]
pub enum PointAction {
    Begin = 0,
    Move = 1,
    Stationary = 2,
    End = 3,
}

/// The state of a whole touch sequence, passed to the engine's `touch_end`
/// entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(i32)]
pub enum TouchPhase {
    Begin = 0,
    Update = 1,
    End = 2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The state of one pointer within a [`MotionSnapshot`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub position: Position,
    pub size: f32,
    pub pressure: f32,

    /// The most recent historical position batched into the event, if the
    /// event carries any history.
    pub last_historical: Option<Position>,
}

impl PointerSample {
    pub fn new(pointer_id: i32, x: f32, y: f32) -> Self {
        Self {
            pointer_id,
            position: Position::new(x, y),
            size: 0.0,
            pressure: 1.0,
            last_historical: None,
        }
    }

    pub fn with_history(mut self, x: f32, y: f32) -> Self {
        self.last_historical = Some(Position::new(x, y));
        self
    }

    pub fn with_contact(mut self, size: f32, pressure: f32) -> Self {
        self.size = size;
        self.pressure = pressure;
        self
    }

    fn moved_since_history(&self) -> bool {
        match self.last_historical {
            None => true,
            Some(previous) => {
                (self.position.x - previous.x).abs() > STATIONARY_TOLERANCE
                    || (self.position.y - previous.y).abs() > STATIONARY_TOLERANCE
            }
        }
    }
}

/// A touch point in the form the engine consumes it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub pointer_id: i32,
    pub action: PointAction,
    pub primary: bool,
    pub x: i32,
    pub y: i32,
    pub size: f32,
    pub pressure: f32,
}

/// A platform independent copy of a multi-touch motion event
///
/// The snapshot is built once per hardware event (from a Java `MotionEvent`
/// on Android) and discarded once it has been forwarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionSnapshot {
    raw_action: u32,
    pointers: Vec<PointerSample>,
}

impl MotionSnapshot {
    /// Creates a snapshot from a raw action code, as returned by
    /// `MotionEvent.getAction()`, and the pointers in pointer index order.
    pub fn new(raw_action: u32, pointers: Vec<PointerSample>) -> Self {
        Self {
            raw_action,
            pointers,
        }
    }

    /// Creates a snapshot from a masked action and the pointer index it
    /// applies to.
    pub fn with_action(
        action: MotionAction,
        pointer_index: usize,
        pointers: Vec<PointerSample>,
    ) -> Self {
        let action: u32 = action.into();
        let index = (pointer_index as u32) << ACTION_POINTER_INDEX_SHIFT;
        Self::new(action | (index & ACTION_POINTER_INDEX_MASK), pointers)
    }

    #[inline]
    pub fn raw_action(&self) -> u32 {
        self.raw_action
    }

    /// Returns the masked action of the event.
    #[inline]
    pub fn action(&self) -> MotionAction {
        (self.raw_action & ACTION_MASK).into()
    }

    /// Returns the pointer index of a `Down`, `Up`, `PointerDown` or
    /// `PointerUp` action.
    #[inline]
    pub fn pointer_index(&self) -> usize {
        ((self.raw_action & ACTION_POINTER_INDEX_MASK) >> ACTION_POINTER_INDEX_SHIFT) as usize
    }

    #[inline]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    #[inline]
    pub fn pointers(&self) -> &[PointerSample] {
        &self.pointers
    }

    /// The primary pointer (index 0), which also drives mouse emulation.
    #[inline]
    pub fn primary(&self) -> Option<&PointerSample> {
        self.pointers.first()
    }

    /// Classifies the pointer at `index`.
    ///
    /// Move events compare every pointer against its last historical
    /// sample. Press and release events only affect the slot they were
    /// reported for, and only the first [`CLASSIFIED_SLOTS`] slots have
    /// rules; everything else is [`PointAction::Stationary`].
    pub fn classify(&self, index: usize) -> PointAction {
        let action = self.action();
        if action == MotionAction::Move {
            return match self.pointers.get(index) {
                Some(pointer) if !pointer.moved_since_history() => PointAction::Stationary,
                _ => PointAction::Move,
            };
        }

        if index >= CLASSIFIED_SLOTS {
            return PointAction::Stationary;
        }

        match action {
            MotionAction::Down if index == 0 => PointAction::Begin,
            MotionAction::Up if index == 0 => PointAction::End,
            MotionAction::PointerDown if index == self.pointer_index() => PointAction::Begin,
            MotionAction::PointerUp if index == self.pointer_index() => PointAction::End,
            _ => PointAction::Stationary,
        }
    }

    /// The phase reported to the engine once all touch points were added.
    pub fn touch_phase(&self) -> TouchPhase {
        match self.action() {
            MotionAction::Down => TouchPhase::Begin,
            MotionAction::Up => TouchPhase::End,
            _ => TouchPhase::Update,
        }
    }

    /// Iterates over all pointers as classified [`TouchPoint`]s, in pointer
    /// index order.
    pub fn touch_points(&self) -> impl ExactSizeIterator<Item = TouchPoint> + '_ {
        self.pointers
            .iter()
            .enumerate()
            .map(move |(index, pointer)| TouchPoint {
                pointer_id: pointer.pointer_id,
                action: self.classify(index),
                primary: index == 0,
                x: pointer.position.x as i32,
                y: pointer.position.y as i32,
                size: pointer.size,
                pressure: pointer.pressure,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(action: MotionAction, pointer: PointerSample) -> MotionSnapshot {
        MotionSnapshot::with_action(action, 0, vec![pointer])
    }

    #[test]
    fn raw_action_decoding() {
        // ACTION_POINTER_DOWN for the second pointer
        let event = MotionSnapshot::new(0x0105, vec![]);
        assert_eq!(event.action(), MotionAction::PointerDown);
        assert_eq!(event.pointer_index(), 1);

        let event = MotionSnapshot::new(0x2a, vec![]);
        assert_eq!(event.action(), MotionAction::__Unknown(0x2a));
    }

    #[test]
    fn move_without_history_is_a_move() {
        let event = single(MotionAction::Move, PointerSample::new(0, 10.0, 10.0));
        assert_eq!(event.classify(0), PointAction::Move);
    }

    #[test]
    fn move_within_tolerance_is_stationary() {
        let pointer = PointerSample::new(0, 11.0, 9.0).with_history(10.0, 10.0);
        let event = single(MotionAction::Move, pointer);
        assert_eq!(event.classify(0), PointAction::Stationary);

        let pointer = PointerSample::new(0, 10.5, 10.0).with_history(10.0, 10.0);
        let event = single(MotionAction::Move, pointer);
        assert_eq!(event.classify(0), PointAction::Stationary);
    }

    #[test]
    fn move_beyond_tolerance_on_either_axis_is_a_move() {
        let pointer = PointerSample::new(0, 11.5, 10.0).with_history(10.0, 10.0);
        let event = single(MotionAction::Move, pointer);
        assert_eq!(event.classify(0), PointAction::Move);

        let pointer = PointerSample::new(0, 10.0, 8.0).with_history(10.0, 10.0);
        let event = single(MotionAction::Move, pointer);
        assert_eq!(event.classify(0), PointAction::Move);
    }

    #[test]
    fn move_classifies_every_pointer_independently() {
        let event = MotionSnapshot::with_action(
            MotionAction::Move,
            0,
            vec![
                PointerSample::new(0, 10.0, 10.0).with_history(10.0, 10.0),
                PointerSample::new(1, 50.0, 80.0).with_history(40.0, 80.0),
                PointerSample::new(2, 5.0, 5.0),
                PointerSample::new(3, 7.0, 7.0).with_history(7.0, 7.0),
            ],
        );
        let actions: Vec<_> = event.touch_points().map(|p| p.action).collect();
        assert_eq!(
            actions,
            [
                PointAction::Stationary,
                PointAction::Move,
                PointAction::Move,
                PointAction::Stationary
            ]
        );
    }

    #[test]
    fn primary_press_and_release_ignore_other_pointers() {
        let pointers = vec![
            PointerSample::new(0, 1.0, 1.0),
            PointerSample::new(1, 2.0, 2.0),
            PointerSample::new(2, 3.0, 3.0),
        ];

        let down = MotionSnapshot::with_action(MotionAction::PointerDown, 0, pointers.clone());
        assert_eq!(down.classify(0), PointAction::Begin);
        assert_eq!(down.classify(1), PointAction::Stationary);
        assert_eq!(down.classify(2), PointAction::Stationary);

        let up = MotionSnapshot::with_action(MotionAction::PointerUp, 0, pointers);
        assert_eq!(up.classify(0), PointAction::End);
        assert_eq!(up.classify(1), PointAction::Stationary);
        assert_eq!(up.classify(2), PointAction::Stationary);
    }

    #[test]
    fn secondary_and_tertiary_slots() {
        let pointers = vec![
            PointerSample::new(0, 1.0, 1.0),
            PointerSample::new(5, 2.0, 2.0),
            PointerSample::new(9, 3.0, 3.0),
        ];

        let event = MotionSnapshot::with_action(MotionAction::PointerDown, 1, pointers.clone());
        assert_eq!(event.classify(0), PointAction::Stationary);
        assert_eq!(event.classify(1), PointAction::Begin);
        assert_eq!(event.classify(2), PointAction::Stationary);

        let event = MotionSnapshot::with_action(MotionAction::PointerUp, 2, pointers);
        assert_eq!(event.classify(1), PointAction::Stationary);
        assert_eq!(event.classify(2), PointAction::End);
    }

    #[test]
    fn slots_beyond_the_third_default_to_stationary() {
        let pointers = (0..5)
            .map(|i| PointerSample::new(i, i as f32, i as f32))
            .collect::<Vec<_>>();
        let event = MotionSnapshot::with_action(MotionAction::PointerDown, 3, pointers.clone());
        assert_eq!(event.classify(3), PointAction::Stationary);

        let event = MotionSnapshot::with_action(MotionAction::PointerUp, 4, pointers);
        assert_eq!(event.classify(4), PointAction::Stationary);
    }

    #[test]
    fn cancel_is_stationary() {
        let event = single(MotionAction::Cancel, PointerSample::new(0, 1.0, 1.0));
        assert_eq!(event.classify(0), PointAction::Stationary);
        assert_eq!(event.touch_phase(), TouchPhase::Update);
    }

    #[test]
    fn single_finger_sequence() {
        let down = single(MotionAction::Down, PointerSample::new(0, 10.0, 10.0));
        assert_eq!(down.classify(0), PointAction::Begin);
        assert_eq!(down.touch_phase(), TouchPhase::Begin);

        let still = single(
            MotionAction::Move,
            PointerSample::new(0, 10.0, 10.0).with_history(10.0, 10.0),
        );
        assert_eq!(still.classify(0), PointAction::Stationary);

        let moved = single(
            MotionAction::Move,
            PointerSample::new(0, 15.0, 10.0).with_history(10.0, 10.0),
        );
        assert_eq!(moved.classify(0), PointAction::Move);
        assert_eq!(moved.touch_phase(), TouchPhase::Update);

        let up = single(MotionAction::Up, PointerSample::new(0, 15.0, 10.0));
        assert_eq!(up.classify(0), PointAction::End);
        assert_eq!(up.touch_phase(), TouchPhase::End);
    }

    #[test]
    fn touch_points_truncate_coordinates_and_flag_primary() {
        let event = MotionSnapshot::with_action(
            MotionAction::PointerDown,
            1,
            vec![
                PointerSample::new(3, 10.9, 20.2).with_contact(0.25, 0.5),
                PointerSample::new(4, 30.5, 40.7),
            ],
        );
        let points: Vec<_> = event.touch_points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0],
            TouchPoint {
                pointer_id: 3,
                action: PointAction::Stationary,
                primary: true,
                x: 10,
                y: 20,
                size: 0.25,
                pressure: 0.5,
            }
        );
        assert!(!points[1].primary);
        assert_eq!(points[1].action, PointAction::Begin);
        assert_eq!((points[1].x, points[1].y), (30, 40));
    }

    #[test]
    fn wire_values() {
        let begin: i32 = PointAction::Begin.into();
        let end: i32 = PointAction::End.into();
        let phase: i32 = TouchPhase::End.into();
        assert_eq!((begin, end, phase), (0, 3, 2));
    }
}
