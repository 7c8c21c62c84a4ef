//! Key definitions.
//!
//! A [`Key`] describes one physical (or logical) input: a keyboard key, a
//! mouse button or a wheel direction. Keys are identified by string ids such
//! as `"KeyA"`, `"ControlLeft"`, `"Mouse0"` or `"WheelUp"`.
//!
//! Toggle keys (Caps Lock, Num Lock, ...) carry a persistent [`ToggleState`].
//! Their state is addressed in chords through two derived sub-ids, see
//! [`toggle_on_id`] and [`toggle_off_id`].

use std::fmt;

/// Id of the wheel-up pseudo key.
pub const WHEEL_UP: &str = "WheelUp";
/// Id of the wheel-down pseudo key.
pub const WHEEL_DOWN: &str = "WheelDown";

const MOUSE_PREFIX: &str = "Mouse";
const WHEEL_PREFIX: &str = "Wheel";
const TOGGLE_ON_SUFFIX: &str = "On";
const TOGGLE_OFF_SUFFIX: &str = "Off";

/// Derive the "on" sub-id of a toggle root.
pub fn toggle_on_id(root: &str) -> String {
    format!("{root}{TOGGLE_ON_SUFFIX}")
}

/// Derive the "off" sub-id of a toggle root.
pub fn toggle_off_id(root: &str) -> String {
    format!("{root}{TOGGLE_OFF_SUFFIX}")
}

/// How a toggle key tracks its state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToggleMode {
    /// Not a toggle key.
    #[default]
    None,
    /// The platform reports the state; it is read from the raw event when
    /// available.
    Native,
    /// The state is tracked by flipping on every press.
    Emulated,
}

/// Persistent state of a toggle key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToggleState {
    /// The key has never been pressed and no native state was reported.
    #[default]
    Untoggled,
    /// The toggle is on.
    On,
    /// The toggle is off.
    Off,
}

impl ToggleState {
    /// The state a press moves to.
    ///
    /// An untoggled key turns on with its first press.
    pub fn flipped(self) -> Self {
        match self {
            Self::Untoggled | Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// Build a state from a reported native flag.
    pub fn from_native(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Classification of an id, used for chord rules and canonical ordering.
///
/// The declaration order is the default canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyClass {
    Modifier,
    Toggle,
    Mouse,
    Wheel,
    Normal,
}

impl KeyClass {
    /// Whether keys of this class can finish a chord on their own.
    pub fn is_triggering(self) -> bool {
        matches!(self, Self::Mouse | Self::Wheel | Self::Normal)
    }
}

/// Presentation metadata. Never used by matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

impl KeyLayout {
    /// Create a layout at the given position with unit size.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Set the size.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A registered key.
///
/// Keys are built with the chainable constructors below and then handed to
/// the manager. After registration their fields only change through
/// [`Manager::set`](crate::Manager::set).
///
/// # Example
///
/// ```
/// use horizon_shortcuts::{Key, ToggleMode};
///
/// let ctrl = Key::new("ControlLeft").with_label("Ctrl").modifier().with_variants(["Control"]);
/// let caps = Key::new("CapsLock").toggle(ToggleMode::Emulated);
///
/// assert!(ctrl.is_modifier());
/// assert_eq!(caps.toggle_on_id().as_deref(), Some("CapsLockOn"));
/// ```
#[derive(Clone, PartialEq)]
pub struct Key {
    pub(crate) id: String,
    pub(crate) label: Option<String>,
    pub(crate) variants: Vec<String>,
    pub(crate) is_modifier: bool,
    pub(crate) is_toggle: ToggleMode,
    pub(crate) pressed: bool,
    pub(crate) toggle_state: ToggleState,
    pub(crate) layout: KeyLayout,
}

impl Key {
    /// Create a normal key with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            variants: Vec::new(),
            is_modifier: false,
            is_toggle: ToggleMode::None,
            pressed: false,
            toggle_state: ToggleState::Untoggled,
            layout: KeyLayout::default(),
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the ids this key is interchangeable with.
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Mark this key as a modifier.
    pub fn modifier(mut self) -> Self {
        self.is_modifier = true;
        self
    }

    /// Make this key a toggle key.
    pub fn toggle(mut self, mode: ToggleMode) -> Self {
        self.is_toggle = mode;
        self
    }

    /// Set the presentation layout.
    pub fn with_layout(mut self, layout: KeyLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The label, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn is_modifier(&self) -> bool {
        self.is_modifier
    }

    pub fn toggle_mode(&self) -> ToggleMode {
        self.is_toggle
    }

    pub fn is_toggle(&self) -> bool {
        self.is_toggle != ToggleMode::None
    }

    /// Whether the key is physically held.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn toggle_state(&self) -> ToggleState {
        self.toggle_state
    }

    /// Whether the toggle is currently on.
    pub fn toggle_on_pressed(&self) -> bool {
        self.is_toggle() && self.toggle_state == ToggleState::On
    }

    /// Whether the toggle is currently off.
    pub fn toggle_off_pressed(&self) -> bool {
        self.is_toggle() && self.toggle_state == ToggleState::Off
    }

    /// The "on" sub-id, for toggle keys.
    pub fn toggle_on_id(&self) -> Option<String> {
        self.is_toggle().then(|| toggle_on_id(&self.id))
    }

    /// The "off" sub-id, for toggle keys.
    pub fn toggle_off_id(&self) -> Option<String> {
        self.is_toggle().then(|| toggle_off_id(&self.id))
    }

    /// The sub-id matching the current toggle state, if the key has one.
    pub fn toggle_state_id(&self) -> Option<String> {
        if !self.is_toggle() {
            return None;
        }
        match self.toggle_state {
            ToggleState::On => Some(toggle_on_id(&self.id)),
            ToggleState::Off => Some(toggle_off_id(&self.id)),
            ToggleState::Untoggled => None,
        }
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    /// Classify this key.
    pub fn class(&self) -> KeyClass {
        if self.is_toggle() {
            KeyClass::Toggle
        } else if self.is_modifier {
            KeyClass::Modifier
        } else if self.id.starts_with(MOUSE_PREFIX) {
            KeyClass::Mouse
        } else if self.id.starts_with(WHEEL_PREFIX) {
            KeyClass::Wheel
        } else {
            KeyClass::Normal
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("variants", &self.variants)
            .field("is_modifier", &self.is_modifier)
            .field("is_toggle", &self.is_toggle)
            .field("pressed", &self.pressed)
            .field("toggle_state", &self.toggle_state)
            .finish_non_exhaustive()
    }
}
