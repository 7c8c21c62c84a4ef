//! Input events accepted by the manager.
//!
//! Translating platform events into key ids happens outside this crate.
//! The translator hands over a [`KeyEvent`] listing the ids that went down or
//! up, optionally with the [`RawInputEvent`] it was built from.

use std::collections::BTreeMap;

/// The platform event a [`KeyEvent`] was translated from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawInputEvent {
    pub code: Option<String>,
    pub key: Option<String>,
    pub button: Option<u16>,
    pub delta_y: Option<f64>,
    /// Native modifier/lock states reported with the event, by key id.
    pub modifier_states: BTreeMap<String, bool>,
}

impl RawInputEvent {
    /// An event for a keyboard key code.
    pub fn key_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Default::default()
        }
    }

    /// An event for a mouse button.
    pub fn mouse_button(button: u16) -> Self {
        Self {
            button: Some(button),
            ..Default::default()
        }
    }

    /// An event for a wheel movement.
    pub fn wheel(delta_y: f64) -> Self {
        Self {
            delta_y: Some(delta_y),
            ..Default::default()
        }
    }

    /// Report the native state of a modifier or lock key.
    pub fn with_modifier_state(mut self, id: impl Into<String>, on: bool) -> Self {
        self.modifier_states.insert(id.into(), on);
        self
    }

    /// The reported state of a key, if any.
    pub fn get_modifier_state(&self, code: &str) -> Option<bool> {
        self.modifier_states.get(code).copied()
    }
}

/// One press or release of one or more key ids.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub is_keydown: bool,
    pub keys: Vec<String>,
    pub event: Option<RawInputEvent>,
}

impl KeyEvent {
    /// A press of the given ids.
    pub fn down<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_keydown: true,
            keys: keys.into_iter().map(Into::into).collect(),
            event: None,
        }
    }

    /// A release of the given ids.
    pub fn up<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_keydown: false,
            ..Self::down(keys)
        }
    }

    /// Attach the raw event.
    pub fn with_event(mut self, event: RawInputEvent) -> Self {
        self.event = Some(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_state_lookup() {
        let raw = RawInputEvent::key_code("CapsLock").with_modifier_state("CapsLock", true);
        assert_eq!(raw.get_modifier_state("CapsLock"), Some(true));
        assert_eq!(raw.get_modifier_state("NumLock"), None);
    }

    #[test]
    fn test_key_event_constructors() {
        let down = KeyEvent::down(["KeyA"]);
        let up = KeyEvent::up(["KeyA"]).with_event(RawInputEvent::key_code("KeyA"));
        assert!(down.is_keydown);
        assert!(!up.is_keydown);
        assert_eq!(up.keys, down.keys);
        assert_eq!(up.event.and_then(|e| e.code).as_deref(), Some("KeyA"));
    }
}
