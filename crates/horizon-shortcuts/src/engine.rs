//! The chain-building state machine.
//!
//! [`Manager::process`] feeds key events into the current chain:
//!
//! - a press adds its id to the last chord (opening a new chord first when
//!   the previous one is closed) and runs the resolver; repeats of a held
//!   key are ignored;
//! - a release of a key in the last chord either closes the chord, when the
//!   chain so far is the full prefix of a longer shortcut, or removes the id
//!   again.
//!
//! After a trigger the manager waits for every triggering key to be
//! released before the chain accepts input again. The first release runs
//! the pending untrigger.

use horizon_shortcuts_core::{PerfSpan, shortcuts_debug, shortcuts_trace, targets};

use crate::chain::{Chain, Chord};
use crate::command::Phase;
use crate::error::{Result, ShortcutError};
use crate::event::{KeyEvent, RawInputEvent};
use crate::key::{KeyClass, ToggleMode, ToggleState};
use crate::manager::Manager;
use crate::mutation::{KeyChange, Mutation, SetOptions, StateChange};

impl Manager {
    /// Process one key event.
    ///
    /// Each id is pressed or released in order. Errors raised along the way
    /// (unknown ids, ambiguous matches, vetoed state changes) go to the
    /// failure callback.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(keydown = event.is_keydown, keys = ?event.keys)
    )]
    pub fn process(&mut self, event: &KeyEvent) {
        let _perf = PerfSpan::new("process");
        let raw = event.event.as_ref();
        if self.options.sync_native_state
            && let Some(raw) = raw
        {
            self.sync_native_toggles(raw);
        }
        for id in &event.keys {
            if event.is_keydown {
                self.press(id, raw);
            } else {
                self.release(id, raw);
            }
        }
    }

    /// Reset the chain and reopen the first chord.
    ///
    /// The default failure callback uses this; hosts implementing chord
    /// timeouts call it when the timeout expires.
    pub fn clear_chain(&mut self) -> Result<()> {
        if !self.state.chain.is_empty() {
            self.set(Mutation::State(StateChange::Chain(Chain::empty())), SetOptions::default())?;
        }
        if self.state.next_is_chord {
            self.set(Mutation::State(StateChange::NextIsChord(false)), SetOptions::default())?;
        }
        Ok(())
    }

    /// Ids currently held: pressed non-toggle keys plus the state sub-id of
    /// every toggle that is on or off.
    pub fn get_pressed_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .filter_map(|key| {
                if key.is_toggle() {
                    key.toggle_state_id()
                } else if key.is_pressed() {
                    Some(key.id().to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    // =========================================================================
    // Key Down
    // =========================================================================

    fn press(&mut self, id: &str, raw: Option<&RawInputEvent>) {
        let Some(key) = self.keys.resolve(id) else {
            self.fail(ShortcutError::unknown_key(id), raw);
            return;
        };
        let root = key.id().to_string();
        let was_pressed = key.is_pressed();
        let mode = key.toggle_mode();
        let state = key.toggle_state();

        // Auto-repeat of a held key.
        if was_pressed {
            return;
        }
        let pressed = self.commit_or_fail(Mutation::Key {
            id: root.clone(),
            change: KeyChange::Pressed(true),
        }, raw);
        if !pressed {
            return;
        }
        if mode != ToggleMode::None {
            let next = match (mode, raw.and_then(|raw| raw.get_modifier_state(&root))) {
                (ToggleMode::Native, Some(on)) => ToggleState::from_native(on),
                _ => state.flipped(),
            };
            let toggled = self.commit_or_fail(Mutation::Key {
                id: root.clone(),
                change: KeyChange::ToggleState(next),
            }, raw);
            if !toggled {
                return;
            }
        }

        if self.state.is_awaiting_keyup {
            shortcuts_trace!(key = %root, "awaiting keyup, press ignored");
            return;
        }

        // A toggle takes part in chords through its state sub-id.
        let Some(chain_id) = self.chain_id(&root) else {
            return;
        };

        let mut chain = self.state.chain.clone();
        let opened = chain.is_empty() || self.state.next_is_chord;
        if opened {
            let seed = if self.options.carry_modifiers {
                self.held_modifiers(&root)
            } else {
                Vec::new()
            };
            chain.push(Chord::new(seed));
        }
        let Some(last) = chain.last_mut() else {
            return;
        };
        last.remove_where(|k| k != chain_id && self.keys.toggle_root(k) == Some(root.as_str()));
        if !last.insert(chain_id.as_str()) && !opened {
            return;
        }

        tracing::trace!(target: targets::ENGINE, key = %chain_id, chain = %chain, "press");
        if opened && self.state.next_is_chord {
            self.commit_or_fail(Mutation::State(StateChange::NextIsChord(false)), raw);
        }
        self.commit_or_fail(Mutation::State(StateChange::Chain(chain)), raw);
        self.resolve(Phase::KeyDown, raw);
    }

    /// The id a key contributes to a chord.
    fn chain_id(&self, root: &str) -> Option<String> {
        let key = self.keys.get(root)?;
        if key.is_toggle() {
            key.toggle_state_id()
        } else {
            Some(root.to_string())
        }
    }

    fn held_modifiers(&self, except: &str) -> Vec<String> {
        self.keys
            .iter()
            .filter(|key| key.is_pressed() && key.class() == KeyClass::Modifier && key.id() != except)
            .map(|key| key.id().to_string())
            .collect()
    }

    // =========================================================================
    // Key Up
    // =========================================================================

    fn release(&mut self, id: &str, raw: Option<&RawInputEvent>) {
        let Some(key) = self.keys.resolve(id) else {
            self.fail(ShortcutError::unknown_key(id), raw);
            return;
        };
        let root = key.id().to_string();
        if key.is_pressed() {
            self.commit_or_fail(Mutation::Key {
                id: root.clone(),
                change: KeyChange::Pressed(false),
            }, raw);
        }

        if self.state.is_awaiting_keyup {
            self.release_after_trigger(raw);
            return;
        }
        if self.state.next_is_chord {
            return;
        }
        let Some(last) = self.state.chain.last() else {
            return;
        };
        let in_last = last
            .iter()
            .any(|k| k == root || self.keys.toggle_root(k) == Some(root.as_str()));
        if !in_last {
            return;
        }

        let closes = if self.state.is_recording {
            last.iter()
                .any(|k| self.keys.class_of(k).is_some_and(KeyClass::is_triggering))
        } else {
            self.is_chain_extended()
        };
        if closes {
            shortcuts_trace!(chain = %self.state.chain, "chord closed");
            self.commit_or_fail(Mutation::State(StateChange::NextIsChord(true)), raw);
            return;
        }

        let mut chain = self.state.chain.clone();
        let removed = chain.last_mut().is_some_and(|last| {
            last.remove_where(|k| k == root || self.keys.toggle_root(k) == Some(root.as_str()))
        });
        if !removed {
            return;
        }
        if chain.is_blank() {
            chain = Chain::empty();
        }
        tracing::trace!(target: targets::ENGINE, key = %root, chain = %chain, "release");
        self.commit_or_fail(Mutation::State(StateChange::Chain(chain)), raw);
        self.resolve(Phase::KeyUp, raw);
    }

    fn release_after_trigger(&mut self, raw: Option<&RawInputEvent>) {
        // The pending untrigger is cleared before its callback runs, so a
        // re-entrant release cannot run it twice.
        if let Some(shortcut) = self.state.untrigger {
            self.commit_or_fail(Mutation::State(StateChange::Untrigger(None)), raw);
            self.execute(shortcut, Phase::KeyUp, raw);
        }

        let still_held = self
            .keys
            .iter()
            .any(|key| key.is_pressed() && key.class().is_triggering());
        if still_held || !self.state.is_awaiting_keyup {
            return;
        }

        shortcuts_debug!(chain = %self.state.chain, "all triggering keys released");
        self.commit_or_fail(Mutation::State(StateChange::IsAwaitingKeyup(false)), raw);
        if !self.is_chain_extended()
            && let Err(err) = self.clear_chain()
        {
            self.fail(err, raw);
        }
    }

    // =========================================================================
    // Native State
    // =========================================================================

    fn sync_native_toggles(&mut self, raw: &RawInputEvent) {
        let updates: Vec<(String, ToggleState)> = self
            .keys
            .iter()
            .filter(|key| key.toggle_mode() == ToggleMode::Native)
            .filter_map(|key| {
                let reported = ToggleState::from_native(raw.get_modifier_state(key.id())?);
                (reported != key.toggle_state()).then(|| (key.id().to_string(), reported))
            })
            .collect();
        for (id, state) in updates {
            shortcuts_trace!(key = %id, ?state, "adopting native toggle state");
            self.commit_or_fail(Mutation::Key {
                id,
                change: KeyChange::ToggleState(state),
            }, Some(raw));
        }
    }

    // =========================================================================
    // Failure Routing
    // =========================================================================

    /// Submit an internal mutation, routing a rejection to the callback.
    /// Returns whether the mutation was applied.
    pub(crate) fn commit_or_fail(&mut self, mutation: Mutation, raw: Option<&RawInputEvent>) -> bool {
        match self.set(mutation, SetOptions::default()) {
            Ok(_) => true,
            Err(err) => {
                self.fail(err, raw);
                false
            }
        }
    }

    /// Hand an error to the failure callback.
    pub(crate) fn fail(&mut self, error: ShortcutError, raw: Option<&RawInputEvent>) {
        let cb = self.options.cb.clone();
        cb(self, &error, raw);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::chain::Chord;
    use crate::error::ErrorKind;
    use crate::event::{KeyEvent, RawInputEvent};
    use crate::key::{Key, ToggleMode};
    use crate::manager::Manager;
    use crate::error::ShortcutError;
    use crate::mutation::{KeyChange, Mutation, MutationKind};
    use crate::options::{ManagerBuilder, NoMatchPolicy};

    fn keys() -> Vec<Key> {
        vec![
            Key::new("ControlLeft").modifier(),
            Key::new("ShiftLeft").modifier(),
            Key::new("CapsLock").toggle(ToggleMode::Emulated),
            Key::new("NumLock").toggle(ToggleMode::Native),
            Key::new("KeyA"),
            Key::new("KeyB"),
        ]
    }

    fn keeping() -> Manager {
        let mut manager = ManagerBuilder::new().no_match(NoMatchPolicy::Keep).build();
        manager.add_keys(keys()).unwrap();
        manager
    }

    fn press(manager: &mut Manager, id: &str) {
        manager.process(&KeyEvent::down([id]));
    }

    fn release(manager: &mut Manager, id: &str) {
        manager.process(&KeyEvent::up([id]));
    }

    #[test]
    fn test_press_builds_sorted_chord() {
        let mut manager = keeping();
        press(&mut manager, "KeyA");
        press(&mut manager, "ShiftLeft");
        assert_eq!(manager.chain().to_string(), "ShiftLeft+KeyA");

        // Repeats are ignored.
        press(&mut manager, "KeyA");
        assert_eq!(manager.chain().chords()[0].len(), 2);
    }

    #[test]
    fn test_round_trip_returns_to_empty() {
        let orders: [[&str; 3]; 3] = [
            ["ControlLeft", "ShiftLeft", "KeyA"],
            ["KeyA", "ControlLeft", "ShiftLeft"],
            ["ShiftLeft", "KeyA", "ControlLeft"],
        ];
        for down in orders {
            for up in orders {
                let mut manager = keeping();
                for id in down {
                    press(&mut manager, id);
                }
                assert_eq!(manager.chain().chords()[0].len(), 3);
                for id in up {
                    release(&mut manager, id);
                }
                assert!(manager.chain().is_empty(), "{down:?} then {up:?}");
            }
        }
    }

    #[test]
    fn test_clear_chain() {
        let mut manager = keeping();
        press(&mut manager, "KeyA");
        manager.clear_chain().unwrap();
        assert!(manager.chain().is_empty());
        assert!(!manager.state().next_is_chord);
    }

    #[test]
    fn test_unknown_key_goes_to_callback() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = errors.clone();
        let mut manager = ManagerBuilder::new()
            .callback(move |_, error, _| errors_clone.lock().push(error.kind()))
            .build();
        manager.add_keys(keys()).unwrap();

        press(&mut manager, "KeyZ");
        assert_eq!(*errors.lock(), vec![ErrorKind::UnknownKey]);
    }

    #[test]
    fn test_vetoed_press_leaves_chain_unchanged() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = errors.clone();
        let mut manager = ManagerBuilder::new()
            .no_match(NoMatchPolicy::Keep)
            .callback(move |_, error, _| errors_clone.lock().push(error.kind()))
            .build();
        manager.add_keys(keys()).unwrap();
        manager.add_can_hook(MutationKind::KeyPressed, |_, mutation| match mutation {
            Mutation::Key {
                id,
                change: KeyChange::Pressed(true),
            } if id == "ShiftLeft" => Err(ShortcutError::vetoed("shift is disabled")),
            _ => Ok(()),
        });

        press(&mut manager, "KeyA");
        press(&mut manager, "ShiftLeft");

        assert_eq!(*errors.lock(), vec![ErrorKind::Vetoed]);
        assert!(!manager.keys().get("ShiftLeft").unwrap().is_pressed());
        assert_eq!(manager.chain().to_string(), "KeyA");
    }

    #[test]
    fn test_emulated_toggle_flips_per_press() {
        let mut manager = keeping();
        press(&mut manager, "CapsLock");
        let caps = manager.keys().get("CapsLock").unwrap();
        assert!(caps.toggle_on_pressed());
        assert!(!caps.toggle_off_pressed());
        assert_eq!(manager.get_pressed_keys(), vec!["CapsLockOn".to_string()]);
        assert_eq!(manager.chain().to_string(), "CapsLockOn");

        // Held repeats do not flip it again.
        press(&mut manager, "CapsLock");
        assert!(manager.keys().get("CapsLock").unwrap().toggle_on_pressed());

        release(&mut manager, "CapsLock");
        assert!(manager.chain().is_empty());
        press(&mut manager, "CapsLock");
        assert!(manager.keys().get("CapsLock").unwrap().toggle_off_pressed());
        assert_eq!(manager.get_pressed_keys(), vec!["CapsLockOff".to_string()]);
    }

    #[test]
    fn test_native_toggle_adopts_reported_state() {
        let mut manager = keeping();
        let raw = RawInputEvent::key_code("KeyA").with_modifier_state("NumLock", true);
        manager.process(&KeyEvent::down(["KeyA"]).with_event(raw));
        assert!(manager.keys().get("NumLock").unwrap().toggle_on_pressed());

        // A press reporting "off" does not flip to "on".
        let raw = RawInputEvent::key_code("NumLock").with_modifier_state("NumLock", false);
        manager.process(&KeyEvent::down(["NumLock"]).with_event(raw));
        assert!(manager.keys().get("NumLock").unwrap().toggle_off_pressed());
        assert!(manager.chain().chords()[0].contains("NumLockOff"));
    }

    #[test]
    fn test_carry_modifiers_into_new_chord() {
        let mut manager = keeping();
        press(&mut manager, "ControlLeft");
        press(&mut manager, "KeyA");
        manager
            .set(
                crate::Mutation::State(crate::StateChange::NextIsChord(true)),
                Default::default(),
            )
            .unwrap();
        press(&mut manager, "KeyB");
        assert_eq!(manager.chain().chords()[1], Chord::new(["ControlLeft", "KeyB"]));
    }

    #[test]
    fn test_recording_closes_chords() {
        let mut manager = Manager::new();
        manager.add_keys(keys()).unwrap();
        manager.start_recording().unwrap();

        press(&mut manager, "ControlLeft");
        press(&mut manager, "KeyA");
        release(&mut manager, "KeyA");
        release(&mut manager, "ControlLeft");
        press(&mut manager, "KeyB");
        release(&mut manager, "KeyB");

        let recorded = manager.stop_recording().unwrap();
        assert_eq!(recorded.to_string(), "ControlLeft+KeyA, KeyB");
        assert!(manager.chain().is_empty());
    }
}
