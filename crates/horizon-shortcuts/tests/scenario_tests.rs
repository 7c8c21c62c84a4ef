//! End-to-end tests feeding key events through a manager.

use std::sync::Arc;

use horizon_shortcuts::{
    Chain, Chord, Command, ErrorKind, Key, KeyEvent, Manager, ManagerBuilder, Phase, Shortcut,
    ToggleMode,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

type Calls = Arc<Mutex<Vec<(String, Phase)>>>;

/// Route engine logs to the test output. `RUST_LOG=horizon_shortcuts=trace`
/// shows every mutation.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn recording_command(name: &str, calls: &Calls) -> Command {
    let calls = calls.clone();
    let tag = name.to_string();
    Command::new(name).with_execute(move |_, exec| calls.lock().push((tag.clone(), exec.phase)))
}

fn chain(chords: &[&[&str]]) -> Chain {
    chords.iter().map(|ids| Chord::new(ids.iter().copied())).collect()
}

fn down(manager: &mut Manager, id: &str) {
    manager.process(&KeyEvent::down([id]));
}

fn up(manager: &mut Manager, id: &str) {
    manager.process(&KeyEvent::up([id]));
}

fn tap(manager: &mut Manager, id: &str) {
    down(manager, id);
    up(manager, id);
}

fn keydowns(calls: &Calls) -> Vec<String> {
    calls
        .lock()
        .iter()
        .filter(|(_, phase)| *phase == Phase::KeyDown)
        .map(|(name, _)| name.clone())
        .collect()
}

// =============================================================================
// Variants
// =============================================================================

#[test]
fn test_variant_matches_generic_key() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_keys([
            Key::new("Control")
                .modifier()
                .with_variants(["ControlLeft", "ControlRight"]),
            Key::new("ControlLeft").modifier(),
            Key::new("ControlRight").modifier(),
            Key::new("KeyK"),
        ])
        .unwrap();
    manager.add_command(recording_command("kill", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["Control", "KeyK"]])).with_command("kill"))
        .unwrap();

    down(&mut manager, "ControlRight");
    down(&mut manager, "KeyK");
    up(&mut manager, "KeyK");
    up(&mut manager, "ControlRight");

    assert_eq!(keydowns(&calls), vec!["kill"]);
}

#[test]
fn test_variants_can_be_disabled() {
    let calls: Calls = Default::default();
    let mut manager = ManagerBuilder::new().allow_variants(false).build();
    manager
        .add_keys([
            Key::new("Control")
                .modifier()
                .with_variants(["ControlLeft", "ControlRight"]),
            Key::new("ControlRight").modifier(),
            Key::new("KeyK"),
        ])
        .unwrap();
    manager.add_command(recording_command("kill", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["Control", "KeyK"]])).with_command("kill"))
        .unwrap();

    down(&mut manager, "ControlRight");
    down(&mut manager, "KeyK");

    assert!(calls.lock().is_empty());
}

// =============================================================================
// Chains
// =============================================================================

#[test]
fn test_double_tap_needs_release() {
    init_tracing();
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager.add_key(Key::new("KeyG")).unwrap();
    manager.add_command(recording_command("top", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyG"], &["KeyG"]])).with_command("top"))
        .unwrap();

    // Auto-repeat delivers more key-downs without a release.
    for _ in 0..4 {
        down(&mut manager, "KeyG");
    }
    assert!(calls.lock().is_empty());

    up(&mut manager, "KeyG");
    assert!(manager.state().next_is_chord);
    down(&mut manager, "KeyG");
    assert_eq!(keydowns(&calls), vec!["top"]);

    up(&mut manager, "KeyG");
    assert!(manager.chain().is_empty());
    assert!(!manager.state().is_awaiting_keyup);
}

#[test]
fn test_releasing_unrelated_key_keeps_chord_open() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager.add_keys([Key::new("KeyG"), Key::new("KeyX")]).unwrap();
    manager.add_command(recording_command("top", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyG"], &["KeyG"]])).with_command("top"))
        .unwrap();

    down(&mut manager, "KeyX");
    down(&mut manager, "KeyG");
    up(&mut manager, "KeyX");
    assert_eq!(manager.chain().to_string(), "KeyG");
    assert!(!manager.state().next_is_chord);

    // Still held: auto-repeat must not count as a second tap.
    down(&mut manager, "KeyG");
    down(&mut manager, "KeyG");
    assert!(calls.lock().is_empty());

    up(&mut manager, "KeyG");
    down(&mut manager, "KeyG");
    assert_eq!(keydowns(&calls), vec!["top"]);
}

#[test]
fn test_repeat_after_chord_closes_is_ignored() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_keys([
            Key::new("ControlLeft").modifier(),
            Key::new("KeyK"),
            Key::new("KeyL"),
        ])
        .unwrap();
    manager.add_command(recording_command("comment", &calls)).unwrap();
    manager
        .add_shortcut(
            Shortcut::new(chain(&[&["ControlLeft", "KeyK"], &["KeyL"]])).with_command("comment"),
        )
        .unwrap();

    down(&mut manager, "ControlLeft");
    down(&mut manager, "KeyK");
    up(&mut manager, "ControlLeft");
    assert!(manager.state().next_is_chord);

    down(&mut manager, "KeyK");
    assert_eq!(manager.chain().to_string(), "ControlLeft+KeyK");

    up(&mut manager, "KeyK");
    down(&mut manager, "KeyL");
    assert_eq!(keydowns(&calls), vec!["comment"]);
}

#[test]
fn test_multi_chord_chain() {
    init_tracing();
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_keys([
            Key::new("ControlLeft").modifier(),
            Key::new("KeyA"),
            Key::new("KeyB"),
        ])
        .unwrap();
    manager.add_command(recording_command("chain", &calls)).unwrap();
    let id = manager
        .add_shortcut(
            Shortcut::new(chain(&[&["ControlLeft", "KeyA"], &["KeyB"]])).with_command("chain"),
        )
        .unwrap();

    down(&mut manager, "ControlLeft");
    down(&mut manager, "KeyA");
    up(&mut manager, "KeyA");
    up(&mut manager, "ControlLeft");
    assert!(calls.lock().is_empty());

    down(&mut manager, "KeyB");
    assert_eq!(keydowns(&calls), vec!["chain"]);
    assert_eq!(manager.state().untrigger, Some(id));

    up(&mut manager, "KeyB");
    assert_eq!(
        *calls.lock(),
        vec![
            ("chain".to_string(), Phase::KeyDown),
            ("chain".to_string(), Phase::KeyUp),
        ]
    );
    assert!(manager.chain().is_empty());
}

#[test]
fn test_unreachable_chain_is_cleared() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_keys([Key::new("KeyA"), Key::new("KeyB"), Key::new("KeyC")])
        .unwrap();
    manager.add_command(recording_command("ab", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"], &["KeyB"]])).with_command("ab"))
        .unwrap();

    tap(&mut manager, "KeyA");
    tap(&mut manager, "KeyC");
    assert!(manager.chain().is_empty());

    // The stray key did not poison the next attempt.
    tap(&mut manager, "KeyA");
    tap(&mut manager, "KeyB");
    assert_eq!(keydowns(&calls), vec!["ab"]);
}

// =============================================================================
// Ambiguity
// =============================================================================

#[test]
fn test_ambiguous_shortcuts_do_not_execute() {
    let calls: Calls = Default::default();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_clone = errors.clone();
    let mut manager = ManagerBuilder::new()
        .callback(move |manager, error, _| {
            errors_clone.lock().push(error.kind());
            manager.clear_chain().unwrap();
        })
        .build();
    manager.add_key(Key::new("KeyA")).unwrap();
    manager.add_command(recording_command("one", &calls)).unwrap();
    manager.add_command(recording_command("two", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"]])).with_command("one"))
        .unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"]])).with_command("two"))
        .unwrap();

    down(&mut manager, "KeyA");

    assert_eq!(*errors.lock(), vec![ErrorKind::MultipleMatchingShortcuts]);
    assert!(calls.lock().is_empty());
}

#[test]
fn test_default_callback_resets_chain_on_ambiguity() {
    init_tracing();
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager.add_key(Key::new("KeyA")).unwrap();
    manager.add_command(recording_command("one", &calls)).unwrap();
    manager.add_command(recording_command("two", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"]])).with_command("one"))
        .unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"]])).with_command("two"))
        .unwrap();

    down(&mut manager, "KeyA");

    assert!(manager.chain().is_empty());
    assert!(!manager.state().is_awaiting_keyup);
    assert!(calls.lock().is_empty());
}

#[test]
fn test_condition_resolves_ambiguity() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager.add_key(Key::new("KeyA")).unwrap();
    manager.add_command(recording_command("one", &calls)).unwrap();
    manager.add_command(recording_command("two", &calls)).unwrap();
    manager
        .add_shortcut(
            Shortcut::new(chain(&[&["KeyA"]]))
                .with_command("one")
                .with_condition("!terminal"),
        )
        .unwrap();
    manager
        .add_shortcut(
            Shortcut::new(chain(&[&["KeyA"]]))
                .with_command("two")
                .with_condition("terminal"),
        )
        .unwrap();

    tap(&mut manager, "KeyA");
    manager
        .set_context(serde_json::json!({ "terminal": true }))
        .unwrap();
    tap(&mut manager, "KeyA");

    assert_eq!(keydowns(&calls), vec!["one", "two"]);
}

// =============================================================================
// Toggles
// =============================================================================

#[test]
fn test_toggle_states_trigger_separately() {
    init_tracing();
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_key(Key::new("CapsLock").toggle(ToggleMode::Emulated))
        .unwrap();
    manager.add_command(recording_command("caps-on", &calls)).unwrap();
    manager.add_command(recording_command("caps-off", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["CapsLockOn"]])).with_command("caps-on"))
        .unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["CapsLockOff"]])).with_command("caps-off"))
        .unwrap();

    down(&mut manager, "CapsLock");
    let key = manager.keys().get("CapsLock").unwrap();
    assert!(key.toggle_on_pressed());
    assert!(!key.toggle_off_pressed());
    assert_eq!(manager.get_pressed_keys(), vec!["CapsLockOn"]);
    up(&mut manager, "CapsLock");

    tap(&mut manager, "CapsLock");
    assert_eq!(keydowns(&calls), vec!["caps-on", "caps-off"]);
    assert_eq!(manager.get_pressed_keys(), vec!["CapsLockOff"]);
}

// =============================================================================
// Untrigger
// =============================================================================

#[test]
fn test_untrigger_runs_once_with_reentrant_release() {
    init_tracing();
    let calls: Calls = Default::default();
    let calls_clone = calls.clone();
    let mut manager = Manager::new();
    manager.add_key(Key::new("KeyA")).unwrap();
    manager
        .add_command(Command::new("nested").with_execute(move |manager, exec| {
            calls_clone.lock().push(("nested".to_string(), exec.phase));
            if exec.phase == Phase::KeyUp {
                manager.process(&KeyEvent::up(["KeyA"]));
            }
        }))
        .unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyA"]])).with_command("nested"))
        .unwrap();

    down(&mut manager, "KeyA");
    up(&mut manager, "KeyA");
    up(&mut manager, "KeyA");

    assert_eq!(
        *calls.lock(),
        vec![
            ("nested".to_string(), Phase::KeyDown),
            ("nested".to_string(), Phase::KeyUp),
        ]
    );
    assert!(!manager.state().is_awaiting_keyup);
    assert!(manager.chain().is_empty());
}

#[test]
fn test_modifier_held_after_trigger_allows_repeat() {
    let calls: Calls = Default::default();
    let mut manager = Manager::new();
    manager
        .add_keys([Key::new("ControlLeft").modifier(), Key::new("KeyS")])
        .unwrap();
    manager.add_command(recording_command("save", &calls)).unwrap();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    down(&mut manager, "ControlLeft");
    tap(&mut manager, "KeyS");
    tap(&mut manager, "KeyS");
    up(&mut manager, "ControlLeft");

    assert_eq!(keydowns(&calls), vec!["save", "save"]);
}
