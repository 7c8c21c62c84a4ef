//! Integration tests for registration, validation and hooks.

use std::sync::Arc;

use horizon_shortcuts::{
    Chain, Chord, Command, CommandChange, Condition, ErrorKind, HookEvent, Key, KeyEvent, Manager,
    Mutation, MutationKind, SetOptions, SetOutcome, Shortcut, ShortcutChange, ShortcutError,
};
use parking_lot::Mutex;

fn chain(chords: &[&[&str]]) -> Chain {
    chords.iter().map(|ids| Chord::new(ids.iter().copied())).collect()
}

fn editor() -> Manager {
    let mut manager = Manager::new();
    manager
        .add_keys([
            Key::new("ControlLeft").with_label("Ctrl").modifier(),
            Key::new("ShiftLeft").with_label("Shift").modifier(),
            Key::new("KeyA"),
            Key::new("KeyB"),
            Key::new("KeyS"),
        ])
        .unwrap();
    manager.add_command(Command::new("save")).unwrap();
    manager.add_command(Command::new("select-all")).unwrap();
    manager
}

// =============================================================================
// Check Only and Vetoes
// =============================================================================

#[test]
fn test_check_only_leaves_state_untouched() {
    let mut manager = editor();
    let outcome = manager
        .set(
            Mutation::AddShortcut(
                Shortcut::new(chain(&[&["KeyS", "ControlLeft"]])).with_command("save"),
            ),
            SetOptions::check_only(),
        )
        .unwrap();

    assert_eq!(outcome, SetOutcome::Checked);
    assert!(manager.shortcuts().is_empty());

    let err = manager
        .set(
            Mutation::AddShortcut(Shortcut::new(chain(&[&["KeyS", "KeyA"]]))),
            SetOptions::check_only(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChordWithMultipleNormalKeys);
}

#[test]
fn test_can_hook_vetoes_registration() {
    let mut manager = editor();
    let handle = manager.add_can_hook(MutationKind::AddShortcut, |_, mutation| {
        match mutation {
            Mutation::AddShortcut(shortcut) if shortcut.command() == Some("save") => {
                Err(ShortcutError::vetoed("save is reserved"))
            }
            _ => Ok(()),
        }
    });

    let err = manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Vetoed);
    assert_eq!(err.to_string(), "Mutation vetoed: save is reserved");
    assert!(manager.shortcuts().is_empty());

    manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyA"]])).with_command("select-all"))
        .unwrap();

    manager.remove_hook(handle);
    assert_eq!(manager.hook_count(HookEvent::CanSet(MutationKind::AddShortcut)), 0);
    manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();
    assert_eq!(manager.shortcuts().len(), 2);
}

#[test]
fn test_did_hook_sees_state_changes() {
    let mut manager = editor();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    manager.add_did_hook(MutationKind::StateChain, move |manager, _, _| {
        seen_clone.lock().push(manager.chain().to_string());
    });

    manager.process(&KeyEvent::down(["ControlLeft"]));
    manager.process(&KeyEvent::down(["KeyS"]));

    assert_eq!(*seen.lock(), vec!["ControlLeft", "ControlLeft+KeyS"]);
}

// =============================================================================
// Duplicates and Conflicts
// =============================================================================

#[test]
fn test_duplicate_requires_equal_condition() {
    let mut manager = editor();
    let first = manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    manager
        .add_shortcut(
            Shortcut::new(chain(&[&["ControlLeft", "KeyS"]]))
                .with_command("save")
                .with_condition("editor.focused"),
        )
        .unwrap();

    let err = manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyS", "ControlLeft"]])).with_command("save"))
        .unwrap_err();
    match err {
        ShortcutError::DuplicateShortcut { existing, .. } => assert_eq!(existing, first),
        other => panic!("unexpected error: {other}"),
    }

    manager
        .add_shortcut(
            Shortcut::new(chain(&[&["ControlLeft", "KeyS"]]))
                .with_command("save")
                .force_unequal(),
        )
        .unwrap();
    assert_eq!(manager.shortcuts().len(), 3);
}

#[test]
fn test_find_conflicts_reports_prefixes() {
    let mut manager = editor();
    let short = manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyA"]])).with_command("select-all"))
        .unwrap();

    let conflicts = manager.find_conflicts(
        &chain(&[&["ControlLeft", "KeyA"], &["KeyB"]]),
        &Condition::default(),
    );
    assert_eq!(conflicts, vec![short]);

    let gated = manager.find_conflicts(
        &chain(&[&["ControlLeft", "KeyA"], &["KeyB"]]),
        &Condition::new("terminal"),
    );
    assert!(gated.is_empty());
}

// =============================================================================
// Removal and Renames
// =============================================================================

#[test]
fn test_remove_key_in_use() {
    let mut manager = editor();
    manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    let err = manager.remove_key("KeyS", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyInUse);
    assert!(manager.keys().contains("KeyS"));

    manager.remove_key("KeyS", true).unwrap();
    assert!(!manager.keys().contains("KeyS"));
    assert!(manager.shortcuts().is_empty());
}

#[test]
fn test_rename_command_updates_shortcuts() {
    let mut manager = editor();
    let id = manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    manager
        .set_command("save", CommandChange::Name("write".to_string()))
        .unwrap();

    assert!(manager.commands().contains("write"));
    assert!(!manager.commands().contains("save"));
    assert_eq!(manager.shortcuts().get(id).unwrap().command(), Some("write"));
}

#[test]
fn test_shortcut_chain_change_is_validated() {
    let mut manager = editor();
    let id = manager
        .add_shortcut(Shortcut::new(chain(&[&["ControlLeft", "KeyS"]])).with_command("save"))
        .unwrap();

    let err = manager
        .set_shortcut(id, ShortcutChange::Chain(chain(&[&["ControlLeft", "ShiftLeft"]])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChordWithOnlyModifiers);

    manager
        .set_shortcut(id, ShortcutChange::Chain(chain(&[&["KeyB", "ShiftLeft"]])))
        .unwrap();
    assert_eq!(manager.shortcuts().get(id).unwrap().chain().to_string(), "ShiftLeft+KeyB");
}

// =============================================================================
// Recording and Rendering
// =============================================================================

#[test]
fn test_recording_captures_chain() {
    let mut manager = editor();
    manager.start_recording().unwrap();

    manager.process(&KeyEvent::down(["ControlLeft"]));
    manager.process(&KeyEvent::down(["KeyS"]));
    manager.process(&KeyEvent::up(["KeyS"]));
    manager.process(&KeyEvent::up(["ControlLeft"]));
    manager.process(&KeyEvent::down(["KeyB"]));
    manager.process(&KeyEvent::up(["KeyB"]));

    let recorded = manager.stop_recording().unwrap();
    assert_eq!(recorded.to_string(), "ControlLeft+KeyS, KeyB");
    assert_eq!(manager.stringify_chain(&recorded), "Ctrl+KeyS, KeyB");
    assert!(manager.validate_chain(&recorded).is_ok());
}

#[test]
fn test_stringify_shortcut() {
    let mut manager = editor();
    let id = manager
        .add_shortcut(Shortcut::new(chain(&[&["KeyS", "ControlLeft"]])).with_command("save"))
        .unwrap();

    assert_eq!(manager.stringify_shortcut(id).as_deref(), Some("Ctrl+KeyS (save)"));
}
