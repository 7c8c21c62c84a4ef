//! Matching the current chain against the active shortcuts.

use horizon_shortcuts_core::{shortcuts_debug, targets};

use crate::chain::{SequenceMatch, is_full_prefix};
use crate::command::{Execution, Phase};
use crate::error::ShortcutError;
use crate::event::RawInputEvent;
use crate::manager::Manager;
use crate::mutation::{Mutation, StateChange};
use crate::options::NoMatchPolicy;
use crate::shortcut::{Shortcut, ShortcutId};

impl Manager {
    /// Whether a shortcut can currently trigger: it is enabled, its
    /// condition holds and its command exists with a condition that holds.
    /// A shortcut without a command qualifies only when
    /// `allow_empty_command` is set.
    pub fn is_shortcut_active(&self, shortcut: &Shortcut) -> bool {
        let evaluator = &*self.options.evaluator;
        if !shortcut.is_enabled() || !evaluator.eval(shortcut.condition(), &self.context) {
            return false;
        }
        match shortcut.command() {
            Some(name) => self
                .commands
                .get(name)
                .is_some_and(|command| evaluator.eval(command.condition(), &self.context)),
            None => self.options.allow_empty_command,
        }
    }

    /// Ids of the shortcuts that can currently trigger.
    pub fn active_shortcuts(&self) -> Vec<ShortcutId> {
        self.shortcuts
            .iter()
            .filter(|(_, shortcut)| self.is_shortcut_active(shortcut))
            .map(|(id, _)| id)
            .collect()
    }

    /// Compare the current chain against a registered shortcut.
    pub fn match_chain(&self, id: ShortcutId) -> SequenceMatch {
        match self.shortcuts.get(id) {
            Some(shortcut) => SequenceMatch::of(
                &self.state.chain,
                shortcut.chain(),
                &self.keys,
                self.options.allow_variants,
            ),
            None => SequenceMatch::NoMatch,
        }
    }

    /// Whether some active shortcut is longer than the current chain and
    /// starts with it.
    pub(crate) fn is_chain_extended(&self) -> bool {
        let chain = &self.state.chain;
        self.shortcuts.iter().any(|(_, shortcut)| {
            shortcut.chain().len() > chain.len()
                && self.is_shortcut_active(shortcut)
                && is_full_prefix(chain, shortcut.chain(), &self.keys, self.options.allow_variants)
        })
    }

    /// Resolve the current chain after it changed.
    ///
    /// On key-down a single exact match triggers, several exact matches are
    /// reported as ambiguous, and a chain no active shortcut can grow into
    /// is handled by the no-match policy. Key-up never triggers.
    pub(crate) fn resolve(&mut self, phase: Phase, raw: Option<&RawInputEvent>) {
        if self.state.chain.is_empty() || self.state.is_recording {
            return;
        }
        let _span = tracing::trace_span!(target: targets::RESOLVER, "resolve", ?phase).entered();

        let mut exact = Vec::new();
        let mut reachable = false;
        for id in self.active_shortcuts() {
            match self.match_chain(id) {
                SequenceMatch::ExactMatch => exact.push(id),
                SequenceMatch::PartialMatch => reachable = true,
                SequenceMatch::NoMatch => {}
            }
        }
        tracing::trace!(
            target: targets::RESOLVER,
            chain = %self.state.chain,
            exact = exact.len(),
            reachable,
            "resolved"
        );

        match (phase, exact.as_slice()) {
            (Phase::KeyDown, [id]) => self.trigger(*id, raw),
            (Phase::KeyDown, [_, _, ..]) => {
                let error = ShortcutError::MultipleMatchingShortcuts {
                    chain: self.state.chain.clone(),
                    shortcuts: exact,
                };
                self.fail(error, raw);
            }
            (_, []) if !reachable => self.no_match(raw),
            _ => {}
        }
    }

    fn no_match(&mut self, raw: Option<&RawInputEvent>) {
        match self.options.no_match {
            NoMatchPolicy::ClearChain => {
                shortcuts_debug!(chain = %self.state.chain, "no shortcut reachable, clearing chain");
                if let Err(err) = self.clear_chain() {
                    self.fail(err, raw);
                }
            }
            NoMatchPolicy::Keep => {}
        }
    }

    fn trigger(&mut self, id: ShortcutId, raw: Option<&RawInputEvent>) {
        tracing::debug!(target: targets::RESOLVER, shortcut = ?id, chain = %self.state.chain, "trigger");
        self.commit_or_fail(Mutation::State(StateChange::NextIsChord(true)), raw);
        self.commit_or_fail(Mutation::State(StateChange::IsAwaitingKeyup(true)), raw);
        self.commit_or_fail(Mutation::State(StateChange::Untrigger(Some(id))), raw);
        self.execute(id, Phase::KeyDown, raw);
    }

    /// Run the execute callback of a shortcut's command.
    pub(crate) fn execute(&mut self, id: ShortcutId, phase: Phase, raw: Option<&RawInputEvent>) {
        let Some(shortcut) = self.shortcuts.get(id).cloned() else {
            return;
        };
        let execute = shortcut
            .command()
            .and_then(|name| self.commands.get(name))
            .and_then(|command| command.execute().cloned());
        let Some(execute) = execute else {
            return;
        };
        let execution = Execution {
            phase,
            shortcut_id: id,
            shortcut: &shortcut,
            event: raw,
        };
        execute(self, &execution);
    }
}
