//! Shared toolbar registry.
//!
//! Several tables on one page share a single detached toolbar. Each editor
//! registers with the registry it was given; the one the user last focused
//! is active. The toolbar queues commands here and reads back the active
//! editor's published state.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::Value;

use crate::toolbar::ToolbarState;

/// Handle to an editor registered with a [`ToolbarRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

pub type SharedRegistry = Rc<RefCell<ToolbarRegistry>>;

#[derive(Debug, Default)]
pub struct ToolbarRegistry {
    next_id: u64,
    editors: Vec<EditorId>,
    active: Option<EditorId>,
    pending: VecDeque<(EditorId, String, Value)>,
    states: HashMap<EditorId, ToolbarState>,
}

impl ToolbarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register a new editor. The first one becomes active.
    pub fn register(&mut self) -> EditorId {
        self.next_id += 1;
        let id = EditorId(self.next_id);
        self.editors.push(id);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    /// Drop an editor and anything queued for it. If it was active, the
    /// most recently registered remaining editor takes over.
    pub fn unregister(&mut self, id: EditorId) {
        self.editors.retain(|e| *e != id);
        self.pending.retain(|(target, _, _)| *target != id);
        self.states.remove(&id);
        if self.active == Some(id) {
            self.active = self.editors.last().copied();
        }
    }

    /// Make `id` the editor the toolbar drives. False if it is not registered.
    pub fn activate(&mut self, id: EditorId) -> bool {
        if !self.editors.contains(&id) {
            return false;
        }
        if self.active != Some(id) {
            log::debug!("toolbar now drives editor {}", id.0);
        }
        self.active = Some(id);
        true
    }

    pub fn active(&self) -> Option<EditorId> {
        self.active
    }

    pub fn is_registered(&self, id: EditorId) -> bool {
        self.editors.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Queue a command for the active editor. False when no editor is registered.
    pub fn dispatch(&mut self, command: &str, value: Value) -> bool {
        let Some(target) = self.active else {
            log::debug!("toolbar command '{command}' dropped: no active editor");
            return false;
        };
        self.pending.push_back((target, command.to_string(), value));
        true
    }

    /// Take the commands queued for `id`, oldest first.
    pub fn take_commands(&mut self, id: EditorId) -> Vec<(String, Value)> {
        let mut taken = Vec::new();
        self.pending.retain(|(target, command, value)| {
            if *target == id {
                taken.push((command.clone(), value.clone()));
                false
            } else {
                true
            }
        });
        taken
    }

    pub fn publish(&mut self, id: EditorId, state: ToolbarState) {
        if self.editors.contains(&id) {
            self.states.insert(id, state);
        }
    }

    pub fn state(&self, id: EditorId) -> Option<&ToolbarState> {
        self.states.get(&id)
    }

    /// State the shared toolbar should display.
    pub fn active_state(&self) -> Option<&ToolbarState> {
        self.active.and_then(|id| self.states.get(&id))
    }
}
