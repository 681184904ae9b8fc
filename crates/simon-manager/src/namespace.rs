// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The hierarchical namespace of a [`Manager`](crate::Manager).
//!
//! Nodes live in an arena and are addressed by generation-checked [`NodeId`]s;
//! a name index maps every full name to its node. All structural edits
//! (creating a path, removing a node or a subtree) happen under one write lock
//! and are therefore atomic with respect to lookups. Statistics are never
//! touched under this lock except to re-check staleness during purge removal.

use crate::counter::Counter;
use crate::stopwatch::Stopwatch;
use crate::sync::{read, write};
use simon_core::{SimonError, SimonKind, SimonName, SimonResult, SimonState};
use std::collections::HashMap;
use std::sync::RwLock;

/// A stable identifier of a namespace node.
///
/// Identifiers of removed nodes never alias a node created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// The root node.
    pub const ROOT: NodeId = NodeId {
        index: 0,
        generation: 0,
    };
}

/// The measurement point attached to a node, if any.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A plain namespace node.
    Unknown,
    /// A registered stopwatch.
    Stopwatch(Stopwatch),
    /// A registered counter.
    Counter(Counter),
}

impl Entry {
    /// The kind of the attached point.
    pub fn kind(&self) -> SimonKind {
        match self {
            Entry::Unknown => SimonKind::Unknown,
            Entry::Stopwatch(_) => SimonKind::Stopwatch,
            Entry::Counter(_) => SimonKind::Counter,
        }
    }

    pub(crate) fn is_stale(&self, threshold: u64) -> bool {
        match self {
            Entry::Unknown => true,
            Entry::Stopwatch(sw) => sw.is_stale(threshold),
            Entry::Counter(c) => c.is_stale(threshold),
        }
    }

    pub(crate) fn purge_increments_older_than(&self, threshold: u64) -> usize {
        match self {
            Entry::Unknown => 0,
            Entry::Stopwatch(sw) => sw.purge_increments_older_than(threshold),
            Entry::Counter(c) => c.purge_increments_older_than(threshold),
        }
    }
}

/// How [`Namespace::remove`] treats a node with children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovePolicy {
    /// Refuse with [`SimonError::HasChildren`].
    LeafOnly,
    /// Remove the node and its whole subtree.
    Cascade,
}

/// A read-only description of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// The node identifier.
    pub id: NodeId,
    /// The full name.
    pub name: String,
    /// What is attached to the node.
    pub kind: SimonKind,
    /// The locally configured state.
    pub state: SimonState,
    /// Number of direct children.
    pub child_count: usize,
}

/// The view of a node handed to purge predicates.
pub(crate) struct NodeView<'a> {
    pub entry: &'a Entry,
    pub state: SimonState,
    pub has_children: bool,
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    state: SimonState,
    entry: Entry,
}

impl Node {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            state: SimonState::Inherit,
            entry: Entry::Unknown,
        }
    }

    fn view(&self) -> NodeView<'_> {
        NodeView {
            entry: &self.entry,
            state: self.state,
            has_children: !self.children.is_empty(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: HashMap<String, NodeId>,
}

impl Arena {
    fn with_root() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), NodeId::ROOT);
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(String::new(), None)),
            }],
            free: Vec::new(),
            index,
        }
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn lookup(&self, name: &str) -> Option<&Node> {
        self.index.get(name).and_then(|id| self.get(*id))
    }

    fn len(&self) -> usize {
        self.index.len() - 1
    }

    fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Creates every missing node along `name` and returns the last one.
    fn create_path(&mut self, name: &SimonName) -> NodeId {
        let mut parent = NodeId::ROOT;
        for prefix in name.prefixes() {
            if let Some(id) = self.index.get(prefix) {
                parent = *id;
                continue;
            }
            let id = self.insert(Node::new(prefix.to_string(), Some(parent)));
            if let Some(p) = self.get_mut(parent) {
                p.children.push(id);
            }
            self.index.insert(prefix.to_string(), id);
            log::trace!("Namespace node created: {prefix}");
            parent = id;
        }
        parent
    }

    /// Frees the slot of a single node and unlinks it from its parent and the index.
    fn detach(&mut self, id: NodeId) -> Option<Node> {
        if id == NodeId::ROOT {
            return None;
        }
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.index.remove(&node.name);
        if let Some(parent) = node.parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        Some(node)
    }

    fn detach_subtree(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.detach(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    fn effective_enabled(&self, mut id: NodeId) -> bool {
        while let Some(node) = self.get(id) {
            match node.state {
                SimonState::Enabled => return true,
                SimonState::Disabled => return false,
                SimonState::Inherit => match node.parent {
                    Some(parent) => id = parent,
                    None => return true,
                },
            }
        }
        true
    }

    fn info(&self, id: NodeId) -> Option<NodeInfo> {
        self.get(id).map(|node| NodeInfo {
            id,
            name: node.name.clone(),
            kind: node.entry.kind(),
            state: node.state,
            child_count: node.children.len(),
        })
    }
}

/// The thread-safe namespace tree.
#[derive(Debug)]
pub struct Namespace {
    arena: RwLock<Arena>,
}

impl Namespace {
    /// Creates a namespace holding only the root.
    pub fn new() -> Self {
        Self {
            arena: RwLock::new(Arena::with_root()),
        }
    }

    /// Returns the node for `name`, creating it and any missing ancestors.
    ///
    /// Idempotent: an existing node is returned as is.
    pub fn resolve_or_create(&self, name: &str) -> SimonResult<NodeId> {
        if let Some(id) = read(&self.arena).index.get(name) {
            return Ok(*id);
        }
        let parsed = SimonName::parse(name)?;
        Ok(write(&self.arena).create_path(&parsed))
    }

    /// Whether a node exists under `name`.
    pub fn exists(&self, name: &str) -> bool {
        read(&self.arena).index.contains_key(name)
    }

    /// Removes the node named `name`.
    ///
    /// Returns `Ok(false)` if there is no such node. The root cannot be removed.
    pub fn remove(&self, name: &str, policy: RemovePolicy) -> SimonResult<bool> {
        if name.is_empty() {
            return Err(SimonError::invalid_name(name, "the root cannot be removed"));
        }
        let mut arena = write(&self.arena);
        let Some(id) = arena.index.get(name).copied() else {
            return Ok(false);
        };
        let has_children = arena.get(id).is_some_and(|n| !n.children.is_empty());
        match (policy, has_children) {
            (RemovePolicy::LeafOnly, true) => Err(SimonError::HasChildren(name.to_string())),
            (RemovePolicy::Cascade, true) => {
                let removed = arena.detach_subtree(id);
                log::debug!("Namespace subtree '{name}' removed ({removed} nodes)");
                Ok(true)
            }
            (_, false) => Ok(arena.detach(id).is_some()),
        }
    }

    /// Direct children of `name`, empty if the node does not exist.
    pub fn children(&self, name: &str) -> Vec<NodeInfo> {
        let arena = read(&self.arena);
        arena
            .lookup(name)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|child| arena.info(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Describes the node named `name`.
    pub fn info(&self, name: &str) -> Option<NodeInfo> {
        let arena = read(&self.arena);
        arena.index.get(name).and_then(|id| arena.info(*id))
    }

    /// Number of nodes, not counting the root.
    pub fn len(&self) -> usize {
        read(&self.arena).len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every node except the root.
    pub fn clear(&self) {
        *write(&self.arena) = Arena::with_root();
    }

    /// Sets the local state of `name`, creating the node if needed.
    pub fn set_state(&self, name: &str, state: SimonState) -> SimonResult<()> {
        let parsed = SimonName::parse(name)?;
        let mut arena = write(&self.arena);
        let id = arena.create_path(&parsed);
        if let Some(node) = arena.get_mut(id) {
            node.state = state;
        }
        Ok(())
    }

    /// The locally configured state of `name`.
    pub fn state(&self, name: &str) -> Option<SimonState> {
        read(&self.arena).lookup(name).map(|node| node.state)
    }

    /// Resolves the enabled flag of `name` from the nearest explicit ancestor.
    ///
    /// A name that does not exist yet resolves through its nearest existing ancestor.
    pub fn is_enabled(&self, name: &str) -> bool {
        let arena = read(&self.arena);
        if let Some(id) = arena.index.get(name) {
            return arena.effective_enabled(*id);
        }
        let Ok(parsed) = SimonName::parse(name) else {
            return false;
        };
        let nearest = parsed
            .prefixes()
            .into_iter()
            .rev()
            .find_map(|prefix| arena.index.get(prefix).copied())
            .unwrap_or(NodeId::ROOT);
        arena.effective_enabled(nearest)
    }

    /// The entry attached to `name`.
    pub fn entry(&self, name: &str) -> Option<Entry> {
        read(&self.arena).lookup(name).map(|node| node.entry.clone())
    }

    /// Every attached stopwatch and counter, in no particular order.
    pub fn entries(&self) -> Vec<Entry> {
        read(&self.arena)
            .slots
            .iter()
            .filter_map(|slot| slot.node.as_ref())
            .filter(|node| !matches!(node.entry, Entry::Unknown))
            .map(|node| node.entry.clone())
            .collect()
    }

    /// Names of every node carrying a stopwatch or counter, sorted.
    pub fn point_names(&self) -> Vec<String> {
        let arena = read(&self.arena);
        let mut names: Vec<String> = arena
            .slots
            .iter()
            .filter_map(|slot| slot.node.as_ref())
            .filter(|node| !matches!(node.entry, Entry::Unknown))
            .map(|node| node.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns the entry of `name` if it has the wanted kind, attaching a fresh
    /// one built by `make` when the node is missing or a plain namespace node.
    ///
    /// Also reports the effective enabled flag of the node.
    pub(crate) fn get_or_attach(
        &self,
        name: &str,
        kind: SimonKind,
        make: impl FnOnce() -> Entry,
    ) -> SimonResult<(Entry, bool)> {
        {
            let arena = read(&self.arena);
            if let Some(id) = arena.index.get(name).copied() {
                if let Some(node) = arena.get(id) {
                    if node.entry.kind() == kind {
                        return Ok((node.entry.clone(), arena.effective_enabled(id)));
                    }
                    check_kind(name, kind, &node.entry)?;
                }
            }
        }

        let parsed = SimonName::parse(name)?;
        if parsed.is_root() {
            return Err(SimonError::invalid_name(
                name,
                "the root cannot hold a measurement point",
            ));
        }
        let mut arena = write(&self.arena);
        let id = arena.create_path(&parsed);
        let enabled = arena.effective_enabled(id);
        let Some(node) = arena.get_mut(id) else {
            return Err(SimonError::IllegalState(format!(
                "namespace node '{name}' vanished during creation"
            )));
        };
        check_kind(name, kind, &node.entry)?;
        if matches!(node.entry, Entry::Unknown) {
            node.entry = make();
            log::debug!("Simon created: {name} ({kind})");
        }
        Ok((node.entry.clone(), enabled))
    }

    /// Detaches the point of `name`. A node with children stays as a plain node.
    pub(crate) fn destroy(&self, name: &str) -> SimonResult<bool> {
        if name.is_empty() {
            return Err(SimonError::invalid_name(name, "the root cannot be destroyed"));
        }
        let mut arena = write(&self.arena);
        let Some(id) = arena.index.get(name).copied() else {
            return Ok(false);
        };
        let Some(node) = arena.get_mut(id) else {
            return Ok(false);
        };
        if node.children.is_empty() {
            Ok(arena.detach(id).is_some())
        } else {
            let had_point = !matches!(node.entry, Entry::Unknown);
            node.entry = Entry::Unknown;
            Ok(had_point)
        }
    }

    /// Collects up to `batch` live node ids starting at slot `cursor`.
    ///
    /// Returns the ids and the cursor for the next call, which wraps to `0` once
    /// the end of the arena is reached.
    pub(crate) fn scan(&self, cursor: usize, batch: usize) -> (Vec<NodeId>, usize) {
        let arena = read(&self.arena);
        let start = cursor.clamp(1, arena.slots.len().max(1));
        let mut ids = Vec::with_capacity(batch.min(arena.slots.len()));
        let mut next = 0;
        for (index, slot) in arena.slots.iter().enumerate().skip(start) {
            if ids.len() == batch {
                next = index;
                break;
            }
            if slot.node.is_some() {
                ids.push(NodeId {
                    index: index as u32,
                    generation: slot.generation,
                });
            }
        }
        (ids, next)
    }

    /// The entry of a node addressed by id.
    pub(crate) fn entry_by_id(&self, id: NodeId) -> Option<Entry> {
        read(&self.arena).get(id).map(|node| node.entry.clone())
    }

    /// Removes `id` if `removable` holds for it, then keeps removing ancestors
    /// that became childless and satisfy `removable`. Returns the removed names.
    pub(crate) fn remove_if(
        &self,
        id: NodeId,
        removable: impl Fn(&NodeView<'_>) -> bool,
    ) -> Vec<String> {
        let mut arena = write(&self.arena);
        let mut removed = Vec::new();
        let mut current = Some(id);
        while let Some(candidate) = current.filter(|c| *c != NodeId::ROOT) {
            let Some(node) = arena.get(candidate) else {
                break;
            };
            if !removable(&node.view()) {
                break;
            }
            let parent = node.parent;
            match arena.detach(candidate) {
                Some(node) => removed.push(node.name),
                None => break,
            }
            current = parent;
        }
        removed
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

fn check_kind(name: &str, expected: SimonKind, entry: &Entry) -> SimonResult<()> {
    match entry.kind() {
        SimonKind::Unknown => Ok(()),
        found if found == expected => Ok(()),
        found => Err(SimonError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        }),
    }
}
