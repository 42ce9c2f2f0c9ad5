//! `SlotStore`: generational slot storage with ownership tracking.
//!
//! Each slot carries a payload, a liveness state and a generation counter.
//! Freed slots are recycled through a LIFO free list; every `free` bumps the
//! slot's generation so previously issued handles become detectably stale
//! without ever becoming valid handles to the new occupant.
//!
//! Beyond the plain generational arena, the store tracks two extra maps that
//! make cross-container transplants safe:
//!
//! - an *alias table* mapping (foreign owner, foreign index) to a local
//!   index, populated when slots are adopted from another store, so handles
//!   issued before a `move_from`/`cut` keep resolving against the new owner;
//! - a *retired set* of owner ids invalidated wholesale by `clear`, so every
//!   handle from a cleared lifetime reports as an end handle rather than
//!   colliding with recycled indices.

use std::collections::{HashMap, HashSet};

use super::handle::{GraphId, Handle};
use crate::error::{GraphError, Result};

enum SlotState<T> {
    Occupied(T),
    Free { next: Option<u32> },
}

struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// The contents of a store drained by a transplant: every occupied slot as
/// (index, generation, payload) in ascending index order, plus the maps the
/// destination must fold into its own.
pub(crate) struct Drained<T> {
    pub owner: GraphId,
    pub slots: Vec<(u32, u32, T)>,
    pub aliases: HashMap<(GraphId, u32), u32>,
    pub retired: HashSet<GraphId>,
}

pub(crate) struct SlotStore<K, T> {
    owner: GraphId,
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
    aliases: HashMap<(GraphId, u32), u32>,
    retired: HashSet<GraphId>,
    _kind: core::marker::PhantomData<fn() -> K>,
}

impl<K, T> SlotStore<K, T> {
    pub fn new(owner: GraphId) -> Self {
        Self {
            owner,
            slots: Vec::new(),
            free_head: None,
            len: 0,
            aliases: HashMap::new(),
            retired: HashSet::new(),
            _kind: core::marker::PhantomData,
        }
    }

    pub fn owner(&self) -> GraphId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive upper bound on slot indices ever issued; suitable for
    /// sizing dense per-slot scratch tables in the algorithms.
    pub fn slot_bound(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Allocates a slot, reusing a freed one if available.
    pub fn allocate(&mut self, value: T) -> Handle<K> {
        self.len += 1;
        if let Some(idx) = self.free_head {
            let slot = &mut self.slots[idx as usize];
            match slot.state {
                SlotState::Free { next } => self.free_head = next,
                SlotState::Occupied(_) => unreachable!("free list references an occupied slot"),
            }
            slot.state = SlotState::Occupied(value);
            Handle::new(self.owner, idx, slot.generation)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                state: SlotState::Occupied(value),
            });
            Handle::new(self.owner, idx, 0)
        }
    }

    /// Appends a slot transplanted from another store, preserving its
    /// generation. Appending (never reusing a freed slot) guarantees the
    /// imported generation cannot resurrect a stale local handle.
    pub fn adopt(&mut self, value: T, generation: u32) -> u32 {
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation,
            state: SlotState::Occupied(value),
        });
        self.len += 1;
        idx
    }

    /// Maps a handle to its current local slot index.
    ///
    /// Owner identity is checked before staleness: a handle from a different
    /// live graph is [`GraphError::WrongOwner`], a handle from a retired
    /// lifetime of this graph (or a freed slot) is
    /// [`GraphError::InvalidHandle`], and the null sentinel is
    /// [`GraphError::InvalidArgument`].
    pub fn resolve(&self, handle: Handle<K>) -> Result<u32> {
        let owner = handle
            .owner()
            .ok_or(GraphError::InvalidArgument("null handle"))?;
        let index = if owner == self.owner {
            handle.index()
        } else if let Some(&local) = self.aliases.get(&(owner, handle.index())) {
            local
        } else if self.retired.contains(&owner) {
            return Err(GraphError::InvalidHandle);
        } else {
            return Err(GraphError::WrongOwner);
        };
        match self.slots.get(index as usize) {
            Some(slot)
                if slot.generation == handle.generation()
                    && matches!(slot.state, SlotState::Occupied(_)) =>
            {
                Ok(index)
            }
            _ => Err(GraphError::InvalidHandle),
        }
    }

    pub fn is_valid(&self, handle: Handle<K>) -> bool {
        self.resolve(handle).is_ok()
    }

    /// True for the null sentinel and for any handle whose entire lifetime
    /// was retired by `clear`. A stale but previously-real handle of the
    /// current lifetime is *not* an end handle.
    pub fn is_end(&self, handle: Handle<K>) -> bool {
        match handle.owner() {
            None => true,
            Some(owner) => self.retired.contains(&owner),
        }
    }

    /// True when the handle was issued against this store's identity,
    /// directly, through a transplant alias, or in a retired lifetime.
    /// Ownership is independent of validity.
    pub fn owns(&self, handle: Handle<K>) -> bool {
        match handle.owner() {
            None => false,
            Some(owner) => {
                owner == self.owner
                    || self.aliases.contains_key(&(owner, handle.index()))
                    || self.retired.contains(&owner)
            }
        }
    }

    pub fn get(&self, handle: Handle<K>) -> Result<&T> {
        let idx = self.resolve(handle)?;
        Ok(self.get_at(idx))
    }

    pub fn get_mut(&mut self, handle: Handle<K>) -> Result<&mut T> {
        let idx = self.resolve(handle)?;
        Ok(self.get_at_mut(idx))
    }

    /// Frees the referenced slot, returning its payload and bumping the
    /// generation so the handle (and all its copies) become stale.
    pub fn free(&mut self, handle: Handle<K>) -> Result<T> {
        let idx = self.resolve(handle)?;
        Ok(self.free_index(idx))
    }

    /// Frees a slot by index. Internal: the index must reference a live slot.
    pub fn free_index(&mut self, index: u32) -> T {
        let slot = &mut self.slots[index as usize];
        let state = core::mem::replace(
            &mut slot.state,
            SlotState::Free {
                next: self.free_head,
            },
        );
        match state {
            SlotState::Occupied(value) => {
                slot.generation = slot.generation.wrapping_add(1);
                self.free_head = Some(index);
                self.len -= 1;
                value
            }
            SlotState::Free { .. } => unreachable!("free_index on a freed slot"),
        }
    }

    pub fn occupied(&self, index: u32) -> bool {
        matches!(
            self.slots.get(index as usize),
            Some(Slot {
                state: SlotState::Occupied(_),
                ..
            })
        )
    }

    pub fn get_at(&self, index: u32) -> &T {
        match &self.slots[index as usize].state {
            SlotState::Occupied(value) => value,
            SlotState::Free { .. } => unreachable!("index references a freed slot"),
        }
    }

    pub fn get_at_mut(&mut self, index: u32) -> &mut T {
        match &mut self.slots[index as usize].state {
            SlotState::Occupied(value) => value,
            SlotState::Free { .. } => unreachable!("index references a freed slot"),
        }
    }

    pub fn generation_at(&self, index: u32) -> u32 {
        self.slots[index as usize].generation
    }

    /// Rebuilds the handle for a live slot under the current owner.
    pub fn handle_at(&self, index: u32) -> Handle<K> {
        Handle::new(self.owner, index, self.slots[index as usize].generation)
    }

    /// Occupied slot indices in ascending (storage) order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot.state, SlotState::Occupied(_)))
            .map(|(i, _)| i as u32)
    }

    /// Registers a transplant alias from a foreign handle position to a
    /// local slot index.
    pub fn alias(&mut self, foreign_owner: GraphId, foreign_index: u32, local: u32) {
        self.aliases.insert((foreign_owner, foreign_index), local);
    }

    /// Removes and returns the alias entries whose local index satisfies the
    /// predicate; used by `cut` to hand moved entries to the new owner.
    pub fn extract_aliases(
        &mut self,
        mut select: impl FnMut(u32) -> bool,
    ) -> Vec<((GraphId, u32), u32)> {
        let moved: Vec<_> = self
            .aliases
            .iter()
            .filter(|&(_, &local)| select(local))
            .map(|(&key, &local)| (key, local))
            .collect();
        for (key, _) in &moved {
            self.aliases.remove(key);
        }
        moved
    }

    pub fn merge_retired(&mut self, retired: impl IntoIterator<Item = GraphId>) {
        self.retired.extend(retired);
    }

    /// Empties the store for a `move_from`, returning everything the
    /// destination needs and leaving this store pristine under `new_owner`.
    pub fn drain(&mut self, new_owner: GraphId) -> Drained<T> {
        let owner = core::mem::replace(&mut self.owner, new_owner);
        let slots = core::mem::take(&mut self.slots);
        let aliases = core::mem::take(&mut self.aliases);
        let retired = core::mem::take(&mut self.retired);
        self.free_head = None;
        self.len = 0;
        let slots = slots
            .into_iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot.state {
                SlotState::Occupied(value) => Some((i as u32, slot.generation, value)),
                SlotState::Free { .. } => None,
            })
            .collect();
        Drained {
            owner,
            slots,
            aliases,
            retired,
        }
    }

    /// Frees every slot and retires the current lifetime (and every aliased
    /// one), so all previously issued handles become end handles. The store
    /// continues under `new_owner`.
    pub fn clear_retiring(&mut self, new_owner: GraphId) {
        let old = core::mem::replace(&mut self.owner, new_owner);
        self.retired.insert(old);
        let aliases = core::mem::take(&mut self.aliases);
        self.retired.extend(aliases.into_keys().map(|(owner, _)| owner));
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl<K, T: Clone> SlotStore<K, T> {
    /// Structural copy under a fresh identity. Handles issued against the
    /// original do not resolve against the copy.
    pub fn clone_with(&self, owner: GraphId) -> Self {
        Self {
            owner,
            slots: self
                .slots
                .iter()
                .map(|slot| Slot {
                    generation: slot.generation,
                    state: match &slot.state {
                        SlotState::Occupied(value) => SlotState::Occupied(value.clone()),
                        SlotState::Free { next } => SlotState::Free { next: *next },
                    },
                })
                .collect(),
            free_head: self.free_head,
            len: self.len,
            aliases: HashMap::new(),
            retired: HashSet::new(),
            _kind: core::marker::PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::handle::NodeKind;

    fn store() -> SlotStore<NodeKind, i32> {
        SlotStore::new(GraphId::fresh())
    }

    #[test]
    fn allocate_get_free() {
        let mut s = store();
        let h1 = s.allocate(10);
        let h2 = s.allocate(20);
        assert_eq!(s.len(), 2);
        assert_eq!(*s.get(h1).unwrap(), 10);
        assert_eq!(*s.get(h2).unwrap(), 20);

        assert_eq!(s.free(h1).unwrap(), 10);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(h1), Err(GraphError::InvalidHandle));
        assert_eq!(s.free(h1), Err(GraphError::InvalidHandle));
    }

    #[test]
    fn reuse_bumps_generation() {
        let mut s = store();
        let h1 = s.allocate(1);
        s.free(h1).unwrap();
        let h2 = s.allocate(2);
        // Slot reused, old handle stays stale.
        assert_eq!(*s.get(h2).unwrap(), 2);
        assert_eq!(s.get(h1), Err(GraphError::InvalidHandle));
        assert_ne!(h1, h2);
    }

    #[test]
    fn wrong_owner_is_distinct_from_stale() {
        let mut a = store();
        let mut b = store();
        let ha = a.allocate(1);
        let _hb = b.allocate(2);
        assert_eq!(b.get(ha), Err(GraphError::WrongOwner));
        assert!(a.owns(ha));
        assert!(!b.owns(ha));
    }

    #[test]
    fn null_handle_is_rejected() {
        let s = store();
        assert_eq!(
            s.resolve(Handle::null()),
            Err(GraphError::InvalidArgument("null handle"))
        );
        assert!(s.is_end(Handle::null()));
    }

    #[test]
    fn clear_retires_all_handles() {
        let mut s = store();
        let h = s.allocate(5);
        s.clear_retiring(GraphId::fresh());
        assert!(s.is_end(h));
        assert!(!s.is_valid(h));
        assert_eq!(s.get(h), Err(GraphError::InvalidHandle));
        // Fresh allocations at the recycled index do not collide.
        let h2 = s.allocate(6);
        assert!(!s.is_end(h2));
        assert_eq!(*s.get(h2).unwrap(), 6);
    }
}
