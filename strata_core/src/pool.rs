// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable-instance pools keyed by tag.
//!
//! An [`ObjectPool`] hands out recycled instances when it has any and builds
//! fresh ones otherwise. Returning an instance runs the pool's reset hook,
//! which restores it to its canonical empty state. An [`ObjectManager`]
//! groups pools under tags; asking it for an unregistered tag is an error.
//!
//! Both factory and reset hooks receive an argument of type `A`, which is how
//! DOM node pools reach the host they create nodes in. Pools of plain values
//! use `A = ()`.
//!
//! Pools are single-threaded and do no locking.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Error, Result};

type Factory<T, A> = Box<dyn FnMut(&mut A) -> T>;
type Reset<T, A> = Box<dyn FnMut(&mut A, &mut T)>;

/// A free list of reusable `T`s with a factory and a reset hook.
pub struct ObjectPool<T, A> {
    free: Vec<T>,
    factory: Factory<T, A>,
    reset: Reset<T, A>,
    created: usize,
}

impl<T, A> fmt::Debug for ObjectPool<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("free", &self.free.len())
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl<T, A> ObjectPool<T, A> {
    /// Creates an empty pool.
    pub fn new(
        factory: impl FnMut(&mut A) -> T + 'static,
        reset: impl FnMut(&mut A, &mut T) + 'static,
    ) -> Self {
        Self {
            free: Vec::new(),
            factory: Box::new(factory),
            reset: Box::new(reset),
            created: 0,
        }
    }

    /// Returns the most recently released instance, or a fresh one.
    pub fn get(&mut self, args: &mut A) -> T {
        if let Some(item) = self.free.pop() {
            return item;
        }
        self.created += 1;
        (self.factory)(args)
    }

    /// Resets `item` and keeps it for the next [`get`](Self::get).
    pub fn put(&mut self, args: &mut A, mut item: T) {
        (self.reset)(args, &mut item);
        self.free.push(item);
    }

    /// Number of instances waiting to be reused.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of instances the factory has built so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }
}

/// A set of [`ObjectPool`]s addressed by tag.
pub struct ObjectManager<K, T, A> {
    pools: BTreeMap<K, ObjectPool<T, A>>,
}

impl<K: fmt::Debug, T, A> fmt::Debug for ObjectManager<K, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.pools.iter()).finish()
    }
}

impl<K: Ord, T, A> Default for ObjectManager<K, T, A> {
    fn default() -> Self {
        Self {
            pools: BTreeMap::new(),
        }
    }
}

impl<K: Ord + fmt::Debug, T, A> ObjectManager<K, T, A> {
    /// Creates a manager with no registered tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the pool for `tag`.
    pub fn register(
        &mut self,
        tag: K,
        factory: impl FnMut(&mut A) -> T + 'static,
        reset: impl FnMut(&mut A, &mut T) + 'static,
    ) {
        self.pools.insert(tag, ObjectPool::new(factory, reset));
    }

    /// Returns `true` if `tag` has a pool.
    #[must_use]
    pub fn is_registered(&self, tag: &K) -> bool {
        self.pools.contains_key(tag)
    }

    /// Takes an instance from the pool for `tag`.
    ///
    /// # Errors
    ///
    /// [`Error::UnregisteredPoolTag`] if `tag` has no pool.
    pub fn get(&mut self, tag: &K, args: &mut A) -> Result<T> {
        Ok(self.pool_mut(tag)?.get(args))
    }

    /// Resets `item` and returns it to the pool for `tag`.
    ///
    /// # Errors
    ///
    /// [`Error::UnregisteredPoolTag`] if `tag` has no pool; `item` is dropped.
    pub fn put(&mut self, tag: &K, args: &mut A, item: T) -> Result<()> {
        self.pool_mut(tag)?.put(args, item);
        Ok(())
    }

    /// Returns the pool for `tag`, if registered.
    #[must_use]
    pub fn pool(&self, tag: &K) -> Option<&ObjectPool<T, A>> {
        self.pools.get(tag)
    }

    fn pool_mut(&mut self, tag: &K) -> Result<&mut ObjectPool<T, A>> {
        self.pools
            .get_mut(tag)
            .ok_or_else(|| Error::UnregisteredPoolTag(format!("{tag:?}")))
    }
}
