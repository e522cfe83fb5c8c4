//! Ordered map with pluggable node storage.
//!
//! [`ArenaMap`] is an unbalanced binary search tree. Besides the tree
//! links, every node points at the node inserted just before it. That
//! chain lets [`ArenaMap::clear`] release nodes strictly newest first, the
//! order a stack allocator needs, whatever shape the tree has.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use chunkalloc_arena::{AllocError, ElementAllocator, HeapAllocator};

type Link<K, V> = Option<NonNull<MapNode<K, V>>>;

/// Storage unit of an [`ArenaMap`]. Opaque outside this crate.
pub struct MapNode<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    /// Node inserted immediately before this one.
    older: Link<K, V>,
}

/// An ordered map from `K` to `V`.
///
/// `A` allocates `(K, V)` entries; the map rebinds it to
/// [`MapNode<K, V>`] at construction and keeps only the rebound
/// allocator. Each new key allocates one node; overwriting an existing
/// key allocates nothing.
///
/// Entries cannot be removed individually. [`clear`](Self::clear) and
/// drop release all nodes in reverse insertion order.
pub struct ArenaMap<K, V, A: ElementAllocator<(K, V)> = HeapAllocator<(K, V)>> {
    alloc: A::Rebind<MapNode<K, V>>,
    root: Link<K, V>,
    /// Most recently inserted node, head of the `older` chain.
    newest: Link<K, V>,
    len: usize,
    _owns: PhantomData<(K, V)>,
}

impl<K, V, A: ElementAllocator<(K, V)> + Default> ArenaMap<K, V, A> {
    /// Create an empty map with a default-constructed allocator.
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<K, V, A: ElementAllocator<(K, V)>> ArenaMap<K, V, A> {
    /// Create an empty map whose nodes come from `alloc` rebound to
    /// [`MapNode<K, V>`].
    pub fn with_allocator(alloc: A) -> Self {
        Self {
            alloc: alloc.rebind::<MapNode<K, V>>(),
            root: None,
            newest: None,
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The rebound node allocator.
    pub fn allocator(&self) -> &A::Rebind<MapNode<K, V>> {
        &self.alloc
    }

    /// Iterate over entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.len,
            _map: PhantomData,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.extreme(|node| node.left)
    }

    /// Entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.extreme(|node| node.right)
    }

    fn extreme(&self, step: impl Fn(&MapNode<K, V>) -> Link<K, V>) -> Option<(&K, &V)> {
        let mut node = self.root?;
        // SAFETY: nodes stay live while `self` is borrowed.
        unsafe {
            while let Some(next) = step(&*node.as_ptr()) {
                node = next;
            }
            let node = &*node.as_ptr();
            Some((&node.key, &node.value))
        }
    }

    /// Remove every entry, releasing nodes newest first.
    ///
    /// A release failure is logged and the remaining nodes are still
    /// released. Use [`try_clear`](Self::try_clear) to observe it.
    pub fn clear(&mut self) {
        if let Err(err) = self.try_clear() {
            tracing::error!(%err, "failed to release map nodes");
        }
    }

    /// Remove every entry, releasing nodes newest first.
    ///
    /// Every value is dropped and every node is handed back even when a
    /// release fails; the map is empty afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns the first error the allocator reported while releasing.
    pub fn try_clear(&mut self) -> Result<(), AllocError> {
        let mut cursor = self.newest.take();
        self.root = None;
        self.len = 0;

        let mut result = Ok(());
        while let Some(node) = cursor {
            // SAFETY: `node` is live and owned by us. Each node appears in
            // the `older` chain exactly once and is released with the
            // count it was allocated with.
            unsafe {
                cursor = (*node.as_ptr()).older;
                self.alloc.destroy(node);
                if let Err(err) = self.alloc.deallocate(node, 1) {
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        result
    }
}

impl<K: Ord, V, A: ElementAllocator<(K, V)>> ArenaMap<K, V, A> {
    /// Insert `value` under `key`.
    ///
    /// Returns the previous value if the key was present; in that case
    /// the value is replaced in place and nothing is allocated.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's error unchanged when a new node is
    /// needed (for a chunk arena, [`AllocError::CapacityExceeded`]). The
    /// map is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, AllocError> {
        let mut slot = &mut self.root;
        while let Some(node) = *slot {
            // SAFETY: `node` is live, and no other reference into it exists
            // while `self` is mutably borrowed.
            let node = unsafe { &mut *node.as_ptr() };
            match key.cmp(&node.key) {
                Ordering::Less => slot = &mut node.left,
                Ordering::Greater => slot = &mut node.right,
                Ordering::Equal => return Ok(Some(mem::replace(&mut node.value, value))),
            }
        }

        let node = self.alloc.allocate(1)?;
        let entry = MapNode {
            key,
            value,
            left: None,
            right: None,
            older: self.newest,
        };
        // SAFETY: `node` is fresh, uninitialised storage for one node.
        unsafe { self.alloc.construct(node, entry) };
        *slot = Some(node);
        self.newest = Some(node);
        self.len += 1;
        Ok(None)
    }

    /// Value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // SAFETY: nodes stay live while `self` is borrowed.
        self.find(key).map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // SAFETY: nodes stay live and unaliased while `self` is mutably
        // borrowed.
        self.find(key)
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(node) = cursor {
            // SAFETY: nodes stay live while `self` is borrowed.
            let node_ref = unsafe { &*node.as_ptr() };
            cursor = match key.cmp(node_ref.key.borrow()) {
                Ordering::Less => node_ref.left,
                Ordering::Greater => node_ref.right,
                Ordering::Equal => return Some(node),
            };
        }
        None
    }
}

impl<K, V, A: ElementAllocator<(K, V)> + Default> Default for ArenaMap<K, V, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, A: ElementAllocator<(K, V)>> Drop for ArenaMap<K, V, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: fmt::Debug, V: fmt::Debug, A: ElementAllocator<(K, V)>> fmt::Debug for ArenaMap<K, V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, A: ElementAllocator<(K, V)>> IntoIterator for &'a ArenaMap<K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// In-order iterator over an [`ArenaMap`].
pub struct Iter<'a, K, V> {
    /// Nodes whose left subtree is done but which are not yet yielded.
    stack: Vec<NonNull<MapNode<K, V>>>,
    remaining: usize,
    _map: PhantomData<(&'a K, &'a V)>,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left_spine(&mut self, mut link: Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            // SAFETY: the map is borrowed for the iterator's lifetime.
            link = unsafe { (*node.as_ptr()).left };
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let node = self.stack.pop()?;
        // SAFETY: the map is borrowed for `'a`, so its nodes are live.
        let node = unsafe { &*node.as_ptr() };
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
