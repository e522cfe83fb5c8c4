//! Singly-linked list with pluggable node storage.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use chunkalloc_arena::{AllocError, ElementAllocator, HeapAllocator};

type Link<T> = Option<NonNull<ListNode<T>>>;

/// Storage unit of an [`ArenaList`]. Opaque outside this crate.
pub struct ListNode<T> {
    value: T,
    next: Link<T>,
}

/// A singly-linked list that appends at the tail.
///
/// `A` allocates `T`; the list rebinds it to [`ListNode<T>`] at
/// construction and keeps only the rebound allocator. Every
/// [`add`](Self::add) allocates exactly one node.
///
/// Clearing or dropping the list releases nodes from the tail back to
/// the head.
pub struct ArenaList<T, A: ElementAllocator<T> = HeapAllocator<T>> {
    alloc: A::Rebind<ListNode<T>>,
    head: Link<T>,
    tail: Link<T>,
    len: usize,
    _owns: PhantomData<T>,
}

impl<T, A: ElementAllocator<T> + Default> ArenaList<T, A> {
    /// Create an empty list with a default-constructed allocator.
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<T, A: ElementAllocator<T>> ArenaList<T, A> {
    /// Create an empty list whose nodes come from `alloc` rebound to
    /// [`ListNode<T>`].
    pub fn with_allocator(alloc: A) -> Self {
        Self {
            alloc: alloc.rebind::<ListNode<T>>(),
            head: None,
            tail: None,
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Append `value` at the tail.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's error unchanged (for a chunk arena,
    /// [`AllocError::CapacityExceeded`]). The list is left unchanged and
    /// `value` is dropped.
    pub fn add(&mut self, value: T) -> Result<(), AllocError> {
        let node = self.alloc.allocate(1)?;
        // SAFETY: `node` is fresh, uninitialised storage for one node.
        unsafe { self.alloc.construct(node, ListNode { value, next: None }) };

        match self.tail {
            // SAFETY: `tail` is a live node owned by this list.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
        Ok(())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First element.
    pub fn front(&self) -> Option<&T> {
        // SAFETY: nodes stay live while `self` is borrowed.
        self.head.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Last element.
    pub fn back(&self) -> Option<&T> {
        // SAFETY: nodes stay live while `self` is borrowed.
        self.tail.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Iterate from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            _list: PhantomData,
        }
    }

    /// The rebound node allocator.
    pub fn allocator(&self) -> &A::Rebind<ListNode<T>> {
        &self.alloc
    }

    /// Remove every element, releasing nodes newest first.
    ///
    /// A release failure is logged and the remaining nodes are still
    /// released. Use [`try_clear`](Self::try_clear) to observe it.
    pub fn clear(&mut self) {
        if let Err(err) = self.try_clear() {
            tracing::error!(%err, "failed to release list nodes");
        }
    }

    /// Remove every element, releasing nodes newest first.
    ///
    /// Every value is dropped and every node is handed back even when a
    /// release fails; the list is empty afterwards either way.
    ///
    /// # Errors
    ///
    /// Returns the first error the allocator reported while releasing.
    pub fn try_clear(&mut self) -> Result<(), AllocError> {
        // Reverse the chain in place so the tail comes first.
        let mut reversed: Link<T> = None;
        let mut cursor = self.head.take();
        self.tail = None;
        self.len = 0;
        while let Some(node) = cursor {
            // SAFETY: every node in the chain is live and owned by us.
            unsafe {
                cursor = (*node.as_ptr()).next;
                (*node.as_ptr()).next = reversed;
            }
            reversed = Some(node);
        }

        let mut result = Ok(());
        let mut cursor = reversed;
        while let Some(node) = cursor {
            // SAFETY: `node` is live; it is unlinked before being destroyed
            // and released with the count it was allocated with.
            unsafe {
                cursor = (*node.as_ptr()).next;
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

impl<T, A: ElementAllocator<T> + Default> Default for ArenaList<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: ElementAllocator<T>> Drop for ArenaList<T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Elements separated by single spaces, head first.
impl<T: fmt::Display, A: ElementAllocator<T>> fmt::Display for ArenaList<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        if let Some(first) = iter.next() {
            write!(f, "{first}")?;
            for value in iter {
                write!(f, " {value}")?;
            }
        }
        Ok(())
    }
}

impl<T: fmt::Debug, A: ElementAllocator<T>> fmt::Debug for ArenaList<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, A: ElementAllocator<T>> IntoIterator for &'a ArenaList<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Borrowing iterator over an [`ArenaList`], head to tail.
pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    _list: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        // SAFETY: the list is borrowed for `'a`, so its nodes are live.
        let node = unsafe { &*node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkalloc_arena::{ArenaState, ChunkAllocator};
    use chunkalloc_test_utils::{RecordingAllocator, RejectingAllocator};
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    /// Appends its id to a shared log when dropped.
    struct Tracked {
        id: u32,
        drops: Rc<RefCell<Vec<u32>>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn add_appends_in_order() {
        let mut list: ArenaList<i32> = ArenaList::new();
        for i in 0..5 {
            list.add(i).unwrap();
        }
        assert_eq!(list.len(), 5);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(list.front(), Some(&0));
        assert_eq!(list.back(), Some(&4));
    }

    #[test]
    fn empty_list() {
        let list: ArenaList<String> = ArenaList::default();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.to_string(), "");
        assert_eq!(format!("{list:?}"), "[]");
    }

    #[test]
    fn display_is_space_separated() {
        let mut list: ArenaList<i32> = ArenaList::new();
        for i in [3, 1, 4] {
            list.add(i).unwrap();
        }
        assert_eq!(list.to_string(), "3 1 4");
        assert_eq!(format!("{list:?}"), "[3, 1, 4]");
    }

    #[test]
    fn chunk_backed_list_fills_its_arena() {
        let mut list = ArenaList::<u8, ChunkAllocator<u8, 4>>::new();
        for i in 0..4 {
            list.add(i).unwrap();
        }
        assert_eq!(list.allocator().state(), ArenaState::Full);
        assert_eq!(
            list.add(4),
            Err(AllocError::CapacityExceeded {
                requested: 1,
                remaining: 0
            })
        );
        assert_eq!(list.len(), 4);
        assert_eq!(list.to_string(), "0 1 2 3");
    }

    #[test]
    fn clear_releases_every_slot() {
        let mut list = ArenaList::<u32, ChunkAllocator<u32, 3>>::new();
        for i in 0..3 {
            list.add(i).unwrap();
        }
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.allocator().state(), ArenaState::Fresh);

        // The arena is reusable after a clear.
        list.add(9).unwrap();
        assert_eq!(list.to_string(), "9");
    }

    #[test]
    fn drop_destroys_tail_first() {
        let drops = Rc::new(RefCell::new(Vec::new()));
        {
            let mut list = ArenaList::<Tracked, ChunkAllocator<Tracked, 4>>::new();
            for id in 0..4 {
                list.add(Tracked {
                    id,
                    drops: Rc::clone(&drops),
                })
                .unwrap();
            }
        }
        assert_eq!(*drops.borrow(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn nodes_are_released_in_reverse_order() {
        let alloc = RecordingAllocator::<i64>::new();
        let log = alloc.shared_log();
        {
            let mut list: ArenaList<i64, _> = ArenaList::with_allocator(alloc);
            for i in 0..6 {
                list.add(i).unwrap();
            }
            assert_eq!(log.borrow().live_count(), 6);
        }
        let log = log.borrow();
        assert!(log.is_balanced());
        assert_eq!(log.out_of_order_releases(), 0);
    }

    #[test]
    fn try_clear_surfaces_release_failure() {
        let alloc = RejectingAllocator::<u16>::new(AllocError::ForeignPointer);
        let mut list: ArenaList<u16, _> = ArenaList::with_allocator(alloc);
        for i in 0..3 {
            list.add(i).unwrap();
        }
        assert_eq!(list.try_clear(), Err(AllocError::ForeignPointer));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.to_string(), "");

        list.add(7).unwrap();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.try_clear(), Ok(()));
    }

    #[test]
    fn panicking_destructor_leaves_list_consistently_empty() {
        struct Fragile(bool);
        impl Drop for Fragile {
            fn drop(&mut self) {
                if self.0 {
                    panic!("value destructor failed");
                }
            }
        }

        let mut list = ArenaList::<Fragile, ChunkAllocator<Fragile, 4>>::new();
        for i in 0..3 {
            list.add(Fragile(i == 1)).unwrap();
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| list.clear()));
        assert!(outcome.is_err());

        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.iter().len(), 0);
        assert!(list.back().is_none());
    }

    #[test]
    fn exact_size_iterator() {
        let mut list: ArenaList<char> = ArenaList::new();
        list.add('a').unwrap();
        list.add('b').unwrap();
        let mut iter = list.iter();
        assert_eq!(iter.len(), 2);
        iter.next();
        assert_eq!(iter.len(), 1);
        let collected: String = (&list).into_iter().collect();
        assert_eq!(collected, "ab");
    }
}
