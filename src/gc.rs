//! Mark-and-sweep garbage collection.
//!
//! Objects are kept alive by being reachable from `Guard` roots through the
//! edges reported by `Traceable::trace`. Reference counts only keep memory valid
//! for Rust handles; they never decide liveness. A collection resets every
//! unreachable object (clearing its outgoing edges, which breaks cycles) and
//! drops the heap's own handle to it.
//!
//! Collections only run when asked for (`Heap::collect`, `Heap::collect_if_needed`).
//! Nothing in the runtime collects in the middle of an operation.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};

// ============================================================================
// Gc - shared handle to a heap object
// ============================================================================

/// A handle to a GC-managed object.
///
/// Cloning is cheap. Two handles are equal when they point to the same object.
pub struct Gc<T: Traceable> {
    inner: Rc<GcBox<T>>,
}

struct GcBox<T> {
    /// Heap-unique id, never reused
    id: usize,
    data: RefCell<T>,
    /// Set once the collector found this object unreachable
    swept: Cell<bool>,
}

impl<T: Traceable> Gc<T> {
    /// Create a handle that no heap tracks. Used when allocating after the heap is gone.
    fn untracked(id: usize, data: T) -> Self {
        Self {
            inner: Rc::new(GcBox {
                id,
                data: RefCell::new(data),
                swept: Cell::new(false),
            }),
        }
    }

    /// Borrow the inner data immutably
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.data.borrow()
    }

    /// Borrow the inner data, or `None` while it is mutably borrowed
    pub fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.inner.data.try_borrow().ok()
    }

    /// Borrow the inner data mutably
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.data.borrow_mut()
    }

    /// Get the object's unique ID
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Check if two handles point to the same object
    pub fn ptr_eq(a: &Gc<T>, b: &Gc<T>) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Whether a collection has already reclaimed this object
    pub fn is_swept(&self) -> bool {
        self.inner.swept.get()
    }

    /// Create a weak handle that does not keep the object reachable
    pub fn downgrade(&self) -> WeakGc<T> {
        WeakGc {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Traceable> Clone for Gc<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Traceable> PartialEq for Gc<T> {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(self, other)
    }
}

impl<T: Traceable> Eq for Gc<T> {}

impl<T: Traceable> std::hash::Hash for Gc<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<T: Traceable> std::fmt::Debug for Gc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gc").field("id", &self.inner.id).finish()
    }
}

// ============================================================================
// WeakGc - handle that does not keep its target alive
// ============================================================================

/// A weak handle. Upgrading fails once the target has been swept.
pub struct WeakGc<T: Traceable> {
    id: usize,
    inner: Weak<GcBox<T>>,
}

impl<T: Traceable> WeakGc<T> {
    /// Get the target if it is still alive
    pub fn upgrade(&self) -> Option<Gc<T>> {
        let inner = self.inner.upgrade()?;
        if inner.swept.get() {
            return None;
        }
        Some(Gc { inner })
    }

    /// Id of the target object
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T: Traceable> Clone for WeakGc<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
        }
    }
}

impl<T: Traceable> std::fmt::Debug for WeakGc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakGc").field("id", &self.id).finish()
    }
}

// ============================================================================
// Traceable / Reset
// ============================================================================

/// Trait for types that can be traced by the garbage collector.
///
/// The collector calls `trace()` during the mark phase to discover every
/// strong `Gc<Self>` edge held by an object. Weak edges must not be reported.
pub trait Traceable: Sized + Reset {
    /// Visit all `Gc<Self>` references held by this object.
    fn trace<F: FnMut(&Gc<Self>)>(&self, visitor: F);
}

/// Trait for clearing an object once it has been found unreachable.
pub trait Reset {
    /// Drop every outgoing reference held by this object.
    fn reset(&mut self);
}

// ============================================================================
// Space - the internal arena
// ============================================================================

/// Default threshold: collect after this many allocations
const DEFAULT_GC_THRESHOLD: usize = 1024;

struct Space<T: Traceable> {
    /// Every object the heap still considers live
    objects: FxHashMap<usize, Gc<T>>,

    /// Roots, grouped by the guard that holds them
    roots: FxHashMap<usize, Vec<Gc<T>>>,

    /// Persistent mark stack, reused between cycles
    mark_stack: Vec<Gc<T>>,

    next_object_id: usize,
    next_guard_id: usize,

    /// Allocations since the last completed collection
    allocs_since_gc: usize,

    /// Threshold for `collect_if_needed` (0 = never)
    gc_threshold: usize,

    /// Number of completed collections
    collections: usize,
}

impl<T: Traceable> Space<T> {
    fn new() -> Self {
        Self {
            objects: FxHashMap::default(),
            roots: FxHashMap::default(),
            mark_stack: Vec::new(),
            next_object_id: 1,
            next_guard_id: 1,
            allocs_since_gc: 0,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            collections: 0,
        }
    }

    fn register_guard(&mut self) -> usize {
        let id = self.next_guard_id;
        self.next_guard_id += 1;
        self.roots.insert(id, Vec::new());
        id
    }

    fn alloc(&mut self, guard_id: usize, data: T) -> Gc<T> {
        let id = self.next_object_id;
        self.next_object_id += 1;

        let gc = Gc::untracked(id, data);
        self.objects.insert(id, gc.clone());
        self.roots.entry(guard_id).or_default().push(gc.clone());
        self.allocs_since_gc += 1;
        gc
    }

    /// Mark phase: returns the ids of every reachable object, or `None` when a
    /// reachable object is currently borrowed mutably and cannot be traced.
    fn mark(&mut self) -> Option<FxHashSet<usize>> {
        let mut marked = FxHashSet::default();
        let mut stack = std::mem::take(&mut self.mark_stack);
        stack.clear();

        for root in self.roots.values().flatten() {
            stack.push(root.clone());
        }

        let mut complete = true;
        while let Some(obj) = stack.pop() {
            if !marked.insert(obj.id()) {
                continue;
            }
            let Ok(data) = obj.inner.data.try_borrow() else {
                complete = false;
                break;
            };
            data.trace(|child| {
                if !marked.contains(&child.id()) {
                    stack.push(child.clone());
                }
            });
        }

        stack.clear();
        self.mark_stack = stack;
        complete.then_some(marked)
    }

    /// Sweep phase: reset and forget every unmarked object.
    /// Returns number of objects collected.
    fn sweep(&mut self, marked: &FxHashSet<usize>) -> usize {
        let unmarked: Vec<usize> = self
            .objects
            .keys()
            .filter(|id| !marked.contains(id))
            .copied()
            .collect();

        let mut dead = Vec::with_capacity(unmarked.len());
        for id in unmarked {
            let Some(obj) = self.objects.get(&id) else {
                continue;
            };
            // Skip anything still borrowed by the host; it is retried next cycle
            let Ok(mut data) = obj.inner.data.try_borrow_mut() else {
                continue;
            };
            data.reset();
            drop(data);
            obj.inner.swept.set(true);
            dead.push(id);
        }

        // Drop handles only after every reset, so cycles are fully broken first
        for id in &dead {
            self.objects.remove(id);
        }
        dead.len()
    }

    fn collect(&mut self) -> usize {
        let Some(marked) = self.mark() else {
            tracing::debug!("gc: reachable object busy, collection deferred");
            return 0;
        };
        let collected = self.sweep(&marked);
        self.allocs_since_gc = 0;
        self.collections += 1;
        tracing::debug!(
            collected,
            live = self.objects.len(),
            cycle = self.collections,
            "gc: collection finished"
        );
        collected
    }

    fn stats(&self) -> GcStats {
        GcStats {
            live_objects: self.objects.len(),
            roots: self.roots.values().map(Vec::len).sum(),
            guards: self.roots.len(),
            allocs_since_gc: self.allocs_since_gc,
            collections: self.collections,
        }
    }
}

// ============================================================================
// Heap - the public wrapper
// ============================================================================

/// A wrapper around the GC space that provides the public API.
pub struct Heap<T: Traceable> {
    inner: Rc<RefCell<Space<T>>>,
}

impl<T: Traceable> Heap<T> {
    /// Create a new heap
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Space::new())),
        }
    }

    /// Create a new guard for allocating and rooting objects
    pub fn create_guard(&self) -> Guard<T> {
        let id = self.inner.borrow_mut().register_guard();
        Guard {
            id,
            space: Rc::downgrade(&self.inner),
        }
    }

    /// Get statistics
    pub fn stats(&self) -> GcStats {
        self.inner.borrow().stats()
    }

    /// Force a garbage collection cycle. Returns the number of objects reclaimed.
    pub fn collect(&self) -> usize {
        self.inner.borrow_mut().collect()
    }

    /// Collect if the allocation threshold has been reached
    pub fn collect_if_needed(&self) -> usize {
        let due = {
            let space = self.inner.borrow();
            space.gc_threshold > 0 && space.allocs_since_gc >= space.gc_threshold
        };
        if due { self.collect() } else { 0 }
    }

    /// Set the GC threshold (0 = disable automatic collection)
    pub fn set_gc_threshold(&self, threshold: usize) {
        self.inner.borrow_mut().gc_threshold = threshold;
    }

    /// Current GC threshold
    pub fn gc_threshold(&self) -> usize {
        self.inner.borrow().gc_threshold
    }
}

impl<T: Traceable> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Guard - root anchor for objects
// ============================================================================

/// A root anchor that keeps objects alive.
///
/// Objects allocated through a guard, or added with `guard()`, are roots until
/// the guard is cleared or dropped.
pub struct Guard<T: Traceable> {
    id: usize,
    space: Weak<RefCell<Space<T>>>,
}

impl<T: Traceable> Guard<T> {
    /// Allocate a new object rooted by this guard.
    ///
    /// If the heap has already been dropped the object is still usable but
    /// untracked; it lives as long as Rust handles to it do.
    pub fn alloc(&self, data: T) -> Gc<T> {
        match self.space.upgrade() {
            Some(space) => space.borrow_mut().alloc(self.id, data),
            None => Gc::untracked(0, data),
        }
    }

    /// Add an existing object to this guard's roots.
    pub fn guard(&self, obj: &Gc<T>) {
        if obj.is_swept() {
            return;
        }
        if let Some(space) = self.space.upgrade() {
            space
                .borrow_mut()
                .roots
                .entry(self.id)
                .or_default()
                .push(obj.clone());
        }
    }

    /// Remove one occurrence of an object from this guard's roots.
    /// Returns true if the object was found and removed.
    pub fn unguard(&self, obj: &Gc<T>) -> bool {
        let Some(space) = self.space.upgrade() else {
            return false;
        };
        let mut space = space.borrow_mut();
        let Some(roots) = space.roots.get_mut(&self.id) else {
            return false;
        };
        if let Some(pos) = roots.iter().position(|r| Gc::ptr_eq(r, obj)) {
            roots.swap_remove(pos);
            return true;
        }
        false
    }

    /// Move every root of this guard into `other`
    pub fn transfer_to(&self, other: &Guard<T>) {
        let Some(space) = self.space.upgrade() else {
            return;
        };
        let mut space = space.borrow_mut();
        let moved = space
            .roots
            .get_mut(&self.id)
            .map(std::mem::take)
            .unwrap_or_default();
        space.roots.entry(other.id).or_default().extend(moved);
    }

    /// Clear all guarded objects
    pub fn clear(&self) {
        if let Some(space) = self.space.upgrade() {
            if let Some(roots) = space.borrow_mut().roots.get_mut(&self.id) {
                roots.clear();
            }
        }
    }

    /// Get the number of guarded objects
    pub fn len(&self) -> usize {
        self.space
            .upgrade()
            .and_then(|space| space.borrow().roots.get(&self.id).map(Vec::len))
            .unwrap_or(0)
    }

    /// Check if this guard has no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Traceable> Drop for Guard<T> {
    fn drop(&mut self) {
        if let Some(space) = self.space.upgrade() {
            match space.try_borrow_mut() {
                Ok(mut space) => {
                    space.roots.remove(&self.id);
                }
                Err(_) => tracing::warn!(guard = self.id, "gc: heap busy, guard roots leaked"),
            }
        }
    }
}

impl<T: Traceable> std::fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard").field("id", &self.id).finish()
    }
}

// ============================================================================
// GcStats - statistics about the GC
// ============================================================================

/// Statistics about the garbage collector
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GcStats {
    /// Objects the heap still tracks
    pub live_objects: usize,
    /// Root entries across all guards
    pub roots: usize,
    /// Guards currently registered
    pub guards: usize,
    /// Allocations since the last completed collection
    pub allocs_since_gc: usize,
    /// Completed collections
    pub collections: usize,
}

// ============================================================================
// Tests
// ============================================================================
