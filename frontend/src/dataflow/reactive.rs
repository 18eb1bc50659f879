//! Single-threaded reactive cell
//!
//! `Reactive<T>` is the value holder behind every piece of drag and property
//! state. Writes notify watchers synchronously, in registration order, after the
//! new value is stored. The same value is also mirrored into a `Mutable` so UI
//! trees can bind to it as a `Signal`.

use crate::dataflow::Subscription;
use futures_signals::signal::{Mutable, Signal};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Watcher<T> = Rc<dyn Fn(&T, Option<&T>)>;

struct ReactiveInner<T> {
    state: Mutable<T>,
    watchers: RefCell<Vec<(u64, Watcher<T>)>>,
    next_watcher_id: Cell<u64>,
}

/// Shared mutable cell that notifies its watchers on change.
///
/// Clones share the same value. Writing a value equal to the current one is
/// ignored, so watchers only ever see real transitions.
///
/// ```rust
/// use draggable::dataflow::Reactive;
///
/// let width = Reactive::new(100.0);
/// let _watch = width.watch(|new, old| println!("{old:?} -> {new}"));
/// width.set(120.0);
/// assert_eq!(width.get(), 120.0);
/// ```
pub struct Reactive<T> {
    inner: Rc<ReactiveInner<T>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Reactive<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(ReactiveInner {
                state: Mutable::new(initial),
                watchers: RefCell::new(Vec::new()),
                next_watcher_id: Cell::new(0),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.state.get_cloned()
    }

    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        let current = self.inner.state.lock_ref();
        f(&*current)
    }

    /// Store `value` and notify watchers if it differs from the current value.
    pub fn set(&self, value: T) {
        let old = {
            let current = self.inner.state.lock_ref();
            if *current == value {
                return;
            }
            current.clone()
        };
        self.inner.state.set(value.clone());
        self.notify(&value, Some(&old));
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with(f);
        self.set(next);
    }

    /// Register a watcher called with `(new, Some(old))` after every change.
    pub fn watch(&self, watcher: impl Fn(&T, Option<&T>) + 'static) -> Subscription {
        let id = self.inner.next_watcher_id.get();
        self.inner.next_watcher_id.set(id + 1);
        self.inner.watchers.borrow_mut().push((id, Rc::new(watcher)));

        let inner: Weak<ReactiveInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.watchers.borrow_mut().retain(|(watcher_id, _)| *watcher_id != id);
            }
        })
    }

    /// Like [`Reactive::watch`], but also runs the watcher once right away with
    /// `(current, None)`.
    pub fn watch_immediate(&self, watcher: impl Fn(&T, Option<&T>) + 'static) -> Subscription {
        let watcher: Watcher<T> = Rc::new(watcher);
        let subscription = self.watch({
            let watcher = watcher.clone();
            move |new, old| watcher(new, old)
        });
        let current = self.get();
        watcher(&current, None);
        subscription
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }

    pub fn signal(&self) -> impl Signal<Item = T> + use<T> {
        self.inner.state.signal_cloned()
    }

    fn notify(&self, new: &T, old: Option<&T>) {
        // Snapshot so watchers can (un)register or write cells while running.
        let watchers: Vec<Watcher<T>> = self
            .inner
            .watchers
            .borrow()
            .iter()
            .map(|(_, watcher)| watcher.clone())
            .collect();
        for watcher in watchers {
            watcher(new, old);
        }
    }
}

impl<T> Default for Reactive<T>
where
    T: Clone + PartialEq + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Reactive<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("value", &*self.inner.state.lock_ref())
            .field("watchers", &self.inner.watchers.borrow().len())
            .finish()
    }
}

/// Write half returned by [`use_state`].
pub struct StateSetter<T> {
    cell: Reactive<T>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> StateSetter<T>
where
    T: Clone + PartialEq + 'static,
{
    pub fn set(&self, value: T) {
        self.cell.set(value);
    }
}

impl<T> fmt::Debug for StateSetter<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateSetter").field(&self.cell).finish()
    }
}

/// Create a cell together with a dedicated setter.
pub fn use_state<T>(initial: T) -> (Reactive<T>, StateSetter<T>)
where
    T: Clone + PartialEq + 'static,
{
    let cell = Reactive::new(initial);
    let setter = StateSetter { cell: cell.clone() };
    (cell, setter)
}
