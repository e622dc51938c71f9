//! Types for storing and observing values that change over time.

use std::fmt::{self, Debug};
use std::mem;
use std::ops::Not;
use std::sync::{Arc, Weak};

use alot::{LotId, Lots};
use parking_lot::Mutex;

use super::{CallbackCollection, CallbackDisconnected, CallbackHandle, ValueCallback};

/// A tag that represents an individual revision of a [`Dynamic`] value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Generation(usize);

impl Generation {
    /// Returns the next tag.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A value and the [`Generation`] at which it was stored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationalValue<T> {
    /// The stored value.
    pub value: T,
    /// The revision tag of the stored value.
    pub generation: Generation,
}

/// An instance of a value that provides APIs to observe changes.
///
/// Change callbacks are invoked synchronously: they run to completion before
/// the mutation that triggered them returns. A callback must not access the
/// dynamic it is registered on, as the value is locked while callbacks
/// execute.
pub struct Dynamic<T>(Arc<DynamicData<T>>);

impl<T> Dynamic<T> {
    /// Creates a new instance wrapping `value`.
    pub fn new(value: T) -> Self {
        Self(Arc::new(DynamicData {
            state: Mutex::new(State {
                wrapped: GenerationalValue {
                    value,
                    generation: Generation::default(),
                },
                callbacks: Lots::new(),
            }),
        }))
    }

    /// Maps the contents with read-only access.
    pub fn map_ref<R>(&self, map: impl FnOnce(&T) -> R) -> R {
        let state = self.0.state.lock();
        map(&state.wrapped.value)
    }

    /// Returns a clone of the currently stored value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.map_ref(T::clone)
    }

    /// Returns the current generation of the value.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.0.state.lock().wrapped.generation
    }

    /// Maps the contents with exclusive access. Before returning from this
    /// function, all registered callbacks are invoked with the updated
    /// contents.
    pub fn map_mut<R>(&self, map: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.0.state.lock();
        state.wrapped.generation = state.wrapped.generation.next();
        let result = map(&mut state.wrapped.value);
        state.notify();
        result
    }

    /// Replaces the contents with `new_value` if it is different than the
    /// currently stored value, returning the previous contents. Registered
    /// callbacks are invoked before this function returns.
    ///
    /// If `new_value` is equal to the current contents, the value is left
    /// untouched: the generation does not advance and no callbacks are
    /// invoked.
    pub fn replace(&self, new_value: T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut state = self.0.state.lock();
        if state.wrapped.value == new_value {
            return None;
        }
        let generation = state.wrapped.generation.next();
        let old = mem::replace(
            &mut state.wrapped,
            GenerationalValue {
                value: new_value,
                generation,
            },
        );
        state.notify();
        Some(old.value)
    }

    /// Stores `new_value` in this dynamic, notifying all registered callbacks
    /// if the value is different than the current contents.
    pub fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        let _old = self.replace(new_value);
    }

    /// Updates the value to the result of invoking [`Not`] on the current
    /// value. This function returns the new value.
    #[allow(clippy::must_use_candidate)]
    pub fn toggle(&self) -> T
    where
        T: Not<Output = T> + Clone,
    {
        self.map_mut(|value| {
            *value = !value.clone();
            value.clone()
        })
    }

    /// Attaches `for_each` to this value so that it is invoked each time the
    /// contents are updated.
    ///
    /// `for_each` is not invoked with the currently stored value. Returning
    /// `Err(CallbackDisconnected)` prevents the callback from being invoked
    /// again.
    pub fn for_each_subsequent_try<F>(&self, mut for_each: F) -> CallbackHandle
    where
        T: Send + 'static,
        F: for<'a> FnMut(&'a T) -> Result<(), CallbackDisconnected> + Send + 'static,
    {
        let mut state = self.0.state.lock();
        let id = state
            .callbacks
            .push(Box::new(move |value: &GenerationalValue<T>| {
                for_each(&value.value)
            }));
        CallbackHandle::new(Box::new(Arc::downgrade(&self.0)), id)
    }

    /// Attaches `for_each` to this value so that it is invoked each time the
    /// contents are updated.
    ///
    /// `for_each` is not invoked with the currently stored value.
    pub fn for_each_subsequent<F>(&self, mut for_each: F) -> CallbackHandle
    where
        T: Send + 'static,
        F: for<'a> FnMut(&'a T) + Send + 'static,
    {
        self.for_each_subsequent_try(move |value| {
            for_each(value);
            Ok(())
        })
    }

    /// Invokes `for_each` with the current contents and each time this
    /// value's contents are updated.
    pub fn for_each<F>(&self, mut for_each: F) -> CallbackHandle
    where
        T: Send + 'static,
        F: for<'a> FnMut(&'a T) + Send + 'static,
    {
        let mut state = self.0.state.lock();
        for_each(&state.wrapped.value);
        let id = state
            .callbacks
            .push(Box::new(move |value: &GenerationalValue<T>| {
                for_each(&value.value);
                Ok(())
            }));
        CallbackHandle::new(Box::new(Arc::downgrade(&self.0)), id)
    }

    /// Returns a new dynamic that contains the result of invoking `map` with
    /// the current contents and each updated contents of this dynamic.
    pub fn map_each<R, F>(&self, mut map: F) -> Dynamic<R>
    where
        T: Send + 'static,
        R: PartialEq + Send + 'static,
        F: for<'a> FnMut(&'a T) -> R + Send + 'static,
    {
        let mut state = self.0.state.lock();
        let mapped = Dynamic::new(map(&state.wrapped.value));
        let returned = mapped.clone();
        let _id = state
            .callbacks
            .push(Box::new(move |value: &GenerationalValue<T>| {
                mapped.set(map(&value.value));
                Ok(())
            }));
        returned
    }
}

impl<T> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Debug for Dynamic<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(state) = self.0.state.try_lock() {
            f.debug_struct("Dynamic")
                .field("value", &state.wrapped.value)
                .field("generation", &state.wrapped.generation)
                .finish()
        } else {
            f.debug_struct("Dynamic").finish_non_exhaustive()
        }
    }
}

impl<T> Default for Dynamic<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

struct DynamicData<T> {
    state: Mutex<State<T>>,
}

impl<T> CallbackCollection for Weak<DynamicData<T>>
where
    T: Send + 'static,
{
    fn remove(&self, id: LotId) {
        if let Some(data) = self.upgrade() {
            data.state.lock().callbacks.remove(id);
        }
    }
}

struct State<T> {
    wrapped: GenerationalValue<T>,
    callbacks: Lots<Box<dyn ValueCallback<T>>>,
}

impl<T> State<T> {
    fn notify(&mut self) {
        let Self { wrapped, callbacks } = self;
        // Invoke all callbacks, removing those that report an error.
        let mut invoked = 0;
        callbacks.drain_filter(|callback| {
            invoked += 1;
            callback.changed(wrapped).is_err()
        });
        if invoked > 0 {
            tracing::trace!("{invoked} change callbacks executed");
        }
    }
}

/// A type that can be converted into a [`Dynamic`].
pub trait IntoDynamic<T> {
    /// Returns `self` as a dynamic.
    fn into_dynamic(self) -> Dynamic<T>;
}

impl<T> IntoDynamic<T> for Dynamic<T> {
    fn into_dynamic(self) -> Dynamic<T> {
        self
    }
}

impl IntoDynamic<bool> for bool {
    fn into_dynamic(self) -> Dynamic<bool> {
        Dynamic::new(self)
    }
}

#[test]
fn replacing_equal_value_does_not_notify() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let value = Dynamic::new(false);
    let invoked = Arc::new(AtomicUsize::new(0));
    let callback = value.for_each_subsequent({
        let invoked = invoked.clone();
        move |_| {
            invoked.fetch_add(1, Ordering::Relaxed);
        }
    });

    let before = value.generation();
    value.set(false);
    assert_eq!(invoked.load(Ordering::Relaxed), 0);
    assert_eq!(value.generation(), before);

    value.set(true);
    assert_eq!(invoked.load(Ordering::Relaxed), 1);
    assert_ne!(value.generation(), before);
    drop(callback);
}

#[test]
fn dropping_handle_disconnects_callback() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let value = Dynamic::new(0);
    let invoked = Arc::new(AtomicUsize::new(0));
    let callback = value.for_each_subsequent({
        let invoked = invoked.clone();
        move |_| {
            invoked.fetch_add(1, Ordering::Relaxed);
        }
    });

    value.set(1);
    assert_eq!(invoked.load(Ordering::Relaxed), 1);

    drop(callback);
    value.set(2);
    assert_eq!(invoked.load(Ordering::Relaxed), 1);
}

#[test]
fn persisted_callback_outlives_handle() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let value = Dynamic::new(0);
    let invoked = Arc::new(AtomicUsize::new(0));
    value
        .for_each_subsequent({
            let invoked = invoked.clone();
            move |_| {
                invoked.fetch_add(1, Ordering::Relaxed);
            }
        })
        .persist();

    value.set(1);
    value.set(2);
    assert_eq!(invoked.load(Ordering::Relaxed), 2);
}

#[test]
fn for_each_observes_current_value() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let value = Dynamic::new(10);
    let observed = Arc::new(AtomicUsize::new(0));
    value
        .for_each({
            let observed = observed.clone();
            move |value| {
                observed.store(*value, Ordering::Relaxed);
            }
        })
        .persist();
    assert_eq!(observed.load(Ordering::Relaxed), 10);

    value.set(20);
    assert_eq!(observed.load(Ordering::Relaxed), 20);
}

#[test]
fn toggle_inverts_bool() {
    let value = Dynamic::new(false);
    assert!(value.toggle());
    assert!(!value.toggle());
    assert!(!value.get());
}

#[test]
fn map_each_tracks_source() {
    let value = Dynamic::new(false);
    let mapped = value.map_each(|checked| if *checked { "on" } else { "off" });
    assert_eq!(mapped.get(), "off");

    value.set(true);
    assert_eq!(mapped.get(), "on");
}

#[test]
fn disconnected_callback_is_removed() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let value = Dynamic::new(0);
    let invoked = Arc::new(AtomicUsize::new(0));
    value
        .for_each_subsequent_try({
            let invoked = invoked.clone();
            move |_| {
                invoked.fetch_add(1, Ordering::Relaxed);
                Err(CallbackDisconnected)
            }
        })
        .persist();

    value.set(1);
    value.set(2);
    assert_eq!(invoked.load(Ordering::Relaxed), 1);
}
