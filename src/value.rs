//! Types for storing and reacting to values in widgets.

use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use alot::{LotId, Lots};
use parking_lot::Mutex;

use crate::animation::{DynamicTransition, LinearInterpolate};

/// An instance of a value that provides APIs to observe and react to its
/// contents.
///
/// A `Dynamic` is an `Arc`-shared, mutex-guarded value with a list of change
/// callbacks. Cloning a `Dynamic` clones the reference, not the contents.
pub struct Dynamic<T>(Arc<DynamicData<T>>);

struct DynamicData<T> {
    state: Mutex<State<T>>,
    callbacks: Arc<Callbacks>,
}

struct State<T> {
    value: T,
    generation: Generation,
}

impl<T> Dynamic<T> {
    /// Creates a new instance wrapping `value`.
    pub fn new(value: T) -> Self {
        Self(Arc::new(DynamicData {
            state: Mutex::new(State {
                value,
                generation: Generation::default(),
            }),
            callbacks: Arc::new(Callbacks::default()),
        }))
    }

    /// Returns a weak reference to this dynamic.
    #[must_use]
    pub fn downgrade(&self) -> WeakDynamic<T> {
        WeakDynamic(Arc::downgrade(&self.0))
    }

    /// Returns the number of [`Dynamic`]s that point to this same value,
    /// including `self`.
    #[must_use]
    pub fn instances(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns the number of change callbacks currently attached to this
    /// value.
    #[must_use]
    pub fn listeners(&self) -> usize {
        self.0.callbacks.list.lock().len()
    }

    /// Maps the contents with read-only access.
    pub fn map_ref<R>(&self, map: impl FnOnce(&T) -> R) -> R {
        let state = self.0.state.lock();
        map(&state.value)
    }

    /// Maps the contents with read-only access.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlockError`] if the contents are locked elsewhere.
    pub fn try_map_ref<R>(&self, map: impl FnOnce(&T) -> R) -> Result<R, DeadlockError> {
        let state = self.0.state.try_lock().ok_or(DeadlockError)?;
        Ok(map(&state.value))
    }

    /// Returns a clone of the currently contained value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.map_ref(T::clone)
    }

    /// Returns a clone of the currently contained value.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlockError`] if the contents are locked elsewhere.
    pub fn try_get(&self) -> Result<T, DeadlockError>
    where
        T: Clone,
    {
        self.try_map_ref(T::clone)
    }

    /// Returns the current generation of the value. The generation advances
    /// each time the contents are updated.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.0.state.lock().generation
    }

    /// Maps the contents with exclusive access. All observers are notified
    /// after the closure returns, regardless of whether the contents were
    /// actually changed.
    ///
    /// The closure must not access this dynamic re-entrantly.
    pub fn map_mut<R>(&self, map: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut state = self.0.state.lock();
            let result = map(&mut state.value);
            state.generation = state.generation.next();
            result
        };
        self.0.callbacks.invoke();
        result
    }

    /// Replaces the contents with `new_value` if it is different than the
    /// currently stored value, returning the previous contents. Observers are
    /// only notified when a replacement happens.
    pub fn replace(&self, new_value: T) -> Option<T>
    where
        T: PartialEq,
    {
        let old = {
            let mut state = self.0.state.lock();
            if state.value == new_value {
                return None;
            }
            state.generation = state.generation.next();
            std::mem::replace(&mut state.value, new_value)
        };
        self.0.callbacks.invoke();
        Some(old)
    }

    /// Stores `new_value` in this dynamic, notifying all observers if the
    /// value differs from the current contents.
    pub fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        let _old = self.replace(new_value);
    }

    /// Executes `on_change` each time the contents of this dynamic are
    /// updated.
    ///
    /// Returning `Err(CallbackDisconnected)` prevents the callback from being
    /// invoked again.
    pub fn on_change_try<F>(&self, on_change: F) -> CallbackHandle
    where
        F: FnMut() -> Result<(), CallbackDisconnected> + Send + 'static,
    {
        let id = self.0.callbacks.list.lock().push(Box::new(on_change));
        CallbackHandle {
            id: Some(id),
            callbacks: self.0.callbacks.clone(),
        }
    }

    /// Executes `on_change` each time the contents of this dynamic are
    /// updated.
    pub fn on_change<F>(&self, mut on_change: F) -> CallbackHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.on_change_try(move || {
            on_change();
            Ok(())
        })
    }

    /// Invokes `for_each` with the current contents and again each time the
    /// contents are updated.
    ///
    /// The callback holds only a weak reference to this dynamic and
    /// disconnects itself once every strong reference is gone.
    pub fn for_each<F>(&self, mut for_each: F) -> CallbackHandle
    where
        T: Send + 'static,
        F: FnMut(&T) + Send + 'static,
    {
        self.map_ref(&mut for_each);
        let weak = self.downgrade();
        self.on_change_try(move || {
            let this = weak.upgrade().ok_or(CallbackDisconnected)?;
            this.map_ref(&mut for_each);
            Ok(())
        })
    }

    /// Returns a pending transition of this value to `new_value`, for use with
    /// the animation system.
    pub fn transition_to(&self, new_value: T) -> DynamicTransition<T>
    where
        T: LinearInterpolate + Clone + Send,
    {
        DynamicTransition {
            dynamic: self.clone(),
            new_value,
        }
    }
}

impl<T> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
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

impl<T> Debug for Dynamic<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.state.try_lock() {
            Some(state) => f
                .debug_struct("Dynamic")
                .field("value", &state.value)
                .field("generation", &state.generation.0)
                .finish(),
            None => f.debug_struct("Dynamic").finish_non_exhaustive(),
        }
    }
}

impl<T> Eq for Dynamic<T> {}

impl<T> PartialEq for Dynamic<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<&str> for Dynamic<String> {
    fn from(value: &str) -> Self {
        Dynamic::new(value.to_string())
    }
}

impl From<String> for Dynamic<String> {
    fn from(value: String) -> Self {
        Dynamic::new(value)
    }
}

/// A weak reference to a [`Dynamic`].
pub struct WeakDynamic<T>(Weak<DynamicData<T>>);

impl<T> WeakDynamic<T> {
    /// Returns the [`Dynamic`] this weak reference points to, unless no
    /// strong references remain.
    #[must_use]
    pub fn upgrade(&self) -> Option<Dynamic<T>> {
        self.0.upgrade().map(Dynamic)
    }
}

impl<T> Clone for WeakDynamic<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Debug for WeakDynamic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakDynamic").finish()
    }
}

type CallbackFn = Box<dyn FnMut() -> Result<(), CallbackDisconnected> + Send>;

struct Callbacks {
    list: Mutex<Lots<CallbackFn>>,
    invoking: Mutex<Vec<ThreadId>>,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            list: Mutex::new(Lots::new()),
            invoking: Mutex::new(Vec::new()),
        }
    }
}

impl Callbacks {
    fn invoke(&self) {
        let current = thread::current().id();
        {
            let mut invoking = self.invoking.lock();
            if invoking.contains(&current) {
                // A callback updated the value it is observing. The outer
                // invocation pass delivers the change: remaining callbacks
                // observe the newest contents when they read the value.
                return;
            }
            invoking.push(current);
        }
        self.list
            .lock()
            .drain_filter(|callback| callback().is_err());
        self.invoking.lock().retain(|id| *id != current);
    }

    fn remove(&self, id: LotId) {
        self.list.lock().remove(id);
    }
}

/// A handle to a change callback installed on a [`Dynamic`]. The callback is
/// uninstalled when the handle is dropped.
#[must_use = "dropping the handle uninstalls the callback"]
pub struct CallbackHandle {
    id: Option<LotId>,
    callbacks: Arc<Callbacks>,
}

impl CallbackHandle {
    /// Keeps the callback installed for as long as its source exists, instead
    /// of until this handle is dropped.
    pub fn persist(mut self) {
        self.id = None;
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.callbacks.remove(id);
        }
    }
}

impl Debug for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A marker of the number of times a value has been updated.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Generation(usize);

impl Generation {
    /// Returns the next generation.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A value that is locked by another accessor when it was needed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("deadlocked trying to access a value that is already locked")]
pub struct DeadlockError;

/// A callback's source no longer exists, or the callback asked to be removed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("callback has been disconnected from its source")]
pub struct CallbackDisconnected;

/// A value that may be constant or dynamic.
#[derive(Debug)]
pub enum Value<T> {
    /// A value that will not change while the widget using it is mounted.
    Constant(T),
    /// A value that may be updated and observed.
    Dynamic(Dynamic<T>),
}

impl<T> Value<T> {
    /// Maps the current contents with read-only access.
    pub fn map<R>(&self, map: impl FnOnce(&T) -> R) -> R {
        match self {
            Value::Constant(value) => map(value),
            Value::Dynamic(dynamic) => dynamic.map_ref(map),
        }
    }

    /// Returns a clone of the current contents.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.map(T::clone)
    }

    /// Returns the dynamic behind this value, if any.
    #[must_use]
    pub fn as_dynamic(&self) -> Option<&Dynamic<T>> {
        match self {
            Value::Constant(_) => None,
            Value::Dynamic(dynamic) => Some(dynamic),
        }
    }
}

impl<T> Clone for Value<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Value::Constant(value) => Value::Constant(value.clone()),
            Value::Dynamic(dynamic) => Value::Dynamic(dynamic.clone()),
        }
    }
}

impl<T> Default for Value<T>
where
    T: Default,
{
    fn default() -> Self {
        Value::Constant(T::default())
    }
}

/// A type that can be converted into a [`Value`].
pub trait IntoValue<T> {
    /// Returns this type as a [`Value`].
    fn into_value(self) -> Value<T>;
}

impl<T> IntoValue<T> for T {
    fn into_value(self) -> Value<T> {
        Value::Constant(self)
    }
}

impl<T> IntoValue<T> for Dynamic<T> {
    fn into_value(self) -> Value<T> {
        Value::Dynamic(self)
    }
}

impl<T> IntoValue<T> for &Dynamic<T> {
    fn into_value(self) -> Value<T> {
        Value::Dynamic(self.clone())
    }
}

impl<T> IntoValue<T> for Value<T> {
    fn into_value(self) -> Value<T> {
        self
    }
}

impl IntoValue<String> for &str {
    fn into_value(self) -> Value<String> {
        Value::Constant(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn set_notifies_only_on_change() {
        let value = Dynamic::new(1);
        let invocations = Arc::new(AtomicUsize::new(0));
        let _callback = value.on_change({
            let invocations = invocations.clone();
            move || {
                invocations.fetch_add(1, Ordering::Relaxed);
            }
        });

        value.set(1);
        assert_eq!(invocations.load(Ordering::Relaxed), 0);
        value.set(2);
        assert_eq!(invocations.load(Ordering::Relaxed), 1);
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn dropping_handle_uninstalls_callback() {
        let value = Dynamic::new(0);
        let callback = value.on_change(|| {});
        assert_eq!(value.listeners(), 1);
        drop(callback);
        assert_eq!(value.listeners(), 0);
    }

    #[test]
    fn for_each_observes_current_value() {
        let value = Dynamic::new(10);
        let observed = Arc::new(AtomicUsize::new(0));
        let _callback = value.for_each({
            let observed = observed.clone();
            move |current| {
                observed.store(*current, Ordering::Relaxed);
            }
        });
        assert_eq!(observed.load(Ordering::Relaxed), 10);
        value.set(20);
        assert_eq!(observed.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn disconnected_callbacks_are_removed() {
        let value = Dynamic::new(0);
        let handle = value.on_change_try(|| Err(CallbackDisconnected));
        handle.persist();
        assert_eq!(value.listeners(), 1);
        value.set(1);
        assert_eq!(value.listeners(), 0);
    }

    #[test]
    fn generations_advance() {
        let value = Dynamic::new(0);
        let initial = value.generation();
        value.set(1);
        assert_ne!(value.generation(), initial);
        // Unchanged contents do not advance the generation.
        let current = value.generation();
        value.set(1);
        assert_eq!(value.generation(), current);
    }

    #[test]
    fn nested_update_does_not_deadlock() {
        let value = Dynamic::new(0);
        let _callback = value.on_change({
            let value = value.clone();
            move || {
                if value.get() == 1 {
                    value.set(2);
                }
            }
        });
        value.set(1);
        assert_eq!(value.get(), 2);
    }
}
