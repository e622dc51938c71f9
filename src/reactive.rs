//! Reactive data types that power change-event dispatch.
//!
//! The change event in this crate is a callback registered on a
//! [`Dynamic`](value::Dynamic). Callbacks run synchronously: each change is
//! handled to completion before the mutation that triggered it returns, so
//! no two change events are ever in flight at once.

use alot::LotId;

pub mod value;

/// A callback reported that it should not be invoked again.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CallbackDisconnected;

pub(crate) trait ValueCallback<T>: Send {
    fn changed(&mut self, value: &value::GenerationalValue<T>) -> Result<(), CallbackDisconnected>;
}

impl<T, F> ValueCallback<T> for F
where
    F: for<'a> FnMut(&'a value::GenerationalValue<T>) -> Result<(), CallbackDisconnected>
        + Send
        + 'static,
{
    fn changed(&mut self, value: &value::GenerationalValue<T>) -> Result<(), CallbackDisconnected> {
        self(value)
    }
}

pub(crate) trait CallbackCollection: Send + Sync + 'static {
    fn remove(&self, id: LotId);
}

/// A handle to a callback installed on a [`Dynamic`](value::Dynamic).
///
/// Dropping this handle disconnects the callback. Use
/// [`persist()`](Self::persist) to leave the callback installed for as long
/// as the dynamic exists.
#[must_use = "dropping this handle disconnects the associated callback"]
pub struct CallbackHandle(Option<CallbackHandleData>);

pub(crate) struct CallbackHandleData {
    pub(crate) collection: Box<dyn CallbackCollection>,
    pub(crate) id: LotId,
}

impl CallbackHandle {
    pub(crate) fn new(collection: Box<dyn CallbackCollection>, id: LotId) -> Self {
        Self(Some(CallbackHandleData { collection, id }))
    }

    /// Leaves the callback installed for the lifetime of its dynamic.
    pub fn persist(mut self) {
        self.0 = None;
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some(data) = self.0.take() {
            data.collection.remove(data.id);
        }
    }
}

impl std::fmt::Debug for CallbackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CallbackHandle")
            .field(&self.0.as_ref().map(|data| data.id))
            .finish()
    }
}
