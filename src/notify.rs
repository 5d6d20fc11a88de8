//! Data-available notification.
//!
//! A minimal single-subscriber publish mechanism. The session publishes
//! [`SerialEvent::DataAvailable`] once per non-empty arrival batch; the
//! observer is expected to call back into the session's read surface to
//! retrieve the buffered bytes.

/// Events delivered to a session observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialEvent {
    /// New bytes have been buffered and can be read.
    DataAvailable,
}

type Observer = Box<dyn Fn(SerialEvent) + Send>;

/// Single-subscriber event slot.
///
/// At most one observer is active at a time; subscribing replaces any
/// previous registration. Publishing with no observer registered is a no-op,
/// never an error.
#[derive(Default)]
pub struct Notifier {
    observer: Option<Observer>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the active observer, replacing any previous one.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(SerialEvent) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the active observer, if any.
    pub fn unsubscribe(&mut self) {
        self.observer = None;
    }

    /// Synchronously invoke the observer on the caller's thread.
    ///
    /// There is no implicit hand-off to another thread; callers needing
    /// asynchronous delivery must arrange it themselves.
    pub fn publish(&self, event: SerialEvent) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.observer.is_some()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}
