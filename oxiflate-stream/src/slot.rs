//! Exclusive ownership of an engine handle.

use oxiflate_core::StatusCode;

/// Holds an adapter's engine and releases it exactly once.
///
/// `release` takes the engine out and ends it. If the slot is dropped while
/// still holding an engine, the engine is ended there and the abandonment is
/// logged.
pub(crate) struct EngineSlot<E> {
    engine: Option<E>,
    end: fn(&mut E) -> StatusCode,
    role: &'static str,
    warn_on_drop: bool,
}

impl<E> EngineSlot<E> {
    pub(crate) fn new(
        engine: E,
        end: fn(&mut E) -> StatusCode,
        role: &'static str,
        warn_on_drop: bool,
    ) -> Self {
        Self {
            engine: Some(engine),
            end,
            role,
            warn_on_drop,
        }
    }

    pub(crate) fn get(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub(crate) fn is_released(&self) -> bool {
        self.engine.is_none()
    }

    /// End the engine. Returns `None` if it was already released.
    pub(crate) fn release(&mut self) -> Option<StatusCode> {
        let mut engine = self.engine.take()?;
        let status = (self.end)(&mut engine);
        tracing::debug!(role = self.role, %status, "engine released");
        Some(status)
    }
}

impl<E> Drop for EngineSlot<E> {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            let status = (self.end)(&mut engine);
            if self.warn_on_drop {
                tracing::warn!(role = self.role, %status, "dropped without close; stream left unfinished");
            } else {
                tracing::debug!(role = self.role, %status, "dropped without close");
            }
        }
    }
}
