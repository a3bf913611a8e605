use crate::vecmath::Vec2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The external pointer signal, in world coordinates.
/// `None` means no pointer is available right now.
pub trait PointerSource: Send {
    fn position(&self) -> Option<Vec2>;
}

/// No pointer at all; pointer-reactive particles keep their last law.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPointer;

impl PointerSource for NoPointer {
    fn position(&self) -> Option<Vec2> {
        None
    }
}

/// A pointer position that another owner (input thread, test) updates.
/// Clones share the same position.
#[derive(Debug, Clone, Default)]
pub struct SharedPointer {
    inner: Arc<Mutex<Option<Vec2>>>,
}

impl SharedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Vec2) -> Self {
        let pointer = Self::new();
        pointer.set(position);
        pointer
    }

    pub fn set(&self, position: Vec2) {
        *self.slot() = Some(position);
    }

    pub fn clear(&self) {
        *self.slot() = None;
    }

    // A plain `Option<Vec2>` is always whole, so poisoning is ignored.
    fn slot(&self) -> MutexGuard<'_, Option<Vec2>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PointerSource for SharedPointer {
    fn position(&self) -> Option<Vec2> {
        *self.slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_pointer_updates_are_visible_to_clones() {
        let pointer = SharedPointer::new();
        let reader = pointer.clone();
        assert_eq!(reader.position(), None);
        pointer.set(Vec2::new(3.0, 4.0));
        assert_eq!(reader.position(), Some(Vec2::new(3.0, 4.0)));
        pointer.clear();
        assert_eq!(reader.position(), None);
    }

    #[test]
    fn updates_survive_a_poisoned_lock() {
        let pointer = SharedPointer::at(Vec2::new(1.0, 1.0));
        let inner = Arc::clone(&pointer.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock().unwrap();
            panic!("writer died while holding the pointer");
        })
        .join();
        assert!(pointer.inner.is_poisoned());

        assert_eq!(pointer.position(), Some(Vec2::new(1.0, 1.0)));
        pointer.set(Vec2::new(5.0, 6.0));
        assert_eq!(pointer.position(), Some(Vec2::new(5.0, 6.0)));
        pointer.clear();
        assert_eq!(pointer.position(), None);
    }
}
