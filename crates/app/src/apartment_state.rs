use std::sync::Arc;

use parking_lot::RwLock;

use crate::route::ApartmentContext;

/// In-memory apartment the rest of the app reads after routing.
#[derive(Clone, Default)]
pub struct ApartmentState {
    inner: Arc<RwLock<Option<ApartmentContext>>>,
}

impl ApartmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, context: ApartmentContext) {
        *self.inner.write() = Some(context);
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    pub fn current(&self) -> Option<ApartmentContext> {
        self.inner.read().clone()
    }

    pub fn apartment_id(&self) -> Option<String> {
        self.inner.read().as_ref().map(|c| c.apartment_id.clone())
    }
}
