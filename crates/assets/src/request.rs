use crate::AssetError;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Resolution state of an asynchronously loaded asset.
#[derive(Debug)]
pub enum AssetState<T> {
    Pending,
    Ready(Arc<T>),
    Failed(Arc<AssetError>),
}

impl<T> Clone for AssetState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(asset) => Self::Ready(asset.clone()),
            Self::Failed(e) => Self::Failed(e.clone()),
        }
    }
}

impl<T> AssetState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetState::Pending)
    }
}

/// Shared view of an in-flight load. The [`AssetLoader`](crate::AssetLoader)
/// resolves it from its `poll`; holders observe the state or take the result.
#[derive(Debug)]
pub struct AssetRequest<T> {
    url: String,
    state: Rc<RefCell<AssetState<T>>>,
    taken: bool,
}

impl<T> AssetRequest<T> {
    pub(crate) fn new(url: &str, state: Rc<RefCell<AssetState<T>>>) -> Self {
        Self {
            url: url.to_string(),
            state,
            taken: false,
        }
    }

    /// A request nothing will ever resolve.
    pub fn pending(url: &str) -> Self {
        Self::new(url, Rc::new(RefCell::new(AssetState::Pending)))
    }

    /// A request that is already resolved.
    pub fn resolved(url: &str, asset: Arc<T>) -> Self {
        Self::new(url, Rc::new(RefCell::new(AssetState::Ready(asset))))
    }

    /// A request that already failed.
    pub fn failed(url: &str, error: AssetError) -> Self {
        Self::new(url, Rc::new(RefCell::new(AssetState::Failed(Arc::new(error)))))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> AssetState<T> {
        self.state.borrow().clone()
    }

    /// Hand out the resolved state exactly once. Returns `None` while pending
    /// and on every call after the first resolved one.
    pub fn take_resolved(&mut self) -> Option<Result<Arc<T>, Arc<AssetError>>> {
        if self.taken {
            return None;
        }
        let result = match &*self.state.borrow() {
            AssetState::Pending => return None,
            AssetState::Ready(asset) => Ok(asset.clone()),
            AssetState::Failed(e) => Err(e.clone()),
        };
        self.taken = true;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_never_resolves() {
        let mut req: AssetRequest<u32> = AssetRequest::pending("font.json");
        for _ in 0..10 {
            assert!(req.take_resolved().is_none());
        }
        assert!(req.state().is_pending());
    }

    #[test]
    fn resolved_is_taken_once() {
        let mut req = AssetRequest::resolved("font.json", Arc::new(7u32));
        let first = req.take_resolved().unwrap().unwrap();
        assert_eq!(*first, 7);
        assert!(req.take_resolved().is_none());
    }

    #[test]
    fn state_change_is_observed() {
        let cell = Rc::new(RefCell::new(AssetState::Pending));
        let mut req: AssetRequest<u32> = AssetRequest::new("a", cell.clone());
        assert!(req.take_resolved().is_none());
        *cell.borrow_mut() = AssetState::Failed(Arc::new(AssetError::MissingGlyphs));
        assert!(req.take_resolved().unwrap().is_err());
        assert!(req.take_resolved().is_none());
    }
}
