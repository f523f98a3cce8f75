use crate::store::Store;

/// Shared application state, built once at startup and handed to the router.
/// The store handle is the only process-wide resource the handlers touch.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}
