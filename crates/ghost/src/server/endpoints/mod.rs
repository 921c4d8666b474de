pub mod buildings;
pub mod courses;
pub mod rooms;
pub mod status;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::Arc;

    use crate::store::MemoryStore;
    use crate::types::AppState;

    pub fn state() -> (Arc<MemoryStore>, Arc<AppState>) {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(store.clone()));
        (store, state)
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
