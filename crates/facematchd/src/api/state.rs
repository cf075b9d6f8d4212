use crate::engine::EngineHandle;

/// Shared handler state. Holds no request data; the engine handle is the
/// only route to the inference models.
#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
}

impl AppState {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}
