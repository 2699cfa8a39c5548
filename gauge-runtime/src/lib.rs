pub mod message_handler;
pub mod runtime;
pub mod state_manager;
pub mod viewer;

pub use message_handler::{RuntimeFrame, RuntimeMessage};
pub use runtime::{run_runtime_current, spawn_runtime, GaugeRuntime};
pub use state_manager::RuntimeState;
pub use viewer::ViewerService;
