pub mod engine;
pub mod gesture;
pub mod input;
pub mod sync;

pub use engine::{EngineEvent, InteractionEngine, Outcome, ViewStatus};
pub use gesture::{DragKind, GestureAction, GestureMachine, GestureState};
pub use input::{InputEvent, PointerButton};
pub use sync::{PendingRequest, SyncEngine, SyncOutcome};
