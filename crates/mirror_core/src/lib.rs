//! Mirror core: pure naming, time-window and run-phase logic.
mod elapsed;
mod phase;
mod sanitize;
mod window;

pub use elapsed::describe_elapsed;
pub use phase::RunPhase;
pub use sanitize::sanitize_name;
pub use window::{AgeCutoff, TimeWindow, WindowError};
