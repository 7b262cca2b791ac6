#![doc = include_str!("../README.md")]

mod lifecycle;
mod storage;

pub use lifecycle::ScriptedLifecycle;
pub use storage::{Call, CallLog, RecordingBackend};
