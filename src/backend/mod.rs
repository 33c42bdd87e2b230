//! Device backends implementing [`InputEventSource`](crate::device::InputEventSource).

pub mod gilrs;

pub use gilrs::{BackendError, GilrsEventSource};
