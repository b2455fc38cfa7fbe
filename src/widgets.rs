//! Built-in widgets.

pub mod align;
pub mod button;
pub mod label;
pub mod stack;

pub use align::Align;
pub use button::{ButtonKind, Ripple, RippleButton};
pub use label::Label;
pub use stack::Stack;
