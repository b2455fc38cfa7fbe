#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod animation;
pub mod context;
pub mod graphics;
pub mod styles;
mod tree;
mod utils;
pub mod value;
pub mod widget;
pub mod widgets;
pub mod window;

use figures::units::UPx;
use figures::Zero;

pub use tree::MountedWidget;
pub use utils::WithClone;

/// A limit used when measuring a widget.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConstraintLimit {
    /// The widget is expected to occupy a known size.
    Known(UPx),
    /// The widget is expected to resize itself to fit within the size
    /// provided.
    ClippedAfter(UPx),
}

impl ConstraintLimit {
    /// Returns the size the widget must occupy to satisfy the constraint.
    #[must_use]
    pub fn min(self) -> UPx {
        match self {
            ConstraintLimit::Known(v) => v,
            ConstraintLimit::ClippedAfter(_) => UPx::ZERO,
        }
    }

    /// Returns the maximum measurement that will fit the constraint.
    #[must_use]
    pub fn max(self) -> UPx {
        match self {
            ConstraintLimit::Known(v) | ConstraintLimit::ClippedAfter(v) => v,
        }
    }
}

/// Installs a `tracing` subscriber printing to stderr, filtered by
/// `RUST_LOG`.
///
/// Embedding applications that configure their own subscriber should skip
/// this. Calling it more than once has no additional effect.
pub fn initialize_tracing() {
    #[cfg(feature = "tracing-output")]
    {
        use tracing::Level;
        use tracing_subscriber::filter::LevelFilter;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        use tracing_subscriber::EnvFilter;

        #[cfg(debug_assertions)]
        const MAX_LEVEL: Level = Level::INFO;
        #[cfg(not(debug_assertions))]
        const MAX_LEVEL: Level = Level::ERROR;

        let _result = tracing_subscriber::fmt::fmt()
            .with_max_level(MAX_LEVEL)
            .finish()
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::from_level(MAX_LEVEL).into())
                    .from_env_lossy(),
            )
            .try_init();
    }
}
