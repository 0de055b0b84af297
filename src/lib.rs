// LocalEngine - translation lookup with locale fallback and a refreshing cache
//
// The engine itself lives in `localengine-core`; this crate re-exports it
// together with the filesystem loader and environment detector.

// Re-export core functionality
pub use localengine_core::*;

// Re-export logging controls
pub use localengine_log as log;

// Re-export optional crates
#[cfg(feature = "loaders")]
pub use localengine_loaders;

#[cfg(feature = "loaders")]
pub use localengine_loaders::{EnvDetector, JsonDirLoader};

/// Re-export commonly used types
pub mod prelude {
    pub use localengine_core::prelude::*;
    pub use localengine_core::{CallbackHandle, resolve_chain};

    #[cfg(feature = "loaders")]
    pub use localengine_loaders::{EnvDetector, JsonDirLoader};
}
