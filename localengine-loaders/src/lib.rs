//! Concrete collaborators for `localengine-core`.
//!
//! - [`JsonDirLoader`] - reads JSON locale files from `{base}/locales`
//! - [`EnvDetector`] - picks the startup locale from `LC_ALL`, `LANG` and friends
//!
//! ```no_run
//! use localengine_core::{EngineConfig, LocalEngine};
//! use localengine_loaders::{EnvDetector, JsonDirLoader};
//! use std::sync::Arc;
//!
//! # async fn example() -> localengine_core::Result<()> {
//! let config = EngineConfig::from_env()?;
//! let engine = LocalEngine::builder(Arc::new(JsonDirLoader::from_config(&config)))
//!     .config(config)
//!     .detector(EnvDetector::new())
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod env_detect;
pub mod json_dir;

pub use env_detect::{EnvDetector, LOCALE_VARS, normalize_locale};
pub use json_dir::{JsonDirLoader, parse_locale_json};
