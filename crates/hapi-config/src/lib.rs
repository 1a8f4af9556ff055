//! Comparison profiles for HAPI server comparison
//!
//! A profile file maps profile names to the pair of servers being compared
//! and the per-server options that go with them:
//!
//! ```json
//! {
//!   "CDAWeb": {
//!     "s1": "nl", "url1": "https://cdaweb.gsfc.nasa.gov/hapi",
//!     "s2": "jf", "url2": "https://cdaweb.gsfc.nasa.gov/hapi-new",
//!     "s1_omits": ["resourceURL"], "s2_omits": [],
//!     "s1_expire_after": {"days": 1}, "s2_expire_after": null,
//!     "sample_duration": {"hours": 1}
//!   }
//! }
//! ```
//!
//! Files ending in `.yaml`/`.yml` are read as YAML and may use
//! `!env_var NAME` to pull a value from the environment.
//!
//! # Example
//!
//! ```ignore
//! use hapi_config::load_profiles;
//!
//! let profiles = load_profiles("compare.json")?;
//! let profile = profiles.get("CDAWeb")?;
//! profile.validate(true)?;
//! ```

mod error;
mod loader;
mod profile;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_profiles, load_profiles_str, ProfileFormat};
pub use profile::{DurationSpec, Profile, Profiles};
