//! Notification payloads.
//!
//! [`Aps`] describes the reserved `aps` dictionary of a push notification.
//! It serializes to the full payload object, `{"aps": {...}}`; use
//! [`Aps::to_map`] to add custom keys next to `aps` before sending.
//!
//! # Examples
//!
//! ```
//! use pushpackage::payload::{Alert, Aps, Badge};
//!
//! let aps = Aps {
//!     alert: Alert {
//!         body: "Your flight is boarding".into(),
//!         ..Default::default()
//!     },
//!     badge: Badge::Count(1),
//!     ..Default::default()
//! };
//! aps.validate()?;
//!
//! let mut payload = aps.to_map();
//! payload.insert("flight".into(), "UA 931".into());
//! let body = serde_json::to_string(&payload)?;
//! assert!(body.contains(r#""alert":"Your flight is boarding""#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aps;
pub mod badge;

pub use aps::{Alert, Aps, InterruptionLevel, Sound};
pub use badge::Badge;
