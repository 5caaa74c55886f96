//! The `website.json` descriptor carried in every push package.

use serde::{Deserialize, Serialize};

/// Conventional package path for the [`Website`] descriptor.
pub const WEBSITE_ENTRY: &str = "website.json";

/// Website push registration details.
///
/// Serialized with the key names the push registration service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    /// Name shown in the permission prompt and Notification Center.
    #[serde(rename = "websiteName")]
    pub website_name: String,

    /// Website Push ID, matching the certificate's `web.` identifier.
    #[serde(rename = "websitePushID")]
    pub website_push_id: String,

    /// Origins allowed to request notification permission.
    #[serde(rename = "allowedDomains")]
    pub allowed_domains: Vec<String>,

    /// URL opened on click; `%@` placeholders are filled from the
    /// notification's `url-args`.
    #[serde(rename = "urlFormatString")]
    pub url_format_string: String,

    /// Token sent back to the web service to identify the user.
    #[serde(rename = "authenticationToken")]
    pub authentication_token: String,

    /// Base URL of the web service that serves packages and registrations.
    #[serde(rename = "webServiceURL")]
    pub web_service_url: String,
}
