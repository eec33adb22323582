//! Structured shipping address.

use serde::{Deserialize, Serialize};

/// A structured shipping address.
///
/// The wire format uses camelCase field names (`doorNo`, `zip`, ...) to match
/// the storefront client payloads and the JSONB column layout.
///
/// An address may be stored in any state of completeness - the account page
/// saves whatever the customer has filled in so far. Deliverability (door
/// number and city present) is checked separately by [`Self::is_deliverable`],
/// which is the address half of the checkout-eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Door / flat / house number.
    pub door_no: String,
    /// Area or street.
    pub area: String,
    /// Optional nearby landmark for the courier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Country.
    pub country: String,
    /// Postal code.
    pub zip: String,
}

impl Address {
    /// Whether this address is complete enough to ship to.
    ///
    /// Requires a non-blank door number and city. The remaining fields are
    /// not gated on - the original storefront accepts orders without them.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        !self.door_no.trim().is_empty() && !self.city.trim().is_empty()
    }
}
