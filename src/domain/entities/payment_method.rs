use serde::{Deserialize, Serialize};

/// Read-only reference to a stored payment method.
///
/// Owned by the backend; the client caches one copy per page load and
/// invalidates it by explicit refetch after any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRef {
    pub id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub is_default: bool,
}

impl PaymentMethodRef {
    /// Display label, e.g. "visa •••• 4242".
    pub fn label(&self) -> String {
        format!("{} \u{2022}\u{2022}\u{2022}\u{2022} {}", self.brand, self.last4)
    }
}
