use serde::{Deserialize, Serialize};

/// A subscription tier as the backend advertises it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    /// Stable plan code, e.g. "plan_basic".
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub currency: String,
    pub interval: String,
    pub interval_count: i32,
    #[serde(default)]
    pub features: Vec<String>,
}

impl SubscriptionPlan {
    /// Display price, e.g. "$4.99/mo" for a monthly USD plan.
    pub fn display_price(&self) -> String {
        let amount = self.price_cents as f64 / 100.0;
        let symbol = match self.currency.to_lowercase().as_str() {
            "usd" => "$",
            "eur" => "\u{20ac}",
            "gbp" => "\u{a3}",
            _ => "",
        };
        let suffix = match self.interval.as_str() {
            "month" | "monthly" => "/mo",
            "year" | "yearly" => "/yr",
            _ => "",
        };
        if symbol.is_empty() {
            format!("{:.2} {}{}", amount, self.currency.to_uppercase(), suffix)
        } else {
            format!("{}{:.2}{}", symbol, amount, suffix)
        }
    }
}
