use serde::{Deserialize, Serialize};

/// Merchant metadata looked up by merchant id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MerchantMeta {
    pub merchant_id: String,
    pub acquirer_bin: String,
    #[serde(default)]
    pub password: Option<String>,
    pub name: String,
    /// ISO 3166 numeric country code.
    pub country_code: String,
    /// ISO 4217 numeric currency code used when the request carries none.
    pub default_currency: String,
    /// Return URL used when the request carries none.
    pub default_url: String,
}
