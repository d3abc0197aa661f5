//! Store and payment models

use crate::i18n::LocalizedText;
use serde::{Deserialize, Serialize};

/// Response from `GET /api/product/all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// An in-app purchasable (energy refills, case bundles)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: LocalizedText,
    /// Price in Telegram Stars
    pub price_stars: i64,
    /// Energy granted by the purchase (0 for non-energy products)
    #[serde(default)]
    pub energy: i64,
}

/// Request body for `POST /api/payment/generate-invoice`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub product_id: String,
}

/// Response from `POST /api/payment/generate-invoice`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice_link: String,
}

/// A purchasable Stars bundle from `GET /api/payment/packages`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarsPackage {
    pub id: String,
    pub stars: i64,
    /// Price in the payment provider's currency units
    pub price: i64,
    #[serde(default)]
    pub bonus: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarsPackagesResponse {
    pub packages: Vec<StarsPackage>,
}

/// Request body for `POST /api/payment/create-stars-link`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarsLinkRequest {
    pub package_id: String,
}

/// Response from `POST /api/payment/create-stars-link`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarsLinkResponse {
    pub link: String,
}

/// Request body for `POST /api/user/me/deduct`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductRequest {
    pub amount: i64,
}

/// Response from `POST /api/user/me/deduct`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductResponse {
    pub success: bool,
    #[serde(default)]
    pub new_balance: i64,
}
