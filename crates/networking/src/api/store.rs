//! Store and payment API operations with validation

use crate::FabulaClient;
use fabula_core::{DeductResponse, Error, InvoiceResponse, Result, StarsLinkResponse};
use tracing::info;

/// Generate an invoice link for an in-app product
pub async fn buy_product(client: &FabulaClient, product_id: &str) -> Result<InvoiceResponse> {
    if product_id.trim().is_empty() {
        return Err(Error::InvalidData("Product id must not be empty".to_string()));
    }

    info!("Generating invoice for product {}", product_id);
    client.generate_invoice(product_id).await
}

/// Create a payment link for a Stars bundle
pub async fn buy_stars(client: &FabulaClient, package_id: &str) -> Result<StarsLinkResponse> {
    if package_id.trim().is_empty() {
        return Err(Error::InvalidData("Package id must not be empty".to_string()));
    }

    info!("Creating stars link for package {}", package_id);
    client.create_stars_link(package_id).await
}

/// Spend stars from the user's balance
pub async fn spend_stars(client: &FabulaClient, amount: i64) -> Result<DeductResponse> {
    if amount <= 0 {
        return Err(Error::InvalidData("Amount must be positive".to_string()));
    }

    info!("Spending {} stars", amount);
    client.deduct_balance(amount).await
}
