//! Store and payment commands

use crate::AppState;
use fabula_core::{DeductResponse, InvoiceResponse, Product, StarsLinkResponse, StarsPackage};
use fabula_networking::api;
use tauri::State;
use tauri_plugin_shell::ShellExt;
use tracing::{info, warn};

/// List purchasable products (energy refills, case bundles)
#[tauri::command]
pub async fn get_products(state: State<'_, AppState>) -> Result<Vec<Product>, String> {
    let (_, client) = super::active_client(&state).await?;

    let response = client.get_products().await.map_err(|e| e.to_string())?;
    Ok(response.products)
}

/// Generate a Telegram Stars invoice for a product and open it
#[tauri::command]
pub async fn buy_product(
    product_id: String,
    app_handle: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<InvoiceResponse, String> {
    let _guard = state
        .pending
        .begin(&format!("buy_product:{}", product_id))
        .map_err(|e| e.to_string())?;

    let (_, client) = super::active_client(&state).await?;

    let invoice = api::buy_product(&client, &product_id)
        .await
        .map_err(|e| e.to_string())?;

    info!("Invoice generated for product {}", product_id);

    // Hand the invoice to Telegram; payment never touches this app
    if let Err(e) = app_handle.shell().open(&invoice.invoice_link, None) {
        warn!("Could not open invoice link: {}", e);
    }

    Ok(invoice)
}

/// List the purchasable Stars bundles
#[tauri::command]
pub async fn get_star_packages(state: State<'_, AppState>) -> Result<Vec<StarsPackage>, String> {
    let (_, client) = super::active_client(&state).await?;

    let response = client
        .get_star_packages()
        .await
        .map_err(|e| e.to_string())?;
    Ok(response.packages)
}

/// Create a purchase link for a Stars bundle and open it
#[tauri::command]
pub async fn buy_stars(
    package_id: String,
    app_handle: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<StarsLinkResponse, String> {
    let _guard = state
        .pending
        .begin(&format!("buy_stars:{}", package_id))
        .map_err(|e| e.to_string())?;

    let (_, client) = super::active_client(&state).await?;

    let link = api::buy_stars(&client, &package_id)
        .await
        .map_err(|e| e.to_string())?;

    info!("Stars purchase link created for package {}", package_id);

    if let Err(e) = app_handle.shell().open(&link.link, None) {
        warn!("Could not open stars link: {}", e);
    }

    Ok(link)
}

/// Spend stars from the balance (in-app sinks like rerolls)
#[tauri::command]
pub async fn spend_stars(
    amount: i64,
    state: State<'_, AppState>,
) -> Result<DeductResponse, String> {
    let _guard = state
        .pending
        .begin("spend_stars")
        .map_err(|e| e.to_string())?;

    let (_, client) = super::active_client(&state).await?;

    let result = api::spend_stars(&client, amount)
        .await
        .map_err(|e| e.to_string())?;

    info!("Spent {} stars, balance now {}", amount, result.new_balance);
    Ok(result)
}
