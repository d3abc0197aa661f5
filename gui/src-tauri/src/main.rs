//! Fabula GUI - Main entry point

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use fabula_gui_lib::reward_watcher::spawn_reward_watcher;
use fabula_gui_lib::{commands, AppState};
use std::path::PathBuf;
use tauri::Manager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabula_gui=debug,fabula_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Fabula");

    // Get data directory
    let data_dir = dirs_next::data_local_dir()
        .map(|p| p.join("Fabula"))
        .unwrap_or_else(|| PathBuf::from("."));

    // Derive encryption key from machine fingerprint (Argon2id + machine-uid)
    let encryption_key = match fabula_persistence::derive_machine_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("FATAL: Failed to derive machine encryption key: {}", e);
            eprintln!("This may happen if the machine-uid cannot be determined.");
            std::process::exit(1);
        }
    };

    tracing::info!("Encryption key derived from machine fingerprint");

    // Create application state
    let app_state = match AppState::new(data_dir, &encryption_key) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("FATAL: Failed to create application state: {}", e);
            std::process::exit(1);
        }
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_notification::init())
        .manage(app_state)
        .setup(|app| {
            let state = app.state::<AppState>();
            let state_clone = state.inner().clone();
            let app_handle = app.handle().clone();

            // Initialize database in async context, then spawn background tasks
            tauri::async_runtime::spawn(async move {
                if let Err(e) = state_clone.init_db().await {
                    tracing::error!("Failed to initialize database: {}", e);
                    return;
                }

                tracing::info!("Database initialized, spawning background tasks");

                // Spawn reward watcher (daily auto-claim loop)
                let watcher_handle = spawn_reward_watcher(app_handle.clone());
                app_handle.manage(watcher_handle);

                tracing::info!("Background tasks spawned successfully");
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth commands
            commands::list_profiles,
            commands::add_profile,
            commands::select_profile,
            commands::update_profile_token,
            commands::delete_profile,
            commands::logout,
            commands::get_active_profile,
            commands::get_me,
            // Agent commands
            commands::list_agents,
            // Chat commands
            commands::get_chat_status,
            commands::send_message,
            commands::load_history,
            commands::get_archived_messages,
            commands::clear_chat_archive,
            // Case commands
            commands::get_cases,
            commands::open_case,
            commands::refresh_cases,
            // Quest commands
            commands::get_quests,
            commands::verify_quest,
            // Daily reward commands
            commands::get_daily_reward_status,
            commands::get_daily_reward_ladder,
            commands::claim_daily_reward,
            commands::get_reward_watcher_status,
            commands::set_reward_watcher_enabled,
            commands::force_claim_reward,
            // Store commands
            commands::get_products,
            commands::buy_product,
            commands::get_star_packages,
            commands::buy_stars,
            commands::spend_stars,
            // Onboarding and localization commands
            commands::get_onboarding,
            commands::translate_ui,
            // App settings commands
            commands::get_app_settings,
            commands::set_app_settings,
            commands::get_storage_info,
            commands::vacuum_database,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
