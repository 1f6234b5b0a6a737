//! Command-resolution and state-reconciliation core for Crestron home systems
//!
//! This crate turns structured natural-language intents into device commands
//! against a Crestron controller and keeps an optimistic in-memory cache
//! reconciled with the controller's authoritative state.
//!
//! # Features
//!
//! - Fuzzy device/room/area resolution with a built-in alias table
//! - Optimistic command execution with pre-command undo snapshots
//! - Poll-wins reconciliation cache with auth-expiry recovery
//! - Coordinated thermostat pairing (primary HVAC + floor heat)
//! - Deterministic natural-language responses and status reports
//!
//! # Example
//!
//! ```rust,no_run
//! use crestron_home_core::{ControlCore, CoreConfig};
//! use crestron_home_core::intent::{CommandAction, LightAction, TargetHints};
//! use crestron_home_core::mock::{MockAuthClient, MockControllerClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoreConfig::from_env()?;
//!     let client = Arc::new(MockControllerClient::new());
//!     let auth = Arc::new(MockAuthClient::new(true));
//!     let core = ControlCore::new(&config, client, auth);
//!
//!     core.poll_once().await?;
//!     let action = CommandAction::Light {
//!         action: LightAction::On,
//!         target: TargetHints::room("Kitchen"),
//!     };
//!     let executed = core.submit_command("turn on the kitchen lights", &action).await?;
//!     println!("{}", executed.response);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod command;
pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod intent;
pub mod logging;
pub mod matching;
pub mod mock;
pub mod model;
pub mod pairing;

// Re-export main types
pub use crate::{
    cache::DeviceCache,
    client::{AuthClient, ControllerClient},
    command::{CommandExecutor, UndoOutcome},
    config::CoreConfig,
    core::ControlCore,
    error::{HomeError, Result},
    history::{CommandHistory, DeviceStateSnapshot, ExecutedCommand},
    intent::CommandAction,
    model::TopologySnapshot,
    pairing::{PairingCoordinator, ThermostatPair},
};
