pub mod command;
pub mod config_loader;
pub mod endpoint_resolver;
pub mod health_gate;
pub mod launcher;
pub mod migrations;
pub mod network_reconciler;
pub mod network_scanner;
pub mod readiness;
pub mod runtime;
pub mod sequencer;
