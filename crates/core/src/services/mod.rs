pub mod data_orchestrator;
pub mod portfolio_controller;
