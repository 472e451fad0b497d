//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate sources, policy and the accrual calculator into
//!   recomputation passes.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod ledger_service;
