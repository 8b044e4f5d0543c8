//! # reclaim
//!
//! Finds reclaimable disk space on a developer machine and gives it back
//! safely.
//!
//! - **Catalog-driven scanning**: 30+ known tool caches, project build
//!   artifacts, large files and the trash, sized by allocated blocks
//! - **Risk tiers**: every cache is safe, caution or risky; risky data is
//!   never cleaned unless asked for explicitly
//! - **Trash-only cleanup**: items are moved to the trash, never deleted;
//!   emptying the trash is the one permanent operation
//! - **Forecasting**: periodic usage snapshots give a days-until-full
//!   estimate and low-disk alerts with hysteresis
//! - **Embeddable**: the [`monitor::Monitor`] facade and a C-ABI JSON bridge
//!   for GUI hosts, plus the `reclaim` CLI

pub mod cleaner;
pub mod cli;
pub mod common;
pub mod ffi;
pub mod forecast;
pub mod monitor;
pub mod scanner;
pub mod store;
