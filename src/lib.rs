//! Storefront and dashboard backend for social-media boost services
//!
//! Platform and service catalogs, legacy data migration, the price
//! calculator and the order ledger, persisted as JSON documents in an
//! embedded key-value store.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod database;
pub mod dedupe;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod migration;
pub mod model;
pub mod pricing;
pub mod route;
pub mod seed;
