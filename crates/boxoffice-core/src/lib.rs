//! Event registry, payment coordination, and configuration for the box office.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `boxoffice.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`registry`] -- The [`Registry`] state machine: events, holders, and
//!   the accumulated balance.
//! - [`office`] -- [`BoxOffice`], which serializes every operation and
//!   couples registry mutations to the payment gateway.
//! - [`snapshot`] -- Capture, validate, save, and load registry snapshots.
//!
//! [`Registry`]: registry::Registry
//! [`BoxOffice`]: office::BoxOffice

pub mod config;
pub mod office;
pub mod registry;
pub mod snapshot;
