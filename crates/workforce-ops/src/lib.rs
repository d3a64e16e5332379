//! Performance scoring and anomaly detection engine for multi-tenant
//! workforce management: geofenced attendance classification, per-parameter
//! scoring with weighted composites and bonus tiers, leave impact
//! classification, and a daily rule-based anomaly sweep.

pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
