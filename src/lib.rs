//! Aerodesk - Airline customer-service operations API
//!
//! This crate fronts a relational airline-operations database with a
//! one-operation-per-request JSON surface for customer-service assistants.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
