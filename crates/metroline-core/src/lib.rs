//! Metroline Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Metroline
//! schematic layout engine. It includes:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Planar coordinates, grid cells and projections ([`geometry`] module)
//! - **Points**: The geographic stop/place model ([`point`] module)
//! - **Queue**: A priority queue with selectable order ([`queue`] module)

pub mod geometry;
pub mod identifier;
pub mod point;
pub mod queue;
