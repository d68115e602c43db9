// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod eddington;
pub mod goals;
pub mod metrics;
pub mod rwgps;
pub mod sync;
pub mod units;

pub use rwgps::RwgpsClient;
pub use sync::{RideSource, RideSync};
pub use units::{DistanceUnit, ElevationUnit};
