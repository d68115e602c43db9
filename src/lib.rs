// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Eddington Tracker: cycling statistics from a Ride with GPS history
//!
//! This crate computes overall and yearly Eddington numbers, ride metrics
//! and milestones, and pacing for distance, elevation, time and ride-count
//! goals. Rides are fetched from RWGPS and cached locally.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;
