#![no_std]

//! iBeacon broadcaster firmware library
//!
//! Core functionality for the beacon firmware, organized into clear
//! architectural layers:
//!
//! - `config` / `payload`: configuration surface and pure frame assembly
//! - `ble`: SoftDevice advertising driver
//! - `blink` / `timeout`: the two demo loops and their polling timer

pub mod ble;
pub mod blink;
pub mod config;
pub mod payload;
pub mod timeout;
