//! BLE broadcaster implementation
//!
//! The beacon only advertises; there is no GATT server and no connection
//! handling. Everything lives in the advertising driver.

pub mod advertising;
