//! Types shared between the HealthLand backend and its clients.
//!
//! Nothing in here touches the network or the database: the models are plain
//! serde structs, and the registration wizard is a pure state machine so a
//! browser build can drive it the same way the server validates it.

pub mod jobs;
pub mod model;
pub mod registration;
pub mod requests;
pub mod validation;
