pub mod conf;
pub mod error;
pub mod presence;
pub mod startup;
pub mod telemetry;

mod routes;
mod trace;
