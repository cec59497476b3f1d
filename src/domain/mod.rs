// Domain layer: environment access, the Base settings every service shares, and the
// client port the SDK crates are plugged into.

pub mod base;
pub mod env;
pub mod ports;
