// Domain layer: core models and ports (interfaces). No external dependencies
// beyond std/serde where possible; clap leaks in only for the SortOrder flag.

pub mod model;
pub mod ports;
