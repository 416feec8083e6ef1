// Domain layer: normalization data model and the tool port. No I/O here.

pub mod model;
pub mod ports;
