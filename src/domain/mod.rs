// Domain layer: core models and ports (interfaces). No dependencies on the
// concrete adapters.

pub mod model;
pub mod ports;
