// Domain layer: session model and the ports the controller talks through.

pub mod model;
pub mod ports;
