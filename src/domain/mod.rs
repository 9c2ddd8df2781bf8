// Domain layer: address/quote models and the ports to the external logistics services.

pub mod model;
pub mod ports;
