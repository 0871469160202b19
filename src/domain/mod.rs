// Domain layer: the character model and the ports the aggregation core talks to.

pub mod model;
pub mod ports;
