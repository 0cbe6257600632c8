// Domain layer: core models and ports (interfaces). No dependency on the checkers or the CLI.

pub mod model;
pub mod ports;
