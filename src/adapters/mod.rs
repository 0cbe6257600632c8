// Adapters layer: concrete implementations of the domain ports (filesystem sources, report output).

pub mod reporter;
pub mod source;
