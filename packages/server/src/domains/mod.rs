// Domain modules

pub mod discovery;
