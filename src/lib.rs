// Library for tests to access modules

pub mod aggregator;
pub mod commands;
pub mod config;
pub mod lookup;
pub mod models;
pub mod probe;
pub mod rates;
pub mod routes;
pub mod sampler;
pub mod version;
