//! A read-only GraphQL API over world countries, continents and languages.
//!
//! The data is loaded once into a [`Dataset`] and served by
//! [`CountriesServer`]. Every query is a lookup or a scan over those
//! in-memory tables, so the service needs no storage and no network access.

#![warn(unreachable_pub)]

pub mod configuration;
mod csrf;
pub mod dataset;
pub mod error;
mod executable;
mod http_server;
pub mod resolvers;
pub mod schema;

pub use configuration::Configuration;
pub use dataset::Dataset;
pub use executable::main;
pub use http_server::CountriesServer;
pub use schema::build_schema;
pub use schema::CountriesSchema;
