//! Path-to-URL redirect handlers with a fallback chain.
//!
//! A [`MapHandler`] redirects requests whose path and query exactly match a
//! table entry and hands everything else to a fallback service. Tables come
//! from an in-memory mapping ([`map_handler`]) or from a YAML / JSON document
//! ([`yaml_handler`], [`json_handler`]).

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod redirect;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use redirect::{
    json_handler, map_handler, yaml_handler, ConfigParseError, MapHandler, RedirectEntry,
    RedirectFormat, RedirectTable,
};
