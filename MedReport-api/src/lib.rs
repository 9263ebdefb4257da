// MedReport-api lib.rs
//
// HTTP surface of the MedReport analyzer: routes, handlers, public
// request/response entities and the OpenAPI document.

pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
