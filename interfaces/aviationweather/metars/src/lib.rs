//! Client for the METAR dataserver of the Aviation Weather Center.
//!
//! - `index` sends the HTTP request and hands back the raw body
//! - `response` deserializes that body into wire types

pub mod index;
pub mod response;
