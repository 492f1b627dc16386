//! Bus itinerary resolver.
//!
//! A web service that answers: "I'm standing here - which buses, with
//! which transfers, get me to where I'm going?"

pub mod cache;
pub mod config;
pub mod datasets;
pub mod domain;
pub mod feed;
pub mod geocode;
pub mod overlay;
pub mod planner;
pub mod web;
