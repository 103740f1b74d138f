//! Application layer wiring DTOs and services for the assistant.

pub mod dtos;
pub mod services;

pub use dtos::{
    AskRequest, AskResponse, HealthStatusResponse, SearchRequest, SearchResponse, StatsResponse,
};
pub use services::{ReviewService, SupervisorService};
