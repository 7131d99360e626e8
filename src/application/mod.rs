//! Application layer - DTOs and the services that implement the engine's
//! use cases

pub mod dto;
pub mod services;
