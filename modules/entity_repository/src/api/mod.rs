//! Transport adapters over the repository

pub mod rest;
