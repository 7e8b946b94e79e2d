//! Integration tests for the edgewise record mapper

mod cache_coherence;
mod connect;
mod mapper_roundtrip;
mod persistence;
mod support;
