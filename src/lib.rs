// src/lib.rs

pub mod cli;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod render;
pub mod repository;
pub mod service;
