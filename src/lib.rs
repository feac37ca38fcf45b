// src/lib.rs

//! kramlink: Kramerius periodical crawler and citation linker

pub mod error;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod tree;
pub mod utils;
