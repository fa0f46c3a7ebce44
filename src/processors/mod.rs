//! Processing utilities for the classification pipeline.

pub mod topk;

pub use topk::Topk;
