// src/lib.rs

//! Harvester Library
//!
//! Incrementally harvests new weekly digest postings from a mailing-list
//! archive, extracts job-posting URLs and message bodies, flags salary
//! mentions, and follows URLs embedded inside each message.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
