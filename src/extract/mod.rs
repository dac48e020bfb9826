// src/extract/mod.rs

//! Leaf extraction utilities: markup-to-text, URL scanning, salary detection.

pub mod salary;
pub mod text;
pub mod urls;

pub use salary::detect_salary;
pub use text::extract_text;
pub use urls::extract_urls;
