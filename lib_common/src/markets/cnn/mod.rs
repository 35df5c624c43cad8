//! # CNN Business API Integration Module
//!
//! This module provides a dedicated interface for the CNN Business Fear & Greed
//! Index. It encapsulates the client logic and data structures required to
//! fetch and normalize the index for the digest's sentiment table.
//!
//! ## Contained Modules:
//!
//! - **`apicallcnn`**: Implements the low-level HTTP client for the CNN dataviz
//!   API, handling browser-like headers, retry logic, and error handling.
//!
//! - **`fearandgreed`**: Defines the data model and the higher-level client
//!   that turns the raw payload into a typed reading.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Client for making HTTP requests to CNN Business APIs.
pub mod apicallcnn;
/// Data models and client logic for the CNN Fear & Greed Index.
pub mod fearandgreed;
