// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Resource model, storage record shape, filter language and the
//! persistence and validation contracts of the Connect resource layer.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types and interfaces; no I/O except configuration types

pub mod collection;
pub mod config;
pub mod errors;
pub mod filter;
pub mod kinds;
pub mod record;
pub mod repository;
pub mod resource;
pub mod response;
pub mod validation;
