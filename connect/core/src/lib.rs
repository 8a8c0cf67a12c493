// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Switchboard Connect Core
//!
//! Resource layer of the Connect directory: typed resources for agents,
//! peers, domains, gateways, numbers, access control lists and credentials;
//! their validation, storage mapping, filtered queries and persistence.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Entry point:** `application::ResourceManager`

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CollectionHandle, ResourceManager};
pub use domain::errors::ResourceError;
pub use domain::kinds::ResourceDto;
pub use domain::resource::{Kind, Ref};
pub use domain::response::{Response, Status};
