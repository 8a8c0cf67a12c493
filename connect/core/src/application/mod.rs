// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod error_translation;
pub mod mappers;
pub mod repository_factory;
pub mod resource_manager;

pub use resource_manager::{CollectionHandle, ResourceManager};
