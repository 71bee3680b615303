// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cache;
pub mod client;
pub mod oui;
pub mod resolver;

pub use cache::*;
pub use client::*;
pub use oui::*;
pub use resolver::*;
