// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod leases;
pub mod model;
pub mod state;

pub use leases::*;
pub use model::*;
pub use state::*;
