// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod error;
mod handler;
mod runner;

pub use error::SshError;
pub use runner::{DEFAULT_SSH_PORT, DEFAULT_SSH_TIMEOUT, SshRunner, SshTarget};
