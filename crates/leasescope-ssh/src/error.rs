// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SshError {
    #[error("cannot resolve router address: {0}")]
    Resolve(String),

    #[error("router connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("router connection timed out after {0}s")]
    Timeout(u64),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("ssh protocol error: {0}")]
    Protocol(String),

    #[error("ssh channel error: {0}")]
    Channel(String),

    #[error("command exited with status {status}: {output}")]
    CommandFailed { status: u32, output: String },

    #[error("cannot start ssh runtime: {0}")]
    Runtime(String),
}

impl From<russh::Error> for SshError {
    fn from(error: russh::Error) -> Self {
        Self::Protocol(error.to_string())
    }
}
