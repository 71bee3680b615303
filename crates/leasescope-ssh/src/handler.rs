// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use russh::keys::PublicKey;
use russh::keys::ssh_key::HashAlg;
use std::future::Future;

/// Accepts any host key and logs its fingerprint.
// TODO: verify against ~/.ssh/known_hosts once a trust-on-first-use prompt exists.
pub(crate) struct ClientHandler {
    host: String,
}

impl ClientHandler {
    pub(crate) fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl russh::client::Handler for ClientHandler {
    type Error = russh::Error;

    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        tracing::info!(
            "router {} presented {} key {}",
            self.host,
            server_public_key.algorithm(),
            server_public_key.fingerprint(HashAlg::Sha256)
        );
        async { Ok(true) }
    }
}
