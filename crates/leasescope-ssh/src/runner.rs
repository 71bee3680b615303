// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::SshError;
use crate::handler::ClientHandler;
use leasescope_app::CommandRunner;
use russh::ChannelMsg;
use russh::client::{AuthResult, Handle};
use russh::Disconnect;
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};
use tokio::time::timeout;

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_SSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub timeout: Duration,
}

impl SshTarget {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            timeout: DEFAULT_SSH_TIMEOUT,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SshError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|error| SshError::Resolve(format!("{}: {error}", self)))?
            .next()
            .ok_or_else(|| SshError::Resolve(format!("{self}: no usable address")))
    }

    fn russh_config(&self) -> russh::client::Config {
        russh::client::Config {
            inactivity_timeout: Some(self.timeout),
            ..russh::client::Config::default()
        }
    }
}

impl fmt::Display for SshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Blocking SSH command runner. The async client is driven on a private
/// current-thread runtime so callers stay synchronous.
pub struct SshRunner {
    runtime: Runtime,
    handle: Handle<ClientHandler>,
    target: SshTarget,
}

impl SshRunner {
    pub fn connect(target: SshTarget, password: &str) -> Result<Self, SshError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| SshError::Runtime(error.to_string()))?;
        let handle = runtime.block_on(open_session(&target, password))?;
        Ok(Self {
            runtime,
            handle,
            target,
        })
    }

    pub fn target(&self) -> &SshTarget {
        &self.target
    }

    /// Runs `command` and returns stdout followed by stderr.
    pub fn exec(&mut self, command: &str) -> Result<String, SshError> {
        let limit = self.target.timeout;
        let secs = limit.as_secs();
        let handle = &self.handle;
        self.runtime.block_on(async {
            timeout(limit, exec_combined(handle, command))
                .await
                .map_err(|_| SshError::Timeout(secs))?
        })
    }
}

impl CommandRunner for SshRunner {
    fn run(&mut self, command: &str) -> anyhow::Result<String> {
        Ok(self.exec(command)?)
    }
}

impl Drop for SshRunner {
    fn drop(&mut self) {
        let handle = &self.handle;
        let _ = self.runtime.block_on(async {
            handle
                .disconnect(Disconnect::ByApplication, "", "English")
                .await
        });
    }
}

async fn open_session(
    target: &SshTarget,
    password: &str,
) -> Result<Handle<ClientHandler>, SshError> {
    let addr = target.socket_addr()?;
    let secs = target.timeout.as_secs();
    tracing::info!("connecting to {target} ({addr})");

    let stream = timeout(target.timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| SshError::Timeout(secs))??;

    let config = Arc::new(target.russh_config());
    let handler = ClientHandler::new(target.host.clone());
    let mut handle = timeout(
        target.timeout,
        russh::client::connect_stream(config, stream, handler),
    )
    .await
    .map_err(|_| SshError::Timeout(secs))??;

    let auth = timeout(
        target.timeout,
        handle.authenticate_password(&target.username, password),
    )
    .await
    .map_err(|_| SshError::Timeout(secs))??;

    match auth {
        AuthResult::Success => {}
        AuthResult::Failure {
            partial_success: true,
            ..
        } => {
            return Err(SshError::Auth(
                "router requires an additional authentication step".to_owned(),
            ));
        }
        AuthResult::Failure {
            remaining_methods, ..
        } => {
            return Err(SshError::Auth(format!(
                "password rejected for {}; server accepts {remaining_methods:?}",
                target.username
            )));
        }
    }

    tracing::info!("authenticated as {}", target.username);
    Ok(handle)
}

async fn exec_combined(handle: &Handle<ClientHandler>, command: &str) -> Result<String, SshError> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|error| SshError::Channel(error.to_string()))?;
    channel
        .exec(true, command)
        .await
        .map_err(|error| SshError::Channel(error.to_string()))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_status = None;
    while let Some(message) = channel.wait().await {
        match message {
            ChannelMsg::Data { data } => stdout.extend_from_slice(&data),
            ChannelMsg::ExtendedData { data, ext: 1 } => stderr.extend_from_slice(&data),
            ChannelMsg::ExitStatus { exit_status: status } => exit_status = Some(status),
            // RouterOS may send the exit status after EOF.
            ChannelMsg::Eof if exit_status.is_some() => break,
            ChannelMsg::Close => break,
            _ => {}
        }
    }

    stdout.extend_from_slice(&stderr);
    let output = String::from_utf8_lossy(&stdout).into_owned();
    match exit_status {
        Some(status) if status != 0 => Err(SshError::CommandFailed {
            status,
            output: output.trim().to_owned(),
        }),
        _ => Ok(output),
    }
}
