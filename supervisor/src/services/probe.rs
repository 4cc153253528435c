//! TCP readiness probing

use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::ReadinessProbe;

/// Connect-and-close probe.
///
/// The connection is dropped as soon as it is established; no payload is
/// exchanged. Only the OS connect timeout bounds a single attempt, the
/// supervisor's poll loop supplies the retry cadence.
#[derive(Debug, Clone, Default)]
pub struct TcpReadinessProbe;

impl TcpReadinessProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReadinessProbe for TcpReadinessProbe {
    async fn probe(&self, host: &str, port: u16) -> SupervisorResult<bool> {
        match TcpStream::connect((host, port)).await {
            Ok(_stream) => {
                debug!("TCP probe to {}:{} succeeded", host, port);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => Ok(false),
            Err(source) => Err(SupervisorError::ProbeFailed { port, source }),
        }
    }
}
