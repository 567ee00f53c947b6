//! Audio bridge - fire-and-forget UDP commands for an external livecoding
//! audio tool.
//!
//! Three local ports carry three kinds of command. Nothing is read back.

use serde::{Deserialize, Serialize};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::{debug, warn};

use crate::error::{Result, RippleError};
use crate::ripple::Ripple;

/// Bridge destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub enabled: bool,
    pub host: String,
    /// Ripple, echo and clock ports, in that order.
    pub ports: [u16; 3],
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            ports: [49160, 49161, 49162],
        }
    }
}

/// Which port a command goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeChannel {
    Ripple,
    Echo,
    Clock,
}

impl BridgeChannel {
    fn index(self) -> usize {
        match self {
            BridgeChannel::Ripple => 0,
            BridgeChannel::Echo => 1,
            BridgeChannel::Clock => 2,
        }
    }
}

/// `ripple <scenario> <entity> <vector> <energy>`
pub fn ripple_command(ripple: &Ripple) -> String {
    format!(
        "ripple {} {} {} {}",
        ripple.scenario,
        ripple.source,
        ripple.vector.as_str(),
        ripple.energy_after
    )
}

/// `echo <entity> <delta> <energy>` for each propagated target.
pub fn echo_commands(ripple: &Ripple) -> Vec<String> {
    ripple
        .propagated
        .iter()
        .map(|echo| format!("echo {} {} {}", echo.target, echo.delta, echo.energy_after))
        .collect()
}

/// `tick <n>`
pub fn clock_command(tick: u64) -> String {
    format!("tick {tick}")
}

/// Sends bridge commands over UDP.
#[derive(Debug)]
pub struct AudioBridge {
    socket: UdpSocket,
    targets: [SocketAddr; 3],
}

impl AudioBridge {
    /// Bind an ephemeral local socket and resolve the three destinations.
    pub fn bind(config: &BridgeConfig) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        let resolve = |port: u16| -> Result<SocketAddr> {
            (config.host.as_str(), port)
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| RippleError::Config(format!("cannot resolve bridge host '{}'", config.host)))
        };
        let targets = [
            resolve(config.ports[0])?,
            resolve(config.ports[1])?,
            resolve(config.ports[2])?,
        ];
        debug!(?targets, "audio bridge bound");
        Ok(Self { socket, targets })
    }

    pub fn target(&self, channel: BridgeChannel) -> SocketAddr {
        self.targets[channel.index()]
    }

    /// Send one command. Failures are logged and returned.
    pub fn send(&self, channel: BridgeChannel, command: &str) -> io::Result<()> {
        let target = self.target(channel);
        match self.socket.send_to(command.as_bytes(), target) {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(%target, command, error = %err, "bridge send failed");
                Err(err)
            }
        }
    }

    /// Send the ripple, echo and clock commands for a ripple.
    ///
    /// Every command is attempted; the first failure is returned.
    pub fn send_ripple(&self, ripple: &Ripple) -> io::Result<()> {
        let mut first_error = None;
        let mut record = |result: io::Result<()>| {
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        };

        record(self.send(BridgeChannel::Ripple, &ripple_command(ripple)));
        for command in echo_commands(ripple) {
            record(self.send(BridgeChannel::Echo, &command));
        }
        record(self.send(BridgeChannel::Clock, &clock_command(ripple.tick)));

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
