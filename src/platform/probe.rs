//! Host probes backed by the OS: `ping`, TCP connect and `getent`.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::lan::Reachability;

/// Grace period on top of ping's own deadline before the child is killed
const PING_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl SystemProbe {
    /// Single-attempt ping arguments for this platform
    pub fn ping_args(ip: Ipv4Addr, deadline: Duration) -> Vec<String> {
        if cfg!(windows) {
            vec![
                "-n".to_string(),
                "1".to_string(),
                "-w".to_string(),
                deadline.as_millis().max(1).to_string(),
                ip.to_string(),
            ]
        } else {
            // iputils takes whole seconds
            let secs = deadline.as_secs_f64().ceil().max(1.0) as u64;
            vec![
                "-c".to_string(),
                "1".to_string(),
                "-W".to_string(),
                secs.to_string(),
                ip.to_string(),
            ]
        }
    }
}

impl Reachability for SystemProbe {
    async fn ping(&self, ip: Ipv4Addr, deadline: Duration) -> Option<Duration> {
        let mut cmd = Command::new("ping");
        cmd.args(Self::ping_args(ip, deadline))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let start = Instant::now();
        match timeout(deadline + PING_GRACE, cmd.status()).await {
            Ok(Ok(status)) if status.success() => Some(start.elapsed()),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                log::debug!("ping {} failed to run: {}", ip, e);
                None
            }
            Err(_) => None,
        }
    }

    async fn port_open(&self, ip: Ipv4Addr, port: u16, deadline: Duration) -> bool {
        matches!(timeout(deadline, TcpStream::connect((ip, port))).await, Ok(Ok(_)))
    }

    async fn reverse_lookup(&self, ip: Ipv4Addr, deadline: Duration) -> Option<String> {
        if !cfg!(target_os = "linux") {
            return None;
        }

        let mut cmd = Command::new("getent");
        cmd.args(["hosts", &ip.to_string()])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = timeout(deadline, cmd.output()).await.ok()?.ok()?;
        if !output.status.success() {
            return None;
        }
        parse_getent_hosts(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Name column of `getent hosts` output, without a trailing dot
pub fn parse_getent_hosts(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .nth(1)
        .map(|name| name.trim_end_matches('.').to_string())
        .filter(|name| !name.is_empty())
}
