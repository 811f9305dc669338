//! UDP discovery of MediaBrowser servers

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// Discovery query servers answer to
pub const DISCOVERY_MESSAGE: &[u8] = b"who is MediaBrowserServer?";

/// Send the discovery query to `target` and wait up to `timeout` for a reply
///
/// Replies are pipe-delimited; the second field is the server id. Returns
/// `None` on timeout, socket error, or a reply without that field.
pub async fn discover(target: SocketAddr, timeout: Duration) -> Option<String> {
    match tokio::time::timeout(timeout, query(target)).await {
        Ok(Ok(Some(id))) => Some(id),
        Ok(Ok(None)) => None,
        Ok(Err(e)) => {
            debug!(%target, error = %e, "server discovery failed");
            None
        }
        Err(_) => {
            debug!(%target, ?timeout, "no reply to server discovery");
            None
        }
    }
}

async fn query(target: SocketAddr) -> io::Result<Option<String>> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;

    let sent = socket.send_to(DISCOVERY_MESSAGE, target).await?;
    if sent != DISCOVERY_MESSAGE.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            "not all data was sent through the socket",
        ));
    }

    let mut buf = [0u8; 1024];
    let (len, from) = socket.recv_from(&mut buf).await?;
    let reply = String::from_utf8_lossy(&buf[..len]);
    info!(reply = %reply, %from, "server discovery reply");

    Ok(server_id(&reply))
}

/// Second `|`-separated field of a discovery reply
pub(crate) fn server_id(reply: &str) -> Option<String> {
    reply
        .split('|')
        .nth(1)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
