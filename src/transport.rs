use crate::errors::DiagnosticErr;
use std::net::{IpAddr, UdpSocket};
use std::time::Duration;

/// Maximum size of a DNS response we're willing to read off the wire.
/// Plenty for EDNS-less UDP responses; anything larger is truncated by
/// the remote server itself (and flagged via the truncated header bit).
const RECV_BUF_SIZE: usize = 4096;

/// Sends a single raw DNS message over UDP to `(dst_ip, port)` and returns
/// the raw bytes of the first response. A fresh ephemeral socket is bound
/// per call - no connection pooling, no socket reuse - the same approach
/// a one-shot resolver query takes when it isn't sitting behind a server.
pub fn send_query(query_bytes: &[u8], dst_ip: IpAddr, port: u16, timeout: Duration) -> Result<Vec<u8>, DiagnosticErr> {
    let bind_addr = match dst_ip {
        IpAddr::V4(_) => "0.0.0.0:0",
        IpAddr::V6(_) => "[::]:0",
    };
    let socket = UdpSocket::bind(bind_addr)?;
    socket.set_write_timeout(Some(timeout))?;
    socket.set_read_timeout(Some(timeout))?;
    socket.send_to(query_bytes, (dst_ip, port))?;

    let mut buffer = [0u8; RECV_BUF_SIZE];
    let (n_recv, _) = socket.recv_from(&mut buffer)?;
    Ok(buffer[..n_recv].to_vec())
}

/// Binds a socket without sending anything, for probes that need to read
/// unsolicited/raw responses (the Kaminsky probe's genuine query listens
/// on its own socket while a separate sender races a spoof burst at it).
pub fn bind_ephemeral(timeout: Duration) -> Result<UdpSocket, DiagnosticErr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_write_timeout(Some(timeout))?;
    socket.set_read_timeout(Some(timeout))?;
    Ok(socket)
}
