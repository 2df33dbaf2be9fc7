pub mod iterative;
pub mod ns_address;

pub use iterative::{discover_authoritative_ns, NsHostname};
pub use ns_address::resolve_ns_addresses;

use crate::errors::DiagnosticErr;
use crate::shared::dns::{Class, Header, Message, Name, Question, RecordType};
use std::net::IpAddr;
use std::time::Duration;

/// Builds a single-question query message. `recursion_desired` distinguishes
/// stub queries sent to a recursive resolver from the non-recursive queries
/// this system sends directly to authoritative servers - the flag is
/// observable in the response and callers rely on it being set correctly.
pub(crate) fn build_query(node: &Name, record_type: RecordType, recursion_desired: bool) -> Message {
    let mut header = Header::default();
    header.recursion_desired = recursion_desired;
    header.questions_count = 1;
    Message {
        header,
        questions: vec![Question { node: node.clone(), record_type, class: Class::IN }],
        answers: vec![],
        authorities: vec![],
        additionals: vec![],
    }
}

/// Encodes `message`, sends it to `(dst_ip, port)`, decodes the response and
/// checks the transaction id matches before returning it.
pub(crate) fn send_and_decode(
    message: &Message,
    dst_ip: IpAddr,
    port: u16,
    timeout: Duration,
) -> Result<Message, DiagnosticErr> {
    let bytes = message.encode_to_bytes()?;
    let resp_bytes = crate::transport::send_query(&bytes, dst_ip, port, timeout)?;
    let resp = Message::decode_from_bytes(&resp_bytes)?;
    if resp.header.id != message.header.id {
        return Err(DiagnosticErr::MalformedResponse(format!(
            "txid mismatch: expected {}, got {}",
            message.header.id, resp.header.id
        )));
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;
    use std::thread;

    /// A loopback responder that flips the TXID of whatever query it
    /// receives before replying - `send_and_decode` must reject the result.
    #[test]
    fn rejects_response_with_mismatched_txid() {
        let responder = UdpSocket::bind("127.0.0.1:0").unwrap();
        let responder_addr = responder.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 512];
            let (n, src) = responder.recv_from(&mut buf).unwrap();
            let query = Message::decode_from_bytes(&buf[..n]).unwrap();

            let mut header = Header::default();
            header.query_resp = true;
            header.id = query.header.id ^ 0xFFFF;
            let response =
                Message { header, questions: vec![], answers: vec![], authorities: vec![], additionals: vec![] };
            let bytes = response.encode_to_bytes().unwrap();
            responder.send_to(&bytes, src).unwrap();
        });

        let domain = Name::from_string("example.com.").unwrap();
        let query = build_query(&domain, RecordType::A, true);
        let result =
            send_and_decode(&query, responder_addr.ip(), responder_addr.port(), Duration::from_secs(2));

        handle.join().unwrap();
        assert!(matches!(result, Err(DiagnosticErr::MalformedResponse(_))));
    }
}
