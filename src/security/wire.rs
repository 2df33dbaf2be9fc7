use crate::shared::buffer::BitsBuf;
use crate::shared::dns::Name;

/// Builds a byte-exact synthetic "response-shaped" DNS message: the given
/// `txid`, standard flags `0x8180` (QR=1, RD=1, RA=1, rcode=NOERROR),
/// counts `(1, 1, 0, 0)`, a question section mirroring the probe query
/// (so it matches what an off-path attacker would have to guess at in a
/// real attempt), and an answer whose owner name is a compression pointer
/// to offset `0x0c` - right where the question name starts, immediately
/// after the 12-byte header - carrying a single A record `1.2.3.4`/60s TTL.
pub fn build_spoof_response(probe_domain: &Name, txid: u16) -> Vec<u8> {
    let mut buf = BitsBuf::new();
    buf.write_u16(txid);
    buf.write_u16(0x8180);
    buf.write_u16(1); // qdcount
    buf.write_u16(1); // ancount
    buf.write_u16(0); // nscount
    buf.write_u16(0); // arcount

    buf.write_bytes(&probe_domain.to_bytes());
    buf.write_u16(1); // QTYPE A
    buf.write_u16(1); // QCLASS IN

    buf.write_u16(0xC00C); // pointer to offset 0x0c
    buf.write_u16(1); // TYPE A
    buf.write_u16(1); // CLASS IN
    buf.write_u32(60); // TTL
    buf.write_u16(4); // RDLENGTH
    buf.write_bytes(&[1, 2, 3, 4]);

    buf.into_vec()
}

/// Builds a raw `ANY` query. The wire codec's [`crate::shared::dns::Question`]
/// deliberately refuses to encode the wildcard type (it's unsupported for
/// normal traffic), so the amplification probe writes the question bytes
/// directly, the same way `build_spoof_response` hand-builds its packet.
pub fn build_any_query(domain: &Name, txid: u16) -> Vec<u8> {
    let mut buf = BitsBuf::new();
    buf.write_u16(txid);
    buf.write_u16(0x0100); // RD=1
    buf.write_u16(1); // qdcount
    buf.write_u16(0);
    buf.write_u16(0);
    buf.write_u16(0);

    buf.write_bytes(&domain.to_bytes());
    buf.write_u16(255); // QTYPE ANY
    buf.write_u16(1); // QCLASS IN

    buf.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoof_response_carries_requested_txid() {
        let domain = Name::from_string("example.com.").unwrap();
        let packet = build_spoof_response(&domain, 0xBEEF);
        assert_eq!(u16::from_be_bytes([packet[0], packet[1]]), 0xBEEF);
    }

    #[test]
    fn spoof_response_has_standard_flags_and_counts() {
        let domain = Name::from_string("example.com.").unwrap();
        let packet = build_spoof_response(&domain, 1);
        assert_eq!(u16::from_be_bytes([packet[2], packet[3]]), 0x8180);
        assert_eq!(u16::from_be_bytes([packet[4], packet[5]]), 1); // qdcount
        assert_eq!(u16::from_be_bytes([packet[6], packet[7]]), 1); // ancount
        assert_eq!(u16::from_be_bytes([packet[8], packet[9]]), 0); // nscount
        assert_eq!(u16::from_be_bytes([packet[10], packet[11]]), 0); // arcount
    }

    #[test]
    fn any_query_uses_wildcard_qtype() {
        let domain = Name::from_string("example.com.").unwrap();
        let packet = build_any_query(&domain, 42);
        let qtype_offset = packet.len() - 4;
        assert_eq!(u16::from_be_bytes([packet[qtype_offset], packet[qtype_offset + 1]]), 255);
    }
}
