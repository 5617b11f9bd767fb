use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use rand::RngCore;

use super::define::{RTMP_HANDSHAKE_SIZE, RTMP_VERSION, ServerHandshakeState};
use super::errors::HandshakeError;

fn now_ms() -> u32 {
    chrono::Utc::now().timestamp_millis() as u32
}

/// Implements only the plaintext ("simple") RTMP handshake: no HMAC digest,
/// no encryption. Real clients fall back to this when they don't need Adobe's
/// authentication scheme, which is effectively every open RTMP client.
pub struct HandshakeServer {
    state: ServerHandshakeState,
    c1_timestamp: u32,
    c1_bytes: Bytes,
}

impl Default for HandshakeServer {
    fn default() -> Self {
        Self {
            state: ServerHandshakeState::ReadC0C1,
            c1_timestamp: 0,
            c1_bytes: Bytes::new(),
        }
    }
}

impl HandshakeServer {
    pub fn state(&self) -> ServerHandshakeState {
        self.state
    }

    /// Reads C0 (1 byte) and C1 (1536 bytes) from `data`.
    pub fn read_c0_c1(&mut self, data: &[u8]) -> Result<(), HandshakeError> {
        if self.state != ServerHandshakeState::ReadC0C1 {
            return Err(HandshakeError::WrongState);
        }

        let mut cursor = std::io::Cursor::new(data);
        let _version = cursor.read_u8()?; // we don't enforce this is exactly 3

        self.c1_timestamp = cursor.read_u32::<BigEndian>()?;
        let mut zero = [0u8; 4];
        cursor.read_exact(&mut zero)?;

        let mut rest = vec![0u8; RTMP_HANDSHAKE_SIZE - 8];
        cursor.read_exact(&mut rest)?;
        self.c1_bytes = Bytes::from(rest);

        self.state = ServerHandshakeState::WriteS0S1S2;
        Ok(())
    }

    /// Writes S0, S1, and S2 to `writer`. S2 echoes C1 verbatim, which is
    /// what every client actually checks.
    pub fn write_s0_s1_s2(&mut self, writer: &mut impl Write) -> Result<(), HandshakeError> {
        if self.state != ServerHandshakeState::WriteS0S1S2 {
            return Err(HandshakeError::WrongState);
        }

        // S0
        writer.write_u8(RTMP_VERSION)?;

        // S1
        writer.write_u32::<BigEndian>(now_ms())?;
        writer.write_u32::<BigEndian>(0)?;
        let mut random = vec![0u8; RTMP_HANDSHAKE_SIZE - 8];
        rand::rng().fill_bytes(&mut random);
        writer.write_all(&random)?;

        // S2
        writer.write_u32::<BigEndian>(self.c1_timestamp)?;
        writer.write_u32::<BigEndian>(now_ms())?;
        writer.write_all(&self.c1_bytes)?;

        self.state = ServerHandshakeState::ReadC2;
        Ok(())
    }

    /// Reads and discards C2 (1536 bytes). Some clients send a C2 that
    /// doesn't echo our S1 exactly; we don't verify it, matching how real
    /// servers behave in the wild.
    pub fn read_c2(&mut self, data: &[u8]) -> Result<(), HandshakeError> {
        if self.state != ServerHandshakeState::ReadC2 {
            return Err(HandshakeError::WrongState);
        }
        if data.len() < RTMP_HANDSHAKE_SIZE {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        self.state = ServerHandshakeState::Finish;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_handshake_sequence() {
        let mut server = HandshakeServer::default();

        let mut c0c1 = vec![3u8];
        c0c1.extend_from_slice(&100u32.to_be_bytes());
        c0c1.extend_from_slice(&[0u8; 4]);
        c0c1.extend_from_slice(&[7u8; RTMP_HANDSHAKE_SIZE - 8]);

        server.read_c0_c1(&c0c1).unwrap();
        assert_eq!(server.state(), ServerHandshakeState::WriteS0S1S2);

        let mut out = Vec::new();
        server.write_s0_s1_s2(&mut out).unwrap();
        assert_eq!(server.state(), ServerHandshakeState::ReadC2);
        assert_eq!(out[0], RTMP_VERSION);
        // S2 echoes C1's random bytes verbatim.
        assert_eq!(&out[out.len() - (RTMP_HANDSHAKE_SIZE - 8)..], &[7u8; RTMP_HANDSHAKE_SIZE - 8][..]);

        let c2 = vec![0u8; RTMP_HANDSHAKE_SIZE];
        server.read_c2(&c2).unwrap();
        assert_eq!(server.state(), ServerHandshakeState::Finish);
    }

    #[test]
    fn rejects_out_of_order_calls() {
        let mut server = HandshakeServer::default();
        let err = server.write_s0_s1_s2(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, HandshakeError::WrongState));
    }
}
