use bytes::Buf;
use bytes::BytesMut;
use tokio_util::codec::Decoder;

const HEADER_LEN: usize = 2;

/// Splits a byte stream into packets prefixed with a big-endian u16 length.
#[derive(Default)]
pub struct FrameDecoder {}

impl Decoder for FrameDecoder {
    type Item = BytesMut;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> std::io::Result<Option<Self::Item>> {
        if buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let packet_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        if buf.len() < HEADER_LEN + packet_len {
            buf.reserve(HEADER_LEN + packet_len - buf.len());
            return Ok(None);
        }

        buf.advance(HEADER_LEN);
        Ok(Some(buf.split_to(packet_len)))
    }
}
