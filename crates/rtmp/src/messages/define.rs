use bytes::Bytes;
use num_derive::FromPrimitive;
use rtmpd_amf0::Amf0Value;

/// The `msg_type_id` byte in a chunk message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum MessageTypeID {
    SetChunkSize = 1,
    Abort = 2,
    Acknowledgement = 3,
    UserControlEvent = 4,
    WindowAcknowledgementSize = 5,
    SetPeerBandwidth = 6,
    Audio = 8,
    Video = 9,
    DataAMF3 = 15,
    SharedObjAMF3 = 16,
    CommandAMF3 = 17,
    DataAMF0 = 18,
    SharedObjAMF0 = 19,
    CommandAMF0 = 20,
    Aggregate = 22,
}

/// A fully decoded RTMP message, after chunk reassembly.
#[derive(Debug, Clone)]
pub enum RtmpMessageData<'a> {
    Amf0Command {
        command_name: String,
        transaction_id: f64,
        command_object: Amf0Value<'a>,
        others: Vec<Amf0Value<'a>>,
    },
    Amf0Data {
        data: Bytes,
    },
    SetChunkSize {
        chunk_size: u32,
    },
    WindowAcknowledgementSize {
        size: u32,
    },
    SetPeerBandwidth {
        size: u32,
        limit_type: u8,
    },
    Acknowledgement {
        sequence_number: u32,
    },
    AudioData {
        data: Bytes,
    },
    VideoData {
        data: Bytes,
    },
}
