//! Wire protocol
//!
//! Colon-delimited text messages carried over a stream socket. Framing is
//! the transport's concern (see `net`); this module only maps between
//! message strings and typed values.

mod message;
mod serialize;

pub use message::Message;
pub use serialize::{
    decode_message, deserialize_operation, encode_message, serialize_operation, CONNECTED,
    DELETE, INIT_DOCUMENT, INSERT,
};
