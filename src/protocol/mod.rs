//! Protocol Module
//!
//! Defines the binary wire protocol spoken by the controller.
//!
//! ## Packet Format
//!
//! Every packet, in both directions, is a fixed 14-byte header followed by
//! a function-specific payload. All integers are little-endian.
//!
//! ```text
//! ┌──────────────┬──────────┬──────────┬──────────┬──────────┬───────────┐
//! │ TotalLen (4) │ ReqId(2) │ Func (2) │Handle (2)│ Code (2) │  Payload  │
//! └──────────────┴──────────┴──────────┴──────────┴──────────┴───────────┘
//! ```
//!
//! - `TotalLen`: header + payload byte count
//! - `Handle`:   session handle, 0 before the session is opened
//! - `Code`:     reserved (0) in requests, return code in responses
//!
//! ### Function Codes
//! - 0x0101: OPEN_SESSION        - Payload: opaque, device specific
//! - 0x0124: READ_SPINDLE_METER  - Payload: spindle index (2)

mod header;
mod packet;
mod codec;
pub mod function;

pub use header::{PacketHeader, HEADER_SIZE};
pub use packet::{Request, Response};
pub use codec::{
    checked_total_length, decode_response, encode_request, encode_response, frame_length,
    write_request,
};
pub use function::{OpenSession, Query, RawQuery, SpindleLoad};
