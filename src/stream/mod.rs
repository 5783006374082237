//! Decoding of `data: <json>` streamed chat-completion bodies.
mod chunk;
mod decoder;


pub use chunk::{CompletionBody, StreamChunk};
pub use decoder::{DONE_SENTINEL, DATA_PREFIX, LineDecoder, StreamEvent, decode_lines};
