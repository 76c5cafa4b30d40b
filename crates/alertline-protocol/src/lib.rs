//! Wire protocol for Alertline.
//!
//! This crate defines what travels over the notification channel:
//!
//! - **Types** ([`Frame`], [`ChannelEvent`], [`RegistrationRequest`],
//!   [`RegistrationToken`]): the messages and the identity they carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (Frame / ChannelEvent) → Session (handshake, dispatch)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    kinds, ChannelEvent, Frame, RegistrationRequest, RegistrationToken,
};
