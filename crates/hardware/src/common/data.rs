//! Request and Response Payloads.
//!
//! This module defines the payloads carried by the four ready/valid ports of the
//! channel, and the bit widths that bound them:
//! 1. **Request:** `{id, addr}` travelling upstream → channel → downstream.
//! 2. **Response:** `{id, data}` travelling downstream → channel → upstream.
//! 3. **Widths:** Per-field bit widths fixed at construction, used to reject
//!    payloads that would not fit on the modelled wires.

use serde::{Deserialize, Serialize};

use super::error::ProtocolError;

/// Default bit widths for the request/response structures.
mod defaults {
    /// Width of the `id` field shared by requests and responses.
    pub const ID_WIDTH: u32 = 8;

    /// Width of the request `addr` field.
    pub const ADDR_WIDTH: u32 = 32;

    /// Width of the response `data` field.
    pub const DATA_WIDTH: u32 = 32;
}

/// A request presented on the upstream or downstream request port.
///
/// The `id` is chosen by the requester and must be unique among all requests
/// that have not yet received their response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    /// Requester-chosen transaction identifier.
    pub id: u64,
    /// Address selecting the cache line.
    pub addr: u64,
}

impl Request {
    /// Creates a request.
    pub const fn new(id: u64, addr: u64) -> Self {
        Self { id, addr }
    }
}

/// A response presented on the upstream or downstream response port.
///
/// The `id` echoes the `id` of the request that produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Response {
    /// Identifier of the originating request.
    pub id: u64,
    /// Data returned for the request's address.
    pub data: u64,
}

impl Response {
    /// Creates a response.
    pub const fn new(id: u64, data: u64) -> Self {
        Self { id, data }
    }
}

/// Bit widths of the request and response structures.
///
/// Both sides of a connection must agree on these; a mismatch is reported as a
/// [`ConfigError::WidthMismatch`](super::error::ConfigError::WidthMismatch) when
/// the peers are wired together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceWidths {
    /// Width of the `id` field.
    #[serde(default = "InterfaceWidths::default_id_width")]
    pub id_width: u32,
    /// Width of the `addr` field.
    #[serde(default = "InterfaceWidths::default_addr_width")]
    pub addr_width: u32,
    /// Width of the `data` field.
    #[serde(default = "InterfaceWidths::default_data_width")]
    pub data_width: u32,
}

impl InterfaceWidths {
    fn default_id_width() -> u32 {
        defaults::ID_WIDTH
    }

    fn default_addr_width() -> u32 {
        defaults::ADDR_WIDTH
    }

    fn default_data_width() -> u32 {
        defaults::DATA_WIDTH
    }

    /// Creates a width set.
    pub const fn new(id_width: u32, addr_width: u32, data_width: u32) -> Self {
        Self {
            id_width,
            addr_width,
            data_width,
        }
    }

    /// Returns the all-ones mask for a field of `width` bits.
    pub const fn mask(width: u32) -> u64 {
        if width >= u64::BITS {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    /// Number of distinct ids representable on the `id` field.
    ///
    /// Saturates at `u64::MAX` for a 64-bit id.
    pub const fn id_space(&self) -> u64 {
        if self.id_width >= u64::BITS {
            u64::MAX
        } else {
            1u64 << self.id_width
        }
    }

    /// Verifies that every field of `req` fits its configured width.
    pub fn check_request(&self, req: &Request) -> Result<(), ProtocolError> {
        Self::check("id", req.id, self.id_width)?;
        Self::check("addr", req.addr, self.addr_width)
    }

    /// Verifies that every field of `rsp` fits its configured width.
    pub fn check_response(&self, rsp: &Response) -> Result<(), ProtocolError> {
        Self::check("id", rsp.id, self.id_width)?;
        Self::check("data", rsp.data, self.data_width)
    }

    fn check(field: &'static str, value: u64, width: u32) -> Result<(), ProtocolError> {
        if value & !Self::mask(width) == 0 {
            Ok(())
        } else {
            Err(ProtocolError::FieldOverflow {
                field,
                value,
                width,
            })
        }
    }
}

impl Default for InterfaceWidths {
    fn default() -> Self {
        Self::new(
            defaults::ID_WIDTH,
            defaults::ADDR_WIDTH,
            defaults::DATA_WIDTH,
        )
    }
}
