// Copyright 2022 - 2026 Wsparse See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2026/10/12 10:06:46

mod assembler;
mod codec;
mod config;
mod consts;
mod error;
mod frame;
mod handshake;
mod message;
pub mod parser;
mod server;
mod ws_trait;

pub use self::assembler::MessageAssembler;
pub use self::codec::{WsCodec, WsOutbound};
pub use self::config::{FrameDetect, WsConfig};
pub use self::consts::Consts;
pub use self::error::{WsErrno, WsError, WsResult};
pub use self::frame::{pack_ws_msg, WsFrame};
pub use self::handshake::WsHandshake;
pub use self::message::WsMessage;
pub use self::parser::{OpCode, WsPkgType};
pub use self::server::WsServer;
pub use self::ws_trait::WsTrait;
