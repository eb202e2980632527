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
// Created Date: 2026/10/12 15:40:02

mod data;
mod handshake;

pub use data::{DataParser, DataPhase, FrameEvent, PayloadType};
pub use handshake::{HandshakeEvent, HandshakeHeaders, HandshakeParser, HandshakePhase};

/// 当前解析出的数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WsPkgType {
    #[default]
    Unknown,
    Handshake,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Continuation = 0,
    Text = 1,
    Binary = 2,
    Close = 8,
    Ping = 9,
    Pong = 10,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<OpCode> {
        match value {
            0x0 => Some(OpCode::Continuation),
            0x1 => Some(OpCode::Text),
            0x2 => Some(OpCode::Binary),
            0x8 => Some(OpCode::Close),
            0x9 => Some(OpCode::Ping),
            0xA => Some(OpCode::Pong),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Close, Ping, Pong 为控制帧
    pub fn is_control(&self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }
}

/// 首字节是否为可识别的帧头, 即fin为0或1且opcode合法
pub fn is_frame_leading_byte(byte: u8) -> bool {
    matches!(
        byte,
        0b0000_0000
            | 0b0000_0001
            | 0b0000_0010
            | 0b0000_1000
            | 0b0000_1001
            | 0b0000_1010
            | 0b1000_0000
            | 0b1000_0001
            | 0b1000_0010
            | 0b1000_1000
            | 0b1000_1001
            | 0b1000_1010
    )
}
