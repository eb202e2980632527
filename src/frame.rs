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
// Created Date: 2026/10/13 15:48:33

use bytes::{BufMut, Bytes, BytesMut};

use crate::{parser::OpCode, Consts};

/// 待发送的数据帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsFrame {
    pub fin: bool,
    pub opcode: OpCode,
    /// 默认不加掩码
    pub mask_key: Option<[u8; 4]>,
    pub payload: Bytes,
}

impl WsFrame {
    pub fn new<B: Into<Bytes>>(fin: bool, opcode: OpCode, payload: B) -> Self {
        Self {
            fin,
            opcode,
            mask_key: None,
            payload: payload.into(),
        }
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        let text: String = text.into();
        Self::new(true, OpCode::Text, text)
    }

    pub fn binary<B: Into<Bytes>>(data: B) -> Self {
        Self::new(true, OpCode::Binary, data)
    }

    pub fn close<B: Into<Bytes>>(data: B) -> Self {
        Self::new(true, OpCode::Close, data)
    }

    pub fn ping<B: Into<Bytes>>(data: B) -> Self {
        Self::new(true, OpCode::Ping, data)
    }

    pub fn pong<B: Into<Bytes>>(data: B) -> Self {
        Self::new(true, OpCode::Pong, data)
    }

    pub fn with_mask(mut self, mask_key: [u8; 4]) -> Self {
        self.mask_key = Some(mask_key);
        self
    }

    pub fn with_random_mask(self) -> Self {
        self.with_mask(rand::random())
    }

    pub fn encoded_len(&self) -> usize {
        let len = self.payload.len();
        let head = match len {
            0..=125 => 2,
            126..=65535 => 4,
            _ => 10,
        };
        let mask = if self.mask_key.is_some() { 4 } else { 0 };
        head + mask + len
    }

    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Consts::MAX_FRAME_HEAD_SIZE + self.payload.len());
        write_head(dst, self.fin, self.opcode, self.mask_key, self.payload.len());
        match self.mask_key {
            Some(key) => {
                for (i, b) in self.payload.iter().enumerate() {
                    dst.put_u8(b ^ key[i & 3]);
                }
            }
            None => dst.extend_from_slice(&self.payload),
        }
    }
}

fn write_head(dst: &mut BytesMut, fin: bool, opcode: OpCode, mask_key: Option<[u8; 4]>, len: usize) {
    dst.put_u8(((fin as u8) << 7) | opcode.as_u8());
    let mask_bit = if mask_key.is_some() { 0x80 } else { 0 };
    if len < 126 {
        dst.put_u8(mask_bit | len as u8);
    } else if len < 65536 {
        dst.put_u8(mask_bit | 126);
        dst.put_u16(len as u16);
    } else {
        dst.put_u8(mask_bit | 127);
        dst.put_u64(len as u64);
    }
    if let Some(key) = mask_key {
        dst.put_slice(&key);
    }
}

/// 打包一个不带掩码的帧
pub fn pack_ws_msg(dst: &mut BytesMut, fin: bool, opcode: OpCode, payload: &[u8]) {
    dst.reserve(Consts::MAX_FRAME_HEAD_SIZE + payload.len());
    write_head(dst, fin, opcode, None, payload.len());
    dst.extend_from_slice(payload);
}
