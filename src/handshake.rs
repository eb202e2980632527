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
// Created Date: 2026/10/13 10:05:19

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use sha1::{Digest, Sha1};

use crate::Consts;

pub struct WsHandshake;

impl WsHandshake {
    /// base64(sha1(key + GUID)), key按原始字节参与计算
    pub fn build_accept(key: &[u8]) -> String {
        let mut sha1 = Sha1::new();
        sha1.update(key);
        sha1.update(Consts::MAGIC_GUID.as_bytes());
        STANDARD.encode(sha1.finalize())
    }

    /// 101的响应, 不回显子协议及扩展
    pub fn build_response(key: &[u8]) -> Bytes {
        let accept = Self::build_accept(key);
        let mut response = String::with_capacity(128);
        response.push_str("HTTP/1.1 101 Switching Protocols\r\n");
        response.push_str("Upgrade: websocket\r\n");
        response.push_str("Connection: Upgrade\r\n");
        response.push_str("Sec-WebSocket-Accept:");
        response.push_str(&accept);
        response.push_str("\r\n\r\n");
        Bytes::from(response)
    }
}
