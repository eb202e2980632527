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
// Created Date: 2026/10/14 09:36:52

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{parser::WsPkgType, FrameDetect, WsConfig, WsError, WsFrame, WsHandshake, WsMessage};

/// 写出的数据
#[derive(Debug, Clone)]
pub enum WsOutbound {
    /// 根据Sec-WebSocket-Key生成101响应
    Handshake(Bytes),
    Frame(WsFrame),
}

/// 连接上的解析上下文, 未完成的消息会保留到下次数据到来
#[derive(Debug, Default)]
pub struct WsCodec {
    config: WsConfig,
    current: Option<WsMessage>,
    handshaked: bool,
}

impl WsCodec {
    pub fn new(config: WsConfig) -> Self {
        WsCodec {
            config,
            current: None,
            handshaked: false,
        }
    }

    pub fn config(&self) -> &WsConfig {
        &self.config
    }

    pub fn is_handshaked(&self) -> bool {
        self.handshaked
    }

    /// 是否有未完成的消息
    pub fn is_pending(&self) -> bool {
        self.current.as_ref().map(|m| m.is_pending()).unwrap_or(false)
    }

    fn expect(&self) -> Option<WsPkgType> {
        match self.config.detect {
            FrameDetect::Heuristic => None,
            FrameDetect::Stage if self.handshaked => Some(WsPkgType::Data),
            FrameDetect::Stage => Some(WsPkgType::Handshake),
        }
    }
}

impl Decoder for WsCodec {
    type Item = WsMessage;
    type Error = WsError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let span = tracing::trace_span!("WsCodec::decode", offset = src.len());
        let _e = span.enter();

        let expect = self.expect();
        let config = &self.config;
        let msg = self
            .current
            .get_or_insert_with(|| WsMessage::with_expect(config.clone(), expect));
        let rc = msg.parse_from_array(&src[..])?;
        src.advance(rc);
        if !msg.completed() {
            return Ok(None);
        }

        let msg = match self.current.take() {
            Some(msg) => msg,
            None => return Ok(None),
        };
        if msg.pkg_type() == WsPkgType::Handshake {
            self.handshaked = true;
        }
        tracing::trace!(pkg_type = ?msg.pkg_type(), parsed = msg.parsed_length(), "decoded");
        Ok(Some(msg))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(msg) = self.decode(buf)? {
            return Ok(Some(msg));
        }
        if let Some(msg) = self.current.as_mut() {
            msg.parse_from_array(&[])?;
        }
        self.current = None;
        Ok(None)
    }
}

impl Encoder<WsOutbound> for WsCodec {
    type Error = WsError;

    fn encode(&mut self, item: WsOutbound, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            WsOutbound::Handshake(key) => {
                log::trace!("Websocket:发送握手响应 key = {}", String::from_utf8_lossy(&key));
                dst.extend_from_slice(&WsHandshake::build_response(&key));
            }
            WsOutbound::Frame(frame) => {
                log::trace!("Websocket:发送帧数据: {:?}", frame);
                frame.encode(dst);
            }
        }
        Ok(())
    }
}

impl Encoder<WsFrame> for WsCodec {
    type Error = WsError;

    fn encode(&mut self, item: WsFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode(dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OpCode, WsErrno};

    const REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: a\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Version: 13\r\n\r\n";

    #[test]
    fn handshake_then_frame_in_one_buffer() {
        let mut codec = WsCodec::default();
        let mut src = BytesMut::from(REQUEST);
        src.extend_from_slice(b"\x81\x02hi\x82");

        let msg = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(msg.pkg_type(), WsPkgType::Handshake);
        assert!(codec.is_handshaked());

        let msg = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(msg.opcode(), Some(OpCode::Text));
        assert_eq!(msg.body(), b"hi");

        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(src.is_empty());
        assert!(codec.is_pending());
        src.extend_from_slice(b"\x01z");
        let msg = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(msg.opcode(), Some(OpCode::Binary));
        assert_eq!(msg.body(), b"z");
    }

    #[test]
    fn eof_with_partial_frame() {
        let mut codec = WsCodec::default();
        let mut src = BytesMut::from(&b"\x81\x05he"[..]);
        assert!(codec.decode(&mut src).unwrap().is_none());
        assert!(matches!(codec.decode_eof(&mut src), Err(WsError::UnexpectedEof)));
    }

    #[test]
    fn stage_detect_rejects_frame_before_handshake() {
        let mut codec = WsCodec::new(WsConfig::default().detect(FrameDetect::Stage));
        let mut src = BytesMut::from(&b"\x81\x01a"[..]);
        let err = codec.decode(&mut src).unwrap_err();
        assert_eq!(err.errno(), Some(WsErrno::InvalidMethodFormat));
    }

    #[test]
    fn encode_outbound() {
        let mut codec = WsCodec::default();
        let mut dst = BytesMut::new();
        codec
            .encode(WsOutbound::Frame(WsFrame::text("ok")), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"\x81\x02ok");
        dst.clear();
        codec
            .encode(WsOutbound::Handshake(Bytes::from_static(b"dGhlIHNhbXBsZSBub25jZQ==")), &mut dst)
            .unwrap();
        assert!(dst.starts_with(b"HTTP/1.1 101 Switching Protocols\r\n"));
    }
}
