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
// Created Date: 2026/10/13 11:30:08

use bytes::{Bytes, BytesMut};

use crate::{
    parser::{
        is_frame_leading_byte, DataParser, FrameEvent, HandshakeEvent, HandshakeHeaders,
        HandshakeParser, OpCode, WsPkgType,
    },
    MessageAssembler, WsConfig, WsErrno, WsError, WsHandshake, WsResult,
};

/// 解析阶段, 在收到第一段数据时确定, 之后不再改变
#[derive(Debug)]
enum WsPhase {
    NotStarted,
    Handshaking(HandshakeParser),
    Framing(DataParser),
}

/// 一个连接上的一次握手或一个数据帧
///
/// 字节可以以任意的分段方式送入, 每次调用只处理新的字节. 解析完成后
/// 该消息不可再送入数据, 由调用方取走并丢弃.
#[derive(Debug)]
pub struct WsMessage {
    config: WsConfig,
    /// 指定首段数据的类型, None时根据首字节判断
    expect: Option<WsPkgType>,
    phase: WsPhase,
    /// 首字节无法识别时的错误
    leading_errno: Option<WsErrno>,
    pkg_type: WsPkgType,
    headers: HandshakeHeaders,
    assembler: MessageAssembler,
    parsed_length: usize,
}

impl Default for WsMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl WsMessage {
    pub fn new() -> Self {
        Self::with_config(WsConfig::default())
    }

    pub fn with_config(config: WsConfig) -> Self {
        Self::with_expect(config, None)
    }

    pub fn with_expect(config: WsConfig, expect: Option<WsPkgType>) -> Self {
        WsMessage {
            config,
            expect,
            phase: WsPhase::NotStarted,
            leading_errno: None,
            pkg_type: WsPkgType::Unknown,
            headers: HandshakeHeaders::new(),
            assembler: MessageAssembler::new(),
            parsed_length: 0,
        }
    }

    /// 数据帧在负载全部读取后完成.
    /// 握手需要读到头部结束的空行, 且五个必需的头部均已校验通过才算完成,
    /// 只收齐五个头部而未读到空行时仍返回false, 剩余的CRLF由同一个消息继续解析
    pub fn completed(&self) -> bool {
        match (&self.phase, self.pkg_type) {
            (WsPhase::Framing(parser), WsPkgType::Data) => parser.is_finished(),
            (WsPhase::Handshaking(parser), WsPkgType::Handshake) => {
                parser.errno().is_none() && parser.is_done() && self.headers.is_all_checked()
            }
            _ => false,
        }
    }

    pub fn pkg_type(&self) -> WsPkgType {
        self.pkg_type
    }

    pub fn errno(&self) -> Option<WsErrno> {
        match &self.phase {
            WsPhase::NotStarted => self.leading_errno,
            WsPhase::Handshaking(parser) => parser.errno(),
            WsPhase::Framing(parser) => parser.errno(),
        }
    }

    fn data_parser(&self) -> Option<&DataParser> {
        match &self.phase {
            WsPhase::Framing(parser) => Some(parser),
            _ => None,
        }
    }

    pub fn fin(&self) -> bool {
        self.data_parser().map(|p| p.fin()).unwrap_or(false)
    }

    pub fn opcode(&self) -> Option<OpCode> {
        self.data_parser().and_then(|p| p.opcode())
    }

    pub fn payload_length(&self) -> u64 {
        self.data_parser().map(|p| p.payload_length()).unwrap_or(0)
    }

    pub fn mask_key(&self) -> &[u8] {
        self.assembler.mask_key()
    }

    pub fn body(&self) -> &[u8] {
        self.assembler.body()
    }

    pub fn into_body(mut self) -> Bytes {
        self.assembler.take_body().freeze()
    }

    pub fn take_body(&mut self) -> BytesMut {
        self.assembler.take_body()
    }

    /// 头部值按收到的原始字节保存
    pub fn ws_key(&self) -> &[u8] {
        self.headers.ws_key()
    }

    pub fn ws_protocol(&self) -> &[u8] {
        self.headers.ws_protocol()
    }

    pub fn ws_extensions(&self) -> &[u8] {
        self.headers.ws_extensions()
    }

    /// 非utf8时返回None
    pub fn ws_key_str(&self) -> Option<&str> {
        std::str::from_utf8(self.ws_key()).ok()
    }

    pub fn ws_protocol_str(&self) -> Option<&str> {
        std::str::from_utf8(self.ws_protocol()).ok()
    }

    pub fn ws_extensions_str(&self) -> Option<&str> {
        std::str::from_utf8(self.ws_extensions()).ok()
    }

    pub fn http_version(&self) -> Option<(u8, u8)> {
        match &self.phase {
            WsPhase::Handshaking(parser) if self.pkg_type == WsPkgType::Handshake => {
                Some(parser.http_version())
            }
            _ => None,
        }
    }

    /// 已成功解析的字节总数
    pub fn parsed_length(&self) -> usize {
        self.parsed_length
    }

    /// 是否已收到部分数据但还未完成
    pub fn is_pending(&self) -> bool {
        match &self.phase {
            WsPhase::NotStarted => false,
            WsPhase::Handshaking(parser) => parser.is_started() && !self.completed(),
            WsPhase::Framing(parser) => parser.is_started() && !self.completed(),
        }
    }

    pub fn make_handshake_resp(&self) -> WsResult<Bytes> {
        if self.pkg_type != WsPkgType::Handshake || !self.completed() {
            return Err(WsError::Extension("handshake not completed"));
        }
        Ok(WsHandshake::build_response(self.headers.ws_key()))
    }

    /// 解析一段数据, 长度为0表示连接结束. 返回本次解析的字节数
    pub fn parse_from_array(&mut self, data: &[u8]) -> WsResult<usize> {
        if self.completed() {
            if data.is_empty() {
                return Ok(0);
            }
            log::error!("Append data(len={}) to already-completed message", data.len());
            return Err(WsError::AlreadyCompleted(data.len()));
        }

        let n = match self.execute(data) {
            Ok(n) => n,
            Err(e) => {
                log::debug!(
                    "Fail to parse ws message, buf=`{}`, error {}",
                    String::from_utf8_lossy(data).escape_debug(),
                    e
                );
                return Err(e);
            }
        };
        self.parsed_length += n;
        Ok(n)
    }

    /// 按顺序解析多段数据, 忽略空段, 完成后不再继续读取后续的段
    pub fn parse_from_chunks<'a, I>(&mut self, chunks: I) -> WsResult<usize>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut chunks = chunks.into_iter().filter(|c| !c.is_empty()).peekable();
        if self.completed() {
            return match chunks.peek() {
                None => Ok(0),
                Some(c) => Err(WsError::AlreadyCompleted(c.len())),
            };
        }

        let mut nprocessed = 0;
        for chunk in chunks {
            let n = match self.execute(chunk) {
                Ok(n) => n,
                Err(WsError::Parse { errno, consumed }) => {
                    log::debug!("Fail to parse ws message, errno {}", errno);
                    return Err(WsError::parse(errno, nprocessed + consumed));
                }
                Err(e) => return Err(e),
            };
            nprocessed += n;
            if self.completed() || n < chunk.len() {
                break;
            }
        }
        self.parsed_length += nprocessed;
        Ok(nprocessed)
    }

    fn execute(&mut self, data: &[u8]) -> WsResult<usize> {
        if let Some(errno) = self.errno() {
            return Err(WsError::parse(errno, 0));
        }

        if data.is_empty() {
            if self.is_pending() {
                return Err(WsError::UnexpectedEof);
            }
            return Ok(0);
        }

        if let WsPhase::NotStarted = self.phase {
            self.phase = match self.detect(data[0]) {
                Some(WsPkgType::Handshake) => {
                    WsPhase::Handshaking(HandshakeParser::new(self.config.max_header_size))
                }
                Some(_) => WsPhase::Framing(DataParser::new(self.config.max_payload_size)),
                None => {
                    self.leading_errno = Some(WsErrno::InvalidLeadingByte);
                    return Err(WsError::parse(WsErrno::InvalidLeadingByte, 0));
                }
            };
        }

        match &mut self.phase {
            WsPhase::Handshaking(parser) => {
                Self::execute_handshake(parser, &mut self.headers, &mut self.pkg_type, data)
            }
            WsPhase::Framing(parser) => {
                Self::execute_data(parser, &mut self.assembler, &mut self.pkg_type, data)
            }
            WsPhase::NotStarted => Ok(0),
        }
    }

    fn detect(&self, first: u8) -> Option<WsPkgType> {
        match self.expect {
            Some(WsPkgType::Unknown) | None => {
                if first == b'G' {
                    Some(WsPkgType::Handshake)
                } else if is_frame_leading_byte(first) {
                    Some(WsPkgType::Data)
                } else {
                    None
                }
            }
            expect => expect,
        }
    }

    fn execute_handshake(
        parser: &mut HandshakeParser,
        headers: &mut HandshakeHeaders,
        pkg_type: &mut WsPkgType,
        data: &[u8],
    ) -> WsResult<usize> {
        for (pos, ch) in data.iter().enumerate() {
            let event = parser.step(*ch).map_err(|e| WsError::parse(e, pos))?;
            match event {
                Some(HandshakeEvent::RequestLine { .. }) => {
                    *pkg_type = WsPkgType::Handshake;
                }
                Some(HandshakeEvent::Header { key, value }) => {
                    if !headers.on_header_end(&key, value.clone()) {
                        log::trace!(
                            "invalid handshake header {}: {}",
                            String::from_utf8_lossy(&key),
                            String::from_utf8_lossy(&value)
                        );
                        let errno = parser.fail(WsErrno::InvalidHttpHeader);
                        return Err(WsError::parse(errno, pos));
                    }
                }
                Some(HandshakeEvent::HeadersEnd) => {
                    if !headers.is_all_checked() {
                        log::trace!("missing handshake header, checker {:#07b}", headers.checker());
                        let errno = parser.fail(WsErrno::InvalidHttpHeader);
                        return Err(WsError::parse(errno, pos));
                    }
                    return Ok(pos + 1);
                }
                None => {}
            }
        }
        Ok(data.len())
    }

    fn execute_data(
        parser: &mut DataParser,
        assembler: &mut MessageAssembler,
        pkg_type: &mut WsPkgType,
        data: &[u8],
    ) -> WsResult<usize> {
        let mut pos = 0;
        while pos < data.len() {
            if parser.in_payload() {
                *pkg_type = WsPkgType::Data;
                return Ok(pos + assembler.on_body(parser, &data[pos..]));
            }
            match parser.step(data[pos]).map_err(|e| WsError::parse(e, pos))? {
                Some(FrameEvent::MaskKey(b)) => assembler.on_set_mask_key(b),
                Some(FrameEvent::Opcode(_)) | Some(FrameEvent::PayloadStart) | None => {}
            }
            pos += 1;
        }
        if parser.in_payload() {
            *pkg_type = WsPkgType::Data;
        }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: server.example.com\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\nSec-WebSocket-Protocol: chat\r\nSec-WebSocket-Version: 13\r\nSec-WebSocket-Extensions: permessage-deflate\r\n\r\n";

    #[test]
    fn handshake_whole() {
        let mut msg = WsMessage::new();
        assert_eq!(msg.parse_from_array(REQUEST).unwrap(), REQUEST.len());
        assert!(msg.completed());
        assert_eq!(msg.pkg_type(), WsPkgType::Handshake);
        assert_eq!(msg.ws_key(), b"dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(msg.ws_protocol_str(), Some("chat"));
        assert_eq!(msg.ws_extensions(), b"permessage-deflate");
        assert_eq!(msg.http_version(), Some((1, 1)));
        assert_eq!(msg.parsed_length(), REQUEST.len());
        let resp = msg.make_handshake_resp().unwrap();
        assert!(resp.ends_with(b"Sec-WebSocket-Accept:s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n"));
    }

    #[test]
    fn handshake_leaves_trailing_bytes() {
        let mut data = REQUEST.to_vec();
        data.extend_from_slice(&[0x81, 0x01, b'a']);
        let mut msg = WsMessage::new();
        assert_eq!(msg.parse_from_array(&data).unwrap(), REQUEST.len());
        assert!(msg.completed());
        assert!(matches!(
            msg.parse_from_array(&data[REQUEST.len()..]),
            Err(WsError::AlreadyCompleted(3))
        ));
        assert_eq!(msg.parse_from_array(&[]).unwrap(), 0);
    }

    #[test]
    fn missing_header() {
        let mut msg = WsMessage::new();
        let err = msg
            .parse_from_array(b"GET / HTTP/1.1\r\nHost: a\r\nUpgrade: websocket\r\n\r\n")
            .unwrap_err();
        assert_eq!(err.errno(), Some(WsErrno::InvalidHttpHeader));
        assert!(!msg.completed());
        // 失败后不再接受任何数据
        assert_eq!(msg.parse_from_array(b"x").unwrap_err().errno(), Some(WsErrno::InvalidHttpHeader));
    }

    #[test]
    fn invalid_header_value_position() {
        let data = b"GET / HTTP/1.1\r\nUpgrade: h2c\r\n";
        let mut msg = WsMessage::new();
        match msg.parse_from_array(data) {
            Err(WsError::Parse { errno, consumed }) => {
                assert_eq!(errno, WsErrno::InvalidHttpHeader);
                assert_eq!(consumed, data.len() - 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn text_frame() {
        let mut msg = WsMessage::new();
        assert_eq!(msg.parse_from_array(b"\x81\x05hello").unwrap(), 7);
        assert!(msg.completed());
        assert_eq!(msg.pkg_type(), WsPkgType::Data);
        assert!(msg.fin());
        assert_eq!(msg.opcode(), Some(OpCode::Text));
        assert_eq!(msg.payload_length(), 5);
        assert!(msg.mask_key().is_empty());
        assert_eq!(msg.body(), b"hello");
        assert_eq!(msg.into_body(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn frame_stops_at_payload_end() {
        let mut msg = WsMessage::new();
        assert_eq!(msg.parse_from_array(b"\x82\x02abc").unwrap(), 4);
        assert_eq!(msg.body(), b"ab");
    }

    #[test]
    fn leading_byte_rejected() {
        let mut msg = WsMessage::new();
        assert_eq!(
            msg.parse_from_array(b"\x83\x01a").unwrap_err().errno(),
            Some(WsErrno::InvalidLeadingByte)
        );
        let mut msg = WsMessage::with_expect(WsConfig::default(), Some(WsPkgType::Data));
        assert_eq!(
            msg.parse_from_array(b"\x83\x01a").unwrap_err().errno(),
            Some(WsErrno::InvalidUnknownOpcode)
        );
    }

    #[test]
    fn expect_handshake_skips_whitespace() {
        let mut data = b"\r\n ".to_vec();
        data.extend_from_slice(REQUEST);
        let mut msg = WsMessage::with_expect(WsConfig::default(), Some(WsPkgType::Handshake));
        assert_eq!(msg.parse_from_array(&data).unwrap(), data.len());
        assert!(msg.completed());
    }

    #[test]
    fn eof_semantics() {
        let mut msg = WsMessage::new();
        assert_eq!(msg.parse_from_array(&[]).unwrap(), 0);
        msg.parse_from_array(b"\x81").unwrap();
        assert!(matches!(msg.parse_from_array(&[]), Err(WsError::UnexpectedEof)));
    }

    #[test]
    fn chunks() {
        let mut msg = WsMessage::new();
        let chunks: [&[u8]; 6] = [
            b"",
            b"\x81\x85",
            b"",
            b"\x01\x02",
            b"\x03\x04\x00\x00\x00\x00\x00",
            b"more",
        ];
        assert_eq!(msg.parse_from_chunks(chunks).unwrap(), 11);
        assert!(msg.completed());
        assert_eq!(msg.body(), &[1, 2, 3, 4, 1]);
        assert_eq!(msg.mask_key(), &[1, 2, 3, 4]);
        assert_eq!(msg.parsed_length(), 11);
    }
}
