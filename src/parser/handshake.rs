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
// Created Date: 2026/10/12 15:44:18

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Consts, WsErrno};

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// 握手解析阶段, 只会向前推进, HeaderKey与HeaderValue每行头部循环一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandshakePhase {
    /// 跳过起始的空白, 等待首字母
    MethodCheck,
    Method,
    HttpMajorVersion,
    HttpVersionDot,
    HttpMinorVersion,
    SegmentFinish1,
    SegmentFinish2,
    HeaderKey,
    HeaderValue,
    /// 收到空行的CR, 等待LF
    HeadersFinish,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeEvent {
    /// 请求行已解析完毕
    RequestLine { major: u8, minor: u8 },
    /// 一行头部读取完毕, 需要由调用方校验
    Header { key: Bytes, value: Bytes },
    /// 头部结束的空行
    HeadersEnd,
}

#[derive(Debug)]
pub struct HandshakeParser {
    phase: HandshakePhase,
    /// 当前匹配到的请求行前缀位置
    index: usize,
    http_major: u8,
    http_minor: u8,
    errno: Option<WsErrno>,
    cur_key: BytesMut,
    cur_value: BytesMut,
    max_header_size: usize,
}

impl HandshakeParser {
    pub fn new(max_header_size: usize) -> Self {
        Self {
            phase: HandshakePhase::MethodCheck,
            index: 0,
            http_major: 0,
            http_minor: 0,
            errno: None,
            cur_key: BytesMut::new(),
            cur_value: BytesMut::new(),
            max_header_size,
        }
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    pub fn errno(&self) -> Option<WsErrno> {
        self.errno
    }

    pub fn http_version(&self) -> (u8, u8) {
        (self.http_major, self.http_minor)
    }

    pub fn is_done(&self) -> bool {
        self.phase == HandshakePhase::Done
    }

    pub fn is_started(&self) -> bool {
        self.phase != HandshakePhase::MethodCheck
    }

    /// 标记失败, 此后所有的调用都将返回该错误
    pub fn fail(&mut self, errno: WsErrno) -> WsErrno {
        self.errno = Some(errno);
        errno
    }

    fn append(buf: &mut BytesMut, ch: u8, max: usize) -> Result<(), WsErrno> {
        if buf.len() >= max {
            return Err(WsErrno::HeaderTooLarge);
        }
        buf.put_u8(ch);
        Ok(())
    }

    /// 推进一个字节
    pub fn step(&mut self, ch: u8) -> Result<Option<HandshakeEvent>, WsErrno> {
        if let Some(errno) = self.errno {
            return Err(errno);
        }

        match self.phase {
            HandshakePhase::MethodCheck => {
                if ch == CR || ch == LF || ch == b' ' {
                    return Ok(None);
                }
                if ch != Consts::METHOD_FIELD[0] {
                    return Err(self.fail(WsErrno::InvalidMethodFormat));
                }
                self.index = 1;
                self.phase = HandshakePhase::Method;
            }
            HandshakePhase::Method => {
                if Consts::METHOD_FIELD[self.index] != ch {
                    return Err(self.fail(WsErrno::InvalidMethodFormat));
                }
                self.index += 1;
                if self.index == Consts::METHOD_FIELD.len() {
                    self.index = 0;
                    self.phase = HandshakePhase::HttpMajorVersion;
                }
            }
            HandshakePhase::HttpMajorVersion => {
                self.http_major = ch.wrapping_sub(b'0');
                if self.http_major != 1 {
                    return Err(self.fail(WsErrno::InvalidHttpVersion));
                }
                self.phase = HandshakePhase::HttpVersionDot;
            }
            HandshakePhase::HttpVersionDot => {
                if ch != b'.' {
                    return Err(self.fail(WsErrno::InvalidMethodFormat));
                }
                self.phase = HandshakePhase::HttpMinorVersion;
            }
            HandshakePhase::HttpMinorVersion => {
                if !ch.is_ascii_digit() {
                    return Err(self.fail(WsErrno::InvalidHttpVersion));
                }
                self.http_minor = ch - b'0';
                self.phase = HandshakePhase::SegmentFinish1;
                return Ok(Some(HandshakeEvent::RequestLine {
                    major: self.http_major,
                    minor: self.http_minor,
                }));
            }
            HandshakePhase::SegmentFinish1 => {
                if ch != CR {
                    return Err(self.fail(WsErrno::InvalidLinebreak));
                }
                self.phase = HandshakePhase::SegmentFinish2;
            }
            HandshakePhase::SegmentFinish2 => {
                if ch != LF {
                    return Err(self.fail(WsErrno::InvalidLinebreak));
                }
                self.phase = HandshakePhase::HeaderKey;
            }
            HandshakePhase::HeaderKey => match ch {
                b':' => self.phase = HandshakePhase::HeaderValue,
                CR if self.cur_key.is_empty() => self.phase = HandshakePhase::HeadersFinish,
                CR | LF => return Err(self.fail(WsErrno::InvalidHttpHeader)),
                _ => {
                    if let Err(e) = Self::append(&mut self.cur_key, ch, self.max_header_size) {
                        return Err(self.fail(e));
                    }
                }
            },
            HandshakePhase::HeaderValue => {
                if ch == b' ' && self.cur_value.is_empty() {
                    return Ok(None);
                }
                if ch == CR {
                    self.phase = HandshakePhase::SegmentFinish2;
                    return Ok(Some(HandshakeEvent::Header {
                        key: self.cur_key.split().freeze(),
                        value: self.cur_value.split().freeze(),
                    }));
                }
                if let Err(e) = Self::append(&mut self.cur_value, ch, self.max_header_size) {
                    return Err(self.fail(e));
                }
            }
            HandshakePhase::HeadersFinish => {
                if ch != LF {
                    return Err(self.fail(WsErrno::InvalidLinebreak));
                }
                self.phase = HandshakePhase::Done;
                return Ok(Some(HandshakeEvent::HeadersEnd));
            }
            HandshakePhase::Done => {}
        }
        Ok(None)
    }
}

/// 已校验的握手头部信息
#[derive(Debug, Default, Clone)]
pub struct HandshakeHeaders {
    /// 0~4位依次为: Host,Upgrade,Connection,Sec-WebSocket-Key,Sec-WebSocket-Version
    checker: u8,
    ws_key: Bytes,
    ws_protocol: Bytes,
    ws_extensions: Bytes,
}

impl HandshakeHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checker(&self) -> u8 {
        self.checker
    }

    pub fn is_all_checked(&self) -> bool {
        self.checker & Consts::HEADER_ALL == Consts::HEADER_ALL
    }

    /// 客户端发送的原始key, 不做编码转换
    pub fn ws_key(&self) -> &[u8] {
        &self.ws_key
    }

    pub fn ws_protocol(&self) -> &[u8] {
        &self.ws_protocol
    }

    pub fn ws_extensions(&self) -> &[u8] {
        &self.ws_extensions
    }

    fn mark(&mut self, ok: bool, bit: u8) -> bool {
        if ok {
            self.checker |= bit;
        }
        ok
    }

    /// 校验一行完整的头部, 头部名大小写敏感, 返回false表示头部非法
    pub fn on_header_end(&mut self, key: &[u8], value: Bytes) -> bool {
        if key == Consts::HOST_HEADER {
            self.mark(!value.is_empty(), Consts::HEADER_HOST)
        } else if key == Consts::UPGRADE_HEADER {
            self.mark(&value[..] == Consts::UPGRADE_HEADER_VALUE, Consts::HEADER_UPGRADE)
        } else if key == Consts::CONNECTION_HEADER {
            self.mark(&value[..] == Consts::CONNECTION_HEADER_VALUE, Consts::HEADER_CONNECTION)
        } else if key == Consts::WS_KEY_HEADER {
            let ok = !value.is_empty();
            if ok {
                self.ws_key = value;
            }
            self.mark(ok, Consts::HEADER_WS_KEY)
        } else if key == Consts::WS_VERSION_HEADER {
            self.mark(&value[..] == Consts::WS_VERSION_HEADER_VALUE, Consts::HEADER_WS_VERSION)
        } else {
            if key == Consts::WS_PROTOCOL_HEADER && !value.is_empty() {
                self.ws_protocol = value;
            } else if key == Consts::WS_EXTEND_HEADER && !value.is_empty() {
                self.ws_extensions = value;
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(parser: &mut HandshakeParser, data: &[u8]) -> Result<Vec<HandshakeEvent>, WsErrno> {
        let mut events = vec![];
        for ch in data {
            if let Some(e) = parser.step(*ch)? {
                events.push(e);
            }
        }
        Ok(events)
    }

    #[test]
    fn request_line_and_headers() {
        let mut parser = HandshakeParser::new(4096);
        let events = run(&mut parser, b"\r\n GET / HTTP/1.1\r\nHost:  a b\r\n\r\n").unwrap();
        assert_eq!(
            events,
            vec![
                HandshakeEvent::RequestLine { major: 1, minor: 1 },
                HandshakeEvent::Header {
                    key: Bytes::from_static(b"Host"),
                    value: Bytes::from_static(b"a b"),
                },
                HandshakeEvent::HeadersEnd,
            ]
        );
        assert!(parser.is_done());
        assert_eq!(parser.http_version(), (1, 1));
    }

    #[test]
    fn bad_method() {
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"POST"), Err(WsErrno::InvalidMethodFormat));
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET /chat"), Err(WsErrno::InvalidMethodFormat));
        // 错误是粘性的
        assert_eq!(parser.step(b'G'), Err(WsErrno::InvalidMethodFormat));
    }

    #[test]
    fn bad_version() {
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET / HTTP/2.0"), Err(WsErrno::InvalidHttpVersion));
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET / HTTP/1,1"), Err(WsErrno::InvalidMethodFormat));
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET / HTTP/1.x"), Err(WsErrno::InvalidHttpVersion));
    }

    #[test]
    fn bad_linebreak() {
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET / HTTP/1.1\n"), Err(WsErrno::InvalidLinebreak));
        let mut parser = HandshakeParser::new(4096);
        assert_eq!(run(&mut parser, b"GET / HTTP/1.1\r\r"), Err(WsErrno::InvalidLinebreak));
    }

    #[test]
    fn header_overflow() {
        let mut parser = HandshakeParser::new(8);
        assert_eq!(
            run(&mut parser, b"GET / HTTP/1.1\r\nHost:123456789"),
            Err(WsErrno::HeaderTooLarge)
        );
        let mut parser = HandshakeParser::new(8);
        assert!(run(&mut parser, b"GET / HTTP/1.1\r\nHost:12345678\r\n").is_ok());
    }

    #[test]
    fn headers_check() {
        let mut headers = HandshakeHeaders::new();
        assert!(headers.on_header_end(b"Host", Bytes::from_static(b"localhost")));
        assert!(headers.on_header_end(b"Upgrade", Bytes::from_static(b"websocket")));
        assert!(!headers.on_header_end(b"Connection", Bytes::from_static(b"keep-alive, Upgrade")));
        assert!(headers.on_header_end(b"Connection", Bytes::from_static(b"Upgrade")));
        assert!(!headers.on_header_end(b"Sec-WebSocket-Key", Bytes::from_static(b"")));
        assert!(headers.on_header_end(b"Sec-WebSocket-Key", Bytes::from_static(b"abc")));
        assert!(!headers.is_all_checked());
        assert!(!headers.on_header_end(b"Sec-WebSocket-Version", Bytes::from_static(b"8")));
        assert!(headers.on_header_end(b"Sec-WebSocket-Version", Bytes::from_static(b"13")));
        assert!(headers.on_header_end(b"Sec-WebSocket-Protocol", Bytes::from_static(b"chat")));
        assert!(headers.on_header_end(b"upgrade", Bytes::from_static(b"anything")));
        assert!(headers.is_all_checked());
        assert_eq!(headers.ws_key(), b"abc");
        assert_eq!(headers.ws_protocol(), b"chat");
        assert!(headers.ws_extensions().is_empty());
    }
}
