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
// Created Date: 2026/10/12 10:21:37

use std::{fmt::Display, io};

pub type WsResult<T> = Result<T, WsError>;

/// 协议层面的解析错误, 一旦出现该连接不可再继续解析
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WsErrno {
    /// 请求行不是 `GET / HTTP/`
    InvalidMethodFormat,
    /// 请求行或头部行的换行不是CRLF
    InvalidLinebreak,
    /// 只支持HTTP/1.x
    InvalidHttpVersion,
    /// 必需头部的值不合法或缺失
    InvalidHttpHeader,
    InvalidUnknownOpcode,
    /// 负载长度声明为0
    InvalidPayloadZero,
    /// 头部的key或value超出限制大小
    HeaderTooLarge,
    /// 负载长度超出配置限制
    PayloadTooLarge,
    /// 首字节既不是握手也不是合法的帧头
    InvalidLeadingByte,
}

impl WsErrno {
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            WsErrno::InvalidMethodFormat
                | WsErrno::InvalidLinebreak
                | WsErrno::InvalidHttpVersion
                | WsErrno::InvalidHttpHeader
                | WsErrno::HeaderTooLarge
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WsErrno::InvalidMethodFormat => "invalid method format",
            WsErrno::InvalidLinebreak => "invalid linebreak",
            WsErrno::InvalidHttpVersion => "invalid http version",
            WsErrno::InvalidHttpHeader => "invalid http header",
            WsErrno::InvalidUnknownOpcode => "unknown opcode",
            WsErrno::InvalidPayloadZero => "zero payload length",
            WsErrno::HeaderTooLarge => "header too large",
            WsErrno::PayloadTooLarge => "payload too large",
            WsErrno::InvalidLeadingByte => "invalid leading byte",
        }
    }
}

impl Display for WsErrno {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum WsError {
    /// 标准错误库的错误类型
    IoError(io::Error),
    /// 解析失败, consumed为出错前已解析的字节数
    Parse { errno: WsErrno, consumed: usize },
    /// 已完成的消息又收到了新的数据
    AlreadyCompleted(usize),
    /// 消息未解析完成时收到了结束信号
    UnexpectedEof,
    /// 配置文件错误
    Config(String),
    /// 其它错误信息
    Extension(&'static str),
}

impl WsError {
    pub(crate) fn parse(errno: WsErrno, consumed: usize) -> Self {
        WsError::Parse { errno, consumed }
    }

    pub fn errno(&self) -> Option<WsErrno> {
        match self {
            WsError::Parse { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, WsError::Parse { .. })
    }
}

impl Display for WsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WsError::IoError(e) => f.write_fmt(format_args!("io error {}", e)),
            WsError::Parse { errno, consumed } => {
                f.write_fmt(format_args!("parse error {} after {} bytes", errno, consumed))
            }
            WsError::AlreadyCompleted(len) => f.write_fmt(format_args!(
                "append data(len={}) to already-completed message",
                len
            )),
            WsError::UnexpectedEof => f.write_str("unexpected eof"),
            WsError::Config(s) => f.write_fmt(format_args!("config {}", s)),
            WsError::Extension(s) => f.write_fmt(format_args!("extension {}", s)),
        }
    }
}

impl std::error::Error for WsError {}

impl From<io::Error> for WsError {
    fn from(value: io::Error) -> Self {
        WsError::IoError(value)
    }
}

impl From<toml::de::Error> for WsError {
    fn from(value: toml::de::Error) -> Self {
        WsError::Config(value.to_string())
    }
}
