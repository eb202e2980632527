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
// Created Date: 2026/10/12 16:27:50

use crate::WsErrno;

use super::OpCode;

/// 负载长度的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadType {
    /// 小于126, 长度直接存在第二个字节中
    #[default]
    Immediate,
    /// 等于126, 后续2字节大端长度
    Extended16,
    /// 等于127, 后续8字节大端长度
    Extended64,
}

impl PayloadType {
    pub fn length_bytes(&self) -> u8 {
        match self {
            PayloadType::Immediate => 0,
            PayloadType::Extended16 => 2,
            PayloadType::Extended64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPhase {
    Start,
    FinDone,
    /// 正在读取扩展长度的第N个字节, 0~7
    PayloadLength(u8),
    /// 正在读取掩码的第N个字节, 1~4
    MaskKey(u8),
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Opcode(OpCode),
    MaskKey(u8),
    /// 帧头已解析完毕, 之后的字节均为负载
    PayloadStart,
}

#[derive(Debug)]
pub struct DataParser {
    phase: DataPhase,
    fin: bool,
    opcode: Option<OpCode>,
    mask: bool,
    payload_type: PayloadType,
    payload_length: u64,
    readed_length: u64,
    errno: Option<WsErrno>,
    max_payload_size: Option<u64>,
}

impl DataParser {
    pub fn new(max_payload_size: Option<u64>) -> Self {
        Self {
            phase: DataPhase::Start,
            fin: false,
            opcode: None,
            mask: false,
            payload_type: PayloadType::Immediate,
            payload_length: 0,
            readed_length: 0,
            errno: None,
            max_payload_size,
        }
    }

    pub fn phase(&self) -> DataPhase {
        self.phase
    }

    pub fn fin(&self) -> bool {
        self.fin
    }

    pub fn opcode(&self) -> Option<OpCode> {
        self.opcode
    }

    pub fn mask(&self) -> bool {
        self.mask
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn payload_length(&self) -> u64 {
        self.payload_length
    }

    pub fn readed_length(&self) -> u64 {
        self.readed_length
    }

    pub fn remaining(&self) -> u64 {
        self.payload_length - self.readed_length
    }

    pub fn errno(&self) -> Option<WsErrno> {
        self.errno
    }

    pub fn is_started(&self) -> bool {
        self.phase != DataPhase::Start
    }

    pub fn in_payload(&self) -> bool {
        self.phase == DataPhase::Data
    }

    pub fn is_finished(&self) -> bool {
        self.errno.is_none() && self.in_payload() && self.readed_length == self.payload_length
    }

    pub fn fail(&mut self, errno: WsErrno) -> WsErrno {
        self.errno = Some(errno);
        errno
    }

    /// 记录已交付的负载字节数, 不会超过声明的负载长度
    pub fn advance_payload(&mut self, n: u64) {
        debug_assert!(n <= self.remaining());
        self.readed_length += n.min(self.remaining());
    }

    fn on_length_done(&mut self) -> Result<Option<FrameEvent>, WsErrno> {
        if self.payload_length == 0 {
            return Err(self.fail(WsErrno::InvalidPayloadZero));
        }
        if let Some(max) = self.max_payload_size {
            if self.payload_length > max {
                return Err(self.fail(WsErrno::PayloadTooLarge));
            }
        }
        if self.mask {
            self.phase = DataPhase::MaskKey(1);
            Ok(None)
        } else {
            self.phase = DataPhase::Data;
            Ok(Some(FrameEvent::PayloadStart))
        }
    }

    /// 推进一个帧头字节, 进入负载阶段后由调用方直接读取负载
    pub fn step(&mut self, byte: u8) -> Result<Option<FrameEvent>, WsErrno> {
        if let Some(errno) = self.errno {
            return Err(errno);
        }

        match self.phase {
            DataPhase::Start => {
                self.fin = byte >> 7 == 1;
                let opcode = match OpCode::from_u8(byte & 0x0F) {
                    Some(opcode) => opcode,
                    None => return Err(self.fail(WsErrno::InvalidUnknownOpcode)),
                };
                self.opcode = Some(opcode);
                self.phase = DataPhase::FinDone;
                Ok(Some(FrameEvent::Opcode(opcode)))
            }
            DataPhase::FinDone => {
                self.mask = byte >> 7 == 1;
                let selector = byte & 0x7F;
                match selector {
                    126 => {
                        self.payload_type = PayloadType::Extended16;
                        self.phase = DataPhase::PayloadLength(0);
                        Ok(None)
                    }
                    127 => {
                        self.payload_type = PayloadType::Extended64;
                        self.phase = DataPhase::PayloadLength(0);
                        Ok(None)
                    }
                    _ => {
                        self.payload_type = PayloadType::Immediate;
                        self.payload_length = selector as u64;
                        self.on_length_done()
                    }
                }
            }
            DataPhase::PayloadLength(idx) => {
                self.payload_length = (self.payload_length << 8) | byte as u64;
                if idx + 1 == self.payload_type.length_bytes() {
                    self.on_length_done()
                } else {
                    self.phase = DataPhase::PayloadLength(idx + 1);
                    Ok(None)
                }
            }
            DataPhase::MaskKey(idx) => {
                if idx == 4 {
                    self.phase = DataPhase::Data;
                } else {
                    self.phase = DataPhase::MaskKey(idx + 1);
                }
                Ok(Some(FrameEvent::MaskKey(byte)))
            }
            DataPhase::Data => Ok(None),
        }
    }
}
