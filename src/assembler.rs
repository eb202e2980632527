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
// Created Date: 2026/10/13 09:12:45

use bytes::{BufMut, BytesMut};

use crate::parser::DataParser;

/// 收集负载数据, 若有掩码则按照已读取的偏移解码
#[derive(Debug, Default)]
pub struct MessageAssembler {
    mask_key: Vec<u8>,
    body: BytesMut,
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask_key(&self) -> &[u8] {
        &self.mask_key
    }

    pub fn body(&self) -> &BytesMut {
        &self.body
    }

    pub fn take_body(&mut self) -> BytesMut {
        self.body.split()
    }

    pub fn on_set_mask_key(&mut self, ch: u8) {
        if self.mask_key.len() < 4 {
            self.mask_key.push(ch);
        }
    }

    fn mask_array(&self) -> Option<[u8; 4]> {
        self.mask_key.as_slice().try_into().ok()
    }

    /// 追加负载数据, 返回本次读取的字节数, 最多读取到帧声明的长度
    pub fn on_body(&mut self, parser: &mut DataParser, data: &[u8]) -> usize {
        let read_len = parser.remaining().min(data.len() as u64) as usize;
        let data = &data[..read_len];
        match (parser.mask(), self.mask_array()) {
            (true, Some(key)) => {
                let offset = parser.readed_length() as usize;
                self.body.reserve(read_len);
                for (i, b) in data.iter().enumerate() {
                    self.body.put_u8(b ^ key[(offset + i) & 3]);
                }
            }
            _ => self.body.extend_from_slice(data),
        }
        parser.advance_payload(read_len as u64);
        read_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked_parser(len: u8, key: [u8; 4]) -> (DataParser, MessageAssembler) {
        let mut parser = DataParser::new(None);
        let mut assembler = MessageAssembler::new();
        parser.step(0x82).unwrap();
        parser.step(0x80 | len).unwrap();
        for k in key {
            parser.step(k).unwrap();
            assembler.on_set_mask_key(k);
        }
        (parser, assembler)
    }

    #[test]
    fn mask_offset_continues() {
        let (mut parser, mut assembler) = masked_parser(5, [1, 2, 3, 4]);
        assert_eq!(assembler.on_body(&mut parser, &[0, 0]), 2);
        assert_eq!(assembler.on_body(&mut parser, &[0]), 1);
        assert_eq!(assembler.on_body(&mut parser, &[0, 0, 0xFF, 0xFF]), 2);
        assert_eq!(&assembler.body()[..], &[1, 2, 3, 4, 1]);
        assert!(parser.is_finished());
        assert_eq!(assembler.on_body(&mut parser, &[0]), 0);
    }

    #[test]
    fn unmasked_passthrough() {
        let mut parser = DataParser::new(None);
        let mut assembler = MessageAssembler::new();
        parser.step(0x81).unwrap();
        parser.step(0x03).unwrap();
        assert_eq!(assembler.on_body(&mut parser, b"abcdef"), 3);
        assert_eq!(&assembler.body()[..], b"abc");
        assert!(assembler.mask_key().is_empty());
    }
}
