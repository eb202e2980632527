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
// Created Date: 2026/10/12 14:02:11

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Consts, WsResult};

/// 判断新数据是握手还是帧数据的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrameDetect {
    /// 根据首字节判断, `G`为握手, 合法的帧头字节为数据
    #[default]
    Heuristic,
    /// 根据连接是否已完成握手判断
    Stage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// 单个header key或value的最大长度
    pub max_header_size: usize,
    /// 单帧最大负载, None表示不限制
    pub max_payload_size: Option<u64>,
    pub detect: FrameDetect,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_header_size: Consts::DEFAULT_MAX_HEADER_SIZE,
            max_payload_size: None,
            detect: FrameDetect::Heuristic,
        }
    }
}

impl WsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(content: &str) -> WsResult<Self> {
        let config: WsConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> WsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    pub fn max_payload_size(mut self, size: Option<u64>) -> Self {
        self.max_payload_size = size;
        self
    }

    pub fn detect(mut self, detect: FrameDetect) -> Self {
        self.detect = detect;
        self
    }
}
