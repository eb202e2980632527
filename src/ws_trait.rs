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
// Created Date: 2026/10/14 14:20:41

use async_trait::async_trait;

use crate::{WsError, WsFrame, WsMessage, WsResult};

/// 连接上的回调, 由WsServer驱动
#[async_trait]
pub trait WsTrait: Send {
    /// 握手成功, 101响应已写出
    async fn on_open(&mut self, shake: &WsMessage) -> WsResult<()> {
        let _ = shake;
        Ok(())
    }

    /// 收到一个完整的数据帧, 返回的帧将写回给对端
    async fn on_message(&mut self, msg: WsMessage) -> WsResult<Option<WsFrame>>;

    async fn on_close(&mut self, reason: &str) {
        let _ = reason;
    }

    async fn on_error(&mut self, err: &WsError) {
        let _ = err;
    }
}
