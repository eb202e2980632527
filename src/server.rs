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
// Created Date: 2026/10/14 15:02:17

use std::net::SocketAddr;

use bytes::Bytes;
use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_stream::StreamExt;
use tokio_util::codec::Framed;

use crate::{
    parser::{OpCode, WsPkgType},
    WsCodec, WsConfig, WsError, WsOutbound, WsResult, WsTrait,
};

/// 单个连接的处理: 回应握手, 将数据帧交给回调, 收到关闭帧后结束
pub struct WsServer<T> {
    framed: Framed<T, WsCodec>,
    callback: Option<Box<dyn WsTrait>>,
    addr: Option<SocketAddr>,
}

impl<T> WsServer<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(io: T, addr: Option<SocketAddr>) -> Self {
        Self::with_config(io, addr, WsConfig::default())
    }

    pub fn with_config(io: T, addr: Option<SocketAddr>, config: WsConfig) -> Self {
        Self {
            framed: Framed::new(io, WsCodec::new(config)),
            callback: None,
            addr,
        }
    }

    pub fn set_callback_ws(&mut self, callback: Box<dyn WsTrait>) {
        self.callback = Some(callback);
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.framed.get_mut()
    }

    pub fn into_io(self) -> T {
        self.framed.into_inner()
    }

    async fn on_error(&mut self, err: WsError) -> WsResult<()> {
        match err.errno() {
            Some(errno) if errno.is_handshake() => {
                log::info!("websocket {:?} 握手数据非法:{}", self.addr, err)
            }
            _ if err.is_protocol() => log::info!("websocket {:?} 数据帧非法:{}", self.addr, err),
            _ => log::info!("websocket {:?} 处理数据时出错:{}", self.addr, err),
        }
        if let Some(callback) = self.callback.as_mut() {
            callback.on_error(&err).await;
        }
        Err(err)
    }

    pub async fn incoming(&mut self) -> WsResult<()> {
        while let Some(msg) = self.framed.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => return self.on_error(e).await,
            };

            match msg.pkg_type() {
                WsPkgType::Handshake => {
                    let key = Bytes::copy_from_slice(msg.ws_key());
                    self.framed.send(WsOutbound::Handshake(key)).await?;
                    if let Some(callback) = self.callback.as_mut() {
                        callback.on_open(&msg).await?;
                    }
                }
                WsPkgType::Data if msg.opcode() == Some(OpCode::Close) => {
                    log::trace!("websocket {:?} receive close frame", self.addr);
                    if let Some(callback) = self.callback.as_mut() {
                        callback.on_close("close frame").await;
                    }
                    return Ok(());
                }
                WsPkgType::Data => {
                    let reply = match self.callback.as_mut() {
                        Some(callback) => callback.on_message(msg).await?,
                        None => None,
                    };
                    if let Some(frame) = reply {
                        self.framed.send(WsOutbound::Frame(frame)).await?;
                    }
                }
                WsPkgType::Unknown => {}
            }
        }

        if let Some(callback) = self.callback.as_mut() {
            callback.on_close("network").await;
        }
        Ok(())
    }
}
