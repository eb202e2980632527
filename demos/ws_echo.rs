use async_trait::async_trait;
use std::error::Error;

use tokio::net::TcpListener;
use wsparse::{self, OpCode, WsConfig, WsFrame, WsMessage, WsResult, WsServer, WsTrait};

struct Operate;

#[async_trait]
impl WsTrait for Operate {
    async fn on_open(&mut self, shake: &WsMessage) -> WsResult<()> {
        log::info!(
            "握手成功 key = {:?} protocol = {:?}",
            shake.ws_key_str(),
            shake.ws_protocol_str()
        );
        Ok(())
    }

    async fn on_message(&mut self, msg: WsMessage) -> WsResult<Option<WsFrame>> {
        log::info!("callback on message = {:?} len = {}", msg.opcode(), msg.payload_length());
        match msg.opcode() {
            Some(OpCode::Ping) => Ok(Some(WsFrame::pong(msg.into_body()))),
            Some(OpCode::Text) | Some(OpCode::Binary) => {
                let opcode = msg.opcode().unwrap_or(OpCode::Binary);
                Ok(Some(WsFrame::new(msg.fin(), opcode, msg.into_body())))
            }
            _ => Ok(None),
        }
    }

    async fn on_close(&mut self, reason: &str) {
        log::info!("close reason = {}", reason);
    }
}

async fn run_main() -> Result<(), Box<dyn Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8010".to_string());
    let config = match std::env::args().nth(2) {
        Some(path) => WsConfig::load(path)?,
        None => WsConfig::default(),
    };
    let server = TcpListener::bind(&addr).await?;
    println!("Listening on: {}", addr);
    loop {
        let (stream, addr) = server.accept().await?;
        let config = config.clone();
        tokio::spawn(async move {
            let mut server = WsServer::with_config(stream, Some(addr), config);
            server.set_callback_ws(Box::new(Operate));
            let e = server.incoming().await;
            println!("close server ==== addr = {:?} e = {:?}", addr, e);
        });
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run_main().await {
        println!("运行ws_echo发生错误:{:?}", e);
    }
}
