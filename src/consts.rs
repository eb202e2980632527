
pub struct Consts;

impl Consts {
    /// 握手请求行的固定前缀
    pub const METHOD_FIELD: &'static [u8] = b"GET / HTTP/";
    pub const MAGIC_GUID: &'static str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

    pub const HOST_HEADER: &'static [u8] = b"Host";
    pub const UPGRADE_HEADER: &'static [u8] = b"Upgrade";
    pub const UPGRADE_HEADER_VALUE: &'static [u8] = b"websocket";
    pub const CONNECTION_HEADER: &'static [u8] = b"Connection";
    pub const CONNECTION_HEADER_VALUE: &'static [u8] = b"Upgrade";
    pub const WS_KEY_HEADER: &'static [u8] = b"Sec-WebSocket-Key";
    pub const WS_VERSION_HEADER: &'static [u8] = b"Sec-WebSocket-Version";
    pub const WS_VERSION_HEADER_VALUE: &'static [u8] = b"13";
    pub const WS_PROTOCOL_HEADER: &'static [u8] = b"Sec-WebSocket-Protocol";
    pub const WS_EXTEND_HEADER: &'static [u8] = b"Sec-WebSocket-Extensions";

    /// Host,Upgrade,Connection,Sec-WebSocket-Key,Sec-WebSocket-Version 五个必需头
    pub const HEADER_HOST: u8 = 0b0000_0001;
    pub const HEADER_UPGRADE: u8 = 0b0000_0010;
    pub const HEADER_CONNECTION: u8 = 0b0000_0100;
    pub const HEADER_WS_KEY: u8 = 0b0000_1000;
    pub const HEADER_WS_VERSION: u8 = 0b0001_0000;
    pub const HEADER_ALL: u8 = 0b0001_1111;

    pub const DEFAULT_MAX_HEADER_SIZE: usize = 4096;

    /// 帧头最大长度: 2字节基础头 + 8字节长度 + 4字节掩码
    pub const MAX_FRAME_HEAD_SIZE: usize = 14;
}
