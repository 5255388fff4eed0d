use socket2::{Domain, Protocol, Socket, Type};
use split_dns_application::{HandleQueryUseCase, ProxyRequest};
use split_dns_domain::InboundTransport;
use split_dns_infrastructure::dns::sink::{TcpResponseSink, UdpResponseSink};
use split_dns_infrastructure::dns::transport::read_framed_or_eof;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tracing::{debug, error, info};

const MAX_UDP_QUERY_SIZE: usize = 4096;
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the two listener loops sharing one dispatcher. Each inbound query is
/// handled in its own task; the loops themselves never wait on an upstream.
pub async fn serve(addr: SocketAddr, handler: Arc<HandleQueryUseCase>) -> anyhow::Result<()> {
    let udp_socket = Arc::new(create_udp_socket(addr)?);
    let tcp_listener = create_tcp_listener(addr)?;

    info!(listen = %addr, "DNS listeners ready (UDP and TCP)");

    let udp_handler = handler.clone();
    let udp_loop = tokio::spawn(async move {
        run_udp_loop(udp_socket, udp_handler).await;
    });
    let tcp_loop = tokio::spawn(async move {
        run_tcp_loop(tcp_listener, handler).await;
    });

    tokio::try_join!(udp_loop, tcp_loop)?;
    Ok(())
}

async fn run_udp_loop(socket: Arc<UdpSocket>, handler: Arc<HandleQueryUseCase>) {
    let mut buf = [0u8; MAX_UDP_QUERY_SIZE];
    loop {
        let (n, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                error!(error = %e, "UDP recv error");
                continue;
            }
        };
        let wire = buf[..n].to_vec();
        let socket = socket.clone();
        let handler = handler.clone();
        tokio::spawn(async move {
            let request = match ProxyRequest::decode(wire, peer, InboundTransport::Udp) {
                Ok(request) => request,
                Err(e) => {
                    debug!(client = %peer, error = %e, "Dropping undecodable datagram");
                    return;
                }
            };
            let mut sink = UdpResponseSink::new(socket, peer);
            handler.execute(&request, &mut sink).await;
        });
    }
}

async fn run_tcp_loop(listener: TcpListener, handler: Arc<HandleQueryUseCase>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(error = %e, "TCP accept error");
                continue;
            }
        };
        let handler = handler.clone();
        tokio::spawn(async move {
            handle_tcp_connection(stream, peer, handler).await;
        });
    }
}

/// Serve queries off one accepted stream until the client closes, goes
/// idle, or sends something undecodable.
async fn handle_tcp_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<HandleQueryUseCase>,
) {
    let (mut reader, writer) = stream.into_split();
    let mut sink = TcpResponseSink::new(writer);
    loop {
        let wire = match tokio::time::timeout(TCP_IDLE_TIMEOUT, read_framed_or_eof(&mut reader))
            .await
        {
            Err(_) => break,
            Ok(Ok(None)) => break,
            Ok(Ok(Some(wire))) => wire,
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP read error");
                break;
            }
        };
        let request = match ProxyRequest::decode(wire, peer, InboundTransport::Tcp) {
            Ok(request) => request,
            Err(e) => {
                debug!(client = %peer, error = %e, "Dropping undecodable query");
                break;
            }
        };
        handler.execute(&request, &mut sink).await;
    }
}

fn create_udp_socket(addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
