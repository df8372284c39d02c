//! Fetches through a credential-checking relay proxy to a TLS echo origin.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proxytun::{
    ErrorKind, FetchError, NoProxy, ProxyEndpoint, ProxyEnv, ProxyFetcher, RootCertStore,
};
use proxytun_client::CredentialCodec;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

const PROXY_USER: &str = "scrapy";
const PROXY_PASS: &str = "scrapy";

async fn read_head<S: tokio::io::AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(_) => head.push(byte[0]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn header_lines(head: &str) -> impl Iterator<Item = (&str, &str)> {
    head.split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
}

/// HTTPS origin answering every request with the JSON of its request headers.
struct EchoOrigin {
    addr: SocketAddr,
    root: CertificateDer<'static>,
}

async fn spawn_echo_origin() -> EchoOrigin {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_owned()]).expect("cert");
    let root = certified.cert.der().clone();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.signing_key.serialize_der()));

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![root.clone()], key)
        .expect("server config");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind origin");
    let addr = listener.local_addr().expect("origin addr");
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(socket).await else {
                    return;
                };
                let head = read_head(&mut tls).await;
                let headers: BTreeMap<String, String> = header_lines(&head)
                    .map(|(name, value)| (name.to_ascii_lowercase(), value.to_owned()))
                    .collect();
                let body = serde_json::to_string(&headers).expect("json");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    EchoOrigin { addr, root }
}

/// CONNECT relay that requires `PROXY_USER:PROXY_PASS`.
struct RelayProxy {
    addr: SocketAddr,
    connects: Arc<AtomicUsize>,
}

async fn spawn_relay_proxy() -> RelayProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind proxy");
    let addr = listener.local_addr().expect("proxy addr");
    let connects = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connects);

    tokio::spawn(async move {
        while let Ok((mut client, _)) = listener.accept().await {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let head = read_head(&mut client).await;
                counter.fetch_add(1, Ordering::SeqCst);

                let Some(target) = head
                    .strip_prefix("CONNECT ")
                    .and_then(|rest| rest.split(' ').next())
                    .map(str::to_owned)
                else {
                    let _ = client.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n").await;
                    return;
                };

                let authorized = header_lines(&head)
                    .filter(|(name, _)| name.eq_ignore_ascii_case("proxy-authorization"))
                    .filter_map(|(_, value)| CredentialCodec::decode(value))
                    .any(|creds| creds.username() == PROXY_USER && creds.password() == PROXY_PASS);
                if !authorized {
                    let _ = client
                        .write_all(
                            b"HTTP/1.1 407 Proxy Authentication Required\r\n\
                              Proxy-Authenticate: Basic realm=\"relay\"\r\nContent-Length: 0\r\n\r\n",
                        )
                        .await;
                    return;
                }

                let Ok(mut upstream) = TcpStream::connect(target.as_str()).await else {
                    let _ = client.write_all(b"HTTP/1.1 502 Bad Gateway\r\n\r\n").await;
                    return;
                };
                if client
                    .write_all(b"HTTP/1.1 200 Connection established\r\n\r\n")
                    .await
                    .is_err()
                {
                    return;
                }
                let _ = tokio::io::copy_bidirectional(&mut client, &mut upstream).await;
            });
        }
    });

    RelayProxy { addr, connects }
}

fn fetcher(proxy: &RelayProxy, origin: &EchoOrigin, credentials: &str) -> ProxyFetcher {
    let mut roots = RootCertStore::empty();
    roots.add(origin.root.clone()).expect("trust origin cert");
    let endpoint =
        ProxyEndpoint::parse(&format!("http://{credentials}@{}", proxy.addr)).expect("proxy endpoint");

    ProxyFetcher::builder()
        .proxy(endpoint)
        .root_store(roots)
        .header(
            http::header::PROXY_AUTHORIZATION,
            http::HeaderValue::from_static("Basic c2NyYXB5OnNjcmFweQ=="),
        )
        .build()
        .expect("fetcher")
}

#[tokio::test]
async fn origin_status_reported_once_through_tunnel() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;
    let fetcher = fetcher(&proxy, &origin, "scrapy:scrapy");

    let url = format!("https://localhost:{}/status", origin.addr.port());
    let response = fetcher.fetch(&url).await.expect("fetch");

    assert_eq!(response.status(), 200);
    assert_eq!(proxy.connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wrong_credentials_are_a_tunnel_auth_failure() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;
    let fetcher = fetcher(&proxy, &origin, "scrapy:wrong");

    let url = format!("https://localhost:{}/status", origin.addr.port());
    let err = fetcher.fetch(&url).await.expect_err("proxy refuses");

    assert!(err.is_proxy_auth());
    let failure = err.tunnel_failure().expect("tunnel failure");
    assert_eq!(failure.kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn invalid_target_port_fails_before_reaching_proxy() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;
    let fetcher = fetcher(&proxy, &origin, "scrapy:scrapy");

    let err = fetcher
        .fetch("https://localhost:0/status")
        .await
        .expect_err("port 0");
    assert!(matches!(err, FetchError::Config(_)));

    let err = fetcher
        .fetch("https://localhost:70000/status")
        .await
        .expect_err("port out of range");
    assert!(matches!(err, FetchError::InvalidUrl(_)));

    assert_eq!(proxy.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_target_is_a_tunnel_error() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;
    let fetcher = fetcher(&proxy, &origin, "scrapy:scrapy");

    let closed = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = closed.local_addr().expect("addr").port();
    drop(closed);

    let err = fetcher
        .fetch(&format!("https://127.0.0.1:{port}/"))
        .await
        .expect_err("target unreachable");
    let failure = err.tunnel_failure().expect("tunnel failure");
    assert!(failure.is_tunnel());
}

#[tokio::test]
async fn origin_never_sees_proxy_authorization() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;
    let fetcher = fetcher(&proxy, &origin, "scrapy:scrapy");

    let url = format!("https://localhost:{}/headers", origin.addr.port());
    let response = fetcher.fetch(&url).await.expect("fetch");
    let echoed: BTreeMap<String, String> = response.json().expect("json body");

    assert!(echoed.contains_key("host"));
    assert!(echoed.contains_key("user-agent"));
    assert!(!echoed.contains_key("proxy-authorization"));
    assert!(
        echoed
            .values()
            .all(|value| !value.contains("c2NyYXB5OnNjcmFweQ=="))
    );
}

#[tokio::test]
async fn no_proxy_hosts_are_fetched_directly() {
    let origin = spawn_echo_origin().await;
    let proxy = spawn_relay_proxy().await;

    let mut roots = RootCertStore::empty();
    roots.add(origin.root.clone()).expect("trust origin cert");
    let endpoint =
        ProxyEndpoint::parse(&format!("http://scrapy:scrapy@{}", proxy.addr)).expect("proxy endpoint");
    let no_proxy = NoProxy::from_string("localhost").expect("no_proxy list");
    let fetcher = ProxyFetcher::builder()
        .proxy(endpoint)
        .proxy_env(ProxyEnv::default().with_no_proxy(no_proxy))
        .root_store(roots)
        .build()
        .expect("fetcher");
    assert!(fetcher.proxy_for("localhost").is_none());
    assert!(fetcher.proxy_for("example.com").is_some());

    let url = format!("https://localhost:{}/direct", origin.addr.port());
    let response = fetcher.fetch(&url).await.expect("direct fetch");
    let echoed: BTreeMap<String, String> = response.json().expect("json body");

    assert_eq!(response.status(), 200);
    assert!(echoed.contains_key("host"));
    assert_eq!(proxy.connects.load(Ordering::SeqCst), 0);
}
