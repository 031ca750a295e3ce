//! Fake devices listening on loopback.

use std::net::SocketAddr;

use anyhow::Context;
use lanscout_protocols::digest::{Algorithm, Challenge};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const REALM: &str = "access-terminal";
pub const NONCE: &str = "6f2a1b5c9d";

/// What an access terminal reports about itself.
#[derive(Clone, Debug)]
pub struct FakeTerminal {
    pub username: String,
    pub password: String,
    pub path: String,
    pub body: String,
}

impl FakeTerminal {
    pub fn new(username: &str, password: &str, path: &str, model: &str, name: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            path: path.to_string(),
            body: format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                 <DeviceInfo version=\"2.0\" xmlns=\"http://www.isapi.org/ver20/XMLSchema\">\n\
                 <deviceName>{name}</deviceName>\n\
                 <model>{model}</model>\n\
                 <serialNumber>DS0000000000</serialNumber>\n\
                 </DeviceInfo>"
            ),
        }
    }

    fn challenge(&self) -> Challenge {
        Challenge {
            realm: REALM.to_string(),
            nonce: NONCE.to_string(),
            opaque: None,
            algorithm: Algorithm::Md5,
            qop_auth: true,
        }
    }

    /// Whether `authorization` is exactly what a client knowing the password would send.
    fn accepts(&self, authorization: &str) -> bool {
        let Some(cnonce) = param(authorization, "cnonce") else {
            return false;
        };
        let expected = self.challenge().authorization(
            "GET",
            &self.path,
            &self.username,
            &self.password,
            cnonce,
            1,
        );
        param(authorization, "response") == param(&expected, "response")
    }

    /// Serves the device-info endpoint behind digest auth until the test ends.
    pub async fn spawn(self) -> anyhow::Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding fake terminal")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let terminal = self.clone();
                tokio::spawn(async move {
                    let _ = terminal.serve(stream).await;
                });
            }
        });

        Ok(addr)
    }

    async fn serve(&self, mut stream: TcpStream) -> std::io::Result<()> {
        let request = read_head(&mut stream).await?;
        let authorization = request.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("authorization")
                .then(|| value.trim().to_string())
        });
        let on_path = request
            .lines()
            .next()
            .is_some_and(|line| line.starts_with(&format!("GET {} ", self.path)));

        let reply = match authorization {
            _ if !on_path => response("404 Not Found", "", ""),
            Some(value) if self.accepts(&value) => {
                response("200 OK", "Content-Type: application/xml\r\n", &self.body)
            }
            _ => response(
                "401 Unauthorized",
                &format!(
                    "WWW-Authenticate: Digest realm=\"{REALM}\", qop=\"auth\", nonce=\"{NONCE}\"\r\n"
                ),
                "",
            ),
        };

        stream.write_all(reply.as_bytes()).await?;
        stream.shutdown().await
    }
}

/// A port that accepts connections and never says anything.
pub async fn spawn_open_port() -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// A port nothing listens on.
pub async fn closed_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

async fn read_head(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Value of `key` in a `k="v", k2=v2` header, quotes stripped.
fn param<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    header.split(',').find_map(|part| {
        let (k, v) = part.trim().trim_start_matches("Digest ").split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"'))
    })
}
