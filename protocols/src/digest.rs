//! HTTP Digest access authentication (RFC 2617 / RFC 7616, MD5 family).
//!
//! Only the client side is needed: parse the server's `WWW-Authenticate`
//! challenge, then build the `Authorization` header for a single request.

use std::str::FromStr;

use thiserror::Error;

/// Request counter sent with the one and only authenticated request.
pub const FIRST_NONCE_COUNT: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("challenge does not use the Digest scheme")]
    NotDigest,

    #[error("challenge is missing the '{0}' parameter")]
    MissingParam(&'static str),

    #[error("unsupported digest algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("unsupported quality of protection '{0}'")]
    UnsupportedQop(String),

    #[error("malformed challenge near '{0}'")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Md5Sess,
}

impl Algorithm {
    fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Md5Sess => "MD5-sess",
        }
    }
}

/// A parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Algorithm,
    /// `true` when the server offered `qop=auth`.
    pub qop_auth: bool,
}

impl FromStr for Challenge {
    type Err = DigestError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let header = header.trim();
        let (scheme, rest) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
        if !scheme.eq_ignore_ascii_case("digest") {
            return Err(DigestError::NotDigest);
        }

        let mut realm = None;
        let mut nonce = None;
        let mut opaque = None;
        let mut algorithm = Algorithm::Md5;
        let mut qop_auth = false;
        let mut qop_offered: Option<String> = None;

        for (key, value) in parse_params(rest)? {
            match key.to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "opaque" => opaque = Some(value),
                "algorithm" => {
                    algorithm = match value.to_ascii_lowercase().as_str() {
                        "md5" => Algorithm::Md5,
                        "md5-sess" => Algorithm::Md5Sess,
                        _ => return Err(DigestError::UnsupportedAlgorithm(value)),
                    }
                }
                "qop" => {
                    qop_auth = value
                        .split(',')
                        .any(|option| option.trim().eq_ignore_ascii_case("auth"));
                    qop_offered = Some(value);
                }
                _ => {}
            }
        }

        if let Some(offered) = qop_offered {
            if !qop_auth {
                return Err(DigestError::UnsupportedQop(offered));
            }
        }

        Ok(Self {
            realm: realm.ok_or(DigestError::MissingParam("realm"))?,
            nonce: nonce.ok_or(DigestError::MissingParam("nonce"))?,
            opaque,
            algorithm,
            qop_auth,
        })
    }
}

impl Challenge {
    /// Builds the `Authorization` header value for one request.
    pub fn authorization(
        &self,
        method: &str,
        uri: &str,
        username: &str,
        password: &str,
        cnonce: &str,
        nonce_count: u32,
    ) -> String {
        let nc: String = format!("{nonce_count:08x}");

        let mut ha1: String = md5_hex(&format!("{username}:{}:{password}", self.realm));
        if self.algorithm == Algorithm::Md5Sess {
            ha1 = md5_hex(&format!("{ha1}:{}:{cnonce}", self.nonce));
        }
        let ha2: String = md5_hex(&format!("{method}:{uri}"));

        let response: String = if self.qop_auth {
            md5_hex(&format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", self.nonce))
        } else {
            md5_hex(&format!("{ha1}:{}:{ha2}", self.nonce))
        };

        let mut header: String = format!(
            "Digest username=\"{username}\", realm=\"{}\", nonce=\"{}\", uri=\"{uri}\", algorithm={}, response=\"{response}\"",
            self.realm,
            self.nonce,
            self.algorithm.as_str(),
        );
        if self.qop_auth {
            header.push_str(&format!(", qop=auth, nc={nc}, cnonce=\"{cnonce}\""));
        }
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(", opaque=\"{opaque}\""));
        }
        header
    }

    /// Same as [`Challenge::authorization`] with a fresh random client nonce.
    pub fn respond(&self, method: &str, uri: &str, username: &str, password: &str) -> String {
        let cnonce: String = format!("{:016x}", rand::random::<u64>());
        self.authorization(method, uri, username, password, &cnonce, FIRST_NONCE_COUNT)
    }
}

/// Picks the first Digest challenge out of several `WWW-Authenticate` values.
pub fn find_challenge<'a, I>(headers: I) -> Result<Challenge, DigestError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut last_err: DigestError = DigestError::NotDigest;
    for header in headers {
        match header.parse::<Challenge>() {
            Ok(challenge) => return Ok(challenge),
            Err(DigestError::NotDigest) => continue,
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Splits `k1="v1", k2=v2` into pairs; quoted values may contain commas.
fn parse_params(input: &str) -> Result<Vec<(String, String)>, DigestError> {
    let mut params: Vec<(String, String)> = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let key: &str = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(DigestError::Malformed(key.to_string()));
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            if !closed {
                return Err(DigestError::Malformed(key.to_string()));
            }
        } else {
            while let Some(c) = chars.peek() {
                if *c == ',' {
                    break;
                }
                value.push(*c);
                chars.next();
            }
            value = value.trim().to_string();
        }

        params.push((key.to_string(), value));
    }

    Ok(params)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
