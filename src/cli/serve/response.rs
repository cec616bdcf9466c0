//! HTTP responses.
//!
//! Routes produce a `Reply`; only `send` touches the `tiny_http` request.

use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime::{HTML, JSON, PLAIN};

/// A response ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Forbid caching (per-cycle documents).
    pub no_store: bool,
}

impl Reply {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: HTML,
            body: body.into().into_bytes(),
            no_store: false,
        }
    }

    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                content_type: JSON,
                body,
                no_store: true,
            },
            Err(e) => Self::plain(500, &format!("500 Internal Server Error: {e}")),
        }
    }

    pub fn plain(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: PLAIN,
            body: message.as_bytes().to_vec(),
            no_store: false,
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            content_type: PLAIN,
            body: Vec::new(),
            no_store: false,
        }
    }

    pub fn not_found() -> Self {
        Self::plain(404, "404 Not Found")
    }

    pub fn gone() -> Self {
        Self::plain(410, "410 Gone").without_cache()
    }

    pub fn method_not_allowed() -> Self {
        Self::plain(405, "405 Method Not Allowed")
    }

    pub const fn without_cache(mut self) -> Self {
        self.no_store = true;
        self
    }
}

/// Send `reply`, dropping the body for HEAD requests.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let head = is_head_request(&request);
    let mut response = Response::from_data(if head { Vec::new() } else { reply.body })
        .with_status_code(StatusCode(reply.status))
        .with_header(make_header("Content-Type", reply.content_type));
    if reply.no_store {
        response = response.with_header(make_header("Cache-Control", "no-store"));
    }
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, Reply::plain(503, "503 Service Unavailable"))
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    // Static ASCII names and values always parse
    Header::from_bytes(key, value).unwrap()
}
