use anyhow::Result;

/// Status and body of a completed GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking transport used by the remote source; swapped for a scripted
/// implementation in tests.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}
