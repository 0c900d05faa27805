/// The category an error falls into, independent of which crate raised it.
///
/// Every crate error exposes a `kind()` so the web layer can pick a status
/// code without looking at message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, missing or out-of-range client input.
    Validation,
    /// The referenced record does not exist.
    NotFound,
    /// A record with the same unique key already exists.
    Conflict,
    /// Store unreachable or any other unexpected fault.
    Infrastructure,
}

impl ErrorKind {
    /// Returns true for errors caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ErrorKind::Infrastructure)
    }
}
