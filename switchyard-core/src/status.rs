// Status codes the dispatch pipeline produces

/// Status codes used as default exit codes and for error mapping.
///
/// A context whose exit code is outside the 2xx range is never dispatched;
/// see [`is_success_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    InternalServerError = 500,
    LoopDetected = 508,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The variant for `code`, if the pipeline ever produces it.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(HttpStatus::Ok),
            400 => Some(HttpStatus::BadRequest),
            403 => Some(HttpStatus::Forbidden),
            404 => Some(HttpStatus::NotFound),
            500 => Some(HttpStatus::InternalServerError),
            508 => Some(HttpStatus::LoopDetected),
            _ => None,
        }
    }
}

/// Whether a raw exit code lets dispatch proceed (`200..300`).
#[inline]
pub fn is_success_code(code: u16) -> bool {
    (200..300).contains(&code)
}

impl From<HttpStatus> for u16 {
    fn from(status: HttpStatus) -> Self {
        status.code()
    }
}
