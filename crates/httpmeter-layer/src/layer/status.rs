//! Status code resolution for a finished request.

use httpmeter_core::HandlerError;

const OK: u16 = 200;
const INTERNAL_SERVER_ERROR: u16 = 500;

/// Resolve the status recorded for a request.
///
/// `written` is the response status (0 if the handler produced no response).
/// When the handler failed, a structured code on the error takes precedence;
/// an error paired with an unset or `200` status is recorded as `500`.
pub fn resolve_status<E>(written: u16, error: Option<&E>) -> u16
where
    E: HandlerError + ?Sized,
{
    let Some(err) = error else { return written };

    let status = err.status_code().unwrap_or(written);
    if status == 0 || status == OK {
        INTERNAL_SERVER_ERROR
    } else {
        status
    }
}
