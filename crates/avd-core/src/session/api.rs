//! Low-level HTTP plumbing for the server API.

use std::time::Duration;

use super::SessionError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// POSTs a JSON body to `endpoint` and returns the raw response body.
///
/// Auth travels in headers (API user + key). Non-2xx statuses are an error.
/// Blocking; runs in the current thread.
pub(crate) fn post_json(
    endpoint: &str,
    api_user: &str,
    api_key: &str,
    body: &[u8],
) -> Result<Vec<u8>, SessionError> {
    let mut response = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(endpoint)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;
    easy.timeout(REQUEST_TIMEOUT)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    list.append(&format!("X-Api-User: {}", api_user))?;
    list.append(&format!("X-Api-Key: {}", api_key))?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(SessionError::HttpStatus(code));
    }

    Ok(response)
}
