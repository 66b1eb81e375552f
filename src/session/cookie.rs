//! Reading and writing the session cookie.

use std::time::{Duration, SystemTime};

use axum::http::{header, HeaderMap, HeaderValue};

use super::{SessionConfig, SessionId};
use crate::error::SessionError;
use crate::Result;

/// 9999-12-31T23:59:59Z, the last instant an HTTP date can express.
const LATEST_EXPIRY: Duration = Duration::from_secs(253_402_300_799);

/// Find the session ID carried by the request's `Cookie` headers.
///
/// Only a pair whose name is `name` and whose value has exactly `id_length`
/// bytes counts, after one pair of surrounding double quotes is removed.
/// When several qualify, the last one wins.
pub fn find_session_cookie(headers: &HeaderMap, name: &str, id_length: usize) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(cookie_name, _)| cookie_name.trim() == name)
        .filter_map(|(_, value)| SessionId::from_cookie_value(unquote(value.trim()), id_length))
        .last()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Render the `Set-Cookie` value for `id`, expiring `config.cookie_lifetime`
/// after `now`.
///
/// Fails with [`SessionError::InvalidCookie`] when the expiry falls outside
/// what an HTTP date can carry (before 1970 or after year 9999).
pub fn build_session_cookie(
    config: &SessionConfig,
    id: &SessionId,
    now: SystemTime,
) -> Result<String> {
    let expires = now
        .checked_add(config.cookie_lifetime)
        .filter(|at| {
            at.duration_since(SystemTime::UNIX_EPOCH)
                .is_ok_and(|since_epoch| since_epoch <= LATEST_EXPIRY)
        })
        .ok_or_else(|| {
            SessionError::InvalidCookie(format!(
                "expiry {}s from now is not a valid HTTP date",
                config.cookie_lifetime.as_secs()
            ))
        })?;

    Ok(format!(
        "{}={}; Path={}; Expires={}",
        config.cookie_name,
        id,
        config.cookie_path,
        httpdate::fmt_http_date(expires)
    ))
}

/// Append a `Set-Cookie` header carrying `id` to `headers`.
pub fn add_session_cookie(
    headers: &mut HeaderMap,
    config: &SessionConfig,
    id: &SessionId,
) -> Result<()> {
    let cookie = build_session_cookie(config, id, SystemTime::now())?;
    let value =
        HeaderValue::from_str(&cookie).map_err(|e| SessionError::InvalidCookie(e.to_string()))?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}
