//! Device fingerprint used as the key-derivation passphrase.
//!
//! The fingerprint joins host attributes that are stable across restarts of
//! the same machine and account. It is computed fresh on every use and never
//! written anywhere. If any input drifts (hostname change, locale change),
//! previously written records stop decrypting and the store reports them as
//! absent; the user falls back to typing the password again.

/// Build the fingerprint string for this device.
pub fn device_fingerprint() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string());

    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown-user".to_string());

    // LANG stands in for the browser locale/timezone inputs; absent is fine,
    // it just has to be the same value next time.
    let locale = std::env::var("LANG").unwrap_or_default();

    [
        std::env::consts::OS,
        std::env::consts::ARCH,
        &host,
        &user,
        &locale,
    ]
    .join("|")
}
