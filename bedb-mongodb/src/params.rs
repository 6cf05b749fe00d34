//! Per-mode query parameter normalization.
//!
//! Each mode takes the keys it expresses as structured options out of the
//! map and inserts its defaults for keys that must stay in the URI. A key the
//! caller already set is never overwritten, so pre-populating a key is how a
//! default is overridden.

use bedb_core::{ConnectDefaults, MongoMode, QueryParams};
use tracing::debug;

use crate::options::{ModeOptions, TlsSettings, WriteConcern};

pub const DIRECT_CONNECTION: &str = "directConnection";
pub const RETRY_WRITES: &str = "retryWrites";
pub const TLS: &str = "tls";
pub const AUTH_SOURCE: &str = "authSource";
pub const TLS_ALLOW_INVALID_HOSTNAMES: &str = "tlsAllowInvalidHostnames";
pub const WRITE_CONCERN: &str = "w";

/// Normalize `params` in place for `mode` and return the structured options.
pub fn normalize(
    mode: MongoMode,
    params: &mut QueryParams,
    defaults: &ConnectDefaults,
) -> ModeOptions {
    match mode {
        MongoMode::Tunnel => normalize_tunnel(params, defaults),
        MongoMode::DirectCloud => normalize_direct(params),
        MongoMode::Private => normalize_private(params),
    }
}

fn normalize_tunnel(params: &mut QueryParams, defaults: &ConnectDefaults) -> ModeOptions {
    let direct_connection = take_flag(params, DIRECT_CONNECTION, true);
    let retry_writes = take_flag(params, RETRY_WRITES, false);
    // The tunnel already encrypts; `tls` here only decides whether the
    // server certificate is skipped.
    let skip_verify = take_flag(params, TLS, true);

    keep_or_insert(params, AUTH_SOURCE, "admin");
    keep_or_insert(params, TLS_ALLOW_INVALID_HOSTNAMES, "true");

    ModeOptions {
        direct_connection: Some(direct_connection),
        retry_writes,
        tls: Some(TlsSettings {
            allow_invalid_certificates: skip_verify,
        }),
        write_concern: None,
        server_selection_timeout: Some(defaults.tunnel_server_selection_timeout),
    }
}

fn normalize_direct(params: &mut QueryParams) -> ModeOptions {
    ModeOptions {
        direct_connection: None,
        retry_writes: take_flag(params, RETRY_WRITES, false),
        tls: None,
        write_concern: take_write_concern(params),
        server_selection_timeout: None,
    }
}

fn normalize_private(params: &mut QueryParams) -> ModeOptions {
    let options = ModeOptions {
        direct_connection: None,
        retry_writes: take_flag(params, RETRY_WRITES, false),
        tls: None,
        write_concern: take_write_concern(params),
        server_selection_timeout: None,
    };
    keep_or_insert(params, AUTH_SOURCE, "admin");
    options
}

/// Remove `key` and read it as a boolean; only the literal `true` is true.
fn take_flag(params: &mut QueryParams, key: &str, default: bool) -> bool {
    match params.shift_remove(key) {
        Some(value) => value == "true",
        None => default,
    }
}

fn take_write_concern(params: &mut QueryParams) -> Option<WriteConcern> {
    match params.shift_remove(WRITE_CONCERN) {
        None => Some(WriteConcern::Majority),
        Some(w) if w == "majority" => Some(WriteConcern::Majority),
        Some(w) => {
            debug!(w = %w, "write concern is not translated, using driver default");
            None
        }
    }
}

fn keep_or_insert(params: &mut QueryParams, key: &str, default: &str) {
    params
        .entry(key.to_owned())
        .or_insert_with(|| default.to_owned());
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn keys(params: &QueryParams) -> Vec<&str> {
        params.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_tunnel_defaults() {
        let mut p = QueryParams::new();
        let options = normalize(MongoMode::Tunnel, &mut p, &ConnectDefaults::default());

        assert_eq!(
            options,
            ModeOptions {
                direct_connection: Some(true),
                retry_writes: false,
                tls: Some(TlsSettings {
                    allow_invalid_certificates: true
                }),
                write_concern: None,
                server_selection_timeout: Some(Duration::from_secs(5)),
            }
        );
        assert_eq!(keys(&p), vec![AUTH_SOURCE, TLS_ALLOW_INVALID_HOSTNAMES]);
        assert_eq!(p[AUTH_SOURCE], "admin");
        assert_eq!(p[TLS_ALLOW_INVALID_HOSTNAMES], "true");
    }

    #[test]
    fn test_tunnel_overrides_are_consumed() {
        let mut p = params(&[
            ("directConnection", "false"),
            ("retryWrites", "true"),
            ("tls", "false"),
            ("authSource", "orders"),
            ("tlsAllowInvalidHostnames", "false"),
        ]);
        let options = normalize(MongoMode::Tunnel, &mut p, &ConnectDefaults::default());

        assert_eq!(options.direct_connection, Some(false));
        assert!(options.retry_writes);
        assert_eq!(
            options.tls,
            Some(TlsSettings {
                allow_invalid_certificates: false
            })
        );
        assert_eq!(
            p,
            params(&[("authSource", "orders"), ("tlsAllowInvalidHostnames", "false")])
        );
    }

    #[test]
    fn test_flags_only_accept_literal_true() {
        let mut p = params(&[("retryWrites", "TRUE"), ("directConnection", "1")]);
        let options = normalize(MongoMode::Tunnel, &mut p, &ConnectDefaults::default());

        assert!(!options.retry_writes);
        assert_eq!(options.direct_connection, Some(false));
    }

    #[test]
    fn test_tunnel_server_selection_timeout_is_injectable() {
        let defaults =
            ConnectDefaults::default().with_tunnel_server_selection_timeout(Duration::from_secs(1));
        let options = normalize(MongoMode::Tunnel, &mut QueryParams::new(), &defaults);
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_direct_defaults() {
        let mut p = QueryParams::new();
        let options = normalize(MongoMode::DirectCloud, &mut p, &ConnectDefaults::default());

        assert_eq!(
            options,
            ModeOptions {
                direct_connection: None,
                retry_writes: false,
                tls: None,
                write_concern: Some(WriteConcern::Majority),
                server_selection_timeout: None,
            }
        );
        assert!(p.is_empty());
    }

    #[test]
    fn test_non_majority_write_concern_is_dropped() {
        for w in ["1", "all", "MAJORITY"] {
            let mut p = params(&[("w", w), ("appName", "api")]);
            let options = normalize(MongoMode::DirectCloud, &mut p, &ConnectDefaults::default());

            assert_eq!(options.write_concern, None, "w={w}");
            assert_eq!(keys(&p), vec!["appName"]);
        }
    }

    #[test]
    fn test_private_defaults() {
        let mut p = params(&[("replicaSet", "rs0")]);
        let options = normalize(MongoMode::Private, &mut p, &ConnectDefaults::default());

        assert_eq!(options.write_concern, Some(WriteConcern::Majority));
        assert!(!options.retry_writes);
        assert_eq!(options.tls, None);
        assert_eq!(p, params(&[("replicaSet", "rs0"), ("authSource", "admin")]));
    }

    #[test]
    fn test_private_keeps_caller_auth_source() {
        let mut p = params(&[("authSource", "tenant"), ("retryWrites", "true"), ("w", "majority")]);
        let options = normalize(MongoMode::Private, &mut p, &ConnectDefaults::default());

        assert!(options.retry_writes);
        assert_eq!(options.write_concern, Some(WriteConcern::Majority));
        assert_eq!(p, params(&[("authSource", "tenant")]));
    }

    #[test]
    fn test_direct_does_not_touch_tunnel_keys() {
        let mut p = params(&[("tls", "true"), ("directConnection", "true")]);
        normalize(MongoMode::DirectCloud, &mut p, &ConnectDefaults::default());
        assert_eq!(keys(&p), vec!["tls", "directConnection"]);
    }
}
