//! Structured connection options derived from a mode.

use std::time::Duration;

use mongodb::options::{Acknowledgment, ClientOptions, Tls, TlsOptions};

/// TLS settings applied in tunnel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsSettings {
    /// Skip server certificate verification.
    pub allow_invalid_certificates: bool,
}

/// Write acknowledgment level set as a structured option.
///
/// Only `majority` is translated; any other `w` value leaves the driver's
/// write concern untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConcern {
    /// Acknowledge writes from a majority of nodes.
    Majority,
}

/// Options a mode expresses through typed driver settings instead of URI text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOptions {
    /// Bypass replica set discovery. `None` leaves the driver default.
    pub direct_connection: Option<bool>,
    pub retry_writes: bool,
    /// When set, TLS is enabled with these settings.
    pub tls: Option<TlsSettings>,
    pub write_concern: Option<WriteConcern>,
    pub server_selection_timeout: Option<Duration>,
}

impl ModeOptions {
    /// Parse `uri` and layer the structured options on top.
    ///
    /// Structured values win over anything the URI says for the same setting.
    pub async fn to_client_options(&self, uri: &str) -> mongodb::error::Result<ClientOptions> {
        #[cfg(not(feature = "openssl-tls"))]
        let (uri, skip_hostnames) = lift_invalid_hostnames(uri);
        #[cfg(feature = "openssl-tls")]
        let (uri, skip_hostnames) = (uri.to_string(), false);

        let mut options = ClientOptions::parse(&uri).await?;
        self.apply(&mut options, skip_hostnames);
        Ok(options)
    }

    fn apply(&self, options: &mut ClientOptions, skip_hostnames: bool) {
        if let Some(direct) = self.direct_connection {
            options.direct_connection = Some(direct);
        }

        options.retry_writes = Some(self.retry_writes);

        if let Some(tls) = self.tls {
            let mut tls_options = match options.tls.take() {
                Some(Tls::Enabled(existing)) => existing,
                _ => TlsOptions::default(),
            };
            tls_options.allow_invalid_certificates = Some(tls.allow_invalid_certificates);
            options.tls = Some(Tls::Enabled(tls_options));
        }

        // Structured TLS settings replace whatever the URI asked for.
        if skip_hostnames && self.tls.is_none() {
            if let Some(Tls::Enabled(ref mut tls_options)) = options.tls {
                tls_options.allow_invalid_certificates = Some(true);
            }
        }

        if let Some(WriteConcern::Majority) = self.write_concern {
            options.write_concern = Some(
                mongodb::options::WriteConcern::builder()
                    .w(Acknowledgment::Majority)
                    .build(),
            );
        }

        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
    }
}

/// rustls cannot skip only the hostname check, and the driver refuses the
/// URI flag without OpenSSL. The flag is taken out of the URI and reported
/// so it can be folded into certificate verification when no structured TLS
/// settings apply.
#[cfg(not(feature = "openssl-tls"))]
fn lift_invalid_hostnames(uri: &str) -> (String, bool) {
    const KEY: &str = "tlsAllowInvalidHostnames";

    let Some((base, query)) = uri.split_once('?') else {
        return (uri.to_string(), false);
    };

    let mut skip = false;
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| match pair.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case(KEY) => {
                skip = value == "true";
                false
            }
            _ => true,
        })
        .collect();

    if kept.is_empty() {
        (base.to_string(), skip)
    } else {
        (format!("{base}?{}", kept.join("&")), skip)
    }
}
