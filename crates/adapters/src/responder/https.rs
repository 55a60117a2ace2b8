// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTPS redirect server built on rustls and hyper

use super::{PageResponse, RedirectPage, ResponderAdapter, ResponderConfig, ResponderError};
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;

/// Serves the redirect page over TLS on all interfaces
#[derive(Clone)]
pub struct HttpsResponder {
    shutdown: Arc<watch::Sender<bool>>,
}

impl Default for HttpsResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpsResponder {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown: Arc::new(shutdown),
        }
    }
}

#[async_trait]
impl ResponderAdapter for HttpsResponder {
    async fn serve(&self, config: ResponderConfig) -> Result<(), ResponderError> {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow_and_update() {
            return Ok(());
        }

        let tls = load_tls_config(&config.cert_path, &config.key_path).await?;
        let acceptor = TlsAcceptor::from(Arc::new(tls));
        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .await
            .map_err(|source| ResponderError::Bind {
                port: config.port,
                source,
            })?;
        let addr = listener
            .local_addr()
            .map_err(|e| ResponderError::Listener(e.to_string()))?;
        tracing::info!(%addr, method = %config.method, "starting HTTPS server");

        let page = Arc::new(RedirectPage::from_config(&config).render());
        let verbose = config.verbose;

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let acceptor = acceptor.clone();
                    let page = Arc::clone(&page);
                    tokio::spawn(async move {
                        let stream = match acceptor.accept(stream).await {
                            Ok(stream) => stream,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "TLS handshake failed");
                                return;
                            }
                        };
                        let service = service_fn(move |request: Request<Incoming>| {
                            let page = Arc::clone(&page);
                            async move {
                                if verbose {
                                    tracing::info!(
                                        %peer,
                                        method = %request.method(),
                                        uri = %request.uri(),
                                        referer = ?request.headers().get(hyper::header::REFERER),
                                        "request"
                                    );
                                }
                                Ok::<_, Infallible>(to_response(&page))
                            }
                        });
                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            tracing::debug!(%peer, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    tracing::info!(%addr, "HTTPS server stopping");
                    return Ok(());
                }
            }
        }
    }

    fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    fn rearm(&self) {
        self.shutdown.send_replace(false);
    }
}

fn to_response(page: &PageResponse) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(page.body.clone())));
    *response.status_mut() = StatusCode::from_u16(page.status).unwrap_or(StatusCode::OK);
    for (name, value) in &page.headers {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(*name), value);
            }
            Err(e) => tracing::warn!(header = *name, error = %e, "dropping invalid header value"),
        }
    }
    response
}

async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<ServerConfig, ResponderError> {
    let cert_pem = tokio::fs::read(cert_path)
        .await
        .map_err(|e| ResponderError::Tls(format!("read {}: {}", cert_path.display(), e)))?;
    let key_pem = tokio::fs::read(key_path)
        .await
        .map_err(|e| ResponderError::Tls(format!("read {}: {}", key_path.display(), e)))?;

    let certs = CertificateDer::pem_slice_iter(&cert_pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ResponderError::Tls(format!("failed to parse certificates: {e}")))?;
    if certs.is_empty() {
        return Err(ResponderError::Tls(format!(
            "no certificates found in {}",
            cert_path.display()
        )));
    }
    let key = PrivateKeyDer::from_pem_slice(&key_pem)
        .map_err(|e| ResponderError::Tls(format!("failed to parse private key: {e}")))?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| ResponderError::Tls(format!("protocol versions: {e}")))?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| ResponderError::Tls(format!("server config error: {e}")))?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}

#[cfg(test)]
#[path = "https_tests.rs"]
mod tests;
