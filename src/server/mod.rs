pub mod api;

use crate::agent::InterviewAgent;
use crate::cli::Args;
use crate::error::AgentError;
use log::{ error, info };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct Server {
    addr: String,
    agent: Arc<InterviewAgent>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, agent: Arc<InterviewAgent>, args: Args) -> Self {
        Self { addr, agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.agent.clone());

        if let Some((cert_path, key_path)) = tls_paths(&self.args)? {
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Starting HTTPS server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        } else {
            info!("Starting HTTP server on: http://{}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}

/// Resolves the TLS certificate/key pair. TLS enabled with either path
/// missing is a fatal configuration error, never a silent fall back to
/// plaintext.
fn tls_paths(args: &Args) -> Result<Option<(&str, &str)>, AgentError> {
    if !args.enable_tls {
        return Ok(None);
    }
    match (args.tls_cert_path.as_deref(), args.tls_key_path.as_deref()) {
        (Some(cert), Some(key)) => Ok(Some((cert, key))),
        (None, _) => {
            error!("TLS is enabled but --tls-cert-path is not set");
            Err(AgentError::Configuration("TLS is enabled but --tls-cert-path is not set".to_string()))
        }
        (_, None) => {
            error!("TLS is enabled but --tls-key-path is not set");
            Err(AgentError::Configuration("TLS is enabled but --tls-key-path is not set".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args_from(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("interview-agent").chain(argv.iter().copied()))
    }

    #[test]
    fn tls_disabled_serves_plain_http() {
        let args = args_from(&[]);
        assert!(tls_paths(&args).unwrap().is_none());
    }

    #[test]
    fn tls_enabled_with_both_paths_is_used() {
        let args = args_from(
            &["--enable-tls", "--tls-cert-path", "cert.pem", "--tls-key-path", "key.pem"]
        );
        assert_eq!(tls_paths(&args).unwrap(), Some(("cert.pem", "key.pem")));
    }

    #[test]
    fn tls_enabled_without_cert_path_is_fatal() {
        let args = args_from(&["--enable-tls", "--tls-key-path", "key.pem"]);
        let err = tls_paths(&args).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
        assert!(err.to_string().contains("tls-cert-path"));
    }

    #[test]
    fn tls_enabled_without_key_path_is_fatal() {
        let args = args_from(&["--enable-tls", "--tls-cert-path", "cert.pem"]);
        let err = tls_paths(&args).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
        assert!(err.to_string().contains("tls-key-path"));
    }
}
