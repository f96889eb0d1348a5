// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Certificate loading for `--cacert`, `--cert` and `--key`

use std::fs;
use std::path::Path;

use reqwest::{Certificate, Identity};

use crate::context::TlsOptions;
use crate::error::{Error, Result};

/// Loaded TLS material handed to the engine
#[derive(Default)]
pub struct TlsMaterial {
    pub insecure: bool,
    pub roots: Vec<Certificate>,
    pub identity: Option<Identity>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("insecure", &self.insecure)
            .field("roots", &self.roots.len())
            .field("identity", &self.identity.is_some())
            .finish()
    }
}

impl TlsMaterial {
    /// Read every configured certificate file
    pub fn load(options: &TlsOptions) -> Result<Self> {
        let mut material = TlsMaterial {
            insecure: options.insecure,
            ..Default::default()
        };

        if let Some(ca) = &options.ca_cert {
            material.roots = load_ca_bundle(ca)?;
        }

        if let Some(cert) = &options.client_cert {
            let key = options.client_key.as_deref().unwrap_or(cert.as_path());
            material.identity = Some(load_identity(cert, key)?);
        }

        Ok(material)
    }
}

/// Parse every certificate of a PEM bundle
pub fn load_ca_bundle(path: &Path) -> Result<Vec<Certificate>> {
    let pem = read_pem(path)?;
    let roots = Certificate::from_pem_bundle(pem.as_bytes()).map_err(|e| {
        Error::ssl(format!("invalid CA bundle '{}': {}", path.display(), e))
    })?;
    if roots.is_empty() {
        return Err(Error::ssl(format!(
            "no certificates found in CA bundle '{}'",
            path.display()
        )));
    }
    Ok(roots)
}

/// Build a client identity from a PEM certificate and key
pub fn load_identity(cert: &Path, key: &Path) -> Result<Identity> {
    let mut pem = read_pem(cert)?;
    if key != cert {
        pem.push('\n');
        pem.push_str(&read_pem(key)?);
    }

    Identity::from_pem(pem.as_bytes()).map_err(|e| {
        Error::ssl(format!(
            "unable to use client certificate '{}': {}",
            cert.display(),
            e
        ))
    })
}

fn read_pem(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::ssl(format!("unable to read '{}': {}", path.display(), e)))
}
