//! Operator command line: key provisioning, issuance and verification.
//!
//! # Supported Commands
//!
//! ```text
//! licensor keygen [--bits 2048] [--out DIR]
//! licensor issue <subject>
//! licensor verify <token>
//! licensor fingerprint
//! ```
//!
//! `issue`, `verify` and `fingerprint` use the key sources from the loaded
//! configuration. `verify` does not require a signing key.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::KeysConfig;
use crate::errors::{LicenseError, LicenseResult};
use crate::keys::{
    generate_private_key, key_fingerprint, load_authority, private_key_to_pem,
    public_key_to_pem, DEFAULT_KEY_BITS,
};
use crate::logging::{log_license_event, log_rejection, LicenseEvent};

/// Parsed CLI command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate a new keypair
    Keygen { bits: usize, out_dir: PathBuf },
    /// Issue a token for a subject
    Issue { subject: String },
    /// Verify a token
    Verify { token: String },
    /// Print the verification key fingerprint
    Fingerprint,
    /// Print usage
    Help,
}

pub const USAGE: &str = "\
usage:
  licensor keygen [--bits N] [--out DIR]
  licensor issue <subject>
  licensor verify <token>
  licensor fingerprint";

/// Parse CLI arguments, including the program name at `args[0]`.
pub fn parse_command(args: &[String]) -> LicenseResult<Command> {
    let Some(name) = args.get(1) else {
        return Ok(Command::Help);
    };

    match name.as_str() {
        "keygen" => {
            let mut bits = DEFAULT_KEY_BITS;
            let mut out_dir = PathBuf::from(".");

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--bits" | "-b" => {
                        let value = args.get(i + 1).ok_or_else(|| {
                            LicenseError::ConfigError("--bits requires a value".to_string())
                        })?;
                        bits = value.parse().map_err(|_| {
                            LicenseError::ConfigError(format!("invalid --bits value '{value}'"))
                        })?;
                        i += 2;
                    }
                    "--out" | "-o" => {
                        let value = args.get(i + 1).ok_or_else(|| {
                            LicenseError::ConfigError("--out requires a value".to_string())
                        })?;
                        out_dir = PathBuf::from(value);
                        i += 2;
                    }
                    other => {
                        return Err(LicenseError::ConfigError(format!(
                            "unknown keygen option '{other}'"
                        )));
                    }
                }
            }

            Ok(Command::Keygen { bits, out_dir })
        }
        "issue" => match args.get(2) {
            Some(subject) => Ok(Command::Issue {
                subject: subject.clone(),
            }),
            None => Err(LicenseError::ConfigError(
                "issue requires a subject".to_string(),
            )),
        },
        "verify" => match args.get(2) {
            Some(token) => Ok(Command::Verify {
                token: token.clone(),
            }),
            None => Err(LicenseError::ConfigError(
                "verify requires a token".to_string(),
            )),
        },
        "fingerprint" => Ok(Command::Fingerprint),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(LicenseError::ConfigError(format!(
            "unknown command '{other}'"
        ))),
    }
}

/// Execute a command and return what should be printed to stdout.
pub fn execute_command(cmd: Command, keys: &KeysConfig) -> LicenseResult<String> {
    match cmd {
        Command::Keygen { bits, out_dir } => keygen(bits, &out_dir),
        Command::Issue { subject } => {
            let authority = load_authority(keys)?;
            match authority.issue(&subject) {
                Ok(token) => {
                    log_license_event(LicenseEvent::Issued, Some(&subject), None);
                    Ok(token)
                }
                Err(e) => {
                    log_license_event(LicenseEvent::IssueFailed, Some(&subject), Some(e.kind()));
                    Err(e)
                }
            }
        }
        Command::Verify { token } => {
            let keys = KeysConfig {
                require_signing_key: false,
                ..keys.clone()
            };
            let authority = load_authority(&keys)?;
            match authority.verify(&token) {
                Ok(subject) => {
                    log_license_event(LicenseEvent::Verified, Some(&subject), None);
                    Ok(subject)
                }
                Err(e) => {
                    log_rejection(&e);
                    Err(e)
                }
            }
        }
        Command::Fingerprint => {
            let keys = KeysConfig {
                require_signing_key: false,
                ..keys.clone()
            };
            let authority = load_authority(&keys)?;
            key_fingerprint(authority.verifier().public_key())
        }
        Command::Help => Ok(USAGE.to_string()),
    }
}

/// Write `private.pem` and `public.pem` into `out_dir`.
///
/// Existing files are never overwritten. The private key file is created
/// owner-only on unix.
fn keygen(bits: usize, out_dir: &Path) -> LicenseResult<String> {
    if bits < 2048 {
        return Err(LicenseError::KeyError(format!(
            "refusing to generate a {bits}-bit key, at least 2048 required"
        )));
    }

    let private_path = out_dir.join("private.pem");
    let public_path = out_dir.join("public.pem");

    let private_key = generate_private_key(bits)?;
    let public_key = private_key.to_public_key();
    let private_pem = private_key_to_pem(&private_key)?;
    let public_pem = public_key_to_pem(&public_key)?;

    fs::create_dir_all(out_dir)?;
    let mut private_file = create_new(&private_path, 0o600)?;
    let mut public_file = match create_new(&public_path, 0o644) {
        Ok(file) => file,
        Err(e) => {
            drop(private_file);
            let _ = fs::remove_file(&private_path);
            return Err(e);
        }
    };
    private_file.write_all(private_pem.as_bytes())?;
    public_file.write_all(public_pem.as_bytes())?;

    Ok(format!(
        "wrote {} and {}\nfingerprint: {}",
        private_path.display(),
        public_path.display(),
        key_fingerprint(&public_key)?
    ))
}

/// Create `path` exclusively, failing if it already exists.
fn create_new(path: &Path, mode: u32) -> LicenseResult<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => {
            LicenseError::KeyError(format!("{} already exists", path.display()))
        }
        _ => LicenseError::IoError(e),
    })
}
