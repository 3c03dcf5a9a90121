//! One-shot commands: hash, sign, and verify a single file.

use anyhow::{bail, Context, Result};
use blink_core::{
    attest_file, hash_file, verify_detailed, BlinkConfig, SignedHash, Signer, Timestamp, Verdict,
};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SignArgs {
    /// File to sign
    pub path: PathBuf,
    /// Base58 private key
    #[arg(long)]
    pub key: Option<String>,
    /// Environment variable to read the private key from when --key is absent
    /// (defaults to the config's `private_key_env`, then BLINK_PRIVATE_KEY)
    #[arg(long)]
    pub key_env: Option<String>,
    /// Path to a blink.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write the proof JSON here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// File whose current contents should match the proof
    #[arg(long, conflicts_with = "digest")]
    pub file: Option<PathBuf>,
    /// Hex content digest to check instead of a file
    #[arg(long)]
    pub digest: Option<String>,
    /// Proof JSON as written by `blink sign`
    #[arg(long)]
    pub proof: Option<PathBuf>,
    /// Attestation time in milliseconds
    #[arg(long, conflicts_with = "proof")]
    pub time: Option<i64>,
    /// Base64 signed hash
    #[arg(long, conflicts_with = "proof")]
    pub signed_hash: Option<String>,
    /// Base58 public key of the signer
    #[arg(long)]
    pub public_key: String,
}

/// Handle `blink hash`.
pub fn cmd_hash(path: PathBuf) -> Result<()> {
    let attestation =
        attest_file(&path).with_context(|| format!("failed to hash {}", path.display()))?;
    println!("content: {}", attestation.content);
    println!("time: {}", attestation.time);
    println!("hash: {}", attestation.bound);
    Ok(())
}

/// Pick the key source: `--key`, then `--key-env`, then the config file's
/// `private_key_env`, which defaults to `BLINK_PRIVATE_KEY`.
pub fn signer_for(args: &SignArgs) -> Result<Signer> {
    if let Some(key) = &args.key {
        return Ok(Signer::new(key.clone()));
    }
    if let Some(var) = &args.key_env {
        return Ok(Signer::from_env_var(var));
    }
    let config = match &args.config {
        Some(path) => BlinkConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BlinkConfig::default(),
    };
    Ok(Signer::from_env_var(&config.private_key_env))
}

/// Handle `blink sign`.
pub fn cmd_sign(args: SignArgs) -> Result<()> {
    let signer = signer_for(&args)?;
    let signed = signer
        .sign(&args.path)
        .with_context(|| format!("failed to sign {}", args.path.display()))?;
    let json = serde_json::to_string_pretty(&signed)?;

    match args.output {
        Some(out) => {
            fs::write(&out, json)
                .with_context(|| format!("failed to write proof to {}", out.display()))?;
            eprintln!("{} Proof written to {}", "✓".green(), out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Handle `blink verify`. Fails unless the verdict is valid.
pub fn cmd_verify(args: VerifyArgs) -> Result<Verdict> {
    let proof = match &args.proof {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read proof {}", path.display()))?;
            let proof: SignedHash =
                serde_json::from_str(&text).context("failed to parse proof JSON")?;
            Some(proof)
        }
        None => None,
    };

    let digest = match (&args.file, &args.digest, &proof) {
        (Some(file), _, _) => hash_file(file)
            .with_context(|| format!("failed to hash {}", file.display()))?
            .to_hex(),
        (None, Some(digest), _) => digest.clone(),
        (None, None, Some(proof)) => proof.content_hash.to_hex(),
        (None, None, None) => bail!("one of --file, --digest, or --proof is required"),
    };

    let (time, signed_hash) = match (proof, args.time, args.signed_hash) {
        (Some(proof), _, _) => (proof.time, proof.signed_hash),
        (None, Some(time), Some(signed_hash)) => (Timestamp::from_millis(time), signed_hash),
        _ => bail!("--time and --signed-hash are required without --proof"),
    };

    let verdict = verify_detailed(&digest, time, &signed_hash, &args.public_key);
    if !verdict.is_valid() {
        bail!("verification failed: {verdict}");
    }
    println!("{} Signature valid for {} at {}", "✓".green().bold(), digest, time);
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_args(config: Option<PathBuf>) -> SignArgs {
        SignArgs {
            path: PathBuf::from("/nonexistent/file"),
            key: None,
            key_env: None,
            config,
            output: None,
        }
    }

    #[test]
    fn test_signer_uses_config_key_env() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("blink.toml");
        fs::write(&config, "private_key_env = \"BLINK_TEST_UNSET_CONFIG_KEY\"\n").unwrap();

        let signer = signer_for(&sign_args(Some(config))).unwrap();
        let err = signer.sign(std::path::Path::new("/nonexistent/file")).unwrap_err();
        assert!(err.to_string().contains("BLINK_TEST_UNSET_CONFIG_KEY"));
    }

    #[test]
    fn test_key_env_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("blink.toml");
        fs::write(&config, "private_key_env = \"BLINK_TEST_UNSET_CONFIG_KEY\"\n").unwrap();

        let mut args = sign_args(Some(config));
        args.key_env = Some("BLINK_TEST_UNSET_FLAG_KEY".to_string());
        let err = signer_for(&args)
            .unwrap()
            .sign(std::path::Path::new("/nonexistent/file"))
            .unwrap_err();
        assert!(err.to_string().contains("BLINK_TEST_UNSET_FLAG_KEY"));
    }

    #[test]
    fn test_signer_missing_config_fails() {
        let args = sign_args(Some(PathBuf::from("/nonexistent/blink.toml")));
        assert!(signer_for(&args).is_err());
    }

    #[test]
    fn test_verify_requires_digest_source() {
        let args = VerifyArgs {
            file: None,
            digest: None,
            proof: None,
            time: Some(1),
            signed_hash: Some("AAAA".to_string()),
            public_key: "key".to_string(),
        };
        let err = cmd_verify(args).unwrap_err();
        assert!(err.to_string().contains("--file, --digest, or --proof"));
    }

    #[test]
    fn test_verify_requires_signature_without_proof() {
        let args = VerifyArgs {
            file: None,
            digest: Some("5d41402abc4b2a76b9719d911017c592".to_string()),
            proof: None,
            time: None,
            signed_hash: None,
            public_key: "key".to_string(),
        };
        let err = cmd_verify(args).unwrap_err();
        assert!(err.to_string().contains("--time and --signed-hash"));
    }

    #[test]
    fn test_verify_reports_malformed_input() {
        let args = VerifyArgs {
            file: None,
            digest: Some("5d41402abc4b2a76b9719d911017c592".to_string()),
            proof: None,
            time: Some(1_700_000_000_000),
            signed_hash: Some("not base64!".to_string()),
            public_key: "key".to_string(),
        };
        let err = cmd_verify(args).unwrap_err();
        assert!(err.to_string().contains("malformed input"));
    }
}
