use base64::Engine;
use sha2::{Digest, Sha256};

use super::ImportError;
use crate::pipeline::formats::RawTranscript;
use crate::pipeline::transcript::CanonicalTranscript;

/// The two identities of an imported artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHashes {
    /// Identity of the exact artifact (format plus native content).
    pub match_hash: String,
    /// Identity of the logical match, shared by every encoding of it.
    pub canonical_hash: String,
}

/// SHA-256 of a string, base64-encoded
pub fn compute_content_hash(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(hash)
}

pub fn compute_match_hash(raw: &RawTranscript) -> Result<String, ImportError> {
    Ok(compute_content_hash(&raw.native_digest_input()?))
}

pub fn compute_canonical_hash(transcript: &CanonicalTranscript) -> String {
    compute_content_hash(&transcript.identity_string())
}

pub fn compute_hashes(
    raw: &RawTranscript,
    transcript: &CanonicalTranscript,
) -> Result<MatchHashes, ImportError> {
    Ok(MatchHashes {
        match_hash: compute_match_hash(raw)?,
        canonical_hash: compute_canonical_hash(transcript),
    })
}
