//! Content hashing for file equality checks
//!
//! Files are streamed through the hasher in fixed-size blocks so that large
//! files never have to be held in memory. Digests are recomputed on every
//! cycle and never stored.

use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::{IoContext, SyncError};

/// Read block size in bytes
pub const BLOCK_SIZE: usize = 4096;

/// Hash algorithm used to fingerprint file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
	/// SHA-256 (default)
	#[default]
	Sha256,

	/// BLAKE3, 256-bit output
	Blake3,
}

impl HashAlgorithm {
	/// Digest length in bytes
	pub fn output_size(self) -> usize {
		match self {
			Self::Sha256 => 32,
			Self::Blake3 => blake3::OUT_LEN,
		}
	}
}

impl FromStr for HashAlgorithm {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"sha256" | "sha-256" => Ok(Self::Sha256),
			"blake3" => Ok(Self::Blake3),
			_ => Err(format!("Unknown hash algorithm: {}. Valid options: sha256, blake3", s)),
		}
	}
}

impl fmt::Display for HashAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sha256 => write!(f, "sha256"),
			Self::Blake3 => write!(f, "blake3"),
		}
	}
}

/// Content fingerprint of a file at the moment it was read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
	algorithm: HashAlgorithm,
	bytes: Vec<u8>,
}

impl Digest {
	pub fn algorithm(&self) -> HashAlgorithm {
		self.algorithm
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn to_hex(&self) -> String {
		hex::encode(&self.bytes)
	}
}

impl fmt::Display for Digest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

enum State {
	Sha256(sha2::Sha256),
	Blake3(Box<blake3::Hasher>),
}

impl State {
	fn new(algorithm: HashAlgorithm) -> Self {
		match algorithm {
			HashAlgorithm::Sha256 => State::Sha256(sha2::Sha256::new()),
			HashAlgorithm::Blake3 => State::Blake3(Box::new(blake3::Hasher::new())),
		}
	}

	fn update(&mut self, data: &[u8]) {
		match self {
			State::Sha256(h) => h.update(data),
			State::Blake3(h) => {
				h.update(data);
			}
		}
	}

	fn finalize(self) -> Vec<u8> {
		match self {
			State::Sha256(h) => h.finalize().to_vec(),
			State::Blake3(h) => h.finalize().as_bytes().to_vec(),
		}
	}
}

/// Hash everything a reader yields, `BLOCK_SIZE` bytes at a time
fn digest_reader<R: Read>(mut reader: R, algorithm: HashAlgorithm) -> io::Result<Digest> {
	let mut state = State::new(algorithm);
	let mut buffer = [0u8; BLOCK_SIZE];

	loop {
		let n = match reader.read(&mut buffer) {
			Ok(0) => break,
			Ok(n) => n,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		state.update(&buffer[..n]);
	}

	Ok(Digest { algorithm, bytes: state.finalize() })
}

/// Hash in-memory data
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> Digest {
	let mut state = State::new(algorithm);
	state.update(data);
	Digest { algorithm, bytes: state.finalize() }
}

/// Hash a file's content
///
/// Fails with `SyncError::Io` if the file is missing, unreadable, or goes
/// away while being read.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<Digest, SyncError> {
	let file = File::open(path).with_path(path, "hashing")?;
	digest_reader(file, algorithm).with_path(path, "hashing")
}

/// Compare two files by content digest
pub fn files_equal(a: &Path, b: &Path, algorithm: HashAlgorithm) -> Result<bool, SyncError> {
	Ok(digest_file(a, algorithm)? == digest_file(b, algorithm)?)
}


// vim: ts=4
