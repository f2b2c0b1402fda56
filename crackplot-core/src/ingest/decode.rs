//! Status record decoder
//!
//! Decodes single lines of hashcat `--status-json` output. Each line is an
//! independent JSON object; a typical record looks like:
//!
//! ```json
//! {"status": 3, "progress": [512000, 14344384], "recovered_hashes": [12, 6494],
//!  "time_start": 1695892800, "guess": {"guess_base": "wordlists/rockyou.txt",
//!  "guess_mod": "rules/best64.rule"}}
//! ```
//!
//! # Error Handling
//!
//! Decoding a line never fails the caller. A line that does not yield a
//! record is classified as a [`DecodeFailure`] that the series builder
//! counts and skips:
//!
//! - **Empty**: Blank or whitespace-only lines, common around session
//!   restarts, are ignored entirely.
//!
//! - **Malformed**: Anything that is not a JSON object. Producers mix
//!   banner text and warnings into the same stream when misconfigured, and
//!   wrong-typed fields land here too.
//!
//! - **IncompleteFields**: A well-formed object missing one of the fields
//!   a sample needs. Records written while the producer is still in
//!   self-test can lack the progress counters.
//!
//! Unknown fields are ignored, so records from newer producer versions
//! decode as long as the core fields are present.

use serde::Deserialize;

/// Why a line did not produce a record.
///
/// These are counted outcomes, not [`crate::Error`] values: ingestion
/// continues past them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Blank or whitespace-only line
    Empty,
    /// Not a well-formed JSON object
    Malformed,
    /// Valid JSON object missing a required field
    IncompleteFields,
}

impl DecodeFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeFailure::Empty => "empty",
            DecodeFailure::Malformed => "malformed",
            DecodeFailure::IncompleteFields => "incomplete_fields",
        }
    }
}

/// Attack-phase fields pulled from the record's `guess` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDescriptor {
    /// Base identifier (wordlist or mask), after the potfile alias rewrite
    pub base: String,
    /// Modifier identifier (rule file), when present
    pub modifier: Option<String>,
}

impl PhaseDescriptor {
    fn from_guess(guess: RawGuess) -> Option<Self> {
        let base = guess.guess_base?;
        // Loopback runs name a scratch potfile; report them as the potfile
        // they are.
        let base = base.replace("autocat_new_cracked_potfile", "potfile");
        Some(Self {
            base,
            modifier: guess.guess_mod,
        })
    }

    /// True for phases that replay previously recovered plaintexts.
    pub fn is_potfile(&self) -> bool {
        self.base.contains("potfile")
    }

    /// Short display label: basenames of the base and modifier.
    pub fn label(&self) -> String {
        match &self.modifier {
            Some(modifier) => format!("{} + {}", basename(&self.base), basename(modifier)),
            None => basename(&self.base).to_string(),
        }
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// One decoded status record.
///
/// Decoding is pure per line; the series builder owns accumulation across
/// records (work-unit totals, elapsed time, phase numbering).
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    /// Producer status code (see [`status_name`])
    pub status: i64,
    /// Candidates tested in the current phase so far
    pub progress: u64,
    /// Recovered hashes
    pub recovered: u64,
    /// Total hashes under attack
    pub total: u64,
    /// Unix epoch when the producing session started
    pub time_start: i64,
    /// Attack-phase fields, when the record carries a `guess` object
    pub phase: Option<PhaseDescriptor>,
}

/// Human name for well-known producer status codes.
pub fn status_name(code: i64) -> &'static str {
    match code {
        0 => "initializing",
        1 => "autotune",
        2 => "selftest",
        3 => "running",
        4 => "paused",
        5 => "exhausted",
        6 => "cracked",
        7 => "aborted",
        8 => "quit",
        9 => "bypass",
        _ => "unknown",
    }
}

// ============================================
// Raw JSON record types (serde deserialization)
// ============================================

/// Represents a single status line before field validation.
///
/// Uses `#[serde(default)]` so absent fields classify as incomplete rather
/// than failing deserialization outright.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawStatus {
    status: Option<i64>,
    progress: Vec<u64>,
    recovered_hashes: Vec<u64>,
    time_start: Option<i64>,
    guess: Option<RawGuess>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGuess {
    guess_base: Option<String>,
    guess_mod: Option<String>,
}

/// Decode one line of status output into a record.
pub fn decode_line(line: &str) -> Result<StatusRecord, DecodeFailure> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(DecodeFailure::Empty);
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|_| DecodeFailure::Malformed)?;
    if !value.is_object() {
        return Err(DecodeFailure::Malformed);
    }

    let raw: RawStatus = serde_json::from_value(value).map_err(|_| DecodeFailure::Malformed)?;

    let status = raw.status.ok_or(DecodeFailure::IncompleteFields)?;
    let progress = raw
        .progress
        .first()
        .copied()
        .ok_or(DecodeFailure::IncompleteFields)?;
    if raw.recovered_hashes.len() < 2 {
        return Err(DecodeFailure::IncompleteFields);
    }
    let time_start = raw.time_start.ok_or(DecodeFailure::IncompleteFields)?;

    Ok(StatusRecord {
        status,
        progress,
        recovered: raw.recovered_hashes[0],
        total: raw.recovered_hashes[1],
        time_start,
        phase: raw.guess.and_then(PhaseDescriptor::from_guess),
    })
}
