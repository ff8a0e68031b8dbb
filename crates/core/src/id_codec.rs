//! Opaque public identifiers.
//!
//! Internal ids are 128-bit UUIDs. Externally they travel as short tokens:
//! the UUID is split into eight big-endian `u16` words and the words are
//! encoded with a salted positional alphabet (the hashids construction).
//! The alphabet leaves out `0`, `O`, `I` and `l` so tokens survive being
//! read aloud or copied by hand.
//!
//! Tokens are stable for as long as the secret is. Rotating the secret
//! invalidates every token ever handed out.

use std::fmt;

use uuid::Uuid;

/// Output alphabet. No `0`, `O`, `I`, `l`.
const ALPHABET: &str = "abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ123456789";

/// Characters reserved to separate encoded numbers.
const SEPARATORS: &str = "cfhistuCFHISTU";

const SEP_DIV: f64 = 3.5;
const GUARD_DIV: f64 = 12.0;

/// Number of `u16` words in a 128-bit id.
const WORDS: usize = 8;

pub const DEFAULT_MIN_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdCodecError {
    #[error("codec secret must not be empty")]
    EmptySecret,

    #[error("not a well-formed 128-bit identifier")]
    InvalidInternalId,

    #[error("malformed identifier token")]
    InvalidToken,
}

/// Codec settings, read from `ID_CODEC_SECRET` / `ID_CODEC_MIN_LENGTH`.
#[derive(Clone)]
pub struct IdCodecConfig {
    pub secret: String,
    pub min_length: usize,
}

impl fmt::Debug for IdCodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdCodecConfig")
            .field("secret", &"<redacted>")
            .field("min_length", &self.min_length)
            .finish()
    }
}

/// Bidirectional mapping between UUIDs and opaque tokens.
///
/// Built once at startup and shared read-only; every method is pure.
pub struct IdCodec {
    alphabet: Vec<char>,
    salt: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
    min_length: usize,
}

impl fmt::Debug for IdCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdCodec")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}

impl IdCodec {
    pub fn new(config: &IdCodecConfig) -> Result<Self, IdCodecError> {
        let salt: Vec<char> = config.secret.chars().collect();
        if salt.is_empty() {
            return Err(IdCodecError::EmptySecret);
        }

        let mut alphabet: Vec<char> = ALPHABET.chars().collect();
        let mut separators: Vec<char> = SEPARATORS
            .chars()
            .filter(|c| alphabet.contains(c))
            .collect();
        alphabet.retain(|c| !separators.contains(c));

        shuffle(&mut separators, &salt);

        if separators.is_empty() || alphabet.len() as f64 / separators.len() as f64 > SEP_DIV {
            let mut wanted = (alphabet.len() as f64 / SEP_DIV).ceil() as usize;
            if wanted == 1 {
                wanted += 1;
            }
            if wanted > separators.len() {
                let diff = wanted - separators.len();
                separators.extend(alphabet.drain(..diff));
            } else {
                separators.truncate(wanted);
            }
        }

        shuffle(&mut alphabet, &salt);

        let guard_count = (alphabet.len() as f64 / GUARD_DIV).ceil() as usize;
        let guards: Vec<char> = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            alphabet,
            salt,
            separators,
            guards,
            min_length: config.min_length,
        })
    }

    // -----------------------------------------------------------------------
    // Public contract
    // -----------------------------------------------------------------------

    /// Encode an id. Deterministic for a given secret and minimum length.
    pub fn encode(&self, id: Uuid) -> String {
        let numbers: Vec<u64> = id
            .as_bytes()
            .chunks_exact(2)
            .map(|pair| u64::from(u16::from_be_bytes([pair[0], pair[1]])))
            .collect();
        self.encode_numbers(&numbers)
    }

    /// Encode an id given in textual form.
    pub fn encode_str(&self, raw: &str) -> Result<String, IdCodecError> {
        let id = Uuid::parse_str(raw.trim()).map_err(|_| IdCodecError::InvalidInternalId)?;
        Ok(self.encode(id))
    }

    /// Inverse of [`IdCodec::encode`].
    ///
    /// Only tokens that this codec would itself produce are accepted, so a
    /// decode never yields an id whose encoding differs from the input.
    pub fn decode(&self, token: &str) -> Result<Uuid, IdCodecError> {
        let numbers = self
            .decode_numbers(token)
            .ok_or(IdCodecError::InvalidToken)?;
        if numbers.len() != WORDS {
            return Err(IdCodecError::InvalidToken);
        }

        let mut bytes = [0u8; 16];
        for (i, n) in numbers.into_iter().enumerate() {
            let word = u16::try_from(n).map_err(|_| IdCodecError::InvalidToken)?;
            bytes[i * 2..i * 2 + 2].copy_from_slice(&word.to_be_bytes());
        }
        Ok(Uuid::from_bytes(bytes))
    }

    /// Accept either a raw UUID or a token. Raw parsing is tried first.
    pub fn resolve(&self, input: &str) -> Option<Uuid> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Uuid::parse_str(input)
            .ok()
            .or_else(|| self.decode(input).ok())
    }

    pub fn is_token(&self, candidate: &str) -> bool {
        self.decode(candidate).is_ok()
    }

    // -----------------------------------------------------------------------
    // Number encoding
    // -----------------------------------------------------------------------

    fn encode_numbers(&self, numbers: &[u64]) -> String {
        let numbers_hash: u64 = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| n % (i as u64 + 100))
            .sum();

        let mut alphabet = self.alphabet.clone();
        let lottery = alphabet[(numbers_hash % alphabet.len() as u64) as usize];

        let mut result = vec![lottery];
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());

        for (i, &number) in numbers.iter().enumerate() {
            buffer.clear();
            buffer.push(lottery);
            buffer.extend_from_slice(&self.salt);
            buffer.extend_from_slice(&alphabet);
            let round_salt = buffer[..alphabet.len()].to_vec();
            shuffle(&mut alphabet, &round_salt);

            let encoded = to_alphabet(number, &alphabet);
            result.extend_from_slice(&encoded);

            if i + 1 < numbers.len() {
                let folded = number % (u64::from(encoded[0]) + i as u64);
                let idx = (folded % self.separators.len() as u64) as usize;
                result.push(self.separators[idx]);
            }
        }

        if result.len() < self.min_length {
            let idx = ((numbers_hash + u64::from(result[0])) % self.guards.len() as u64) as usize;
            result.insert(0, self.guards[idx]);

            if result.len() < self.min_length {
                let idx =
                    ((numbers_hash + u64::from(result[2])) % self.guards.len() as u64) as usize;
                result.push(self.guards[idx]);
            }
        }

        let half = alphabet.len() / 2;
        while result.len() < self.min_length {
            let round_salt = alphabet.clone();
            shuffle(&mut alphabet, &round_salt);

            let mut padded = Vec::with_capacity(alphabet.len() + result.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&result);
            padded.extend_from_slice(&alphabet[..half]);
            result = padded;

            let excess = result.len().saturating_sub(self.min_length);
            if excess > 0 {
                let start = excess / 2;
                result = result[start..start + self.min_length].to_vec();
            }
        }

        result.into_iter().collect()
    }

    fn decode_numbers(&self, token: &str) -> Option<Vec<u64>> {
        let chars: Vec<char> = token.chars().collect();
        if chars.is_empty() {
            return None;
        }

        let parts: Vec<&[char]> = chars.split(|c| self.guards.contains(c)).collect();
        let core = match parts.len() {
            2 | 3 => parts[1],
            _ => parts[0],
        };
        let (&lottery, body) = core.split_first()?;

        let mut alphabet = self.alphabet.clone();
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        let mut numbers = Vec::new();

        for chunk in body.split(|c| self.separators.contains(c)) {
            buffer.clear();
            buffer.push(lottery);
            buffer.extend_from_slice(&self.salt);
            buffer.extend_from_slice(&alphabet);
            let round_salt = buffer[..alphabet.len()].to_vec();
            shuffle(&mut alphabet, &round_salt);

            numbers.push(from_alphabet(chunk, &alphabet)?);
        }

        // Reject anything this codec would not have produced itself.
        if self.encode_numbers(&numbers) != token {
            return None;
        }
        Some(numbers)
    }
}

// ---------------------------------------------------------------------------
// Alphabet primitives
// ---------------------------------------------------------------------------

/// Deterministic salt-driven permutation.
fn shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }
    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..alphabet.len()).rev() {
        let s = salt[v] as usize;
        p += s;
        let j = (s + v + p) % i;
        alphabet.swap(i, j);
        v = (v + 1) % salt.len();
    }
}

fn to_alphabet(mut number: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    out.reverse();
    out
}

fn from_alphabet(chunk: &[char], alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    chunk.iter().try_fold(0u64, |acc, c| {
        let pos = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(pos)
    })
}
