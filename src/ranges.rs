//! Range notation
//!
//! Compact text form of a sparse integer set: comma-separated single values and hyphenated
//! inclusive ranges, e.g. `"3, 7-12, 40"`.
//!
//! [`parse`] never fails. A token which can not be read under the selected base is dropped,
//! [`parse_with_diagnostics`] additionally reports what was dropped and why. [`format`] renders
//! a set back in decimal, collapsing every run of consecutive values into `lo-hi`, so that
//! `parse(&format(&s), 10) == s`.
#[cfg(feature = "with_bincode")]
use bincode::{Decode, Encode};
#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

/// Sorted set of unsigned integers
///
/// Stored as sorted, disjoint, non-adjacent inclusive intervals, so wide ranges cost nothing and
/// membership is a binary search. Iterates values in strictly increasing order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "with_serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "with_bincode", derive(Decode, Encode))]
pub struct RangeSet {
    runs: Vec<(u32, u32)>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every value of `lo..=hi`, bounds are swapped if reversed
    pub fn insert_range(&mut self, lo: u32, hi: u32) {
        let (mut lo, mut hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        // first run which may touch or follow [lo, hi]
        let start = self
            .runs
            .partition_point(|&(_, run_hi)| run_hi.saturating_add(1) < lo);
        let mut end = start;
        while end < self.runs.len() && self.runs[end].0 <= hi.saturating_add(1) {
            lo = lo.min(self.runs[end].0);
            hi = hi.max(self.runs[end].1);
            end += 1;
        }
        self.runs.splice(start..end, core::iter::once((lo, hi)));
    }

    #[inline]
    pub fn insert(&mut self, value: u32) {
        self.insert_range(value, value);
    }

    pub fn contains(&self, value: u32) -> bool {
        let idx = self.runs.partition_point(|&(_, hi)| hi < value);
        self.runs.get(idx).is_some_and(|&(lo, _)| lo <= value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of values in the set
    pub fn len(&self) -> u64 {
        self.runs
            .iter()
            .map(|&(lo, hi)| u64::from(hi - lo) + 1)
            .sum()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Maximal runs of consecutive values as `(lo, hi)` pairs
    pub fn runs(&self) -> &[(u32, u32)] {
        &self.runs
    }

    /// Values in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.iter().flat_map(|&(lo, hi)| lo..=hi)
    }
}

impl FromIterator<u32> for RangeSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl RangeSet {
    fn write_runs(
        &self,
        f: &mut core::fmt::Formatter<'_>,
        value: fn(&mut core::fmt::Formatter<'_>, u32) -> core::fmt::Result,
    ) -> core::fmt::Result {
        for (i, &(lo, hi)) in self.runs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            value(f, lo)?;
            if lo != hi {
                write!(f, "-")?;
                value(f, hi)?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for RangeSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.write_runs(f, |f, v| write!(f, "{}", v))
    }
}

impl core::fmt::LowerHex for RangeSet {
    /// `0x`-prefixed hex bytes, e.g. `0x0a-0x0c, 0xff`
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.write_runs(f, |f, v| write!(f, "{:#04x}", v))
    }
}

/// Why a token was dropped
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeErrorKind {
    /// not a number in the selected base
    InvalidNumber,
    /// a range with a missing bound, e.g. `"4-"`
    EmptyBound,
}

impl core::fmt::Display for RangeErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &str = match self {
            RangeErrorKind::InvalidNumber => "INVALID NUMBER",
            RangeErrorKind::EmptyBound => "EMPTY RANGE BOUND",
        };
        write!(f, "{}", msg)
    }
}

/// A dropped token
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RangeDiagnostic {
    /// zero-based position of the token among the comma-separated tokens
    pub position: usize,
    pub token: String,
    pub kind: RangeErrorKind,
}

impl core::fmt::Display for RangeDiagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "token {} {:?}: {}", self.position, self.token, self.kind)
    }
}

fn strip_hex(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a single unsigned integer
///
/// base 0 follows the C literal conventions: `0x`/`0X` prefix is hex, a leading `0` is octal,
/// anything else is decimal. With base 16 an optional `0x` prefix is accepted. Signs are not.
fn parse_number(s: &str, base: u32) -> Result<u32, RangeErrorKind> {
    let s = s.trim();
    if s.is_empty() {
        return Err(RangeErrorKind::EmptyBound);
    }
    let (digits, radix) = match base {
        0 => {
            if let Some(rest) = strip_hex(s) {
                (rest, 16)
            } else if s.len() > 1 && s.starts_with('0') {
                (&s[1..], 8)
            } else {
                (s, 10)
            }
        }
        16 => (strip_hex(s).unwrap_or(s), 16),
        2..=36 => (s, base),
        _ => return Err(RangeErrorKind::InvalidNumber),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(RangeErrorKind::InvalidNumber);
    }
    u32::from_str_radix(digits, radix).map_err(|_| RangeErrorKind::InvalidNumber)
}

/// Parse a comma-separated token into `(lo, hi)`
fn parse_token(token: &str, base: u32) -> Result<(u32, u32), RangeErrorKind> {
    if let Some((left, rest)) = token.split_once('-') {
        // "a-b-c" spans from the first to the last bound
        let right = rest.rsplit('-').next().unwrap_or(rest);
        let lo = parse_number(left, base)?;
        let hi = parse_number(right, base)?;
        Ok((lo, hi))
    } else {
        let v = parse_number(token, base)?;
        Ok((v, v))
    }
}

/// Parse range notation, reporting every dropped token
pub fn parse_with_diagnostics(text: &str, base: u32) -> (RangeSet, Vec<RangeDiagnostic>) {
    let mut set = RangeSet::new();
    let mut diagnostics = Vec::new();
    for (position, token) in text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        match parse_token(token, base) {
            Ok((lo, hi)) => set.insert_range(lo, hi),
            Err(kind) => {
                log::warn!("range token {:?} dropped: {}", token, kind);
                diagnostics.push(RangeDiagnostic {
                    position,
                    token: token.to_owned(),
                    kind,
                });
            }
        }
    }
    (set, diagnostics)
}

/// Parse range notation, silently dropping tokens which can not be read
///
/// `base` is the numeric radix (2..=36), 0 selects C-literal auto-detection
pub fn parse(text: &str, base: u32) -> RangeSet {
    parse_with_diagnostics(text, base).0
}

/// Render a set in decimal range notation, e.g. `"3, 7-12, 40"`
pub fn format(set: &RangeSet) -> String {
    set.to_string()
}

/// Render a set in hex range notation, e.g. `"0x03, 0x07-0x0c"`, readable back with base 16 or 0
pub fn format_hex(set: &RangeSet) -> String {
    std::format!("{:x}", set)
}
