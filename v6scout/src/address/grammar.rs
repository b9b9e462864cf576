//! # IPv6 literal grammar
//!
//! An explicit recursive-descent matcher for IPv6 address literals. Every rule
//! of the grammar has its own method so edge cases can be exercised one by one:
//!
//! ```text
//! address         := full_form | compressed_form
//! hex_group       := HEXDIGIT{1,4}
//! full_form       := hex_group (":" hex_group){7}
//! compressed_form := head? "::" tail?            (head + tail <= 7 groups)
//! ipv4_tail       := OCTET "." OCTET "." OCTET "." OCTET   (counts as 2 groups)
//! zone_suffix     := "%" TOKEN
//! ```
//!
//! The matcher never anchors on the right. [`longest_match`] reports the
//! longest prefix, starting at a given byte offset, that forms a complete
//! literal. Whole-string validation is then "the longest prefix covers the
//! whole input", with a looser zone token, and the scanner reuses the same
//! entry point.
//!
//! A zone TOKEN depends on where the literal sits. Inside running text it is
//! ASCII alphanumerics, `_` and `-`, with a `.` allowed between them
//! (`eth0.100`), so punctuation after the literal is not swallowed. A
//! standalone literal takes any non-empty zone free of whitespace and `%`.
//!
//! All grammar characters are ASCII, so every offset produced here is a valid
//! `str` char boundary.

/// Maximum number of 16-bit groups in an address.
pub(crate) const MAX_GROUPS: usize = 8;

/// Maximum hex digits in one group.
const MAX_HEX_DIGITS: usize = 4;

/// Maximum decimal digits in one IPv4 octet.
const MAX_OCTET_DIGITS: usize = 3;

/// One syntactic piece of a literal, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece {
    /// A `1-4` hex digit group.
    Group(u16),
    /// A dotted-decimal tail standing for the last two groups.
    Ipv4([u8; 4]),
    /// The single `::` marker.
    Compression,
}

/// The longest complete literal found at some offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Match<'a> {
    pub(crate) start: usize,
    /// Exclusive end offset, zone suffix included.
    pub(crate) end: usize,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) zone: Option<&'a str>,
}

/// Returns `true` for bytes allowed inside a zone token embedded in text.
pub(crate) fn is_zone_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// How far a `%zone` suffix reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneRule {
    /// Zone bytes, with single dots between them.
    Embedded,
    /// Everything up to whitespace, a second `%` or the end of input.
    Standalone,
}

/// Finds the longest complete literal starting exactly at `start`.
///
/// Returns `None` when no prefix starting there is a valid address.
pub(crate) fn longest_match(input: &str, start: usize) -> Option<Match<'_>> {
    let mut parser = Parser::new(input, start);
    parser.address();
    parser.finish(ZoneRule::Embedded)
}

/// Matches `input` as a whole. Trailing content of any kind rejects it.
pub(crate) fn full_match(input: &str) -> Option<Match<'_>> {
    let mut parser = Parser::new(input, 0);
    parser.address();
    parser
        .finish(ZoneRule::Standalone)
        .filter(|m| m.end == input.len())
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    start: usize,
    pos: usize,
    pieces: Vec<Piece>,
    groups: usize,
    compressed: bool,
    /// `(end offset, piece count)` of the last complete state seen.
    best: Option<(usize, usize)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, start: usize) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            start,
            pos: start,
            pieces: Vec::with_capacity(MAX_GROUPS),
            groups: 0,
            compressed: false,
            best: None,
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    /// Group budget left for explicit groups: a `::` stands for at least one.
    fn limit(&self) -> usize {
        if self.compressed {
            MAX_GROUPS - 1
        } else {
            MAX_GROUPS
        }
    }

    fn is_complete(&self) -> bool {
        if self.compressed {
            self.groups < MAX_GROUPS
        } else {
            self.groups == MAX_GROUPS
        }
    }

    /// Records the current position if the pieces read so far form an address.
    fn mark(&mut self) {
        if self.is_complete() {
            self.best = Some((self.pos, self.pieces.len()));
        }
    }

    /// `address := leading "::"? (piece separator)*`
    fn address(&mut self) {
        if self.peek(0) == Some(b':') && self.peek(1) == Some(b':') {
            self.compression();
        }

        while self.groups < self.limit() {
            if self.groups + 2 <= self.limit() {
                if let Some(octets) = self.ipv4_tail() {
                    self.pieces.push(Piece::Ipv4(octets));
                    self.groups += 2;
                    self.mark();
                    // the dotted tail is always the last piece
                    break;
                }
            }

            let Some(group) = self.hex_group() else {
                break;
            };
            self.pieces.push(Piece::Group(group));
            self.groups += 1;
            self.mark();

            if self.groups >= self.limit() || !self.separator() {
                break;
            }
        }
    }

    /// Consumes `::`. Caller checks both colons are present.
    fn compression(&mut self) {
        self.pos += 2;
        self.compressed = true;
        self.pieces.push(Piece::Compression);
        self.mark();
    }

    /// `separator := "::" | ":"`
    ///
    /// A second `::` is left unconsumed, so it ends the match.
    fn separator(&mut self) -> bool {
        match (self.peek(0), self.peek(1)) {
            (Some(b':'), Some(b':')) if self.compressed => false,
            (Some(b':'), Some(b':')) => {
                self.compression();
                true
            }
            (Some(b':'), _) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// `hex_group := HEXDIGIT{1,4}`, taken greedily.
    fn hex_group(&mut self) -> Option<u16> {
        let mut value: u16 = 0;
        let mut digits = 0;

        while digits < MAX_HEX_DIGITS {
            let Some(digit) = self.peek(0).and_then(|b| (b as char).to_digit(16)) else {
                break;
            };
            value = (value << 4) | digit as u16;
            self.pos += 1;
            digits += 1;
        }

        (digits > 0).then_some(value)
    }

    /// `ipv4_tail := OCTET "." OCTET "." OCTET "." OCTET`
    ///
    /// Consumes nothing unless all four octets parse.
    fn ipv4_tail(&mut self) -> Option<[u8; 4]> {
        let checkpoint = self.pos;
        let mut octets = [0u8; 4];

        for (i, slot) in octets.iter_mut().enumerate() {
            if i > 0 {
                if self.peek(0) != Some(b'.') {
                    self.pos = checkpoint;
                    return None;
                }
                self.pos += 1;
            }
            match self.octet() {
                Some(v) => *slot = v,
                None => {
                    self.pos = checkpoint;
                    return None;
                }
            }
        }

        Some(octets)
    }

    /// `OCTET := DIGIT{1,3}` with a value of at most 255.
    fn octet(&mut self) -> Option<u8> {
        let mut value: u16 = 0;
        let mut digits = 0;

        while digits < MAX_OCTET_DIGITS {
            match self.peek(0) {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u16::from(b - b'0');
                    self.pos += 1;
                    digits += 1;
                }
                _ => break,
            }
        }

        if digits == 0 {
            return None;
        }
        u8::try_from(value).ok()
    }

    /// `zone_suffix := "%" TOKEN` right after the address ending at `end`.
    fn zone_at(&self, end: usize, rule: ZoneRule) -> Option<&'a str> {
        if self.bytes.get(end) != Some(&b'%') {
            return None;
        }
        let token_start = end + 1;
        let token_len = match rule {
            ZoneRule::Embedded => self.embedded_zone_len(token_start),
            ZoneRule::Standalone => self.input[token_start..]
                .find(|c: char| c.is_whitespace() || c == '%')
                .unwrap_or(self.input.len() - token_start),
        };

        (token_len > 0).then(|| &self.input[token_start..token_start + token_len])
    }

    /// Zone bytes from `from`; a `.` counts only between two of them.
    fn embedded_zone_len(&self, from: usize) -> usize {
        let token = &self.bytes[from..];
        let mut len = 0;
        while let Some(&b) = token.get(len) {
            if is_zone_byte(b) {
                len += 1;
            } else if b == b'.'
                && len > 0
                && token.get(len + 1).is_some_and(|n| is_zone_byte(*n))
            {
                len += 2;
            } else {
                break;
            }
        }
        len
    }

    fn finish(mut self, rule: ZoneRule) -> Option<Match<'a>> {
        let (address_end, piece_count) = self.best?;
        self.pieces.truncate(piece_count);

        let zone = self.zone_at(address_end, rule);
        let end = zone.map_or(address_end, |z| address_end + 1 + z.len());

        Some(Match {
            start: self.start,
            end,
            pieces: self.pieces,
            zone,
        })
    }
}
