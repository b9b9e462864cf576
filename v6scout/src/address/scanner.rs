//! # Literal scanner
//!
//! Walks arbitrary text once, left to right, and yields every maximal IPv6
//! literal it contains. At each candidate start the grammar reports its longest
//! match; the match is kept only if it is not glued to neighbouring characters
//! that would make it a fragment of some longer token.
//!
//! Boundary rules:
//! - a match may not start right after an alphanumeric character, `_`, `:`,
//!   `.` or `%`;
//! - a match may not end right before an alphanumeric character, `_`, `:`,
//!   `%`, or a `.` followed by a digit.
//!
//! A start whose longest match is rejected is abandoned as a whole, and the
//! scan resumes after the run of address-like characters it sits in, so
//! `2001:db8:::1` yields nothing at all instead of `2001:db8::` or `::1`.

use super::grammar;

/// Iterator over the IPv6 literals of a text, in order of appearance.
///
/// Created by [`find_ipv6_iter`](crate::address::find_ipv6_iter).
#[derive(Debug, Clone)]
pub struct Ipv6Matches<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Ipv6Matches<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Ipv6Matches<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            let b = bytes[start];

            if !(b.is_ascii_hexdigit() || b == b':') || !starts_cleanly(self.text, start) {
                self.pos = next_char(self.text, start);
                continue;
            }

            match grammar::longest_match(self.text, start) {
                Some(m) if ends_cleanly(self.text, m.end) => {
                    self.pos = m.end;
                    return Some(&self.text[start..m.end]);
                }
                _ => self.pos = skip_run(self.text, start),
            }
        }

        None
    }
}

/// Characters that glue onto a literal from the left.
fn is_leading_glue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '.' | '%')
}

fn starts_cleanly(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !is_leading_glue(c))
}

fn ends_cleanly(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    match rest.next() {
        None => true,
        Some('.') => !rest.next().is_some_and(|c| c.is_ascii_digit()),
        Some(c) => !(c.is_alphanumeric() || matches!(c, '_' | ':' | '%')),
    }
}

fn next_char(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

/// Skips the run of glue characters containing `start`. Any start inside the
/// run would fail [`starts_cleanly`].
fn skip_run(text: &str, start: usize) -> usize {
    text[start..]
        .char_indices()
        .find(|(_, c)| !is_leading_glue(*c))
        .map_or(text.len(), |(i, _)| start + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<&str> {
        Ipv6Matches::new(text).collect()
    }

    #[test]
    fn test_scanner_mixed_text() {
        let found = scan("text 2001:db8::1 more fe80::1%eth0 junk 2001:db8:::1 end");
        assert_eq!(found, vec!["2001:db8::1", "fe80::1%eth0"]);
    }

    #[test]
    fn test_scanner_multiline_unicode_text() {
        let text = "
        Здесь есть несколько адресов:
        2001:db8::1 - это localhost
        fe80::1%eth0 - link-local
        А также 2001:0db8:85a3:0000:0000:8a2e:0370:7334
        И невалидный 2001:db8:::1 должен игнорироваться.
        ";
        assert_eq!(
            scan(text),
            vec![
                "2001:db8::1",
                "fe80::1%eth0",
                "2001:0db8:85a3:0000:0000:8a2e:0370:7334"
            ]
        );
    }

    #[test]
    fn test_scanner_empty_and_plain_text() {
        assert!(scan("").is_empty());
        assert!(scan("no addresses, just a cafe and some beef").is_empty());
        assert!(scan("192.168.1.1 (not IPv6)").is_empty());
    }

    #[test]
    fn test_scanner_keeps_duplicates_in_order() {
        assert_eq!(scan("::1 ::2 ::1"), vec!["::1", "::2", "::1"]);
    }

    #[test]
    fn test_scanner_punctuation_boundaries() {
        assert_eq!(scan("(::1), [fe80::2]; <2001:db8::3>."), vec!["::1", "fe80::2", "2001:db8::3"]);
        assert_eq!(scan("ends here ::ffff:192.0.2.128."), vec!["::ffff:192.0.2.128"]);
        assert_eq!(scan("dash-2001:db8::1-dash"), vec!["2001:db8::1"]);
    }

    #[test]
    fn test_scanner_rejects_glued_fragments() {
        assert!(scan("2001:db8:85a3::8a2e:370:7334:extra").is_empty());
        assert!(scan("x2001:db8::1").is_empty());
        assert!(scan("2001:db8::1g").is_empty());
        assert!(scan("2001:db8::12345").is_empty());
        assert!(scan("::ffff:256.0.2.128").is_empty());
        assert!(scan("::ffff:192.0.2").is_empty());
        assert!(scan("fe80::1% eth0").is_empty());
        assert!(scan("адрес2001:db8::1").is_empty());
    }

    #[test]
    fn test_scanner_recovers_after_rejected_run() {
        assert_eq!(scan("2001:db8:::1 ::1"), vec!["::1"]);
        assert_eq!(scan("1:2:3:4:5:6:7:8:9 then fe80::9"), vec!["fe80::9"]);
    }

    #[test]
    fn test_scanner_adjacent_separated_by_space() {
        assert_eq!(scan("::1 ::"), vec!["::1", "::"]);
        assert_eq!(scan("fe80::1%eth0 fe80::1%eth1"), vec!["fe80::1%eth0", "fe80::1%eth1"]);
    }

    #[test]
    fn test_scanner_vlan_zone() {
        assert_eq!(scan("iface fe80::1%eth0.100 up"), vec!["fe80::1%eth0.100"]);
        assert_eq!(scan("reached fe80::1%eth0.100."), vec!["fe80::1%eth0.100"]);
        assert_eq!(scan("on fe80::1%eth0."), vec!["fe80::1%eth0"]);
    }
}
