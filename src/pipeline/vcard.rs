//! vCard source adapter.
//!
//! Accepts vCard 2.1, 3.0 and 4.0 component streams. Parsing happens in two
//! layers:
//!
//! 1. **Stream layer**: unfold continuation lines (including vCard 2.1
//!    quoted-printable soft breaks) and split the file into
//!    `BEGIN:VCARD` … `END:VCARD` components. Anything that is not a vCard
//!    at this level (invalid UTF-8, no component at all, stray text between
//!    components) is fatal.
//! 2. **Component layer**: parse each content line, decode
//!    quoted-printable values, and map properties onto a [`ContactRecord`]. A malformed component only fails itself: it is
//!    reported as a [`RecordError`] and the remaining contacts are kept.
//!
//! Multi-valued typed properties (`TEL`, `EMAIL`, `ADR`) produce one field
//! per occurrence, keyed by the base label plus the occurrence's type tags,
//! e.g. `"Phone (WORK)"` and `"Phone (CELL)"`.

use crate::error::{RecordError, ScribeError};
use crate::model::{ContactBatch, ContactRecord, NameKeys};
use crate::pipeline::{input, normalize};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info, warn};

/// `[group.]NAME`, the property-name part of a content line.
static RE_PROPERTY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z0-9-]+\.)?([A-Za-z0-9-]+)$").unwrap());

/// vCard 2.1 bare parameters that describe encoding, not the value's context.
const NON_TYPE_BARE_PARAMS: &[&str] = &["QUOTED-PRINTABLE", "BASE64", "B", "7BIT", "8BIT"];

/// Contacts parsed from one vCard file, before sorting.
#[derive(Debug, Default)]
pub struct VCardParse {
    pub records: Vec<ContactRecord>,
    pub skipped: Vec<RecordError>,
}

/// Parse a vCard file into a sorted batch plus the components that were
/// skipped.
pub fn load_vcard(path: &Path) -> Result<(ContactBatch, Vec<RecordError>), ScribeError> {
    let text = input::read_utf8(path)?;
    let parsed = parse_vcards(&text, path)?;
    info!(
        "Parsed {} contacts from vCard ({} skipped)",
        parsed.records.len(),
        parsed.skipped.len()
    );
    Ok((normalize::normalize(parsed.records), parsed.skipped))
}

/// Parse a vCard stream into records in file order.
///
/// `path` is only used for error messages.
pub fn parse_vcards(text: &str, path: &Path) -> Result<VCardParse, ScribeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut out = VCardParse::default();
    let mut current: Option<Component> = None;
    let mut seen = 0usize;

    for (line_no, line) in unfold(text) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let is_begin = trimmed.eq_ignore_ascii_case("BEGIN:VCARD");
        let is_end = trimmed.eq_ignore_ascii_case("END:VCARD");

        match current.as_mut() {
            None if is_begin => {
                seen += 1;
                current = Some(Component::new(seen, line_no));
            }
            None => {
                return Err(ScribeError::InputFormat {
                    path: path.to_path_buf(),
                    detail: format!("line {line_no}: expected BEGIN:VCARD, found {trimmed:?}"),
                });
            }
            Some(_) if is_begin => {
                if let Some(mut open) = current.take() {
                    open.fail(line_no, "missing END:VCARD before the next BEGIN:VCARD");
                    open.finish(&mut out);
                }
                seen += 1;
                current = Some(Component::new(seen, line_no));
            }
            Some(_) if is_end => {
                if let Some(done) = current.take() {
                    done.finish(&mut out);
                }
            }
            Some(component) => component.push_line(line_no, &line),
        }
    }

    if let Some(mut open) = current.take() {
        open.fail(0, "missing END:VCARD at end of file");
        open.finish(&mut out);
    }

    if seen == 0 {
        return Err(ScribeError::InputFormat {
            path: path.to_path_buf(),
            detail: "no BEGIN:VCARD component found".into(),
        });
    }

    Ok(out)
}

// ── Stream layer ─────────────────────────────────────────────────────────

/// Join folded lines. Yields `(1-based line number, logical line)`.
///
/// Besides whitespace folding, a quoted-printable line ending in `=` is
/// continued by the next physical line whatever it starts with.
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    let mut soft_break = false;
    for (i, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if soft_break {
            if let Some((_, last)) = lines.last_mut() {
                last.pop();
                last.push_str(raw);
                soft_break = has_soft_break(last);
                continue;
            }
        }
        if let Some(cont) = raw.strip_prefix([' ', '\t']) {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(cont);
                soft_break = has_soft_break(last);
                continue;
            }
        }
        soft_break = has_soft_break(raw);
        lines.push((i + 1, raw.to_string()));
    }
    lines
}

fn has_soft_break(line: &str) -> bool {
    line.ends_with('=')
        && find_unquoted(line, ':').is_some_and(|colon| {
            line[..colon]
                .to_ascii_uppercase()
                .contains("QUOTED-PRINTABLE")
        })
}

/// One `BEGIN:VCARD` … `END:VCARD` block being accumulated.
struct Component {
    index: usize,
    line: usize,
    properties: Vec<Property>,
    error: Option<String>,
}

impl Component {
    fn new(index: usize, line: usize) -> Self {
        Self {
            index,
            line,
            properties: Vec::new(),
            error: None,
        }
    }

    fn push_line(&mut self, line_no: usize, line: &str) {
        if self.error.is_some() {
            return;
        }
        match Property::parse(line) {
            Ok(p) => self.properties.push(p),
            Err(reason) => self.fail(line_no, &reason),
        }
    }

    /// Record the first failure; later ones add nothing useful.
    fn fail(&mut self, line_no: usize, reason: &str) {
        if self.error.is_none() {
            self.error = Some(if line_no > 0 {
                format!("line {line_no}: {reason}")
            } else {
                reason.to_string()
            });
        }
    }

    fn finish(self, out: &mut VCardParse) {
        match self.error {
            Some(reason) => {
                let err = RecordError {
                    index: self.index,
                    line: self.line,
                    reason,
                };
                warn!("Skipping malformed vCard: {}", err);
                out.skipped.push(err);
            }
            None => {
                let record = build_record(&self.properties);
                debug!("vCard #{} → {:?}", self.index, record.full_name());
                out.records.push(record);
            }
        }
    }
}

// ── Component layer ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct Param {
    /// Uppercased parameter name; `None` for vCard 2.1 bare parameters.
    name: Option<String>,
    values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Property {
    /// Uppercased name without group prefix.
    name: String,
    params: Vec<Param>,
    /// Raw value, still escaped.
    value: String,
}

impl Property {
    fn parse(line: &str) -> Result<Self, String> {
        let colon = find_unquoted(line, ':')
            .ok_or_else(|| format!("content line has no ':' separator: {line:?}"))?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut parts = split_unquoted(head, ';').into_iter();
        let raw_name = parts.next().unwrap_or_default();
        let name = RE_PROPERTY_NAME
            .captures(raw_name.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_ascii_uppercase())
            .ok_or_else(|| format!("invalid property name {raw_name:?}"))?;

        let params = parts.filter(|p| !p.trim().is_empty()).map(Param::parse).collect();

        let mut property = Self {
            name,
            params,
            value: value.to_string(),
        };
        if property.is_quoted_printable() {
            property.value = decode_quoted_printable(&property.value, property.charset())?;
        }
        Ok(property)
    }

    /// `ENCODING=QUOTED-PRINTABLE`, or the 2.1 bare `QUOTED-PRINTABLE`.
    fn is_quoted_printable(&self) -> bool {
        self.params.iter().any(|p| {
            matches!(p.name.as_deref(), None | Some("ENCODING"))
                && p.values
                    .iter()
                    .any(|v| v.trim().eq_ignore_ascii_case("QUOTED-PRINTABLE"))
        })
    }

    fn charset(&self) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some("CHARSET"))
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }

    /// Type tags in source order and case, from `TYPE=` and bare params.
    fn type_tags(&self) -> Vec<String> {
        self.params
            .iter()
            .filter(|p| match &p.name {
                Some(n) => n == "TYPE",
                None => true,
            })
            .flat_map(|p| p.values.iter())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .filter(|v| {
                !NON_TYPE_BARE_PARAMS
                    .iter()
                    .any(|bare| bare.eq_ignore_ascii_case(v))
            })
            .map(str::to_string)
            .collect()
    }

    fn text(&self) -> String {
        unescape(&self.value)
    }

    fn components(&self) -> Vec<String> {
        split_structured(&self.value)
    }
}

impl Param {
    fn parse(raw: String) -> Self {
        match raw.split_once('=') {
            Some((name, values)) => Param {
                name: Some(name.trim().to_ascii_uppercase()),
                values: split_unquoted(values, ',')
                    .into_iter()
                    .flat_map(|v| {
                        // TYPE="work,voice" is one quoted list in vCard 4.0.
                        let v = v.trim().trim_matches('"').to_string();
                        v.split(',').map(str::to_string).collect::<Vec<_>>()
                    })
                    .collect(),
            },
            None => Param {
                name: None,
                values: vec![raw.trim().to_string()],
            },
        }
    }
}

/// Key for one occurrence of a typed property: `"<base> (<tag>, <tag>)"`.
fn typed_key(base: &str, property: &Property) -> String {
    format!("{base} ({})", property.type_tags().join(", "))
}

fn build_record(properties: &[Property]) -> ContactRecord {
    let mut record = ContactRecord::new(NameKeys::CANONICAL);

    let formatted_name = properties
        .iter()
        .find(|p| p.name == "FN")
        .map(|p| p.text().trim().to_string());

    let (family, given) = properties
        .iter()
        .find(|p| p.name == "N")
        .map(|p| {
            let c = p.components();
            let part = |i: usize| c.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
            (part(0), part(1))
        })
        .unwrap_or_default();

    if given.is_empty() && family.is_empty() {
        record.set_first_name(formatted_name.clone().unwrap_or_default());
    } else {
        record.set_first_name(given);
        record.set_last_name(family);
    }

    if let Some(display) = formatted_name {
        record.push_field("Display name", display);
    }

    for p in properties {
        match p.name.as_str() {
            "TEL" => record.push_field(typed_key("Phone", p), p.text()),
            "EMAIL" => record.push_field(typed_key("Email", p), p.text()),
            "ADR" => record.push_field(typed_key("Address", p), assemble_address(&p.components())),
            "ORG" => record.push_field("Organization", join_non_empty(&p.components())),
            "TITLE" => record.push_field("Title", p.text()),
            "NOTE" => record.push_field("Note", p.text()),
            "NICKNAME" => record.push_field("Nickname", p.text()),
            "BDAY" => record.push_field("Birthday", format_birthday(&p.text())),
            "URL" if p.type_tags().is_empty() => record.push_field("Website", p.text()),
            "URL" => record.push_field(typed_key("Website", p), p.text()),
            _ => {}
        }
    }

    record
}

/// ADR components are `PO box; extended; street; locality; region; postal
/// code; country`. Only street through country are printed.
fn assemble_address(components: &[String]) -> String {
    let printed: Vec<String> = components.iter().skip(2).take(5).cloned().collect();
    join_non_empty(&printed)
}

fn join_non_empty(parts: &[String]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full dates print as `DD/MM/YYYY`; partial dates (`--0412`) stay verbatim.
fn format_birthday(value: &str) -> String {
    let value = value.trim();
    let date_part = value.split('T').next().unwrap_or(value);
    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

// ── Lexical helpers ──────────────────────────────────────────────────────

/// Decode `=XX` octets in `raw`, reading them in `charset` (UTF-8 when
/// absent). Literal characters pass through; a trailing `=` is a leftover
/// soft break and is dropped.
fn decode_quoted_printable(raw: &str, charset: Option<&str>) -> Result<String, String> {
    let charset = charset.unwrap_or("UTF-8").trim().to_ascii_uppercase();
    let byte_per_char = match charset.as_str() {
        "UTF-8" | "UTF8" => false,
        "ISO-8859-1" | "LATIN1" | "LATIN-1" | "US-ASCII" => true,
        other => return Err(format!("unsupported charset {other:?}")),
    };

    let mut out = String::with_capacity(raw.len());
    let mut octets: Vec<u8> = Vec::new();
    let mut rest = raw;
    while let Some(ch) = rest.chars().next() {
        if ch == '=' {
            let hex = rest
                .get(1..3)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(octet) = hex {
                octets.push(octet);
                rest = &rest[3..];
                continue;
            }
            if rest.len() == 1 {
                break;
            }
        }
        flush_octets(&mut octets, &mut out, byte_per_char)?;
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    flush_octets(&mut octets, &mut out, byte_per_char)?;
    Ok(out)
}

fn flush_octets(octets: &mut Vec<u8>, out: &mut String, byte_per_char: bool) -> Result<(), String> {
    if octets.is_empty() {
        return Ok(());
    }
    if byte_per_char {
        out.extend(octets.drain(..).map(char::from));
        return Ok(());
    }
    let text = String::from_utf8(std::mem::take(octets))
        .map_err(|_| "quoted-printable value is not valid UTF-8".to_string())?;
    out.push_str(&text);
    Ok(())
}

/// Byte offset of the first `needle` not inside double quotes.
fn find_unquoted(s: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(i) = find_unquoted(rest, sep) {
        parts.push(rest[..i].to_string());
        rest = &rest[i + sep.len_utf8()..];
    }
    parts.push(rest.to_string());
    parts
}

/// Split a structured value on unescaped `;`, unescaping each component.
fn split_structured(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                current.push('\\');
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' => parts.push(unescape(&std::mem::take(&mut current))),
            c => current.push(c),
        }
    }
    parts.push(unescape(&current));
    parts
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(c @ (',' | ';' | '\\' | ':')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
