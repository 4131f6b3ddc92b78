use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::parse_amount;
use crate::models::{Direction, ParseOutcome, ParsedRow};

struct OfxPatterns {
    block_start: Regex,
    block_end: Regex,
    dtposted: Regex,
    trnamt: Regex,
    memo: Regex,
    name: Regex,
}

fn tag(name: &str) -> Regex {
    // SGML OFX leaves elements unclosed, so a value ends at the next tag or line break.
    Regex::new(&format!(r"(?i)<{name}>\s*([^<\r\n]*)")).unwrap()
}

fn patterns() -> &'static OfxPatterns {
    static PATTERNS: OnceLock<OfxPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| OfxPatterns {
        block_start: Regex::new(r"(?i)<STMTTRN>").unwrap(),
        block_end: Regex::new(r"(?i)</STMTTRN>|</BANKTRANLIST>|</CCSTMTRS>").unwrap(),
        dtposted: tag("DTPOSTED"),
        trnamt: tag("TRNAMT"),
        memo: tag("MEMO"),
        name: tag("NAME"),
    })
}

fn field(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim()))
        .filter(|v| !v.is_empty())
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// `YYYYMMDD`, optionally followed by time and timezone (`20240301120000[-3:BRT]`).
fn parse_ofx_date(raw: &str) -> Option<NaiveDate> {
    let digits = raw.get(..8)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let y: i32 = digits[..4].parse().ok()?;
    let m: u32 = digits[4..6].parse().ok()?;
    let d: u32 = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Extract every `STMTTRN` block. Blocks lacking a usable date, amount or
/// description are recorded as skipped (by block ordinal) rather than failing
/// the whole file.
pub fn parse_ofx_text(content: &str) -> ParseOutcome {
    let p = patterns();
    let mut outcome = ParseOutcome::default();

    for (idx, chunk) in p.block_start.split(content).skip(1).enumerate() {
        let block = match p.block_end.find(chunk) {
            Some(m) => &chunk[..m.start()],
            None => chunk,
        };
        let ordinal = idx + 1;

        let date = field(&p.dtposted, block).and_then(|d| parse_ofx_date(&d));
        let amount = field(&p.trnamt, block).and_then(|a| parse_amount(&a));
        let description = field(&p.memo, block).or_else(|| field(&p.name, block));

        match (date, amount, description) {
            (Some(date), Some(amount), Some(description)) => outcome.rows.push(ParsedRow {
                date,
                description,
                amount,
                direction: Direction::from_amount(amount),
            }),
            (date, amount, description) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("date");
                }
                if amount.is_none() {
                    missing.push("amount");
                }
                if description.is_none() {
                    missing.push("description");
                }
                outcome.skip(ordinal, format!("transaction block missing {}", missing.join(", ")));
            }
        }
    }
    outcome
}
