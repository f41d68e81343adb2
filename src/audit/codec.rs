//! Audit message codec
//!
//! One line of text per ledger mutation. The decoder recognizes the shape
//! `(Deposit|Withdraw): <number> to account: <digits>` anywhere in the
//! message. The connector it requires is the literal "to account", which the
//! withdrawal template never emits ("from account"), so withdrawal messages
//! never decode and leave no audit row. That asymmetry is long-standing
//! observed behavior; `decode_with` can widen the accepted connectors to
//! close it, leaving the wire format untouched.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::TransactionType;

/// Structured facts extracted from one audit message.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditFact {
    /// "Deposit" or "Withdraw", exactly as matched
    pub kind: String,
    pub amount: Decimal,
    pub account_number: String,
}

/// Render a mutation into its single-line wire format.
pub fn encode(kind: TransactionType, amount: Decimal, account_number: &str) -> String {
    match kind {
        TransactionType::Deposit => {
            format!("Deposit: {} to account: {}", amount, account_number)
        }
        TransactionType::Withdrawal => {
            format!("Withdraw: {} from account: {}", amount, account_number)
        }
    }
}

/// Decode an audit message with the default connector set.
pub fn decode(message: &str) -> Option<AuditFact> {
    decode_with(message, false)
}

/// Decode an audit message.
///
/// With `match_withdrawals` set, the decoder additionally accepts the
/// "from account" connector that withdrawal messages carry.
pub fn decode_with(message: &str, match_withdrawals: bool) -> Option<AuditFact> {
    let chars: Vec<char> = message.chars().collect();

    let raw = (0..chars.len()).find_map(|start| match_at(&chars, start, match_withdrawals))?;

    match Decimal::from_str(&raw.amount_text) {
        Ok(amount) => Some(AuditFact {
            kind: raw.kind.to_string(),
            amount,
            account_number: raw.account_number,
        }),
        Err(e) => {
            tracing::debug!(
                amount_text = %raw.amount_text,
                error = %e,
                "audit message matched but amount is unparsable, discarding"
            );
            None
        }
    }
}

struct RawMatch {
    kind: &'static str,
    amount_text: String,
    account_number: String,
}

const KINDS: [&str; 2] = ["Deposit", "Withdraw"];
const CONNECTOR: &str = " to account: ";
const WITHDRAWAL_CONNECTOR: &str = " from account: ";

/// Try to match the full pattern starting at `start`.
///
/// The amount shape is one digit run, optionally one arbitrary character and
/// a second digit run; the longer alternative is tried first, the way a
/// greedy optional would.
fn match_at(chars: &[char], start: usize, match_withdrawals: bool) -> Option<RawMatch> {
    let kind = KINDS
        .iter()
        .find(|kind| starts_with(chars, start, kind))
        .copied()?;

    let mut pos = start + kind.len();
    if !starts_with(chars, pos, ": ") {
        return None;
    }
    pos += 2;

    let int_end = scan_digits(chars, pos);
    if int_end == pos {
        return None;
    }

    let mut amount_ends = Vec::with_capacity(2);
    if int_end < chars.len() {
        amount_ends.push(scan_digits(chars, int_end + 1));
    }
    amount_ends.push(int_end);

    for amount_end in amount_ends {
        let Some(account_start) = match_connector(chars, amount_end, match_withdrawals) else {
            continue;
        };
        let account_end = scan_digits(chars, account_start);
        if account_end == account_start {
            continue;
        }

        return Some(RawMatch {
            kind,
            amount_text: chars[pos..amount_end].iter().collect(),
            account_number: chars[account_start..account_end].iter().collect(),
        });
    }

    None
}

fn match_connector(chars: &[char], pos: usize, match_withdrawals: bool) -> Option<usize> {
    if starts_with(chars, pos, CONNECTOR) {
        return Some(pos + CONNECTOR.len());
    }
    if match_withdrawals && starts_with(chars, pos, WITHDRAWAL_CONNECTOR) {
        return Some(pos + WITHDRAWAL_CONNECTOR.len());
    }
    None
}

fn starts_with(chars: &[char], pos: usize, needle: &str) -> bool {
    let mut pos = pos;
    for expected in needle.chars() {
        if chars.get(pos) != Some(&expected) {
            return false;
        }
        pos += 1;
    }
    true
}

/// End of the maximal ASCII-digit run starting at `pos`.
fn scan_digits(chars: &[char], pos: usize) -> usize {
    let mut end = pos;
    while chars.get(end).is_some_and(|c| c.is_ascii_digit()) {
        end += 1;
    }
    end
}
