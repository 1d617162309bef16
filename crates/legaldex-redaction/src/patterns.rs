// SPDX-License-Identifier: MIT OR Apache-2.0
//! The enumerated pattern-rule table (§4.11 detection source 1): one
//! compiled [`regex::Regex`] per sensitive-data category, each carrying
//! the legal-code citation a detected span should be reported against.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::RedactionType;

/// One row of the §4.11 pattern-rule table.
pub struct PatternRule {
    /// Category this rule detects.
    pub kind: RedactionType,
    /// Compiled matcher.
    pub regex: &'static Lazy<Regex>,
    /// Legal-code citation a match is reported against.
    pub legal_code: &'static str,
    /// Short human-readable reason, attached to every [`crate::Redaction`]
    /// this rule produces.
    pub reason: &'static str,
}

static SSN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid regex"));
static DRIVERS_LICENSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{1,2}\d{6,8}\b").expect("valid regex"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\(\d{3}\)\s?|\d{3}[-.\s])\d{3}[-.\s]\d{4}\b").expect("valid regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").expect("valid regex"));
static CREDIT_CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:\d[ -]?){13,16}\b").expect("valid regex"));
static BANK_ACCOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:account|acct)\.?\s*(?:no\.?|number)?\s*[:#]?\s*\d{8,17}\b").expect("valid regex"));
static DATE_OF_BIRTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bd\.?o\.?b\.?\s*:?\s*\d{1,2}/\d{1,2}/\d{2,4}\b").expect("valid regex"));
static FINANCIAL_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:routing|iban|swift)\s*(?:no\.?|number)?\s*[:#]?\s*[A-Z0-9]{8,34}\b").expect("valid regex"));

/// The enumerated set of pattern rules (§4.11: "SSN, driver's licence,
/// phone, email, credit card, bank account, DoB, financial identifier").
pub static PATTERN_RULES: &[PatternRule] = &[
    PatternRule { kind: RedactionType::Ssn, regex: &SSN, legal_code: "42 U.S.C. § 405(c)(2)(C)", reason: "social security number" },
    PatternRule {
        kind: RedactionType::DriversLicense,
        regex: &DRIVERS_LICENSE,
        legal_code: "18 U.S.C. § 2721",
        reason: "driver's licence number",
    },
    PatternRule { kind: RedactionType::Phone, regex: &PHONE, legal_code: "47 U.S.C. § 222", reason: "phone number" },
    PatternRule { kind: RedactionType::Email, regex: &EMAIL, legal_code: "Fed. R. Civ. P. 5.2", reason: "email address" },
    PatternRule {
        kind: RedactionType::CreditCard,
        regex: &CREDIT_CARD,
        legal_code: "15 U.S.C. § 1681c",
        reason: "credit card number",
    },
    PatternRule {
        kind: RedactionType::BankAccount,
        regex: &BANK_ACCOUNT,
        legal_code: "Fed. R. Civ. P. 5.2(a)(4)",
        reason: "financial account number",
    },
    PatternRule {
        kind: RedactionType::DateOfBirth,
        regex: &DATE_OF_BIRTH,
        legal_code: "Fed. R. Civ. P. 5.2(a)(3)",
        reason: "date of birth",
    },
    PatternRule {
        kind: RedactionType::FinancialIdentifier,
        regex: &FINANCIAL_IDENTIFIER,
        legal_code: "31 C.F.R. § 1010.230",
        reason: "financial institution identifier",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssn_pattern_matches_hyphenated_form() {
        assert!(SSN.is_match("SSN: 123-45-6789"));
        assert!(!SSN.is_match("case number 123456789"));
    }

    #[test]
    fn email_pattern_matches_simple_address() {
        assert!(EMAIL.is_match("contact jane.doe@example.com for service"));
    }

    #[test]
    fn phone_pattern_matches_common_formats() {
        assert!(PHONE.is_match("call (555) 123-4567"));
        assert!(PHONE.is_match("call 555-123-4567"));
    }

    #[test]
    fn pattern_rules_cover_eight_categories() {
        assert_eq!(PATTERN_RULES.len(), 8);
    }
}
