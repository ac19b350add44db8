// EU-wide consumer credit, mortgage credit, GDPR, PSD2 and general contract rules
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Severity;

use super::{when_absent, Finding, Rule, RuleContext};
use crate::jurisdiction::Jurisdiction;
use crate::patterns::{anchor_or_placeholder, mentions, MORTGAGE_CONTEXT};

lazy_static! {
    static ref APRC: Regex = Regex::new(r"(?i)APRC|APR|annual percentage rate|taux annuel").unwrap();
    static ref LOAN_TERMS_ANCHOR: Regex =
        Regex::new(r"(?i)loan terms|interest rate|borrowing rate|section.*loan").unwrap();
    static ref TOTAL_PAYABLE: Regex =
        Regex::new(r"(?i)total amount payable|total cost|montant total|Gesamtbetrag").unwrap();
    static ref LOAN_AMOUNT_ANCHOR: Regex =
        Regex::new(r"(?i)loan amount|credit amount|principal amount").unwrap();
    static ref WITHDRAWAL: Regex = Regex::new(
        r"(?i)right of withdrawal|withdrawal period|14 days|fourteen days|droit de rétractation|Widerrufsrecht"
    )
    .unwrap();
    static ref EARLY_REPAYMENT: Regex = Regex::new(
        r"(?i)early repayment|prepayment|remboursement anticipé|vorzeitige Rückzahlung"
    )
    .unwrap();
    static ref ESIS: Regex = Regex::new(
        r"(?i)ESIS|European Standardised Information Sheet|pre-contractual information"
    )
    .unwrap();
    static ref REFLECTION: Regex =
        Regex::new(r"(?i)reflection period|cooling off|7 days|seven days").unwrap();
    static ref DATA_NOTICE: Regex = Regex::new(
        r"(?i)data processing|personal data|GDPR|data protection|Datenschutz|protection des données"
    )
    .unwrap();
    static ref CONSENT: Regex =
        Regex::new(r"(?i)consent|agree to|I agree|Einwilligung|consentement").unwrap();
    static ref DATA_RIGHTS: Regex = Regex::new(
        r"(?i)right to access|right to erasure|right to rectification|data subject rights|Betroffenenrechte"
    )
    .unwrap();
    static ref PAYMENT: Regex = Regex::new(r"(?i)payment|direct debit|bank transfer|SEPA").unwrap();
    static ref PAYMENT_INFO: Regex =
        Regex::new(r"(?i)payment terms|payment schedule|due date|fällig").unwrap();
    static ref SIGNATURE: Regex =
        Regex::new(r"(?i)signature|sign here|unterschrift|firma|signed by").unwrap();
    static ref DATE_FIELD: Regex = Regex::new(r"(?i)date:|effective date|dated|datum|fecha").unwrap();
    static ref BORROWER: Regex = Regex::new(
        r"(?i)borrower|applicant|debtor|Kreditnehmer|emprunteur|prestatario"
    )
    .unwrap();
    static ref CREDIT_AMOUNT: Regex = Regex::new(
        r"(?i)loan amount|credit amount|principal|amount financed|€[\d,]+|EUR"
    )
    .unwrap();
    static ref INTEREST: Regex = Regex::new(
        r"(?i)interest rate|borrowing rate|%|percent|Zinssatz|taux d'intérêt"
    )
    .unwrap();
    static ref DURATION: Regex =
        Regex::new(r"(?i)duration|term|months|years|Laufzeit|durée|duración").unwrap();
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "ccd-aprc-disclosure",
        name: "APRC Disclosure (Annual Percentage Rate of Charge)",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 5",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_aprc,
    },
    Rule {
        id: "ccd-total-amount",
        name: "Total Amount Payable",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 5",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_total_amount,
    },
    Rule {
        id: "ccd-withdrawal-right",
        name: "Right of Withdrawal (14 days)",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 14",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_withdrawal,
    },
    Rule {
        id: "ccd-early-repayment",
        name: "Early Repayment Rights",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 16",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_early_repayment,
    },
    Rule {
        id: "mcd-esis",
        name: "ESIS Form (Mortgage)",
        category: "Mortgage Credit Directive",
        regulation: "MCD Article 14",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_esis,
    },
    Rule {
        id: "mcd-reflection-period",
        name: "Reflection Period (Mortgage)",
        category: "Mortgage Credit Directive",
        regulation: "MCD Article 14",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_reflection_period,
    },
    Rule {
        id: "gdpr-data-processing",
        name: "GDPR Data Processing Notice",
        category: "GDPR",
        regulation: "GDPR Article 13/14",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_data_processing,
    },
    Rule {
        id: "gdpr-consent",
        name: "GDPR Consent Collection",
        category: "GDPR",
        regulation: "GDPR Article 7",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_consent,
    },
    Rule {
        id: "gdpr-data-rights",
        name: "Data Subject Rights",
        category: "GDPR",
        regulation: "GDPR Articles 15-22",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Info,
        check: check_data_rights,
    },
    Rule {
        id: "psd2-payment-info",
        name: "Payment Services Information",
        category: "PSD2",
        regulation: "PSD2 Article 44",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Info,
        check: check_payment_info,
    },
    Rule {
        id: "signature-block",
        name: "Signature Block Present",
        category: "General",
        regulation: "Contract Law",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_signature,
    },
    Rule {
        id: "date-field",
        name: "Date Field Present",
        category: "General",
        regulation: "Contract Law",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_date_field,
    },
    Rule {
        id: "borrower-info",
        name: "Borrower Information",
        category: "General",
        regulation: "Contract Law",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_borrower,
    },
    Rule {
        id: "loan-amount",
        name: "Credit Amount Disclosure",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 5",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_credit_amount,
    },
    Rule {
        id: "interest-rate",
        name: "Interest Rate Disclosure",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 5",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_interest_rate,
    },
    Rule {
        id: "duration-disclosure",
        name: "Credit Duration",
        category: "Consumer Credit Directive",
        regulation: "CCD Article 5",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_duration,
    },
];

fn check_aprc(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &APRC, || {
        Finding::new(
            "CCD",
            "Missing APRC (Annual Percentage Rate of Charge) disclosure required by Consumer Credit Directive",
        )
        .suggest("Add a clear APRC disclosure statement showing the total cost of credit")
        .anchored(anchor_or_placeholder(
            ctx.flat,
            &LOAN_TERMS_ANCHOR,
            "Loan Terms section",
        ))
    })
}

fn check_total_amount(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &TOTAL_PAYABLE, || {
        Finding::new(
            "CCD",
            "Missing total amount payable disclosure required by Consumer Credit Directive",
        )
        .suggest("Include the total amount the consumer will pay including all interest and fees")
        .anchored(anchor_or_placeholder(
            ctx.flat,
            &LOAN_AMOUNT_ANCHOR,
            "Loan Amount section",
        ))
    })
}

fn check_withdrawal(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &WITHDRAWAL, || {
        Finding::new(
            "CCD",
            "Missing 14-day right of withdrawal notice required by Consumer Credit Directive",
        )
        .suggest("Add clear notice that the consumer has 14 days to withdraw from the credit agreement")
    })
}

fn check_early_repayment(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &EARLY_REPAYMENT, || {
        Finding::new(
            "CCD",
            "Missing early repayment rights information required by Consumer Credit Directive",
        )
        .suggest("Include terms for early repayment and any applicable compensation")
    })
}

fn check_esis(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &MORTGAGE_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &ESIS, || {
        Finding::new(
            "MCD",
            "Mortgage document should reference ESIS (European Standardised Information Sheet)",
        )
        .suggest("Reference the ESIS form that must be provided before contract signing")
    })
}

fn check_reflection_period(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &MORTGAGE_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &REFLECTION, || {
        Finding::new(
            "MCD",
            "Mortgage document should mention reflection period under MCD",
        )
        .suggest("Include information about the reflection period before signing")
    })
}

fn check_data_processing(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &DATA_NOTICE, || {
        Finding::new("GDPR", "Missing GDPR data processing notice")
            .suggest("Add clear explanation of how personal data will be processed and stored")
    })
}

fn check_consent(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &CONSENT, || {
        Finding::new(
            "GDPR",
            "Document should include explicit consent language for data processing",
        )
        .suggest("Add consent checkbox or signature for data processing agreement")
    })
}

fn check_data_rights(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &DATA_RIGHTS, || {
        Finding::new("GDPR", "Consider adding data subject rights information")
            .suggest("Include reference to access, rectification, and erasure rights")
    })
}

fn check_payment_info(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &PAYMENT) {
        return None;
    }
    when_absent(ctx.flat, &PAYMENT_INFO, || {
        Finding::new("PSD2", "Payment information should be clearly specified")
            .suggest("Add clear payment schedule, methods, and due dates")
    })
}

fn check_signature(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &SIGNATURE, || {
        Finding::new("General", "Document missing signature block")
            .suggest("Add signature lines for all parties to the agreement")
    })
}

fn check_date_field(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &DATE_FIELD, || {
        Finding::new("General", "Document may be missing an effective date field")
            .suggest("Include effective date of the agreement")
    })
}

fn check_borrower(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &BORROWER, || {
        Finding::new("General", "Document missing borrower identification")
            .suggest("Include borrower name and identifying information")
    })
}

fn check_credit_amount(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &CREDIT_AMOUNT, || {
        Finding::new("CCD", "Credit amount not clearly disclosed")
            .suggest("Clearly state the total credit amount in EUR")
    })
}

fn check_interest_rate(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &INTEREST, || {
        Finding::new("CCD", "Interest rate not clearly disclosed")
            .suggest("Include the borrowing rate and whether it is fixed or variable")
    })
}

fn check_duration(ctx: &RuleContext<'_>) -> Option<Finding> {
    when_absent(ctx.flat, &DURATION, || {
        Finding::new("CCD", "Credit duration/term not specified")
            .suggest("Include the total duration of the credit agreement")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocNode;
    use crate::flatten::{flatten, FlatText};

    fn flat(paragraphs: &[&str]) -> FlatText {
        flatten(Some(&DocNode::doc(
            paragraphs
                .iter()
                .map(|p| DocNode::paragraph(vec![DocNode::text(*p)]))
                .collect(),
        )))
    }

    fn run(check: fn(&RuleContext<'_>) -> Option<Finding>, text: &FlatText) -> Option<Finding> {
        check(&RuleContext::new(None, text))
    }

    #[test]
    fn test_missing_aprc_anchors_on_loan_terms() {
        let text = flat(&["Agreement", "The interest rate is fixed."]);
        let finding = run(check_aprc, &text).unwrap();
        let anchor = finding.anchor.unwrap();

        assert_eq!(anchor.text, "interest rate");
        assert_eq!(text.slice(anchor.start, anchor.end), "interest rate");
    }

    #[test]
    fn test_aprc_present_passes() {
        let text = flat(&["The APRC is 5.9%."]);
        assert!(run(check_aprc, &text).is_none());
    }

    #[test]
    fn test_missing_total_falls_back_to_placeholder() {
        let text = flat(&["A simple credit agreement between the parties."]);
        let anchor = run(check_total_amount, &text).unwrap().anchor.unwrap();

        assert_eq!(anchor.text, "Loan Amount section");
        assert_eq!((anchor.start, anchor.end), (0, 20));
    }

    #[test]
    fn test_withdrawal_is_absence_only() {
        let finding = run(check_withdrawal, &flat(&["No such notice."])).unwrap();
        assert!(finding.anchor.is_none());

        let text = flat(&["You may withdraw within fourteen days."]);
        assert!(run(check_withdrawal, &text).is_none());
    }

    #[test]
    fn test_mortgage_rules_need_mortgage_context() {
        let consumer = flat(&["Consumer credit agreement."]);
        assert!(run(check_esis, &consumer).is_none());
        assert!(run(check_reflection_period, &consumer).is_none());

        let mortgage = flat(&["This mortgage is secured on the property."]);
        assert!(run(check_esis, &mortgage).is_some());
        assert!(run(check_reflection_period, &mortgage).is_some());
    }

    #[test]
    fn test_payment_info_requires_payment_mention() {
        assert!(run(check_payment_info, &flat(&["Nothing here."])).is_none());
        assert!(run(check_payment_info, &flat(&["Payment by SEPA transfer."])).is_some());
        assert!(run(
            check_payment_info,
            &flat(&["Payment by SEPA transfer.", "Payment schedule: monthly."])
        )
        .is_none());
    }

    #[test]
    fn test_presence_checks_span_paragraphs() {
        // "total" and "cost" sit in separate paragraphs but flatten with one space
        let text = flat(&["The total", "cost of credit"]);
        assert!(run(check_total_amount, &text).is_none());
    }

    #[test]
    fn test_multilingual_keywords() {
        assert!(run(check_borrower, &flat(&["Der Kreditnehmer"])).is_none());
        assert!(run(check_interest_rate, &flat(&["Zinssatz 3"])).is_none());
        assert!(run(check_credit_amount, &flat(&["€10,000"])).is_none());
    }
}
