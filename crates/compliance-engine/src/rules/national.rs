// Member-state rules, applied only when a hint names the country
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Severity;

use super::{when_absent, Finding, Rule, RuleContext};
use crate::jurisdiction::{Country, Jurisdiction};
use crate::patterns::mentions;

lazy_static! {
    static ref GERMAN_CONTEXT: Regex = Regex::new(r"(?i)BGB|German|Deutschland|Bundesrepublik").unwrap();
    static ref WRITTEN_FORM: Regex = Regex::new(r"(?i)written form|schriftform|textform").unwrap();
    static ref FRENCH_CONTEXT: Regex =
        Regex::new(r"(?i)France|français|République française").unwrap();
    static ref CODE_CONSOMMATION: Regex =
        Regex::new(r"(?i)code de la consommation|L312|L313").unwrap();
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "de-bgb-form",
        name: "Written Form Requirement (Germany)",
        category: "German Civil Code",
        regulation: "BGB §492",
        jurisdiction: Jurisdiction::Country(Country::DE),
        severity: Severity::Info,
        check: check_german_written_form,
    },
    Rule {
        id: "fr-code-consommation",
        name: "French Consumer Code Reference",
        category: "French Consumer Code",
        regulation: "Code de la Consommation",
        jurisdiction: Jurisdiction::Country(Country::FR),
        severity: Severity::Info,
        check: check_french_consumer_code,
    },
];

fn check_german_written_form(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GERMAN_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &WRITTEN_FORM, || {
        Finding::new(
            "BGB",
            "German consumer credit agreements require written form under BGB §492",
        )
        .suggest("Ensure document complies with German written form requirements")
    })
}

fn check_french_consumer_code(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &FRENCH_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &CODE_CONSOMMATION, || {
        Finding::new(
            "French Law",
            "French credit agreements should reference Code de la Consommation",
        )
        .suggest("Add reference to applicable French consumer protection articles")
    })
}
