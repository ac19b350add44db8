// LMA Green Loan Principles checks: greenwashing, use of proceeds,
// verification and contract strength
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::Severity;

use super::{when_absent, Finding, Rule, RuleContext};
use crate::flatten::FlatText;
use crate::jurisdiction::Jurisdiction;
use crate::patterns::{find_first_match, mentions, TextMatch, GREEN_LOAN_CONTEXT, GREEN_LOAN_CORE};

lazy_static! {
    static ref NATURAL_GAS: Regex =
        Regex::new(r"(?i)natural gas|NGCC|combined cycle|gas-fired|gas turbine").unwrap();
    static ref LNG: Regex =
        Regex::new(r"(?i)\bLNG\b|liquefied natural gas|liquified natural gas").unwrap();
    static ref PIPELINE: Regex = Regex::new(
        r"(?i)pipeline infrastructure|gas pipeline|fossil fuel infrastructure|compression facilities"
    )
    .unwrap();
    static ref GENERAL_CORPORATE: Regex =
        Regex::new(r"(?i)general corporate purposes|working capital|operational expenses").unwrap();
    static ref TRANSITION_FUELS: Regex =
        Regex::new(r"(?i)transition fuel|cleaner energy|lower-emission sources.*natural gas").unwrap();
    static ref REASONABLE_EFFORTS: Regex =
        Regex::new(r"(?i)reasonable efforts|commercially reasonable|use reasonable").unwrap();
    static ref OPTIONAL_LANGUAGE: Regex =
        Regex::new(r"(?i)\bmay obtain\b|\bmay consider\b|at its discretion|consider engaging").unwrap();
    static ref OPTIONAL_REVIEW: Regex = Regex::new(
        r"(?i)external review.*discretion|may obtain.*external review|optional.*verification"
    )
    .unwrap();
    static ref MANDATORY_REVIEW: Regex = Regex::new(
        r"(?i)shall obtain.*external review|annual.*external review.*required|must.*external review"
    )
    .unwrap();
    static ref OPTIONAL_REVIEW_ANCHOR: Regex =
        Regex::new(r"(?i)external review.*discretion|may obtain.*external review").unwrap();
    static ref IFC: Regex = Regex::new(
        r"(?i)IFC Performance Standards|IFC PS|International Finance Corporation"
    )
    .unwrap();
    static ref SPO: Regex = Regex::new(
        r"(?i)second party opinion|SPO|Sustainalytics|ISS ESG|Moody.*ESG|CICERO"
    )
    .unwrap();
    static ref EMISSION_TARGETS: Regex = Regex::new(
        r"(?i)tonnes CO2|GHG emissions avoided|emission reduction|carbon reduction|\d+%.*emission"
    )
    .unwrap();
    static ref VAGUE_ENVIRONMENTAL: Regex = Regex::new(
        r"(?i)environmental benefits|environmental characteristics|generally consistent|believed to be accurate"
    )
    .unwrap();
    static ref QUANTIFIED_IMPACT: Regex =
        Regex::new(r"(?i)\d+.*MW|\d+.*MWh|\d+.*tonnes|\d+.*GWh").unwrap();
    static ref REPORTING_TIMELINE: Regex =
        Regex::new(r"(?i)within 150 days|within 180 days|within 6 months").unwrap();
    static ref COAL: Regex =
        Regex::new(r"(?i)coal generation|coal-fired|coal facility|coal plant").unwrap();
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "gl-fossil-natural-gas",
        name: "Fossil Fuel Reference - Natural Gas",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_natural_gas,
    },
    Rule {
        id: "gl-fossil-lng",
        name: "Fossil Fuel Reference - LNG",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_lng,
    },
    Rule {
        id: "gl-fossil-pipeline",
        name: "Fossil Fuel Infrastructure - Pipeline",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_pipeline,
    },
    Rule {
        id: "gl-general-corporate",
        name: "General Corporate Purposes",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_general_corporate,
    },
    Rule {
        id: "gl-transition-fuels",
        name: "Transition Fuels Category",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_transition_fuels,
    },
    Rule {
        id: "gl-weak-language-reasonable",
        name: "Weak Binding Language - Reasonable Efforts",
        category: "Contract Strength",
        regulation: "Best Practice",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_reasonable_efforts,
    },
    Rule {
        id: "gl-weak-language-may",
        name: "Weak Binding Language - May/Consider",
        category: "Contract Strength",
        regulation: "Best Practice",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_optional_language,
    },
    Rule {
        id: "gl-optional-review",
        name: "Optional External Review",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_optional_review,
    },
    Rule {
        id: "gl-missing-ifc",
        name: "Missing IFC Performance Standards",
        category: "Environmental Standards",
        regulation: "IFC PS",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_ifc_standards,
    },
    Rule {
        id: "gl-missing-spo",
        name: "Missing Second Party Opinion",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Info,
        check: check_second_party_opinion,
    },
    Rule {
        id: "gl-missing-emissions-target",
        name: "Missing Emission Reduction Targets",
        category: "Environmental Impact",
        regulation: "Best Practice",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Info,
        check: check_emission_targets,
    },
    Rule {
        id: "gl-vague-environmental",
        name: "Vague Environmental Language",
        category: "Green Loan Principles",
        regulation: "Best Practice",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Info,
        check: check_vague_environmental,
    },
    Rule {
        id: "gl-reporting-timeline",
        name: "Extended Reporting Timeline",
        category: "Green Loan Principles",
        regulation: "Best Practice",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Warning,
        check: check_reporting_timeline,
    },
    Rule {
        id: "gl-coal-reference",
        name: "Coal Reference in Green Context",
        category: "Green Loan Principles",
        regulation: "LMA GLP 2023",
        jurisdiction: Jurisdiction::EuWide,
        severity: Severity::Error,
        check: check_coal,
    },
];

/// Finding anchored on the first match of `pattern`, if there is one
fn on_first_match(
    flat: &FlatText,
    pattern: &Regex,
    finding: impl FnOnce(&TextMatch) -> Finding,
) -> Option<Finding> {
    let m = find_first_match(flat, pattern)?;
    let finding = finding(&m);
    Some(finding.anchored(Some(m)))
}

fn check_natural_gas(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &NATURAL_GAS, |m| {
        Finding::new(
            "Greenwashing",
            format!(
                "Fossil fuel reference \"{}\" incompatible with Green Loan classification",
                m.text
            ),
        )
        .suggest("Remove natural gas/fossil fuel references or reclassify as transition finance")
    })
}

fn check_lng(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &LNG, |m| {
        Finding::new(
            "Greenwashing",
            format!(
                "LNG infrastructure \"{}\" not eligible for Green Loan financing",
                m.text
            ),
        )
        .suggest("LNG is a fossil fuel and should be removed from eligible green projects")
    })
}

fn check_pipeline(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &PIPELINE, |m| {
        Finding::new(
            "Greenwashing",
            format!(
                "Fossil infrastructure \"{}\" violates Green Loan Principles",
                m.text
            ),
        )
        .suggest("Pipeline and fossil fuel infrastructure must be excluded from green financing")
    })
}

fn check_general_corporate(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &GENERAL_CORPORATE, |m| {
        Finding::new(
            "Use of Proceeds",
            format!("\"{}\" not permitted under Green Loan Principles", m.text),
        )
        .suggest("Green Loan proceeds must be exclusively allocated to Eligible Green Projects")
    })
}

fn check_transition_fuels(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &TRANSITION_FUELS, |m| {
        Finding::new(
            "Greenwashing",
            format!(
                "\"{}\" category misrepresents fossil fuels as green",
                m.text
            ),
        )
        .suggest("Transition fuels require separate Transition Finance framework, not Green Loan")
    })
}

fn check_reasonable_efforts(ctx: &RuleContext<'_>) -> Option<Finding> {
    on_first_match(ctx.flat, &REASONABLE_EFFORTS, |m| {
        Finding::new(
            "Contract Language",
            format!(
                "Weak binding language \"{}\" reduces enforceability",
                m.text
            ),
        )
        .suggest("Replace with mandatory \"shall\" or \"must\" for green commitments")
    })
}

fn check_optional_language(ctx: &RuleContext<'_>) -> Option<Finding> {
    on_first_match(ctx.flat, &OPTIONAL_LANGUAGE, |m| {
        Finding::new(
            "Contract Language",
            format!(
                "Optional language \"{}\" weakens green commitment",
                m.text
            ),
        )
        .suggest("Make external review and verification mandatory, not optional")
    })
}

fn check_optional_review(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CORE) {
        return None;
    }
    if !mentions(ctx.flat, &OPTIONAL_REVIEW) || mentions(ctx.flat, &MANDATORY_REVIEW) {
        return None;
    }
    on_first_match(ctx.flat, &OPTIONAL_REVIEW_ANCHOR, |_| {
        Finding::new(
            "Verification",
            "External review should be mandatory for Green Loan credibility",
        )
        .suggest("Require annual external review by qualified ESG verifier (e.g., Sustainalytics)")
    })
}

fn check_ifc_standards(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &IFC, || {
        Finding::new(
            "Standards",
            "Missing reference to IFC Performance Standards for ESMS alignment",
        )
        .suggest("Add requirement for ESMS aligned with IFC Performance Standards")
    })
}

fn check_second_party_opinion(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CORE) {
        return None;
    }
    when_absent(ctx.flat, &SPO, || {
        Finding::new(
            "Verification",
            "Consider obtaining Second Party Opinion for Green Loan framework",
        )
        .suggest("Engage recognized SPO provider (Sustainalytics, ISS ESG, CICERO) for credibility")
    })
}

fn check_emission_targets(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    when_absent(ctx.flat, &EMISSION_TARGETS, || {
        Finding::new(
            "Impact Metrics",
            "Document lacks specific emission reduction targets",
        )
        .suggest("Add quantified GHG emissions avoided targets with clear methodology")
    })
}

fn check_vague_environmental(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CORE) || mentions(ctx.flat, &QUANTIFIED_IMPACT) {
        return None;
    }
    on_first_match(ctx.flat, &VAGUE_ENVIRONMENTAL, |m| {
        Finding::new(
            "Specificity",
            format!("Vague language \"{}\" lacks quantifiable metrics", m.text),
        )
        .suggest("Replace with specific, measurable environmental impact metrics")
    })
}

fn check_reporting_timeline(ctx: &RuleContext<'_>) -> Option<Finding> {
    on_first_match(ctx.flat, &REPORTING_TIMELINE, |m| {
        Finding::new(
            "Reporting",
            format!(
                "Extended reporting timeline \"{}\" delays transparency",
                m.text
            ),
        )
        .suggest("Reduce to 120 days for timely green loan reporting")
    })
}

fn check_coal(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !mentions(ctx.flat, &GREEN_LOAN_CONTEXT) {
        return None;
    }
    on_first_match(ctx.flat, &COAL, |m| {
        Finding::new(
            "Greenwashing",
            format!(
                "Coal reference \"{}\" absolutely incompatible with Green Loan",
                m.text
            ),
        )
        .suggest("All coal references must be removed from Green Loan documentation")
    })
}
