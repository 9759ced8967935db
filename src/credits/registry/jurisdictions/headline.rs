//! Jurisdictions filed at a single published rate. Each row becomes a
//! one-form configuration: either the rate on current-year QRE, or the rate
//! on the federal-style fixed-base increment.

use super::{fixed_base_lines, flat_rate_lines, JurisdictionConfig};
use crate::credits::domain::Method;
use crate::credits::forms::FormDefinition;
use crate::credits::registry::{CreditMetadata, CreditType};
use crate::credits::validation::ValidationRule;

#[derive(Clone, Copy)]
enum Base {
    CurrentYear,
    FixedBase,
}

struct HeadlineCredit {
    code: &'static str,
    name: &'static str,
    form: &'static str,
    rate: f64,
    rate_label: &'static str,
    base: Base,
}

const fn row(
    code: &'static str,
    name: &'static str,
    form: &'static str,
    rate: f64,
    rate_label: &'static str,
    base: Base,
) -> HeadlineCredit {
    HeadlineCredit {
        code,
        name,
        form,
        rate,
        rate_label,
        base,
    }
}

static HEADLINE_CREDITS: [HeadlineCredit; 23] = [
    row("CO", "Colorado", "Form DR 0097", 0.03, "3%", Base::FixedBase),
    row("IA", "Iowa", "Form IA 1120", 0.065, "6.5%", Base::CurrentYear),
    row("IN", "Indiana", "Form IT-20", 0.10, "10%", Base::CurrentYear),
    row("KS", "Kansas", "Form K-120", 0.065, "6.5%", Base::CurrentYear),
    row("KY", "Kentucky", "Form 720", 0.05, "5%", Base::CurrentYear),
    row("MD", "Maryland", "Form 500", 0.03, "3%", Base::CurrentYear),
    row("ME", "Maine", "Form 1120ME", 0.05, "5%", Base::CurrentYear),
    row("MN", "Minnesota", "Form M4", 0.10, "10%", Base::CurrentYear),
    row("MO", "Missouri", "Form MO-1120", 0.05, "5%", Base::CurrentYear),
    row("MS", "Mississippi", "Form 83-105", 0.05, "5%", Base::CurrentYear),
    row("MT", "Montana", "Form CLT-4", 0.03, "3%", Base::CurrentYear),
    row("NC", "North Carolina", "Form CD-401", 0.025, "2.5%", Base::CurrentYear),
    row("NE", "Nebraska", "Form 1120N", 0.03, "3%", Base::CurrentYear),
    row("NH", "New Hampshire", "Form BT-Summary", 0.025, "2.5%", Base::CurrentYear),
    row("NM", "New Mexico", "Form CIT-1", 0.05, "5%", Base::CurrentYear),
    row("OK", "Oklahoma", "Form 512", 0.05, "5%", Base::CurrentYear),
    row("OR", "Oregon", "Form 20", 0.05, "5%", Base::CurrentYear),
    row("RI", "Rhode Island", "Form RI-1120C", 0.05, "5%", Base::CurrentYear),
    row("SC", "South Carolina", "Form SC1120", 0.05, "5%", Base::CurrentYear),
    row("UT", "Utah", "Form TC-20", 0.05, "5%", Base::CurrentYear),
    row("VT", "Vermont", "Form CO-411", 0.05, "5%", Base::CurrentYear),
    row("WI", "Wisconsin", "Form 4", 0.05, "5%", Base::CurrentYear),
    row("WV", "West Virginia", "Form CIT", 0.03, "3%", Base::CurrentYear),
];

pub(super) fn configs() -> impl Iterator<Item = JurisdictionConfig> {
    HEADLINE_CREDITS.iter().map(HeadlineCredit::config)
}

impl HeadlineCredit {
    fn config(&self) -> JurisdictionConfig {
        let prefix = self.code.to_ascii_lowercase();
        let credit_field = format!("{prefix}_credit");
        let (lines, credit_type, summary) = match self.base {
            Base::CurrentYear => (
                flat_rate_lines(&prefix, self.rate, self.rate_label, &credit_field),
                CreditType::Flat,
                "current-year qualified research expenses",
            ),
            Base::FixedBase => (
                fixed_base_lines(&prefix, self.rate, self.rate_label, &credit_field),
                CreditType::Incremental,
                "qualified research expenses above the fixed-base amount",
            ),
        };
        let form_reference = format!("{} {}", self.code, self.form);

        JurisdictionConfig::new(
            self.code,
            self.name,
            CreditMetadata::new(self.rate, credit_type, form_reference.clone())
                .fallback_rate(self.rate),
        )
        .with_form(FormDefinition::sequential(
            format!("{form_reference} - Research Credit"),
            Method::Standard,
            credit_field,
            lines,
        ))
        .with_rules(vec![ValidationRule::note(format!(
            "Computed at the {} headline rate. Confirm base period and liability limits against the current {} instructions",
            self.rate_label, self.form
        ))])
        .with_notes([format!("{} credit on {summary}", self.rate_label)])
    }
}
