//! Tera rendering of halt and unhalt announcements.

use tera::Tera;

use haltgate_core::{Verdict, VerdictKind};

use crate::context::NotificationContext;
use crate::error::NotifyError;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const HALT_TEMPLATE: &str = "halt.tera";
const UNHALT_TEMPLATE: &str = "unhalt.tera";

const TPLS: &[(&str, &str)] = &[
    (HALT_TEMPLATE, include_str!("templates/halt.tera")),
    (UNHALT_TEMPLATE, include_str!("templates/unhalt.tera")),
];

fn build_tera() -> Result<Tera, NotifyError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.iter().copied())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders announcement text for a verdict.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, NotifyError> {
        Ok(Self { tera: build_tera()? })
    }

    /// Renders the announcement for `ctx`, trimmed of surrounding whitespace.
    pub fn render(&self, kind: VerdictKind, ctx: &NotificationContext) -> Result<String, NotifyError> {
        let name = match kind {
            VerdictKind::Halt => HALT_TEMPLATE,
            VerdictKind::Unhalt => UNHALT_TEMPLATE,
        };
        let rendered = self.tera.render(name, &ctx.to_tera_context()?)?;
        Ok(rendered.trim().to_string())
    }
}

/// One-shot helper: builds a [`Renderer`] and renders `verdict`.
pub fn render_notification(
    verdict: &Verdict,
    ctx: &NotificationContext,
) -> Result<String, NotifyError> {
    Renderer::new()?.render(verdict.kind(), ctx)
}

#[cfg(test)]
mod tests {
    use haltgate_core::message;

    use super::*;

    fn repo() -> haltgate_core::RepoSlug {
        "acme/widgets".parse().expect("slug")
    }

    fn render(verdict: &Verdict, total: usize, failed: usize) -> String {
        let ctx = NotificationContext::new(verdict, &repo(), total, failed);
        render_notification(verdict, &ctx).expect("render")
    }

    #[test]
    fn halt_with_title_and_summary() {
        let verdict = Verdict::Halt(message::decode("API outage\n\nSee incident 42."));
        let text = render(&verdict, 5, 1);
        assert_eq!(
            text,
            ":octagonal_sign: Merges halted on *acme/widgets*: API outage\n\
             See incident 42.\n\
             4 of 5 open pull request(s) marked as halted."
        );
    }

    #[test]
    fn default_halt_omits_title() {
        let verdict = Verdict::Halt(message::decode(""));
        let text = render(&verdict, 0, 0);
        assert_eq!(text, ":octagonal_sign: Merges halted on *acme/widgets*");
    }

    #[test]
    fn default_title_hides_summary() {
        let verdict = Verdict::Halt(message::decode("Merges halted\n\nignored body"));
        let text = render(&verdict, 0, 0);
        assert!(!text.contains("ignored body"), "got: {text}");
    }

    #[test]
    fn unhalt_reports_counts() {
        let text = render(&Verdict::Unhalt, 3, 0);
        assert_eq!(
            text,
            ":white_check_mark: Merges unhalted on *acme/widgets*\n\
             3 of 3 open pull request(s) marked as unhalted."
        );
    }

    #[test]
    fn templates_parse() {
        assert!(Renderer::new().is_ok());
    }
}
