//! The catalog responder.
//!
//! One fixed product record. The full sheet is always stored on the
//! session for downstream responders (the content writer in particular);
//! the model only condenses it into a user-facing summary.

use tracing::warn;

use leadwise_core::{ResponderId, SessionState};

use crate::llm::LlmClient;
use crate::prompts;

pub const PRODUCT_NAME: &str = "Learning Labs Pro";
pub const PRODUCT_TAGLINE: &str = "Accelerate Your Career with Hands-On Learning";

const PRODUCT_DESCRIPTION: &str = "\
Learning Labs Pro is our flagship professional development platform \
designed for ambitious professionals looking to advance their careers.

Key Features:
- 500+ hands-on labs and projects across tech, business, and leadership
- AI-powered portfolio builder that showcases your skills to employers
- Personalized learning paths based on your career goals
- Industry-recognized certifications included
- 1-on-1 mentorship sessions with industry experts
- Job placement assistance and interview preparation

Career Advancement Benefits:
- Build a professional portfolio demonstrating real-world skills
- Earn certifications valued by Fortune 500 companies
- Get discovered by recruiters through our talent marketplace
- Average 40% salary increase reported by completers

Pricing:
- Monthly: $149/month
- Annual: $999/year (save 44%)
- Enterprise: Custom pricing for teams

Success Stories:
- 87% of users report career advancement within 6 months
- 92% satisfaction rate from 50,000+ professionals
- Featured in Forbes as \"Best Career Development Platform 2024\"

Ideal For:
- Working professionals seeking promotion or career change
- Recent graduates building their portfolios
- Teams looking to upskill employees
- Anyone wanting practical, hands-on learning";

/// The full product sheet, as stored on the session and fed to prompts.
pub fn product_sheet() -> String {
    format!("Product: {PRODUCT_NAME}\nTagline: {PRODUCT_TAGLINE}\n\n{PRODUCT_DESCRIPTION}")
}

pub async fn run(state: &mut SessionState, llm: &dyn LlmClient) {
    let label = ResponderId::Catalog.label();
    let sheet = product_sheet();

    let summary = match llm
        .complete(&prompts::catalog_prompt(&sheet, &state.active_request))
        .await
    {
        Ok(text) => text,
        Err(error) => {
            // Degrade to the raw sheet; it is complete, just not condensed.
            warn!(%error, "catalog summary generation unavailable, using product sheet");
            sheet.clone()
        }
    };

    state.push_responder_message(label, summary);
    state.catalog_text = Some(sheet);
}
