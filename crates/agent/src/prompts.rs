//! Prompt templates for every responder.
//!
//! All model-facing text lives here so the responders stay logic-only.
//! The planner and generator templates pin the model to the fixed lead
//! schema and forbid the query shapes the validator would reject anyway.

use leadwise_core::LeadSchema;

use crate::llm::Prompt;

pub fn plan_prompt(question: &str) -> Prompt {
    let schema = LeadSchema;
    Prompt::system_only(format!(
        "You are a SQL query planner for a CUSTOMER LEADS database.\n\n\
         CRITICAL CONTEXT:\n\
         - \"Champions\", \"Highly Engaged\", \"At Risk\" etc. are CUSTOMER SEGMENT names, NOT sports/games\n\
         - This is a marketing database with lead/customer information\n\
         - NEVER search the web - use only the database schema provided\n\n\
         Database table: {table}\n\
         Columns: {columns}\n\
         Segment values: {segments}\n\n\
         RULES:\n\
         - Plan for SIMPLE queries only (single SELECT, basic WHERE, GROUP BY, ORDER BY)\n\
         - NO CTEs, NO subqueries, NO complex joins\n\
         - If request cannot be answered with this schema, say: CANNOT_ANSWER: [reason]\n\n\
         User request: {question}\n\n\
         Respond with a brief SQL plan (2-3 sentences max):",
        table = schema.table(),
        columns = schema.columns_csv(),
        segments = schema.segments_csv(),
    ))
}

pub fn generate_prompt(plan: &str) -> Prompt {
    let schema = LeadSchema;
    Prompt::system_only(format!(
        "Generate a SIMPLE SQL query based on this plan.\n\n\
         Plan: {plan}\n\n\
         Table: {table}\n\
         Columns: {columns}\n\n\
         RULES:\n\
         - Single SELECT statement only\n\
         - NO CTEs (WITH clauses)\n\
         - NO subqueries\n\
         - NO comments in SQL\n\
         - Return ONLY the SQL query\n\n\
         SQL:",
        table = schema.table(),
        columns = schema.columns_csv(),
    ))
}

pub fn analytics_prompt(columns: &[String], data_summary: &str, question: &str) -> Prompt {
    Prompt::with_user(
        format!(
            "You are a Data Visualization and BI Analytics expert.\n\n\
             Analyze the following data and provide:\n\
             1. Key insights and patterns\n\
             2. Recommendations based on the findings\n\n\
             Data columns: {columns}\n\
             Data summary:\n{data_summary}\n\n\
             User question: {question}\n\n\
             Provide 3-5 bullet points of actionable insights.",
            columns = columns.join(", "),
        ),
        "Provide your analysis.",
    )
}

pub fn strategist_prompt(segment_info: &str, request: &str) -> Prompt {
    Prompt::with_user(
        format!(
            "You are a Customer Segmentation Analyst with skills in behavioral analytics, \
             lifecycle marketing, and data-driven cohort design. You analyze customer segments \
             to provide marketing insights and strategies for each segment.\n\n\
             The 5 Customer Segments (ranked by engagement):\n\
             {segment_info}\n\n\
             Based on this data, provide insights on:\n\
             1. What defines each segment behaviorally\n\
             2. Recommended marketing approaches for each\n\
             3. Conversion potential and prioritization\n\
             4. Re-engagement strategies for lower segments\n\n\
             Be specific and actionable in your recommendations.",
        ),
        format!("Analyze segments for this request: {request}"),
    )
}

pub fn catalog_prompt(product_info: &str, request: &str) -> Prompt {
    Prompt::with_user(
        format!(
            "You are a Product Expert for Learning Labs Pro.\n\n\
             PRODUCT INFO:\n{product_info}\n\n\
             Provide a brief, compelling summary of Learning Labs Pro that can be used in a \
             marketing email.\n\
             Focus on: key benefits, pricing, and value proposition.\n\
             Keep it concise (2-3 paragraphs).",
        ),
        format!("Provide product information for: {request}"),
    )
}

pub fn content_prompt(leads_info: &str, product_info: &str, request: &str) -> Prompt {
    Prompt::with_user(
        format!(
            "You are an expert Marketing Email Writer specializing in personalized content emails.\n\n\
             Your emails should:\n\
             1. Have an attention-grabbing subject line\n\
             2. Personalize based on the audience segment\n\
             3. Clearly articulate the value proposition\n\
             4. Include a compelling call-to-action\n\
             5. Be concise yet persuasive\n\
             6. Follow best practices for email deliverability\n\
             7. Understand the campaign goal (reactivation, upsell, product launch)\n\
             8. Adapt the tone/style appropriately (friendly, professional, urgent)\n\
             9. Generate a plain-text version\n\n\
             Segment-specific tone:\n\
             - Champions: VIP treatment, exclusive offers, loyalty appreciation\n\
             - Highly Engaged: Value reinforcement, success case studies, premium features\n\
             - Potential Loyalists: Nurturing, educational content, special onboarding\n\
             - At Risk: Re-engagement, win-back offers, \"we miss you\" messaging\n\
             - Low Value: Awareness building, introductory offers, low-friction CTAs\n\n\
             Target Audience Info:\n{leads_info}\n\n\
             Product Info:\n{product_info}\n\n\
             Write a complete marketing email including:\n\
             - Subject Line\n\
             - Preview Text\n\
             - Email Body (greeting, hook, value prop, CTA)\n\
             - Postscript (P.S.) with urgency element",
        ),
        format!("Write a sales email for this request: {request}"),
    )
}

#[cfg(test)]
mod tests {
    use super::{generate_prompt, plan_prompt};

    #[test]
    fn plan_prompt_pins_schema_and_question() {
        let prompt = plan_prompt("How many Champions are there?");
        assert!(prompt.system.contains("leadscored"));
        assert!(prompt.system.contains("customer_id, Segment"));
        assert!(prompt.system.contains("Champions, Highly Engaged"));
        assert!(prompt.system.contains("How many Champions are there?"));
        assert!(prompt.user.is_none());
    }

    #[test]
    fn generate_prompt_carries_the_plan() {
        let prompt = generate_prompt("Count rows per segment, sorted by count.");
        assert!(prompt.system.contains("Count rows per segment"));
        assert!(prompt.system.contains("NO CTEs"));
    }
}
