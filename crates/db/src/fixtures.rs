//! Deterministic demo dataset.
//!
//! A small lead sample spanning all five segments, with engagement and
//! conversion figures matching the segment ranking the offline clustering
//! produces. Seeding is keyed on `customer_id`, so it can be re-run.

use crate::DbPool;

struct DemoLead {
    customer_id: i64,
    segment: &'static str,
    engagement_score: f64,
    total_visits: i64,
    time_on_site: i64,
    page_views_per_visit: f64,
    converted: i64,
    lead_source: &'static str,
    lead_origin: &'static str,
    country: &'static str,
    city: &'static str,
    specialization: &'static str,
    occupation: &'static str,
    last_activity: &'static str,
}

const DEMO_LEADS: &[DemoLead] = &[
    lead(1001, "Champions", 0.38, 14, 2850, 5.2, 1, "Google", "Landing Page Submission", "India", "Mumbai", "Finance Management", "Working Professional", "Email Opened"),
    lead(1002, "Champions", 0.36, 12, 2610, 4.8, 1, "Direct Traffic", "API", "India", "Pune", "Marketing Management", "Working Professional", "SMS Sent"),
    lead(1003, "Champions", 0.34, 11, 2400, 4.5, 1, "Referral", "Landing Page Submission", "United States", "San Jose", "Business Administration", "Working Professional", "Email Opened"),
    lead(1004, "Champions", 0.33, 13, 2550, 5.0, 0, "Google", "API", "India", "Delhi", "Operations Management", "Unemployed", "Page Visited on Website"),
    lead(1005, "Champions", 0.35, 15, 2700, 4.9, 1, "Organic Search", "Landing Page Submission", "India", "Chennai", "Supply Chain Management", "Working Professional", "Converted to Lead"),
    lead(1011, "Highly Engaged", 0.27, 9, 1980, 3.9, 1, "Google", "Landing Page Submission", "India", "Mumbai", "Human Resource Management", "Working Professional", "Email Opened"),
    lead(1012, "Highly Engaged", 0.25, 8, 1820, 3.6, 0, "Olark Chat", "API", "India", "Hyderabad", "IT Projects Management", "Student", "Olark Chat Conversation"),
    lead(1013, "Highly Engaged", 0.24, 8, 1760, 3.4, 1, "Direct Traffic", "Landing Page Submission", "United Kingdom", "London", "Finance Management", "Working Professional", "SMS Sent"),
    lead(1014, "Highly Engaged", 0.26, 9, 1900, 3.8, 0, "Organic Search", "API", "India", "Bangalore", "Marketing Management", "Unemployed", "Email Opened"),
    lead(1015, "Highly Engaged", 0.23, 7, 1700, 3.3, 1, "Reference", "Lead Add Form", "India", "Pune", "Banking, Investment And Insurance", "Working Professional", "Email Opened"),
    lead(1021, "Potential Loyalists", 0.16, 6, 1240, 2.8, 0, "Google", "Landing Page Submission", "India", "Delhi", "Business Administration", "Student", "Page Visited on Website"),
    lead(1022, "Potential Loyalists", 0.15, 5, 1150, 2.6, 1, "Direct Traffic", "API", "India", "Mumbai", "Media and Advertising", "Unemployed", "Email Opened"),
    lead(1023, "Potential Loyalists", 0.14, 5, 1100, 2.5, 0, "Organic Search", "Landing Page Submission", "United States", "Austin", "E-Business", "Student", "Email Bounced"),
    lead(1024, "Potential Loyalists", 0.16, 6, 1200, 2.7, 0, "Olark Chat", "API", "India", "Chennai", "Healthcare Management", "Working Professional", "Olark Chat Conversation"),
    lead(1025, "Potential Loyalists", 0.13, 4, 1050, 2.4, 1, "Google", "Landing Page Submission", "India", "Kolkata", "Retail Management", "Student", "SMS Sent"),
    lead(1031, "At Risk", 0.09, 3, 640, 1.9, 0, "Direct Traffic", "Landing Page Submission", "India", "Mumbai", "Rural and Agribusiness", "Unemployed", "Email Bounced"),
    lead(1032, "At Risk", 0.08, 3, 580, 1.8, 0, "Google", "API", "India", "Delhi", "Hospitality Management", "Student", "Page Visited on Website"),
    lead(1033, "At Risk", 0.07, 2, 520, 1.6, 1, "Organic Search", "Landing Page Submission", "Australia", "Sydney", "International Business", "Working Professional", "Email Opened"),
    lead(1034, "At Risk", 0.08, 3, 600, 1.7, 0, "Olark Chat", "API", "India", "Pune", "Travel and Tourism", "Unemployed", "Olark Chat Conversation"),
    lead(1035, "At Risk", 0.06, 2, 480, 1.5, 0, "Direct Traffic", "Landing Page Submission", "India", "Jaipur", "Services Excellence", "Student", "Email Bounced"),
    lead(1041, "Low Value", 0.04, 1, 210, 1.1, 0, "Google", "API", "India", "Lucknow", "Media and Advertising", "Unemployed", "Page Visited on Website"),
    lead(1042, "Low Value", 0.03, 1, 180, 1.0, 0, "Direct Traffic", "Landing Page Submission", "India", "Patna", "Retail Management", "Student", "Email Bounced"),
    lead(1043, "Low Value", 0.03, 1, 160, 0.9, 1, "Organic Search", "API", "India", "Indore", "E-Commerce", "Unemployed", "Email Opened"),
    lead(1044, "Low Value", 0.02, 1, 140, 0.8, 0, "Olark Chat", "API", "India", "Nagpur", "Hospitality Management", "Student", "Olark Chat Conversation"),
    lead(1045, "Low Value", 0.02, 1, 120, 0.8, 0, "Direct Traffic", "Landing Page Submission", "India", "Surat", "Rural and Agribusiness", "Unemployed", "Email Bounced"),
];

#[allow(clippy::too_many_arguments)]
const fn lead(
    customer_id: i64,
    segment: &'static str,
    engagement_score: f64,
    total_visits: i64,
    time_on_site: i64,
    page_views_per_visit: f64,
    converted: i64,
    lead_source: &'static str,
    lead_origin: &'static str,
    country: &'static str,
    city: &'static str,
    specialization: &'static str,
    occupation: &'static str,
    last_activity: &'static str,
) -> DemoLead {
    DemoLead {
        customer_id,
        segment,
        engagement_score,
        total_visits,
        time_on_site,
        page_views_per_visit,
        converted,
        lead_source,
        lead_origin,
        country,
        city,
        specialization,
        occupation,
        last_activity,
    }
}

/// Insert the demo leads, replacing any prior rows with the same ids.
/// Returns the number of seeded rows.
pub async fn seed_demo_leads(pool: &DbPool) -> Result<usize, sqlx::Error> {
    for demo in DEMO_LEADS {
        sqlx::query(
            "INSERT OR REPLACE INTO leadscored (
                customer_id, Segment, engagement_score, TotalVisits,
                Total_Time_Spent_on_Website, Page_Views_Per_Visit, Converted,
                Lead_Source, Lead_Origin, Country, City, Specialization,
                Occupation, Last_Activity
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(demo.customer_id)
        .bind(demo.segment)
        .bind(demo.engagement_score)
        .bind(demo.total_visits)
        .bind(demo.time_on_site)
        .bind(demo.page_views_per_visit)
        .bind(demo.converted)
        .bind(demo.lead_source)
        .bind(demo.lead_origin)
        .bind(demo.country)
        .bind(demo.city)
        .bind(demo.specialization)
        .bind(demo.occupation)
        .bind(demo.last_activity)
        .execute(pool)
        .await?;
    }

    Ok(DEMO_LEADS.len())
}
