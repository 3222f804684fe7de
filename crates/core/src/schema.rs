//! The fixed lead-scoring schema the query pipeline is allowed to touch.
//!
//! There is exactly one queryable table. Its column set and the segment
//! enumeration are compile-time constants; the planner and validator both
//! treat them as the complete vocabulary of the data domain.

/// The single allowed table name.
pub const LEAD_TABLE: &str = "leadscored";

/// Columns of the `leadscored` table, in schema order.
pub const LEAD_COLUMNS: &[&str] = &[
    "customer_id",
    "Segment",
    "engagement_score",
    "TotalVisits",
    "Total_Time_Spent_on_Website",
    "Page_Views_Per_Visit",
    "Converted",
    "Lead_Source",
    "Lead_Origin",
    "Country",
    "City",
    "Specialization",
    "Occupation",
    "Last_Activity",
];

/// The five customer segments, ranked by engagement level.
pub const SEGMENTS: &[&str] =
    &["Champions", "Highly Engaged", "Potential Loyalists", "At Risk", "Low Value"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeadSchema;

impl LeadSchema {
    pub fn table(&self) -> &'static str {
        LEAD_TABLE
    }

    pub fn columns(&self) -> &'static [&'static str] {
        LEAD_COLUMNS
    }

    pub fn segments(&self) -> &'static [&'static str] {
        SEGMENTS
    }

    pub fn columns_csv(&self) -> String {
        LEAD_COLUMNS.join(", ")
    }

    pub fn segments_csv(&self) -> String {
        SEGMENTS.join(", ")
    }

    pub fn has_column(&self, name: &str) -> bool {
        LEAD_COLUMNS.iter().any(|column| column.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::LeadSchema;

    #[test]
    fn segment_enumeration_has_five_members() {
        assert_eq!(LeadSchema.segments().len(), 5);
        assert_eq!(LeadSchema.segments()[0], "Champions");
        assert_eq!(LeadSchema.segments()[4], "Low Value");
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        assert!(LeadSchema.has_column("Lead_Source"));
        assert!(LeadSchema.has_column("lead_source"));
        assert!(!LeadSchema.has_column("revenue"));
    }
}
