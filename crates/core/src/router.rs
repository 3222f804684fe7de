//! The turn router.
//!
//! A greedy, rule-based planner: given the session state it picks the next
//! responder by a fixed priority list of keyword classifiers. The keyword
//! lists and their ordering are authoritative for routing behavior; the
//! `completed_responders` guard and the step ceiling keep the loop finite.

use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Hard ceiling on router decisions per turn. Once `step_count` exceeds
/// this the turn terminates regardless of business logic.
pub const MAX_STEPS: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderId {
    Query,
    Analytics,
    Segment,
    Catalog,
    Content,
}

impl ResponderId {
    /// Display label used to tag message-log entries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query => "Query Pipeline",
            Self::Analytics => "Analytics",
            Self::Segment => "Segment Strategist",
            Self::Catalog => "Catalog",
            Self::Content => "Content Writer",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Analytics => "analytics",
            Self::Segment => "segment",
            Self::Catalog => "catalog",
            Self::Content => "content",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Dispatch(ResponderId),
    Complete,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Router;

impl Router {
    /// Decide the next responder. Mutates only the bookkeeping fields:
    /// `step_count`, `completed_responders`, `next_responder`,
    /// `wants_visualization`, and the terminal flag.
    pub fn decide(&self, state: &mut SessionState) -> Route {
        state.step_count += 1;
        if state.step_count > MAX_STEPS {
            return self.finish(state);
        }

        let request = state.active_request.to_lowercase();
        let needs_data = wants_data(&request);
        let needs_viz = wants_visualization(&request);
        let needs_email = request.contains("email");
        let needs_product = request.contains("learning labs");
        let needs_strategy = wants_strategy(&request);

        // 1. Fetch data first when the request implies it.
        if needs_data && !state.has_completed(ResponderId::Query) {
            state.wants_visualization = needs_viz;
            return self.dispatch(state, ResponderId::Query);
        }

        // 2. Analyze/visualize once data is available, or when it was
        //    never needed.
        if needs_viz
            && !state.has_completed(ResponderId::Analytics)
            && (state.tabular_result.is_some() || !needs_data)
        {
            return self.dispatch(state, ResponderId::Analytics);
        }

        // 3. Product details before drafting a product email.
        if needs_product && needs_email && !state.has_completed(ResponderId::Catalog) {
            return self.dispatch(state, ResponderId::Catalog);
        }

        // 4. Email drafting is terminal for the turn.
        if needs_email && !state.has_completed(ResponderId::Content) {
            return self.dispatch(state, ResponderId::Content);
        }

        // 5. Standalone strategy/recommendation requests.
        if needs_strategy && !state.has_completed(ResponderId::Segment) {
            return self.dispatch(state, ResponderId::Segment);
        }

        // 6. Standalone product questions.
        if needs_product && !needs_email && !state.has_completed(ResponderId::Catalog) {
            return self.dispatch(state, ResponderId::Catalog);
        }

        // 7. Default fallback: treat it as a data question.
        if !state.has_completed(ResponderId::Query) {
            state.wants_visualization = needs_viz;
            return self.dispatch(state, ResponderId::Query);
        }

        self.finish(state)
    }

    fn dispatch(&self, state: &mut SessionState, responder: ResponderId) -> Route {
        state.completed_responders.insert(responder);
        let route = Route::Dispatch(responder);
        state.next_responder = Some(route);
        route
    }

    fn finish(&self, state: &mut SessionState) -> Route {
        state.next_responder = Some(Route::Complete);
        state.complete();
        Route::Complete
    }
}

fn wants_data(request: &str) -> bool {
    ["top", "show", "list", "find", "get", "count", "how many", "customer"]
        .iter()
        .any(|keyword| request.contains(keyword))
}

fn wants_visualization(request: &str) -> bool {
    [
        "chart",
        "pie",
        "bar",
        "graph",
        "plot",
        "distribution",
        "breakdown",
        "visualiz",
        "demographic",
        "characteristic",
        "analysis",
        "insight",
    ]
    .iter()
    .any(|keyword| request.contains(keyword))
}

fn wants_strategy(request: &str) -> bool {
    ["strategy", "recommend", "approach", "how to", "marketing plan", "re-engage"]
        .iter()
        .any(|keyword| request.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::{ResponderId, Route, Router, MAX_STEPS};
    use crate::session::SessionState;

    fn drive_to_completion(state: &mut SessionState) -> Vec<Route> {
        let router = Router;
        let mut decisions = Vec::new();
        loop {
            let route = router.decide(state);
            decisions.push(route);
            if route == Route::Complete {
                return decisions;
            }
            // Simulate responders that produce nothing further.
        }
    }

    #[test]
    fn unmatched_request_falls_back_to_query_exactly_once() {
        let mut state = SessionState::new_turn("hello there");
        let decisions = drive_to_completion(&mut state);
        assert_eq!(
            decisions,
            vec![Route::Dispatch(ResponderId::Query), Route::Complete]
        );
        assert!(state.turn_complete);
    }

    #[test]
    fn step_count_increments_by_one_per_decision() {
        let mut state = SessionState::new_turn("hello there");
        let router = Router;
        router.decide(&mut state);
        assert_eq!(state.step_count, 1);
        router.decide(&mut state);
        assert_eq!(state.step_count, 2);
    }

    #[test]
    fn step_ceiling_forces_termination() {
        let mut state = SessionState::new_turn("top customers");
        state.step_count = MAX_STEPS;
        let route = Router.decide(&mut state);
        assert_eq!(route, Route::Complete);
        assert!(state.turn_complete);
        assert_eq!(state.step_count, MAX_STEPS + 1);
    }

    #[test]
    fn no_responder_is_dispatched_twice() {
        let mut state =
            SessionState::new_turn("show top customers and their breakdown with a chart");
        state.record_rows(vec![serde_json::Map::new()]);
        let decisions = drive_to_completion(&mut state);
        let mut dispatched = Vec::new();
        for decision in decisions {
            if let Route::Dispatch(responder) = decision {
                assert!(!dispatched.contains(&responder), "{responder:?} dispatched twice");
                dispatched.push(responder);
            }
        }
    }

    #[test]
    fn data_request_with_breakdown_routes_query_then_analytics() {
        let mut state =
            SessionState::new_turn("Top 10 converted leads and their Lead Source breakdown");
        let router = Router;

        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Query));
        assert!(state.wants_visualization);

        // The query pipeline produced rows; analytics runs next.
        state.record_rows(vec![serde_json::Map::new()]);
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Analytics));
        assert_eq!(router.decide(&mut state), Route::Complete);
    }

    #[test]
    fn analytics_waits_for_data_when_request_needs_it() {
        let mut state = SessionState::new_turn("show a pie chart of segments");
        let router = Router;
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Query));
        // No rows yet: analytics is skipped and the turn ends.
        assert_eq!(router.decide(&mut state), Route::Complete);
    }

    #[test]
    fn product_email_routes_catalog_then_content() {
        let mut state =
            SessionState::new_turn("Write an email about Learning Labs Pro for the champions");
        let router = Router;
        // "champions" is not a data keyword; "write" is not either, but the
        // request mentions no data keywords, so catalog comes first.
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Catalog));
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Content));
    }

    #[test]
    fn strategy_request_routes_segment_strategist() {
        let mut state = SessionState::new_turn("Recommend a re-engagement plan for At Risk");
        let router = Router;
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Segment));
        assert_eq!(router.decide(&mut state), Route::Dispatch(ResponderId::Query));
        assert_eq!(router.decide(&mut state), Route::Complete);
    }
}
