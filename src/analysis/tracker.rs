use std::collections::HashMap;

use serde::Serialize;

/// Tag carried by an in-flight analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisTicket {
    pub day_id: String,
    pub request: u64,
}

/// Latest analysis request per day.
///
/// A response is applied only if its ticket is still the latest for its day;
/// a newer request, a reset or a deletion of the day makes it stale.
#[derive(Debug, Default)]
pub struct AnalysisTracker {
    next_request: u64,
    latest: HashMap<String, u64>,
}

impl AnalysisTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, day_id: &str) -> AnalysisTicket {
        self.next_request += 1;
        self.latest.insert(day_id.to_string(), self.next_request);
        AnalysisTicket {
            day_id: day_id.to_string(),
            request: self.next_request,
        }
    }

    /// Invalidate any request in flight for `day_id`
    pub fn cancel(&mut self, day_id: &str) -> bool {
        self.latest.remove(day_id).is_some()
    }

    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        self.latest.get(&ticket.day_id) == Some(&ticket.request)
    }

    /// Settle a request. Returns whether its response may be applied.
    pub fn finish(&mut self, ticket: &AnalysisTicket) -> bool {
        if self.is_current(ticket) {
            self.latest.remove(&ticket.day_id);
            true
        } else {
            false
        }
    }

    /// Requests still in flight
    pub fn pending(&self) -> usize {
        self.latest.len()
    }
}
