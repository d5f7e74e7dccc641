use super::super::domain::ClassSummary;
use std::cmp::Reverse;

/// Same-teacher classes first, then the least loaded. `sort_by_key` is stable, so ties keep
/// the order the data source returned them in.
pub fn rank(source: &ClassSummary, eligible: Vec<ClassSummary>) -> Vec<ClassSummary> {
    let mut ranked = eligible;
    ranked.sort_by_key(|class| {
        let same_teacher = source.teacher_id.is_some() && class.teacher_id == source.teacher_id;
        (Reverse(same_teacher), class.current_occupancy)
    });
    ranked
}
