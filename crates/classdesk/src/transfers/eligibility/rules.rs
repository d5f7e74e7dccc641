use super::super::domain::ClassSummary;
use super::policy::IneligibleReason;

/// Room for every moving entity at once; an uncapped class always has room.
pub fn has_capacity_for(class: &ClassSummary, count: usize) -> bool {
    match class.remaining_seats() {
        None => true,
        Some(available) => available as usize >= count,
    }
}

/// First structural check a destination fails, in filter order.
pub fn check_candidate(
    source: &ClassSummary,
    candidate: &ClassSummary,
    moving_count: usize,
) -> Result<(), IneligibleReason> {
    if candidate.id == source.id {
        return Err(IneligibleReason::SameClass);
    }

    if !candidate.status.accepts_transfers() {
        return Err(IneligibleReason::ClassNotOpen {
            status: candidate.status,
        });
    }

    if candidate.subject_id != source.subject_id || candidate.grade_id != source.grade_id {
        return Err(IneligibleReason::WrongSubjectOrGrade);
    }

    if !has_capacity_for(candidate, moving_count) {
        return Err(IneligibleReason::InsufficientCapacity {
            available: candidate.remaining_seats().unwrap_or(0),
            requested: moving_count,
        });
    }

    Ok(())
}

/// Destinations that could take all `moving_count` students, in input order.
pub fn filter_eligible(
    source: &ClassSummary,
    candidates: &[ClassSummary],
    moving_count: usize,
) -> Vec<ClassSummary> {
    candidates
        .iter()
        .filter(|candidate| check_candidate(source, candidate, moving_count).is_ok())
        .cloned()
        .collect()
}
