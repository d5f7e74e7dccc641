use crate::infra::{load_campus, parse_date, InMemoryCampus};
use chrono::{Local, NaiveDate};
use clap::Args;
use classdesk::attendance::{diff, AttendanceMark, AttendanceSheet, AttendanceStatus};
use classdesk::config::AppConfig;
use classdesk::error::AppError;
use classdesk::transfers::{
    ClassId, ClassStatus, ClassSummary, EffectiveWindow, GradeId, ScheduleSlot, StudentId,
    StudentTransferOutcome, SubjectId, TeacherId, TeacherProfile, TeacherVerdict,
    TransferEligibilityResolver, TransferService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the teacher handover (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) effective_date: Option<NaiveDate>,
    /// Number of students moved in the bulk transfer walkthrough.
    #[arg(long, default_value_t = 3)]
    pub(crate) students: usize,
}

#[derive(Args, Debug)]
pub(crate) struct StudentTransferArgs {
    /// Class export CSV (defaults to APP_CATALOG_CSV, then the sample campus)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Class the students are leaving
    #[arg(long)]
    pub(crate) source: String,
    /// Comma-separated student ids
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) students: Vec<String>,
    /// Show at most this many destinations
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) limit: Option<u64>,
    /// Print the outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TeacherTransferArgs {
    /// Class export CSV (defaults to APP_CATALOG_CSV, then the sample campus)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// JSON roster with teacher profiles and extra sessions
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Class being handed over
    #[arg(long = "class")]
    pub(crate) class_id: String,
    /// Teacher taking over
    #[arg(long)]
    pub(crate) teacher: String,
    /// First day the teacher takes the class (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) effective_date: NaiveDate,
    /// Last day of a temporary substitution (YYYY-MM-DD); omit for a permanent handover
    #[arg(long, value_parser = parse_date)]
    pub(crate) until: Option<NaiveDate>,
    /// Print the verdict as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

type CampusService = TransferService<InMemoryCampus, InMemoryCampus>;

fn campus_service(campus: InMemoryCampus, resolver: TransferEligibilityResolver) -> CampusService {
    TransferService::new(Arc::new(campus.clone()), Arc::new(campus), resolver)
}

pub(crate) fn run_student_transfer(args: StudentTransferArgs) -> Result<(), AppError> {
    let StudentTransferArgs {
        catalog,
        source,
        students,
        limit,
        json,
    } = args;

    let config = AppConfig::load()?;
    let campus = load_campus(&config.transfers, catalog.as_deref(), None)?;
    let mut resolver = TransferEligibilityResolver::from_config(&config.transfers);
    if let Some(limit) = limit {
        resolver = resolver.with_candidate_limit(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    let source = ClassId::new(source);
    let students: Vec<StudentId> = students.into_iter().map(StudentId::new).collect();
    let service = campus_service(campus, resolver);
    let outcome = service.student_candidates(&source, students.clone())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render_student_outcome(&source, students.len(), &outcome);
    }
    Ok(())
}

pub(crate) fn run_teacher_transfer(args: TeacherTransferArgs) -> Result<(), AppError> {
    let TeacherTransferArgs {
        catalog,
        roster,
        class_id,
        teacher,
        effective_date,
        until,
        json,
    } = args;

    let config = AppConfig::load()?;
    let campus = load_campus(&config.transfers, catalog.as_deref(), roster.as_deref())?;
    let resolver = TransferEligibilityResolver::from_config(&config.transfers);
    let service = campus_service(campus, resolver);

    let class_id = ClassId::new(class_id);
    let teacher = TeacherId::new(teacher);
    let window = EffectiveWindow {
        effective_date,
        substitute_end_date: until,
    };
    let verdict = service.validate_teacher(&class_id, &teacher, window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        render_teacher_verdict(&teacher, &class_id, window, &verdict);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        effective_date,
        students,
    } = args;
    let effective_date = effective_date.unwrap_or_else(|| Local::now().date_naive());
    let campus = sample_campus();
    let service = campus_service(campus.clone(), TransferEligibilityResolver::new());

    println!("Class transfer demo");
    println!("Campus snapshot:");
    for class in campus.classes() {
        let capacity = class
            .max_capacity
            .map_or_else(|| "open".to_string(), |cap| cap.to_string());
        let teacher = class
            .teacher_id
            .as_ref()
            .map_or("unassigned", |teacher| teacher.as_str());
        println!(
            "  - {} [{} / grade {}] {} | {}/{} seats | {}",
            class.display_name(),
            class.subject_id,
            class.grade_id,
            class.status.label(),
            class.current_occupancy,
            capacity,
            teacher
        );
    }

    let source = ClassId::new("MATH9-MON");
    let moving: Vec<StudentId> = (1..=students.max(1))
        .map(|n| StudentId::new(format!("stu-{:03}", 100 + n)))
        .collect();
    println!();
    let outcome = service.student_candidates(&source, moving.clone())?;
    render_student_outcome(&source, moving.len(), &outcome);

    if let Some(best) = outcome.eligible.first() {
        match service.commit_students(&source, &best.id, moving) {
            Ok(receipt) => println!(
                "  Committed {} -> {} ({})",
                source, best.id, receipt.transfer_id
            ),
            Err(err) => println!("  Commit rejected: {}", err),
        }
    }

    println!();
    let window = EffectiveWindow::permanent(effective_date);
    for candidate in ["t-chen", "t-ali", "t-park"] {
        let teacher = TeacherId::new(candidate);
        match service.validate_teacher(&source, &teacher, window) {
            Ok(verdict) => render_teacher_verdict(&teacher, &source, window, &verdict),
            Err(err) => println!("{} unavailable: {}", teacher, err),
        }
    }

    println!("\nAttendance reconciliation");
    let (server, local) = sample_attendance();
    let changes = diff(&server, &local);
    println!(
        "- {} unsaved change(s): {} added | {} updated | {} removed",
        changes.len(),
        changes.added.len(),
        changes.updated.len(),
        changes.removed.len()
    );
    for (student, change) in &changes.updated {
        println!(
            "  - {}: {:?} -> {:?}",
            student, change.previous.status, change.next.status
        );
    }

    Ok(())
}

fn render_student_outcome(source: &ClassId, moving: usize, outcome: &StudentTransferOutcome) {
    println!("Destinations for {} student(s) leaving {}:", moving, source);
    if outcome.is_empty() {
        println!("  (no eligible classes)");
    }
    for (position, class) in outcome.eligible.iter().enumerate() {
        let seats = class
            .remaining_seats()
            .map_or_else(|| "open".to_string(), |seats| format!("{seats} seats left"));
        println!(
            "  {}. {} ({}) | {} enrolled | {}",
            position + 1,
            class.display_name(),
            class.id,
            class.current_occupancy,
            seats
        );
    }
    for rejected in &outcome.rejected {
        println!(
            "  x {} ({}): {}",
            rejected.class.display_name(),
            rejected.class.id,
            rejected.reason.summary()
        );
    }
}

fn render_teacher_verdict(
    teacher: &TeacherId,
    class_id: &ClassId,
    window: EffectiveWindow,
    verdict: &TeacherVerdict,
) {
    let span = match window.substitute_end_date {
        Some(end) => format!("{} to {}", window.effective_date, end),
        None => format!("from {}", window.effective_date),
    };
    match verdict.reason() {
        None => println!("{} can take {} {}", teacher, class_id, span),
        Some(reason) => println!(
            "{} cannot take {} {}: {}",
            teacher,
            class_id,
            span,
            reason.summary()
        ),
    }
}

/// `course` is `(subject, grade)`, `seats` is `(occupancy, capacity)`.
fn sample_class(
    id: &str,
    name: &str,
    course: (&str, &str),
    seats: (u32, Option<u32>),
    teacher: Option<&str>,
    schedule: &[(u8, &str, &str)],
) -> ClassSummary {
    let (subject, grade) = course;
    let (occupancy, capacity) = seats;
    ClassSummary {
        id: ClassId::new(id),
        name: name.to_string(),
        subject_id: SubjectId::new(subject),
        grade_id: GradeId::new(grade),
        status: ClassStatus::Active,
        current_occupancy: occupancy,
        max_capacity: capacity,
        teacher_id: teacher.map(TeacherId::new),
        schedule: schedule
            .iter()
            .filter_map(|(day, start, end)| ScheduleSlot::parse(*day, start, end).ok())
            .collect(),
    }
}

/// A small campus with one math 9 group that needs splitting.
pub(crate) fn sample_campus() -> InMemoryCampus {
    let mut sunday = sample_class(
        "MATH9-SUN",
        "Math 9 Sunday",
        ("math", "9"),
        (15, Some(16)),
        None,
        &[(7, "10:00", "11:30")],
    );
    sunday.status = ClassStatus::Ready;
    let mut friday = sample_class(
        "MATH9-FRI",
        "Math 9 Friday",
        ("math", "9"),
        (2, Some(16)),
        Some("t-ross"),
        &[(5, "17:00", "18:30")],
    );
    friday.status = ClassStatus::Suspended;

    let campus = InMemoryCampus::with_classes(vec![
        sample_class(
            "MATH9-MON",
            "Math 9 Monday/Thursday",
            ("math", "9"),
            (14, Some(16)),
            Some("t-ross"),
            &[(1, "16:00", "17:30"), (4, "16:00", "17:30")],
        ),
        sample_class(
            "MATH9-WED",
            "Math 9 Wednesday",
            ("math", "9"),
            (11, Some(16)),
            Some("t-ross"),
            &[(3, "18:00", "19:30")],
        ),
        sample_class(
            "MATH9-SAT",
            "Math 9 Saturday",
            ("math", "9"),
            (6, Some(12)),
            Some("t-chen"),
            &[(6, "09:00", "10:30")],
        ),
        sunday,
        friday,
        sample_class(
            "MATH10-TUE",
            "Math 10 Tuesday",
            ("math", "10"),
            (9, Some(16)),
            Some("t-chen"),
            &[(2, "16:00", "17:30")],
        ),
        sample_class(
            "ENG9-MON",
            "English 9 Monday",
            ("english", "9"),
            (8, None),
            Some("t-ali"),
            &[(1, "16:30", "18:00")],
        ),
    ]);

    campus.add_teacher(
        TeacherProfile {
            id: TeacherId::new("t-ali"),
            name: "Aliyah Noor".to_string(),
            active: true,
            subject_ids: vec![SubjectId::new("english"), SubjectId::new("math")],
            incompatible_subject_message: None,
        },
        Vec::new(),
    );
    campus.add_teacher(
        TeacherProfile {
            id: TeacherId::new("t-park"),
            name: "Jin Park".to_string(),
            active: false,
            subject_ids: vec![SubjectId::new("math")],
            incompatible_subject_message: None,
        },
        Vec::new(),
    );
    campus
}

fn sample_attendance() -> (AttendanceSheet, AttendanceSheet) {
    let mut server = AttendanceSheet::new();
    server.insert(
        StudentId::new("stu-101"),
        AttendanceMark::new(AttendanceStatus::Present),
    );
    server.insert(
        StudentId::new("stu-102"),
        AttendanceMark::new(AttendanceStatus::Absent),
    );

    let mut local = server.clone();
    local.insert(
        StudentId::new("stu-102"),
        AttendanceMark::with_note(AttendanceStatus::Late, "arrived 16:20"),
    );
    local.insert(
        StudentId::new("stu-103"),
        AttendanceMark::new(AttendanceStatus::Present),
    );
    (server, local)
}
