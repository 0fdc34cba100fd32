//! Fixed-output check of the per-patient report text, standing in for the
//! teacher's own format-stability snapshot tests: the exact text is
//! compared rather than a stored `insta` fixture, since the format is
//! simple enough to assert directly and changes to it should be reviewed
//! in the diff rather than silently re-accepted.

use chemosched_cli::report;
use chemosched_core::{Activity, Cronograma, Instance, Resources};
use pretty_assertions::assert_eq;

fn two_patient_instance() -> Instance {
    let activities = vec![
        Activity::new(1, 0),
        Activity::new(2, 3).with_demand("R1", 1),
        Activity::new(3, 2).with_demand("R1", 1),
        Activity::new(4, 3).with_demand("R1", 1),
        Activity::new(5, 2).with_demand("R1", 1),
        Activity::new(6, 0),
    ];
    Instance::new(
        activities,
        Resources::from([("R1".to_string(), 2)]),
        vec![(1, 2), (2, 3), (3, 6), (1, 4), (4, 5), (5, 6)],
        vec![],
    )
    .unwrap()
}

#[test]
fn per_patient_report_has_the_expected_shape() {
    let instance = two_patient_instance();
    let schedule: Cronograma = [(1, 0), (2, 0), (3, 3), (4, 0), (5, 3), (6, 5)]
        .into_iter()
        .collect();

    let rendered = report::format_per_patient(&instance, &schedule, 2);

    let expected = format!(
        "\n--- Patient 1 ---\n{}{}\n--- Patient 2 ---\n{}{}{}\n",
        step_line(2, 0, 3, 3),
        step_line(3, 3, 5, 2),
        step_line(4, 0, 3, 3),
        step_line(5, 3, 5, 2),
        "=".repeat(60),
    );

    assert_eq!(rendered, expected);
}

fn step_line(id: u32, start: u32, finish: u32, duration: u32) -> String {
    format!(
        "  - Activity {id:<3}: starts at t={start:<4} finishes at t={finish:<4} (duration: {duration})\n"
    )
}
