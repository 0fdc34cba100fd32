//! Human-readable schedule report.
//!
//! Grounded on `view_calendar.py`'s `calcular_atividades`/`imprimir_cronograma`:
//! the number of "real" (non source/sink) activities per patient is derived
//! from the instance's own graph shape rather than passed in, then each
//! activity is bucketed into its patient by id range.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chemosched_core::{ActivityId, Cronograma, Instance};

/// How many non-source/sink activities make up a single patient's protocol,
/// derived from the instance shape. Returns `None` when the activities
/// don't divide evenly across `patients` (an unexpected instance shape).
#[must_use]
pub fn activities_per_patient(instance: &Instance, patients: usize) -> Option<u32> {
    if patients == 0 {
        return None;
    }
    let total_real = instance.activities().len() as u32 - 2;
    if total_real % patients as u32 == 0 {
        Some(total_real / patients as u32)
    } else {
        None
    }
}

struct Step {
    id: ActivityId,
    start: u32,
    finish: u32,
    duration: u32,
}

/// Render a per-patient breakdown of `schedule`, grouping activities by the
/// disjoint id blocks `chemosched_parser::replicate_patients` assigns.
#[must_use]
pub fn format_per_patient(instance: &Instance, schedule: &Cronograma, patients: usize) -> String {
    let Some(block_size) = activities_per_patient(instance, patients) else {
        return "warning: activity count does not split evenly across patients\n".to_string();
    };

    let source = instance.source_id();
    let sink = instance.sink_id();
    let mut by_patient: BTreeMap<usize, Vec<Step>> = BTreeMap::new();

    for (&id, &start) in schedule {
        if id == source || id == sink {
            continue;
        }
        let patient = (id - source - 1) / block_size.max(1);
        let duration = instance.activity(id).map_or(0, |a| a.duration);
        by_patient.entry(patient as usize + 1).or_default().push(Step {
            id,
            start,
            finish: start + duration,
            duration,
        });
    }

    let mut output = String::new();
    for (patient, mut steps) in by_patient {
        steps.sort_by_key(|s| s.start);
        let _ = writeln!(output, "\n--- Patient {patient} ---");
        for step in &steps {
            let _ = writeln!(
                output,
                "  - Activity {:<3}: starts at t={:<4} finishes at t={:<4} (duration: {})",
                step.id, step.start, step.finish, step.duration
            );
        }
    }
    let _ = writeln!(output, "{}", "=".repeat(60));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemosched_core::{Activity, Resources};

    fn two_patient_instance() -> Instance {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 3),
            Activity::new(3, 3),
            Activity::new(4, 3),
            Activity::new(5, 3),
            Activity::new(6, 0),
        ];
        Instance::new(
            activities,
            Resources::new(),
            vec![(1, 2), (1, 4), (2, 3), (4, 5), (3, 6), (5, 6)],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn activities_per_patient_divides_evenly() {
        let instance = two_patient_instance();
        assert_eq!(activities_per_patient(&instance, 2), Some(2));
    }

    #[test]
    fn activities_per_patient_reports_uneven_split() {
        let instance = two_patient_instance();
        assert_eq!(activities_per_patient(&instance, 3), None);
    }

    #[test]
    fn format_per_patient_groups_by_id_block() {
        let instance = two_patient_instance();
        let schedule: Cronograma = [(1, 0), (2, 0), (3, 3), (4, 0), (5, 3), (6, 6)]
            .into_iter()
            .collect();

        let report = format_per_patient(&instance, &schedule, 2);
        assert!(report.contains("Patient 1"));
        assert!(report.contains("Patient 2"));
        assert!(report.contains("Activity 2"));
        assert!(report.contains("Activity 4"));
    }
}
