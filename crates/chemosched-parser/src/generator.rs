//! Synthetic instance generation: resource-availability variants and
//! multi-patient replication of a template instance.
//!
//! Grounded on `instances/instances_generator.py`:
//! - `script1_gerar_variantes_recursos` produces variants of a base
//!   instance with different resource capacities.
//! - `script2_simular_multiplos_pacientes` replicates a single-patient
//!   template `n` times, rewiring each copy's local source/sink edges
//!   onto one shared global source and sink.

use std::collections::BTreeMap;

use chemosched_core::{Activity, ActivityId, Instance, InstanceError};

/// Build a variant of `instance` with one resource's capacity replaced.
/// Mirrors the original's sweep over candidate capacities for a single
/// resource while holding everything else fixed.
pub fn with_resource_capacity(
    instance: &Instance,
    resource: &str,
    capacity: u32,
) -> Result<Instance, InstanceError> {
    let activities: Vec<Activity> = instance.activities().values().cloned().collect();
    let mut resources = instance.resources().clone();
    resources.insert(resource.to_string(), capacity);

    Instance::new(
        activities,
        resources,
        instance.precedences().to_vec(),
        instance.incompatibilities().to_vec(),
    )
}

/// Replicate `template` into `patients` independent copies sharing one
/// new global source and sink, and the same resource pool.
///
/// `template`'s own source and sink activities are not copied; each
/// replica's internal activities are renumbered into a disjoint id
/// block and wired to the new global source/sink in place of the
/// template's original source/sink edges.
pub fn replicate_patients(template: &Instance, patients: usize) -> Result<Instance, InstanceError> {
    let template_source = template.source_id();
    let template_sink = template.sink_id();

    let internal_ids: Vec<ActivityId> = template
        .activities()
        .keys()
        .copied()
        .filter(|&id| id != template_source && id != template_sink)
        .collect();
    let block_size = internal_ids.len() as ActivityId;
    let local_index: BTreeMap<ActivityId, ActivityId> = internal_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i as ActivityId + 1))
        .collect();

    let new_source: ActivityId = 0;
    let new_sink: ActivityId = patients as ActivityId * block_size + 1;

    let remap = |copy: ActivityId, id: ActivityId| -> ActivityId {
        if id == template_source {
            new_source
        } else if id == template_sink {
            new_sink
        } else {
            copy * block_size + local_index[&id]
        }
    };

    let mut activities = Vec::new();
    let mut precedences = Vec::new();
    let mut incompatibilities = Vec::new();

    for copy in 0..patients as ActivityId {
        for &id in &internal_ids {
            let template_activity = &template.activities()[&id];
            let mut activity = Activity::new(remap(copy, id), template_activity.duration);
            activity.demands = template_activity.demands.clone();
            activities.push(activity);
        }
        for &(from, to) in template.precedences() {
            precedences.push((remap(copy, from), remap(copy, to)));
        }
        for &(a, b) in template.incompatibilities() {
            incompatibilities.push((remap(copy, a), remap(copy, b)));
        }
    }

    activities.push(Activity::new(new_source, 0));
    activities.push(Activity::new(new_sink, 0));

    Instance::new(
        activities,
        template.resources().clone(),
        precedences,
        incompatibilities,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemosched_core::Resources;

    fn single_patient_template() -> Instance {
        let activities = vec![
            Activity::new(1, 0),
            Activity::new(2, 3).with_demand("R1", 1),
            Activity::new(3, 2).with_demand("R1", 1),
            Activity::new(4, 0),
        ];
        Instance::new(
            activities,
            Resources::new(),
            vec![(1, 2), (1, 3), (2, 4), (3, 4)],
            vec![(2, 3)],
        )
        .unwrap()
    }

    #[test]
    fn replicate_patients_produces_disjoint_blocks() {
        let template = single_patient_template();
        let replicated = replicate_patients(&template, 3).unwrap();

        // 2 internal activities per patient * 3 patients + shared source/sink
        assert_eq!(replicated.activities().len(), 2 * 3 + 2);
        assert_eq!(replicated.source_id(), 0);
    }

    #[test]
    fn replicate_patients_preserves_per_copy_incompatibilities() {
        let template = single_patient_template();
        let replicated = replicate_patients(&template, 2).unwrap();

        // Each copy keeps its own internal incompatibility pair.
        assert_eq!(replicated.incompatibilities().len(), 2);
    }

    #[test]
    fn with_resource_capacity_overrides_a_single_resource() {
        let template = single_patient_template();
        let variant = with_resource_capacity(&template, "R1", 5).unwrap();
        assert_eq!(variant.resources().get("R1"), Some(&5));
    }
}
