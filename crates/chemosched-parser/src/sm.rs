//! Parser for PSPLIB `.sm` instance files.
//!
//! A line-based scanner with a `reading_mode` state machine that switches
//! between the `PRECEDENCE RELATIONS`, `REQUESTS/DURATIONS`, and
//! `RESOURCEAVAILABILITIES` sections, skipping banner lines that start
//! with `*` or `-` and blank lines. No grammar file for this format was
//! available to adapt, so this stays a direct hand-rolled port rather
//! than a `pest` grammar.

use std::collections::BTreeMap;
use std::path::Path;

use chemosched_core::{Activity, ActivityId, Instance, InstanceError, Resources};
use thiserror::Error;

/// Errors raised while parsing a `.sm` file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("instance is malformed: {0}")]
    Instance(#[from] InstanceError),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Precedence,
    Requests,
    Resources,
}

struct PrecedenceRow {
    job: ActivityId,
    successors: Vec<ActivityId>,
}

struct RequestRow {
    job: ActivityId,
    duration: u32,
    demands: Vec<u32>,
}

/// Parse a `.sm` instance from its file path.
pub fn parse_file(path: &Path) -> Result<Instance, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&content)
}

/// Parse a `.sm` instance from its textual content.
pub fn parse_str(input: &str) -> Result<Instance, ParseError> {
    let mut mode = Mode::None;
    let mut precedence_rows: Vec<PrecedenceRow> = Vec::new();
    let mut request_rows: Vec<RequestRow> = Vec::new();
    let mut resource_names: Vec<String> = Vec::new();
    let mut resource_capacities: Vec<u32> = Vec::new();
    let mut resources_row_consumed = false;

    for (line_no, raw_line) in input.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = raw_line.trim();

        if trimmed.is_empty() || trimmed.starts_with('*') || trimmed.starts_with('-') {
            continue;
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("PRECEDENCE RELATIONS") {
            mode = Mode::Precedence;
            continue;
        }
        if upper.starts_with("REQUESTS/DURATIONS") || upper.starts_with("REQUESTS-DURATIONS") {
            mode = Mode::Requests;
            continue;
        }
        if upper.starts_with("RESOURCEAVAILABILITIES") {
            mode = Mode::Resources;
            continue;
        }
        // Header/column lines we don't need the content of, only to skip them.
        if upper.starts_with("JOBNR")
            || upper.starts_with("PROJECT INFORMATION")
            || upper.starts_with("PRONR")
            || upper.starts_with("#JOBS")
            || upper.starts_with("JOBS")
            || upper.starts_with("RESOURCES")
        {
            continue;
        }

        match mode {
            Mode::None => {}
            Mode::Precedence => {
                let fields: Vec<&str> = trimmed.split_whitespace().collect();
                if fields.len() < 3 {
                    continue;
                }
                let job = parse_u32(fields[0], line_no)?;
                let successor_count: usize = parse_u32(fields[2], line_no)? as usize;
                let successors = fields[3..]
                    .iter()
                    .take(successor_count)
                    .map(|s| parse_u32(s, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                precedence_rows.push(PrecedenceRow { job, successors });
            }
            Mode::Requests => {
                let fields: Vec<&str> = trimmed.split_whitespace().collect();
                if fields.len() < 4 {
                    continue;
                }
                // jobnr, mode, duration, R1..Rk
                let job = parse_u32(fields[0], line_no)?;
                let duration = parse_u32(fields[2], line_no)?;
                let demands = fields[3..]
                    .iter()
                    .map(|s| parse_u32(s, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                request_rows.push(RequestRow {
                    job,
                    duration,
                    demands,
                });
            }
            Mode::Resources => {
                if resources_row_consumed {
                    continue;
                }
                let fields: Vec<&str> = trimmed.split_whitespace().collect();
                // Either a header row of resource labels ("R 1  R 2  ...",
                // tokenized apart by whitespace) or the single data row of
                // capacities.
                if fields.iter().any(|f| f.chars().any(|c| c.is_ascii_alphabetic())) {
                    resource_names = merge_resource_labels(&fields);
                    continue;
                }
                resource_capacities = fields
                    .iter()
                    .map(|s| parse_u32(s, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                resources_row_consumed = true;
            }
        }
    }

    if resource_names.len() != resource_capacities.len() {
        let count = resource_capacities.len();
        resource_names = (1..=count).map(|i| format!("R{i}")).collect();
    }

    let mut activities = Vec::new();
    let demand_by_job: BTreeMap<ActivityId, &RequestRow> =
        request_rows.iter().map(|r| (r.job, r)).collect();
    for row in &precedence_rows {
        let mut activity = match demand_by_job.get(&row.job) {
            Some(request) => Activity::new(row.job, request.duration),
            None => Activity::new(row.job, 0),
        };
        if let Some(request) = demand_by_job.get(&row.job) {
            for (name, &amount) in resource_names.iter().zip(request.demands.iter()) {
                if amount > 0 {
                    activity = activity.with_demand(name.clone(), amount);
                }
            }
        }
        activities.push(activity);
    }

    let mut precedences = Vec::new();
    for row in &precedence_rows {
        for &succ in &row.successors {
            precedences.push((row.job, succ));
        }
    }

    let mut resources = Resources::new();
    for (name, capacity) in resource_names.iter().zip(resource_capacities.iter()) {
        resources.insert(name.clone(), *capacity);
    }

    Instance::new(activities, resources, precedences, Vec::new()).map_err(ParseError::Instance)
}

/// Merge alternating letter/digit tokens ("R", "1") into resource names
/// ("R1"); a token that is already a full name passes through unchanged.
fn merge_resource_labels(fields: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    let mut iter = fields.iter().peekable();
    while let Some(&field) = iter.next() {
        if field.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some(&next) = iter.peek() {
                if next.chars().all(|c| c.is_ascii_digit()) {
                    names.push(format!("{field}{next}"));
                    iter.next();
                    continue;
                }
            }
        }
        names.push(field.to_string());
    }
    names
}

fn parse_u32(field: &str, line: usize) -> Result<u32, ParseError> {
    field.parse::<u32>().map_err(|_| ParseError::Syntax {
        line,
        message: format!("expected an integer, found '{field}'"),
    })
}
