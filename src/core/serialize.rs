//! Purpose: Build caller-facing result payloads from a loaded model.
//! Exports: `system_info`, `power_flow_results`, `time_domain_results`,
//! Exports: `variable_catalog`, `eigenvalue_results`.
//! Role: The only path from engine accessors to JSON; every array goes through
//! Role: the numeric conversion layer.
//! Invariants: Missing-precondition cases return `ErrorKind::Precondition`,
//! Invariants: never a panic and never a partial payload.
//! Invariants: One shared stride downsamples the time axis and every selected
//! Invariants: variable, keeping arrays index-aligned.

use serde_json::{Map, Value, json};

use crate::core::downsample;
use crate::core::error::{Error, ErrorKind};
use crate::core::numeric::{Column, column_json, floats_json};
use crate::engine::EngineModel;

/// Identity, component counts, DAE shape, and scalar configuration.
pub fn system_info(model: &dyn EngineModel) -> Value {
    let mut models = Map::new();
    for component in model.component_counts() {
        if component.count == 0 {
            continue;
        }
        models.insert(
            component.model,
            json!({
                "count": component.count,
                "group": component.group,
            }),
        );
    }

    let dae = model.dae_shape();
    json!({
        "name": model.name(),
        "case_path": model.case_path(),
        "is_setup": model.is_setup(),
        "models": models,
        "dae_info": {
            "n_states": dae.n_states,
            "n_algebraic": dae.n_algebraic,
            "time": dae.time,
        },
        "config": {
            "freq": model.frequency(),
            "mva": model.power_base(),
        },
    })
}

/// Bus and generator arrays after a converged power flow; a compact
/// non-convergence record otherwise.
pub fn power_flow_results(model: &dyn EngineModel) -> Value {
    let status = model.power_flow();
    if !status.converged {
        return json!({
            "converged": false,
            "iterations": status.iterations,
            "error": "Power flow did not converge",
        });
    }

    let buses = model.buses();
    let mut results = json!({
        "converged": true,
        "iterations": status.iterations,
        "exec_time": status.exec_time,
        "buses": {
            "idx": column_json(&buses.ids),
            "name": buses.names,
            "voltage": floats_json(&buses.voltage),
            "angle": floats_json(&buses.angle),
        },
    });

    // Concatenate generator arrays across blocks; block order is fixed by the
    // engine contract, so the concatenation is deterministic.
    let mut gen_ids: Option<Column> = None;
    let mut gen_p = Vec::new();
    let mut gen_q = Vec::new();
    for block in model.generator_blocks() {
        if block.ids.is_empty() {
            continue;
        }
        match &mut gen_ids {
            Some(ids) => ids.extend(block.ids),
            None => gen_ids = Some(block.ids),
        }
        gen_p.extend(block.p);
        gen_q.extend(block.q);
    }
    if let Some(ids) = gen_ids {
        results["generators"] = json!({
            "idx": column_json(&ids),
            "p": floats_json(&gen_p),
            "q": floats_json(&gen_q),
        });
    }

    results
}

/// Time axis plus selected variable series, downsampled to `max_points`.
///
/// `variables: None` selects every state variable. Named lookups check state
/// names first, then algebraic names; unknown names are silently omitted.
/// `max_points == 0` disables the bound.
pub fn time_domain_results(
    model: &dyn EngineModel,
    variables: Option<&[String]>,
    max_points: usize,
) -> Result<Value, Error> {
    let status = model.time_domain();
    if !status.initialized {
        return Err(Error::new(ErrorKind::Precondition)
            .with_message("Time-domain simulation not initialized"));
    }

    let time = model.time_axis();
    let selected = select_variables(model, variables);
    let stride = downsample::plan(time.len(), max_points);

    let mut series = Map::new();
    for (name, values) in selected {
        let values = match stride {
            Some(stride) => downsample::thin(&values, stride),
            None => values,
        };
        series.insert(name, floats_json(&values));
    }

    let time_out = match stride {
        Some(stride) => downsample::thin(time, stride),
        None => time.to_vec(),
    };

    let mut results = json!({
        "converged": status.completed && !status.busted,
        "exec_time": status.exec_time,
        "time": floats_json(&time_out),
        "n_points": time.len(),
        "variables": series,
        "downsampled": stride.is_some(),
    });
    if let Some(stride) = stride {
        results["downsample_factor"] = json!(stride);
    }
    Ok(results)
}

/// State and algebraic variable name lists for a running time-domain session.
pub fn variable_catalog(model: &dyn EngineModel) -> Result<Value, Error> {
    if !model.time_domain().initialized {
        return Err(Error::new(ErrorKind::Precondition)
            .with_message("Time-domain simulation not initialized"));
    }
    let states = model.state_names();
    let algebraics = model.algebraic_names();
    Ok(json!({
        "state_variables": states,
        "algebraic_variables": algebraics,
        "n_states": states.len(),
        "n_algebraic": algebraics.len(),
    }))
}

/// Eigenvalue arrays, classification counts, and optional participation data.
pub fn eigenvalue_results(model: &dyn EngineModel) -> Result<Value, Error> {
    let solution = model.eigenvalues().ok_or_else(|| {
        Error::new(ErrorKind::Precondition)
            .with_message("Eigenvalue analysis has not been run yet")
    })?;

    let mut results = json!({
        "n_eigenvalues": solution.real.len(),
        "eigenvalues": {
            "real": floats_json(&solution.real),
            "imag": floats_json(&solution.imag),
        },
        "statistics": {
            "n_positive": solution.n_positive,
            "n_zeros": solution.n_zeros,
            "n_negative": solution.n_negative,
        },
    });
    if let Some(participation) = &solution.participation {
        let rows: Vec<Value> = participation.iter().map(|row| floats_json(row)).collect();
        results["participation_factors"] = Value::Array(rows);
    }
    if !solution.state_names.is_empty() {
        results["state_names"] = json!(solution.state_names);
    }
    if let Some(exec_time) = solution.exec_time {
        results["exec_time"] = json!(exec_time);
    }
    Ok(results)
}

fn select_variables(
    model: &dyn EngineModel,
    variables: Option<&[String]>,
) -> Vec<(String, Vec<f64>)> {
    let state_names = model.state_names();
    match variables {
        None => state_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), model.state_series(i)))
            .collect(),
        Some(requested) => {
            let algebraic_names = model.algebraic_names();
            let mut selected = Vec::new();
            for name in requested {
                if let Some(i) = state_names.iter().position(|n| n == name) {
                    selected.push((name.clone(), model.state_series(i)));
                } else if let Some(i) = algebraic_names.iter().position(|n| n == name) {
                    selected.push((name.clone(), model.algebraic_series(i)));
                }
                // unknown names are omitted, not errored
            }
            selected
        }
    }
}
