//! Variable resolution engine
//!
//! Substitutes `${KEY}` placeholders across one environment. Stages run in a
//! fixed order: build the dependency graph, reject cycles, sort, then
//! resolve each key. Every call is a pure function of its input.

use envshield_domain::environment::{ResolutionError, ResolutionResult, VariableMap};
use tracing::{debug, warn};

use super::graph::DependencyGraph;
use super::parser::{has_references, parse_references};

/// Default ceiling on substitution passes per key.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Outcome of resolving a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueResolution {
    /// The substituted value, possibly with placeholders left in it.
    pub value: String,

    /// Set when substitution stopped before every placeholder was replaced.
    pub warning: Option<String>,
}

/// The variable resolution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableResolver {
    max_iterations: usize,
}

impl VariableResolver {
    /// Creates a resolver with [`DEFAULT_MAX_ITERATIONS`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the ceiling on substitution passes per key.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Returns the ceiling on substitution passes per key.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Resolves every placeholder in `variables`.
    ///
    /// If any cycle exists nothing is substituted: `resolved` is the input,
    /// `errors` holds the `Circular` errors and a single abort warning is
    /// returned. Otherwise keys are resolved in dependency order; each key
    /// contributes its `Missing` errors and at most one warning. The
    /// returned map iterates in the input's order.
    #[must_use]
    pub fn resolve(&self, variables: &VariableMap) -> ResolutionResult {
        let graph = DependencyGraph::build(variables);
        debug!(
            variables = graph.len(),
            references = graph.edge_count(),
            "Built dependency graph"
        );

        let cycles = graph.detect_cycles();
        if !cycles.is_empty() {
            warn!(
                cycles = cycles.len(),
                "Resolution aborted due to circular dependencies"
            );
            return ResolutionResult::aborted(variables.clone(), cycles);
        }

        let order = graph.topological_order();
        let mut by_order = VariableMap::with_capacity(variables.len());
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for key in order {
            let Some(raw) = variables.get(key) else {
                continue;
            };

            errors.extend(missing_reference_check(key, raw, variables));

            let outcome = resolve_value(key, raw, &by_order, variables, self.max_iterations);
            if let Some(warning) = outcome.warning {
                debug!(variable = key, "Value not fully resolved");
                warnings.push(warning);
            }
            by_order.insert(key.to_string(), outcome.value);
        }

        let resolved = variables
            .iter()
            .map(|(key, raw)| {
                let value = by_order.swap_remove(key).unwrap_or_else(|| raw.clone());
                (key.clone(), value)
            })
            .collect();

        debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            "Resolution finished"
        );

        ResolutionResult {
            resolved,
            errors,
            warnings,
        }
    }
}

impl Default for VariableResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves every placeholder in `variables` with the given pass ceiling.
///
/// # Examples
///
/// ```
/// use envshield_application::variable_resolver::resolve_variables;
/// use envshield_domain::environment::VariableMap;
///
/// let mut vars = VariableMap::new();
/// vars.insert("HOST".to_string(), "localhost".to_string());
/// vars.insert("URL".to_string(), "http://${HOST}:8080".to_string());
///
/// let result = resolve_variables(&vars, 10);
/// assert_eq!(result.resolved["URL"], "http://localhost:8080");
/// assert!(result.is_clean());
/// ```
#[must_use]
pub fn resolve_variables(variables: &VariableMap, max_iterations: usize) -> ResolutionResult {
    VariableResolver::new()
        .with_max_iterations(max_iterations)
        .resolve(variables)
}

/// Reports one `Missing` error per placeholder in `raw` naming a key absent
/// from `original`. Repeated occurrences are each reported; errors are
/// attributed to `key`, not to the missing target.
#[must_use]
pub fn missing_reference_check(
    key: &str,
    raw: &str,
    original: &VariableMap,
) -> Vec<ResolutionError> {
    parse_references(raw)
        .into_iter()
        .filter(|r| !original.contains_key(&r.name))
        .map(|r| ResolutionError::missing(key, &r.name))
        .collect()
}

/// Substitutes placeholders in `raw` until it stops changing or
/// `max_iterations` passes have run.
///
/// Each placeholder takes the value from `resolved_so_far` when present,
/// otherwise the raw value from `original`, otherwise it stays as written.
/// Falling back to the raw value can bring placeholders back into the
/// string; later passes pick those up.
#[must_use]
pub fn resolve_value(
    key: &str,
    raw: &str,
    resolved_so_far: &VariableMap,
    original: &VariableMap,
    max_iterations: usize,
) -> ValueResolution {
    let mut value = raw.to_string();
    let mut passes = 0;

    while passes < max_iterations && has_references(&value) {
        let next = substitute_once(&value, resolved_so_far, original);
        if next == value {
            return ValueResolution {
                warning: Some(format!("Could not fully resolve {key}: {value}")),
                value,
            };
        }

        value = next;
        passes += 1;
    }

    // Reaching the ceiling warns even when the last pass finished the value.
    let warning = (passes >= max_iterations).then(|| {
        format!("Max iterations reached for {key}, resolution may be incomplete")
    });

    ValueResolution { value, warning }
}

/// Runs a single left-to-right substitution pass.
fn substitute_once(input: &str, resolved_so_far: &VariableMap, original: &VariableMap) -> String {
    let references = parse_references(input);

    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for var_ref in &references {
        result.push_str(&input[last_end..var_ref.span.start]);

        match resolved_so_far
            .get(&var_ref.name)
            .or_else(|| original.get(&var_ref.name))
        {
            Some(replacement) => result.push_str(replacement),
            None => result.push_str(&input[var_ref.span.clone()]),
        }

        last_end = var_ref.span.end;
    }

    result.push_str(&input[last_end..]);
    result
}
