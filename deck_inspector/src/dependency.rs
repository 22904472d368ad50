/// Opaque handle to one registered dependency. Stays valid for the lifetime
/// of the tracker that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyToken(usize);

#[derive(Debug)]
struct Dependency {
    name: String,
    required: bool,
    satisfied: bool,
}

/// Per-inspector registry of named preconditions gating UI readiness.
///
/// Dependencies are registered once at inspector construction, in the order
/// the waiting messages should be reported. A dependency is either required
/// (blocks readiness until first satisfied) or non-blocking (observable but
/// never blocks); it is never both. This component raises no errors: unknown
/// names read as unsatisfied and are ignored on writes.
#[derive(Debug, Default)]
pub struct DependencyTracker {
    deps: Vec<Dependency>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required dependency, initially unsatisfied. Registering a name
    /// that already exists returns the existing token unchanged.
    pub fn register(&mut self, name: &str) -> DependencyToken {
        if let Some(i) = self.index_of(name) {
            return DependencyToken(i);
        }
        self.deps.push(Dependency {
            name: name.to_string(),
            required: true,
            satisfied: false,
        });
        DependencyToken(self.deps.len() - 1)
    }

    /// Adds a dependency that never blocks readiness ("don't block") but
    /// whose satisfaction can still be observed.
    pub fn register_non_blocking(&mut self, name: &str) -> DependencyToken {
        if let Some(i) = self.index_of(name) {
            return DependencyToken(i);
        }
        self.deps.push(Dependency {
            name: name.to_string(),
            required: false,
            satisfied: false,
        });
        DependencyToken(self.deps.len() - 1)
    }

    /// Idempotent; a no-op for unknown names.
    pub fn mark_satisfied(&mut self, name: &str) {
        if let Some(i) = self.index_of(name) {
            self.deps[i].satisfied = true;
        }
    }

    /// Reverts every required dependency to unsatisfied. Invoked on channel
    /// close/reset so the UI re-blocks until the remote state arrives again.
    /// Non-blocking dependencies keep whatever state they had.
    pub fn reset(&mut self) {
        for dep in &mut self.deps {
            if dep.required {
                dep.satisfied = false;
            }
        }
    }

    /// Unknown names report unsatisfied.
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.index_of(name)
            .map(|i| self.deps[i].satisfied)
            .unwrap_or(false)
    }

    pub fn satisfied(&self, token: DependencyToken) -> bool {
        self.deps.get(token.0).map(|d| d.satisfied).unwrap_or(false)
    }

    /// Names of the required dependencies, in registration order.
    pub fn required_names(&self) -> Vec<&str> {
        self.deps
            .iter()
            .filter(|d| d.required)
            .map(|d| d.name.as_str())
            .collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.deps.iter().position(|d| d.name == name)
    }
}
