use serde::Serialize;

/// A network an agent manifest expects to exist before it is brought up.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkRequirement {
    pub name: String,
    pub external: bool,
}

impl NetworkRequirement {
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum ReconciliationStatus {
    AlreadyExisted,
    Created,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub network: String,
    pub status: ReconciliationStatus,
}

impl ReconciliationResult {
    /// A network counts as reconciled whenever it exists afterwards,
    /// whether or not this run created it.
    pub fn is_reconciled(&self) -> bool {
        !matches!(self.status, ReconciliationStatus::Failed(_))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub scope: String,
    pub results: Vec<ReconciliationResult>,
}

impl ReconciliationReport {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            results: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, ReconciliationStatus::Created))
    }

    pub fn already_existed(&self) -> usize {
        self.count(|s| matches!(s, ReconciliationStatus::AlreadyExisted))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ReconciliationStatus::Failed(_)))
    }

    pub fn reconciled(&self) -> usize {
        self.total() - self.failed()
    }

    /// Fraction of networks that exist after reconciliation. An empty
    /// report is fully reconciled.
    pub fn success_ratio(&self) -> f64 {
        if self.results.is_empty() {
            1.0
        } else {
            self.reconciled() as f64 / self.total() as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.results.iter().filter(|r| !r.is_reconciled())
    }

    fn count(&self, predicate: impl Fn(&ReconciliationStatus) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.status)).count()
    }
}
