//! Repair log
//!
//! Every correction is recorded twice: as a structured `tracing` event and as
//! a [`RepairEvent`] kept for the caller. Cosmetic fixes and material
//! violations are separate kinds so downstream metrics can tell them apart.

use serde::Serialize;
use serde_json::Value;

/// Default maximum characters of a value rendered into a log line
pub const DEFAULT_VALUE_LIMIT: usize = 160;

/// Kind of repair event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairKind {
    /// A value was reshaped into a valid one
    Fixed,
    /// A value could not be fixed and was removed
    Dropped,
    /// Content was materially wrong (structural violation)
    Violation,
}

impl RepairKind {
    /// Metric label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Dropped => "dropped",
            Self::Violation => "violation",
        }
    }
}

/// Where in the document a repair happened
#[derive(Debug, Clone, Copy)]
pub struct BlockScope<'a> {
    /// Index of the block in the extracted (pre-repair) list
    pub index: usize,
    /// Block type, or a placeholder when absent
    pub block_type: &'a str,
}

impl<'a> BlockScope<'a> {
    /// Create scope
    #[inline]
    #[must_use]
    pub fn new(index: usize, block_type: &'a str) -> Self {
        Self { index, block_type }
    }
}

/// One recorded repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEvent {
    /// Event kind
    pub kind: RepairKind,
    /// Index of the block in the extracted list
    pub block_index: usize,
    /// Block type
    pub block_type: String,
    /// Field, for field-level events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable description
    pub detail: String,
}

impl std::fmt::Display for RepairEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] block {} ({})", self.kind.as_str(), self.block_index, self.block_type)?;
        if let Some(field) = &self.field {
            write!(f, " field '{field}'")?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Ordered record of every repair made to one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairLog {
    events: Vec<RepairEvent>,
    #[serde(skip)]
    value_limit: usize,
}

impl RepairLog {
    /// Create log that truncates rendered values at `value_limit` characters
    #[must_use]
    pub fn new(value_limit: usize) -> Self {
        Self {
            events: Vec::new(),
            value_limit,
        }
    }

    /// Field reshaped: "field X fixed: was Y now Z"
    pub fn fixed(&mut self, scope: &BlockScope<'_>, field: &str, before: &Value, after: &Value) {
        let before = render(before, self.value_limit);
        let after = render(after, self.value_limit);
        tracing::info!(
            block_index = scope.index,
            block_type = scope.block_type,
            field,
            %before,
            %after,
            "field fixed"
        );
        self.push(RepairKind::Fixed, scope, Some(field), format!("was {before} now {after}"));
    }

    /// Cosmetic fix described in words
    pub fn fixed_note(&mut self, scope: &BlockScope<'_>, field: Option<&str>, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::info!(
            block_index = scope.index,
            block_type = scope.block_type,
            field = field.unwrap_or_default(),
            %detail,
            "repair applied"
        );
        self.push(RepairKind::Fixed, scope, field, detail);
    }

    /// Field removed: "field X dropped: unfixable Y"
    pub fn dropped(&mut self, scope: &BlockScope<'_>, field: &str, before: &Value, reason: &str) {
        let before = render(before, self.value_limit);
        tracing::info!(
            block_index = scope.index,
            block_type = scope.block_type,
            field,
            %before,
            reason,
            "field dropped: unfixable"
        );
        self.push(
            RepairKind::Dropped,
            scope,
            Some(field),
            format!("unfixable {before} ({reason})"),
        );
    }

    /// Structural violation detected
    pub fn violation(&mut self, scope: &BlockScope<'_>, field: Option<&str>, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!(
            block_index = scope.index,
            block_type = scope.block_type,
            field = field.unwrap_or_default(),
            %detail,
            "violation detected"
        );
        self.push(RepairKind::Violation, scope, field, detail);
    }

    fn push(&mut self, kind: RepairKind, scope: &BlockScope<'_>, field: Option<&str>, detail: String) {
        metrics::counter!("blocksmith_repairs_total", "kind" => kind.as_str()).increment(1);
        self.events.push(RepairEvent {
            kind,
            block_index: scope.index,
            block_type: scope.block_type.to_string(),
            field: field.map(ToString::to_string),
            detail,
        });
    }

    /// All events in order
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[RepairEvent] {
        &self.events
    }

    /// Consume into events
    #[must_use]
    pub fn into_events(self) -> Vec<RepairEvent> {
        self.events
    }

    /// Whether nothing was repaired
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events of a kind
    #[must_use]
    pub fn count(&self, kind: RepairKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Compact JSON rendering truncated to `limit` characters
#[must_use]
pub fn render(value: &Value, limit: usize) -> String {
    let text = value.to_string();
    if text.chars().count() <= limit {
        return text;
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push('…');
    truncated
}
