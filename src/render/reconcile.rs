/// Decision produced for one incoming display value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// True when the value is a top-up over the previous one
    pub should_pulse: bool,
    /// Total seconds of the incoming value when it is well-formed
    pub seconds: Option<u64>,
}

/// Compares each incoming timer value with the last rendered one.
///
/// The timer only counts down on its own; an increase means donation time
/// was added and deserves a transient highlight. Malformed values are
/// incomparable: they never pulse but still replace the stored value.
#[derive(Debug, Default)]
pub struct RenderReconciler {
    last: Option<String>,
}

impl RenderReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the incoming value pulses, then store it
    pub fn reconcile(&mut self, incoming: &str) -> Reconciled {
        let previous_seconds = self.last.as_deref().and_then(clock_seconds);
        let incoming_seconds = clock_seconds(incoming);

        let should_pulse = matches!(
            (previous_seconds, incoming_seconds),
            (Some(previous), Some(next)) if next > previous
        );

        self.last = Some(incoming.to_string());
        Reconciled {
            should_pulse,
            seconds: incoming_seconds,
        }
    }

    /// The last stored display value
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

/// Parse a strict `HH:MM:SS` string into total seconds
pub fn clock_seconds(value: &str) -> Option<u64> {
    let bytes = value.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }

    let field = |hi: usize, lo: usize| -> Option<u64> {
        let hi = (bytes[hi] as char).to_digit(10)? as u64;
        let lo = (bytes[lo] as char).to_digit(10)? as u64;
        Some(hi * 10 + lo)
    };

    Some(field(0, 1)? * 3600 + field(3, 4)? * 60 + field(6, 7)?)
}
