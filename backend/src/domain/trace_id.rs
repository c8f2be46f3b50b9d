//! Correlation id for one HTTP request.
//!
//! The trace middleware binds a [`TraceId`] in task-local storage for the
//! lifetime of the request; [`crate::domain::Error`] picks it up so every
//! error body and log line can be matched to the `trace-id` response header.
//! Task-locals do not follow `tokio::spawn`, so wrap spawned work in
//! [`TraceId::scope`] again.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

tokio::task_local! {
    static CURRENT: TraceId;
}

/// Request correlation id, rendered as a hyphenated UUID.
///
/// # Examples
/// ```
/// use ticket_desk::TraceId;
///
/// async fn handler() -> String {
///     TraceId::current().map_or_else(|| "untraced".to_owned(), |id| id.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random id for a request that arrived without one.
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The id bound to the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` bound as the current id.
    ///
    /// # Examples
    /// ```
    /// use ticket_desk::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let trace_id: TraceId = "3f1c7a52-9d4e-4b8a-a0f1-2c6d8e9b0a11".parse().unwrap();
    /// let seen = TraceId::scope(trace_id, async { TraceId::current() }).await;
    /// assert_eq!(seen, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: TraceId, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    /// Accepts any UUID form; a malformed header value is an error so the
    /// middleware can replace it.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn scope_binds_and_releases_the_id() {
        let bound = TraceId::generate();
        let inside = TraceId::scope(bound, async { TraceId::current() }).await;

        assert_eq!(inside, Some(bound));
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn nested_scope_shadows_outer_id() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();

        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (nested, TraceId::current())
        })
        .await;

        assert_eq!(seen, (Some(inner), Some(outer)));
    }

    #[tokio::test]
    async fn spawned_tasks_do_not_inherit_the_id() {
        let seen = TraceId::scope(TraceId::generate(), async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task joins")
        })
        .await;

        assert!(seen.is_none());
    }

    #[rstest]
    #[case("3f1c7a52-9d4e-4b8a-a0f1-2c6d8e9b0a11")]
    #[case("3F1C7A52-9D4E-4B8A-A0F1-2C6D8E9B0A11")]
    #[case(" 3f1c7a529d4e4b8aa0f12c6d8e9b0a11 ")]
    fn parses_uuid_forms_into_canonical_text(#[case] raw: &str) {
        let trace_id: TraceId = raw.parse().expect("valid uuid");
        assert_eq!(trace_id.to_string(), "3f1c7a52-9d4e-4b8a-a0f1-2c6d8e9b0a11");
    }

    #[rstest]
    #[case("")]
    #[case("ticket-42")]
    fn rejects_non_uuid_values(#[case] raw: &str) {
        assert!(raw.parse::<TraceId>().is_err());
    }
}
