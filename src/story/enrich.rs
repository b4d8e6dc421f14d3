use std::fmt::Display;
use std::future::Future;

/// Run `op` over `inputs` one at a time, in order, collecting each outcome.
///
/// A failed item is logged and recorded; it never stops the batch.
pub async fn best_effort<I, F, Fut, T, E>(label: &str, inputs: I, mut op: F) -> Vec<Result<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut outcomes = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let outcome = op(input).await;
        if let Err(e) = &outcome {
            tracing::warn!(item = index + 1, error = %e, "{} failed, continuing", label);
        }
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    tracing::info!(total = outcomes.len(), failed, "{} finished", label);

    outcomes
}
