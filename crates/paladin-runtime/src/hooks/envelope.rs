use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error, info};

use super::dispatcher::VerdictDispatcher;
use super::events::{HookEvent, HookResponse};

/// Outermost guard around one hook invocation. Whatever happens inside
/// (error, panic, deadline) the host receives a response, and every failure
/// lets the prompt through unchanged.
pub struct FailOpenEnvelope {
    deadline: Duration,
}

impl FailOpenEnvelope {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Run `work` to completion or until the deadline. The work runs on its
    /// own task so a panic surfaces as a join error; on deadline the task is
    /// aborted.
    pub async fn run<F>(&self, work: F) -> HookResponse
    where
        F: Future<Output = Result<HookResponse>> + Send + 'static,
    {
        let started = Instant::now();
        let task = tokio::spawn(work);
        let abort = task.abort_handle();

        let response = match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(Ok(response))) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    should_continue = response.should_continue,
                    healed = response.prompt.is_some() && response.user_message.is_some(),
                    "Hook completed"
                );
                response
            }
            Ok(Ok(Err(e))) => {
                error!(error = %format!("{:#}", e), "Hook failed, allowing prompt");
                HookResponse::pass_through()
            }
            Ok(Err(join_error)) => {
                error!(error = %join_error, "Hook task crashed, allowing prompt");
                HookResponse::pass_through()
            }
            Err(_) => {
                abort.abort();
                error!(
                    deadline_secs = self.deadline.as_secs_f64(),
                    "Hook deadline exceeded, allowing prompt"
                );
                HookResponse::pass_through()
            }
        };

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Hook envelope finished");
        response
    }
}

/// Read one event from `input`, dispatch it and return the response, all
/// under the envelope's deadline.
pub async fn run_hook<R>(
    envelope: &FailOpenEnvelope,
    dispatcher: Arc<VerdictDispatcher>,
    mut input: R,
) -> HookResponse
where
    R: AsyncRead + Unpin + Send + 'static,
{
    envelope
        .run(async move {
            let mut raw = String::new();
            input
                .read_to_string(&mut raw)
                .await
                .context("Failed to read hook input")?;
            let event = HookEvent::parse(&raw);
            Ok(dispatcher.handle(&event).await)
        })
        .await
}
